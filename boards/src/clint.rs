use volatile::{ReadOnly, Volatile};

const MTIMECMP_OFFSET: usize = 0x4000;
const MTIME_OFFSET: usize = 0xBFF8;

/// Core-local interruptor: the machine timer of hart 0.
pub struct Clint {
    base_addr: usize,
}

impl Clint {
    /// # Safety
    ///
    /// `base_addr` must point at a CLINT register block.
    pub const unsafe fn new(base_addr: usize) -> Self {
        Self { base_addr }
    }

    fn mtime(&self) -> &ReadOnly<u64> {
        unsafe { &*((self.base_addr + MTIME_OFFSET) as *const ReadOnly<u64>) }
    }

    fn mtimecmp(&self) -> &mut Volatile<u64> {
        unsafe { &mut *((self.base_addr + MTIMECMP_OFFSET) as *mut Volatile<u64>) }
    }
}

impl trap::Timer for Clint {
    /// QEMU `virt` runs `mtime` at 10 MHz.
    const TICKS_PER_SECOND: u64 = 10_000_000;

    fn now(&self) -> u64 {
        self.mtime().read()
    }

    fn set_compare(&self, deadline: u64) {
        self.mtimecmp().write(deadline);
    }
}
