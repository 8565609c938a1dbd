use volatile::WriteOnly;

const FAIL: u32 = 0x3333;
const PASS: u32 = 0x5555;
const RESET: u32 = 0x7777;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Exit {
    Pass,
    Fail(u16),
    Reset,
}

impl Exit {
    const fn command(self) -> u32 {
        match self {
            Exit::Pass => PASS,
            Exit::Fail(code) => (code as u32) << 16 | FAIL,
            Exit::Reset => RESET,
        }
    }
}

/// SiFive test finisher: one write powers the machine off or resets it.
pub struct TestDevice {
    base_addr: usize,
}

impl TestDevice {
    /// # Safety
    ///
    /// `base_addr` must point at the test finisher register.
    pub const unsafe fn new(base_addr: usize) -> Self {
        Self { base_addr }
    }

    pub fn signal(&self, exit: Exit) {
        let reg = unsafe { &mut *(self.base_addr as *mut WriteOnly<u32>) };
        reg.write(exit.command());
    }

    pub fn exit(&self, exit: Exit) -> ! {
        self.signal(exit);
        loop {
            core::hint::spin_loop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands() {
        assert_eq!(Exit::Pass.command(), 0x5555);
        assert_eq!(Exit::Fail(1).command(), 0x1_3333);
        assert_eq!(Exit::Reset.command(), 0x7777);
    }

    #[test]
    fn test_signal_writes_register() {
        let mut reg = 0u32;
        let device = unsafe { TestDevice::new(&mut reg as *mut u32 as usize) };

        device.signal(Exit::Fail(3));

        assert_eq!(reg, 0x3_3333);
    }
}
