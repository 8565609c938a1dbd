/// Ref: https://www.lammertbies.nl/comm/info/serial-uart
/// Ref: ns16550a datasheet: https://datasheetspdf.com/pdf-file/605590/NationalSemiconductor/NS16550A/1
use bitflags::*;
use volatile::{ReadOnly, Volatile, WriteOnly};

use crate::CharDevice;

bitflags! {
    /// InterruptEnableRegister
    pub struct IER: u8 {
        const RX_AVAILABLE = 1 << 0;
        const TX_EMPTY = 1 << 1;
    }

    /// LineStatusRegister
    pub struct LSR: u8 {
        const DATA_AVAILABLE = 1 << 0;
        const THR_EMPTY = 1 << 5;
    }

    /// Modem Control Register
    pub struct MCR: u8 {
        const DATA_TERMINAL_READY = 1 << 0;
        const REQUEST_TO_SEND = 1 << 1;
        const AUX_OUTPUT2 = 1 << 3;
    }
}

/// Register block with DLAB cleared, as seen by the transmitter.
#[repr(C)]
#[allow(dead_code)]
struct TransmitBlock {
    /// transmitter holding register
    thr: WriteOnly<u8>,
    /// interrupt enable register
    ier: Volatile<IER>,
    /// ignore FCR
    _fcr: ReadOnly<u8>,
    /// line control register
    lcr: Volatile<u8>,
    /// modem control register
    mcr: Volatile<MCR>,
    /// line status register
    lsr: ReadOnly<LSR>,
    /// ignore MSR and SCR
    _padding: ReadOnly<u16>,
}

/// Polled transmitter. Nothing here raises an interrupt: the firmware only
/// takes timer interrupts.
pub struct Ns16550a {
    base_addr: usize,
}

impl Ns16550a {
    /// # Safety
    ///
    /// `base_addr` must point at a 16550 register block that nothing else
    /// drives.
    pub const unsafe fn new(base_addr: usize) -> Self {
        Self { base_addr }
    }

    fn block(&self) -> &mut TransmitBlock {
        unsafe { &mut *(self.base_addr as *mut TransmitBlock) }
    }
}

impl CharDevice for Ns16550a {
    fn init(&self) {
        let block = self.block();
        block
            .mcr
            .write(MCR::DATA_TERMINAL_READY | MCR::REQUEST_TO_SEND | MCR::AUX_OUTPUT2);
        block.ier.write(IER::empty());
    }

    fn write(&self, ch: u8) {
        let block = self.block();
        while !block.lsr.read().contains(LSR::THR_EMPTY) {
            core::hint::spin_loop();
        }
        block.thr.write(ch);
    }
}
