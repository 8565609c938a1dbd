use riscv::register::{mcause, mepc, mstatus, mtval, scause, sepc, sstatus, stval};

use super::TrapControl;
use crate::{Interrupt, Mode, TrapCause, VectorBase};

macro_rules! csr_write {
    ($csr:literal, $value:expr) => {
        unsafe { core::arch::asm!(concat!("csrw ", $csr, ", {}"), in(reg) $value) }
    };
}

macro_rules! csr_set {
    ($csr:literal, $bits:expr) => {
        unsafe { core::arch::asm!(concat!("csrs ", $csr, ", {}"), in(reg) $bits) }
    };
}

macro_rules! csr_clear {
    ($csr:literal, $bits:expr) => {
        unsafe { core::arch::asm!(concat!("csrc ", $csr, ", {}"), in(reg) $bits) }
    };
}

/// Enable bit of `source` in `mie`/`sie`. Lines past the register width have
/// no enable bit.
fn enable_bit(source: Interrupt) -> Option<usize> {
    source
        .code()
        .filter(|&code| code < usize::BITS as usize)
        .map(|code| 1 << code)
}

/// Machine-mode trap CSRs of the current hart.
#[derive(Copy, Clone, Debug, Default)]
pub struct MachineTrap;

impl TrapControl for MachineTrap {
    fn mode(&self) -> Mode {
        Mode::Machine
    }

    fn cause(&self) -> TrapCause {
        TrapCause::from_bits(mcause::read().bits(), mtval::read())
    }

    fn set_cause(&self, bits: usize) {
        csr_write!("mcause", bits);
    }

    fn epc(&self) -> usize {
        mepc::read()
    }

    fn set_epc(&self, pc: usize) {
        unsafe { mepc::write(pc) };
    }

    fn set_trap_entry(&self, base: VectorBase) {
        csr_write!("mtvec", base.bits());
    }

    fn enable_interrupts(&self) {
        unsafe { mstatus::set_mie() };
    }

    fn disable_interrupts(&self) {
        unsafe { mstatus::clear_mie() };
    }

    fn interrupts_enabled(&self) -> bool {
        mstatus::read().mie()
    }

    fn enable_source(&self, source: Interrupt) {
        if let Some(bit) = enable_bit(source) {
            csr_set!("mie", bit);
        }
    }

    fn disable_source(&self, source: Interrupt) {
        if let Some(bit) = enable_bit(source) {
            csr_clear!("mie", bit);
        }
    }
}

/// Supervisor-mode trap CSRs of the current hart.
#[derive(Copy, Clone, Debug, Default)]
pub struct SupervisorTrap;

impl TrapControl for SupervisorTrap {
    fn mode(&self) -> Mode {
        Mode::Supervisor
    }

    fn cause(&self) -> TrapCause {
        TrapCause::from_bits(scause::read().bits(), stval::read())
    }

    fn set_cause(&self, bits: usize) {
        csr_write!("scause", bits);
    }

    fn epc(&self) -> usize {
        sepc::read()
    }

    fn set_epc(&self, pc: usize) {
        unsafe { sepc::write(pc) };
    }

    fn set_trap_entry(&self, base: VectorBase) {
        csr_write!("stvec", base.bits());
    }

    fn enable_interrupts(&self) {
        unsafe { sstatus::set_sie() };
    }

    fn disable_interrupts(&self) {
        unsafe { sstatus::clear_sie() };
    }

    fn interrupts_enabled(&self) -> bool {
        sstatus::read().sie()
    }

    fn enable_source(&self, source: Interrupt) {
        if let Some(bit) = enable_bit(source) {
            csr_set!("sie", bit);
        }
    }

    fn disable_source(&self, source: Interrupt) {
        if let Some(bit) = enable_bit(source) {
            csr_clear!("sie", bit);
        }
    }
}

/// `ucause`, not modelled by the `riscv` crate.
pub(crate) fn user_cause() -> TrapCause {
    let bits: usize;
    unsafe { core::arch::asm!("csrr {}, 0x042", out(reg) bits) };
    TrapCause::from_bits(bits, 0)
}
