#![cfg_attr(not(test), no_std)]

mod cause;
pub mod dispatch;
pub mod frame;
pub mod gateway;
pub mod registry;
mod stats;
pub mod timer;
pub mod vector;

#[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))]
pub mod entry;
#[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))]
mod riscv;

#[cfg(test)]
mod testing;

pub use cause::Mode;
pub use dispatch::{Disposition, Dispatcher};
pub use frame::{TrapFrame, ARG_REGS, FRAME_SIZE, FRAME_SLOTS, SAVED_REGS};
pub use gateway::CallId;
pub use registry::{Handlers, RegistryError};
pub use stats::TrapStats;
pub use timer::Timer;
pub use vector::{VectorBase, VectorError, VectorLayout};

#[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))]
pub use self::riscv::{MachineTrap, SupervisorTrap};

/// Interrupt
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Interrupt {
    UserSoft,
    SupervisorSoft,
    MachineSoft,
    UserTimer,
    SupervisorTimer,
    MachineTimer,
    UserExternal,
    SupervisorExternal,
    MachineExternal,
    /// Platform line `n`, cause code `16 + n`.
    Platform(usize),
    Unknown,
}

/// Exception
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Exception {
    InstructionMisaligned,
    InstructionFault,
    IllegalInstruction,
    Breakpoint,
    LoadMisaligned,
    LoadFault,
    StoreMisaligned,
    StoreFault,
    UserEnvCall,
    SupervisorEnvCall,
    MachineEnvCall,
    InstructionPageFault,
    LoadPageFault,
    StorePageFault,
    Unknown,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TrapKind {
    Exception(Exception),
    Interrupt(Interrupt),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TrapCause {
    pub kind: TrapKind,
    /// Raw value of the cause register.
    pub bits: usize,
    /// Trap value register (faulting address or instruction bits).
    pub info: usize,
}

/// Access to the trap CSRs of one privilege mode.
///
/// Implemented for the real hart by [`MachineTrap`] and [`SupervisorTrap`].
/// Everything above this trait only sees structured values.
pub trait TrapControl {
    fn mode(&self) -> Mode;
    fn cause(&self) -> TrapCause;
    fn set_cause(&self, bits: usize);
    /// Program counter the trap return instruction resumes at.
    fn epc(&self) -> usize;
    fn set_epc(&self, pc: usize);
    fn set_trap_entry(&self, base: VectorBase);
    fn enable_interrupts(&self);
    fn disable_interrupts(&self);
    fn interrupts_enabled(&self) -> bool;
    fn enable_source(&self, source: Interrupt);
    fn disable_source(&self, source: Interrupt);
}

impl<T: TrapControl + ?Sized> TrapControl for &T {
    fn mode(&self) -> Mode {
        (**self).mode()
    }

    fn cause(&self) -> TrapCause {
        (**self).cause()
    }

    fn set_cause(&self, bits: usize) {
        (**self).set_cause(bits)
    }

    fn epc(&self) -> usize {
        (**self).epc()
    }

    fn set_epc(&self, pc: usize) {
        (**self).set_epc(pc)
    }

    fn set_trap_entry(&self, base: VectorBase) {
        (**self).set_trap_entry(base)
    }

    fn enable_interrupts(&self) {
        (**self).enable_interrupts()
    }

    fn disable_interrupts(&self) {
        (**self).disable_interrupts()
    }

    fn interrupts_enabled(&self) -> bool {
        (**self).interrupts_enabled()
    }

    fn enable_source(&self, source: Interrupt) {
        (**self).enable_source(source)
    }

    fn disable_source(&self, source: Interrupt) {
        (**self).disable_source(source)
    }
}
