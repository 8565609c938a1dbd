//! Calls from normal code into the exception handler through `ecall`.
//!
//! The argument travels in `a0` and comes back in `a0`; the call id rides in
//! the last argument register of the register file.

use crate::frame::LAST_ARG;
use crate::TrapFrame;

#[repr(usize)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CallId {
    /// Returns the argument plus one.
    IncrementCount = 1,
    /// Accepted and counted, changes nothing.
    Dummy = 2,
}

impl TryFrom<usize> for CallId {
    type Error = usize;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::IncrementCount),
            2 => Ok(Self::Dummy),
            unknown => Err(unknown),
        }
    }
}

impl From<CallId> for usize {
    fn from(id: CallId) -> Self {
        id as usize
    }
}

/// A call as it appears in the saved registers.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CallRequest {
    pub id: usize,
    pub arg: usize,
}

impl CallRequest {
    pub fn new(id: CallId, arg: usize) -> Self {
        Self {
            id: id.into(),
            arg,
        }
    }

    /// A request with an id outside [`CallId`].
    pub const fn raw(id: usize, arg: usize) -> Self {
        Self { id, arg }
    }

    pub fn pack(&self, frame: &mut TrapFrame) {
        frame.set_arg(0, self.arg);
        frame.set_arg(LAST_ARG, self.id);
    }

    pub fn unpack(frame: &TrapFrame) -> Self {
        Self {
            id: frame.last_arg(),
            arg: frame.arg(0),
        }
    }

    pub const fn result(frame: &TrapFrame) -> usize {
        frame.return_value()
    }
}

/// Trap into the exception handler of the current mode and wait for it.
#[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))]
pub fn ecall(id: CallId, arg: usize) -> usize {
    let mut value = arg;
    unsafe {
        #[cfg(not(feature = "rve"))]
        core::arch::asm!("ecall", inout("a0") value, in("a7") usize::from(id));
        #[cfg(feature = "rve")]
        core::arch::asm!("ecall", inout("a0") value, in("a3") usize::from(id));
    }
    value
}
