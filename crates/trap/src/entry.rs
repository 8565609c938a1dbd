//! Rust side of the stubs emitted by [`vector_table!`](crate::vector_table).
//!
//! The exception entries receive the saved frame on the trap stack and return
//! the frame to restore from, which is always the same one.

use crate::registry::handlers;
use crate::riscv::user_cause;
use crate::{MachineTrap, Mode, SupervisorTrap, TrapControl, TrapFrame};

pub extern "C" fn machine_exception(frame: *mut TrapFrame) -> *mut TrapFrame {
    // SAFETY: the stub passes the frame it just stored below `sp`.
    let frame_ref = unsafe { &mut *frame };
    handlers().exception(Mode::Machine)(frame_ref);
    frame
}

pub extern "C" fn supervisor_exception(frame: *mut TrapFrame) -> *mut TrapFrame {
    // SAFETY: the stub passes the frame it just stored below `sp`.
    let frame_ref = unsafe { &mut *frame };
    handlers().exception(Mode::Supervisor)(frame_ref);
    frame
}

pub extern "C" fn machine_interrupt() {
    let cause = MachineTrap.cause();
    handlers().interrupt(Mode::Machine, cause.code())();
}

pub extern "C" fn supervisor_interrupt() {
    let cause = SupervisorTrap.cause();
    handlers().interrupt(Mode::Supervisor, cause.code())();
}

pub extern "C" fn user_interrupt() {
    handlers().interrupt(Mode::User, user_cause().code())();
}
