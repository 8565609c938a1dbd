//! Policy for synchronous exceptions.
//!
//! The exception stub hands the saved [`TrapFrame`] to the registered
//! exception handler, which normally wraps a [`Dispatcher`]. Environment calls
//! are serviced and resumed after the `ecall`; every other cause sends the
//! hart back to its restart entry.

use crate::gateway::CallId;
use crate::{Mode, TrapControl, TrapFrame, TrapKind, TrapStats};

/// Width of `ecall`; compressed instructions are never used for it.
pub const INSTRUCTION_WIDTH: usize = 4;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Disposition {
    /// Environment call from the dispatcher's own mode. Carries the call id
    /// when it was a known one.
    Serviced(Option<CallId>),
    /// Environment call from a less privileged mode, skipped.
    PassedThrough,
    /// Unrecognized cause; the trap returns to the restart entry.
    Restart,
}

pub struct Dispatcher<'a, C: TrapControl> {
    control: C,
    stats: &'a TrapStats,
    restart_entry: usize,
}

impl<'a, C: TrapControl> Dispatcher<'a, C> {
    pub const fn new(control: C, stats: &'a TrapStats, restart_entry: usize) -> Self {
        Self {
            control,
            stats,
            restart_entry,
        }
    }

    pub fn mode(&self) -> Mode {
        self.control.mode()
    }

    /// Decide what the trap does. The trap return instruction resumes at the
    /// program counter left in the control block.
    pub fn handle(&self, frame: &mut TrapFrame) -> Disposition {
        // Interrupts stay masked until the trap returns.
        self.control.disable_interrupts();

        let cause = self.control.cause();
        let epc = self.control.epc();
        let mode = self.control.mode();

        let caller = match cause.kind {
            TrapKind::Exception(exception) => Mode::of_env_call(exception),
            TrapKind::Interrupt(_) => None,
        };

        match caller {
            Some(caller) if caller == mode => {
                let calls = self.stats.count_call();
                let id = CallId::try_from(frame.last_arg()).ok();
                if id == Some(CallId::IncrementCount) {
                    frame.set_return_value(frame.return_value().wrapping_add(1));
                }
                self.control.set_epc(epc.wrapping_add(INSTRUCTION_WIDTH));
                log::trace!("{mode:?} ecall {id:?} at {epc:#x}, call #{calls}");
                Disposition::Serviced(id)
            }
            Some(caller) if caller < mode => {
                self.control.set_epc(epc.wrapping_add(INSTRUCTION_WIDTH));
                Disposition::PassedThrough
            }
            _ => {
                log::warn!(
                    "{mode:?} trap {:?} (cause {:#x}, tval {:#x}) at {epc:#x}, restarting",
                    cause.kind,
                    cause.bits,
                    cause.info
                );
                self.control.set_epc(self.restart_entry);
                Disposition::Restart
            }
        }
    }
}
