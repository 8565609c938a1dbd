//! Registers preserved across a trap, and the assembly that saves and
//! restores them.
//!
//! Only caller-saved registers are tracked: anything a called Rust function
//! preserves itself (`s0`-`s11`) is left alone, and `sp`/`gp`/`tp` never
//! change inside a single binary. The save sequence is the first thing the
//! exception stub runs, so it may only touch `sp` before every tracked
//! register has been stored.

use core::mem::size_of;

// The frame must cover exactly the registers the compiler may clobber.
#[cfg(all(
    feature = "rve",
    any(target_arch = "riscv32", target_arch = "riscv64"),
    not(target_feature = "e")
))]
compile_error!("the `rve` feature needs a target with the reduced register file (RV32E)");
#[cfg(all(not(feature = "rve"), target_feature = "e"))]
compile_error!("targets with the reduced register file need the `rve` feature");

#[cfg(not(feature = "rve"))]
pub const ARG_REGS: usize = 8;
#[cfg(feature = "rve")]
pub const ARG_REGS: usize = 4;

/// Index into [`TrapFrame::a`] of the register carrying the call id.
pub const LAST_ARG: usize = ARG_REGS - 1;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrapFrame {
    pub ra: usize, // 0
    pub t0: usize, // 1
    pub t1: usize, // 2
    #[cfg(not(feature = "rve"))]
    pub t2: usize, // 3
    pub a: [usize; ARG_REGS],
    #[cfg(not(feature = "rve"))]
    pub t3: usize, // 12
    #[cfg(not(feature = "rve"))]
    pub t4: usize, // 13
    #[cfg(not(feature = "rve"))]
    pub t5: usize, // 14
    #[cfg(not(feature = "rve"))]
    pub t6: usize, // 15
    #[cfg(feature = "rve")]
    _pad: usize, // 7
}

/// Registers the codec stores.
#[cfg(not(feature = "rve"))]
pub const SAVED_REGS: usize = 16;
#[cfg(feature = "rve")]
pub const SAVED_REGS: usize = 7;

/// Stack alignment required at every `call`.
pub const STACK_ALIGN: usize = 16;

pub const FRAME_SLOTS: usize = size_of::<TrapFrame>() / size_of::<usize>();
pub const FRAME_SIZE: usize = size_of::<TrapFrame>();

// The literal slot count in `save_frame!`/`restore_frame!` must follow the struct.
#[cfg(not(feature = "rve"))]
const _: () = assert!(FRAME_SLOTS == 16);
#[cfg(feature = "rve")]
const _: () = assert!(FRAME_SLOTS == 8);
const _: () = assert!(FRAME_SIZE % STACK_ALIGN == 0);

impl TrapFrame {
    pub const fn arg(&self, index: usize) -> usize {
        self.a[index]
    }

    pub fn set_arg(&mut self, index: usize, value: usize) {
        self.a[index] = value;
    }

    /// The last argument register (`a7`, or `a3` on the reduced register file).
    pub const fn last_arg(&self) -> usize {
        self.a[LAST_ARG]
    }

    pub const fn return_value(&self) -> usize {
        self.a[0]
    }

    pub fn set_return_value(&mut self, value: usize) {
        self.a[0] = value;
    }
}

#[doc(hidden)]
#[macro_export]
#[cfg(target_pointer_width = "64")]
macro_rules! __trap_word {
    () => {
        "8"
    };
}

#[doc(hidden)]
#[macro_export]
#[cfg(target_pointer_width = "32")]
macro_rules! __trap_word {
    () => {
        "4"
    };
}

#[doc(hidden)]
#[macro_export]
#[cfg(target_pointer_width = "64")]
macro_rules! __trap_save {
    ($reg:ident => $ptr:ident[$pos:literal]) => {
        concat!(
            "sd ",
            stringify!($reg),
            ", 8*",
            $pos,
            '(',
            stringify!($ptr),
            ")\n"
        )
    };
}

#[doc(hidden)]
#[macro_export]
#[cfg(target_pointer_width = "32")]
macro_rules! __trap_save {
    ($reg:ident => $ptr:ident[$pos:literal]) => {
        concat!(
            "sw ",
            stringify!($reg),
            ", 4*",
            $pos,
            '(',
            stringify!($ptr),
            ")\n"
        )
    };
}

#[doc(hidden)]
#[macro_export]
#[cfg(target_pointer_width = "64")]
macro_rules! __trap_load {
    ($ptr:ident[$pos:literal] => $reg:ident) => {
        concat!(
            "ld ",
            stringify!($reg),
            ", 8*",
            $pos,
            '(',
            stringify!($ptr),
            ")\n"
        )
    };
}

#[doc(hidden)]
#[macro_export]
#[cfg(target_pointer_width = "32")]
macro_rules! __trap_load {
    ($ptr:ident[$pos:literal] => $reg:ident) => {
        concat!(
            "lw ",
            stringify!($reg),
            ", 4*",
            $pos,
            '(',
            stringify!($ptr),
            ")\n"
        )
    };
}

/// Assembly reserving a [`TrapFrame`] on the current stack and storing every
/// tracked register into it.
#[macro_export]
#[cfg(not(feature = "rve"))]
macro_rules! save_frame {
    () => {
        concat!(
            "addi sp, sp, -16*",
            $crate::__trap_word!(),
            "\n",
            $crate::__trap_save!(ra => sp[0]),
            $crate::__trap_save!(t0 => sp[1]),
            $crate::__trap_save!(t1 => sp[2]),
            $crate::__trap_save!(t2 => sp[3]),
            $crate::__trap_save!(a0 => sp[4]),
            $crate::__trap_save!(a1 => sp[5]),
            $crate::__trap_save!(a2 => sp[6]),
            $crate::__trap_save!(a3 => sp[7]),
            $crate::__trap_save!(a4 => sp[8]),
            $crate::__trap_save!(a5 => sp[9]),
            $crate::__trap_save!(a6 => sp[10]),
            $crate::__trap_save!(a7 => sp[11]),
            $crate::__trap_save!(t3 => sp[12]),
            $crate::__trap_save!(t4 => sp[13]),
            $crate::__trap_save!(t5 => sp[14]),
            $crate::__trap_save!(t6 => sp[15]),
        )
    };
}

/// Mirror of [`save_frame!`]: reload every tracked register and release the
/// frame.
#[macro_export]
#[cfg(not(feature = "rve"))]
macro_rules! restore_frame {
    () => {
        concat!(
            $crate::__trap_load!(sp[0] => ra),
            $crate::__trap_load!(sp[1] => t0),
            $crate::__trap_load!(sp[2] => t1),
            $crate::__trap_load!(sp[3] => t2),
            $crate::__trap_load!(sp[4] => a0),
            $crate::__trap_load!(sp[5] => a1),
            $crate::__trap_load!(sp[6] => a2),
            $crate::__trap_load!(sp[7] => a3),
            $crate::__trap_load!(sp[8] => a4),
            $crate::__trap_load!(sp[9] => a5),
            $crate::__trap_load!(sp[10] => a6),
            $crate::__trap_load!(sp[11] => a7),
            $crate::__trap_load!(sp[12] => t3),
            $crate::__trap_load!(sp[13] => t4),
            $crate::__trap_load!(sp[14] => t5),
            $crate::__trap_load!(sp[15] => t6),
            "addi sp, sp, 16*",
            $crate::__trap_word!(),
            "\n",
        )
    };
}

#[macro_export]
#[cfg(feature = "rve")]
macro_rules! save_frame {
    () => {
        concat!(
            "addi sp, sp, -8*",
            $crate::__trap_word!(),
            "\n",
            $crate::__trap_save!(ra => sp[0]),
            $crate::__trap_save!(t0 => sp[1]),
            $crate::__trap_save!(t1 => sp[2]),
            $crate::__trap_save!(a0 => sp[3]),
            $crate::__trap_save!(a1 => sp[4]),
            $crate::__trap_save!(a2 => sp[5]),
            $crate::__trap_save!(a3 => sp[6]),
        )
    };
}

#[macro_export]
#[cfg(feature = "rve")]
macro_rules! restore_frame {
    () => {
        concat!(
            $crate::__trap_load!(sp[0] => ra),
            $crate::__trap_load!(sp[1] => t0),
            $crate::__trap_load!(sp[2] => t1),
            $crate::__trap_load!(sp[3] => a0),
            $crate::__trap_load!(sp[4] => a1),
            $crate::__trap_load!(sp[5] => a2),
            $crate::__trap_load!(sp[6] => a3),
            "addi sp, sp, 8*",
            $crate::__trap_word!(),
            "\n",
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{tracked_registers, SimulatedHart};

    const SAVE: &str = crate::save_frame!();
    const RESTORE: &str = crate::restore_frame!();

    fn seeded_hart() -> SimulatedHart {
        let mut hart = SimulatedHart::new(0x8000_4000);
        for (i, reg) in tracked_registers().iter().enumerate() {
            hart.set(reg, 0x1000 + i * 0x11);
        }
        hart
    }

    #[test]
    fn test_frame_size_matches_slots() {
        assert_eq!(FRAME_SIZE, FRAME_SLOTS * size_of::<usize>());
        assert_eq!(SAVED_REGS, tracked_registers().len());
        assert!(FRAME_SLOTS >= SAVED_REGS);
    }

    #[test]
    fn test_frame_keeps_stack_alignment() {
        let mut hart = seeded_hart();
        assert_eq!(hart.sp() % STACK_ALIGN, 0);

        hart.run(SAVE);

        assert_eq!(FRAME_SIZE % STACK_ALIGN, 0);
        assert_eq!(hart.sp() % STACK_ALIGN, 0, "sp at the handler call");
    }

    #[test]
    fn test_save_reserves_exactly_one_frame() {
        let mut hart = seeded_hart();
        hart.run(SAVE);

        assert_eq!(hart.sp(), 0x8000_4000 - FRAME_SIZE);
    }

    #[test]
    fn test_save_restore_roundtrip() {
        let mut hart = seeded_hart();
        let before = hart.clone();

        hart.run(SAVE);
        // Clobber everything the way a called handler may.
        for reg in tracked_registers() {
            hart.set(reg, 0xdead_beef);
        }
        hart.run(RESTORE);

        assert_eq!(hart.sp(), before.sp());
        for reg in tracked_registers() {
            assert_eq!(hart.get(reg), before.get(reg), "register {reg} not restored");
        }
    }

    #[test]
    fn test_saved_slots_match_struct_layout() {
        let mut hart = seeded_hart();
        hart.run(SAVE);

        let frame = hart.frame_at_sp();

        assert_eq!(frame.ra, hart.get("ra"));
        assert_eq!(frame.t0, hart.get("t0"));
        assert_eq!(frame.t1, hart.get("t1"));
        for i in 0..ARG_REGS {
            assert_eq!(frame.arg(i), hart.get(&format!("a{i}")));
        }
        #[cfg(not(feature = "rve"))]
        {
            assert_eq!(frame.t2, hart.get("t2"));
            assert_eq!(frame.t6, hart.get("t6"));
        }
    }

    #[test]
    fn test_restore_mirrors_save_order() {
        let stores = SimulatedHart::registers_in(SAVE);
        let loads = SimulatedHart::registers_in(RESTORE);

        assert_eq!(stores, loads);
        assert_eq!(stores, tracked_registers());
    }

    #[test]
    fn test_save_touches_only_sp_and_tracked_registers() {
        for line in SAVE.lines().chain(RESTORE.lines()) {
            let (op, _) = line.split_once(' ').unwrap();
            assert!(matches!(op, "addi" | "sd" | "ld" | "sw" | "lw"), "{line}");
        }
    }

    #[test]
    fn test_last_arg_is_call_register() {
        let mut frame = TrapFrame::default();
        frame.set_arg(LAST_ARG, 2);
        frame.set_return_value(9);

        assert_eq!(frame.last_arg(), 2);
        assert_eq!(frame.arg(0), 9);
    }
}
