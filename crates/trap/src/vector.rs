//! Vector table layout, base register encoding and table emission.
//!
//! In vectored mode the hart jumps to `base + 4 * cause` for interrupts and
//! to `base` for every synchronous exception. The low two bits of the base
//! register select the mode, so the table must sit on an alignment that
//! covers every slot it uses.

use core::fmt;

use crate::cause::PLATFORM_IRQ_BASE;
use crate::{Interrupt, Mode, TrapCause};

pub const SLOT_WIDTH: usize = 4;
pub const DEFAULT_ALIGNMENT: usize = 256;
pub const DEFAULT_PLATFORM_IRQS: usize = 16;
/// Slots of the largest table that fits the default alignment.
pub const MAX_SLOTS: usize = DEFAULT_ALIGNMENT / SLOT_WIDTH;
pub const MAX_PLATFORM_IRQS: usize = MAX_SLOTS - PLATFORM_IRQ_BASE;

const MODE_MASK: usize = 0b11;
const MODE_VECTORED: usize = 0b01;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Slot {
    /// Shared stub that saves a frame and runs the exception handler.
    Exception,
    Interrupt(Interrupt),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum VectorError {
    BadAlignment(usize),
    TableTooLarge { span: usize, align: usize },
    TooManySlots(usize),
    MisalignedBase { address: usize, align: usize },
}

impl fmt::Display for VectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadAlignment(align) => {
                write!(f, "alignment {align} is not a power of two of at least 4")
            }
            Self::TableTooLarge { span, align } => {
                write!(f, "table spans {span} bytes but is aligned to {align}")
            }
            Self::TooManySlots(slots) => write!(f, "{slots} slots exceed the limit of {MAX_SLOTS}"),
            Self::MisalignedBase { address, align } => {
                write!(f, "table base {address:#x} is not aligned to {align}")
            }
        }
    }
}

/// Which slots a mode's table defines.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct VectorLayout {
    mode: Mode,
    platform_irqs: usize,
}

impl VectorLayout {
    /// Platform lines only exist in the machine table.
    pub const fn new(mode: Mode, platform_irqs: usize) -> Self {
        let platform_irqs = match mode {
            Mode::Machine => platform_irqs,
            _ => 0,
        };
        Self {
            mode,
            platform_irqs,
        }
    }

    pub const fn machine(platform_irqs: usize) -> Self {
        Self::new(Mode::Machine, platform_irqs)
    }

    pub const fn supervisor() -> Self {
        Self::new(Mode::Supervisor, 0)
    }

    /// No exception stub: slot 0 is the user software interrupt.
    pub const fn user() -> Self {
        Self::new(Mode::User, 0)
    }

    pub const fn mode(&self) -> Mode {
        self.mode
    }

    pub const fn platform_irqs(&self) -> usize {
        self.platform_irqs
    }

    pub const fn slot(&self, index: usize) -> Option<Slot> {
        match (self.mode, index) {
            (Mode::User, 0) => Some(Slot::Interrupt(Interrupt::UserSoft)),
            (Mode::User, 4) => Some(Slot::Interrupt(Interrupt::UserTimer)),
            (Mode::User, 8) => Some(Slot::Interrupt(Interrupt::UserExternal)),
            (Mode::User, _) => None,
            (_, 0) => Some(Slot::Exception),
            (_, 1) => Some(Slot::Interrupt(Interrupt::SupervisorSoft)),
            (_, 5) => Some(Slot::Interrupt(Interrupt::SupervisorTimer)),
            (_, 9) => Some(Slot::Interrupt(Interrupt::SupervisorExternal)),
            (Mode::Machine, 3) => Some(Slot::Interrupt(Interrupt::MachineSoft)),
            (Mode::Machine, 7) => Some(Slot::Interrupt(Interrupt::MachineTimer)),
            (Mode::Machine, 11) => Some(Slot::Interrupt(Interrupt::MachineExternal)),
            (Mode::Machine, line)
                if line >= PLATFORM_IRQ_BASE
                    && line - PLATFORM_IRQ_BASE < self.platform_irqs =>
            {
                Some(Slot::Interrupt(Interrupt::Platform(line - PLATFORM_IRQ_BASE)))
            }
            _ => None,
        }
    }

    pub const fn highest_slot(&self) -> usize {
        match self.mode {
            Mode::Machine if self.platform_irqs > 0 => {
                (PLATFORM_IRQ_BASE - 1).saturating_add(self.platform_irqs)
            }
            Mode::Machine => 11,
            Mode::Supervisor => 9,
            Mode::User => 8,
        }
    }

    /// Bytes from the table base to the end of the last used slot.
    pub const fn span(&self) -> usize {
        self.highest_slot()
            .saturating_add(1)
            .saturating_mul(SLOT_WIDTH)
    }

    pub const fn check(&self, align: usize) -> Result<(), VectorError> {
        if !align.is_power_of_two() || align < SLOT_WIDTH {
            return Err(VectorError::BadAlignment(align));
        }
        if self.highest_slot() >= MAX_SLOTS {
            return Err(VectorError::TooManySlots(self.highest_slot().saturating_add(1)));
        }
        if self.span() > align {
            return Err(VectorError::TableTooLarge {
                span: self.span(),
                align,
            });
        }
        Ok(())
    }

    /// [`check`](Self::check) for `const` items: a bad table fails the build.
    pub const fn assert_fits(&self, align: usize) {
        match self.check(align) {
            Ok(()) => {}
            Err(VectorError::BadAlignment(_)) => {
                panic!("vector table alignment must be a power of two of at least 4 bytes")
            }
            Err(VectorError::TooManySlots(_)) => panic!("vector table has too many slots"),
            Err(_) => panic!("vector table does not fit inside its alignment"),
        }
    }

    pub fn slots(&self) -> impl Iterator<Item = (usize, Slot)> {
        let layout = *self;
        (0..=layout.highest_slot()).filter_map(move |index| Some((index, layout.slot(index)?)))
    }

    /// The slot the hart jumps to for `cause`.
    pub fn route(&self, cause: &TrapCause) -> Option<Slot> {
        if cause.is_interrupt() {
            self.slot(cause.code())
        } else {
            self.slot(0)
        }
    }
}

/// Trap vector base register value in vectored mode.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct VectorBase(usize);

impl VectorBase {
    pub fn vectored(address: usize, align: usize) -> Result<Self, VectorError> {
        if !align.is_power_of_two() || align < SLOT_WIDTH {
            return Err(VectorError::BadAlignment(align));
        }
        if address & (align - 1) != 0 {
            return Err(VectorError::MisalignedBase { address, align });
        }
        Ok(Self(address | MODE_VECTORED))
    }

    pub const fn bits(&self) -> usize {
        self.0
    }

    pub const fn address(&self) -> usize {
        self.0 & !MODE_MASK
    }

    pub const fn is_vectored(&self) -> bool {
        self.0 & MODE_MASK == MODE_VECTORED
    }
}

/// Emits a vector table for one mode into `.text.trap.<name>`.
///
/// Slot 0 of the machine and supervisor tables enters the exception stub,
/// which saves a [`TrapFrame`](crate::TrapFrame), calls the registered
/// exception handler and restores the frame it returns. Every other slot
/// enters the interrupt stub, which preserves the caller-saved registers and
/// calls the registered handler for the cause. Undefined slots land there as
/// well and reach a nop handler.
///
/// ```ignore
/// trap::vector_table!(machine riscv_mtvec_table, align = 256, platform_irqs = 16);
/// trap::vector_table!(supervisor riscv_stvec_table, align = 256);
/// trap::vector_table!(user riscv_utvec_table, align = 256);
/// ```
#[macro_export]
macro_rules! vector_table {
    (machine $name:ident, align = $align:expr, platform_irqs = $irqs:expr $(,)?) => {
        const _: () = $crate::VectorLayout::machine($irqs).assert_fits($align);
        $crate::__vector_table!(
            $name,
            $align,
            15 + $irqs,
            $crate::entry::machine_exception,
            $crate::entry::machine_interrupt,
            "mret"
        );
    };
    (supervisor $name:ident, align = $align:expr $(,)?) => {
        const _: () = $crate::VectorLayout::supervisor().assert_fits($align);
        $crate::__vector_table!(
            $name,
            $align,
            9,
            $crate::entry::supervisor_exception,
            $crate::entry::supervisor_interrupt,
            "sret"
        );
    };
    (user $name:ident, align = $align:expr $(,)?) => {
        const _: () = $crate::VectorLayout::user().assert_fits($align);
        core::arch::global_asm!(
            concat!(".pushsection .text.trap.", stringify!($name), ",\"ax\",@progbits"),
            ".balign {align}",
            concat!(".global ", stringify!($name)),
            concat!(stringify!($name), ":"),
            ".option push",
            ".option norvc",
            ".rept 9",
            concat!("j ", stringify!($name), "_interrupt"),
            ".endr",
            ".option pop",
            concat!(stringify!($name), "_interrupt:"),
            // Stands in for an interrupt-attribute prologue; the frame is not handed on.
            $crate::save_frame!(),
            "call {interrupt}",
            $crate::restore_frame!(),
            // uret
            ".word 0x00200073",
            ".popsection",
            align = const $align,
            interrupt = sym $crate::entry::user_interrupt,
        );
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __vector_table {
    ($name:ident, $align:expr, $rest:expr, $exception:path, $interrupt:path, $ret:literal) => {
        core::arch::global_asm!(
            concat!(".pushsection .text.trap.", stringify!($name), ",\"ax\",@progbits"),
            ".balign {align}",
            concat!(".global ", stringify!($name)),
            concat!(stringify!($name), ":"),
            ".option push",
            ".option norvc",
            concat!("j ", stringify!($name), "_exception"),
            ".rept {rest}",
            concat!("j ", stringify!($name), "_interrupt"),
            ".endr",
            ".option pop",
            concat!(stringify!($name), "_exception:"),
            $crate::save_frame!(),
            "mv a0, sp",
            "call {exception}",
            "mv sp, a0",
            $crate::restore_frame!(),
            concat!($ret),
            concat!(stringify!($name), "_interrupt:"),
            // Stands in for an interrupt-attribute prologue; the frame is not handed on.
            $crate::save_frame!(),
            "call {interrupt}",
            $crate::restore_frame!(),
            concat!($ret),
            ".popsection",
            align = const $align,
            rest = const $rest,
            exception = sym $exception,
            interrupt = sym $interrupt,
        );
    };
}
