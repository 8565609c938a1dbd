use crate::{Exception, Interrupt, TrapCause, TrapKind};

/// First cause code of the platform-specific interrupt lines.
pub const PLATFORM_IRQ_BASE: usize = 16;

const INTERRUPT_BIT: usize = 1 << (usize::BITS - 1);

/// Privilege mode, ordered from least to most privileged.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Mode {
    User = 0,
    Supervisor = 1,
    Machine = 3,
}

impl Mode {
    /// The exception raised by `ecall` executed in this mode.
    pub const fn env_call(self) -> Exception {
        match self {
            Mode::User => Exception::UserEnvCall,
            Mode::Supervisor => Exception::SupervisorEnvCall,
            Mode::Machine => Exception::MachineEnvCall,
        }
    }

    /// The mode an environment call was issued from, if `exception` is one.
    pub const fn of_env_call(exception: Exception) -> Option<Mode> {
        match exception {
            Exception::UserEnvCall => Some(Mode::User),
            Exception::SupervisorEnvCall => Some(Mode::Supervisor),
            Exception::MachineEnvCall => Some(Mode::Machine),
            _ => None,
        }
    }
}

impl TrapCause {
    pub fn from_bits(bits: usize, info: usize) -> Self {
        let code = bits & !INTERRUPT_BIT;
        let kind = if bits & INTERRUPT_BIT != 0 {
            TrapKind::Interrupt(code.into())
        } else {
            TrapKind::Exception(code.into())
        };
        Self { kind, bits, info }
    }

    pub const fn is_interrupt(&self) -> bool {
        self.bits & INTERRUPT_BIT != 0
    }

    /// Cause code with the interrupt bit stripped.
    pub const fn code(&self) -> usize {
        self.bits & !INTERRUPT_BIT
    }
}

impl Interrupt {
    pub const fn code(self) -> Option<usize> {
        match self {
            Self::UserSoft => Some(0),
            Self::SupervisorSoft => Some(1),
            Self::MachineSoft => Some(3),
            Self::UserTimer => Some(4),
            Self::SupervisorTimer => Some(5),
            Self::MachineTimer => Some(7),
            Self::UserExternal => Some(8),
            Self::SupervisorExternal => Some(9),
            Self::MachineExternal => Some(11),
            // Lines whose code would reach the interrupt bit have no cause code.
            Self::Platform(line) => match PLATFORM_IRQ_BASE.checked_add(line) {
                Some(code) if code < INTERRUPT_BIT => Some(code),
                _ => None,
            },
            Self::Unknown => None,
        }
    }

    /// Raw cause register value for this interrupt.
    pub const fn cause_bits(self) -> Option<usize> {
        match self.code() {
            Some(code) => Some(code | INTERRUPT_BIT),
            None => None,
        }
    }
}

impl Exception {
    pub const fn code(self) -> Option<usize> {
        match self {
            Self::InstructionMisaligned => Some(0),
            Self::InstructionFault => Some(1),
            Self::IllegalInstruction => Some(2),
            Self::Breakpoint => Some(3),
            Self::LoadMisaligned => Some(4),
            Self::LoadFault => Some(5),
            Self::StoreMisaligned => Some(6),
            Self::StoreFault => Some(7),
            Self::UserEnvCall => Some(8),
            Self::SupervisorEnvCall => Some(9),
            Self::MachineEnvCall => Some(11),
            Self::InstructionPageFault => Some(12),
            Self::LoadPageFault => Some(13),
            Self::StorePageFault => Some(15),
            Self::Unknown => None,
        }
    }
}

impl From<usize> for Interrupt {
    fn from(value: usize) -> Self {
        match value {
            0 => Self::UserSoft,
            1 => Self::SupervisorSoft,
            3 => Self::MachineSoft,
            4 => Self::UserTimer,
            5 => Self::SupervisorTimer,
            7 => Self::MachineTimer,
            8 => Self::UserExternal,
            9 => Self::SupervisorExternal,
            11 => Self::MachineExternal,
            line if line >= PLATFORM_IRQ_BASE => Self::Platform(line - PLATFORM_IRQ_BASE),
            _ => Self::Unknown,
        }
    }
}

impl From<usize> for Exception {
    fn from(value: usize) -> Self {
        match value {
            0 => Self::InstructionMisaligned,
            1 => Self::InstructionFault,
            2 => Self::IllegalInstruction,
            3 => Self::Breakpoint,
            4 => Self::LoadMisaligned,
            5 => Self::LoadFault,
            6 => Self::StoreMisaligned,
            7 => Self::StoreFault,
            8 => Self::UserEnvCall,
            9 => Self::SupervisorEnvCall,
            11 => Self::MachineEnvCall,
            12 => Self::InstructionPageFault,
            13 => Self::LoadPageFault,
            15 => Self::StorePageFault,
            _ => Self::Unknown,
        }
    }
}
