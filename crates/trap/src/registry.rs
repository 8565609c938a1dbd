//! Handler table consulted by the trap entry points.
//!
//! Every slot starts out as a nop. The program fills in the slots it cares
//! about and installs the table once, before it enables interrupts; after
//! that the table is read without locking and never changes.

use core::fmt;

use spin::Once;

use crate::vector::{Slot, VectorLayout, MAX_PLATFORM_IRQS, MAX_SLOTS};
use crate::{Interrupt, Mode, TrapFrame};

pub type ExceptionHandler = fn(&mut TrapFrame);
pub type InterruptHandler = fn();

fn nop_exception(_frame: &mut TrapFrame) {}

fn nop_interrupt() {}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RegistryError {
    AlreadyInstalled,
    NoExceptionSlot(Mode),
    NoSuchSlot { mode: Mode, source: Interrupt },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyInstalled => write!(f, "trap handlers are already installed"),
            Self::NoExceptionSlot(mode) => write!(f, "{mode:?} table has no exception slot"),
            Self::NoSuchSlot { mode, source } => {
                write!(f, "{mode:?} table has no slot for {source:?}")
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct ModeHandlers {
    exception: ExceptionHandler,
    interrupts: [InterruptHandler; MAX_SLOTS],
}

impl ModeHandlers {
    const fn new() -> Self {
        Self {
            exception: nop_exception,
            interrupts: [nop_interrupt as InterruptHandler; MAX_SLOTS],
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Handlers {
    machine: ModeHandlers,
    supervisor: ModeHandlers,
    user: ModeHandlers,
}

impl Handlers {
    pub const fn new() -> Self {
        Self {
            machine: ModeHandlers::new(),
            supervisor: ModeHandlers::new(),
            user: ModeHandlers::new(),
        }
    }

    fn of(&self, mode: Mode) -> &ModeHandlers {
        match mode {
            Mode::Machine => &self.machine,
            Mode::Supervisor => &self.supervisor,
            Mode::User => &self.user,
        }
    }

    fn of_mut(&mut self, mode: Mode) -> &mut ModeHandlers {
        match mode {
            Mode::Machine => &mut self.machine,
            Mode::Supervisor => &mut self.supervisor,
            Mode::User => &mut self.user,
        }
    }

    pub fn set_exception(
        &mut self,
        mode: Mode,
        handler: ExceptionHandler,
    ) -> Result<&mut Self, RegistryError> {
        if mode == Mode::User {
            return Err(RegistryError::NoExceptionSlot(mode));
        }
        self.of_mut(mode).exception = handler;
        Ok(self)
    }

    /// Override the handler of one interrupt slot of `mode`'s table.
    pub fn set_interrupt(
        &mut self,
        mode: Mode,
        source: Interrupt,
        handler: InterruptHandler,
    ) -> Result<&mut Self, RegistryError> {
        let layout = VectorLayout::new(mode, MAX_PLATFORM_IRQS);
        let index = source
            .code()
            .filter(|&index| layout.slot(index) == Some(Slot::Interrupt(source)))
            .ok_or(RegistryError::NoSuchSlot { mode, source })?;
        self.of_mut(mode).interrupts[index] = handler;
        Ok(self)
    }

    pub fn exception(&self, mode: Mode) -> ExceptionHandler {
        self.of(mode).exception
    }

    /// Handler for slot `index`; slots outside any table resolve to a nop.
    pub fn interrupt(&self, mode: Mode, index: usize) -> InterruptHandler {
        self.of(mode)
            .interrupts
            .get(index)
            .copied()
            .unwrap_or(nop_interrupt)
    }
}

impl Default for Handlers {
    fn default() -> Self {
        Self::new()
    }
}

static DEFAULTS: Handlers = Handlers::new();
static INSTALLED: Once<Handlers> = Once::new();

/// Publish `handlers` for the trap entry points. Only the first call wins.
pub fn install(handlers: Handlers) -> Result<&'static Handlers, RegistryError> {
    let mut fresh = false;
    let installed = INSTALLED.call_once(|| {
        fresh = true;
        handlers
    });
    if !fresh {
        return Err(RegistryError::AlreadyInstalled);
    }
    log::info!("trap handlers installed");
    Ok(installed)
}

/// The installed table, or the all-nop defaults before [`install`].
pub fn handlers() -> &'static Handlers {
    INSTALLED.get().unwrap_or(&DEFAULTS)
}
