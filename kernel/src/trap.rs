use board::{Clint, CLINT};
use trap::timer::{rearm, seconds_to_ticks};
use trap::{
    Dispatcher, Handlers, Interrupt, MachineTrap, Mode, RegistryError, SupervisorTrap,
    TrapControl, TrapFrame, TrapStats, VectorBase, VectorError,
};

use crate::config::{PLATFORM_IRQS, TIMER_INTERVAL_SECONDS, VECTOR_TABLE_ALIGNMENT};

pub static STATS: TrapStats = TrapStats::new();

trap::vector_table!(
    machine riscv_mtvec_table,
    align = VECTOR_TABLE_ALIGNMENT,
    platform_irqs = PLATFORM_IRQS,
);
trap::vector_table!(supervisor riscv_stvec_table, align = VECTOR_TABLE_ALIGNMENT);
trap::vector_table!(user riscv_utvec_table, align = VECTOR_TABLE_ALIGNMENT);

extern "C" {
    fn riscv_mtvec_table();
    fn riscv_stvec_table();
    fn riscv_utvec_table();
}

#[derive(Debug)]
pub enum InitError {
    Vector(VectorError),
    Registry(RegistryError),
}

impl From<VectorError> for InitError {
    fn from(e: VectorError) -> Self {
        InitError::Vector(e)
    }
}

impl From<RegistryError> for InitError {
    fn from(e: RegistryError) -> Self {
        InitError::Registry(e)
    }
}

fn restart_entry() -> usize {
    crate::_enter as usize
}

fn machine_exception(frame: &mut TrapFrame) {
    Dispatcher::new(MachineTrap, &STATS, restart_entry()).handle(frame);
}

fn supervisor_exception(frame: &mut TrapFrame) {
    Dispatcher::new(SupervisorTrap, &STATS, restart_entry()).handle(frame);
}

fn machine_timer() {
    rearm(&CLINT, &STATS, seconds_to_ticks::<Clint>(TIMER_INTERVAL_SECONDS));
}

pub fn init() -> Result<(), InitError> {
    let control = MachineTrap;
    control.disable_interrupts();
    for source in [
        Interrupt::MachineSoft,
        Interrupt::MachineTimer,
        Interrupt::MachineExternal,
        Interrupt::SupervisorSoft,
        Interrupt::SupervisorTimer,
        Interrupt::SupervisorExternal,
    ] {
        control.disable_source(source);
    }

    let mut handlers = Handlers::new();
    handlers
        .set_exception(Mode::Machine, machine_exception)?
        .set_exception(Mode::Supervisor, supervisor_exception)?
        .set_interrupt(Mode::Machine, Interrupt::MachineTimer, machine_timer)?;
    // A cold restart clears .bss first, so this installs again.
    trap::registry::install(handlers)?;

    let base = VectorBase::vectored(riscv_mtvec_table as usize, VECTOR_TABLE_ALIGNMENT)?;
    control.set_trap_entry(base);
    log::info!("machine vector table at {:#x}", base.address());
    // Emitted for completeness; nothing delegates traps to the lower modes.
    for (name, table) in [
        ("supervisor", riscv_stvec_table as usize),
        ("user", riscv_utvec_table as usize),
    ] {
        let base = VectorBase::vectored(table, VECTOR_TABLE_ALIGNMENT)?;
        log::debug!("{name} vector table at {:#x}", base.address());
    }

    control.enable_source(Interrupt::MachineTimer);
    machine_timer();
    control.enable_interrupts();
    Ok(())
}
