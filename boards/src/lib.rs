#![cfg_attr(not(test), no_std)]
mod clint;
mod console;
mod ns16550a;
mod qemu;
mod test_device;

pub use clint::Clint;
pub use console::Console;
pub use ns16550a::Ns16550a;
pub use qemu::{device_init, shutdown, CLINT, CONSOLE};
pub use test_device::{Exit, TestDevice};

pub trait CharDevice {
    fn init(&self);
    fn write(&self, ch: u8);
}
