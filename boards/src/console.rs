use core::fmt::{self, Write};

use spin::{Mutex, MutexGuard};

use crate::CharDevice;

/// A character device shared between normal code and trap handlers.
///
/// A formatted line holds the device lock until it is fully written, so
/// lines never interleave. Trap context must use [`Console::try_write_fmt`]:
/// the code it interrupted may hold the lock.
pub struct Console<D> {
    device: Mutex<D>,
}

struct Writer<'a, D>(&'a D);

impl<D: CharDevice> Write for Writer<'_, D> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            self.0.write(byte);
        }
        Ok(())
    }
}

impl<D: CharDevice> Console<D> {
    pub const fn new(device: D) -> Self {
        Self {
            device: Mutex::new(device),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, D> {
        self.device.lock()
    }

    pub fn write_fmt(&self, args: fmt::Arguments) -> fmt::Result {
        Writer(&*self.device.lock()).write_fmt(args)
    }

    /// Write the line unless the device is busy. Returns `None` when it was
    /// dropped.
    pub fn try_write_fmt(&self, args: fmt::Arguments) -> Option<fmt::Result> {
        let device = self.device.try_lock()?;
        Some(Writer(&*device).write_fmt(args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        bytes: RefCell<Vec<u8>>,
    }

    impl CharDevice for Recorder {
        fn init(&self) {}

        fn write(&self, ch: u8) {
            self.bytes.borrow_mut().push(ch);
        }
    }

    #[test]
    fn test_write_fmt() {
        let console = Console::new(Recorder::default());

        console.write_fmt(format_args!("tick {}\n", 3)).unwrap();

        assert_eq!(console.lock().bytes.borrow().as_slice(), b"tick 3\n");
    }

    #[test]
    fn test_try_write_drops_line_while_locked() {
        let console = Console::new(Recorder::default());

        let held = console.lock();
        assert!(console
            .try_write_fmt(format_args!("restarting"))
            .is_none());
        assert!(held.bytes.borrow().is_empty());
        drop(held);

        assert!(console.try_write_fmt(format_args!("ok")).is_some());
        assert_eq!(console.lock().bytes.borrow().as_slice(), b"ok");
    }
}
