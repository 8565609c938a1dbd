use board::CONSOLE;
use core::fmt;

pub fn print(args: fmt::Arguments) {
    // The UART writer never fails.
    let _ = CONSOLE.write_fmt(args);
}

/// [`print`] for trap and panic context: drops the line instead of spinning
/// on a lock the interrupted code may hold.
pub fn try_print(args: fmt::Arguments) -> bool {
    CONSOLE.try_write_fmt(args).is_some()
}

#[macro_export]
macro_rules! print {
    ($fmt: literal $(, $($arg: tt)+)?) => {
        $crate::console::print(format_args!($fmt $(, $($arg)+)?));
    }
}

#[macro_export]
macro_rules! println {
    ($fmt: literal $(, $($arg: tt)+)?) => {
        $crate::console::print(format_args!(concat!($fmt, "\n") $(, $($arg)+)?));
    }
}
