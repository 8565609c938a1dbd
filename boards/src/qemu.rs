use crate::{Clint, CharDevice, Console, Exit, Ns16550a, TestDevice};

const VIRT_TEST: usize = 0x10_0000; // sifive test finisher
const VIRT_CLINT: usize = 0x200_0000; // core local interrupter
const VIRT_UART: usize = 0x1000_0000; // UART0

pub static CONSOLE: Console<Ns16550a> = Console::new(unsafe { Ns16550a::new(VIRT_UART) });

pub static CLINT: Clint = unsafe { Clint::new(VIRT_CLINT) };

static TEST_DEVICE: TestDevice = unsafe { TestDevice::new(VIRT_TEST) };

pub fn device_init() {
    CONSOLE.lock().init();
}

pub fn shutdown(failure: bool) -> ! {
    TEST_DEVICE.exit(if failure { Exit::Fail(1) } else { Exit::Pass })
}
