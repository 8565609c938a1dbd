use core::panic::PanicInfo;

use crate::console::try_print;

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    if let Some(location) = info.location() {
        try_print(format_args!(
            "[firmware] Panicked at {}:{} {}\n",
            location.file(),
            location.line(),
            info.message()
        ));
    } else {
        try_print(format_args!("[firmware] Panicked: {}\n", info.message()));
    }
    board::shutdown(true)
}
