#![no_std]
#![no_main]

#[macro_use]
mod console;
mod config;
mod lang;
mod logging;
mod trap;

use config::{BOOT_STACK_SIZE, REPORT_EVERY};
use core::arch::naked_asm;
use ::trap::gateway::ecall;
use ::trap::CallId;

/// clear BSS segment
pub fn clear_bss() {
    extern "C" {
        fn sbss();
        fn ebss();
    }
    unsafe {
        core::slice::from_raw_parts_mut(sbss as usize as *mut u8, ebss as usize - sbss as usize)
            .fill(0);
    }
}

#[no_mangle]
#[link_section = ".bss.stack"]
static BOOT_STACK: [u8; BOOT_STACK_SIZE] = [0; BOOT_STACK_SIZE];

/// Reset vector, and the target of a cold restart after an unrecognized trap.
#[link_section = ".text.entry"]
#[no_mangle]
#[unsafe(naked)]
pub unsafe extern "C" fn _enter() -> ! {
    naked_asm!(
        "
        la sp, {stack}
        li t0, {size}
        add sp, sp, t0
        call {boot}
        ",
        stack = sym BOOT_STACK,
        size = const BOOT_STACK_SIZE,
        boot = sym boot,
    )
}

extern "C" fn boot() -> ! {
    clear_bss();
    board::device_init();
    logging::init();
    if let Err(e) = trap::init() {
        panic!("trap setup failed: {e:?}");
    }
    println!("[firmware] trap layer ready");

    let mut local: usize = 0;
    loop {
        unsafe { riscv::asm::wfi() };
        local = ecall(CallId::IncrementCount, local);
        if local % REPORT_EVERY == 0 {
            log::info!(
                "{} increments, {} calls serviced, last tick {}",
                local,
                trap::STATS.call_count(),
                trap::STATS.timestamp()
            );
        }
    }
}
