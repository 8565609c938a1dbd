pub const BOOT_STACK_SIZE: usize = 4096 * 4;
/// Alignment shared by the three vector tables.
pub const VECTOR_TABLE_ALIGNMENT: usize = 256;
/// Platform interrupt lines routed through the machine table.
pub const PLATFORM_IRQS: usize = 16;
pub const TIMER_INTERVAL_SECONDS: u64 = 1;
/// Main loop iterations between two progress lines.
pub const REPORT_EVERY: usize = 10;
