use board::CLINT;
use log::{Level, LevelFilter, Log, Metadata, Record};
use trap::Timer;

const TICKS_PER_SECOND: u64 = board::Clint::TICKS_PER_SECOND;

struct GlobalLogger;

impl Log for GlobalLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let color = match record.level() {
            Level::Error => 31, // Red
            Level::Warn => 93,  // BrightYellow
            Level::Info => 34,  // Blue
            Level::Debug => 32, // Green
            Level::Trace => 90, // BrightBlack
        };

        let ticks = CLINT.now();
        let seconds = ticks / TICKS_PER_SECOND;
        let millis = ticks % TICKS_PER_SECOND * 1000 / TICKS_PER_SECOND;

        // Records also come from trap handlers; never wait for the console.
        crate::console::try_print(format_args!(
            "\u{1B}[95m[{:>5}.{:03}]\u{1B}[0m \u{1B}[{}m{}\u{1B}[37m | {}\u{1B}[0m\n",
            seconds,
            millis,
            color,
            normalized_loglevel(record.level()),
            record.args(),
        ));
    }

    fn flush(&self) {}
}

fn normalized_loglevel(level: Level) -> &'static str {
    match level {
        Level::Error => "ERRO",
        Level::Warn => "WARN",
        Level::Info => "INFO",
        Level::Debug => "DEBG",
        Level::Trace => "TRAC",
    }
}

static LOGGER: GlobalLogger = GlobalLogger;

pub fn init() {
    // Already set is fine: the logger is the same static either way.
    let _ = log::set_logger(&LOGGER);

    let level = match option_env!("LOG") {
        Some("OFF") => LevelFilter::Off,
        Some("ERROR") => LevelFilter::Error,
        Some("WARN") => LevelFilter::Warn,
        Some("INFO") => LevelFilter::Info,
        Some("DEBUG") => LevelFilter::Debug,
        Some("TRACE") => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };
    log::set_max_level(level);
}
