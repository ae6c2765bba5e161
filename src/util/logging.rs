use std::sync::Once;

struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        // Keep it terse; module paths only at trace level.
        if record.level() == log::Level::Trace {
            println!("[{}] {}: {}", record.level(), record.target(), record.args());
        } else {
            println!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;
static INIT: Once = Once::new();

#[cfg(feature = "verbose_logs")]
const DEFAULT_LEVEL: log::LevelFilter = log::LevelFilter::Trace;
#[cfg(not(feature = "verbose_logs"))]
const DEFAULT_LEVEL: log::LevelFilter = log::LevelFilter::Info;

/// Install the console logger at the build's default level. Later calls do nothing.
pub fn init_logger() {
    init_logger_with(DEFAULT_LEVEL);
}

/// Install the console logger at `level`, e.g. from [`RenderConfig::log_level`].
///
/// The logger is installed once; later calls only adjust the level.
///
/// [`RenderConfig::log_level`]: crate::util::config::RenderConfig::log_level
pub fn init_logger_with(level: log::LevelFilter) {
    INIT.call_once(|| {
        // Fails only when the host installed its own logger first.
        let _ = log::set_logger(&LOGGER);
    });
    log::set_max_level(level);
}
