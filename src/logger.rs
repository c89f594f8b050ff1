use log::LevelFilter;

struct DebugLogger;

static LOGGER: DebugLogger = DebugLogger;

impl log::Log for DebugLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            println!("[{}] {}: {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

/// Installs the stdout debug logger.
pub fn init() {
    // A second call leaves the first logger in place.
    let _ = log::set_logger(&LOGGER).map(|_| log::set_max_level(LevelFilter::Debug));
}
