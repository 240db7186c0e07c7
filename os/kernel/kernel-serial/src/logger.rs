use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// A `log::Log` implementation writing to COM1.
///
/// One static instance is installed at most once during early bring-up;
/// records format as `[LEVEL] target: message`.
pub struct SerialLogger {
    max_level: LevelFilter,
}

impl SerialLogger {
    #[must_use]
    pub const fn new(max_level: LevelFilter) -> Self {
        Self { max_level }
    }

    /// Install as the global logger. Call once during early init.
    ///
    /// # Errors
    ///
    /// Fails if a global logger is already installed.
    pub fn init(self) -> Result<(), SetLoggerError> {
        static SLOT: kernel_sync::SyncOnceCell<SerialLogger> = kernel_sync::SyncOnceCell::new();
        let logger = SLOT.get_or_init(|| self);
        log::set_logger(logger)?;
        log::set_max_level(logger.max_level);
        Ok(())
    }
}

impl Log for SerialLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        crate::write_fmt(format_args!(
            "[{}] {}: {}\n",
            record.level(),
            record.target(),
            record.args()
        ));
    }

    fn flush(&self) {
        // Polled transmitter; nothing is buffered.
    }
}

#[cfg(test)]
mod tests {
    use super::SerialLogger;
    use log::{Level, LevelFilter, Log, Metadata};

    #[test]
    fn level_threshold_filters() {
        let logger = SerialLogger::new(LevelFilter::Info);
        let meta = |level: Level| Metadata::builder().level(level).target("test").build();
        assert!(logger.enabled(&meta(Level::Error)));
        assert!(logger.enabled(&meta(Level::Info)));
        assert!(!logger.enabled(&meta(Level::Debug)));
    }
}
