//! Injectable diagnostic sink.
//!
//! The reference implementation this crate is modeled on used a process-wide debug logger.
//! That is awkward to test and impossible to scope per-[`Source`](crate::Source), so instead
//! components accept a `&dyn Log` handle. [`DefaultLog`] forwards to the `log` crate so a host
//! application that already has a logger installed gets diagnostics for free.

/// Severity of a logged diagnostic.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum LogLevel {
    /// A failure that was recovered from locally (dropped tile, skipped feature, failed merge).
    Warn,
    /// Informational message about normal lifecycle events (tile loaded, style replaced).
    Info,
    /// Fine-grained tracing, off by default in most hosts.
    Trace,
}

/// Destination for diagnostics emitted while handling the error taxonomy in §7 of the design.
pub trait Log: Send + Sync {
    /// Records a single diagnostic message.
    fn log(&self, level: LogLevel, message: &str);
}

/// Forwards to the `log` crate's global macros.
#[derive(Debug, Default, Copy, Clone)]
pub struct DefaultLog;

impl Log for DefaultLog {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Warn => log::warn!("{message}"),
            LogLevel::Info => log::info!("{message}"),
            LogLevel::Trace => log::trace!("{message}"),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use parking_lot::Mutex;

    /// Records every message instead of forwarding to the `log` crate, so tests can assert on it.
    #[derive(Default)]
    pub struct RecordingLog {
        pub messages: Mutex<Vec<(LogLevel, String)>>,
    }

    impl Log for RecordingLog {
        fn log(&self, level: LogLevel, message: &str) {
            self.messages.lock().push((level, message.to_string()));
        }
    }
}
