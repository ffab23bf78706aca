//! Logging for the designer core
//!
//! The core logs through an injected [`DesignerLog`]. Messages carry a
//! [`DebugContext`] and are only emitted when the context is enabled in the
//! configured mask; errors are always emitted.

use bitflags::bitflags;
use std::fmt;
use std::sync::{Arc, Mutex};

bitflags! {
    /// Categories of debug messages, used as a verbosity mask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DebugContext: u32 {
        const PACKAGE = 1 << 0;
        const MARGIN = 1 << 1;
        const DOCUMENT = 1 << 2;
        const WIX = 1 << 3;
        const EXCEPTIONS = 1 << 31;
    }
}

impl DebugContext {
    /// Parse a single context name (case-insensitive). `all` and `none` are accepted.
    pub fn parse_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "none" => Some(Self::empty()),
            "all" => Some(Self::all()),
            "package" => Some(Self::PACKAGE),
            "margin" => Some(Self::MARGIN),
            "document" => Some(Self::DOCUMENT),
            "wix" => Some(Self::WIX),
            "exceptions" => Some(Self::EXCEPTIONS),
            _ => None,
        }
    }
}

impl fmt::Display for DebugContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "None");
        }
        let names: Vec<&str> = self.iter_names().map(|(name, _)| name).collect();
        write!(f, "{}", names.join("|"))
    }
}

/// Sink for diagnostic messages. Implementations must never panic.
pub trait DesignerLog: Send + Sync {
    /// Log a message in the given context.
    fn log(&self, context: DebugContext, message: &str);

    /// Log an error; errors ignore the context mask.
    fn error(&self, message: &str);
}

/// Shared handle to a logger.
pub type SharedLog = Arc<dyn DesignerLog>;

/// Forwards to `tracing`, filtered by a context mask.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog {
    mask: DebugContext,
}

impl TracingLog {
    pub fn new(mask: DebugContext) -> Self {
        Self { mask }
    }

    pub fn mask(&self) -> DebugContext {
        self.mask
    }
}

impl DesignerLog for TracingLog {
    fn log(&self, context: DebugContext, message: &str) {
        if !context.intersects(self.mask) {
            return;
        }
        tracing::info!(context = %context, "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!("{}", message);
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLog;

impl DesignerLog for NullLog {
    fn log(&self, _context: DebugContext, _message: &str) {}
    fn error(&self, _message: &str) {}
}

/// A recorded log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// `None` for errors
    pub context: Option<DebugContext>,
    pub message: String,
}

/// Keeps every message in memory, regardless of mask. Used by tests and the CLI.
#[derive(Debug, Default)]
pub struct MemoryLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn errors(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.context.is_none())
            .map(|e| e.message)
            .collect()
    }

    /// True if any message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.entries().iter().any(|e| e.message.contains(needle))
    }

    fn push(&self, entry: LogEntry) {
        match self.entries.lock() {
            Ok(mut entries) => entries.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }
}

impl DesignerLog for MemoryLog {
    fn log(&self, context: DebugContext, message: &str) {
        self.push(LogEntry {
            context: Some(context),
            message: message.to_string(),
        });
    }

    fn error(&self, message: &str) {
        self.push(LogEntry {
            context: None,
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_name() {
        assert_eq!(DebugContext::parse_name("Margin"), Some(DebugContext::MARGIN));
        assert_eq!(DebugContext::parse_name(" wix "), Some(DebugContext::WIX));
        assert_eq!(DebugContext::parse_name("all"), Some(DebugContext::all()));
        assert_eq!(DebugContext::parse_name("none"), Some(DebugContext::empty()));
        assert_eq!(DebugContext::parse_name("bogus"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(DebugContext::empty().to_string(), "None");
        assert_eq!(DebugContext::MARGIN.to_string(), "MARGIN");
        assert_eq!(
            (DebugContext::MARGIN | DebugContext::WIX).to_string(),
            "MARGIN|WIX"
        );
    }

    #[test]
    fn test_memory_log_records() {
        let log = MemoryLog::new();
        log.log(DebugContext::DOCUMENT, "opened");
        log.error("broken");

        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].context, Some(DebugContext::DOCUMENT));
        assert_eq!(log.errors(), vec!["broken".to_string()]);
        assert!(log.contains("open"));
    }

    #[test]
    fn test_tracing_log_without_subscriber_does_not_panic() {
        let log = TracingLog::new(DebugContext::all());
        log.log(DebugContext::WIX, "message");
        log.error("error");
        assert_eq!(log.mask(), DebugContext::all());
    }

    #[test]
    fn test_null_log() {
        let log: SharedLog = Arc::new(NullLog);
        log.log(DebugContext::all(), "ignored");
        log.error("ignored");
    }
}
