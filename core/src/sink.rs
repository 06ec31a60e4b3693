//! Output seams of the pipeline.
//!
//! [`LogSink`] receives the detailed, ordered log of a compilation (the
//! command line, then the full MetaEditor log). [`Notifier`] receives the
//! short terminal summaries. The pipeline writes to both and never reads
//! back.

/// Ordered, write-only log of a compilation.
pub trait LogSink: Send {
    fn log(&mut self, message: &str);

    fn error(&mut self, message: &str);

    /// Bring the log to the user's attention.
    fn show(&mut self);
}

/// Short, user-facing summaries, distinct from the detailed log.
pub trait Notifier: Send {
    fn info(&mut self, message: &str);

    fn warning(&mut self, message: &str);

    fn error(&mut self, message: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEntry {
    Log(String),
    LogError(String),
    Shown,
    Info(String),
    Warning(String),
    Error(String),
}

/// In-memory [`LogSink`] and [`Notifier`] that records every call in order.
/// Useful for embedding the pipeline and for tests.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    pub entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages passed to [`LogSink::log`], in order.
    pub fn log_lines(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                TranscriptEntry::Log(line) => Some(line.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Everything sent to the [`Notifier`], in order.
    pub fn notifications(&self) -> Vec<&TranscriptEntry> {
        self.entries
            .iter()
            .filter(|entry| {
                matches!(
                    entry,
                    TranscriptEntry::Info(_) | TranscriptEntry::Warning(_) | TranscriptEntry::Error(_)
                )
            })
            .collect()
    }
}

impl LogSink for Transcript {
    fn log(&mut self, message: &str) {
        self.entries.push(TranscriptEntry::Log(message.to_string()));
    }

    fn error(&mut self, message: &str) {
        self.entries
            .push(TranscriptEntry::LogError(message.to_string()));
    }

    fn show(&mut self) {
        self.entries.push(TranscriptEntry::Shown);
    }
}

impl Notifier for Transcript {
    fn info(&mut self, message: &str) {
        self.entries.push(TranscriptEntry::Info(message.to_string()));
    }

    fn warning(&mut self, message: &str) {
        self.entries
            .push(TranscriptEntry::Warning(message.to_string()));
    }

    fn error(&mut self, message: &str) {
        self.entries.push(TranscriptEntry::Error(message.to_string()));
    }
}
