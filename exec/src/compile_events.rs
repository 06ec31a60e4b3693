use std::path::PathBuf;
use std::time::Duration;

use mql_core::CompileOutcome;
use mql_core::CompileStatus;
use serde::Deserialize;
use serde::Serialize;

/// Top-level JSONL events emitted by mql-exec.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum CompileEvent {
    /// The compilation log is about to receive output.
    #[serde(rename = "log.shown")]
    LogShown,
    /// One message appended to the compilation log. The MetaEditor log is a
    /// single message that may span many lines.
    #[serde(rename = "log.line")]
    LogLine(LogLineEvent),
    #[serde(rename = "log.error")]
    LogError(LogLineEvent),
    /// Short user-facing summary, distinct from the log.
    #[serde(rename = "notification")]
    Notification(NotificationEvent),
    /// Always the last event.
    #[serde(rename = "compile.finished")]
    Finished(CompileFinishedEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogLineEvent {
    pub message: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationEvent {
    pub level: NotificationLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishedStatus {
    Completed,
    Aborted,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompileFinishedEvent {
    pub status: FinishedStatus,
    /// Wall time of the whole invocation.
    pub duration_ms: u64,
    /// Location of `mqlcompile.log` when it was left on disk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retained_log: Option<PathBuf>,
    /// Why the pipeline stopped early.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Number of non-fatal problems reported along the way.
    pub warnings: usize,
}

impl CompileFinishedEvent {
    pub fn from_outcome(outcome: &CompileOutcome, elapsed: Duration) -> Self {
        let status = match outcome.status {
            CompileStatus::Completed => FinishedStatus::Completed,
            CompileStatus::Aborted => FinishedStatus::Aborted,
        };
        let retained_log = outcome
            .request
            .as_ref()
            .filter(|_| outcome.log_retained)
            .map(|request| request.log_artifact_path().to_path_buf());
        Self {
            status,
            duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            retained_log,
            error: outcome.error.as_ref().map(ToString::to_string),
            warnings: outcome.warnings.len(),
        }
    }
}
