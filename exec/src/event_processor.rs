use mql_core::sink::LogSink;
use mql_core::sink::Notifier;
use tokio::sync::mpsc::UnboundedSender;

use crate::compile_events::CompileEvent;
use crate::compile_events::LogLineEvent;
use crate::compile_events::NotificationEvent;
use crate::compile_events::NotificationLevel;

/// Renders [`CompileEvent`]s for the user, in the order they were emitted.
pub trait EventProcessor: Send {
    fn process_event(&mut self, event: CompileEvent);
}

/// [`LogSink`] half of the pipeline's output, forwarded as events.
pub struct EventLogSink {
    tx: UnboundedSender<CompileEvent>,
}

impl EventLogSink {
    pub fn new(tx: UnboundedSender<CompileEvent>) -> Self {
        Self { tx }
    }
}

impl LogSink for EventLogSink {
    fn log(&mut self, message: &str) {
        forward(
            &self.tx,
            CompileEvent::LogLine(LogLineEvent {
                message: message.to_string(),
            }),
        );
    }

    fn error(&mut self, message: &str) {
        forward(
            &self.tx,
            CompileEvent::LogError(LogLineEvent {
                message: message.to_string(),
            }),
        );
    }

    fn show(&mut self) {
        forward(&self.tx, CompileEvent::LogShown);
    }
}

/// [`Notifier`] half of the pipeline's output, forwarded as events.
pub struct EventNotifier {
    tx: UnboundedSender<CompileEvent>,
}

impl EventNotifier {
    pub fn new(tx: UnboundedSender<CompileEvent>) -> Self {
        Self { tx }
    }

    fn notify(&self, level: NotificationLevel, message: &str) {
        forward(
            &self.tx,
            CompileEvent::Notification(NotificationEvent {
                level,
                message: message.to_string(),
            }),
        );
    }
}

impl Notifier for EventNotifier {
    fn info(&mut self, message: &str) {
        self.notify(NotificationLevel::Info, message);
    }

    fn warning(&mut self, message: &str) {
        self.notify(NotificationLevel::Warning, message);
    }

    fn error(&mut self, message: &str) {
        self.notify(NotificationLevel::Error, message);
    }
}

fn forward(tx: &UnboundedSender<CompileEvent>, event: CompileEvent) {
    if let Err(err) = tx.send(event) {
        tracing::warn!("dropping event, output processor is gone: {err}");
    }
}
