use std::path::PathBuf;
use std::time::Duration;

use mql_common::elapsed::format_duration;
use owo_colors::OwoColorize;
use owo_colors::Style;

use crate::compile_events::CompileEvent;
use crate::compile_events::CompileFinishedEvent;
use crate::compile_events::FinishedStatus;
use crate::compile_events::NotificationLevel;
use crate::event_processor::EventProcessor;

/// The compilation log goes to stdout; the header, notifications and the
/// final summary go to stderr.
pub(crate) struct EventProcessorWithHumanOutput {
    source: Option<PathBuf>,
    header_printed: bool,

    // To ensure that --color=never is respected, ANSI escapes _must_ be added
    // using .style() with one of these fields. If you need a new style, add a
    // new field here.
    bold: Style,
    dimmed: Style,

    // Styles for stdout.
    log_error: Style,

    // Styles for stderr.
    red: Style,
    green: Style,
    cyan: Style,
    yellow: Style,
}

impl EventProcessorWithHumanOutput {
    pub(crate) fn create_with_ansi(
        stdout_with_ansi: bool,
        stderr_with_ansi: bool,
        source: Option<PathBuf>,
    ) -> Self {
        let styled = |style: Style, enabled: bool| if enabled { style } else { Style::new() };
        Self {
            source,
            header_printed: false,
            bold: styled(Style::new().bold(), stderr_with_ansi),
            dimmed: styled(Style::new().dimmed(), stderr_with_ansi),
            log_error: styled(Style::new().red(), stdout_with_ansi),
            red: styled(Style::new().red(), stderr_with_ansi),
            green: styled(Style::new().green(), stderr_with_ansi),
            cyan: styled(Style::new().cyan(), stderr_with_ansi),
            yellow: styled(Style::new().yellow(), stderr_with_ansi),
        }
    }

    fn print_header(&mut self) {
        if self.header_printed {
            return;
        }
        self.header_printed = true;

        const VERSION: &str = env!("CARGO_PKG_VERSION");
        eprintln!("{} v{VERSION}\n--------", "MQL Compiler".style(self.bold));
        if let Some(source) = &self.source {
            eprintln!("{} {}", "source:".style(self.bold), source.display());
        }
        eprintln!("--------");
    }

    fn print_summary(&self, finished: &CompileFinishedEvent) {
        let elapsed = format_duration(Duration::from_millis(finished.duration_ms));
        match finished.status {
            FinishedStatus::Completed => {
                eprintln!(
                    "{} {}",
                    "compile finished in".style(self.green),
                    elapsed.style(self.dimmed)
                );
            }
            FinishedStatus::Aborted => {
                eprintln!(
                    "{} {}",
                    "compile aborted after".style(self.red),
                    elapsed.style(self.dimmed)
                );
            }
        }
        if let Some(log) = &finished.retained_log {
            eprintln!("{} {}", "log kept at".style(self.dimmed), log.display());
        }
    }
}

impl EventProcessor for EventProcessorWithHumanOutput {
    fn process_event(&mut self, event: CompileEvent) {
        match event {
            CompileEvent::LogShown => self.print_header(),
            #[allow(clippy::print_stdout)]
            CompileEvent::LogLine(line) => {
                // MetaEditor terminates its log with CRLF already.
                if line.message.ends_with('\n') {
                    print!("{}", line.message);
                } else {
                    println!("{}", line.message);
                }
            }
            #[allow(clippy::print_stdout)]
            CompileEvent::LogError(line) => {
                println!("{}", format!("[ERROR] {}", line.message).style(self.log_error));
            }
            CompileEvent::Notification(notification) => {
                let (label, style) = match notification.level {
                    NotificationLevel::Info => ("info:", self.cyan),
                    NotificationLevel::Warning => ("warning:", self.yellow),
                    NotificationLevel::Error => ("error:", self.red),
                };
                eprintln!("{} {}", label.style(style), notification.message);
            }
            CompileEvent::Finished(finished) => self.print_summary(&finished),
        }
    }
}
