use crate::compile_events::CompileEvent;
use crate::event_processor::EventProcessor;

/// Writes one JSON object per event to stdout.
#[derive(Debug, Default)]
pub struct EventProcessorWithJsonOutput;

impl EventProcessorWithJsonOutput {
    pub fn new() -> Self {
        Self
    }

    pub fn to_jsonl(event: &CompileEvent) -> serde_json::Result<String> {
        serde_json::to_string(event)
    }
}

impl EventProcessor for EventProcessorWithJsonOutput {
    #[allow(clippy::print_stdout)]
    fn process_event(&mut self, event: CompileEvent) {
        match Self::to_jsonl(&event) {
            Ok(line) => println!("{line}"),
            Err(err) => tracing::error!("failed to serialize event: {err}"),
        }
    }
}
