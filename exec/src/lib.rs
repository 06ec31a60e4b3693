// - In the default output mode, it is paramount that the only thing written to
//   stdout is the compilation log, so it can be piped into other tools.
// - In `--json` mode, stdout must be valid JSONL, one event per line.
// For both modes, any other output must be written to stderr.
#![deny(clippy::print_stdout)]

mod cli;
pub mod compile_events;
pub mod event_processor;
mod event_processor_with_human_output;
pub mod event_processor_with_jsonl_output;

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

pub use cli::Cli;
pub use cli::Color;
use mql_core::CompilerService;
use mql_core::HostPlatform;
use mql_core::config::Config;
use mql_core::config::ConfigOverrides;
use mql_core::config::ConfigToml;
use mql_core::exec::ShellProcessRunner;
use supports_color::Stream;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::compile_events::CompileEvent;
use crate::compile_events::CompileFinishedEvent;
use crate::event_processor::EventLogSink;
use crate::event_processor::EventNotifier;
use crate::event_processor::EventProcessor;
use crate::event_processor_with_human_output::EventProcessorWithHumanOutput;
use crate::event_processor_with_jsonl_output::EventProcessorWithJsonOutput;

/// Compile one file and exit the process with status 1 when the pipeline
/// aborted before the compiler ran. A compiler that reports errors in its
/// log still exits 0.
pub async fn run_main(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        file,
        wine_path,
        metaeditor4_path,
        metaeditor5_path,
        retain_log,
        platform,
        json,
        color,
        config_overrides,
    } = cli;

    let (stdout_with_ansi, stderr_with_ansi) = match color {
        Color::Always => (true, true),
        Color::Never => (false, false),
        Color::Auto => (
            supports_color::on_cached(Stream::Stdout).is_some(),
            supports_color::on_cached(Stream::Stderr).is_some(),
        ),
    };

    // Diagnostics only; the compilation log itself goes through the event
    // processor.
    let default_level = "error";
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .with_filter(env_filter);
    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();

    let cli_kv_overrides = match config_overrides.parse_overrides() {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error parsing -c overrides: {e}");
            std::process::exit(1);
        }
    };
    let overrides = ConfigOverrides {
        wine_path,
        metaeditor4_path,
        metaeditor5_path,
        retain_compilation_log_file: retain_log.then_some(true),
    };
    let config = match file.as_deref() {
        Some(file) => {
            let source_dir = Some(source_directory(file));
            Config::load_with_cli_overrides(cli_kv_overrides, overrides, source_dir).await?
        }
        // Nothing to compile; the pipeline reports that without any config I/O.
        None => Config::load_from_base_config_with_overrides(
            ConfigToml::default(),
            overrides,
            PathBuf::new(),
        ),
    };
    let platform = platform.unwrap_or_else(HostPlatform::current);
    tracing::debug!("resolved config for {platform}: {config:?}");

    let mut processor: Box<dyn EventProcessor> = if json {
        Box::new(EventProcessorWithJsonOutput::new())
    } else {
        Box::new(EventProcessorWithHumanOutput::create_with_ansi(
            stdout_with_ansi,
            stderr_with_ansi,
            file.clone(),
        ))
    };

    let (tx, mut rx) = mpsc::unbounded_channel::<CompileEvent>();
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            processor.process_event(event);
        }
    });

    let start = Instant::now();
    let service = CompilerService::new(platform, Arc::new(ShellProcessRunner));
    let mut sink = EventLogSink::new(tx.clone());
    let mut notifier = EventNotifier::new(tx.clone());
    let outcome = service
        .compile(file.as_deref(), &config, &mut sink, &mut notifier)
        .await;

    let finished = CompileFinishedEvent::from_outcome(&outcome, start.elapsed());
    if tx.send(CompileEvent::Finished(finished)).is_err() {
        tracing::warn!("output processor exited early");
    }
    drop(sink);
    drop(notifier);
    drop(tx);
    printer.await?;

    if !outcome.is_completed() {
        std::process::exit(1);
    }
    Ok(())
}

// Directory whose `mql.toml` applies to `file`.
fn source_directory(file: &Path) -> &Path {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
