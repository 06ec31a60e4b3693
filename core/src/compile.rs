//! The compilation pipeline: validate, build the command, run it, then
//! surface and clean up the log.

use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::command::build_compile_command;
use crate::compile_log::prepare_log;
use crate::compile_log::read_log;
use crate::compile_log::remove_log;
use crate::config::Config;
use crate::error::CompileErr;
use crate::exec::ProcessRunner;
use crate::platform::HostPlatform;
use crate::sink::LogSink;
use crate::sink::Notifier;
use crate::source::SourceFile;
use crate::validate::CompilationRequest;
use crate::validate::validate_request;

const COMPLETED_MESSAGE: &str = "Compilation completed. Check the log for details.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileStatus {
    /// The compiler was launched (or its launch was attempted) and the
    /// pipeline ran through log capture. Whether the source compiled cleanly
    /// is only visible in the log.
    Completed,
    /// The pipeline stopped before launching anything.
    Aborted,
}

/// Result of one pass through the pipeline. Every failure is captured here;
/// nothing is propagated to the caller as an `Err`.
#[derive(Debug)]
pub struct CompileOutcome {
    pub status: CompileStatus,
    pub request: Option<CompilationRequest>,
    pub command: Option<String>,
    /// Decoded log content, exactly as surfaced to the sink.
    pub log: Option<String>,
    /// Whether `mqlcompile.log` is still on disk when the pipeline returns.
    pub log_retained: bool,
    /// Wall time of the compiler process, when it ran.
    pub duration: Option<Duration>,
    /// The condition that aborted the pipeline.
    pub error: Option<CompileErr>,
    /// Non-fatal problems reported along the way.
    pub warnings: Vec<CompileErr>,
}

impl CompileOutcome {
    fn aborted(error: CompileErr) -> Self {
        Self {
            status: CompileStatus::Aborted,
            request: None,
            command: None,
            log: None,
            log_retained: false,
            duration: None,
            error: Some(error),
            warnings: Vec::new(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == CompileStatus::Completed
    }
}

/// Compile `source` with MetaEditor.
///
/// `source` is the file the user selected; `None` is reported and nothing
/// else happens. `config` is resolved by the caller for this invocation
/// only.
pub async fn compile_file(
    source: Option<&Path>,
    platform: HostPlatform,
    config: &Config,
    runner: &dyn ProcessRunner,
    sink: &mut dyn LogSink,
    notifier: &mut dyn Notifier,
) -> CompileOutcome {
    let Some(source) = source else {
        let err = CompileErr::NoActiveFile;
        notifier.info(&err.to_string());
        return CompileOutcome::aborted(err);
    };

    let request = match validate_request(source, platform, config) {
        Ok(request) => request,
        Err(err) => {
            notifier.error(&err.to_string());
            return CompileOutcome::aborted(err);
        }
    };

    let command = build_compile_command(&request);
    let log_path = request.log_artifact_path();

    if let Err(err) = prepare_log(log_path).await {
        let message = err.to_string();
        tracing::error!("{message}");
        sink.error(&message);
        notifier.error(&message);
        return CompileOutcome::aborted(err);
    }

    sink.show();
    sink.log(&format!(
        "Compiling \"{}\" in directory: \"{}\"",
        request.source_file_name(),
        request.source_directory().display()
    ));
    sink.log(&format!("Command: {command}"));
    tracing::info!("compiling {}", source.display());

    let mut warnings = Vec::new();
    let mut duration = None;
    match runner.run(&command, request.source_directory()).await {
        Ok(exit) => {
            // Exit status is not a success signal; see `ProcessExit`.
            tracing::debug!(
                "compiler exited with {:?} after {:?}",
                exit.exit_code,
                exit.duration
            );
            duration = Some(exit.duration);
        }
        Err(source) => {
            let err = CompileErr::Launch { source };
            let message = err.to_string();
            tracing::error!("{message}");
            sink.error(&message);
            notifier.error(&message);
            warnings.push(err);
        }
    }

    notifier.info(COMPLETED_MESSAGE);

    let log = match read_log(log_path).await {
        Ok(log) => log,
        Err(err) => {
            tracing::warn!("{err}");
            notifier.error(&err.to_string());
            warnings.push(err);
            let log_retained = log_path.exists();
            return CompileOutcome {
                status: CompileStatus::Completed,
                log_retained,
                request: Some(request),
                command: Some(command),
                log: None,
                duration,
                error: None,
                warnings,
            };
        }
    };
    sink.log(&log);

    let mut log_retained = true;
    if !config.retain_compilation_log_file {
        match remove_log(log_path).await {
            Ok(()) => log_retained = false,
            Err(err) => {
                tracing::warn!("{err}");
                notifier.warning(&err.to_string());
                warnings.push(err);
            }
        }
    }

    CompileOutcome {
        status: CompileStatus::Completed,
        request: Some(request),
        command: Some(command),
        log: Some(log),
        log_retained,
        duration,
        error: None,
        warnings,
    }
}

/// Runs compilations against a fixed platform and process runner, allowing
/// at most one in-flight compilation per source directory.
///
/// Every directory shares the fixed name `mqlcompile.log`, so two
/// overlapping runs in one directory would read each other's log. Runs in
/// different directories proceed concurrently. Separate processes are not
/// coordinated.
#[derive(Clone)]
pub struct CompilerService {
    platform: HostPlatform,
    runner: Arc<dyn ProcessRunner>,
    directory_locks: Arc<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>>,
}

impl CompilerService {
    pub fn new(platform: HostPlatform, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            platform,
            runner,
            directory_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn platform(&self) -> HostPlatform {
        self.platform
    }

    /// Like [`compile_file`], serialized per source directory.
    pub async fn compile(
        &self,
        source: Option<&Path>,
        config: &Config,
        sink: &mut dyn LogSink,
        notifier: &mut dyn Notifier,
    ) -> CompileOutcome {
        // Unsupported or missing files never touch the log, so they need no lock.
        let key = match source.map(SourceFile::from_path) {
            Some(Ok(file)) => lock_key(file.directory),
            _ => {
                return compile_file(
                    source,
                    self.platform,
                    config,
                    self.runner.as_ref(),
                    sink,
                    notifier,
                )
                .await;
            }
        };

        let lock = self.lock_for(&key).await;
        let outcome = {
            let _guard = lock.lock().await;
            compile_file(
                source,
                self.platform,
                config,
                self.runner.as_ref(),
                sink,
                notifier,
            )
            .await
        };
        drop(lock);
        self.release(&key).await;
        outcome
    }

    async fn lock_for(&self, directory: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.directory_locks.lock().await;
        locks
            .entry(directory.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    // Drop the directory's entry once no caller holds or waits on it.
    async fn release(&self, directory: &Path) {
        let mut locks = self.directory_locks.lock().await;
        if locks
            .get(directory)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(directory);
        }
    }
}

// `..` and symlinks must not split one directory into two locks.
fn lock_key(directory: PathBuf) -> PathBuf {
    match std::fs::canonicalize(&directory) {
        Ok(canonical) => canonical,
        Err(_) => std::path::absolute(&directory).unwrap_or(directory),
    }
}
