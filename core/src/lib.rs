//! Root of the `mql-core` library.

// Prevent accidental direct writes to stdout/stderr in library code. All
// user-visible output must go through the log sink or the tracing stack.
#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod command;
pub mod compile;
pub mod compile_log;
pub mod config;
pub mod config_loader;
pub mod error;
pub mod exec;
pub mod platform;
pub mod sink;
pub mod source;
pub mod validate;

pub use compile::CompileOutcome;
pub use compile::CompileStatus;
pub use compile::CompilerService;
pub use compile::compile_file;
pub use compile_log::COMPILATION_LOG_FILE_NAME;
pub use platform::HostPlatform;
pub use source::SourceVariant;
pub use validate::CompilationRequest;
