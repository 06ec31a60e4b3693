use std::io;
use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;

use crate::source::SourceVariant;

pub type Result<T> = std::result::Result<T, CompileErr>;

/// Which configured binary a validation failure refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryRole {
    /// Wine, needed to run MetaEditor on macOS and Linux.
    CompatibilityLayer,
    Compiler(SourceVariant),
}

impl BinaryRole {
    /// Human-readable name used in error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            BinaryRole::CompatibilityLayer => "Wine",
            BinaryRole::Compiler(SourceVariant::Mq4) => "MetaEditor 4",
            BinaryRole::Compiler(SourceVariant::Mq5) => "MetaEditor 5",
        }
    }
}

/// The specific sub-check of path validation that failed.
#[derive(Error, Debug)]
pub enum PathCheckErr {
    #[error("is not configured in the settings")]
    NotConfigured,

    #[error("is not valid: {source}")]
    Inaccessible {
        #[source]
        source: io::Error,
    },

    #[error("is not executable")]
    NotExecutable,

    #[error("is not a valid file")]
    NotAFile,
}

#[derive(Error, Debug)]
pub enum CompileErr {
    /// No source file was selected by the caller.
    #[error("No active editor window")]
    NoActiveFile,

    #[error("MQL compilation only supports .mq4 and .mq5 files")]
    UnsupportedFileType { extension: String },

    /// A configured binary failed one of the existence/permission/type checks.
    #[error("{}", invalid_binary_message(.role, .path.as_deref(), .source))]
    InvalidBinary {
        role: BinaryRole,
        path: Option<PathBuf>,
        #[source]
        source: PathCheckErr,
    },

    #[error("Error preparing log file: {source}")]
    LogPreparation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error launching compiler: {source}")]
    Launch {
        #[source]
        source: io::Error,
    },

    #[error("Error reading log file: {source}")]
    LogRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error deleting log file: {source}. Feel free to delete it manually.")]
    LogDeletion {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    ConfigInvalid(#[source] toml::de::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

fn invalid_binary_message(role: &BinaryRole, path: Option<&Path>, check: &PathCheckErr) -> String {
    let name = role.display_name();
    let mut message = match path {
        Some(path) => format!("{name} path \"{}\" {check}.", path.display()),
        None => format!("{name} path {check}."),
    };
    if *role == BinaryRole::CompatibilityLayer && matches!(check, PathCheckErr::NotConfigured) {
        message.push_str(" Compilation cannot proceed without Wine on macOS or Linux.");
    }
    message
}

impl CompileErr {
    /// Whether this condition aborts the pipeline. Everything that happens
    /// after the compiler was launched is reported but does not abort.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            CompileErr::Launch { .. } | CompileErr::LogRead { .. } | CompileErr::LogDeletion { .. }
        )
    }
}
