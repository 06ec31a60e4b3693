use std::fmt;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::error::CompileErr;
use crate::error::Result;

/// The two MQL dialects MetaEditor can compile. Each one is compiled by its
/// own MetaEditor installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceVariant {
    /// MQL4 source (`.mq4`), compiled by MetaEditor 4.
    Mq4,
    /// MQL5 source (`.mq5`), compiled by MetaEditor 5.
    Mq5,
}

impl SourceVariant {
    /// Maps a file extension (without the leading dot) to a variant. The
    /// match is exact: `MQ4` is not accepted.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "mq4" => Some(Self::Mq4),
            "mq5" => Some(Self::Mq5),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Mq4 => "mq4",
            Self::Mq5 => "mq5",
        }
    }
}

impl fmt::Display for SourceVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A source file split into the pieces the pipeline needs. Construction
/// touches no files; a relative path is resolved against the current
/// directory so `directory` is always absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub directory: PathBuf,
    pub file_name: String,
    pub variant: SourceVariant,
}

impl SourceFile {
    /// Splits `path` into directory, file name and variant. Fails with
    /// [`CompileErr::UnsupportedFileType`] for any extension other than
    /// `mq4`/`mq5`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = extension_of(&file_name);
        let variant = SourceVariant::from_extension(extension).ok_or_else(|| {
            CompileErr::UnsupportedFileType {
                extension: extension.to_string(),
            }
        })?;

        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let directory = absolute_directory(parent);

        Ok(Self {
            directory,
            file_name,
            variant,
        })
    }
}

// `std::path::absolute` only fails for an empty path or when the current
// directory is gone; keep the path as given in that case.
fn absolute_directory(dir: &Path) -> PathBuf {
    match std::path::absolute(dir) {
        Ok(abs) => abs,
        Err(err) => {
            tracing::warn!("cannot resolve {}: {err}", dir.display());
            dir.to_path_buf()
        }
    }
}

// `Path::extension` treats ".mq4" as a file stem, so split on the last dot
// the same way the file name is presented to the user.
fn extension_of(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => &file_name[idx + 1..],
        _ => "",
    }
}
