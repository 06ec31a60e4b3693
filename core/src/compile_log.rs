//! Lifecycle of `mqlcompile.log`, the file MetaEditor writes its
//! diagnostics to.
//!
//! The file name is fixed, so it is truncated before every launch to make
//! sure whatever is read back afterwards came from this run. MetaEditor
//! writes UTF-16LE.

use std::path::Path;

use tokio::fs;

use crate::error::CompileErr;
use crate::error::Result;

pub const COMPILATION_LOG_FILE_NAME: &str = "mqlcompile.log";

/// Create `path` or truncate it to zero bytes.
pub async fn prepare_log(path: &Path) -> Result<()> {
    fs::write(path, b"")
        .await
        .map_err(|source| CompileErr::LogPreparation {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::debug!("truncated {}", path.display());
    Ok(())
}

/// Read the whole log and decode it as UTF-16LE.
pub async fn read_log(path: &Path) -> Result<String> {
    let bytes = fs::read(path).await.map_err(|source| CompileErr::LogRead {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("read {} bytes from {}", bytes.len(), path.display());
    Ok(decode_utf16le(&bytes))
}

pub async fn remove_log(path: &Path) -> Result<()> {
    fs::remove_file(path)
        .await
        .map_err(|source| CompileErr::LogDeletion {
            path: path.to_path_buf(),
            source,
        })
}

/// Decodes little-endian UTF-16. Unpaired surrogates become U+FFFD and a
/// trailing odd byte is dropped. A byte-order mark is kept as-is.
pub fn decode_utf16le(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}
