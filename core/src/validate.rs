//! Turns the active file and the resolved [`Config`] into a
//! [`CompilationRequest`], checking every configured binary on the way.
//!
//! Validation is synchronous and happens before any file is written or any
//! process is launched. The first failing check aborts with an error that
//! names the binary and the check.

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use crate::compile_log::COMPILATION_LOG_FILE_NAME;
use crate::config::Config;
use crate::error::BinaryRole;
use crate::error::CompileErr;
use crate::error::PathCheckErr;
use crate::error::Result;
use crate::platform::HostPlatform;
use crate::source::SourceFile;
use crate::source::SourceVariant;

/// Everything needed to run one compilation. Built fresh for each
/// invocation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationRequest {
    source_directory: PathBuf,
    source_file_name: String,
    source_variant: SourceVariant,
    compatibility_layer_path: Option<PathBuf>,
    compiler_path: PathBuf,
    log_artifact_path: PathBuf,
}

impl CompilationRequest {
    pub fn source_directory(&self) -> &Path {
        &self.source_directory
    }

    pub fn source_file_name(&self) -> &str {
        &self.source_file_name
    }

    pub fn source_variant(&self) -> SourceVariant {
        self.source_variant
    }

    /// `None` when the host runs MetaEditor natively.
    pub fn compatibility_layer_path(&self) -> Option<&Path> {
        self.compatibility_layer_path.as_deref()
    }

    pub fn compiler_path(&self) -> &Path {
        &self.compiler_path
    }

    /// Always `<source_directory>/mqlcompile.log`.
    pub fn log_artifact_path(&self) -> &Path {
        &self.log_artifact_path
    }
}

/// Validate `source_path` against `config` for `platform`.
pub fn validate_request(
    source_path: &Path,
    platform: HostPlatform,
    config: &Config,
) -> Result<CompilationRequest> {
    let SourceFile {
        directory,
        file_name,
        variant,
    } = SourceFile::from_path(source_path)?;

    let compatibility_layer_path = if platform.requires_compatibility_layer() {
        let path = config.wine_path.as_deref();
        Some(check_compatibility_layer(path)?.to_path_buf())
    } else {
        None
    };

    let compiler_path = check_compiler(variant, config.compiler_path(variant))?.to_path_buf();
    let log_artifact_path = directory.join(COMPILATION_LOG_FILE_NAME);

    tracing::debug!(
        "validated {variant} compilation of {file_name} in {}",
        directory.display()
    );

    Ok(CompilationRequest {
        source_directory: directory,
        source_file_name: file_name,
        source_variant: variant,
        compatibility_layer_path,
        compiler_path,
        log_artifact_path,
    })
}

/// Wine must exist, be readable and executable, and be a regular file.
pub fn check_compatibility_layer(path: Option<&Path>) -> Result<&Path> {
    let role = BinaryRole::CompatibilityLayer;
    let path = path.ok_or_else(|| invalid(&role, None, PathCheckErr::NotConfigured))?;
    check_readable(path).map_err(|source| {
        invalid(&role, Some(path), PathCheckErr::Inaccessible { source })
    })?;
    check_regular_file(path).map_err(|check| invalid(&role, Some(path), check))?;
    check_executable(path)
        .map_err(|_| invalid(&role, Some(path), PathCheckErr::NotExecutable))?;
    Ok(path)
}

/// MetaEditor must exist, be readable, and be a regular file. It is run
/// through Wine on macOS and Linux, so it need not be executable itself.
pub fn check_compiler(variant: SourceVariant, path: Option<&Path>) -> Result<&Path> {
    let role = BinaryRole::Compiler(variant);
    let path = path.ok_or_else(|| invalid(&role, None, PathCheckErr::NotConfigured))?;
    check_readable(path).map_err(|source| {
        invalid(&role, Some(path), PathCheckErr::Inaccessible { source })
    })?;
    check_regular_file(path).map_err(|check| invalid(&role, Some(path), check))?;
    Ok(path)
}

fn invalid(role: &BinaryRole, path: Option<&Path>, source: PathCheckErr) -> CompileErr {
    tracing::warn!("{} path check failed: {source}", role.display_name());
    CompileErr::InvalidBinary {
        role: role.clone(),
        path: path.map(Path::to_path_buf),
        source,
    }
}

fn check_regular_file(path: &Path) -> std::result::Result<(), PathCheckErr> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(PathCheckErr::NotAFile),
        Err(source) => Err(PathCheckErr::Inaccessible { source }),
    }
}

#[cfg(unix)]
fn access(path: &Path, mode: libc::c_int) -> io::Result<()> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
    let rc = unsafe { libc::access(c_path.as_ptr(), mode) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(unix)]
fn check_readable(path: &Path) -> io::Result<()> {
    access(path, libc::R_OK)
}

#[cfg(unix)]
fn check_executable(path: &Path) -> io::Result<()> {
    access(path, libc::X_OK)
}

#[cfg(not(unix))]
fn check_readable(path: &Path) -> io::Result<()> {
    let meta = fs::metadata(path)?;
    if meta.is_file() {
        fs::File::open(path).map(|_| ())
    } else {
        Ok(())
    }
}

// Windows has no executable permission bit.
#[cfg(not(unix))]
fn check_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}
