use std::path::Path;

use crate::compile_log::COMPILATION_LOG_FILE_NAME;
use crate::validate::CompilationRequest;

/// Builds the MetaEditor command line for `request`.
pub fn build_compile_command(request: &CompilationRequest) -> String {
    build_command(
        request.compatibility_layer_path(),
        request.compiler_path(),
        request.source_file_name(),
    )
}

/// Builds the shell command line:
///
/// ```text
/// "<wine>" "<metaeditor>" /compile:"<file>" /log:"mqlcompile.log"
/// ```
///
/// Both `/compile` and `/log` are relative to the working directory, which
/// the executor sets to the source directory. Without a compatibility layer
/// the leading `""` segment is dropped so MetaEditor is invoked directly.
pub fn build_command(
    compatibility_layer: Option<&Path>,
    compiler: &Path,
    source_file_name: &str,
) -> String {
    let layer = compatibility_layer
        .map(|path| path.display().to_string())
        .unwrap_or_default();
    let command = format!(
        "\"{layer}\" \"{}\" /compile:\"{source_file_name}\" /log:\"{COMPILATION_LOG_FILE_NAME}\"",
        compiler.display()
    );

    match command.strip_prefix("\"\"") {
        Some(rest) => rest.trim().to_string(),
        None => command.trim().to_string(),
    }
}
