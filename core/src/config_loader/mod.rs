use std::io;
use std::path::Path;
use std::path::PathBuf;

use tokio::fs;
use toml::Value as TomlValue;

use crate::config::CONFIG_TOML_FILE;
use crate::config::PROJECT_CONFIG_TOML_FILE;
use crate::error::CompileErr;
use crate::error::Result;

#[derive(Debug)]
pub(crate) struct LoadedConfigLayers {
    pub base: TomlValue,
    pub project: Option<TomlValue>,
}

// Configuration layering pipeline (top overrides bottom):
//
//        +-------------------------+
//        |   -c key=value flags    |
//        +-------------------------+
//                    ^
//                    |
//        +-------------------------+
//        | mql.toml (project) (*)  |
//        +-------------------------+
//                    ^
//                    |
//        +-------------------------+
//        |    config.toml (base)   |
//        +-------------------------+
//
// (*) The nearest `mql.toml` in the source directory or one of its ancestors.

pub async fn load_config_as_toml(mql_home: &Path, source_dir: Option<&Path>) -> Result<TomlValue> {
    let layers = load_config_layers(mql_home, source_dir).await?;
    Ok(apply_layers(layers))
}

fn default_empty_table() -> TomlValue {
    TomlValue::Table(Default::default())
}

pub(crate) async fn load_config_layers(
    mql_home: &Path,
    source_dir: Option<&Path>,
) -> Result<LoadedConfigLayers> {
    let user_config_path = mql_home.join(CONFIG_TOML_FILE);
    let user_config = read_config_from_path(&user_config_path, true).await?;

    let project = match source_dir {
        Some(dir) => match find_project_config(dir).await {
            Some(path) => read_config_from_path(&path, false).await?,
            None => None,
        },
        None => None,
    };

    Ok(LoadedConfigLayers {
        base: user_config.unwrap_or_else(default_empty_table),
        project,
    })
}

async fn find_project_config(source_dir: &Path) -> Option<PathBuf> {
    let source_dir = std::path::absolute(source_dir).unwrap_or_else(|_| source_dir.to_path_buf());
    for dir in source_dir.ancestors() {
        let candidate = dir.join(PROJECT_CONFIG_TOML_FILE);
        if fs::metadata(&candidate)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
        {
            return Some(candidate);
        }
    }
    None
}

async fn read_config_from_path(path: &Path, log_missing_as_info: bool) -> Result<Option<TomlValue>> {
    match fs::read_to_string(path).await {
        Ok(contents) => match toml::from_str::<TomlValue>(&contents) {
            Ok(value) => {
                tracing::debug!("loaded config from {}", path.display());
                Ok(Some(value))
            }
            Err(err) => {
                tracing::error!("Failed to parse {}: {err}", path.display());
                Err(CompileErr::ConfigParse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        },
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            if log_missing_as_info {
                tracing::info!("{} not found, using defaults", path.display());
            } else {
                tracing::debug!("{} not found", path.display());
            }
            Ok(None)
        }
        Err(err) => {
            tracing::error!("Failed to read {}: {err}", path.display());
            Err(CompileErr::Io(err))
        }
    }
}

/// Merge config `overlay` into `base`, giving `overlay` precedence.
pub(crate) fn merge_toml_values(base: &mut TomlValue, overlay: &TomlValue) {
    if let TomlValue::Table(overlay_table) = overlay
        && let TomlValue::Table(base_table) = base
    {
        for (key, value) in overlay_table {
            if let Some(existing) = base_table.get_mut(key) {
                merge_toml_values(existing, value);
            } else {
                base_table.insert(key.clone(), value.clone());
            }
        }
    } else {
        *base = overlay.clone();
    }
}

/// Apply a single dotted-path override onto `root`, creating intermediate
/// tables as needed.
pub(crate) fn apply_toml_override(root: &mut TomlValue, path: &str, value: TomlValue) {
    use toml::value::Table;

    let segments: Vec<&str> = path.split('.').collect();
    let mut current = root;

    for (idx, segment) in segments.iter().enumerate() {
        let is_last = idx == segments.len() - 1;

        if !current.is_table() {
            *current = TomlValue::Table(Table::new());
        }
        let TomlValue::Table(table) = current else {
            return;
        };

        if is_last {
            table.insert((*segment).to_string(), value);
            return;
        }

        current = table
            .entry((*segment).to_string())
            .or_insert_with(|| TomlValue::Table(Table::new()));
    }
}

fn apply_layers(layers: LoadedConfigLayers) -> TomlValue {
    let LoadedConfigLayers { mut base, project } = layers;

    if let Some(overlay) = project {
        merge_toml_values(&mut base, &overlay);
    }

    base
}
