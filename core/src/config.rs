use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use toml::Value as TomlValue;

use crate::config_loader::apply_toml_override;
use crate::config_loader::load_config_as_toml;
use crate::error::CompileErr;
use crate::error::Result;
use crate::source::SourceVariant;

pub const CONFIG_TOML_FILE: &str = "config.toml";

/// Per-project settings file, looked up from the source directory upwards.
pub const PROJECT_CONFIG_TOML_FILE: &str = "mql.toml";

/// Settings as they appear on disk. Every field is optional so that layers
/// can be merged before defaults are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigToml {
    /// Wine executable used to run MetaEditor on macOS and Linux.
    pub wine_path: Option<PathBuf>,

    /// MetaEditor used for `.mq4` sources.
    pub metaeditor4_path: Option<PathBuf>,

    /// MetaEditor used for `.mq5` sources.
    pub metaeditor5_path: Option<PathBuf>,

    /// Keep `mqlcompile.log` next to the source after it has been shown.
    pub retain_compilation_log_file: Option<bool>,
}

/// Overrides supplied by dedicated command-line flags. These win over every
/// file layer and over `-c key=value` overrides.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub wine_path: Option<PathBuf>,
    pub metaeditor4_path: Option<PathBuf>,
    pub metaeditor5_path: Option<PathBuf>,
    pub retain_compilation_log_file: Option<bool>,
}

/// Resolved configuration for a single compilation. Built once per
/// invocation and passed explicitly to every stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub wine_path: Option<PathBuf>,
    pub metaeditor4_path: Option<PathBuf>,
    pub metaeditor5_path: Option<PathBuf>,
    pub retain_compilation_log_file: bool,

    /// Directory holding the user-level `config.toml`.
    pub mql_home: PathBuf,
}

impl Config {
    /// Load the layered configuration for a compilation of a file in
    /// `source_dir`, then apply `-c` overrides and typed overrides on top.
    pub async fn load_with_cli_overrides(
        cli_overrides: Vec<(String, TomlValue)>,
        overrides: ConfigOverrides,
        source_dir: Option<&Path>,
    ) -> Result<Self> {
        let mql_home = find_mql_home()?;
        Self::load_from_home_with_cli_overrides(mql_home, cli_overrides, overrides, source_dir)
            .await
    }

    pub async fn load_from_home_with_cli_overrides(
        mql_home: PathBuf,
        cli_overrides: Vec<(String, TomlValue)>,
        overrides: ConfigOverrides,
        source_dir: Option<&Path>,
    ) -> Result<Self> {
        let mut root = load_config_as_toml(&mql_home, source_dir).await?;
        for (path, value) in cli_overrides {
            apply_toml_override(&mut root, &path, value);
        }

        let cfg: ConfigToml = root.try_into().map_err(CompileErr::ConfigInvalid)?;
        Ok(Self::load_from_base_config_with_overrides(
            cfg, overrides, mql_home,
        ))
    }

    pub fn load_from_base_config_with_overrides(
        cfg: ConfigToml,
        overrides: ConfigOverrides,
        mql_home: PathBuf,
    ) -> Self {
        let ConfigOverrides {
            wine_path,
            metaeditor4_path,
            metaeditor5_path,
            retain_compilation_log_file,
        } = overrides;

        Self {
            wine_path: non_empty(wine_path.or(cfg.wine_path)),
            metaeditor4_path: non_empty(metaeditor4_path.or(cfg.metaeditor4_path)),
            metaeditor5_path: non_empty(metaeditor5_path.or(cfg.metaeditor5_path)),
            retain_compilation_log_file: retain_compilation_log_file
                .or(cfg.retain_compilation_log_file)
                .unwrap_or(false),
            mql_home,
        }
    }

    /// The MetaEditor configured for `variant`, if any.
    pub fn compiler_path(&self, variant: SourceVariant) -> Option<&Path> {
        match variant {
            SourceVariant::Mq4 => self.metaeditor4_path.as_deref(),
            SourceVariant::Mq5 => self.metaeditor5_path.as_deref(),
        }
    }

    /// The effective settings in their on-disk shape.
    pub fn to_toml(&self) -> ConfigToml {
        ConfigToml {
            wine_path: self.wine_path.clone(),
            metaeditor4_path: self.metaeditor4_path.clone(),
            metaeditor5_path: self.metaeditor5_path.clone(),
            retain_compilation_log_file: Some(self.retain_compilation_log_file),
        }
    }
}

// An empty setting means "not configured".
fn non_empty(path: Option<PathBuf>) -> Option<PathBuf> {
    path.filter(|p| !p.as_os_str().is_empty())
}

/// Returns the path to the MQL configuration directory, which can be
/// specified by the `MQL_HOME` environment variable. If not set, defaults to
/// `~/.mql`.
///
/// - If `MQL_HOME` is set, the value will be canonicalized and this
///   function will Err if the path does not exist.
/// - If `MQL_HOME` is not set, this function does not verify that the
///   directory exists.
pub fn find_mql_home() -> std::io::Result<PathBuf> {
    if let Ok(val) = std::env::var("MQL_HOME")
        && !val.is_empty()
    {
        return PathBuf::from(val).canonicalize();
    }

    let mut p = dirs::home_dir().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not find home directory",
        )
    })?;
    p.push(".mql");
    Ok(p)
}
