use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use mql_common::CliConfigOverrides;
use mql_core::config::Config;
use mql_core::config::ConfigOverrides;

/// Print the configuration a compilation would use, as TOML.
///
/// The user `config.toml`, the nearest `mql.toml` above PATH and any
/// `-c key=value` overrides are merged exactly as for `mql compile`.
#[derive(Debug, clap::Parser)]
pub struct ConfigCli {
    #[clap(skip)]
    pub config_overrides: CliConfigOverrides,

    /// Source file or directory to resolve project settings for. Defaults to
    /// the current directory.
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,
}

impl ConfigCli {
    pub async fn run(self) -> Result<()> {
        let ConfigCli {
            config_overrides,
            path,
        } = self;

        let cli_kv_overrides = config_overrides
            .parse_overrides()
            .map_err(anyhow::Error::msg)?;
        let source_dir = match path {
            Some(path) => project_directory(&path),
            None => std::env::current_dir().context("failed to read current directory")?,
        };
        let config = Config::load_with_cli_overrides(
            cli_kv_overrides,
            ConfigOverrides::default(),
            Some(&source_dir),
        )
        .await?;

        print!("{}", render_config(&config)?);
        Ok(())
    }
}

pub fn render_config(config: &Config) -> Result<String> {
    toml::to_string(&config.to_toml()).context("failed to serialize configuration")
}

// A source file resolves settings from its containing directory.
fn project_directory(path: &Path) -> PathBuf {
    if path.is_dir() {
        return path.to_path_buf();
    }
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
