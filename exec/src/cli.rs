use std::path::PathBuf;

use clap::Parser;
use clap::ValueEnum;
use mql_common::CliConfigOverrides;
use mql_core::HostPlatform;

#[derive(Parser, Debug)]
#[command(version)]
pub struct Cli {
    /// MQL source file to compile (`.mq4` or `.mq5`).
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Wine executable used to run MetaEditor on macOS and Linux.
    #[arg(long = "wine", value_name = "PATH")]
    pub wine_path: Option<PathBuf>,

    /// MetaEditor used for `.mq4` sources.
    #[arg(long = "metaeditor4", value_name = "PATH")]
    pub metaeditor4_path: Option<PathBuf>,

    /// MetaEditor used for `.mq5` sources.
    #[arg(long = "metaeditor5", value_name = "PATH")]
    pub metaeditor5_path: Option<PathBuf>,

    /// Keep `mqlcompile.log` next to the source file after it is printed.
    #[arg(long = "retain-log", default_value_t = false)]
    pub retain_log: bool,

    /// Treat the host as this platform when deciding whether Wine is needed.
    #[arg(long = "platform", value_name = "PLATFORM", hide = true)]
    pub platform: Option<HostPlatform>,

    /// Print events to stdout as JSONL.
    #[arg(long = "json", default_value_t = false)]
    pub json: bool,

    /// Specifies color settings for use in the output.
    #[arg(long = "color", value_enum, default_value_t = Color::Auto)]
    pub color: Color,

    #[clap(skip)]
    pub config_overrides: CliConfigOverrides,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum Color {
    Always,
    Never,
    #[default]
    Auto,
}
