//! Entry-point for the `mql-exec` binary.
//!
//! When this CLI is invoked normally, it parses the standard `mql-exec` CLI
//! options and compiles the given file. `-c key=value` overrides may appear
//! anywhere on the command line.

use clap::Parser;
use mql_common::CliConfigOverrides;
use mql_exec::Cli;
use mql_exec::run_main;

#[derive(Parser, Debug)]
#[command(version, about = "Compile an MQL4/MQL5 source file with MetaEditor")]
struct TopCli {
    #[clap(flatten)]
    config_overrides: CliConfigOverrides,

    #[clap(flatten)]
    inner: Cli,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let top_cli = TopCli::parse();
    // Merge root-level overrides into inner CLI struct so downstream logic
    // remains unchanged.
    let mut inner = top_cli.inner;
    inner
        .config_overrides
        .raw_overrides
        .splice(0..0, top_cli.config_overrides.raw_overrides);

    run_main(inner).await
}
