use clap::CommandFactory;
use clap::Parser;
use clap_complete::Shell;
use clap_complete::generate;
use mql_cli::config_cmd::ConfigCli;
use mql_common::CliConfigOverrides;
use mql_exec::Cli as ExecCli;

/// MQL CLI
///
/// Compile MQL4/MQL5 sources with MetaEditor, natively or through Wine.
#[derive(Debug, Parser)]
#[clap(
    author,
    version,
    // The executable may be installed under a platform-specific name, but the
    // help output should always use the command name that users run.
    bin_name = "mql",
    subcommand_required = true,
    arg_required_else_help = true
)]
struct MultitoolCli {
    #[clap(flatten)]
    pub config_overrides: CliConfigOverrides,

    #[clap(subcommand)]
    subcommand: Subcommand,
}

#[derive(Debug, clap::Subcommand)]
enum Subcommand {
    /// Compile an MQL4/MQL5 source file with MetaEditor.
    #[clap(visible_alias = "c")]
    Compile(ExecCli),

    /// Print the effective configuration as TOML.
    Config(ConfigCli),

    /// Generate shell completion scripts.
    Completion(CompletionCommand),
}

#[derive(Debug, Parser)]
struct CompletionCommand {
    /// Shell to generate completions for
    #[clap(value_enum, default_value_t = Shell::Bash)]
    shell: Shell,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli_main().await
}

async fn cli_main() -> anyhow::Result<()> {
    let MultitoolCli {
        config_overrides: root_config_overrides,
        subcommand,
    } = MultitoolCli::parse();

    match subcommand {
        Subcommand::Compile(mut exec_cli) => {
            prepend_config_flags(&mut exec_cli.config_overrides, root_config_overrides);
            mql_exec::run_main(exec_cli).await?;
        }
        Subcommand::Config(mut config_cli) => {
            prepend_config_flags(&mut config_cli.config_overrides, root_config_overrides);
            config_cli.run().await?;
        }
        Subcommand::Completion(completion_cli) => {
            print_completion(completion_cli);
        }
    }

    Ok(())
}

/// Prepend root-level overrides so they have lower precedence than
/// CLI-specific ones specified after the subcommand (if any).
fn prepend_config_flags(
    subcommand_config_overrides: &mut CliConfigOverrides,
    cli_config_overrides: CliConfigOverrides,
) {
    subcommand_config_overrides
        .raw_overrides
        .splice(0..0, cli_config_overrides.raw_overrides);
}

fn print_completion(cmd: CompletionCommand) {
    let mut app = MultitoolCli::command();
    let name = "mql";
    generate(cmd.shell, &mut app, name, &mut std::io::stdout());
}
