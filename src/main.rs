use admission_log_tools::audit::analyzer::MissingUserInfo;
use admission_log_tools::commands;
use anyhow::{bail, Result};
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "admission-log")]
#[command(about = "Admission webhook log analysis tools", long_about = None)]
#[command(version)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
struct Cli {
    /// Path to the proxy log file (.gz and .zst are decompressed automatically)
    #[arg(required = true)]
    input: Option<String>,

    /// Output JSON file path (overwritten if it exists)
    #[arg(required = true)]
    output: Option<String>,

    /// Also write the merged admission transactions, before analysis, to this file
    #[arg(long)]
    raw_output: Option<String>,

    /// Fail on the first undecodable line instead of skipping it
    #[arg(long)]
    strict: bool,

    /// Treat admission requests without userInfo.username as an error instead of excluding them
    #[arg(long)]
    fail_on_missing_user_info: bool,

    /// Write every admission decision, skipping the system-actor filter
    #[arg(long)]
    no_filter: bool,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completion scripts
    GenerateCompletion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "warn,admission_log_tools=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Some(Commands::GenerateCompletion { shell }) = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "admission-log", &mut std::io::stdout());
        return Ok(());
    }

    let (Some(input), Some(output)) = (cli.input, cli.output) else {
        bail!("Please provide input and output file paths");
    };

    let missing_user_info = if cli.fail_on_missing_user_info {
        MissingUserInfo::Error
    } else {
        MissingUserInfo::Exclude
    };

    commands::analyze::run(
        &input,
        &output,
        cli.raw_output.as_deref(),
        cli.strict,
        missing_user_info,
        !cli.no_filter,
    )
}
