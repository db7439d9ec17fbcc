use std::{io::Write, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use xam_kernel::{KernelConfig, KernelState};

mod commands;

const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Parser)]
#[command(name = "xam-cmd")]
#[command(about = "Command-line driver for the XAM enumeration exports")]
#[command(version)]
struct Cli {
    /// Path to a JSON kernel configuration (defaults are used if omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// env_logger-style filter string (e.g. "info,xam_enumerator=debug"); overrides RUST_LOG
    #[arg(long, global = true)]
    log_filter: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a synthetic enumerator and drain it with repeated XamEnumerate calls
    Drain(commands::drain::DrainArgs),

    /// Print the online schema block handed to titles
    Schema,
}

fn init_logging(cli_filter: Option<&str>) {
    let env = Env::default().default_filter_or(DEFAULT_LOG_FILTER);
    let mut builder = env_logger::Builder::from_env(env);
    if let Some(filter) = cli_filter {
        builder.parse_filters(filter);
    }
    builder.format(|buf, record| {
        writeln!(
            buf,
            "[{:<5} {}] {}",
            record.level(),
            record.target(),
            record.args()
        )
    });
    builder.init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_filter.as_deref());

    let config = match &cli.config {
        Some(path) => KernelConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => KernelConfig::default(),
    };
    log::debug!("kernel config: {config:?}");
    let state = KernelState::new(config).context("Failed to set up the kernel")?;

    match cli.command {
        Commands::Drain(args) => commands::drain::run(&state, &args),
        Commands::Schema => commands::schema::run(&state),
    }
}
