mod config;
mod run_cmd;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "lmsprobe",
    version,
    about = "Scenario-driven integration tests for learning-platform course APIs"
)]
struct Cli {
    /// Path to lmsprobe.toml (default: ./lmsprobe.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run catalog scenarios against the configured service
    Run(run_cmd::RunArgs),

    /// List suites and scenarios
    List {
        /// Only this suite
        #[arg(long)]
        suite: Option<String>,
    },

    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("lmsprobe=info"))
        .add_directive(tracing::Level::WARN.into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match dispatch(cli).await {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    }
}

async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.command {
        Commands::List { suite } => {
            run_cmd::list(suite.as_deref())?;
            Ok(0)
        }
        Commands::Config => {
            let loaded = config::load(cli.config.as_deref())?;
            config::show_config(&loaded)?;
            Ok(0)
        }
        Commands::Run(args) => {
            let loaded = config::load(cli.config.as_deref())?;
            let status = run_cmd::run(args, loaded).await?;
            Ok(status.exit_code())
        }
    }
}
