mod commands;

use clap::{Parser, Subcommand};
use commands::{show, version};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "domcaps")]
#[command(about = "Describe what a hypervisor supports for a domain")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and print a domain capabilities document
    Show(show::ShowArgs),

    /// Show version information
    Version(version::VersionArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e:?}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Show(args) => show::run(args)?,
        Commands::Version(args) => version::run(args),
    }

    Ok(())
}
