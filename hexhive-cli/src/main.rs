//! HEXHIVE CLI - Command-line interface
//!
//! Commands:
//! - play: Drive a level interactively in the terminal
//! - show: Print a level summary and ASCII map
//! - validate: Batch-check level files
//! - mesh: Export the tessellated level as JSON

use clap::{Parser, Subcommand};

mod ascii;
mod mesh;
mod play;
mod show;
mod validate;

#[derive(Parser)]
#[command(name = "hexhive")]
#[command(about = "HEXHIVE hexagonal block-pushing puzzle")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive a level interactively in the terminal
    Play(play::PlayArgs),
    /// Print a level summary and ASCII map
    Show(show::ShowArgs),
    /// Batch-check level files
    Validate(validate::ValidateArgs),
    /// Export the tessellated level as JSON
    Mesh(mesh::MeshArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => play::run(args),
        Commands::Show(args) => show::run(args),
        Commands::Validate(args) => validate::run(args),
        Commands::Mesh(args) => mesh::run(args),
    }
}
