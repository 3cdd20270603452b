//! Root CLI structure for ossa

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::simulate::SimulateArgs;

#[derive(Parser)]
#[command(name = "ossa")]
#[command(about = "Inspect, sample and simulate skeletal animation rigs", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Display information about a rig file
    Info {
        /// Path to the rig JSON file
        file: PathBuf,

        /// Show joints and mesh parts
        #[arg(short, long)]
        detailed: bool,
    },

    /// Print the pose of every joint at a time ratio
    Sample {
        /// Path to the rig JSON file
        file: PathBuf,

        /// Time ratio in [0, 1]
        #[arg(short, long, default_value = "0.0")]
        ratio: f32,
    },

    /// Run the full pipeline for a number of frames
    Simulate(SimulateArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
