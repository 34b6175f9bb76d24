//! # Trellis CLI Module
//!
//! This module implements the CLI interface for Trellis.
//!
//! ## Available Commands
//!
//! - `generate` - Build a synthetic graph and report its shape
//! - `run` - Build a pipeline and stream its vertices as JSON lines
//! - `capabilities` - Show which capabilities a pipeline's final graph offers

mod commands;

use crate::config::CliError;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Trellis - lazy graph pipelines
///
/// Builds a graph source, stacks filter, reverse, hierarchy and actor stages
/// on top of it, and pulls vertices through the result on demand.
#[derive(Parser, Debug)]
#[command(name = "trellis")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (debug-level engine events)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Shapes the `generate` command can build.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorKind {
    /// Undirected complete graph
    Complete,
    /// Path graph
    Path,
    /// Undirected ring
    Cyclic,
    /// Directed hub and spokes
    Hub,
    /// Seeded random undirected graph
    Random,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a synthetic graph and report vertex, edge and degree counts
    Generate {
        /// Graph shape
        #[arg(short, long, value_enum)]
        kind: GeneratorKind,

        /// Number of vertices
        #[arg(short, long)]
        count: usize,

        /// Directed edges (path graphs only)
        #[arg(short, long)]
        directed: bool,

        /// Seed (random graphs only)
        #[arg(short, long, default_value = "0")]
        seed: u64,

        /// Number of edges (random graphs only, defaults to the vertex count)
        #[arg(short, long)]
        edges: Option<usize>,
    },

    /// Build a pipeline and stream its vertices as JSON lines
    Run {
        /// Path to the pipeline TOML file
        #[arg(short, long)]
        pipeline: PathBuf,

        /// Maximum number of vertices to emit (required for infinite graphs)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show the capability table of a pipeline's final graph
    Capabilities {
        /// Path to the pipeline TOML file
        #[arg(short, long)]
        pipeline: PathBuf,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), CliError> {
    let json_mode = cli.json_mode;

    match cli.command {
        Commands::Generate {
            kind,
            count,
            directed,
            seed,
            edges,
        } => cmd_generate(json_mode, kind, count, directed, seed, edges),
        Commands::Run { pipeline, limit } => cmd_run(&pipeline, limit),
        Commands::Capabilities { pipeline } => cmd_capabilities(&pipeline, json_mode),
    }
}
