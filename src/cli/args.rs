//! CLI argument definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Top-level arguments
#[derive(Parser)]
#[command(name = "kazakh-fst")]
#[command(about = "Kazakh phonology and morphology with compiled rewrite cascades")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[allow(missing_docs)]
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Convert words to phonemes
    G2p {
        /// Words to convert (read from stdin, one per line, if omitted)
        words: Vec<String>,

        /// Rule table to use instead of the built-in one
        #[arg(short, long)]
        rules: Option<PathBuf>,
    },

    /// Inflect tagged words such as bala+PLR+DAT
    Inflect {
        /// Tagged words (read from stdin, one per line, if omitted)
        words: Vec<String>,

        /// Rule table to use instead of the built-in one
        #[arg(short, long)]
        rules: Option<PathBuf>,
    },

    /// Print a built-in rule table as JSON
    Export {
        /// Which table
        table: TableKind,
    },

    /// Show the size of a compiled pipeline
    Info {
        /// Which table
        table: TableKind,

        /// Rule table to use instead of the built-in one
        #[arg(short, long)]
        rules: Option<PathBuf>,
    },
}

/// Built-in rule tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TableKind {
    /// Grapheme-to-phoneme rules
    Phonology,
    /// Inflection rules
    Morphology,
}
