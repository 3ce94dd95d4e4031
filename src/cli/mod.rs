//! Command-line front end.
//!
//! Runs the built-in Kazakh pipelines, or pipelines built from a JSON rule
//! table, over words given as arguments or read from standard input.

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, TableKind};
