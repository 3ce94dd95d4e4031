//! CLI command implementations

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::cascade::CompiledCascade;
use crate::kazakh::{morphology_table, phonology_table};
use crate::pipeline::{build_morphology_pipeline, build_phonology_pipeline, RuleTable};

use super::args::{Commands, TableKind};

/// Execute a CLI command
pub fn execute(command: Commands) -> Result<()> {
    match command {
        Commands::G2p { words, rules } => {
            let cascade = build(TableKind::Phonology, rules.as_deref())?;
            cmd_resolve(&cascade, words)
        }
        Commands::Inflect { words, rules } => {
            let cascade = build(TableKind::Morphology, rules.as_deref())?;
            cmd_resolve(&cascade, words)
        }
        Commands::Export { table } => cmd_export(table),
        Commands::Info { table, rules } => cmd_info(table, rules),
    }
}

/// Load a rule table from `path`, or the built-in table of `kind`.
pub fn load_table(kind: TableKind, path: Option<&Path>) -> Result<RuleTable> {
    let Some(path) = path else {
        return Ok(builtin_table(kind));
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rule table: {}", path.display()))?;
    RuleTable::from_json(&json)
        .with_context(|| format!("Failed to parse rule table: {}", path.display()))
}

fn builtin_table(kind: TableKind) -> RuleTable {
    match kind {
        TableKind::Phonology => phonology_table(),
        TableKind::Morphology => morphology_table(),
    }
}

fn build(kind: TableKind, path: Option<&Path>) -> Result<CompiledCascade> {
    let table = load_table(kind, path)?;
    let compiled = match kind {
        TableKind::Phonology => build_phonology_pipeline(&table),
        TableKind::Morphology => build_morphology_pipeline(&table),
    };
    compiled.with_context(|| format!("Failed to compile pipeline '{}'", table.name))
}

fn cmd_resolve(cascade: &CompiledCascade, words: Vec<String>) -> Result<()> {
    let words = if words.is_empty() {
        read_words(std::io::stdin().lock())?
    } else {
        words
    };

    let mut failed = 0usize;
    for word in &words {
        match cascade.resolve_str(word) {
            Ok(output) => println!("{}\t{}", word, output.green()),
            Err(e) => {
                failed += 1;
                eprintln!("{}\t{}", word.yellow(), e.to_string().red());
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} words could not be resolved", failed, words.len());
    }
    Ok(())
}

/// Read one word per line, skipping blank lines.
pub fn read_words<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let mut words = Vec::new();
    for line in reader.lines() {
        let line = line.context("Failed to read words")?;
        let word = line.trim();
        if !word.is_empty() {
            words.push(word.to_string());
        }
    }
    Ok(words)
}

/// A built-in rule table as JSON, in the format `load_table` reads.
pub fn export_table(kind: TableKind) -> Result<String> {
    builtin_table(kind)
        .to_json()
        .context("Failed to serialize rule table")
}

fn cmd_export(kind: TableKind) -> Result<()> {
    println!("{}", export_table(kind)?);
    Ok(())
}

fn cmd_info(kind: TableKind, rules: Option<PathBuf>) -> Result<()> {
    let cascade = build(kind, rules.as_deref())?;
    let fst = cascade.automaton();

    println!("{}", "Pipeline Information".bold().green());
    println!("  {}: {}", "Name".bold(), cascade.name());
    println!("  {}: {}", "Stages".bold(), cascade.num_stages());
    println!("  {}: {}", "Symbols".bold(), cascade.alphabet().len());
    println!("  {}: {}", "States".bold(), fst.num_states());
    println!("  {}: {}", "Transitions".bold(), fst.num_transitions());
    Ok(())
}
