//! Declarative rule tables and pipeline construction.
//!
//! A [`RuleTable`] is configuration: the alphabet, optional input and output
//! filters, and the ordered rules. With the `serialization` feature it
//! round-trips through JSON, so a deployment can ship an alternative table
//! without recompiling.
//!
//! [`build_pipeline`] turns a table into a [`CompiledCascade`];
//! [`PipelineHandle`] holds the current cascade and lets a new one be
//! published atomically while readers keep using the one they started with.
//!
//! # Example
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use kazakh_fst::kazakh::phonology_table;
//! use kazakh_fst::pipeline::{build_phonology_pipeline, PipelineHandle};
//!
//! let handle = PipelineHandle::new(build_phonology_pipeline(&phonology_table())?);
//! assert_eq!(handle.resolve_str("seniń")?, "senɪŋ");
//!
//! // later, possibly from another thread
//! let mut edited = phonology_table();
//! edited.rules.retain(|rule| rule.name != "initial-glide");
//! handle.reload(&edited)?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::alphabet::{Alphabet, Label};
use crate::cascade::{Cascade, CompiledCascade};
use crate::error::{CompileResult, ResolveResult};
use crate::pattern::Pattern;
use crate::rewrite::Rule;

/// Everything needed to build one pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct RuleTable {
    /// Pipeline and alphabet name.
    pub name: String,
    /// Symbol spellings, in label order.
    pub symbols: Vec<String>,
    /// Extra spellings as `(alias, canonical)` pairs.
    #[cfg_attr(feature = "serialization", serde(default))]
    pub aliases: Vec<(String, String)>,
    /// Acceptor placed before the first rule.
    #[cfg_attr(feature = "serialization", serde(default))]
    pub input_filter: Option<Pattern>,
    /// Acceptor placed after the last rule.
    #[cfg_attr(feature = "serialization", serde(default))]
    pub output_filter: Option<Pattern>,
    /// Rules in application order.
    pub rules: Vec<Rule>,
}

impl RuleTable {
    /// Build the table's alphabet.
    pub fn alphabet(&self) -> CompileResult<Arc<Alphabet>> {
        let builder = Alphabet::builder(self.name.clone()).symbols(self.symbols.iter().cloned());
        self.aliases
            .iter()
            .fold(builder, |b, (alias, canonical)| b.alias(alias.clone(), canonical.clone()))
            .build()
    }

    /// The uncompiled cascade: input filter, rules, output filter.
    pub fn cascade(&self) -> CompileResult<Cascade> {
        let mut cascade = Cascade::new(self.name.clone(), self.alphabet()?);
        if let Some(filter) = &self.input_filter {
            cascade = cascade.filter(filter.clone());
        }
        cascade = cascade.rules(self.rules.iter().cloned());
        if let Some(filter) = &self.output_filter {
            cascade = cascade.filter(filter.clone());
        }
        Ok(cascade)
    }

    /// Parse a table from JSON.
    #[cfg(feature = "serialization")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Pretty-printed JSON.
    #[cfg(feature = "serialization")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Compile a rule table.
pub fn build_pipeline(table: &RuleTable) -> CompileResult<CompiledCascade> {
    let compiled = table.cascade()?.compile()?;
    info!(
        pipeline = %table.name,
        rules = table.rules.len(),
        states = compiled.automaton().num_states(),
        transitions = compiled.automaton().num_transitions(),
        "pipeline built"
    );
    Ok(compiled)
}

/// Compile a grapheme-to-phoneme table.
///
/// Phonology tables are expected to restrict both sides, graphemes in and
/// phonemes out; a table without filters still builds but accepts and
/// produces any symbol sequence.
pub fn build_phonology_pipeline(table: &RuleTable) -> CompileResult<CompiledCascade> {
    if table.input_filter.is_none() || table.output_filter.is_none() {
        info!(pipeline = %table.name, "phonology table without input or output filter");
    }
    build_pipeline(table)
}

/// Compile an inflection table.
///
/// Morphology tables usually carry only an output filter, which rejects any
/// result that still contains unconsumed tag symbols.
pub fn build_morphology_pipeline(table: &RuleTable) -> CompileResult<CompiledCascade> {
    if table.output_filter.is_none() {
        info!(pipeline = %table.name, "morphology table without output filter");
    }
    build_pipeline(table)
}

/// Shared, replaceable reference to a compiled cascade.
///
/// Readers take a snapshot with [`current`](Self::current) (a pointer copy
/// under a read lock) and resolve without holding any lock. Writers swap in
/// a fully built cascade; a table that fails to compile leaves the current
/// cascade in place.
#[derive(Debug)]
pub struct PipelineHandle {
    current: RwLock<Arc<CompiledCascade>>,
}

impl PipelineHandle {
    /// Handle serving `cascade`.
    pub fn new(cascade: CompiledCascade) -> Self {
        PipelineHandle {
            current: RwLock::new(Arc::new(cascade)),
        }
    }

    /// The cascade currently served.
    pub fn current(&self) -> Arc<CompiledCascade> {
        Arc::clone(&self.current.read())
    }

    /// Publish `cascade`, returning the one it replaces.
    pub fn replace(&self, cascade: CompiledCascade) -> Arc<CompiledCascade> {
        std::mem::replace(&mut *self.current.write(), Arc::new(cascade))
    }

    /// Compile `table` and publish the result.
    ///
    /// Compilation happens before the write lock is taken.
    pub fn reload(&self, table: &RuleTable) -> CompileResult<()> {
        let compiled = build_pipeline(table)?;
        self.replace(compiled);
        Ok(())
    }

    /// Resolve against the current cascade.
    pub fn resolve(&self, input: &str) -> ResolveResult<Vec<Label>> {
        self.current().resolve(input)
    }

    /// Resolve against the current cascade and render the output.
    pub fn resolve_str(&self, input: &str) -> ResolveResult<String> {
        self.current().resolve_str(input)
    }
}
