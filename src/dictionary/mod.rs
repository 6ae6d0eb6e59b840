// Term dictionary matching.
//
// The dictionary is an ordered list of suspicious terms. Screening a table
// compiles the whole list into one alternation pattern and tests each row's
// text against it; single-text lookups scan the list in order so the caller
// can see which terms fired. Matching is case-insensitive everywhere.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use regex_lite::Regex;
use serde_json::Value;
use tracing::info;

use crate::error::ConfigurationError;
use crate::table::{cell_text, Row, Table};

/// Column written by [`TermDictionary::flag_rows`]: 1 for a hit, 0 otherwise.
pub const FLAG_COLUMN: &str = "flag";

#[derive(Debug, Clone, Default)]
pub struct TermDictionary {
    terms: Vec<String>,
}

impl TermDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            terms: terms.into_iter().map(Into::into).collect(),
        }
    }

    /// Load one term per line. Blank lines and `#` comments are skipped;
    /// surrounding whitespace is trimmed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading terms from {}", path.display()))?;
        let terms: Vec<String> = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();
        info!(terms = terms.len(), path = %path.display(), "Loaded term dictionary");
        Ok(Self { terms })
    }

    /// Replace the dictionary contents. Order matters: single-text lookups
    /// report terms in this order.
    pub fn set_terms(&mut self, terms: Vec<String>) {
        self.terms = terms;
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    fn require_terms(&self) -> Result<(), ConfigurationError> {
        if self.terms.is_empty() {
            return Err(ConfigurationError::EmptyDictionary);
        }
        Ok(())
    }

    /// Screen every row's `text_field` against the dictionary and return a
    /// copy of the table with a binary [`FLAG_COLUMN`] appended. Missing and
    /// non-string cells never match.
    pub fn flag_rows(&self, table: &Table, text_field: &str) -> Result<Table> {
        self.require_terms()?;
        if !table.has_column(text_field) {
            bail!(
                "table has no '{}' column (columns: {})",
                text_field,
                table.columns().join(", ")
            );
        }

        // One alternation over every term, escaped so regex metacharacters
        // inside a term match literally. Both sides are lowercased rather
        // than relying on the engine's ASCII-only `(?i)` folding.
        let pattern = self
            .terms
            .iter()
            .map(|term| regex_lite::escape(&term.to_lowercase()))
            .collect::<Vec<_>>()
            .join("|");
        let matcher = Regex::new(&pattern).context("building term alternation pattern")?;

        let flags: Vec<Value> = table
            .rows()
            .iter()
            .map(|row| {
                let text = cell_text(row, text_field).to_lowercase();
                Value::from(if matcher.is_match(&text) { 1 } else { 0 })
            })
            .collect();
        let hits = flags.iter().filter(|flag| **flag == Value::from(1)).count();

        let flagged = table.with_column(FLAG_COLUMN, flags)?;
        info!(rows = flagged.len(), matched = hits, "Screened rows against term dictionary");
        Ok(flagged)
    }

    /// First dictionary term contained in `text`, or `None` if nothing
    /// matches. Scans in dictionary order.
    pub fn find_match(&self, text: &str) -> Result<Option<String>> {
        self.require_terms()?;
        let haystack = text.to_lowercase();
        Ok(self
            .terms
            .iter()
            .find(|term| haystack.contains(&term.to_lowercase()))
            .cloned())
    }

    /// Every dictionary term contained in `text`, in dictionary order.
    /// `None` when nothing matches, so "no hit" reads the same as in
    /// [`TermDictionary::find_match`].
    pub fn find_matches(&self, text: &str) -> Result<Option<Vec<String>>> {
        self.require_terms()?;
        let haystack = text.to_lowercase();
        let matches: Vec<String> = self
            .terms
            .iter()
            .filter(|term| haystack.contains(&term.to_lowercase()))
            .cloned()
            .collect();
        Ok(if matches.is_empty() { None } else { Some(matches) })
    }
}

/// Rows of a screened table whose flag is set, in their original order.
/// Fails if the table was never screened.
pub fn select_flagged(table: &Table) -> Result<Table> {
    if !table.has_column(FLAG_COLUMN) {
        return Err(ConfigurationError::MissingFlagColumn.into());
    }
    Ok(table.filter_rows(|row| flag_is_set(row, FLAG_COLUMN)))
}

/// A flag cell counts as set when it holds the number 1, or the string "1"
/// for tables that went through a CSV round trip.
pub fn flag_is_set(row: &Row, column: &str) -> bool {
    match row.get(column) {
        Some(Value::Number(n)) => n.as_f64() == Some(1.0),
        Some(Value::String(s)) => s.trim() == "1",
        _ => false,
    }
}
