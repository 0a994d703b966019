//! Whole-word lexicon of known OCR misreadings.
//!
//! The base table is expanded once with title-case and upper-case variants
//! and compiled to word-boundary regexes. After construction the lexicon is
//! read-only and can be shared between threads.

use std::collections::HashSet;

use regex::{NoExpand, Regex};
use tracing::debug;

use crate::config::LexiconEntry;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
struct CompiledEntry {
    wrong: String,
    correct: String,
    pattern: Regex,
}

/// Expanded, compiled lexicon.
#[derive(Debug, Clone)]
pub struct Lexicon {
    entries: Vec<CompiledEntry>,
    base_len: usize,
}

impl Lexicon {
    /// Build the lexicon from its base entries.
    ///
    /// Order is base entries first (duplicates keep their first mapping),
    /// then for each base entry its title-case variant followed by its
    /// upper-case variant. A variant is only added when its key differs from
    /// the base key and is not already present.
    pub fn expand(base: &[LexiconEntry]) -> Result<Self> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut pairs: Vec<(String, String)> = Vec::with_capacity(base.len() * 3);

        for entry in base {
            if entry.wrong.is_empty() {
                return Err(Error::EmptyLexiconKey(entry.correct.clone()));
            }
            if seen.insert(entry.wrong.clone()) {
                pairs.push((entry.wrong.clone(), entry.correct.clone()));
            }
        }
        let base_len = pairs.len();

        for i in 0..base_len {
            let (wrong, correct) = pairs[i].clone();
            // Title case first, then upper case.
            let variants = [
                (title_case(&wrong), title_case(&correct)),
                (wrong.to_uppercase(), correct.to_uppercase()),
            ];
            for (key, value) in variants {
                if key != wrong && seen.insert(key.clone()) {
                    pairs.push((key, value));
                }
            }
        }

        let entries = pairs
            .into_iter()
            .map(|(wrong, correct)| {
                let pattern = word_pattern(&wrong)?;
                Ok(CompiledEntry {
                    wrong,
                    correct,
                    pattern,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            base = base_len,
            derived = entries.len() - base_len,
            "Expanded lexicon"
        );

        Ok(Self { entries, base_len })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries taken from the base table.
    pub fn base_len(&self) -> usize {
        self.base_len
    }

    /// `(wrong, correct)` pairs in application order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|e| (e.wrong.as_str(), e.correct.as_str()))
    }

    /// Look up the correction for an exact key.
    pub fn get(&self, wrong: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.wrong == wrong)
            .map(|e| e.correct.as_str())
    }

    /// Replace every whole-word occurrence of each entry, in order.
    /// Returns the rewritten text and the number of substitutions.
    pub fn apply(&self, text: &str) -> (String, u64) {
        let mut result = text.to_string();
        let mut subs: u64 = 0;
        for entry in &self.entries {
            let count = entry.pattern.find_iter(&result).count();
            if count > 0 {
                result = entry
                    .pattern
                    .replace_all(&result, NoExpand(&entry.correct))
                    .into_owned();
                subs += count as u64;
            }
        }
        (result, subs)
    }
}

fn word_pattern(wrong: &str) -> Result<Regex> {
    let expr = format!(r"\b{}\b", regex::escape(wrong));
    Regex::new(&expr).map_err(|source| Error::InvalidPattern {
        pattern: expr,
        source,
    })
}

/// Uppercase the first letter of every letter run and lowercase the rest
/// (`"abklarung"` -> `"Abklarung"`, `"ph-wert"` -> `"Ph-Wert"`).
pub(crate) fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if in_word {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        in_word = c.is_alphabetic();
    }
    out
}
