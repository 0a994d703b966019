//! Lexical correction of recognized text.
//!
//! Three stages run in a fixed order: whole-word lexicon substitution,
//! stray-character substitution, then unit patterns. Every stage passes
//! unmatched text through unchanged, so [`LexicalCorrector::correct`] is
//! total.

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::config::{CleanerConfig, SpecialCharRule, UnitRule};
use crate::error::{Error, Result};
use crate::lexicon::Lexicon;

/// Upper bound on full correction passes over one text.
const MAX_PASSES: usize = 4;

/// A compiled unit rule.
///
/// The regex crate has no look-around, so `(?![a-zA-Z])` is emulated by
/// checking the character after each match.
#[derive(Debug, Clone)]
struct PatternRule {
    pattern: Regex,
    replacement: String,
    letter_guard: bool,
}

impl PatternRule {
    fn compile(rule: &UnitRule) -> Result<Self> {
        let pattern = Regex::new(&rule.pattern).map_err(|source| Error::InvalidPattern {
            pattern: rule.pattern.clone(),
            source,
        })?;
        Ok(Self {
            pattern,
            replacement: rule.replacement.clone(),
            letter_guard: rule.letter_guard,
        })
    }

    fn apply(&self, text: &str) -> (String, u64) {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        let mut subs: u64 = 0;

        for caps in self.pattern.captures_iter(text) {
            let Some(m) = caps.get(0) else { continue };
            if self.letter_guard
                && text[m.end()..]
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_alphabetic())
            {
                continue;
            }
            out.push_str(&text[last..m.start()]);
            caps.expand(&self.replacement, &mut out);
            last = m.end();
            subs += 1;
        }

        if subs == 0 {
            return (text.to_string(), 0);
        }
        out.push_str(&text[last..]);
        (out, subs)
    }
}

/// Immutable correction rule set, built once and shared by reference.
#[derive(Debug, Clone)]
pub struct LexicalCorrector {
    lexicon: Lexicon,
    special_chars: Vec<SpecialCharRule>,
    unit_rules: Vec<PatternRule>,
}

impl LexicalCorrector {
    pub fn from_config(config: &CleanerConfig) -> Result<Self> {
        let lexicon = Lexicon::expand(&config.lexicon)?;
        let unit_rules = config
            .unit_rules
            .iter()
            .map(PatternRule::compile)
            .collect::<Result<Vec<_>>>()?;
        let special_chars = config
            .special_chars
            .iter()
            .filter(|rule| !rule.from.is_empty())
            .cloned()
            .collect();

        Ok(Self {
            lexicon,
            special_chars,
            unit_rules,
        })
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Rewrite known misreadings in `text`.
    pub fn correct(&self, text: &str) -> String {
        self.correct_counted(text).0
    }

    /// Like [`correct`](Self::correct), also returning how many
    /// substitutions were made.
    pub fn correct_counted(&self, text: &str) -> (String, u64) {
        if text.is_empty() {
            return (String::new(), 0);
        }

        // One fix can expose another: in "/u1Apl" the Apl rule inserts a
        // space that lifts the letter guard on "/u1".
        let mut result = text.to_string();
        let mut total_subs: u64 = 0;
        for _ in 0..MAX_PASSES {
            let (next, subs) = self.run_stages(&result);
            result = next;
            total_subs += subs;
            if subs == 0 {
                break;
            }
        }
        (result, total_subs)
    }

    fn run_stages(&self, text: &str) -> (String, u64) {
        let (mut result, mut total_subs) = self.lexicon.apply(text);

        for rule in &self.special_chars {
            let count = result.matches(rule.from.as_str()).count();
            if count > 0 {
                result = result.replace(rule.from.as_str(), &rule.to);
                total_subs += count as u64;
            }
        }

        for rule in &self.unit_rules {
            let (next, subs) = rule.apply(&result);
            result = next;
            total_subs += subs;
        }

        (result, total_subs)
    }

    /// Per-token cleaning: trim, NFC-normalize, correct.
    ///
    /// An empty result means the token carries no text and must be dropped.
    pub fn clean(&self, raw: &str) -> String {
        self.clean_counted(raw).0
    }

    pub(crate) fn clean_counted(&self, raw: &str) -> (String, u64) {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return (String::new(), 0);
        }
        let normalized: String = trimmed.nfc().collect();
        self.correct_counted(&normalized)
    }
}
