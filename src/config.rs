//! Rule configuration for line reconstruction and lexical correction.
//!
//! Everything domain-specific lives here: the line-grouping threshold, the
//! lexicon of known misreadings, stray-character rewrites and the unit
//! patterns. [`CleanerConfig::default`] is the built-in German medical rule
//! set. A TOML file can replace any section; sections it leaves out fall
//! back to the built-in ones.
//!
//! ```toml
//! [reconstruction]
//! line_threshold = 0.01
//! granularity = "word"
//!
//! [[lexicon]]
//! wrong = "Abklarung"
//! correct = "Abklärung"
//!
//! [[special_chars]]
//! from = "â"
//! to = "ä"
//!
//! [[unit_rules]]
//! pattern = "/u1"
//! replacement = "/µl"
//! letter_guard = true
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};

/// Built-in lexicon: OCR drops the umlaut on these terms.
const BASE_LEXICON: &[(&str, &str)] = &[
    ("Abklarung", "Abklärung"),
    ("Aktivitat", "Aktivität"),
    ("Aktivitatsparameter", "Aktivitätsparameter"),
];

/// Circumflex/grave vowels the recognizer emits where an umlaut was printed.
const SPECIAL_CHARS: &[(&str, &str)] = &[
    ("â", "ä"),
    ("ô", "ö"),
    ("û", "ü"),
    ("à", "ä"),
    ("Â", "Ä"),
    ("Ô", "Ö"),
    ("Û", "Ü"),
    ("À", "Ä"),
];

/// Garbled lab units: (pattern, replacement, letter_guard).
const UNIT_RULES: &[(&str, &str, bool)] = &[
    (r"/u1", "/µl", true),
    (r"g7dl", "g/dl", true),
    (r"g7a1", "g/dl", true),
    (r"(<\s*\d+|\d+)\s*Apl", "${1} /µl", false),
];

/// Complete rule set, as loaded from TOML or built in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanerConfig {
    #[serde(default)]
    pub reconstruction: ReconstructionConfig,
    /// Whole-word `wrong -> correct` entries, applied in order.
    #[serde(default = "default_lexicon")]
    pub lexicon: Vec<LexiconEntry>,
    #[serde(default = "default_special_chars")]
    pub special_chars: Vec<SpecialCharRule>,
    #[serde(default = "default_unit_rules")]
    pub unit_rules: Vec<UnitRule>,
    #[serde(default)]
    pub annotation: AnnotationConfig,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            reconstruction: ReconstructionConfig::default(),
            lexicon: default_lexicon(),
            special_chars: default_special_chars(),
            unit_rules: default_unit_rules(),
            annotation: AnnotationConfig::default(),
        }
    }
}

impl CleanerConfig {
    /// Load and validate a rule set from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is malformed,
    /// or [`CleanerConfig::validate`] rejects the result.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_str(&content)?;
        info!(
            path = %path.display(),
            lexicon = config.lexicon.len(),
            special_chars = config.special_chars.len(),
            unit_rules = config.unit_rules.len(),
            "Loaded rule configuration"
        );
        Ok(config)
    }

    /// Parse and validate a rule set from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the parts of the configuration that serde cannot.
    ///
    /// Regex syntax is checked later, when the corrector compiles the
    /// unit rules.
    pub fn validate(&self) -> Result<()> {
        let threshold = self.reconstruction.line_threshold;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(Error::InvalidThreshold(threshold));
        }
        if let Some(entry) = self.lexicon.iter().find(|e| e.wrong.is_empty()) {
            return Err(Error::EmptyLexiconKey(entry.correct.clone()));
        }
        Ok(())
    }
}

/// How OCR output is grouped back into lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconstructionConfig {
    /// Maximum vertical distance between two words on the same line.
    #[serde(default = "default_line_threshold")]
    pub line_threshold: f64,
    #[serde(default)]
    pub granularity: Granularity,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            line_threshold: default_line_threshold(),
            granularity: Granularity::default(),
        }
    }
}

fn default_line_threshold() -> f64 {
    0.01
}

/// Unit fed into the reconstructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Each recognized word is cleaned on its own.
    #[default]
    Word,
    /// Each OCR line is joined first and cleaned as one piece, so patterns
    /// spanning several words (`< 100 Apl`) still match.
    Line,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconEntry {
    pub wrong: String,
    pub correct: String,
}

impl LexiconEntry {
    pub fn new(wrong: impl Into<String>, correct: impl Into<String>) -> Self {
        Self {
            wrong: wrong.into(),
            correct: correct.into(),
        }
    }
}

/// Literal, case-sensitive substring rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialCharRule {
    pub from: String,
    pub to: String,
}

/// Regex rewrite. `replacement` may reference capture groups (`${1}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRule {
    pub pattern: String,
    pub replacement: String,
    /// Skip matches immediately followed by an ASCII letter.
    ///
    /// Unlike a `(?![a-zA-Z])` lookahead, a rejected match is dropped
    /// whole: the engine does not retry a shorter match at the same start.
    /// With a variable-length pattern such as `(\d+)`, `12a` is left
    /// untouched instead of rewriting `1`. Keep guarded patterns literal.
    #[serde(default)]
    pub letter_guard: bool,
}

/// Fixed identifiers stamped on every annotation record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationConfig {
    #[serde(default = "default_one")]
    pub id: u64,
    #[serde(default = "default_one")]
    pub inner_id: u64,
    #[serde(default = "default_project")]
    pub project: u64,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            id: default_one(),
            inner_id: default_one(),
            project: default_project(),
        }
    }
}

fn default_one() -> u64 {
    1
}

fn default_project() -> u64 {
    3
}

fn default_lexicon() -> Vec<LexiconEntry> {
    BASE_LEXICON
        .iter()
        .map(|(wrong, correct)| LexiconEntry::new(*wrong, *correct))
        .collect()
}

fn default_special_chars() -> Vec<SpecialCharRule> {
    SPECIAL_CHARS
        .iter()
        .map(|(from, to)| SpecialCharRule {
            from: from.to_string(),
            to: to.to_string(),
        })
        .collect()
}

fn default_unit_rules() -> Vec<UnitRule> {
    UNIT_RULES
        .iter()
        .map(|(pattern, replacement, letter_guard)| UnitRule {
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
            letter_guard: *letter_guard,
        })
        .collect()
}
