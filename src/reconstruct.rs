//! Regrouping a reading-order word stream into visual lines.
//!
//! The engine reports each word's line position rather than a line id.
//! Consecutive words whose positions lie within the threshold of the line
//! currently being built are joined; any larger jump closes that line.
//! Words are never reordered, only grouped.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::corrector::LexicalCorrector;

/// Position of the line currently being built before any word is seen.
/// Valid positions are in `[0, 1]`, so it never matches.
const NO_LINE: f64 = -1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedWord {
    pub text: String,
    /// Normalized y of the top-left corner of the word's source line.
    pub line_vertical_position: f64,
}

impl RecognizedWord {
    pub fn new(text: impl Into<String>, line_vertical_position: f64) -> Self {
        Self {
            text: text.into(),
            line_vertical_position,
        }
    }
}

/// Cleaned tokens of one visual line, in stream order. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconstructedLine {
    tokens: Vec<String>,
}

impl ReconstructedLine {
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn text(&self) -> String {
        self.tokens.join(" ")
    }
}

impl fmt::Display for ReconstructedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Newline-joined document text.
pub fn full_text(lines: &[ReconstructedLine]) -> String {
    lines
        .iter()
        .map(ReconstructedLine::text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Groups words into lines, cleaning each word with a shared corrector.
#[derive(Debug, Clone, Copy)]
pub struct LineReconstructor<'a> {
    corrector: &'a LexicalCorrector,
    threshold: f64,
}

impl<'a> LineReconstructor<'a> {
    pub fn new(corrector: &'a LexicalCorrector, threshold: f64) -> Self {
        Self {
            corrector,
            threshold,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn reconstruct(&self, words: &[RecognizedWord]) -> Vec<ReconstructedLine> {
        let mut lines = Vec::new();
        let mut pending: Vec<String> = Vec::new();
        let mut current_y = NO_LINE;
        let mut skipped = 0usize;
        let mut total_subs: u64 = 0;

        for word in words {
            let (cleaned, subs) = self.corrector.clean_counted(&word.text);
            total_subs += subs;
            if cleaned.is_empty() {
                skipped += 1;
                continue;
            }

            // Negated so a NaN position always starts a new line.
            let same_line = (word.line_vertical_position - current_y).abs() <= self.threshold;
            if !same_line {
                if !pending.is_empty() {
                    lines.push(ReconstructedLine {
                        tokens: std::mem::take(&mut pending),
                    });
                }
                current_y = word.line_vertical_position;
            }
            pending.push(cleaned);
        }

        if !pending.is_empty() {
            lines.push(ReconstructedLine { tokens: pending });
        }

        debug!(
            words = words.len(),
            skipped,
            lines = lines.len(),
            substitutions = total_subs,
            "Reconstructed lines"
        );

        lines
    }
}
