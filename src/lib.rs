//! Post-recognition cleanup for OCR'd documents.
//!
//! Takes the word stream an OCR engine produced for a page image, regroups
//! it into visual lines and repairs systematic misreadings (dropped
//! umlauts, confused accents, garbled lab units) before the text is
//! wrapped into an annotation record.
//!
//! ```
//! use ocr_line_clean::{RecognizedWord, pipeline};
//!
//! let words = vec![
//!     RecognizedWord::new("Abklarung", 0.10),
//!     RecognizedWord::new("Tag", 0.10),
//!     RecognizedWord::new("Wert", 0.50),
//! ];
//! let lines = pipeline::builtin().reconstruct(&words);
//! assert_eq!(ocr_line_clean::full_text(&lines), "Abklärung Tag\nWert");
//! ```
//!
//! Built with the `python` feature, the crate is also a Python extension
//! module named `ocr_line_clean`.

pub mod annotation;
pub mod config;
pub mod corrector;
pub mod error;
pub mod lexicon;
pub mod ocr;
pub mod pipeline;
pub mod reconstruct;

pub use annotation::AnnotationRecord;
pub use config::{CleanerConfig, Granularity};
pub use corrector::LexicalCorrector;
pub use error::{Error, Result};
pub use ocr::OcrDocument;
pub use pipeline::PostProcessor;
pub use reconstruct::{LineReconstructor, ReconstructedLine, RecognizedWord, full_text};

/// Correct `text` with the built-in rule set.
pub fn correct(text: &str) -> String {
    pipeline::builtin().correct(text)
}

/// Reconstruct lines from a word stream with the built-in rule set.
pub fn reconstruct(words: &[RecognizedWord]) -> Vec<ReconstructedLine> {
    pipeline::builtin().reconstruct(words)
}

#[cfg(feature = "python")]
mod python {
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::{OcrDocument, RecognizedWord, pipeline};

    fn to_words(words: Vec<(String, f64)>) -> Vec<RecognizedWord> {
        words
            .into_iter()
            .map(|(text, y)| RecognizedWord::new(text, y))
            .collect()
    }

    /// Correct OCR misreadings in a piece of text
    #[pyfunction]
    fn correct_text(text: String) -> PyResult<String> {
        Ok(crate::correct(&text))
    }

    /// Correct text and count substitutions
    /// Returns: (corrected_text, substitution_count)
    #[pyfunction]
    fn correct_text_counted(text: String) -> PyResult<(String, u64)> {
        Ok(pipeline::builtin().corrector().correct_counted(&text))
    }

    /// Group (text, line_y) pairs into corrected lines
    #[pyfunction]
    fn reconstruct_lines(words: Vec<(String, f64)>) -> PyResult<Vec<String>> {
        let lines = crate::reconstruct(&to_words(words));
        Ok(lines.iter().map(|line| line.text()).collect())
    }

    /// Group (text, line_y) pairs and join the lines with newlines
    #[pyfunction]
    fn full_text(words: Vec<(String, f64)>) -> PyResult<String> {
        Ok(crate::full_text(&crate::reconstruct(&to_words(words))))
    }

    /// Turn an exported OCR result (JSON) into an annotation record (JSON)
    #[pyfunction]
    fn annotate_export(export_json: String) -> PyResult<String> {
        let doc = OcrDocument::from_json(&export_json)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        pipeline::builtin()
            .annotate(&doc)
            .to_json()
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    #[pymodule]
    fn ocr_line_clean(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(correct_text, m)?)?;
        m.add_function(wrap_pyfunction!(correct_text_counted, m)?)?;
        m.add_function(wrap_pyfunction!(reconstruct_lines, m)?)?;
        m.add_function(wrap_pyfunction!(full_text, m)?)?;
        m.add_function(wrap_pyfunction!(annotate_export, m)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builtin_corrections() {
        assert_eq!(correct("ABKLARUNG"), "ABKLÄRUNG");
        assert_eq!(correct("Abklarung"), "Abklärung");
        assert_eq!(correct("Âlter"), "Älter");
        assert_eq!(correct("3.5 g7dl"), "3.5 g/dl");
        assert_eq!(correct("120/u1"), "120/µl");
        assert_eq!(correct("< 100 Apl"), "< 100 /µl");
        assert_eq!(correct("gradient"), "gradient");
    }

    #[test]
    fn builtin_reconstruction() {
        let words = vec![
            RecognizedWord::new("Abklarung", 0.10),
            RecognizedWord::new("Tag", 0.10),
            RecognizedWord::new("Wert", 0.50),
        ];
        let lines = reconstruct(&words);
        assert_eq!(lines.len(), 2);
        assert_eq!(full_text(&lines), "Abklärung Tag\nWert");
    }

    #[test]
    fn builtin_is_shared_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|i| std::thread::spawn(move || correct(&format!("{i} g7dl Abklarung"))))
            .collect();
        let results: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(
            results,
            vec![
                "0 g/dl Abklärung",
                "1 g/dl Abklärung",
                "2 g/dl Abklärung",
                "3 g/dl Abklärung",
            ]
        );
    }
}
