//! From OCR export to corrected text and annotation record.

use std::path::Path;

use lazy_static::lazy_static;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::annotation::AnnotationRecord;
use crate::config::{AnnotationConfig, CleanerConfig, Granularity, ReconstructionConfig};
use crate::corrector::LexicalCorrector;
use crate::error::Result;
use crate::ocr::OcrDocument;
use crate::reconstruct::{self, LineReconstructor, ReconstructedLine, RecognizedWord};

lazy_static! {
    static ref BUILTIN: PostProcessor =
        PostProcessor::new(CleanerConfig::default()).expect("built-in rule set compiles");
}

/// Post-processor built with the built-in German medical rule set.
pub fn builtin() -> &'static PostProcessor {
    &BUILTIN
}

/// Compiled configuration. Read-only after construction; share it by
/// reference across threads.
#[derive(Debug, Clone)]
pub struct PostProcessor {
    corrector: LexicalCorrector,
    reconstruction: ReconstructionConfig,
    annotation: AnnotationConfig,
}

impl PostProcessor {
    pub fn new(config: CleanerConfig) -> Result<Self> {
        config.validate()?;
        let corrector = LexicalCorrector::from_config(&config)?;
        info!(
            lexicon = corrector.lexicon().len(),
            line_threshold = config.reconstruction.line_threshold,
            granularity = ?config.reconstruction.granularity,
            "Post-processor ready"
        );
        Ok(Self {
            corrector,
            reconstruction: config.reconstruction,
            annotation: config.annotation,
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(CleanerConfig::from_file(path)?)
    }

    pub fn corrector(&self) -> &LexicalCorrector {
        &self.corrector
    }

    pub fn reconstructor(&self) -> LineReconstructor<'_> {
        LineReconstructor::new(&self.corrector, self.reconstruction.line_threshold)
    }

    pub fn correct(&self, text: &str) -> String {
        self.corrector.correct(text)
    }

    /// Group an already flattened word stream.
    pub fn reconstruct(&self, words: &[RecognizedWord]) -> Vec<ReconstructedLine> {
        self.reconstructor().reconstruct(words)
    }

    fn stream(&self, doc: &OcrDocument) -> Vec<RecognizedWord> {
        match self.reconstruction.granularity {
            Granularity::Word => doc.words(),
            Granularity::Line => doc.line_segments(),
        }
    }

    pub fn process(&self, doc: &OcrDocument) -> Vec<ReconstructedLine> {
        let stream = self.stream(doc);
        debug!(
            pages = doc.pages.len(),
            segments = stream.len(),
            "Processing OCR document"
        );
        self.reconstruct(&stream)
    }

    pub fn full_text(&self, doc: &OcrDocument) -> String {
        reconstruct::full_text(&self.process(doc))
    }

    pub fn annotate(&self, doc: &OcrDocument) -> AnnotationRecord {
        AnnotationRecord::new(self.full_text(doc), &self.annotation)
    }

    /// Process independent documents in parallel. Output order follows
    /// input order.
    pub fn process_batch(&self, docs: &[OcrDocument]) -> Vec<Vec<ReconstructedLine>> {
        docs.par_iter().map(|doc| self.process(doc)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::{Block, Line, Page, Word};
    use pretty_assertions::assert_eq;

    fn line(y: f64, words: &[&str]) -> Line {
        Line {
            geometry: vec![vec![0.05, y], vec![0.9, y + 0.02]],
            words: words
                .iter()
                .map(|w| Word {
                    value: w.to_string(),
                    confidence: 0.9,
                    geometry: vec![],
                })
                .collect(),
        }
    }

    fn document(lines: Vec<Line>) -> OcrDocument {
        OcrDocument {
            pages: vec![Page {
                page_idx: 0,
                blocks: vec![Block {
                    geometry: vec![],
                    lines,
                }],
            }],
        }
    }

    fn lab_report() -> OcrDocument {
        // Two OCR lines on the same visual row (separate columns), then one below.
        document(vec![
            line(0.10, &["Abklarung", "Aktivitat"]),
            line(0.104, &["Thrombozyten", "<", "100", "Apl"]),
            line(0.20, &["Hb", "12.5", "g7dl"]),
        ])
    }

    #[test]
    fn word_granularity_corrects_each_word() {
        let processor = builtin();
        assert_eq!(
            processor.full_text(&lab_report()),
            "Abklärung Aktivität Thrombozyten < 100 Apl\nHb 12.5 g/dl"
        );
    }

    #[test]
    fn line_granularity_sees_patterns_across_words() {
        let config = CleanerConfig {
            reconstruction: ReconstructionConfig {
                granularity: Granularity::Line,
                ..ReconstructionConfig::default()
            },
            ..CleanerConfig::default()
        };
        let processor = PostProcessor::new(config).unwrap();
        assert_eq!(
            processor.full_text(&lab_report()),
            "Abklärung Aktivität Thrombozyten < 100 /µl\nHb 12.5 g/dl"
        );
    }

    #[test]
    fn empty_document_has_empty_text() {
        let processor = builtin();
        assert!(processor.process(&OcrDocument::default()).is_empty());
        assert_eq!(processor.full_text(&OcrDocument::default()), "");
    }

    #[test]
    fn annotate_wraps_full_text() {
        let record = builtin().annotate(&lab_report());
        assert_eq!(record.full_text(), builtin().full_text(&lab_report()));
        assert_eq!(record.project, 3);
    }

    #[test]
    fn threshold_is_configurable() {
        let config = CleanerConfig {
            reconstruction: ReconstructionConfig {
                line_threshold: 0.2,
                ..ReconstructionConfig::default()
            },
            ..CleanerConfig::default()
        };
        let processor = PostProcessor::new(config).unwrap();
        assert_eq!(processor.reconstructor().threshold(), 0.2);
        assert_eq!(processor.process(&lab_report()).len(), 1);
    }

    #[test]
    fn loads_shipped_rule_file() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/rules/de_medical.toml");
        let processor = PostProcessor::from_file(path).unwrap();
        assert_eq!(processor.reconstructor().threshold(), 0.01);
        assert_eq!(processor.full_text(&lab_report()), builtin().full_text(&lab_report()));
    }

    #[test]
    fn missing_rule_file_is_reported() {
        assert!(matches!(
            PostProcessor::from_file("no/such/rules.toml"),
            Err(crate::Error::Io { .. })
        ));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = CleanerConfig {
            reconstruction: ReconstructionConfig {
                line_threshold: f64::INFINITY,
                ..ReconstructionConfig::default()
            },
            ..CleanerConfig::default()
        };
        assert!(PostProcessor::new(config).is_err());
    }

    #[test]
    fn batch_preserves_order() {
        let docs = vec![
            document(vec![line(0.1, &["eins"])]),
            OcrDocument::default(),
            document(vec![line(0.1, &["zwei"]), line(0.5, &["drei"])]),
        ];
        let results = builtin().process_batch(&docs);
        let texts: Vec<String> = results.iter().map(|lines| reconstruct::full_text(lines)).collect();
        assert_eq!(texts, vec!["eins", "", "zwei\ndrei"]);
    }

    #[test]
    fn processor_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PostProcessor>();
    }
}
