//! OCR engine output as exported to JSON.
//!
//! The layout is page -> block -> line -> word, every element carrying a
//! normalized geometry (points in `[0, 1]`, first point top-left). Only the
//! parts needed for line reconstruction are modeled; other fields in the
//! export are ignored.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};
use crate::reconstruct::RecognizedWord;

/// Normalized `[x, y]` points. Two points for straight boxes, four for
/// rotated ones. Points are kept as read; a short point simply has no y.
pub type Geometry = Vec<Vec<f64>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrDocument {
    #[serde(default)]
    pub pages: Vec<Page>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub page_idx: usize,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default, deserialize_with = "nullable_geometry")]
    pub geometry: Geometry,
    #[serde(default)]
    pub lines: Vec<Line>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Line {
    #[serde(default, deserialize_with = "nullable_geometry")]
    pub geometry: Geometry,
    #[serde(default)]
    pub words: Vec<Word>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub value: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default, deserialize_with = "nullable_geometry")]
    pub geometry: Geometry,
}

impl OcrDocument {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::OcrExport)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    fn lines(&self) -> impl Iterator<Item = &Line> {
        self.pages
            .iter()
            .flat_map(|page| &page.blocks)
            .flat_map(|block| &block.lines)
    }

    /// Every word in reading order, tagged with its line's vertical position.
    pub fn words(&self) -> Vec<RecognizedWord> {
        self.lines()
            .flat_map(|line| {
                let y = line.vertical_position();
                line.words
                    .iter()
                    .map(move |word| RecognizedWord::new(word.value.clone(), y))
            })
            .collect()
    }

    /// One entry per OCR line, its words joined by single spaces.
    pub fn line_segments(&self) -> Vec<RecognizedWord> {
        self.lines()
            .map(|line| RecognizedWord::new(line.text(), line.vertical_position()))
            .collect()
    }

    pub fn word_count(&self) -> usize {
        self.lines().map(|line| line.words.len()).sum()
    }
}

impl Line {
    /// y of the top-left corner, or NaN when the engine gave no usable
    /// geometry.
    pub fn vertical_position(&self) -> f64 {
        self.geometry
            .first()
            .and_then(|point| point.get(1).copied())
            .unwrap_or(f64::NAN)
    }

    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.value.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// `null` geometry is treated like a missing one.
fn nullable_geometry<'de, D>(deserializer: D) -> std::result::Result<Geometry, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Geometry>::deserialize(deserializer)?.unwrap_or_default())
}
