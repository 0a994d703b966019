//! Labeling-tool annotation record wrapping the reconstructed text.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::config::AnnotationConfig;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationData {
    pub text: String,
}

/// A task without annotations, ready for import into the labeling tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    pub id: u64,
    pub data: AnnotationData,
    #[serde(default)]
    pub meta: serde_json::Map<String, serde_json::Value>,
    #[serde(serialize_with = "iso_utc")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "iso_utc")]
    pub updated_at: DateTime<Utc>,
    pub inner_id: u64,
    pub project: u64,
}

impl AnnotationRecord {
    pub fn new(full_text: impl Into<String>, config: &AnnotationConfig) -> Self {
        Self::at(full_text, config, Utc::now())
    }

    /// Build a record with a fixed creation time.
    pub fn at(full_text: impl Into<String>, config: &AnnotationConfig, now: DateTime<Utc>) -> Self {
        Self {
            id: config.id,
            data: AnnotationData {
                text: full_text.into(),
            },
            meta: serde_json::Map::new(),
            created_at: now,
            updated_at: now,
            inner_id: config.inner_id,
            project: config.project,
        }
    }

    pub fn full_text(&self) -> &str {
        &self.data.text
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Error::Serialize)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(Error::Serialize)
    }
}

/// `2024-01-31T09:15:00.123456Z`
fn iso_utc<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Micros, true))
}
