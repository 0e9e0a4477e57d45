//! Serialized and read-only views of a document.
//!
//! [`SerializedDocument`] is the persistable record: identity, title,
//! version, timestamps, metadata and the ordered blocks. Selection, focus and
//! history are session state and never serialized. [`DocumentState`] is the
//! owned snapshot handed to observers.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Block, BlockId};

pub const DEFAULT_TITLE: &str = "Untitled";
pub const DEFAULT_VERSION_LABEL: &str = "1.0.0";

pub(crate) fn generate_document_id() -> String {
    Uuid::now_v7().to_string()
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn default_version() -> String {
    DEFAULT_VERSION_LABEL.to_string()
}

/// Free-form document metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subsystem: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    pub tags: BTreeSet<String>,
}

/// Persistable document record
///
/// Missing fields fall back to generated or default values on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedDocument {
    #[serde(default = "generate_document_id")]
    pub id: String,

    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub metadata: DocumentMetadata,

    #[serde(default)]
    pub blocks: Vec<Block>,
}

/// Owned, read-only snapshot delivered to observers with every event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentState {
    pub document: SerializedDocument,
    pub selected_blocks: Vec<BlockId>,
    pub focused_block: Option<BlockId>,
    pub can_undo: bool,
    pub can_redo: bool,
    pub history_len: usize,
}

impl DocumentState {
    pub fn block_ids(&self) -> Vec<&BlockId> {
        self.document.blocks.iter().map(|block| &block.id).collect()
    }
}

/// Aggregate numbers over the current document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStats {
    pub block_count: usize,
    pub kinds: BTreeMap<String, usize>,
    pub total_content_length: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub history_len: usize,
    pub can_undo: bool,
    pub can_redo: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_record_uses_defaults() {
        let doc: SerializedDocument = serde_json::from_value(json!({})).unwrap();

        assert!(!doc.id.is_empty());
        assert_eq!(doc.title, DEFAULT_TITLE);
        assert_eq!(doc.version, DEFAULT_VERSION_LABEL);
        assert!(doc.blocks.is_empty());
        assert!(doc.metadata.tags.is_empty());
    }

    #[test]
    fn test_metadata_camel_case() {
        let doc: SerializedDocument = serde_json::from_value(json!({
            "title": "Runbook",
            "metadata": {
                "configName": "prod",
                "subsystem": "storage",
                "tags": ["b", "a"]
            }
        }))
        .unwrap();

        assert_eq!(doc.metadata.config_name.as_deref(), Some("prod"));
        assert_eq!(doc.metadata.subsystem.as_deref(), Some("storage"));
        assert_eq!(doc.metadata.author, None);
        let tags: Vec<_> = doc.metadata.tags.iter().map(String::as_str).collect();
        assert_eq!(tags, vec!["a", "b"]);
    }
}
