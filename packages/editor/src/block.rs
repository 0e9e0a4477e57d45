//! # Block Records
//!
//! A block is one addressable content unit of a document: a paragraph, a
//! note, a warning. Blocks have a fixed typed core (identity, kind, content,
//! timestamps) plus an open string-keyed attribute map that only the
//! rendering layer interprets.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Kind assigned to blocks created without one
pub const DEFAULT_BLOCK_KIND: &str = "text-block";

/// Open attribute record interpreted by renderers
pub type Attributes = BTreeMap<String, Value>;

/// Opaque block identity, unique within a document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh time-ordered identity (UUIDv7)
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for BlockId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for BlockId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for BlockId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Block payload: plain text or a structured JSON value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockContent {
    Text(String),
    Structured(Value),
}

impl BlockContent {
    /// Content length: chars for text, compact JSON length for structured
    pub fn len(&self) -> usize {
        match self {
            BlockContent::Text(text) => text.chars().count(),
            BlockContent::Structured(value) => value.to_string().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            BlockContent::Text(text) => text.is_empty(),
            BlockContent::Structured(Value::Null) => true,
            BlockContent::Structured(_) => false,
        }
    }

    /// Fold a structured string into text.
    ///
    /// Both variants serialize a string as a bare JSON string, which always
    /// loads back as `Text`.
    pub fn canonical(self) -> Self {
        match self {
            BlockContent::Structured(Value::String(text)) => BlockContent::Text(text),
            other => other,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            BlockContent::Text(text) => Some(text),
            BlockContent::Structured(_) => None,
        }
    }
}

impl Default for BlockContent {
    fn default() -> Self {
        BlockContent::Text(String::new())
    }
}

impl From<&str> for BlockContent {
    fn from(s: &str) -> Self {
        BlockContent::Text(s.to_string())
    }
}

impl From<String> for BlockContent {
    fn from(s: String) -> Self {
        BlockContent::Text(s)
    }
}

impl From<Value> for BlockContent {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => BlockContent::Text(s),
            other => BlockContent::Structured(other),
        }
    }
}

/// One content unit of a document
///
/// The serde defaults double as the fallbacks used when loading partial
/// records from persisted data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    #[serde(default = "BlockId::generate")]
    pub id: BlockId,

    #[serde(default = "default_kind")]
    pub kind: String,

    #[serde(default)]
    pub content: BlockContent,

    #[serde(default)]
    pub attributes: Attributes,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn default_kind() -> String {
    DEFAULT_BLOCK_KIND.to_string()
}

impl Block {
    /// Merge a patch over this block and refresh `updated_at`
    pub fn apply_patch(&mut self, patch: &BlockPatch, now: DateTime<Utc>) {
        if let Some(kind) = &patch.kind {
            if !kind.trim().is_empty() {
                self.kind = kind.clone();
            }
        }

        if let Some(content) = &patch.content {
            self.content = content.clone().canonical();
        }

        for (key, value) in &patch.attributes {
            if value.is_null() {
                self.attributes.remove(key);
            } else {
                self.attributes.insert(key.clone(), value.clone());
            }
        }

        self.updated_at = now.max(self.updated_at);
    }

    /// Fill in boundary defaults for records that came from outside
    pub(crate) fn normalized(mut self) -> Self {
        if self.kind.trim().is_empty() {
            self.kind = default_kind();
        }
        if self.id.as_str().is_empty() {
            self.id = BlockId::generate();
        }
        if self.updated_at < self.created_at {
            self.updated_at = self.created_at;
        }
        self.content = self.content.canonical();
        self
    }
}

/// Caller input for creating a block
///
/// Every field is optional; missing fields take the block defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockData {
    pub id: Option<BlockId>,
    pub kind: Option<String>,
    pub content: Option<BlockContent>,
    pub attributes: Attributes,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl BlockData {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            ..Self::default()
        }
    }

    /// Text block with the given content
    pub fn text(content: impl Into<String>) -> Self {
        Self::new(DEFAULT_BLOCK_KIND).with_content(content.into())
    }

    pub fn with_id(mut self, id: impl Into<BlockId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<BlockContent>) -> Self {
        self.content = Some(content.into().canonical());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Build the record, merging caller data over defaults
    pub(crate) fn into_block(self, id: BlockId, now: DateTime<Utc>) -> Block {
        let created_at = self.created_at.unwrap_or(now);
        Block {
            id,
            kind: self
                .kind
                .filter(|kind| !kind.trim().is_empty())
                .unwrap_or_else(default_kind),
            content: self.content.map(BlockContent::canonical).unwrap_or_default(),
            attributes: self.attributes,
            created_at,
            updated_at: self.updated_at.unwrap_or(now).max(created_at),
        }
    }
}

/// Partial update merged over an existing block
///
/// An attribute set to JSON `null` is removed from the block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<BlockContent>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: Attributes,
}

impl BlockPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(content: impl Into<BlockContent>) -> Self {
        Self::new().with_content(content)
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<BlockContent>) -> Self {
        self.content = Some(content.into().canonical());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && self.content.is_none() && self.attributes.is_empty()
    }
}
