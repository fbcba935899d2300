//! Unified Result Model
//!
//! Every command maps its outcome to this model before rendering output.

use serde::{Deserialize, Serialize};

/// The kind of result item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Sheet,
    Scan,
    Rename,
    Git,
    Check,
    Error,
}

/// Metadata for a result item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Meta {
    /// File size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// Content hash (XXH3) after the operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,

    /// Whether the operation modified the file on disk
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub changed: bool,

    /// RFC 3339 timestamp, set on summary items
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
}

/// Error information for a result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepIssue {
    pub code: String,
    pub message: String,
}

impl SweepIssue {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// The unified result item that all commands produce
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultItem {
    pub kind: Kind,

    /// Path relative to root, using '/' as separator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Sheet label the item belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Human-readable one-liner
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,

    /// Structured payload (counts per identifier, rename details, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    pub meta: Meta,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<SweepIssue>,
}

impl ResultItem {
    fn bare(kind: Kind) -> Self {
        Self {
            kind,
            path: None,
            label: None,
            excerpt: None,
            data: None,
            meta: Meta::default(),
            errors: Vec::new(),
        }
    }

    /// A workbook sheet listing entry
    pub fn sheet(name: impl Into<String>) -> Self {
        let mut item = Self::bare(Kind::Sheet);
        item.label = Some(name.into());
        item
    }

    /// Per-file scan row; `data` holds one object per label
    pub fn scan(path: impl Into<String>, data: serde_json::Value) -> Self {
        let mut item = Self::bare(Kind::Scan);
        item.path = Some(path.into());
        item.data = Some(data);
        item
    }

    /// One applied (or previewed) rename mapping
    pub fn rename(path: impl Into<String>, excerpt: impl Into<String>) -> Self {
        let mut item = Self::bare(Kind::Rename);
        item.path = Some(path.into());
        item.excerpt = Some(excerpt.into());
        item
    }

    /// One version-control step
    pub fn git(excerpt: impl Into<String>) -> Self {
        let mut item = Self::bare(Kind::Git);
        item.excerpt = Some(excerpt.into());
        item
    }

    /// A doctor check line
    pub fn check(excerpt: impl Into<String>) -> Self {
        let mut item = Self::bare(Kind::Check);
        item.excerpt = Some(excerpt.into());
        item
    }

    pub fn error(issue: SweepIssue) -> Self {
        let mut item = Self::bare(Kind::Error);
        item.errors.push(issue);
        item
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_error(mut self, issue: SweepIssue) -> Self {
        self.errors.push(issue);
        self
    }
}

/// Result set containing multiple result items
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultSet {
    pub items: Vec<ResultItem>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, item: ResultItem) {
        self.items.push(item);
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = ResultItem>) {
        self.items.extend(items);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<ResultItem> for ResultSet {
    fn from_iter<T: IntoIterator<Item = ResultItem>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
