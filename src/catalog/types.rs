//! Catalog type definitions
//!
//! Records are immutable once loaded. The corpus owns them behind `Arc` so
//! filtering and ranking hand out refcount bumps instead of copies.

use std::ops::Deref;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// One searchable catalog entry (a terminal command in the default catalog)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: u64,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Record {
    pub fn new(id: u64, name: &str, description: &str, tags: &[&str]) -> Self {
        Self {
            id,
            name: name.to_string(),
            description: description.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn kind(&self) -> RecordKind {
        RecordKind::from_tags(&self.tags)
    }
}

/// Display category for iconography, derived from tags.
///
/// Checked in declaration order, so a record tagged both "Git" and "Linux"
/// is `Git`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordKind {
    Git,
    Docker,
    /// npm / Node.js
    Package,
    /// Linux / Unix
    Terminal,
    Code,
}

impl RecordKind {
    pub fn from_tags(tags: &[String]) -> Self {
        let has = |name: &str| tags.iter().any(|t| t == name);
        if has("Git") {
            RecordKind::Git
        } else if has("Docker") {
            RecordKind::Docker
        } else if has("npm") || has("Node.js") {
            RecordKind::Package
        } else if has("Linux") || has("Unix") {
            RecordKind::Terminal
        } else {
            RecordKind::Code
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RecordKind::Git => "git",
            RecordKind::Docker => "docker",
            RecordKind::Package => "package",
            RecordKind::Terminal => "terminal",
            RecordKind::Code => "code",
        }
    }
}

/// The full, read-only catalog.
///
/// Insertion order is meaningful: it is the tie-break order for equally
/// ranked results and the order returned for an empty query.
#[derive(Clone, Debug, Default)]
pub struct Corpus {
    records: Arc<[Arc<Record>]>,
}

impl Corpus {
    /// Build a corpus without validation. Use `loader::corpus_from_records`
    /// when the records come from outside the process.
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: records.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn records(&self) -> &[Arc<Record>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Deref for Corpus {
    type Target = [Arc<Record>];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}
