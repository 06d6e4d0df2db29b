//! Completeness summary of a resolved page.

use std::fmt;

use hydrate_core::{EntityRef, Related};
use serde::Serialize;

/// Counts derived from resolved roots without touching the row source again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolveSummary {
    /// Root table name.
    pub root: &'static str,
    /// Relation name.
    pub relation: &'static str,
    /// Number of roots.
    pub total: usize,
    /// Roots whose related reference is present.
    pub with_related: usize,
    /// Roots whose related reference is absent.
    pub missing_related: usize,
}

impl ResolveSummary {
    /// Count roots with and without their related reference.
    pub fn from_roots<R: Related>(roots: &[EntityRef<R>]) -> Self {
        let with_related = roots.iter().filter(|r| r.related().is_some()).count();
        Self {
            root: R::TABLE_NAME,
            relation: R::RELATION,
            total: roots.len(),
            with_related,
            missing_related: roots.len() - with_related,
        }
    }

    /// Whether every root has its related reference.
    pub fn is_complete(&self) -> bool {
        self.missing_related == 0
    }

    /// Render as a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "root": self.root,
            "relation": self.relation,
            "total": self.total,
            "with_related": self.with_related,
            "missing_related": self.missing_related,
        })
    }
}

impl fmt::Display for ResolveSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {} loaded, {} missing",
            self.total, self.root, self.with_related, self.missing_related
        )?;
        write!(f, " ({})", self.relation)
    }
}
