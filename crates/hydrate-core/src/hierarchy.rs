//! Category tree indexed by primary key.
//!
//! Parent and child links are key lookups into an arena, never stored
//! references. The child index is built by a separate pass over the whole
//! set the first time it is needed.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::OnceLock;

use crate::error::{Error, Result};
use crate::listing::Category;
use crate::model::EntityRef;

/// Arena of materialized categories.
#[derive(Debug, Default)]
pub struct CategoryHierarchy {
    nodes: BTreeMap<i64, EntityRef<Category>>,
    children: OnceLock<HashMap<i64, Vec<i64>>>,
}

impl CategoryHierarchy {
    /// Build an arena from a fully materialized category set.
    ///
    /// A later category with an already seen id replaces the earlier one.
    pub fn from_categories<I, C>(categories: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<EntityRef<Category>>,
    {
        let nodes = categories
            .into_iter()
            .map(Into::into)
            .map(|c| (c.id, c))
            .collect();
        Self {
            nodes,
            children: OnceLock::new(),
        }
    }

    /// Number of categories in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds no categories.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a category by primary key.
    pub fn get(&self, id: i64) -> Option<&EntityRef<Category>> {
        self.nodes.get(&id)
    }

    /// The parent of `id`, if it has one and the parent is in the arena.
    pub fn parent(&self, id: i64) -> Option<&EntityRef<Category>> {
        let parent_id = self.nodes.get(&id)?.parent_id?;
        self.nodes.get(&parent_id)
    }

    /// Direct children of `id`, ordered by primary key.
    pub fn children(&self, id: i64) -> Vec<&EntityRef<Category>> {
        self.child_index()
            .get(&id)
            .map(|ids| ids.iter().filter_map(|c| self.nodes.get(c)).collect())
            .unwrap_or_default()
    }

    /// Categories without a parent in the arena, ordered by primary key.
    ///
    /// A category whose `parent_id` points outside the arena counts as a root.
    pub fn roots(&self) -> Vec<&EntityRef<Category>> {
        self.nodes
            .values()
            .filter(|c| c.parent_id.is_none_or(|p| !self.nodes.contains_key(&p)))
            .collect()
    }

    /// Ancestors of `id`, nearest first.
    ///
    /// Acyclicity is assumed upstream; a cycle is reported instead of
    /// looping.
    pub fn ancestors(&self, id: i64) -> Result<Vec<&EntityRef<Category>>> {
        let mut out = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            if !seen.insert(parent.id) {
                return Err(Error::HierarchyCycle { id: parent.id });
            }
            out.push(parent);
            current = parent.id;
        }
        Ok(out)
    }

    fn child_index(&self) -> &HashMap<i64, Vec<i64>> {
        self.children.get_or_init(|| {
            let mut index: HashMap<i64, Vec<i64>> = HashMap::new();
            // BTreeMap iteration keeps each child list sorted by id.
            for node in self.nodes.values() {
                if let Some(parent_id) = node.parent_id {
                    index.entry(parent_id).or_default().push(node.id);
                }
            }
            tracing::trace!(
                categories = self.nodes.len(),
                parents = index.len(),
                "Built category child index"
            );
            index
        })
    }
}
