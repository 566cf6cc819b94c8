//! Family tree engine: kinship vocabulary, relationship classification and
//! descendant/ancestor traversal around a root person.
//!
//! The engine is pure and synchronous. It consumes a slice of [`Person`]
//! records whose parent edges are already resolved and produces an ordered
//! sequence of [`Relative`] entries, the first of which is always the root.

pub mod builder;
pub mod classifier;
pub mod dedup;
pub mod kinship;

pub use builder::{FamilyTree, TreeBuilder};
pub use classifier::RelationshipClassifier;
pub use dedup::already_in_family;
pub use kinship::{gendered, is_category, Kinship, ROOT_LABEL, UNKNOWN_RELATION};

use serde::{Deserialize, Serialize};

/// A person in the family graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Opaque identifier (UUID v4 for stored people).
    pub id: String,
    pub name: String,
    /// `"M"` or `"F"`. Anything else classifies as [`UNKNOWN_RELATION`].
    pub gender: String,
    /// Outgoing child -> parent edges, in insertion order.
    #[serde(default)]
    pub parents: Vec<ParentEdge>,
}

/// Directed edge from a child to one of its parents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentEdge {
    /// Store-assigned edge id; absent on edges built in memory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_id: Option<String>,
    pub child_id: String,
    pub parent_id: String,
    /// Display name of the parent, filled in by the store when the parent exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
}

impl Person {
    pub fn new(id: impl Into<String>, name: impl Into<String>, gender: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            gender: gender.into(),
            parents: Vec::new(),
        }
    }

    /// Add an unresolved parent edge pointing at `parent_id`.
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parents.push(ParentEdge {
            edge_id: None,
            child_id: self.id.clone(),
            parent_id: parent_id.into(),
            parent_name: None,
        });
        self
    }

    /// Parent ids in edge order.
    pub fn parent_ids(&self) -> impl Iterator<Item = &str> {
        self.parents.iter().map(|edge| edge.parent_id.as_str())
    }

    /// True if one of this person's edges points at `parent_id`.
    pub fn has_parent(&self, parent_id: &str) -> bool {
        self.parent_ids().any(|id| id == parent_id)
    }
}

/// A person discovered while building a family tree, labeled relative to the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relative {
    /// Gendered kinship label, [`ROOT_LABEL`] or [`UNKNOWN_RELATION`].
    pub label: String,
    /// Generational distance from the root along the discovery path.
    pub level: usize,
    pub person: Person,
}

/// Find a person by id.
pub fn find_person<'a>(id: &str, persons: &'a [Person]) -> Option<&'a Person> {
    persons.iter().find(|p| p.id == id)
}
