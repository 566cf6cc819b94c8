//! Person-data providers: lookup by name and the full person listing with
//! resolved parent edges that the family tree engine consumes.

mod import;
mod memory;
mod sqlite;

pub use import::{import_family, FamilyFile, FamilyMember, ImportSummary};
pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

use crate::error::{KintreeError, Result};
use crate::genealogy::{ParentEdge, Person};

/// Source of people and their parent edges.
pub trait PersonStore: Send + Sync {
    /// First person whose name matches case-insensitively, with edges resolved.
    fn get_by_name(&self, name: &str) -> Result<Person>;

    /// Every person in insertion order, with edges resolved.
    fn list_with_relationships(&self) -> Result<Vec<Person>>;

    /// Create a person with a fresh id.
    fn create_person(&self, name: &str, gender: &str) -> Result<Person>;

    /// Record that `parent_id` is a parent of `child_id`.
    fn add_parent(&self, child_id: &str, parent_id: &str) -> Result<ParentEdge>;

    /// Person by id, with edges resolved.
    fn get_person(&self, id: &str) -> Result<Person>;

    /// Rename a person or change their gender. Edges are kept.
    fn update_person(&self, id: &str, name: &str, gender: &str) -> Result<Person>;

    /// Remove a person together with every edge that points to or from them.
    fn delete_person(&self, id: &str) -> Result<()>;

    /// Every stored parent edge in insertion order, parent names resolved.
    fn list_edges(&self) -> Result<Vec<ParentEdge>>;

    fn get_edge(&self, edge_id: &str) -> Result<ParentEdge>;

    /// Point an existing edge at a new child and parent. Same checks as
    /// [`PersonStore::add_parent`].
    fn update_edge(&self, edge_id: &str, child_id: &str, parent_id: &str) -> Result<ParentEdge>;

    fn delete_edge(&self, edge_id: &str) -> Result<()>;
}

/// Trim and check a new person's name and gender.
pub(crate) fn validate_person(name: &str, gender: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(KintreeError::InvalidInput("name must not be empty".to_string()));
    }
    if gender != "M" && gender != "F" {
        return Err(KintreeError::InvalidInput(format!(
            "gender must be \"M\" or \"F\", got {:?}",
            gender
        )));
    }
    Ok(name.to_string())
}

pub(crate) fn validate_edge(child_id: &str, parent_id: &str) -> Result<()> {
    if child_id == parent_id {
        return Err(KintreeError::InvalidInput(format!(
            "person {} cannot be their own parent",
            child_id
        )));
    }
    Ok(())
}
