//! Name-based queries over the family tree engine.

use std::sync::Arc;

use crate::error::Result;
use crate::genealogy::{Relative, TreeBuilder};
use crate::store::PersonStore;

/// Relationship reported when a tree has no members at all.
pub const UNRELATED: &str = "unrelated";

/// Resolves names through a [`PersonStore`] and answers questions about the
/// family tree rooted at the named person.
#[derive(Clone)]
pub struct FamilyTreeService {
    store: Arc<dyn PersonStore>,
}

impl FamilyTreeService {
    pub fn new(store: Arc<dyn PersonStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn PersonStore> {
        &self.store
    }

    /// Every relative in the tree rooted at `name`, root first.
    pub fn family_members(&self, name: &str) -> Result<Vec<Relative>> {
        log::info!("[FamilyTreeService] Build family tree for {}", name);
        let relatives = self.tree_of(name)?;
        log::info!("[FamilyTreeService] Family tree for {} has {} members", name, relatives.len());
        Ok(relatives)
    }

    /// How `second` relates to `first`, from `first`'s point of view.
    pub fn determine_relationship(&self, first: &str, second: &str) -> Result<String> {
        log::info!("[FamilyTreeService] Determine relationship {} -> {}", first, second);
        let relatives = self.tree_of(first)?;
        let relationship = relationship_in(&relatives, second);
        log::info!("[FamilyTreeService] {} is {:?} of {}", second, relationship, first);
        Ok(relationship)
    }

    /// Generational distance from `first` to `second`.
    pub fn kinship_distance(&self, first: &str, second: &str) -> Result<usize> {
        log::info!("[FamilyTreeService] Kinship distance {} -> {}", first, second);
        let relatives = self.tree_of(first)?;
        let distance = distance_in(&relatives, second);
        log::info!("[FamilyTreeService] Distance {} -> {} is {}", first, second, distance);
        Ok(distance)
    }

    fn tree_of(&self, name: &str) -> Result<Vec<Relative>> {
        let root = self.store.get_by_name(name).map_err(|e| {
            log::error!("[FamilyTreeService] Lookup of {} failed: {}", name, e);
            e
        })?;
        let persons = self.store.list_with_relationships().map_err(|e| {
            log::error!("[FamilyTreeService] Listing persons failed: {}", e);
            e
        })?;
        Ok(TreeBuilder::new().build_family_tree(&root, &persons, 0))
    }
}

fn find_relative<'a>(relatives: &'a [Relative], name: &str) -> Option<&'a Relative> {
    relatives.iter().find(|r| r.person.name.eq_ignore_ascii_case(name))
}

/// Label of `name` in `relatives`: [`UNRELATED`] for an empty tree, an empty
/// string when the name is absent.
pub fn relationship_in(relatives: &[Relative], name: &str) -> String {
    if relatives.is_empty() {
        return UNRELATED.to_string();
    }
    find_relative(relatives, name)
        .map(|r| r.label.clone())
        .unwrap_or_default()
}

/// Level of `name` in `relatives`, or 0 when it is absent.
pub fn distance_in(relatives: &[Relative], name: &str) -> usize {
    find_relative(relatives, name).map(|r| r.level).unwrap_or(0)
}
