//! Depth-first family tree construction around a root person.

use std::collections::HashSet;

use serde::Serialize;

use super::classifier::RelationshipClassifier;
use super::dedup::already_in_family;
use super::kinship::ROOT_LABEL;
use super::{find_person, Person, Relative};

/// A labeled family tree computed for one root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FamilyTree {
    pub root: Person,
    /// Entry 0 is the root itself.
    pub relatives: Vec<Relative>,
}

impl FamilyTree {
    /// Build the tree for `root` out of `persons`.
    ///
    /// The root is recorded at `start_level`. Descendants are walked first,
    /// then each parent of the root followed by that parent's other
    /// descendants and, recursively, its own ancestors.
    pub fn build(root: &Person, persons: &[Person], start_level: usize) -> FamilyTree {
        let mut walk = Walk {
            root,
            persons,
            classifier: RelationshipClassifier::new(root),
            expanded: HashSet::new(),
            relatives: vec![Relative {
                label: ROOT_LABEL.to_string(),
                level: start_level,
                person: root.clone(),
            }],
        };

        walk.descendants(root, start_level, false);
        walk.ancestors(root, start_level + 1);

        log::debug!(
            "Built family tree for {} with {} relatives",
            root.name,
            walk.relatives.len()
        );

        FamilyTree {
            root: root.clone(),
            relatives: walk.relatives,
        }
    }
}

/// Keeps the most recently built relative sequence.
///
/// Every call to [`TreeBuilder::build_family_tree`] returns its own vector;
/// the retained copy is only a convenience for [`TreeBuilder::relatives`].
#[derive(Debug, Default)]
pub struct TreeBuilder {
    last: Option<FamilyTree>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the tree for `root` and remember it as the latest result.
    pub fn build_family_tree(&mut self, root: &Person, persons: &[Person], start_level: usize) -> Vec<Relative> {
        let tree = FamilyTree::build(root, persons, start_level);
        let relatives = tree.relatives.clone();
        self.last = Some(tree);
        relatives
    }

    /// Relatives from the latest build, empty before the first one.
    pub fn relatives(&self) -> &[Relative] {
        self.last.as_ref().map(|t| t.relatives.as_slice()).unwrap_or(&[])
    }

    /// Latest built tree.
    pub fn last_tree(&self) -> Option<&FamilyTree> {
        self.last.as_ref()
    }
}

/// Traversal state for one build. `relatives` is the single accumulator every
/// recursive step appends to.
struct Walk<'a> {
    root: &'a Person,
    persons: &'a [Person],
    classifier: RelationshipClassifier<'a>,
    /// Ids whose parents have already been walked.
    expanded: HashSet<&'a str>,
    relatives: Vec<Relative>,
}

impl<'a> Walk<'a> {
    fn record(&mut self, person: &Person, level: usize) {
        let label = self.classifier.classify(person, &self.relatives, self.persons);
        log::debug!("{} -> {} (level {})", person.name, label, level);
        self.relatives.push(Relative {
            label: label.to_string(),
            level,
            person: person.clone(),
        });
    }

    /// Children of `frontier` at `level + 1`, each followed by its own subtree.
    /// Recursion only enters people appended by this call, so cycles end.
    fn descendants(&mut self, frontier: &Person, level: usize, skip_root: bool) {
        let persons = self.persons;
        for person in persons {
            if !person.has_parent(&frontier.id) {
                continue;
            }
            if skip_root && person.id == self.root.id {
                continue;
            }
            if already_in_family(person, &self.relatives) {
                continue;
            }
            self.record(person, level + 1);
            self.descendants(person, level + 1, skip_root);
        }
    }

    /// Parents of `person` at `level`, each followed by its collateral line at
    /// `level + 1` and its own parents at `level + 1`.
    ///
    /// A parent that an earlier collateral walk already recorded keeps its
    /// entry, but its own parents are still visited once.
    fn ancestors(&mut self, person: &'a Person, level: usize) {
        if !self.expanded.insert(person.id.as_str()) {
            return;
        }
        for parent_id in person.parent_ids() {
            let Some(parent) = find_person(parent_id, self.persons) else {
                log::warn!("Skipping dangling parent edge {} -> {}", person.id, parent_id);
                continue;
            };
            if !already_in_family(parent, &self.relatives) {
                self.record(parent, level);
                self.descendants(parent, level, true);
            }
            self.ancestors(parent, level + 1);
        }
    }
}
