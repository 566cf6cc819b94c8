//! Labels a newly discovered person relative to the root.

use super::kinship::{escalate, Kinship, ANCESTOR_RULES, DESCENDANT_RULES, UNKNOWN_RELATION};
use super::{find_person, Person, Relative};

/// Classifies candidates against a fixed root.
///
/// Rules are tried in priority order and the first match wins: direct
/// relation to the root, then escalation from a recorded child of the
/// candidate, then escalation from a recorded parent of the candidate.
#[derive(Debug, Clone, Copy)]
pub struct RelationshipClassifier<'a> {
    root: &'a Person,
}

impl<'a> RelationshipClassifier<'a> {
    pub fn new(root: &'a Person) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &'a Person {
        self.root
    }

    /// Label for `candidate` given the relatives classified so far.
    pub fn classify(&self, candidate: &Person, relatives: &[Relative], persons: &[Person]) -> &'static str {
        if let Some(label) = self.direct_relation(candidate, persons) {
            return label;
        }

        if let Some(anchor) = recorded_child(candidate, relatives) {
            if let Some(kinship) = escalate(&ANCESTOR_RULES, &anchor.label) {
                return kinship.gendered(&candidate.gender);
            }
        }

        if let Some(parent) = recorded_parent(candidate, relatives) {
            if let Some(kinship) = escalate(&DESCENDANT_RULES, &parent.label) {
                return kinship.gendered(&candidate.gender);
            }
        }

        UNKNOWN_RELATION
    }

    /// Son/Daughter, Father/Mother or Brother/Sister of the root.
    fn direct_relation(&self, candidate: &Person, persons: &[Person]) -> Option<&'static str> {
        if candidate.has_parent(&self.root.id) {
            return Some(Kinship::Son.gendered(&candidate.gender));
        }
        if self.root.has_parent(&candidate.id) {
            return Some(Kinship::Father.gendered(&candidate.gender));
        }
        if self.shares_parent_with_root(candidate, persons) {
            return Some(Kinship::Brother.gendered(&candidate.gender));
        }
        None
    }

    /// At least one parent id common to root and candidate that resolves to a
    /// known person. Half siblings count as siblings.
    fn shares_parent_with_root(&self, candidate: &Person, persons: &[Person]) -> bool {
        self.root
            .parent_ids()
            .filter(|id| candidate.has_parent(id))
            .any(|id| find_person(id, persons).is_some())
    }
}

/// First recorded relative whose person is a child of `candidate`.
fn recorded_child<'r>(candidate: &Person, relatives: &'r [Relative]) -> Option<&'r Relative> {
    relatives.iter().find(|r| r.person.has_parent(&candidate.id))
}

/// First recorded relative that `candidate` has a parent edge to.
fn recorded_parent<'r>(candidate: &Person, relatives: &'r [Relative]) -> Option<&'r Relative> {
    relatives.iter().find(|r| candidate.has_parent(&r.person.id))
}
