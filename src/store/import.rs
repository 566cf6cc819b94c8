//! Family file import: seed a store with people and their parents by name.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{validate_person, PersonStore};
use crate::error::{KintreeError, Result};

/// JSON family file: `{"people": [{"name", "gender", "parents": [names]}]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyFile {
    pub people: Vec<FamilyMember>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyMember {
    pub name: String,
    pub gender: String,
    /// Parent names, matched case-insensitively against this file first and
    /// then against people already in the store.
    #[serde(default)]
    pub parents: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub people: usize,
    pub edges: usize,
}

impl FamilyFile {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Import every person in `file`, then every parent edge.
///
/// The whole file is validated before anything is written: names, genders,
/// parent names and repeated or self parent entries. A file that fails any of
/// these checks leaves the store untouched.
pub fn import_family(store: &dyn PersonStore, file: &FamilyFile) -> Result<ImportSummary> {
    log::info!("[import] Importing {} people", file.people.len());
    validate_family(store, file)?;

    // Lowercased name -> id of the first person created with it.
    let mut created: HashMap<String, String> = HashMap::new();
    let mut ids = Vec::with_capacity(file.people.len());
    for member in &file.people {
        let person = store.create_person(&member.name, &member.gender)?;
        created.entry(person.name.to_ascii_lowercase()).or_insert_with(|| person.id.clone());
        ids.push(person.id);
    }

    let mut edges = 0;
    for (member, child_id) in file.people.iter().zip(&ids) {
        for parent in &member.parents {
            let parent_id = match created.get(&parent.trim().to_ascii_lowercase()) {
                Some(id) => id.clone(),
                None => store.get_by_name(parent.trim())?.id,
            };
            store.add_parent(child_id, &parent_id)?;
            edges += 1;
        }
    }

    log::info!("[import] Imported {} people and {} parent edges", ids.len(), edges);
    Ok(ImportSummary {
        people: ids.len(),
        edges,
    })
}

fn validate_family(store: &dyn PersonStore, file: &FamilyFile) -> Result<()> {
    let in_file = |name: &str| file.people.iter().any(|m| m.name.trim().eq_ignore_ascii_case(name));

    for member in &file.people {
        validate_person(&member.name, &member.gender)?;

        let mut seen: HashSet<String> = HashSet::new();
        for parent in &member.parents {
            let parent = parent.trim();
            if parent.eq_ignore_ascii_case(member.name.trim()) {
                return Err(KintreeError::InvalidInput(format!(
                    "{:?} cannot be their own parent",
                    member.name
                )));
            }
            if !seen.insert(parent.to_ascii_lowercase()) {
                return Err(KintreeError::InvalidInput(format!(
                    "parent {:?} listed twice for {:?}",
                    parent, member.name
                )));
            }
            if in_file(parent) {
                continue;
            }
            match store.get_by_name(parent) {
                Ok(_) => {}
                Err(KintreeError::PersonNotFound(_)) => {
                    return Err(KintreeError::InvalidInput(format!(
                        "unknown parent {:?} for {:?}",
                        parent, member.name
                    )));
                }
                Err(e) => return Err(e),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genealogy::TreeBuilder;
    use crate::store::InMemoryStore;

    const PHOEBE_FAMILY: &str = r#"{
        "people": [
            {"name": "Martin", "gender": "M"},
            {"name": "Anastasia", "gender": "F"},
            {"name": "Phoebe", "gender": "F", "parents": ["Martin", "anastasia"]},
            {"name": "Bruce", "gender": "M", "parents": ["Phoebe"]}
        ]
    }"#;

    #[test]
    fn test_import_builds_expected_tree() {
        let store = InMemoryStore::new();
        let file = FamilyFile::from_json(PHOEBE_FAMILY).unwrap();
        let summary = import_family(&store, &file).unwrap();
        assert_eq!(summary, ImportSummary { people: 4, edges: 3 });

        let root = store.get_by_name("Phoebe").unwrap();
        let persons = store.list_with_relationships().unwrap();
        let relatives = TreeBuilder::new().build_family_tree(&root, &persons, 0);
        let labels: Vec<(&str, &str)> = relatives.iter().map(|r| (r.person.name.as_str(), r.label.as_str())).collect();
        assert_eq!(
            labels,
            vec![("Phoebe", "Root"), ("Bruce", "Son"), ("Martin", "Father"), ("Anastasia", "Mother")]
        );
    }

    #[test]
    fn test_parent_listed_after_child() {
        let store = InMemoryStore::new();
        let file = FamilyFile::from_json(
            r#"{"people": [{"name": "Kid", "gender": "M", "parents": ["Dad"]}, {"name": "Dad", "gender": "M"}]}"#,
        )
        .unwrap();
        assert_eq!(import_family(&store, &file).unwrap().edges, 1);
        assert_eq!(store.get_by_name("Kid").unwrap().parents[0].parent_name.as_deref(), Some("Dad"));
    }

    #[test]
    fn test_parent_already_in_store() {
        let store = InMemoryStore::new();
        store.create_person("Martin", "M").unwrap();
        let file = FamilyFile::from_json(r#"{"people": [{"name": "Phoebe", "gender": "F", "parents": ["Martin"]}]}"#).unwrap();
        import_family(&store, &file).unwrap();
        assert_eq!(store.list_with_relationships().unwrap().len(), 2);
    }

    #[test]
    fn test_unknown_parent_writes_nothing() {
        let store = InMemoryStore::new();
        let file = FamilyFile::from_json(r#"{"people": [{"name": "Phoebe", "gender": "F", "parents": ["Ghost"]}]}"#).unwrap();
        let err = import_family(&store, &file).unwrap_err();
        assert!(matches!(err, KintreeError::InvalidInput(_)));
        assert!(store.list_with_relationships().unwrap().is_empty());
    }

    #[test]
    fn test_bundled_family_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join("geovane_family.json");
        let file = FamilyFile::from_path(&path).unwrap();
        let store = InMemoryStore::new();
        let summary = import_family(&store, &file).unwrap();
        assert_eq!(summary.people, 19);

        let root = store.get_by_name("geovane").unwrap();
        let persons = store.list_with_relationships().unwrap();
        let relatives = TreeBuilder::new().build_family_tree(&root, &persons, 0);
        let label_of = |name: &str| relatives.iter().find(|r| r.person.name == name).map(|r| r.label.as_str());
        assert_eq!(label_of("Iraci"), Some("GrandMother"));
        assert_eq!(label_of("Gean"), Some("Brother"));
        assert_eq!(label_of("Debora"), Some("Cousin"));
    }

    fn assert_rejected_untouched(json: &str) {
        let store = InMemoryStore::new();
        let file = FamilyFile::from_json(json).unwrap();
        let err = import_family(&store, &file).unwrap_err();
        assert!(matches!(err, KintreeError::InvalidInput(_)), "{err}");
        assert!(store.list_with_relationships().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_gender_writes_nothing() {
        assert_rejected_untouched(
            r#"{"people": [{"name": "A", "gender": "M"}, {"name": "B", "gender": "X", "parents": ["A"]}]}"#,
        );
    }

    #[test]
    fn test_blank_name_writes_nothing() {
        assert_rejected_untouched(r#"{"people": [{"name": "A", "gender": "M"}, {"name": "  ", "gender": "F"}]}"#);
    }

    #[test]
    fn test_repeated_parent_writes_nothing() {
        assert_rejected_untouched(
            r#"{"people": [{"name": "A", "gender": "M"}, {"name": "B", "gender": "F", "parents": ["A", "a"]}]}"#,
        );
    }

    #[test]
    fn test_own_parent_writes_nothing() {
        assert_rejected_untouched(r#"{"people": [{"name": "A", "gender": "M", "parents": ["a"]}]}"#);
    }

    #[test]
    fn test_malformed_file() {
        assert!(matches!(FamilyFile::from_json("{\"people\": 3}"), Err(KintreeError::Parse(_))));
    }
}
