use std::sync::RwLock;

use uuid::Uuid;

use super::{validate_edge, validate_person, PersonStore};
use crate::error::{KintreeError, Result};
use crate::genealogy::{find_person, ParentEdge, Person};

/// Person store kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    persons: RwLock<Vec<Person>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with existing people. Edges are kept as given, dangling
    /// ones included.
    pub fn with_persons(persons: Vec<Person>) -> Self {
        Self {
            persons: RwLock::new(persons),
        }
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Vec<Person>>> {
        self.persons
            .read()
            .map_err(|_| KintreeError::Config("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Vec<Person>>> {
        self.persons
            .write()
            .map_err(|_| KintreeError::Config("in-memory store lock poisoned".to_string()))
    }
}

/// Copy of `person` with parent names filled in from `persons`.
fn resolved(person: &Person, persons: &[Person]) -> Person {
    let mut person = person.clone();
    for edge in &mut person.parents {
        edge.parent_name = find_person(&edge.parent_id, persons).map(|p| p.name.clone());
    }
    person
}

impl PersonStore for InMemoryStore {
    fn get_by_name(&self, name: &str) -> Result<Person> {
        log::info!("[InMemoryStore] Get person by name: {}", name);
        let persons = self.read()?;
        persons
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .map(|p| resolved(p, &persons))
            .ok_or_else(|| KintreeError::PersonNotFound(name.to_string()))
    }

    fn list_with_relationships(&self) -> Result<Vec<Person>> {
        let persons = self.read()?;
        log::info!("[InMemoryStore] List {} persons with relationships", persons.len());
        Ok(persons.iter().map(|p| resolved(p, &persons)).collect())
    }

    fn create_person(&self, name: &str, gender: &str) -> Result<Person> {
        let name = validate_person(name, gender)?;
        let person = Person::new(Uuid::new_v4().to_string(), name, gender);
        self.write()?.push(person.clone());
        log::info!("[InMemoryStore] Created person {} ({})", person.name, person.id);
        Ok(person)
    }

    fn add_parent(&self, child_id: &str, parent_id: &str) -> Result<ParentEdge> {
        validate_edge(child_id, parent_id)?;
        let mut persons = self.write()?;

        let parent_name = find_person(parent_id, &persons)
            .map(|p| p.name.clone())
            .ok_or_else(|| KintreeError::PersonNotFound(parent_id.to_string()))?;
        let child = persons
            .iter_mut()
            .find(|p| p.id == child_id)
            .ok_or_else(|| KintreeError::PersonNotFound(child_id.to_string()))?;

        if child.has_parent(parent_id) {
            return Err(KintreeError::InvalidInput(format!(
                "{} is already a parent of {}",
                parent_id, child_id
            )));
        }

        let edge = ParentEdge {
            edge_id: Some(Uuid::new_v4().to_string()),
            child_id: child_id.to_string(),
            parent_id: parent_id.to_string(),
            parent_name: Some(parent_name),
        };
        child.parents.push(ParentEdge {
            parent_name: None,
            ..edge.clone()
        });
        log::info!("[InMemoryStore] Added parent {} -> {}", child_id, parent_id);
        Ok(edge)
    }

    fn get_person(&self, id: &str) -> Result<Person> {
        let persons = self.read()?;
        find_person(id, &persons)
            .map(|p| resolved(p, &persons))
            .ok_or_else(|| KintreeError::PersonNotFound(id.to_string()))
    }

    fn update_person(&self, id: &str, name: &str, gender: &str) -> Result<Person> {
        let name = validate_person(name, gender)?;
        let mut persons = self.write()?;
        let person = persons
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| KintreeError::PersonNotFound(id.to_string()))?;
        person.name = name;
        person.gender = gender.to_string();
        log::info!("[InMemoryStore] Updated person {} ({})", person.name, person.id);
        let updated = person.clone();
        Ok(resolved(&updated, &persons))
    }

    fn delete_person(&self, id: &str) -> Result<()> {
        let mut persons = self.write()?;
        let before = persons.len();
        persons.retain(|p| p.id != id);
        if persons.len() == before {
            return Err(KintreeError::PersonNotFound(id.to_string()));
        }
        for person in persons.iter_mut() {
            person.parents.retain(|edge| edge.parent_id != id);
        }
        log::info!("[InMemoryStore] Deleted person {}", id);
        Ok(())
    }

    fn list_edges(&self) -> Result<Vec<ParentEdge>> {
        let persons = self.read()?;
        Ok(persons
            .iter()
            .flat_map(|p| resolved(p, &persons).parents)
            .collect())
    }

    fn get_edge(&self, edge_id: &str) -> Result<ParentEdge> {
        self.list_edges()?
            .into_iter()
            .find(|edge| edge.edge_id.as_deref() == Some(edge_id))
            .ok_or_else(|| KintreeError::RelationshipNotFound(edge_id.to_string()))
    }

    fn update_edge(&self, edge_id: &str, child_id: &str, parent_id: &str) -> Result<ParentEdge> {
        validate_edge(child_id, parent_id)?;
        let mut persons = self.write()?;

        let (owner, index) = locate_edge(&persons, edge_id)?;
        let parent_name = find_person(parent_id, &persons)
            .map(|p| p.name.clone())
            .ok_or_else(|| KintreeError::PersonNotFound(parent_id.to_string()))?;
        let child = persons
            .iter()
            .position(|p| p.id == child_id)
            .ok_or_else(|| KintreeError::PersonNotFound(child_id.to_string()))?;
        let duplicate = persons[child]
            .parents
            .iter()
            .any(|e| e.parent_id == parent_id && e.edge_id.as_deref() != Some(edge_id));
        if duplicate {
            return Err(KintreeError::InvalidInput(format!(
                "{} is already a parent of {}",
                parent_id, child_id
            )));
        }

        let mut edge = persons[owner].parents.remove(index);
        edge.child_id = child_id.to_string();
        edge.parent_id = parent_id.to_string();
        if owner == child {
            persons[owner].parents.insert(index, edge.clone());
        } else {
            persons[child].parents.push(edge.clone());
        }

        log::info!("[InMemoryStore] Updated edge {}: {} -> {}", edge_id, child_id, parent_id);
        Ok(ParentEdge {
            parent_name: Some(parent_name),
            ..edge
        })
    }

    fn delete_edge(&self, edge_id: &str) -> Result<()> {
        let mut persons = self.write()?;
        let (owner, index) = locate_edge(&persons, edge_id)?;
        persons[owner].parents.remove(index);
        log::info!("[InMemoryStore] Deleted edge {}", edge_id);
        Ok(())
    }
}

/// Index of the person holding `edge_id` and the edge's index among their parents.
fn locate_edge(persons: &[Person], edge_id: &str) -> Result<(usize, usize)> {
    persons
        .iter()
        .enumerate()
        .find_map(|(owner, p)| {
            p.parents
                .iter()
                .position(|e| e.edge_id.as_deref() == Some(edge_id))
                .map(|index| (owner, index))
        })
        .ok_or_else(|| KintreeError::RelationshipNotFound(edge_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_lookup_case_insensitive() {
        let store = InMemoryStore::new();
        let phoebe = store.create_person("Phoebe", "F").unwrap();
        assert_eq!(phoebe.id.len(), 36);

        let found = store.get_by_name("phoebe").unwrap();
        assert_eq!(found.id, phoebe.id);
        assert_eq!(found.gender, "F");
    }

    #[test]
    fn test_get_by_name_missing() {
        let store = InMemoryStore::new();
        let err = store.get_by_name("Nobody").unwrap_err();
        assert!(matches!(err, KintreeError::PersonNotFound(name) if name == "Nobody"));
    }

    #[test]
    fn test_add_parent_resolves_names() {
        let store = InMemoryStore::new();
        let martin = store.create_person("Martin", "M").unwrap();
        let phoebe = store.create_person("Phoebe", "F").unwrap();

        let edge = store.add_parent(&phoebe.id, &martin.id).unwrap();
        assert_eq!(edge.parent_name.as_deref(), Some("Martin"));
        assert!(edge.edge_id.is_some());

        let listed = store.list_with_relationships().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name, "Martin");
        assert_eq!(listed[1].parents.len(), 1);
        assert_eq!(listed[1].parents[0].parent_name.as_deref(), Some("Martin"));
    }

    #[test]
    fn test_add_parent_rejects_bad_edges() {
        let store = InMemoryStore::new();
        let martin = store.create_person("Martin", "M").unwrap();
        let phoebe = store.create_person("Phoebe", "F").unwrap();
        store.add_parent(&phoebe.id, &martin.id).unwrap();

        assert!(matches!(store.add_parent(&phoebe.id, &martin.id), Err(KintreeError::InvalidInput(_))));
        assert!(matches!(store.add_parent(&phoebe.id, &phoebe.id), Err(KintreeError::InvalidInput(_))));
        assert!(matches!(store.add_parent(&phoebe.id, "missing"), Err(KintreeError::PersonNotFound(_))));
        assert!(matches!(store.add_parent("missing", &martin.id), Err(KintreeError::PersonNotFound(_))));
    }

    #[test]
    fn test_dangling_edges_listed_unresolved() {
        let store = InMemoryStore::with_persons(vec![Person::new("1", "Orphan", "M").with_parent("ghost")]);
        let listed = store.list_with_relationships().unwrap();
        assert_eq!(listed[0].parents[0].parent_id, "ghost");
        assert!(listed[0].parents[0].parent_name.is_none());
    }

    #[test]
    fn test_get_update_person() {
        let store = InMemoryStore::new();
        let martin = store.create_person("Martin", "M").unwrap();
        let phoebe = store.create_person("Phoebe", "F").unwrap();
        store.add_parent(&phoebe.id, &martin.id).unwrap();

        let renamed = store.update_person(&martin.id, " Marty ", "M").unwrap();
        assert_eq!(renamed.name, "Marty");
        let child = store.get_person(&phoebe.id).unwrap();
        assert_eq!(child.parents[0].parent_name.as_deref(), Some("Marty"));

        assert!(matches!(store.update_person(&martin.id, "Marty", "X"), Err(KintreeError::InvalidInput(_))));
        assert!(matches!(store.update_person("missing", "A", "F"), Err(KintreeError::PersonNotFound(_))));
        assert!(matches!(store.get_person("missing"), Err(KintreeError::PersonNotFound(_))));
    }

    #[test]
    fn test_delete_person_drops_edges_to_them() {
        let store = InMemoryStore::new();
        let martin = store.create_person("Martin", "M").unwrap();
        let phoebe = store.create_person("Phoebe", "F").unwrap();
        store.add_parent(&phoebe.id, &martin.id).unwrap();

        store.delete_person(&martin.id).unwrap();
        assert!(store.get_person(&phoebe.id).unwrap().parents.is_empty());
        assert!(store.list_edges().unwrap().is_empty());
        assert!(matches!(store.delete_person(&martin.id), Err(KintreeError::PersonNotFound(_))));
    }

    #[test]
    fn test_edge_crud() {
        let store = InMemoryStore::new();
        let martin = store.create_person("Martin", "M").unwrap();
        let anastasia = store.create_person("Anastasia", "F").unwrap();
        let phoebe = store.create_person("Phoebe", "F").unwrap();
        let bruce = store.create_person("Bruce", "M").unwrap();
        let edge = store.add_parent(&phoebe.id, &martin.id).unwrap();
        store.add_parent(&phoebe.id, &anastasia.id).unwrap();
        let edge_id = edge.edge_id.unwrap();

        assert_eq!(store.list_edges().unwrap().len(), 2);
        assert_eq!(store.get_edge(&edge_id).unwrap().parent_name.as_deref(), Some("Martin"));

        // Re-pointing onto an existing pair is a duplicate.
        assert!(matches!(
            store.update_edge(&edge_id, &phoebe.id, &anastasia.id),
            Err(KintreeError::InvalidInput(_))
        ));

        let moved = store.update_edge(&edge_id, &bruce.id, &phoebe.id).unwrap();
        assert_eq!(moved.edge_id.as_deref(), Some(edge_id.as_str()));
        assert_eq!(moved.parent_name.as_deref(), Some("Phoebe"));
        assert_eq!(store.get_person(&phoebe.id).unwrap().parents.len(), 1);
        assert_eq!(store.get_person(&bruce.id).unwrap().parents[0].parent_id, phoebe.id);

        store.delete_edge(&edge_id).unwrap();
        assert!(matches!(store.get_edge(&edge_id), Err(KintreeError::RelationshipNotFound(_))));
        assert!(matches!(store.delete_edge(&edge_id), Err(KintreeError::RelationshipNotFound(_))));
        assert_eq!(store.list_edges().unwrap().len(), 1);
    }

    #[test]
    fn test_create_person_validates() {
        let store = InMemoryStore::new();
        assert!(store.create_person("Phoebe", "X").is_err());
        assert!(store.list_with_relationships().unwrap().is_empty());
    }
}
