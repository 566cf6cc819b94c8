use std::collections::HashMap;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{validate_edge, validate_person, PersonStore};
use crate::db::Db;
use crate::error::{KintreeError, Result};
use crate::genealogy::{ParentEdge, Person};

/// Person store backed by the `people` and `parent_edges` tables.
///
/// Each call opens its own connection, so the store is cheap to share across
/// threads. Callers on an async runtime should invoke it from the blocking pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: Db,
}

impl SqliteStore {
    /// The schema must already be migrated.
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Db {
        &self.db
    }
}

fn person_exists(conn: &Connection, person_id: &str) -> Result<Option<String>> {
    let name = conn
        .query_row(
            "SELECT name FROM people WHERE person_id = ?1",
            params![person_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(name)
}

const EDGE_COLUMNS: &str = r#"
    SELECT e.edge_id, e.child_id, e.parent_id, p.name
    FROM parent_edges e
    LEFT JOIN people p ON p.person_id = e.parent_id
"#;

fn edge_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ParentEdge> {
    Ok(ParentEdge {
        edge_id: row.get(0)?,
        child_id: row.get(1)?,
        parent_id: row.get(2)?,
        parent_name: row.get(3)?,
    })
}

fn find_edge(conn: &Connection, edge_id: &str) -> Result<ParentEdge> {
    conn.query_row(&format!("{} WHERE e.edge_id = ?1", EDGE_COLUMNS), params![edge_id], edge_from_row)
        .optional()?
        .ok_or_else(|| KintreeError::RelationshipNotFound(edge_id.to_string()))
}

fn edges_of(conn: &Connection, child_id: &str) -> Result<Vec<ParentEdge>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT e.edge_id, e.child_id, e.parent_id, p.name
        FROM parent_edges e
        LEFT JOIN people p ON p.person_id = e.parent_id
        WHERE e.child_id = ?1
        ORDER BY e.rowid
        "#,
    )?;
    let edges = stmt
        .query_map(params![child_id], |row| {
            Ok(ParentEdge {
                edge_id: row.get(0)?,
                child_id: row.get(1)?,
                parent_id: row.get(2)?,
                parent_name: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(edges)
}

impl PersonStore for SqliteStore {
    fn get_by_name(&self, name: &str) -> Result<Person> {
        log::info!("[SqliteStore] Get person by name: {}", name);
        let conn = self.db.open_connection()?;

        let person = conn
            .query_row(
                r#"
                SELECT person_id, name, gender FROM people
                WHERE name = ?1 COLLATE NOCASE
                ORDER BY rowid
                LIMIT 1
                "#,
                params![name],
                |row| Ok(Person::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?)),
            )
            .optional()?;

        let mut person = person.ok_or_else(|| KintreeError::PersonNotFound(name.to_string()))?;
        person.parents = edges_of(&conn, &person.id)?;
        Ok(person)
    }

    fn list_with_relationships(&self) -> Result<Vec<Person>> {
        let conn = self.db.open_connection()?;

        let mut edges: HashMap<String, Vec<ParentEdge>> = HashMap::new();
        {
            let mut stmt = conn.prepare(
                r#"
                SELECT e.edge_id, e.child_id, e.parent_id, p.name
                FROM parent_edges e
                LEFT JOIN people p ON p.person_id = e.parent_id
                ORDER BY e.rowid
                "#,
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(ParentEdge {
                    edge_id: row.get(0)?,
                    child_id: row.get(1)?,
                    parent_id: row.get(2)?,
                    parent_name: row.get(3)?,
                })
            })?;
            for edge in rows {
                let edge = edge?;
                edges.entry(edge.child_id.clone()).or_default().push(edge);
            }
        }

        let mut stmt = conn.prepare("SELECT person_id, name, gender FROM people ORDER BY rowid")?;
        let persons = stmt
            .query_map([], |row| {
                Ok(Person::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
            })?
            .map(|row| {
                row.map(|mut person| {
                    person.parents = edges.remove(&person.id).unwrap_or_default();
                    person
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        log::info!("[SqliteStore] Listed {} persons with relationships", persons.len());
        Ok(persons)
    }

    fn create_person(&self, name: &str, gender: &str) -> Result<Person> {
        let name = validate_person(name, gender)?;
        let person = Person::new(Uuid::new_v4().to_string(), name, gender);
        let created_at = Utc::now().to_rfc3339();

        let conn = self.db.open_connection()?;
        conn.execute(
            "INSERT INTO people (person_id, name, gender, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![person.id, person.name, person.gender, created_at],
        )?;

        log::info!("[SqliteStore] Created person {} ({})", person.name, person.id);
        Ok(person)
    }

    fn add_parent(&self, child_id: &str, parent_id: &str) -> Result<ParentEdge> {
        validate_edge(child_id, parent_id)?;
        let mut conn = self.db.open_connection()?;
        let tx = conn.transaction()?;

        if person_exists(&tx, child_id)?.is_none() {
            return Err(KintreeError::PersonNotFound(child_id.to_string()));
        }
        let parent_name = person_exists(&tx, parent_id)?
            .ok_or_else(|| KintreeError::PersonNotFound(parent_id.to_string()))?;

        let duplicate: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM parent_edges WHERE child_id = ?1 AND parent_id = ?2)",
            params![child_id, parent_id],
            |row| row.get(0),
        )?;
        if duplicate {
            return Err(KintreeError::InvalidInput(format!(
                "{} is already a parent of {}",
                parent_id, child_id
            )));
        }

        let edge_id = Uuid::new_v4().to_string();
        tx.execute(
            r#"
            INSERT INTO parent_edges (edge_id, child_id, parent_id, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![edge_id, child_id, parent_id, Utc::now().to_rfc3339()],
        )?;
        tx.commit()?;

        log::info!("[SqliteStore] Added parent {} -> {}", child_id, parent_id);
        Ok(ParentEdge {
            edge_id: Some(edge_id),
            child_id: child_id.to_string(),
            parent_id: parent_id.to_string(),
            parent_name: Some(parent_name),
        })
    }

    fn get_person(&self, id: &str) -> Result<Person> {
        let conn = self.db.open_connection()?;
        let person = conn
            .query_row(
                "SELECT person_id, name, gender FROM people WHERE person_id = ?1",
                params![id],
                |row| Ok(Person::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?)),
            )
            .optional()?;

        let mut person = person.ok_or_else(|| KintreeError::PersonNotFound(id.to_string()))?;
        person.parents = edges_of(&conn, &person.id)?;
        Ok(person)
    }

    fn update_person(&self, id: &str, name: &str, gender: &str) -> Result<Person> {
        let name = validate_person(name, gender)?;
        {
            let conn = self.db.open_connection()?;
            let updated = conn.execute(
                "UPDATE people SET name = ?1, gender = ?2 WHERE person_id = ?3",
                params![name, gender, id],
            )?;
            if updated == 0 {
                return Err(KintreeError::PersonNotFound(id.to_string()));
            }
        }
        log::info!("[SqliteStore] Updated person {} ({})", name, id);
        self.get_person(id)
    }

    fn delete_person(&self, id: &str) -> Result<()> {
        let conn = self.db.open_connection()?;
        // parent_edges rows on either side go with it through ON DELETE CASCADE.
        let deleted = conn.execute("DELETE FROM people WHERE person_id = ?1", params![id])?;
        if deleted == 0 {
            return Err(KintreeError::PersonNotFound(id.to_string()));
        }
        log::info!("[SqliteStore] Deleted person {}", id);
        Ok(())
    }

    fn list_edges(&self) -> Result<Vec<ParentEdge>> {
        let conn = self.db.open_connection()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY e.rowid", EDGE_COLUMNS))?;
        let edges = stmt
            .query_map([], edge_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(edges)
    }

    fn get_edge(&self, edge_id: &str) -> Result<ParentEdge> {
        let conn = self.db.open_connection()?;
        find_edge(&conn, edge_id)
    }

    fn update_edge(&self, edge_id: &str, child_id: &str, parent_id: &str) -> Result<ParentEdge> {
        validate_edge(child_id, parent_id)?;
        let mut conn = self.db.open_connection()?;
        let tx = conn.transaction()?;

        find_edge(&tx, edge_id)?;
        if person_exists(&tx, child_id)?.is_none() {
            return Err(KintreeError::PersonNotFound(child_id.to_string()));
        }
        if person_exists(&tx, parent_id)?.is_none() {
            return Err(KintreeError::PersonNotFound(parent_id.to_string()));
        }

        let duplicate: bool = tx.query_row(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM parent_edges
                WHERE child_id = ?1 AND parent_id = ?2 AND edge_id <> ?3
            )
            "#,
            params![child_id, parent_id, edge_id],
            |row| row.get(0),
        )?;
        if duplicate {
            return Err(KintreeError::InvalidInput(format!(
                "{} is already a parent of {}",
                parent_id, child_id
            )));
        }

        tx.execute(
            "UPDATE parent_edges SET child_id = ?1, parent_id = ?2 WHERE edge_id = ?3",
            params![child_id, parent_id, edge_id],
        )?;
        let edge = find_edge(&tx, edge_id)?;
        tx.commit()?;

        log::info!("[SqliteStore] Updated edge {}: {} -> {}", edge_id, child_id, parent_id);
        Ok(edge)
    }

    fn delete_edge(&self, edge_id: &str) -> Result<()> {
        let conn = self.db.open_connection()?;
        let deleted = conn.execute("DELETE FROM parent_edges WHERE edge_id = ?1", params![edge_id])?;
        if deleted == 0 {
            return Err(KintreeError::RelationshipNotFound(edge_id.to_string()));
        }
        log::info!("[SqliteStore] Deleted edge {}", edge_id);
        Ok(())
    }
}
