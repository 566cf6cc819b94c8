//! Versioned SQL migrations read from `NNN_name.sql` files.

use rusqlite::{Connection, params};
use std::fs;
use std::path::Path;
use crate::error::{Result, KintreeError};

/// Tables the family store needs after all migrations ran.
pub const REQUIRED_TABLES: [&str; 3] = ["parent_edges", "people", "schema_migrations"];

/// Migration metadata
struct Migration {
    version: u32,
    name: String,
    sql: String,
}

/// Create schema_migrations table if it doesn't exist
fn ensure_migrations_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;
    Ok(())
}

/// Get list of applied migrations
pub fn get_applied_migrations(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM schema_migrations ORDER BY version")?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
    Ok(names)
}

/// Split `001_people.sql` into `(1, "001_people")`.
fn parse_migration_filename(filename: &str) -> Result<(u32, String)> {
    let name = filename
        .strip_suffix(".sql")
        .ok_or_else(|| KintreeError::Config(format!("Not a migration file: {}", filename)))?;
    let version = name
        .split('_')
        .next()
        .and_then(|v| v.parse::<u32>().ok())
        .ok_or_else(|| KintreeError::Config(format!("Invalid migration version: {}", filename)))?;
    Ok((version, name.to_string()))
}

/// Load migration files from migrations directory, sorted by version
fn load_migrations(migrations_dir: &Path) -> Result<Vec<Migration>> {
    let mut migrations = Vec::new();

    for entry in fs::read_dir(migrations_dir)? {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) != Some("sql") {
            continue;
        }
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| KintreeError::Config("Invalid migration filename".to_string()))?;
        let (version, name) = parse_migration_filename(filename)?;
        let sql = fs::read_to_string(&path)?;
        migrations.push(Migration { version, name, sql });
    }

    migrations.sort_by_key(|m| m.version);
    Ok(migrations)
}

/// Run all pending migrations
pub fn run_migrations(conn: &mut Connection, migrations_dir: &Path) -> Result<()> {
    ensure_migrations_table(conn)?;

    let applied = get_applied_migrations(conn)?;

    for migration in load_migrations(migrations_dir)? {
        if applied.contains(&migration.name) {
            log::debug!("Migration {} already applied, skipping", migration.name);
            continue;
        }

        log::info!("Applying migration: {} (version {})", migration.name, migration.version);

        let tx = conn.transaction()?;
        tx.execute_batch(&migration.sql).map_err(|e| {
            KintreeError::Config(format!("Failed to execute migration {}: {}", migration.name, e))
        })?;
        tx.execute(
            "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
            params![migration.version, migration.name],
        )?;
        tx.commit()?;

        log::info!("Migration {} applied successfully", migration.name);
    }

    log::info!("All migrations completed");
    Ok(())
}

/// Names from [`REQUIRED_TABLES`] that do not exist in the database.
pub fn missing_tables(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table'")?;
    let tables = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;

    Ok(REQUIRED_TABLES
        .iter()
        .filter(|required| !tables.iter().any(|t| t == *required))
        .map(|t| t.to_string())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn crate_migrations() -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations")
    }

    #[test]
    fn test_migration_tracking() {
        let temp_dir = TempDir::new().unwrap();
        let conn = Connection::open(temp_dir.path().join("test.db")).unwrap();

        ensure_migrations_table(&conn).unwrap();
        conn.execute(
            "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
            params![1, "001_test"],
        ).unwrap();

        let applied = get_applied_migrations(&conn).unwrap();
        assert_eq!(applied, vec!["001_test".to_string()]);
    }

    #[test]
    fn test_parse_migration_filename() {
        assert_eq!(parse_migration_filename("001_people.sql").unwrap(), (1, "001_people".to_string()));
        assert_eq!(parse_migration_filename("010_x_y.sql").unwrap(), (10, "010_x_y".to_string()));
        assert!(parse_migration_filename("people.sql").is_err());
        assert!(parse_migration_filename("001_people.txt").is_err());
    }

    #[test]
    fn test_load_migrations_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("migrations");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("002_another.sql"), "CREATE TABLE another (id INTEGER);").unwrap();
        fs::write(dir.join("001_test.sql"), "CREATE TABLE test (id INTEGER);").unwrap();
        fs::write(dir.join("README.md"), "not a migration").unwrap();

        let migrations = load_migrations(&dir).unwrap();
        assert_eq!(migrations.len(), 2);
        assert_eq!(migrations[0].version, 1);
        assert_eq!(migrations[1].version, 2);
    }

    #[test]
    fn test_full_migration_schema() {
        let temp_dir = TempDir::new().unwrap();
        let mut conn = Connection::open(temp_dir.path().join("test.db")).unwrap();

        assert_eq!(missing_tables(&conn).unwrap().len(), REQUIRED_TABLES.len());

        run_migrations(&mut conn, &crate_migrations()).unwrap();
        assert!(missing_tables(&conn).unwrap().is_empty());

        let indexes: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='index' AND name LIKE 'idx_%'")
            .unwrap()
            .query_map([], |row| row.get::<_, String>(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()
            .unwrap();
        assert!(indexes.contains(&"idx_people_name".to_string()));
        assert!(indexes.contains(&"idx_parent_edges_parent".to_string()));
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let mut conn = Connection::open(temp_dir.path().join("test.db")).unwrap();

        run_migrations(&mut conn, &crate_migrations()).unwrap();
        run_migrations(&mut conn, &crate_migrations()).unwrap();

        let applied = get_applied_migrations(&conn).unwrap();
        assert_eq!(applied, vec!["001_people".to_string(), "002_parent_edges".to_string()]);
    }

    #[test]
    fn test_failed_migration_reports_name() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("migrations");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("001_broken.sql"), "CREATE TABLE (;").unwrap();

        let mut conn = Connection::open(temp_dir.path().join("test.db")).unwrap();
        let err = run_migrations(&mut conn, &dir).unwrap_err();
        assert!(err.to_string().contains("001_broken"));
        assert!(get_applied_migrations(&conn).unwrap().is_empty());
    }
}
