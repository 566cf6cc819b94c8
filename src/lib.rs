pub mod config;
pub mod error;
pub mod db;
pub mod genealogy;
pub mod store;
pub mod service;
pub mod api;

pub use config::Config;
pub use error::{KintreeError, Result};
pub use genealogy::{FamilyTree, Person, ParentEdge, Relative, RelationshipClassifier, TreeBuilder};
pub use service::FamilyTreeService;
pub use store::{PersonStore, InMemoryStore, SqliteStore};

/// Open the configured database, apply pending migrations and wrap it in a
/// [`SqliteStore`].
pub async fn open_store(config: &Config) -> Result<SqliteStore> {
    let db = db::Db::new(config.db_path());
    let migrations_dir = config.migrations_dir().to_path_buf();
    db.with_connection(move |conn| db::migrate::run_migrations(conn, &migrations_dir))
        .await?;
    log::info!("Database ready at {}", db.path().display());
    Ok(SqliteStore::new(db))
}
