//! Where ideas live.
//!
//! [`Storage`] is the blocking `SQLite` side; [`IdeaStore`] is the cloneable
//! async handle the web layer holds.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::{params, types::Type, Connection, OptionalExtension};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::idea::Idea;

const SELECT_IDEA: &str = "SELECT id, title, details, date FROM ideas";

/// One `SQLite` connection over the `ideas` table.
#[derive(Debug)]
pub struct Storage {
    path: PathBuf,
    conn: Connection,
}

impl Storage {
    /// Open the database at `path`, creating it and any missing parent
    /// directories, and bring its schema up to date.
    ///
    /// # Errors
    ///
    /// Fails if a directory cannot be created, the file cannot be opened as
    /// `SQLite`, or the schema is newer than this build.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::OpenDatabase {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Ideas database ready at {}", path.display());
        Ok(Self { path, conn })
    }

    /// A private, throwaway database. Used by tests and `AppState::in_memory`.
    ///
    /// # Errors
    ///
    /// Fails only if `SQLite` cannot allocate the database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::OpenDatabase {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Database file, or `:memory:`.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert an idea and return the id generated for it.
    ///
    /// Any id already set on `idea` is ignored.
    ///
    /// # Errors
    ///
    /// Propagates `SQLite` failures.
    pub fn insert(&self, idea: &Idea) -> Result<String> {
        let id = Uuid::new_v4().to_string();

        self.conn.execute(
            "INSERT INTO ideas (id, title, details, date) VALUES (?1, ?2, ?3, ?4)",
            params![id, idea.title, idea.details, format_date(idea.date)],
        )?;

        debug!("Inserted idea with id {}", id);
        Ok(id)
    }

    /// Get an idea by its id.
    ///
    /// # Errors
    ///
    /// Propagates `SQLite` failures.
    pub fn get(&self, id: &str) -> Result<Option<Idea>> {
        let idea = self
            .conn
            .query_row(&format!("{SELECT_IDEA} WHERE id = ?1"), [id], row_to_idea)
            .optional()?;
        Ok(idea)
    }

    /// List every idea, newest first.
    ///
    /// Ideas sharing a date come back in reverse insertion order.
    ///
    /// # Errors
    ///
    /// Propagates `SQLite` failures.
    pub fn list(&self) -> Result<Vec<Idea>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_IDEA} ORDER BY date DESC, rowid DESC"))?;

        let ideas = stmt
            .query_map([], row_to_idea)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(ideas)
    }

    /// Overwrite the title and details of a stored idea.
    ///
    /// The id and date are left as they are. Returns `false` if no idea
    /// has the given id.
    ///
    /// # Errors
    ///
    /// Propagates `SQLite` failures.
    pub fn update(&self, id: &str, title: &str, details: &str) -> Result<bool> {
        let affected = self.conn.execute(
            "UPDATE ideas SET title = ?2, details = ?3 WHERE id = ?1",
            params![id, title, details],
        )?;
        Ok(affected > 0)
    }

    /// Delete an idea by id.
    ///
    /// Returns `true` if an idea was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Propagates `SQLite` failures.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let affected = self.conn.execute("DELETE FROM ideas WHERE id = ?1", [id])?;
        Ok(affected > 0)
    }

    /// Count stored ideas.
    ///
    /// # Errors
    ///
    /// Propagates `SQLite` failures.
    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM ideas", [], |row| row.get(0))?;
        Ok(count)
    }
}

/// Dates are stored with a fixed width so text order is time order.
fn format_date(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn row_to_idea(row: &rusqlite::Row) -> rusqlite::Result<Idea> {
    let date_str: String = row.get(3)?;
    let date = DateTime::parse_from_rfc3339(&date_str)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?
        .with_timezone(&Utc);

    Ok(Idea {
        id: Some(row.get(0)?),
        title: row.get(1)?,
        details: row.get(2)?,
        date,
    })
}

/// Shared, async handle to a [`Storage`].
///
/// Clones share one connection. Every call runs on the blocking thread pool
/// so request handlers never block the runtime on `SQLite`.
#[derive(Debug, Clone)]
pub struct IdeaStore {
    inner: Arc<Mutex<Storage>>,
}

impl IdeaStore {
    /// Wrap an opened storage engine.
    #[must_use]
    pub fn new(storage: Storage) -> Self {
        Self {
            inner: Arc::new(Mutex::new(storage)),
        }
    }

    /// Open the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Storage::open(path).map(Self::new)
    }

    /// Open a fresh in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        Storage::open_in_memory().map(Self::new)
    }

    async fn run<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Storage) -> Result<T> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || op(&*inner.lock()))
            .await
            .map_err(|e| Error::internal(format!("storage task failed: {e}")))?
    }

    /// All ideas, newest first.
    ///
    /// # Errors
    ///
    /// Propagates `SQLite` failures.
    pub async fn list(&self) -> Result<Vec<Idea>> {
        self.run(Storage::list).await
    }

    /// Find one idea.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IdeaNotFound`] if no idea has this id, or an error if
    /// the database operation fails.
    pub async fn find(&self, id: &str) -> Result<Idea> {
        let id = id.to_owned();
        self.run(move |storage| {
            storage
                .get(&id)?
                .ok_or_else(|| Error::idea_not_found(id.as_str()))
        })
        .await
    }

    /// Save a new idea and return it as stored, with its generated id.
    ///
    /// # Errors
    ///
    /// Propagates `SQLite` failures.
    pub async fn create(&self, idea: Idea) -> Result<Idea> {
        self.run(move |storage| {
            let id = storage.insert(&idea)?;
            storage
                .get(&id)?
                .ok_or_else(|| Error::internal(format!("idea {id} vanished after insert")))
        })
        .await
    }

    /// Load an idea, replace its title and details, and save it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IdeaNotFound`] if no idea has this id, or an error if
    /// the database operation fails.
    pub async fn update(&self, id: &str, title: String, details: String) -> Result<Idea> {
        let id = id.to_owned();
        self.run(move |storage| {
            let mut idea = storage
                .get(&id)?
                .ok_or_else(|| Error::idea_not_found(id.as_str()))?;
            storage.update(&id, &title, &details)?;
            idea.title = title;
            idea.details = details;
            Ok(idea)
        })
        .await
    }

    /// Remove an idea. Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Propagates `SQLite` failures.
    pub async fn remove(&self, id: &str) -> Result<bool> {
        let id = id.to_owned();
        self.run(move |storage| storage.delete(&id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn scratch() -> Storage {
        Storage::open_in_memory().unwrap()
    }

    fn dated(title: &str, days_ago: i64) -> Idea {
        let mut idea = Idea::new(title, format!("details for {title}"));
        idea.date = Utc::now() - Duration::days(days_ago);
        idea
    }

    #[test]
    fn test_open_in_memory() {
        let storage = scratch();
        assert_eq!(storage.path(), Path::new(":memory:"));
    }

    #[test]
    fn test_open_file_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ideas.db");

        let storage = Storage::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(storage.path(), path.as_path());
    }

    #[test]
    fn test_file_storage_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ideas.db");

        let id = {
            let storage = Storage::open(&path).unwrap();
            storage.insert(&Idea::new("kept", "on disk")).unwrap()
        };

        let storage = Storage::open(&path).unwrap();
        let idea = storage.get(&id).unwrap().unwrap();
        assert_eq!(idea.title, "kept");
    }

    #[test]
    fn test_insert_and_get() {
        let storage = scratch();
        let idea = Idea::new("Hello", "world");

        let id = storage.insert(&idea).unwrap();
        let retrieved = storage.get(&id).unwrap().unwrap();

        assert_eq!(retrieved.id.as_deref(), Some(id.as_str()));
        assert_eq!(retrieved.title, "Hello");
        assert_eq!(retrieved.details, "world");
    }

    #[test]
    fn test_insert_generates_distinct_ids() {
        let storage = scratch();
        let idea = Idea::new("same", "content");

        let id1 = storage.insert(&idea).unwrap();
        let id2 = storage.insert(&idea).unwrap();

        assert_ne!(id1, id2);
        assert_eq!(storage.count().unwrap(), 2);
    }

    #[test]
    fn test_insert_ignores_caller_id() {
        let storage = scratch();
        let mut idea = Idea::new("t", "d");
        idea.id = Some("chosen-by-caller".to_string());

        let id = storage.insert(&idea).unwrap();
        assert_ne!(id, "chosen-by-caller");
    }

    #[test]
    fn test_date_round_trips_to_the_microsecond() {
        let storage = scratch();
        let idea = Idea::new("t", "d");

        let id = storage.insert(&idea).unwrap();
        let stored = storage.get(&id).unwrap().unwrap();

        let drift = (stored.date - idea.date).num_microseconds().unwrap().abs();
        assert!(drift < 1);
    }

    #[test]
    fn test_get_nonexistent() {
        let storage = scratch();
        assert!(storage.get("no-such-id").unwrap().is_none());
    }

    #[test]
    fn test_list_newest_first() {
        let storage = scratch();
        storage.insert(&dated("middle", 5)).unwrap();
        storage.insert(&dated("oldest", 10)).unwrap();
        storage.insert(&dated("newest", 0)).unwrap();

        let titles: Vec<String> = storage
            .list()
            .unwrap()
            .into_iter()
            .map(|i| i.title)
            .collect();
        assert_eq!(titles, vec!["newest", "middle", "oldest"]);
    }

    #[test]
    fn test_list_same_date_latest_insert_first() {
        let storage = scratch();
        let first = Idea::new("first", "d");
        let mut second = Idea::new("second", "d");
        second.date = first.date;

        storage.insert(&first).unwrap();
        storage.insert(&second).unwrap();

        let list = storage.list().unwrap();
        assert_eq!(list[0].title, "second");
        assert_eq!(list[1].title, "first");
    }

    #[test]
    fn test_list_empty() {
        let storage = scratch();
        assert!(storage.list().unwrap().is_empty());
    }

    #[test]
    fn test_update_keeps_id_and_date() {
        let storage = scratch();
        let original = dated("before", 3);
        let id = storage.insert(&original).unwrap();
        let stored = storage.get(&id).unwrap().unwrap();

        assert!(storage.update(&id, "after", "new details").unwrap());

        let updated = storage.get(&id).unwrap().unwrap();
        assert_eq!(updated.title, "after");
        assert_eq!(updated.details, "new details");
        assert_eq!(updated.date, stored.date);
        assert_eq!(storage.count().unwrap(), 1);
    }

    #[test]
    fn test_update_nonexistent() {
        let storage = scratch();
        assert!(!storage.update("missing", "t", "d").unwrap());
    }

    #[test]
    fn test_delete() {
        let storage = scratch();
        let id = storage.insert(&Idea::new("doomed", "d")).unwrap();

        assert!(storage.delete(&id).unwrap());
        assert!(storage.get(&id).unwrap().is_none());
        assert!(!storage.delete(&id).unwrap());
    }

    #[test]
    fn test_count() {
        let storage = scratch();
        assert_eq!(storage.count().unwrap(), 0);

        for i in 0..3 {
            storage.insert(&Idea::new(format!("idea {i}"), "d")).unwrap();
        }
        assert_eq!(storage.count().unwrap(), 3);
    }

    #[test]
    fn test_corrupt_date_is_a_query_error() {
        let storage = scratch();
        storage
            .conn
            .execute(
                "INSERT INTO ideas (id, title, details, date) VALUES ('x', 't', 'd', 'yesterday')",
                [],
            )
            .unwrap();

        let err = storage.get("x").unwrap_err();
        assert!(matches!(err, Error::Sqlite(_)));
    }

    #[tokio::test]
    async fn test_store_create_and_find() {
        let store = IdeaStore::open_in_memory().unwrap();

        let created = store.create(Idea::new("async", "idea")).await.unwrap();
        let id = created.id.clone().unwrap();

        let found = store.find(&id).await.unwrap();
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn test_store_find_missing_is_not_found() {
        let store = IdeaStore::open_in_memory().unwrap();
        let err = store.find("missing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_store_update() {
        let store = IdeaStore::open_in_memory().unwrap();
        let created = store.create(Idea::new("old", "old")).await.unwrap();
        let id = created.id.clone().unwrap();

        let updated = store
            .update(&id, "new".to_string(), "newer".to_string())
            .await
            .unwrap();
        assert_eq!(updated.title, "new");
        assert_eq!(updated.date, created.date);
        assert_eq!(store.find(&id).await.unwrap().details, "newer");
    }

    #[tokio::test]
    async fn test_store_update_missing_is_not_found() {
        let store = IdeaStore::open_in_memory().unwrap();
        let err = store
            .update("missing", "t".to_string(), "d".to_string())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_store_remove_and_list() {
        let store = IdeaStore::open_in_memory().unwrap();
        let keep = store.create(Idea::new("keep", "d")).await.unwrap();
        let gone = store.create(Idea::new("gone", "d")).await.unwrap();

        assert!(store.remove(gone.id.as_deref().unwrap()).await.unwrap());
        assert!(!store.remove("missing").await.unwrap());

        let list = store.list().await.unwrap();
        assert_eq!(list, vec![keep]);
    }

    #[tokio::test]
    async fn test_store_clones_share_connection() {
        let store = IdeaStore::open_in_memory().unwrap();
        let other = store.clone();

        store.create(Idea::new("shared", "d")).await.unwrap();
        assert_eq!(other.list().await.unwrap().len(), 1);
    }
}
