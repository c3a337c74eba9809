//! Error type shared by the store, the configuration loader and the web layer.
//!
//! Handlers return [`Result`] and rely on `?`; the web layer decides which
//! variants become a 404 and which a 500.

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong in vidjot.
#[derive(Error, Debug)]
pub enum Error {
    /// The ideas database could not be opened.
    #[error("cannot open ideas database {path}: {source}")]
    OpenDatabase {
        /// Database file, or `:memory:`.
        path: PathBuf,
        /// Why `SQLite` refused.
        #[source]
        source: rusqlite::Error,
    },

    /// SQLite rejected a statement.
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The on-disk schema cannot be brought to the current version.
    #[error("schema upgrade failed: {message}")]
    Schema {
        /// What was wrong with it.
        message: String,
    },

    /// No idea has the requested id.
    #[error("no idea with id {id}")]
    IdeaNotFound {
        /// The id that was looked up.
        id: String,
    },

    /// The configuration sources could not be merged or parsed.
    #[error("cannot read configuration: {0}")]
    Config(Box<figment::Error>),

    /// The configuration parsed but holds a value we refuse to run with.
    #[error("bad configuration: {message}")]
    InvalidConfig {
        /// Which value, and why.
        message: String,
    },

    /// Any other filesystem failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A data directory could not be created.
    #[error("cannot create {path}: {source}")]
    CreateDir {
        /// Directory we tried to create.
        path: PathBuf,
        /// Why the filesystem refused.
        #[source]
        source: std::io::Error,
    },

    /// Broken invariant inside vidjot itself.
    #[error("internal: {0}")]
    Internal(String),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl Error {
    /// Shorthand for [`Error::Internal`].
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Shorthand for [`Error::IdeaNotFound`].
    #[must_use]
    pub fn idea_not_found(id: impl Into<String>) -> Self {
        Self::IdeaNotFound { id: id.into() }
    }

    /// True when the caller asked for an idea that does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::IdeaNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idea_not_found_message_names_the_id() {
        let err = Error::idea_not_found("7f3c");
        assert_eq!(err.to_string(), "no idea with id 7f3c");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_only_missing_ideas_are_not_found() {
        assert!(!Error::internal("lock poisoned").is_not_found());
        assert!(!Error::InvalidConfig {
            message: "port".into()
        }
        .is_not_found());
        assert!(!Error::Sqlite(rusqlite::Error::QueryReturnedNoRows).is_not_found());
    }

    #[test]
    fn test_io_error_is_transparent() {
        let err: Error = std::io::Error::other("disk full").into();
        assert_eq!(err.to_string(), "disk full");
    }

    #[test]
    fn test_sqlite_errors_convert() {
        let err: Error = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, Error::Sqlite(_)));
    }

    #[test]
    fn test_open_database_keeps_path_and_source() {
        let err = Error::OpenDatabase {
            path: PathBuf::from("/var/lib/vidjot/ideas.db"),
            source: rusqlite::Error::InvalidQuery,
        };
        assert!(err.to_string().starts_with("cannot open ideas database /var/lib/vidjot/ideas.db"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_figment_errors_are_boxed() {
        let err: Error = figment::Error::from("missing field `port`".to_string()).into();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("missing field"));
    }
}
