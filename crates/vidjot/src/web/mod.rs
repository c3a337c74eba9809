//! HTTP layer for vidjot.
//!
//! Routes map directly onto [`IdeaStore`] calls and render [`views`] or
//! redirect back to the list with a flash message.

mod error;
pub mod handlers;
pub mod payload;
pub mod server;
pub mod session;
pub mod views;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::Result;
use crate::session::SessionStore;
use crate::storage::IdeaStore;

pub use server::serve;
pub use session::CookieSettings;

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The ideas collection.
    pub ideas: IdeaStore,
    /// Live sessions and their flash messages.
    pub sessions: Arc<SessionStore>,
    /// How the session cookie is written.
    pub cookie: Arc<CookieSettings>,
}

impl AppState {
    /// Assemble state from its parts.
    #[must_use]
    pub fn new(ideas: IdeaStore, sessions: Arc<SessionStore>, cookie: CookieSettings) -> Self {
        Self {
            ideas,
            sessions,
            cookie: Arc::new(cookie),
        }
    }

    /// Open the configured database and set up sessions.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn from_config(config: &Config) -> Result<Self> {
        let ideas = IdeaStore::open(config.database_path())?;
        Ok(Self::with_store(ideas, config))
    }

    /// State over an in-memory database with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn in_memory() -> Result<Self> {
        let ideas = IdeaStore::open_in_memory()?;
        Ok(Self::with_store(ideas, &Config::default()))
    }

    fn with_store(ideas: IdeaStore, config: &Config) -> Self {
        let sessions = Arc::new(SessionStore::new(config.session_idle_timeout()));
        Self::new(ideas, sessions, CookieSettings::from(config))
    }
}

/// Build the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/about", get(handlers::about))
        .route(
            "/ideas",
            get(handlers::list_ideas).post(handlers::create_idea),
        )
        .route("/ideas/add", get(handlers::add_idea_form))
        .route("/ideas/edit/{id}", get(handlers::edit_idea_form))
        .route(
            "/ideas/{id}",
            put(handlers::update_idea)
                .delete(handlers::delete_idea)
                .post(handlers::method_override),
        )
        .fallback(handlers::not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session::attach_session,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
