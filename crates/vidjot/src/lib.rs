//! `vidjot` - jot down video ideas
//!
//! A small server-rendered web application for keeping a list of video
//! ideas, with flash messages and an embedded `SQLite` store.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod idea;
pub mod logging;
pub mod session;
pub mod storage;
pub mod web;

pub use config::Config;
pub use error::{Error, Result};
pub use idea::{FieldError, Idea, IdeaInput};
pub use logging::init_logging;
pub use session::{Flash, Session, SessionStore};
pub use storage::{IdeaStore, Storage};
pub use web::{create_router, AppState};
