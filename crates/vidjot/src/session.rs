//! Server-side sessions and flash messages.
//!
//! Each browser gets a random session id (carried in a cookie by the web
//! layer). The only per-session state is a queue of flash messages: strings
//! pushed by one request and shown, once, by the next rendered page.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

/// Kind of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlashKind {
    /// An operation succeeded.
    Success,
    /// An operation failed.
    Error,
}

/// Flash messages drained from a session, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flash {
    /// Success messages, oldest first.
    pub success: Vec<String>,
    /// Error messages, oldest first.
    pub error: Vec<String>,
}

impl Flash {
    /// True when there is nothing to show.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.success.is_empty() && self.error.is_empty()
    }
}

#[derive(Debug)]
struct Entry {
    flashes: Vec<(FlashKind, String)>,
    last_seen: Instant,
}

impl Entry {
    fn new() -> Self {
        Self {
            flashes: Vec::new(),
            last_seen: Instant::now(),
        }
    }
}

/// In-memory store of live sessions.
#[derive(Debug)]
pub struct SessionStore {
    sessions: DashMap<Uuid, Entry>,
    idle_timeout: Duration,
}

impl SessionStore {
    /// Create an empty store whose sessions expire after `idle_timeout`
    /// without a request.
    #[must_use]
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            idle_timeout,
        }
    }

    /// Start a new session and return its id.
    pub fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.insert(id, Entry::new());
        debug!("Created session {}", id);
        id
    }

    /// Mark a session as used by the current request.
    ///
    /// Returns `false` if the session is unknown or has expired, in which
    /// case any expired state is dropped.
    pub fn touch(&self, id: Uuid) -> bool {
        let expired = match self.sessions.get_mut(&id) {
            None => return false,
            Some(mut entry) => {
                if entry.last_seen.elapsed() >= self.idle_timeout {
                    true
                } else {
                    entry.last_seen = Instant::now();
                    false
                }
            }
        };

        if expired {
            self.sessions.remove(&id);
        }
        !expired
    }

    /// Queue a flash message on a session. Unknown sessions are ignored.
    pub fn push_flash(&self, id: Uuid, kind: FlashKind, message: impl Into<String>) {
        if let Some(mut entry) = self.sessions.get_mut(&id) {
            entry.flashes.push((kind, message.into()));
        }
    }

    /// Remove and return every queued flash message of a session.
    #[must_use]
    pub fn take_flash(&self, id: Uuid) -> Flash {
        let mut flash = Flash::default();
        if let Some(mut entry) = self.sessions.get_mut(&id) {
            for (kind, message) in entry.flashes.drain(..) {
                match kind {
                    FlashKind::Success => flash.success.push(message),
                    FlashKind::Error => flash.error.push(message),
                }
            }
        }
        flash
    }

    /// Drop every session idle for longer than the timeout.
    ///
    /// Returns the number of sessions removed.
    pub fn sweep(&self) -> usize {
        let before = self.sessions.len();
        let timeout = self.idle_timeout;
        self.sessions
            .retain(|_, entry| entry.last_seen.elapsed() < timeout);
        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            debug!("Swept {} idle sessions", removed);
        }
        removed
    }

    /// Number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// True when no sessions are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Sweep idle sessions every `every` until the runtime shuts down.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> tokio::task::JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                store.sweep();
            }
        })
    }
}

/// The session attached to the current request.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    store: Arc<SessionStore>,
}

impl Session {
    /// Bind a session id to its store.
    #[must_use]
    pub fn new(id: Uuid, store: Arc<SessionStore>) -> Self {
        Self { id, store }
    }

    /// The session id.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Queue a success message for the next rendered page.
    pub fn success(&self, message: impl Into<String>) {
        self.store.push_flash(self.id, FlashKind::Success, message);
    }

    /// Queue an error message for the next rendered page.
    ///
    /// No route queues one today. The slot stays so pages keep a place for
    /// failures, and the layout already renders it as a danger alert.
    pub fn error(&self, message: impl Into<String>) {
        self.store.push_flash(self.id, FlashKind::Error, message);
    }

    /// Drain the queued messages.
    #[must_use]
    pub fn take_flash(&self) -> Flash {
        self.store.take_flash(self.id)
    }
}
