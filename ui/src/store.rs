use crate::session::SessionState;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, MutexGuard, RwLock};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "rag_ui_session";
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(12 * 60 * 60);

pub type SessionHandle = Arc<Session>;

/// One browser's session.
///
/// `action` serializes the user's actions, and is held across the backend
/// call. `state` is only held long enough to read or update the state, so a
/// page render never waits for a backend call in flight.
#[derive(Default)]
pub struct Session {
    action: Mutex<()>,
    state: Mutex<SessionState>,
}

impl Session {
    pub async fn begin_action(&self) -> MutexGuard<'_, ()> {
        self.action.lock().await
    }

    pub async fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().await
    }
}

struct Entry {
    state: SessionHandle,
    last_seen: Instant,
}

/// In-memory sessions keyed by the id in the session cookie.
///
/// Each session has its own lock, so a slow backend call in one browser never
/// blocks another.
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Entry>>,
    idle_timeout: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_TIMEOUT)
    }
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
        }
    }

    /// Finds the session named by the cookie, or starts a new one and sets the cookie.
    pub async fn resolve(&self, jar: CookieJar) -> (CookieJar, SessionHandle) {
        let now = Instant::now();
        let requested = jar
            .get(SESSION_COOKIE)
            .and_then(|c| Uuid::parse_str(c.value()).ok());

        let mut sessions = self.sessions.write().await;
        self.evict_idle(&mut sessions, now);

        if let Some(id) = requested {
            if let Some(entry) = sessions.get_mut(&id) {
                entry.last_seen = now;
                return (jar, entry.state.clone());
            }
        }

        let id = Uuid::new_v4();
        let state: SessionHandle = Arc::new(Session::default());
        sessions.insert(
            id,
            Entry {
                state: state.clone(),
                last_seen: now,
            },
        );
        log::debug!("Started session {} ({} active)", id, sessions.len());

        let cookie = Cookie::build((SESSION_COOKIE, id.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax);
        (jar.add(cookie), state)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn evict_idle(&self, sessions: &mut HashMap<Uuid, Entry>, now: Instant) {
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) <= self.idle_timeout);
        let evicted = before - sessions.len();
        if evicted > 0 {
            log::debug!("Evicted {} idle session(s)", evicted);
        }
    }
}
