use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::config::{DatabaseSettings, SESSION_IDLE_TIMEOUT};
use crate::services::auth_service::CredentialStore;
use crate::store::RecordStore;

use super::flash::Flash;
use super::session::Session;

pub type SessionStore = Arc<Mutex<HashMap<String, Session>>>;

#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<CredentialStore>,
    pub sessions: SessionStore,
    pub flash_store: Arc<Mutex<HashMap<String, Vec<Flash>>>>,
    pub settings: Arc<DatabaseSettings>,
    /// `None` when no warehouse password is configured.
    pub store: Option<Arc<dyn RecordStore>>,
    pub session_idle_timeout: Duration,
}

impl AppState {
    pub fn new(
        credentials: CredentialStore,
        settings: DatabaseSettings,
        store: Option<Arc<dyn RecordStore>>,
    ) -> Self {
        Self {
            credentials: Arc::new(credentials),
            sessions: Arc::new(Mutex::new(HashMap::new())),
            flash_store: Arc::new(Mutex::new(HashMap::new())),
            settings: Arc::new(settings),
            store,
            session_idle_timeout: SESSION_IDLE_TIMEOUT,
        }
    }

    pub fn sessions(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn flashes(&self) -> MutexGuard<'_, HashMap<String, Vec<Flash>>> {
        self.flash_store.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Marks the session as used at `now`. An idle session is removed instead and
    /// `false` is returned, as for an unknown id.
    pub fn touch_session(&self, sid: &str, now: Instant) -> bool {
        let mut sessions = self.sessions();
        let idle = match sessions.get_mut(sid) {
            None => return false,
            Some(session) if session.is_idle(now, self.session_idle_timeout) => true,
            Some(session) => {
                session.last_seen = now;
                false
            }
        };
        if idle {
            sessions.remove(sid);
            drop(sessions);
            self.flashes().remove(sid);
            tracing::info!("Session expired after inactivity");
        }
        !idle
    }

    /// Drops every session idle at `now` and returns how many went.
    pub fn prune_idle_sessions(&self, now: Instant) -> usize {
        let timeout = self.session_idle_timeout;
        let expired: Vec<String> = {
            let mut sessions = self.sessions();
            let expired: Vec<String> = sessions
                .iter()
                .filter(|(_, s)| s.is_idle(now, timeout))
                .map(|(sid, _)| sid.clone())
                .collect();
            for sid in &expired {
                sessions.remove(sid);
            }
            expired
        };
        let mut flashes = self.flashes();
        for sid in &expired {
            flashes.remove(sid);
        }
        expired.len()
    }

    pub fn table_label(&self) -> &str {
        self.settings.table.display()
    }
}
