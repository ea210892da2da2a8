//! Session identity collaborator, prototype-grade: opaque bearer tokens held
//! in process memory, anonymous users minted on demand. The core treats a
//! session purely as request context; it never manages accounts.

use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::store::AreaId;

pub use shared::protocol::SESSION_TOKEN_HEADER;

const TOKEN_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub registered: bool,
    /// The backend area the session's player currently occupies, if any.
    pub current_area_id: Option<AreaId>,
}

#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fresh anonymous session and return its token.
    pub async fn create_anonymous(&self) -> (String, Session) {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect();
        let session = Session {
            user_id: Uuid::new_v4().to_string(),
            registered: false,
            current_area_id: None,
        };

        let mut sessions = self.sessions.write().await;
        sessions.insert(token.clone(), session.clone());
        (token, session)
    }

    pub async fn get(&self, token: &str) -> Option<Session> {
        let sessions = self.sessions.read().await;
        sessions.get(token).cloned()
    }

    /// Record (or clear) the area a session's player currently occupies.
    pub async fn set_current_area(&self, token: &str, area_id: Option<AreaId>) {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get_mut(token) {
            session.current_area_id = area_id;
        }
    }
}
