//! Signed-in user, passed explicitly to whoever needs it

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub role: String,
    pub started_at: DateTime<Utc>,
}

/// Holds at most one active session
#[derive(Debug, Default)]
pub struct SessionContext {
    current: RwLock<Option<Session>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session, replacing any previous one
    pub fn login(&self, user_id: &str, role: &str) -> CoreResult<Session> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(CoreError::ValidationError {
                message: "user_id must not be empty".to_string(),
            });
        }
        let role = match role.trim() {
            "" => "user",
            r => r,
        };

        let session = Session {
            user_id: user_id.to_string(),
            role: role.to_string(),
            started_at: Utc::now(),
        };
        *self.current.write().map_err(|_| poisoned())? = Some(session.clone());
        log::info!("Session started for {} ({})", session.user_id, session.role);
        Ok(session)
    }

    /// End the session; returns the one that was active
    pub fn logout(&self) -> CoreResult<Option<Session>> {
        let ended = self.current.write().map_err(|_| poisoned())?.take();
        if let Some(ref session) = ended {
            log::info!("Session ended for {}", session.user_id);
        }
        Ok(ended)
    }

    pub fn current(&self) -> Option<Session> {
        self.current.read().ok().and_then(|s| (*s).clone())
    }

    /// The active session, or `Unauthorized`
    pub fn require(&self) -> CoreResult<Session> {
        self.current().ok_or(CoreError::Unauthorized)
    }
}

fn poisoned() -> CoreError {
    CoreError::InternalError {
        message: "session lock poisoned".to_string(),
    }
}
