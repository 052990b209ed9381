//! Session types

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Where a session is in its upload/search cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// No image uploaded yet
    #[default]
    Idle,
    /// An image was uploaded and extraction attempted
    Extracted,
    /// A search was run over the extracted text
    Searched,
}

/// Per-session state surviving across interactions
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    /// Text of the latest upload ("" before any upload or after a failed one)
    pub extracted_text: String,
    /// Current search keyword, kept across uploads
    pub keyword: String,
    pub phase: Phase,
    pub created_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            extracted_text: String::new(),
            keyword: String::new(),
            phase: Phase::Idle,
            created_at: now,
            last_seen: now,
        }
    }

    pub fn touch(&mut self) {
        self.last_seen = Utc::now();
    }

    /// True once the session has been idle for longer than `ttl`
    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now - self.last_seen > ttl
    }

    /// Download is offered whenever there is text to export
    pub fn can_export(&self) -> bool {
        !self.extracted_text.is_empty()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            phase: self.phase,
            extracted_text: self.extracted_text.clone(),
            keyword: self.keyword.clone(),
            can_export: self.can_export(),
            created_at: self.created_at,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable view of a session
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub phase: Phase,
    pub extracted_text: String,
    pub keyword: String,
    pub can_export: bool,
    pub created_at: DateTime<Utc>,
}
