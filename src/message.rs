use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::atomic::{AtomicI64, Ordering};

/// A single transcript entry, authored either by the user or the assistant.
///
/// Messages are immutable once created; both the live transcript and the
/// fetched history are append-only lists of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub is_user: bool,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: next_id(),
            text: text.into(),
            is_user: true,
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            id: next_id(),
            text: text.into(),
            is_user: false,
            timestamp: Utc::now(),
        }
    }

    pub fn author(&self) -> &'static str {
        if self.is_user {
            "You"
        } else {
            "Neura"
        }
    }
}

// Ids are the creation instant in milliseconds, bumped past the last issued
// value so rapid calls within the same millisecond stay unique.
static LAST_ID: AtomicI64 = AtomicI64::new(0);

fn next_id() -> String {
    let now = Utc::now().timestamp_millis();
    let mut prev = LAST_ID.load(Ordering::Relaxed);
    loop {
        let next = now.max(prev + 1);
        match LAST_ID.compare_exchange_weak(prev, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next.to_string(),
            Err(actual) => prev = actual,
        }
    }
}

/// Wire shape of one entry from `GET /api/chat/history`.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryRecord {
    pub id: String,
    pub text: String,
    pub is_user: bool,
    pub timestamp: String,
}

impl HistoryRecord {
    /// Map a server record into the shared message shape. Timestamps that
    /// fail to parse fall back to now, which displays as "Just now".
    pub fn into_message(self) -> Message {
        let timestamp = DateTime::parse_from_rfc3339(&self.timestamp)
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());
        Message {
            id: self.id,
            text: self.text,
            is_user: self.is_user,
            timestamp,
        }
    }
}

/// Relative age of a timestamp for history cards: "3 days ago",
/// "2 hours ago", "5 minutes ago", or "Just now".
pub fn relative_age(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(timestamp);
    let days = diff.num_days();
    let hours = diff.num_hours();
    let minutes = diff.num_minutes();

    if days > 0 {
        format!("{} days ago", days)
    } else if hours > 0 {
        format!("{} hours ago", hours)
    } else if minutes > 0 {
        format!("{} minutes ago", minutes)
    } else {
        "Just now".to_string()
    }
}
