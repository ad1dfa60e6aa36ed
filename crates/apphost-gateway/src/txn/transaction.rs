//! Transaction entity: an opaque, time-boxed token for a multi-request
//! administrative operation.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Lifecycle state of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionState {
    /// Accepting requests
    Started,
    /// Concluded successfully; pending changes persisted
    Committed,
    /// Concluded by explicit discard or a failed flush
    Aborted,
    /// Concluded by the idle timer; pending changes discarded
    TimedOut,
}

/// Opaque transaction token.
///
/// Derived from a random UUID but exposed as an encoded string so the
/// externally visible id carries no structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Generate a fresh unguessable id.
    pub fn generate() -> Self {
        Self(hex::encode(Uuid::new_v4().as_bytes()))
    }

    /// The encoded token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TransactionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TransactionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A time-boxed administrative transaction.
#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub created_on: DateTime<Utc>,
    pub expires_on: DateTime<Utc>,
    pub state: TransactionState,
}

impl Transaction {
    /// Begin a new transaction expiring after `idle_timeout`.
    pub fn begin(idle_timeout: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::generate(),
            created_on: now,
            expires_on: now + chrono_duration(idle_timeout),
            state: TransactionState::Started,
        }
    }

    /// Push the expiry out to `now + idle_timeout`.
    pub fn extend(&mut self, idle_timeout: Duration) {
        self.expires_on = Utc::now() + chrono_duration(idle_timeout);
    }

    /// Whether the idle window has elapsed at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_on
    }
}

/// Convert a std duration; config validation bounds it well below overflow,
/// so saturate to one hour as a defensive floor rather than panic.
fn chrono_duration(d: Duration) -> ChronoDuration {
    ChronoDuration::from_std(d).unwrap_or_else(|_| ChronoDuration::hours(1))
}
