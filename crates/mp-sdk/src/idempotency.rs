//! Idempotency keys for mutating calls
//!
//! One key per admin intent. Retrying the same submission (manually, or via
//! the automatic refresh-and-replay) must reuse the key so the backend can
//! deduplicate; a new intent gets a new key. The client never interprets the
//! key beyond generating and forwarding it.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Fresh random (UUID v4) key.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The supplied key, or a fresh one for a new intent.
    pub fn or_generate(key: Option<IdempotencyKey>) -> Self {
        key.unwrap_or_else(Self::generate)
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for IdempotencyKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for IdempotencyKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<Uuid> for IdempotencyKey {
    fn from(value: Uuid) -> Self {
        Self(value.to_string())
    }
}
