// Identifier value objects

use serde::{Deserialize, Serialize};

/// Placeholder id sent by signed-out clients. Never scopes a query.
pub const DEMO_USER_ID: &str = "user-id";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    /// Accepts a caller-supplied id when it can scope a query: non-empty and not the demo id.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let value = raw?.trim();
        if value.is_empty() || value == DEMO_USER_ID {
            return None;
        }
        Some(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
