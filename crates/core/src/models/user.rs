use serde::{Deserialize, Serialize};

/// Who owns the session. Login is a stub — any id is accepted and no
/// credentials exist; the id only keys the persisted session records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Stable identifier used as the session-store key
    pub id: String,

    /// Name shown in the UI (defaults to the id)
    pub display_name: String,

    /// Creation timestamp (RFC 3339)
    pub created_at: String,
}

impl UserProfile {
    pub fn new(id: impl Into<String>, created_at: impl Into<String>) -> Self {
        let id = id.into().trim().to_string();
        Self {
            display_name: id.clone(),
            id,
            created_at: created_at.into(),
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }
}
