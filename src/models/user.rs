use serde::{Deserialize, Serialize};

/// Account profile returned by `GET /profile`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    #[serde(default)]
    pub nickname: Option<String>,
}

impl Profile {
    /// Get the best display name for this user
    /// Priority: nickname > username
    pub fn display_name(&self) -> &str {
        self.nickname
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.username)
    }
}
