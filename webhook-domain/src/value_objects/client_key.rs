// Client identity used for rate limiting

use serde::{Deserialize, Serialize};

/// Raw client address string. No IP format validation is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientKey(pub String);

impl ClientKey {
    /// First entry of a forwarded-for list when present, else the direct peer address.
    pub fn resolve(forwarded_for: Option<&str>, peer_addr: Option<&str>) -> Self {
        if let Some(first) = forwarded_for
            .and_then(|list| list.split(',').next())
            .map(str::trim)
            .filter(|value| !value.is_empty())
        {
            return Self(first.to_string());
        }
        Self(peer_addr.unwrap_or_default().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for ClientKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
