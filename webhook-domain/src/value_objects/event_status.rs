// Event status value object

use serde::{Deserialize, Serialize};

/// Lifecycle of a stored event. The receiver only ever writes `Received`;
/// the remaining states belong to downstream consumers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Received,
    Processing,
    Processed,
    Failed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Received => "received",
            EventStatus::Processing => "processing",
            EventStatus::Processed => "processed",
            EventStatus::Failed => "failed",
        }
    }
}

impl From<&str> for EventStatus {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "processing" => EventStatus::Processing,
            "processed" => EventStatus::Processed,
            "failed" => EventStatus::Failed,
            _ => EventStatus::Received,
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
