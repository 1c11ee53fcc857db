use serde::{Deserialize, Serialize};

use super::enums::FeedbackOutcome;

/// One line of the append-only feedback log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    /// UTC, RFC 3339.
    pub timestamp: String,
    pub request_id: String,
    pub edits: String,
    pub outcome: FeedbackOutcome,
    pub notes: Option<String>,
}
