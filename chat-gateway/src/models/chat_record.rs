use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One message/reply exchange in a user's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChatRecord {
    #[schema(example = "hello")]
    pub message: String,
    #[schema(example = "hi there")]
    pub reply: String,
    /// Unix epoch, milliseconds.
    #[schema(example = 1718000000000_i64)]
    pub timestamp: i64,
}

impl ChatRecord {
    pub fn new(message: String, reply: String) -> Self {
        Self {
            message,
            reply,
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}
