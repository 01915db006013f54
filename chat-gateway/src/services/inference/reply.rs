//! Reply extraction for the text-generation API.
//!
//! Different hosted models answer with different JSON layouts. Each known
//! layout is a `ReplyShape`; shapes are tried in `ReplyShape::PRECEDENCE`
//! order and the first one that matches supplies the reply.

use serde_json::Value;

/// Returned when no known shape matches the response body.
pub const FALLBACK_REPLY: &str = "Sorry, I couldn't generate a reply.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyShape {
    /// `{"generated_text": "..."}`
    GeneratedText,
    /// `[{"generated_text": "..."}, ...]`
    FirstGeneratedText,
    /// `{"conversation": {"generated_responses": [..., "latest"]}}`
    ConversationLatest,
}

impl ReplyShape {
    pub const PRECEDENCE: [ReplyShape; 3] = [
        ReplyShape::GeneratedText,
        ReplyShape::FirstGeneratedText,
        ReplyShape::ConversationLatest,
    ];

    /// The reply text if `body` has this shape.
    pub fn extract(self, body: &Value) -> Option<String> {
        match self {
            ReplyShape::GeneratedText => non_empty_text(body.get("generated_text")),
            ReplyShape::FirstGeneratedText => body
                .as_array()
                .and_then(|items| items.first())
                .and_then(|first| non_empty_text(first.get("generated_text"))),
            ReplyShape::ConversationLatest => body
                .get("conversation")
                .and_then(|c| c.get("generated_responses"))
                .and_then(Value::as_array)
                .and_then(|responses| responses.last())
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

// An empty `generated_text` counts as absent so the next shape gets a turn.
fn non_empty_text(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// First matching shape and its reply.
pub fn match_shape(body: &Value) -> Option<(ReplyShape, String)> {
    ReplyShape::PRECEDENCE
        .into_iter()
        .find_map(|shape| shape.extract(body).map(|reply| (shape, reply)))
}

pub fn normalize_reply(body: &Value) -> String {
    match match_shape(body) {
        Some((shape, reply)) => {
            tracing::debug!(shape = ?shape, "Matched inference reply shape");
            reply
        }
        None => FALLBACK_REPLY.to_string(),
    }
}
