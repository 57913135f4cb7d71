use serde::{Deserialize, Serialize};

/// One entry of a chat thread in the global `chats` collection.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChatMessage {
    pub message: String,
    pub sender: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
}

impl ChatMessage {
    pub fn outgoing_from_user(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            sender: "user".to_string(),
            direction: Some("outgoing".to_string()),
        }
    }
}

/// Chat threads are correlated with accounts by email, not by user id.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChatThread {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}
