use crate::model::ChatMessage;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ClientNameRequest<'a> {
    pub client_name: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ChatSendRequest<'a> {
    pub message: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatStartResponse {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}
