use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatPhase {
    Loading,
    Idle,
    Sending,
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    client_name: String,
    phase: ChatPhase,
    messages: Vec<ChatMessage>,
    notice: Option<String>,
}

impl ChatSession {
    pub fn new(client_name: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
            phase: ChatPhase::Loading,
            messages: Vec::new(),
            notice: None,
        }
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    pub fn phase(&self) -> ChatPhase {
        self.phase
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn started(&mut self, result: Result<Vec<ChatMessage>, String>) {
        if self.phase != ChatPhase::Loading {
            log::warn!("Dropping chat history that arrived after the session started");
            return;
        }
        match result {
            Ok(messages) => self.messages = messages,
            Err(err) => {
                log::error!("Error initializing chat: {err}");
                self.notice = Some("The assistant could not be reached.".to_string());
            }
        }
        self.phase = ChatPhase::Idle;
    }

    /// Appends the trimmed input as a user message and moves to `Sending`.
    /// Returns the text to send, or `None` when the input is blank or a
    /// send is already outstanding.
    pub fn begin_send(&mut self, input: &str) -> Option<String> {
        let content = input.trim();
        if content.is_empty() || self.phase != ChatPhase::Idle {
            return None;
        }
        self.messages.push(ChatMessage::user(content));
        self.notice = None;
        self.phase = ChatPhase::Sending;
        Some(content.to_string())
    }

    pub fn replied(&mut self, result: Result<ChatMessage, String>) {
        if self.phase != ChatPhase::Sending {
            log::warn!("Dropping chat reply that arrived while not sending");
            return;
        }
        match result {
            Ok(message) => self.messages.push(message),
            Err(err) => {
                log::error!("Error sending message: {err}");
                self.notice = Some("No reply received. Your message was not answered.".to_string());
            }
        }
        self.phase = ChatPhase::Idle;
    }

    pub fn can_send(&self, input: &str) -> bool {
        self.phase == ChatPhase::Idle && !input.trim().is_empty()
    }
}

/// Name sent to `/chat/start`: the explicit client name when known, else
/// the route slug with dashes turned into spaces and each word capitalised.
pub fn chat_client_name(patient: &str, client_name: Option<&str>) -> String {
    let raw = match client_name {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => patient.replace('-', " "),
    };
    raw.split(' ')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idle_session(messages: Vec<ChatMessage>) -> ChatSession {
        let mut session = ChatSession::new("Bob");
        session.started(Ok(messages));
        session
    }

    #[test]
    fn wire_roles_are_lowercase() {
        let json = serde_json::to_string(&ChatMessage::assistant("hi")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
        let parsed: ChatMessage =
            serde_json::from_str(r#"{"role":"user","content":"hello"}"#).unwrap();
        assert_eq!(parsed, ChatMessage::user("hello"));
    }

    #[test]
    fn starts_loading_then_takes_seed_messages() {
        let mut session = ChatSession::new("Bob");
        assert_eq!(session.phase(), ChatPhase::Loading);
        assert!(!session.can_send("hello"));

        let seed = vec![ChatMessage::assistant("I'm your clinical radiology assistant.")];
        session.started(Ok(seed.clone()));
        assert_eq!(session.phase(), ChatPhase::Idle);
        assert_eq!(session.messages(), seed.as_slice());
    }

    #[test]
    fn failed_start_leaves_empty_transcript_with_notice() {
        let mut session = ChatSession::new("Bob");
        session.started(Err("connection refused".to_string()));
        assert_eq!(session.phase(), ChatPhase::Idle);
        assert!(session.messages().is_empty());
        assert!(session.notice().is_some());
    }

    #[test]
    fn send_appends_user_then_assistant() {
        let mut session = idle_session(vec![ChatMessage::assistant("seed")]);

        let outgoing = session.begin_send("  How is the tumor trending?  ");
        assert_eq!(outgoing.as_deref(), Some("How is the tumor trending?"));
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.phase(), ChatPhase::Sending);

        session.replied(Ok(ChatMessage::assistant("Stable.")));
        assert_eq!(session.messages().len(), 3);
        assert_eq!(session.messages()[2].role, ChatRole::Assistant);
        assert_eq!(session.phase(), ChatPhase::Idle);
    }

    #[test]
    fn blank_or_concurrent_sends_are_refused() {
        let mut session = idle_session(Vec::new());
        assert_eq!(session.begin_send("   "), None);
        assert!(session.begin_send("first").is_some());
        assert_eq!(session.begin_send("second"), None);
        assert_eq!(session.messages().len(), 1);
    }

    #[test]
    fn failed_send_keeps_user_message_visible() {
        let mut session = idle_session(Vec::new());
        session.begin_send("hello");
        session.replied(Err("timeout".to_string()));
        assert_eq!(session.messages(), &[ChatMessage::user("hello")]);
        assert!(session.notice().is_some());
        assert_eq!(session.phase(), ChatPhase::Idle);
    }

    #[test]
    fn client_name_prefers_query_parameter() {
        assert_eq!(chat_client_name("bob", Some("Bob")), "Bob");
        assert_eq!(chat_client_name("bob", None), "Bob");
        assert_eq!(chat_client_name("mary-ann", None), "Mary Ann");
        assert_eq!(chat_client_name("bob", Some("  ")), "Bob");
    }
}
