//! Ephemeral chat messages and their display format.

use chrono::NaiveTime;

use chatrelay_shared::time::format_minutes;

/// Username attached to server-generated notifications
pub const SYSTEM_USERNAME: &str = "System";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// User-authored content
    Chat,
    /// Server-generated notification (join / leave)
    System,
}

/// A message on its way to one or more clients. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    pub username: String,
    pub content: String,
}

impl Message {
    pub fn chat(username: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Chat,
            username: username.into(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::System,
            username: SYSTEM_USERNAME.to_string(),
            content: content.into(),
        }
    }

    /// Render the single display line for this message.
    ///
    /// System messages: `[HH:MM] <content>`.
    /// Chat messages: `[HH:MM] <username>: <content>`.
    pub fn format_line(&self, at: NaiveTime) -> String {
        let stamp = format_minutes(at);
        match self.kind {
            MessageKind::Chat => format!("[{}] {}: {}", stamp, self.username, self.content),
            MessageKind::System => format!("[{}] {}", stamp, self.content),
        }
    }
}
