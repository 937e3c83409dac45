//! Per-user conversation summary shown in the chat list

use std::collections::BTreeMap;

use super::firestore::{Document, Value};
use super::message::ChatMessage;

/// Snapshot written to `chats/{userId}/conversations/{conversationId}`.
///
/// The unread counter is overwritten, not incremented.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationSummary {
    pub last_message: ChatMessage,
    pub unread_count: i64,
}

impl ConversationSummary {
    pub fn for_new_message(message: &ChatMessage) -> Self {
        Self {
            last_message: message.clone(),
            unread_count: 1,
        }
    }

    pub fn to_document(&self) -> Document {
        let mut last = BTreeMap::new();
        last.insert(
            "text".to_string(),
            Value::string(&self.last_message.content),
        );
        last.insert(
            "timestamp".to_string(),
            Value::timestamp(self.last_message.timestamp),
        );
        last.insert(
            "senderId".to_string(),
            Value::string(&self.last_message.sender_id),
        );

        Document::new()
            .with("lastMessage", Value::map(last))
            .with("unreadCount", Value::IntegerValue(self.unread_count))
    }
}
