//! Chat message written into a conversation's message collection

use chrono::{DateTime, Utc};

use super::firestore::{Document, Value};

/// Delivery status stamped on freshly written messages.
pub const STATUS_SENT: &str = "sent";
/// Message kind for plain text.
pub const TYPE_TEXT: &str = "text";

/// A chat message as the app stores it under
/// `messages/{conversationId}/messages/{messageId}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub sender_id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// New unread text message; the id is the send time in Unix milliseconds.
    pub fn new(sender_id: &str, content: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: now.timestamp_millis().to_string(),
            sender_id: sender_id.to_string(),
            content: content.to_string(),
            timestamp: now,
        }
    }

    pub fn to_document(&self) -> Document {
        Document::new()
            .with("id", Value::string(&self.id))
            .with("senderId", Value::string(&self.sender_id))
            .with("content", Value::string(&self.content))
            .with("timestamp", Value::timestamp(self.timestamp))
            .with("read", Value::BooleanValue(false))
            .with("status", Value::string(STATUS_SENT))
            .with("type", Value::string(TYPE_TEXT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_id_is_unix_millis() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let msg = ChatMessage::new("teacher_1", "hi", now);
        assert_eq!(msg.id, "1700000000123");
    }

    #[test]
    fn test_document_fields() {
        let now = Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap();
        let doc = ChatMessage::new("teacher_1", "hello", now).to_document();

        assert_eq!(doc.get_str("senderId"), Some("teacher_1"));
        assert_eq!(doc.get_str("content"), Some("hello"));
        assert_eq!(doc.get_str("status"), Some("sent"));
        assert_eq!(doc.get_str("type"), Some("text"));
        assert_eq!(doc.get("read"), Some(&Value::BooleanValue(false)));
        assert_eq!(
            doc.get("timestamp"),
            Some(&Value::TimestampValue("2024-03-02T08:00:00Z".into()))
        );
        assert_eq!(doc.fields.len(), 7);
    }
}
