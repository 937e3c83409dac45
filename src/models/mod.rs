//! Data models for documents and push payloads

pub mod conversation;
pub mod firestore;
pub mod message;
pub mod push;

pub use conversation::ConversationSummary;
pub use firestore::Document;
pub use message::ChatMessage;
