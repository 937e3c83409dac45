//! Firestore REST operations used by the probes

use crate::error::ProbeError;
use crate::models::{ChatMessage, ConversationSummary, Document};

use super::client::ProbeClient;

/// Field of the user document holding the device's FCM registration token.
pub const FCM_TOKEN_FIELD: &str = "fcmToken";

/// Look up the FCM registration token stored on `users/{user_id}`.
pub async fn fetch_fcm_token(client: &ProbeClient, user_id: &str) -> Result<String, ProbeError> {
    let path = format!("users/{}", user_id);
    let doc: Document = client.firestore_get(&path).await?;

    doc.get_str(FCM_TOKEN_FIELD)
        .map(String::from)
        .ok_or_else(|| ProbeError::MissingField {
            document: path,
            field: FCM_TOKEN_FIELD.to_string(),
        })
}

/// Write a message into `messages/{conversation_id}/messages/{message.id}`.
pub async fn write_message(
    client: &ProbeClient,
    conversation_id: &str,
    message: &ChatMessage,
) -> Result<(), ProbeError> {
    let path = format!("messages/{}/messages/{}", conversation_id, message.id);
    client
        .firestore_patch(&path, &message.to_document(), &[])
        .await?;
    Ok(())
}

/// Overwrite the last-message snapshot and unread counter of a user's
/// conversation entry. Other fields of the document are left untouched.
pub async fn update_conversation(
    client: &ProbeClient,
    user_id: &str,
    conversation_id: &str,
    summary: &ConversationSummary,
) -> Result<(), ProbeError> {
    let path = format!("chats/{}/conversations/{}", user_id, conversation_id);
    let doc = summary.to_document();
    let mask = doc.field_paths();
    client.firestore_patch(&path, &doc, &mask).await?;
    Ok(())
}
