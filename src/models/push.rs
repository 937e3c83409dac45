//! Push notification payloads for FCM HTTP v1 and OneSignal

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Android notification channel the app registers for chat pushes.
pub const CHAT_CHANNEL_ID: &str = "chat_messages";
/// Accent colour of chat notifications on Android.
pub const CHAT_COLOR: &str = "#C62828";
/// Heading used for OneSignal chat pushes.
pub const ONESIGNAL_HEADING: &str = "New Message";

/// `data` block both providers deliver to the app's tap handler.
fn chat_data(conversation_id: &str, sender_id: &str) -> BTreeMap<String, String> {
    let mut data = BTreeMap::new();
    data.insert("type".to_string(), "chat".to_string());
    data.insert("conversationId".to_string(), conversation_id.to_string());
    data.insert("senderId".to_string(), sender_id.to_string());
    data
}

// -- FCM HTTP v1 --

#[derive(Debug, Clone, Serialize)]
pub struct FcmSendRequest {
    pub message: FcmMessage,
}

#[derive(Debug, Clone, Serialize)]
pub struct FcmMessage {
    pub token: String,
    pub notification: FcmNotification,
    pub data: BTreeMap<String, String>,
    pub android: AndroidConfig,
    pub apns: ApnsConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct FcmNotification {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AndroidConfig {
    pub priority: String,
    pub notification: AndroidNotification,
}

#[derive(Debug, Clone, Serialize)]
pub struct AndroidNotification {
    pub channel_id: String,
    pub sound: String,
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApnsConfig {
    pub payload: ApnsPayload,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApnsPayload {
    pub aps: Aps,
}

#[derive(Debug, Clone, Serialize)]
pub struct Aps {
    pub sound: String,
    pub badge: u32,
}

impl FcmSendRequest {
    /// High-priority chat push that opens the conversation when tapped.
    pub fn chat(
        token: &str,
        title: &str,
        body: &str,
        conversation_id: &str,
        sender_id: &str,
    ) -> Self {
        let mut data = chat_data(conversation_id, sender_id);
        data.insert(
            "click_action".to_string(),
            "FLUTTER_NOTIFICATION_CLICK".to_string(),
        );

        Self {
            message: FcmMessage {
                token: token.to_string(),
                notification: FcmNotification {
                    title: title.to_string(),
                    body: body.to_string(),
                },
                data,
                android: AndroidConfig {
                    priority: "high".to_string(),
                    notification: AndroidNotification {
                        channel_id: CHAT_CHANNEL_ID.to_string(),
                        sound: "default".to_string(),
                        color: CHAT_COLOR.to_string(),
                    },
                },
                apns: ApnsConfig {
                    payload: ApnsPayload {
                        aps: Aps {
                            sound: "default".to_string(),
                            badge: 1,
                        },
                    },
                },
            },
        }
    }
}

// -- OneSignal --

#[derive(Debug, Clone, Serialize)]
pub struct OneSignalNotification {
    pub app_id: String,
    pub include_player_ids: Vec<String>,
    pub headings: BTreeMap<String, String>,
    pub contents: BTreeMap<String, String>,
    pub data: BTreeMap<String, String>,
}

impl OneSignalNotification {
    pub fn chat(
        app_id: &str,
        player_id: &str,
        content: &str,
        conversation_id: &str,
        sender_id: &str,
    ) -> Self {
        let mut headings = BTreeMap::new();
        headings.insert("en".to_string(), ONESIGNAL_HEADING.to_string());
        let mut contents = BTreeMap::new();
        contents.insert("en".to_string(), content.to_string());

        Self {
            app_id: app_id.to_string(),
            include_player_ids: vec![player_id.to_string()],
            headings,
            contents,
            data: chat_data(conversation_id, sender_id),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PlayersResponse {
    #[serde(default)]
    pub players: Vec<Player>,
}

#[derive(Debug, Deserialize)]
pub struct Player {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct NotificationResponse {
    pub id: Option<String>,
    #[serde(default)]
    pub recipients: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fcm_payload_shape() {
        let req = FcmSendRequest::chat("tok", "Dr. Sarah Johnson", "hi", "conv1", "teacher_1");
        let v = serde_json::to_value(&req).unwrap();

        assert_eq!(
            v,
            json!({
                "message": {
                    "token": "tok",
                    "notification": {"title": "Dr. Sarah Johnson", "body": "hi"},
                    "data": {
                        "type": "chat",
                        "conversationId": "conv1",
                        "senderId": "teacher_1",
                        "click_action": "FLUTTER_NOTIFICATION_CLICK"
                    },
                    "android": {
                        "priority": "high",
                        "notification": {
                            "channel_id": "chat_messages",
                            "sound": "default",
                            "color": "#C62828"
                        }
                    },
                    "apns": {"payload": {"aps": {"sound": "default", "badge": 1}}}
                }
            })
        );
    }

    #[test]
    fn test_onesignal_payload_has_no_click_action() {
        let n = OneSignalNotification::chat("app", "player", "hello", "conv1", "teacher_1");
        let v = serde_json::to_value(&n).unwrap();

        assert_eq!(v["include_player_ids"], json!(["player"]));
        assert_eq!(v["headings"], json!({"en": "New Message"}));
        assert_eq!(v["contents"], json!({"en": "hello"}));
        assert!(v["data"].get("click_action").is_none());
        assert_eq!(v["data"]["type"], "chat");
    }

    #[test]
    fn test_notification_response_defaults_recipients() {
        let r: NotificationResponse = serde_json::from_value(json!({"id": "n1"})).unwrap();
        assert_eq!(r.recipients, 0);

        let p: PlayersResponse = serde_json::from_value(json!({"total_count": 0})).unwrap();
        assert!(p.players.is_empty());
    }
}
