//! Message probe: write a chat message as the sender, push it to the
//! recipient, and bump the recipient's conversation entry

use chrono::{DateTime, Utc};

use crate::api::{firestore, onesignal, ProbeClient};
use crate::config::Config;
use crate::error::ProbeError;
use crate::models::push::OneSignalNotification;
use crate::models::{ChatMessage, ConversationSummary};

use super::{banner, fcm, preview, ProbeReport, Step};

pub const DEFAULT_CONTENT: &str =
    "Hello! This is a test message from the teacher. Did you get the notification?";

/// Which provider delivers the push for a new message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PushVia {
    /// OneSignal, sent right after the message is written
    Onesignal,
    /// FCM, sent after the conversation entry is updated
    Fcm,
    /// Firestore writes only
    None,
}

/// Settings this probe cannot run without.
pub fn preflight(config: &Config, push: PushVia) -> Result<(), ProbeError> {
    config.require_project_id()?;
    config.require_api_key()?;
    match push {
        PushVia::Onesignal => {
            config.require_onesignal()?;
        }
        PushVia::Fcm => {
            config.require_fcm_token()?;
        }
        PushVia::None => {}
    }
    Ok(())
}

pub async fn run(
    client: &ProbeClient,
    content: &str,
    push: PushVia,
    now: DateTime<Utc>,
) -> ProbeReport {
    let mut report = ProbeReport::default();
    let config = client.config();
    let message = ChatMessage::new(&config.sender_id, content, now);

    println!("Sending message via Firestore REST API...");
    let written = report.track(
        Step::WriteMessage,
        firestore::write_message(client, &config.conversation_id, &message).await,
    );
    if written.is_none() {
        return report;
    }
    println!("Message added to Firestore");
    println!("   Message ID: {}", message.id);

    if push == PushVia::Onesignal {
        send_onesignal(client, &mut report, content).await;
    }

    println!("\nUpdating recipient's conversation...");
    let summary = ConversationSummary::for_new_message(&message);
    let updated = report.track(
        Step::UpdateConversation,
        firestore::update_conversation(
            client,
            &config.recipient_id,
            &config.conversation_id,
            &summary,
        )
        .await,
    );
    if updated.is_some() {
        println!("Recipient conversation updated");
    }

    if push == PushVia::Fcm {
        match fcm::lookup_token(client, &mut report).await {
            Some(token) => {
                fcm::send_push(client, &mut report, &token, content).await;
            }
            None => println!("Warning: no FCM token found for recipient"),
        }
    }

    banner("DONE!");
    println!("\nCheck your phone:");
    println!("   1. The message should appear in the chat");
    match push {
        PushVia::Onesignal => {
            println!("   2. A OneSignal push should arrive (even if the app is closed)")
        }
        PushVia::Fcm => println!("   2. An FCM push should arrive"),
        PushVia::None => println!("   2. No push was sent"),
    }
    println!("   3. The conversation list should show the new message");

    report
}

/// Look up the recipient's OneSignal player and push to it. Failures are
/// reported and the probe carries on.
async fn send_onesignal(client: &ProbeClient, report: &mut ProbeReport, content: &str) {
    println!("\nSending OneSignal push notification...");
    let config = client.config();

    let Some(player_id) = report.track(
        Step::LookupPlayer,
        onesignal::find_player(client, &config.recipient_id).await,
    ) else {
        return;
    };
    println!("   Found player ID: {}", preview(&player_id, 20));

    let notification = OneSignalNotification::chat(
        &config.onesignal_app_id,
        &player_id,
        content,
        &config.conversation_id,
        &config.sender_id,
    );
    if let Some(result) = report.track(
        Step::SendOneSignal,
        onesignal::send(client, &notification).await,
    ) {
        println!("OneSignal notification sent successfully!");
        if let Some(id) = result.id {
            println!("   Notification ID: {}", id);
        }
        println!("   Recipients: {}", result.recipients);
    }
}
