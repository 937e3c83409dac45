//! FCM probe: look up the recipient's device token, then push to it

use crate::api::{fcm, firestore, ProbeClient};
use crate::config::Config;
use crate::error::ProbeError;
use crate::models::push::FcmSendRequest;

use super::{banner, preview, ProbeReport, Step};

pub const DEFAULT_BODY: &str = "Test notification! You should see this on your phone.";

/// Settings this probe cannot run without.
pub fn preflight(config: &Config) -> Result<(), ProbeError> {
    config.require_project_id()?;
    config.require_api_key()?;
    config.require_fcm_token()?;
    Ok(())
}

pub async fn run(client: &ProbeClient, body: &str) -> ProbeReport {
    let mut report = ProbeReport::default();

    banner("FCM NOTIFICATION TEST");

    let Some(token) = lookup_token(client, &mut report).await else {
        banner("Cannot send notification: no FCM token found");
        println!("\nMake sure:");
        println!("1. The recipient app has been opened at least once");
        println!("2. Notification permissions were granted");
        println!("3. The FCM token was stored in Firestore");
        return report;
    };

    let sent = send_push(client, &mut report, &token, body).await;

    if sent {
        banner("SUCCESS!");
        println!("\nCheck your phone for the notification!");
    } else {
        banner("FAILED");
        println!("\nNote: FCM v1 requires an OAuth2 access token, not a server key.");
        println!("Refresh it with 'chat-probe login --fcm-token ...' and retry.");
    }

    report
}

/// Look up the recipient's FCM registration token.
pub(crate) async fn lookup_token(client: &ProbeClient, report: &mut ProbeReport) -> Option<String> {
    println!("\nGetting recipient's FCM token...");
    let recipient = &client.config().recipient_id;
    let token = report.track(
        Step::LookupFcmToken,
        firestore::fetch_fcm_token(client, recipient).await,
    )?;
    println!("   Found FCM token: {}", preview(&token, 50));
    Some(token)
}

/// Send a chat push to `token`. Returns whether FCM accepted it.
pub(crate) async fn send_push(
    client: &ProbeClient,
    report: &mut ProbeReport,
    token: &str,
    body: &str,
) -> bool {
    println!("\nSending FCM notification...");
    let config = client.config();
    let request = FcmSendRequest::chat(
        token,
        &config.sender_name,
        body,
        &config.conversation_id,
        &config.sender_id,
    );

    match report.track(Step::SendFcm, fcm::send(client, &request).await) {
        Some(name) => {
            println!("FCM notification sent successfully!");
            if let Some(name) = name {
                println!("   Message: {}", name);
            }
            true
        }
        None => false,
    }
}
