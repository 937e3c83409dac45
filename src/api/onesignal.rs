//! OneSignal player lookup and notification send

use crate::error::ProbeError;
use crate::models::push::{NotificationResponse, OneSignalNotification, PlayersResponse};

use super::client::ProbeClient;

/// Find the first player (device subscription) registered under the app's
/// external user id.
pub async fn find_player(client: &ProbeClient, external_user_id: &str) -> Result<String, ProbeError> {
    let (app_id, _) = client.config().require_onesignal()?;
    let players: PlayersResponse = client
        .onesignal_get(
            "players",
            &[("app_id", app_id), ("external_user_id", external_user_id)],
        )
        .await?;

    players
        .players
        .into_iter()
        .next()
        .map(|p| p.id)
        .ok_or_else(|| ProbeError::NoPlayer(external_user_id.to_string()))
}

pub async fn send(
    client: &ProbeClient,
    notification: &OneSignalNotification,
) -> Result<NotificationResponse, ProbeError> {
    client.onesignal_post("notifications", notification).await
}
