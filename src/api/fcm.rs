//! FCM HTTP v1 send

use serde::Deserialize;

use crate::error::ProbeError;
use crate::models::push::FcmSendRequest;

use super::client::ProbeClient;

#[derive(Debug, Deserialize)]
struct SendResponse {
    name: Option<String>,
}

/// Send a push through FCM. Returns the message name FCM assigned, if any.
pub async fn send(client: &ProbeClient, request: &FcmSendRequest) -> Result<Option<String>, ProbeError> {
    let resp = client.fcm_post(request).await?;
    // FCM answers `{"name": "projects/.../messages/..."}`; a body we cannot
    // parse still means the send was accepted.
    let name = match resp.json::<SendResponse>().await {
        Ok(body) => body.name,
        Err(e) => {
            tracing::debug!("Unparseable FCM response: {}", e);
            None
        }
    };
    Ok(name)
}
