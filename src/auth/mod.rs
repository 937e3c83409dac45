//! Credential commands
//!
//! FCM HTTP v1 only accepts a short-lived OAuth2 access token, which has to
//! be minted elsewhere (e.g. `gcloud auth print-access-token`) and stored
//! here. Firestore and OneSignal use static keys kept in the config file.

pub mod tokens;

use std::path::Path;

use anyhow::Result;

pub use tokens::{StoredToken, TokenStore};

use crate::config::{mask_secret, Config};

/// Store an FCM access token.
pub fn login(config_path: &Path, token: &str, expires_in: Option<u64>) -> Result<()> {
    let mut config = Config::load_from(config_path)?;
    config.set_fcm_token(token.trim().to_string(), expires_in);
    config.save_to(config_path)?;

    match expires_in {
        Some(secs) => println!("FCM access token stored (expires in {}s).", secs),
        None => println!("FCM access token stored (no expiry recorded)."),
    }
    Ok(())
}

/// Forget the stored FCM access token.
pub fn logout(config_path: &Path) -> Result<()> {
    let mut config = Config::load_from(config_path)?;
    config.clear_tokens();
    config.save_to(config_path)?;
    println!("Stored tokens cleared.");
    Ok(())
}

/// Print the loaded configuration with secrets masked.
pub fn status(config_path: &Path) -> Result<()> {
    let config = Config::load_from(config_path)?;

    println!("\nConfig file: {}", config_path.display());
    println!("{:-<60}", "");
    println!("Project ID:        {}", or_unset(&config.project_id));
    println!("API key:           {}", mask_secret(&config.api_key));
    println!("OneSignal app ID:  {}", or_unset(&config.onesignal_app_id));
    println!("OneSignal key:     {}", mask_secret(&config.onesignal_rest_key));
    println!("Conversation ID:   {}", or_unset(&config.conversation_id));
    println!("Sender ID:         {}", or_unset(&config.sender_id));
    println!("Recipient ID:      {}", or_unset(&config.recipient_id));

    match config.get_fcm_token() {
        None => println!("FCM token:         (none) -- run 'chat-probe login --fcm-token ...'"),
        Some(t) => {
            let state = match t.remaining_secs() {
                _ if t.is_expired() => "EXPIRED".to_string(),
                Some(left) => format!("valid for {}m", left / 60),
                None => "expiry unknown".to_string(),
            };
            println!("FCM token:         {} ({})", mask_secret(&t.token), state);
        }
    }

    Ok(())
}

fn or_unset(value: &str) -> &str {
    if value.is_empty() {
        "(unset)"
    } else {
        value
    }
}
