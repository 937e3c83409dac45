//! Configuration and credential storage

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::auth::{StoredToken, TokenStore};
use crate::error::ProbeError;

const DEFAULT_PROJECT_ID: &str = "epimobileapplication-14233";
const DEFAULT_ONESIGNAL_APP_ID: &str = "e66b5607-740b-4f85-9096-4b59eeb3b970";
const DEFAULT_CONVERSATION_ID: &str = "RbTHlucHbN9213Gi6R7P";
const DEFAULT_SENDER_ID: &str = "teacher_1";
const DEFAULT_RECIPIENT_ID: &str = "F8JrDuY6gKND35uqby4W3z20yDH3";
const DEFAULT_SENDER_NAME: &str = "Dr. Sarah Johnson";

/// Base URLs of the services we talk to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub firestore: String,
    pub fcm: String,
    pub onesignal: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            firestore: "https://firestore.googleapis.com".to_string(),
            fcm: "https://fcm.googleapis.com".to_string(),
            onesignal: "https://onesignal.com".to_string(),
        }
    }
}

impl Endpoints {
    /// Point every service at one base URL (mock servers in tests).
    #[cfg(test)]
    pub fn all(base: &str) -> Self {
        Self {
            firestore: base.to_string(),
            fcm: base.to_string(),
            onesignal: base.to_string(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Firebase project ID
    pub project_id: String,
    /// Firebase web API key (Firestore REST `key=` parameter)
    pub api_key: String,
    /// OneSignal application ID
    pub onesignal_app_id: String,
    /// OneSignal REST API key
    pub onesignal_rest_key: String,
    /// Conversation the probe messages go into
    pub conversation_id: String,
    /// User the probe messages appear to come from
    pub sender_id: String,
    /// User whose device should receive the pushes
    pub recipient_id: String,
    /// FCM notification title
    pub sender_name: String,
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Stored FCM OAuth2 access token
    pub fcm_access_token: Option<StoredToken>,
    pub endpoints: Endpoints,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_id: DEFAULT_PROJECT_ID.to_string(),
            api_key: String::new(),
            onesignal_app_id: DEFAULT_ONESIGNAL_APP_ID.to_string(),
            onesignal_rest_key: String::new(),
            conversation_id: DEFAULT_CONVERSATION_ID.to_string(),
            sender_id: DEFAULT_SENDER_ID.to_string(),
            recipient_id: DEFAULT_RECIPIENT_ID.to_string(),
            sender_name: DEFAULT_SENDER_NAME.to_string(),
            timeout_secs: 30,
            fcm_access_token: None,
            endpoints: Endpoints::default(),
        }
    }
}

impl Config {
    /// Get config directory path
    fn config_dir() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "chat-probe", "chat-probe")
            .context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }

    /// Config file path: the explicit one if given, else the per-user default.
    pub fn resolve_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
        match explicit {
            Some(path) => Ok(path),
            None => Ok(Self::config_dir()?.join("config.toml")),
        }
    }

    /// Load configuration from disk, falling back to defaults if absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Save configuration to disk
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).context("Failed to write config file")?;

        // Set restrictive permissions on config file (contains keys)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(path, perms).context("Failed to set config permissions")?;
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn require_api_key(&self) -> Result<&str, ProbeError> {
        require(&self.api_key, "api_key")
    }

    pub fn require_project_id(&self) -> Result<&str, ProbeError> {
        require(&self.project_id, "project_id")
    }

    pub fn require_onesignal(&self) -> Result<(&str, &str), ProbeError> {
        Ok((
            require(&self.onesignal_app_id, "onesignal_app_id")?,
            require(&self.onesignal_rest_key, "onesignal_rest_key")?,
        ))
    }

    /// FCM bearer token. An expired token is still returned (FCM will
    /// reject it and the probe reports that), but we warn first.
    pub fn require_fcm_token(&self) -> Result<String, ProbeError> {
        let token = self
            .get_fcm_token()
            .filter(|t| !t.token.is_empty())
            .ok_or(ProbeError::Config("fcm_access_token"))?;
        if token.is_expired() {
            tracing::warn!("Stored FCM access token looks expired; run 'chat-probe login' again");
        }
        Ok(token.token)
    }
}

impl TokenStore for Config {
    fn get_fcm_token(&self) -> Option<StoredToken> {
        self.fcm_access_token.clone()
    }

    fn set_fcm_token(&mut self, token: String, expires_in: Option<u64>) {
        self.fcm_access_token = Some(StoredToken::new(token, expires_in));
    }

    fn clear_tokens(&mut self) {
        self.fcm_access_token = None;
    }
}

fn require<'a>(value: &'a str, name: &'static str) -> Result<&'a str, ProbeError> {
    if value.trim().is_empty() {
        Err(ProbeError::Config(name))
    } else {
        Ok(value)
    }
}

/// Show only enough of a secret to recognise it.
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return "(unset)".to_string();
    }
    let prefix: String = secret.chars().take(6).collect();
    if prefix.len() == secret.len() {
        "******".to_string()
    } else {
        format!("{}******", prefix)
    }
}

/// Write a config template, refusing to clobber an existing file unless forced.
pub fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }
    Config::default().save_to(path)?;
    println!("Wrote config template to {}", path.display());
    println!("Fill in api_key and onesignal_rest_key before running a probe.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("chat-probe-test-{}-{}", std::process::id(), name))
            .join("config.toml")
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = temp_path("missing");
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.sender_id, "teacher_1");
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn test_save_and_load_roundtrip_with_token() {
        let path = temp_path("roundtrip");
        let mut config = Config {
            api_key: "AIzaTest".to_string(),
            ..Config::default()
        };
        config.set_fcm_token("ya29.token".to_string(), Some(3600));
        config.endpoints.fcm = "http://127.0.0.1:9999".to_string();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);

        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let path = temp_path("partial");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "api_key = \"k\"\n[endpoints]\nfcm = \"http://x\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api_key, "k");
        assert_eq!(config.endpoints.fcm, "http://x");
        assert_eq!(config.endpoints.firestore, Endpoints::default().firestore);
        assert_eq!(config.timeout_secs, 30);

        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let path = temp_path("init");
        assert_ok!(init(&path, false));
        assert_err!(init(&path, false));
        assert_ok!(init(&path, true));

        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_require_reports_missing_field() {
        let config = Config::default();
        match config.require_api_key() {
            Err(ProbeError::Config(name)) => assert_eq!(name, "api_key"),
            other => panic!("unexpected: {:?}", other),
        }
        assert_err!(config.require_onesignal());
        assert_err!(config.require_fcm_token());
    }

    #[test]
    fn test_clear_tokens() {
        let mut config = Config::default();
        config.set_fcm_token("t".into(), None);
        assert_ok!(config.require_fcm_token());
        config.clear_tokens();
        assert!(config.get_fcm_token().is_none());
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret(""), "(unset)");
        assert_eq!(mask_secret("short"), "******");
        assert_eq!(mask_secret("AIzaSyC6kx0"), "AIzaSy******");
    }
}
