//! HTTP client for Firestore, FCM and OneSignal
//!
//! Wraps reqwest::Client with per-service URL building and auth.

use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::config::Config;
use crate::error::ProbeError;

/// Client for one probe run. Holds the loaded config and base URLs.
pub struct ProbeClient {
    http: reqwest::Client,
    config: Config,
    firestore: Url,
    fcm: Url,
    onesignal: Url,
}

impl ProbeClient {
    pub fn new(config: Config) -> Result<Self, ProbeError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|source| ProbeError::Request {
                url: String::new(),
                source,
            })?;

        Ok(Self {
            http,
            firestore: Url::parse(&config.endpoints.firestore)?,
            fcm: Url::parse(&config.endpoints.fcm)?,
            onesignal: Url::parse(&config.endpoints.onesignal)?,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// URL of a document, given its path below `documents/`.
    pub fn document_url(&self, doc_path: &str) -> Result<Url, ProbeError> {
        let project = self.config.require_project_id()?;
        let mut url = self.firestore.clone();
        url.set_path(&format!(
            "/v1/projects/{}/databases/(default)/documents/{}",
            project, doc_path
        ));
        Ok(url)
    }

    pub fn fcm_send_url(&self) -> Result<Url, ProbeError> {
        let project = self.config.require_project_id()?;
        let mut url = self.fcm.clone();
        url.set_path(&format!("/v1/projects/{}/messages:send", project));
        Ok(url)
    }

    pub fn onesignal_url(&self, endpoint: &str) -> Url {
        let mut url = self.onesignal.clone();
        url.set_path(&format!("/api/v1/{}", endpoint));
        url
    }

    /// GET a Firestore document (API key auth).
    pub async fn firestore_get<T: DeserializeOwned>(&self, doc_path: &str) -> Result<T, ProbeError> {
        let key = self.config.require_api_key()?;
        let url = self.document_url(doc_path)?;
        tracing::debug!("Firestore GET {}", url);

        let resp = self
            .http
            .get(url.clone())
            .query(&[("key", key)])
            .send()
            .await
            .map_err(|source| request_error(&url, source))?;

        decode(check_response(resp, &url).await?, &url).await
    }

    /// PATCH a Firestore document. With a non-empty `mask` only the named
    /// fields are written; without one the document is replaced.
    pub async fn firestore_patch<B: Serialize>(
        &self,
        doc_path: &str,
        body: &B,
        mask: &[&str],
    ) -> Result<reqwest::Response, ProbeError> {
        let key = self.config.require_api_key()?;
        let url = self.document_url(doc_path)?;
        tracing::debug!("Firestore PATCH {} (mask: {:?})", url, mask);

        let mut query: Vec<(&str, &str)> = vec![("key", key)];
        query.extend(mask.iter().map(|field| ("updateMask.fieldPaths", *field)));

        let resp = self
            .http
            .patch(url.clone())
            .query(&query)
            .json(body)
            .send()
            .await
            .map_err(|source| request_error(&url, source))?;

        check_response(resp, &url).await
    }

    /// POST to FCM HTTP v1 (OAuth2 bearer).
    pub async fn fcm_post<B: Serialize>(&self, body: &B) -> Result<reqwest::Response, ProbeError> {
        let token = self.config.require_fcm_token()?;
        let url = self.fcm_send_url()?;
        tracing::debug!("FCM POST {}", url);

        let resp = self
            .http
            .post(url.clone())
            .bearer_auth(&token)
            .json(body)
            .send()
            .await
            .map_err(|source| request_error(&url, source))?;

        check_response(resp, &url).await
    }

    /// GET from the OneSignal REST API (`Authorization: Basic {rest key}`).
    pub async fn onesignal_get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ProbeError> {
        let (_, rest_key) = self.config.require_onesignal()?;
        let url = self.onesignal_url(endpoint);
        tracing::debug!("OneSignal GET {}", url);

        let resp = self
            .http
            .get(url.clone())
            .query(query)
            .header("Authorization", format!("Basic {}", rest_key))
            .send()
            .await
            .map_err(|source| request_error(&url, source))?;

        decode(check_response(resp, &url).await?, &url).await
    }

    /// POST to the OneSignal REST API.
    pub async fn onesignal_post<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ProbeError> {
        let (_, rest_key) = self.config.require_onesignal()?;
        let url = self.onesignal_url(endpoint);
        tracing::debug!("OneSignal POST {}", url);

        let resp = self
            .http
            .post(url.clone())
            .header("Authorization", format!("Basic {}", rest_key))
            .json(body)
            .send()
            .await
            .map_err(|source| request_error(&url, source))?;

        decode(check_response(resp, &url).await?, &url).await
    }
}

fn request_error(url: &Url, source: reqwest::Error) -> ProbeError {
    ProbeError::Request {
        url: url.to_string(),
        source,
    }
}

/// Check HTTP response status code and keep the body on failure.
async fn check_response(resp: reqwest::Response, url: &Url) -> Result<reqwest::Response, ProbeError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ProbeError::Status {
            status: status.as_u16(),
            url: url.to_string(),
            body,
        });
    }
    Ok(resp)
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response, url: &Url) -> Result<T, ProbeError> {
    resp.json().await.map_err(|source| ProbeError::Decode {
        url: url.to_string(),
        source,
    })
}
