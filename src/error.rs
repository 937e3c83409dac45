//! Typed failures for individual probe steps

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    /// The service answered with a status the step does not accept.
    #[error("HTTP {status} for {url}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A document was found but lacks the field we need.
    #[error("field '{field}' missing from {document}")]
    MissingField { document: String, field: String },

    #[error("no OneSignal player registered for external user '{0}'")]
    NoPlayer(String),

    #[error("{0} is not configured. Set it in the config file or run 'chat-probe init'.")]
    Config(&'static str),

    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ProbeError {
    /// Response body of a rejected request, if the server sent one.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            ProbeError::Status { body, .. } if !body.is_empty() => Some(body),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ProbeError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_exposes_body() {
        let err = ProbeError::Status {
            status: 403,
            url: "https://example.test/doc".to_string(),
            body: "{\"error\":\"denied\"}".to_string(),
        };
        assert_eq!(err.status(), Some(403));
        assert_eq!(err.response_body(), Some("{\"error\":\"denied\"}"));
        assert_eq!(err.to_string(), "HTTP 403 for https://example.test/doc");
    }

    #[test]
    fn test_empty_body_is_none() {
        let err = ProbeError::Status {
            status: 500,
            url: "u".to_string(),
            body: String::new(),
        };
        assert!(err.response_body().is_none());
        assert!(ProbeError::NoPlayer("x".into()).status().is_none());
    }
}
