use reqwest::StatusCode;
use std::error::Error as _;
use thiserror::Error;

/// Every way a call to the backend can fail.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid backend URL `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("request to {url} failed: {}", describe_transport(.source))]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{} {} for url: {url}: {body}", .status.as_u16(), .status.canonical_reason().unwrap_or("Unknown Status"))]
    Status {
        status: StatusCode,
        url: String,
        body: String,
    },

    #[error("malformed response from {url}: {reason}")]
    Malformed { url: String, reason: String },
}

impl ClientError {
    pub fn transport(url: &str, source: reqwest::Error) -> Self {
        ClientError::Transport {
            url: url.to_string(),
            source,
        }
    }

    /// HTTP status of the backend response, if the failure was a non-2xx answer.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Transport { source, .. } if source.is_timeout())
    }
}

// reqwest's own Display stops at the outermost layer ("error sending request"),
// the useful part (connection refused, dns) lives further down the chain.
fn describe_transport(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        return "timed out".to_string();
    }

    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}
