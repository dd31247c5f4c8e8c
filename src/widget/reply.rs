//! Reply Service client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

/// Request body sent to the Reply Service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyRequest {
    pub message: String,
}

/// Decoded Reply Service response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyPayload {
    pub reply: String,
}

/// The reply could not be obtained.
///
/// All variants are handled the same way by the widget.
#[derive(Debug, thiserror::Error)]
pub enum ReplyError {
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("reply service returned status {0}")]
    Status(u16),

    /// The response body was not a `{"reply": ...}` object.
    #[error("undecodable reply: {0}")]
    Decode(#[from] serde_json::Error),

    /// The service call panicked before producing a reply.
    #[error("reply service call panicked")]
    Panicked,
}

/// An endpoint that answers a message with a reply.
#[async_trait]
pub trait ReplyService: Send + Sync + std::fmt::Debug {
    async fn send(&self, message: &str) -> Result<ReplyPayload, ReplyError>;
}

/// Reply Service reached over HTTP: `POST <endpoint>` with a JSON body.
///
/// Keeps cookies between calls so the server can track the conversation.
#[derive(Debug, Clone)]
pub struct HttpReplyClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl HttpReplyClient {
    pub fn new(endpoint: Url) -> Result<Self, ReplyError> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self { http, endpoint })
    }
}

#[async_trait]
impl ReplyService for HttpReplyClient {
    async fn send(&self, message: &str) -> Result<ReplyPayload, ReplyError> {
        let body = ReplyRequest {
            message: message.to_string(),
        };

        let resp = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ReplyError::Status(status.as_u16()));
        }

        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
