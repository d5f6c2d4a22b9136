//! The network boundary: a transport seam plus the reqwest implementation.
//!
//! [`SyncTransport`] is a trait so the queue can be exercised against a
//! scripted transport in tests; [`HttpTransport`] is the production
//! implementation speaking to `POST /api/v1/templates/{id}/operations`.
//!
//! A version conflict and an operation rejection are *outcomes*, not
//! transport errors: the request was delivered and answered. Only
//! failures to get an answer at all (connect errors, 5xx) surface as
//! [`TransportError`] and become retryable.

use async_trait::async_trait;
use serde::Deserialize;

use slate_core::types::{DbId, Version};

use crate::queue::SyncRequest;

/// Server verdict on a delivered batch.
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// Batch applied; the document is now at `version`.
    Saved {
        version: Version,
        applied_ops: Vec<String>,
    },
    /// Optimistic-concurrency check failed; nothing was applied.
    Conflict {
        current: Version,
        requested: Version,
    },
    /// The server rejected the batch (bad target, malformed operation);
    /// retrying the same operations can never succeed.
    Rejected { message: String, details: String },
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected status {status}")]
    UnexpectedStatus { status: u16 },
}

#[async_trait]
pub trait SyncTransport: Send + Sync {
    async fn send(
        &self,
        template_id: DbId,
        request: &SyncRequest,
    ) -> Result<SendOutcome, TransportError>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApplyOkBody {
    template: TemplateVersion,
    #[serde(default)]
    applied_ops: Vec<String>,
}

/// The only field of the returned template the queue needs.
#[derive(Debug, Deserialize)]
struct TemplateVersion {
    version: Version,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConflictBody {
    current_version: Version,
    requested_version: Version,
}

#[derive(Debug, Deserialize)]
struct RejectedBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    details: String,
}

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// `base_url` is the service root, e.g. `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn operations_url(&self, template_id: DbId) -> String {
        format!(
            "{}/api/v1/templates/{template_id}/operations",
            self.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl SyncTransport for HttpTransport {
    async fn send(
        &self,
        template_id: DbId,
        request: &SyncRequest,
    ) -> Result<SendOutcome, TransportError> {
        let response = self
            .client
            .post(self.operations_url(template_id))
            .json(request)
            .send()
            .await?;

        match response.status().as_u16() {
            200 => {
                let body: ApplyOkBody = response.json().await?;
                Ok(SendOutcome::Saved {
                    version: body.template.version,
                    applied_ops: body.applied_ops,
                })
            }
            409 => {
                let body: ConflictBody = response.json().await?;
                Ok(SendOutcome::Conflict {
                    current: body.current_version,
                    requested: body.requested_version,
                })
            }
            400 | 404 => {
                let body: RejectedBody = response.json().await?;
                Ok(SendOutcome::Rejected {
                    message: body.message,
                    details: body.details,
                })
            }
            status => Err(TransportError::UnexpectedStatus { status }),
        }
    }
}
