//! The abstract upload/download surface of the repository under test.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Response, StatusCode};

/// Upload/download contract of the remote repository.
///
/// Implemented by the real HTTP client from `repostress-client` as well as
/// the fault-injecting simulator in [`fake`](crate::fake). An `Err` means
/// the call could not complete at all; an `Ok` response carries the status
/// code and a body which the caller releases by dropping it.
#[async_trait]
pub trait Endpoint: Send + Sync {
    /// Uploads `content` under the given object path.
    async fn upload(&self, path: &str, content: Bytes) -> anyhow::Result<Response>;

    /// Downloads the object stored under the given path.
    async fn download(&self, path: &str) -> anyhow::Result<Response>;
}

#[async_trait]
impl Endpoint for repostress_client::Client {
    async fn upload(&self, path: &str, content: Bytes) -> anyhow::Result<Response> {
        repostress_client::Client::upload(self, path, content).await
    }

    async fn download(&self, path: &str) -> anyhow::Result<Response> {
        repostress_client::Client::download(self, path).await
    }
}

/// Three-way classification of one upload or download attempt.
#[derive(Debug)]
pub enum Outcome {
    /// The endpoint responded with a non-error status.
    Success(StatusCode),
    /// The endpoint responded, but with a client or server error.
    Failed(StatusCode),
    /// The call could not be completed at all.
    Transport(anyhow::Error),
}

impl Outcome {
    /// Classifies a raw endpoint result, releasing the response body.
    pub fn classify(result: anyhow::Result<Response>) -> Self {
        match result {
            Ok(response) => {
                let status = response.status();
                if status.as_u16() >= 400 {
                    Outcome::Failed(status)
                } else {
                    Outcome::Success(status)
                }
            }
            Err(err) => Outcome::Transport(err),
        }
    }

    /// Whether this attempt counts as a success.
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}
