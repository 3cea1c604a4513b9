use std::fmt;
use std::sync::Arc;

use anyhow::ensure;
use bytes::Bytes;
use reqwest::Response;

/// Base configuration to connect to an artifact repository.
///
/// The builder has to be given credentials using
/// [`credentials`](Self::credentials) before a [`Client`] can be built.
pub struct ClientBuilder {
    base_url: String,
    user: String,
    token: String,
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("base_url", &self.base_url)
            .field("user", &self.user)
            .field("token", &format_args!("[Token]"))
            .finish()
    }
}

impl ClientBuilder {
    /// Creates a new [`ClientBuilder`] targeting the repository server at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            user: String::new(),
            token: String::new(),
        }
    }

    /// Sets the user and access token used for HTTP basic auth.
    pub fn credentials(mut self, user: impl Into<String>, token: impl Into<String>) -> Self {
        self.user = user.into();
        self.token = token.into();
        self
    }

    /// Validates the configuration and creates the [`Client`].
    pub fn build(self) -> anyhow::Result<Client> {
        ensure!(!self.base_url.is_empty(), "repository URL cannot be empty");
        ensure!(!self.user.is_empty(), "repository user cannot be empty");
        ensure!(!self.token.is_empty(), "repository token cannot be empty");

        Ok(Client {
            http: reqwest::Client::new(),
            base_url: self.base_url.trim_end_matches('/').into(),
            user: self.user.into(),
            token: self.token.into(),
        })
    }
}

/// A client for one artifact repository server.
///
/// Cloning is cheap; all clones share the same connection pool.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: Arc<str>,
    user: Arc<str>,
    token: Arc<str>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("http", &self.http)
            .field("base_url", &self.base_url)
            .field("user", &self.user)
            .field("token", &format_args!("[Token]"))
            .finish()
    }
}

impl Client {
    /// Uploads `content` under the given object path via `PUT`.
    ///
    /// Returns the raw response; a transport-level failure surfaces as `Err`.
    pub async fn upload(&self, path: &str, content: Bytes) -> anyhow::Result<Response> {
        let url = format!("{}/{path}", self.base_url);
        let response = self
            .http
            .put(url)
            .basic_auth(&self.user, Some(&self.token))
            .body(content)
            .send()
            .await?;
        Ok(response)
    }

    /// Fetches the object stored under the given path via `GET`.
    ///
    /// Returns the raw response; a transport-level failure surfaces as `Err`.
    pub async fn download(&self, path: &str) -> anyhow::Result<Response> {
        let url = format!("{}/{path}", self.base_url);
        let response = self
            .http
            .get(url)
            .basic_auth(&self.user, Some(&self.token))
            .send()
            .await?;
        Ok(response)
    }
}
