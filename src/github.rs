use crate::error::{Result, StarCountError};
use crate::types::{RepositoryId, RepositoryPayload, StarCount};
use reqwest::header::{HeaderValue, USER_AGENT};
use reqwest::{Client, Response};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

pub const API_BASE_URL: &str = "https://api.github.com";

/// Sent on every request; the API rejects clients that omit a user agent.
pub const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Repository payloads are a few KB; anything past this is treated as unusable.
pub const DEFAULT_MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub api_root: Url,
    pub user_agent: String,
    pub timeout: Option<Duration>,
    pub max_body_bytes: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            api_root: Url::parse(API_BASE_URL).expect("API_BASE_URL is a valid URL"),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Some(Duration::from_secs(30)),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl FetcherConfig {
    /// Points requests at another API-compatible host.
    pub fn with_api_root(mut self, api_root: &str) -> Result<Self> {
        let api_root = Url::parse(api_root)?;
        validate_api_root(&api_root)?;
        self.api_root = api_root;
        Ok(self)
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

/// The request path is appended verbatim, so the root must end in a path.
fn validate_api_root(api_root: &Url) -> Result<()> {
    if api_root.cannot_be_a_base() {
        return Err(StarCountError::Config(format!(
            "API root cannot carry a path: {}",
            api_root
        )));
    }
    if api_root.query().is_some() || api_root.fragment().is_some() {
        return Err(StarCountError::Config(format!(
            "API root must not have a query or fragment: {}",
            api_root
        )));
    }
    Ok(())
}

/// Looks up the star count of a single repository.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct StarCountFetcher {
    client: Client,
    api_root: String,
    user_agent: HeaderValue,
    max_body_bytes: usize,
}

impl StarCountFetcher {
    pub fn new(config: FetcherConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Self::with_client(client, config)
    }

    /// Uses a caller-supplied client. The config's timeout is ignored; the
    /// client's own settings apply.
    pub fn with_client(client: Client, config: FetcherConfig) -> Result<Self> {
        if config.user_agent.trim().is_empty() {
            return Err(StarCountError::Config("user agent must not be empty".to_string()));
        }
        let user_agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| StarCountError::Config(format!("invalid user agent: {}", e)))?;
        validate_api_root(&config.api_root)?;

        Ok(StarCountFetcher {
            client,
            api_root: config.api_root.as_str().trim_end_matches('/').to_string(),
            user_agent,
            max_body_bytes: config.max_body_bytes,
        })
    }

    pub async fn fetch_repository(
        &self,
        repo: &RepositoryId,
        cancel: &CancellationToken,
    ) -> Result<StarCount> {
        self.fetch(&repo.owner, &repo.name, cancel).await
    }

    /// Fetch the star count for `owner/name`.
    ///
    /// A non-success status or an unusable body yields `Ok(StarCount::NotFound)`.
    /// Transport failures come back as `StarCountError::Network` and a fired
    /// token as `StarCountError::Cancelled`; neither is folded into `NotFound`.
    pub async fn fetch(
        &self,
        owner: &str,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<StarCount> {
        if cancel.is_cancelled() {
            return Err(StarCountError::Cancelled);
        }

        let url = format!("{}/repos/{}/{}", self.api_root, owner, name);
        debug!(%url, "Requesting repository");

        let request = self
            .client
            .get(&url)
            .header(USER_AGENT, self.user_agent.clone())
            .send();

        // send() resolves once headers are in; the body is still unread.
        let response = tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                debug!(%url, "Cancelled while waiting for response headers");
                return Err(StarCountError::Cancelled);
            }
            response = request => response?,
        };

        let status = response.status();
        debug!(%url, %status, "Received response headers");

        if status.is_success() {
            let body = read_body(response, cancel, self.max_body_bytes).await?;
            if let Some(body) = body {
                match serde_json::from_slice::<RepositoryPayload>(&body) {
                    Ok(payload) => {
                        info!(
                            "Repository {}/{} has {} stargazers",
                            owner, name, payload.stargazers_count
                        );
                        return Ok(StarCount::Found(payload.stargazers_count));
                    }
                    Err(e) => {
                        debug!(%url, error = %e, "Unusable repository payload");
                    }
                }
            }
        }

        warn!("Failed to get stargazers count for repository {}/{}", owner, name);
        Ok(StarCount::NotFound)
    }
}

/// Drains the body chunk by chunk, racing each read against the token.
///
/// Returns `Ok(None)` once the body grows past `limit` bytes.
async fn read_body(
    mut response: Response,
    cancel: &CancellationToken,
    limit: usize,
) -> Result<Option<Vec<u8>>> {
    let mut body = Vec::new();
    loop {
        let chunk = tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                debug!("Cancelled while reading response body");
                return Err(StarCountError::Cancelled);
            }
            chunk = response.chunk() => chunk?,
        };

        match chunk {
            Some(bytes) if body.len() + bytes.len() > limit => {
                debug!(limit, "Response body exceeds size limit");
                return Ok(None);
            }
            Some(bytes) => body.extend_from_slice(&bytes),
            None => return Ok(Some(body)),
        }
    }
}
