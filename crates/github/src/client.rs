use std::time::Duration;

use async_trait::async_trait;
use interceptor::{
    ChangedFile, CommitComparer, CommitComparison, CommitRef, ComparisonError, RepositoryName,
};
use reqwest::{header::ACCEPT, Client, Url};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// `User-Agent` sent with every request; GitHub rejects requests without one.
pub const USER_AGENT: &str = concat!("files-changed-interceptor/", env!("CARGO_PKG_VERSION"));

const GITHUB_V3_MEDIA_TYPE: &str = "application/vnd.github.v3+json";

/// Upper bound on how much of an error response body ends up in a message.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Reasons a [`GithubClient`] cannot be constructed.
#[derive(Debug, Error)]
pub enum ClientBuildError {
    /// The underlying HTTP client could not be built (e.g. TLS init failed).
    #[error("failed to build GitHub HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    /// The base URL cannot have path segments appended (e.g. `mailto:`).
    #[error("GitHub base URL cannot carry a path: {0}")]
    UnsupportedBaseUrl(Url),
}

/// Compares commits through the GitHub REST API.
///
/// Holds one pooled [`Client`] and a fixed base URL; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: Client,
    base_url: Url,
}

impl GithubClient {
    /// Creates a client for the API rooted at `base_url`.
    ///
    /// `timeout` bounds each whole request. `None` leaves requests unbounded.
    pub fn new(base_url: Url, timeout: Option<Duration>) -> Result<Self, ClientBuildError> {
        if base_url.cannot_be_a_base() {
            return Err(ClientBuildError::UnsupportedBaseUrl(base_url));
        }
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url,
        })
    }

    /// `{base}/repos/{owner}/{repo}/compare/{base}...{head}`, each segment
    /// percent-encoded.
    fn compare_endpoint(
        &self,
        repository: &RepositoryName,
        base: &CommitRef,
        head: &CommitRef,
    ) -> Result<Url, ComparisonError> {
        let mut endpoint = self.base_url.clone();
        endpoint
            .path_segments_mut()
            .map_err(|()| {
                ComparisonError::Transport(format!("base URL {} cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend([
                "repos",
                repository.owner(),
                repository.name(),
                "compare",
                &format!("{base}...{head}"),
            ]);
        Ok(endpoint)
    }
}

#[async_trait]
impl CommitComparer for GithubClient {
    async fn compare(
        &self,
        repository: &RepositoryName,
        base: &CommitRef,
        head: &CommitRef,
    ) -> Result<CommitComparison, ComparisonError> {
        let endpoint = self.compare_endpoint(repository, base, head)?;
        debug!(%endpoint, "comparing commits");

        let response = self
            .http
            .get(endpoint.clone())
            .header(ACCEPT, GITHUB_V3_MEDIA_TYPE)
            .send()
            .await
            .map_err(|err| ComparisonError::Transport(format!("GET {endpoint}: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(ComparisonError::Status {
                status: status.as_u16(),
                body: truncate(body.trim(), MAX_ERROR_BODY_CHARS),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| ComparisonError::Transport(format!("read response body: {err}")))?;
        let payload: CompareResponse = serde_json::from_slice(&bytes)
            .map_err(|err| ComparisonError::Payload(err.to_string()))?;

        debug!(files = payload.files.as_ref().map_or(0, Vec::len), "comparison received");
        Ok(payload.into())
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}

// GitHub's comparison object, reduced to the fields the interceptor reads.
// `files` may be absent or `null`; both mean nothing changed.

#[derive(Deserialize)]
struct CompareResponse {
    #[serde(default)]
    files: Option<Vec<CompareFile>>,
}

#[derive(Deserialize)]
struct CompareFile {
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    previous_filename: Option<String>,
}

impl From<CompareResponse> for CommitComparison {
    fn from(response: CompareResponse) -> Self {
        Self {
            files: response
                .files
                .unwrap_or_default()
                .into_iter()
                .map(|file| ChangedFile {
                    filename: file.filename,
                    previous_filename: file.previous_filename,
                })
                .collect(),
        }
    }
}
