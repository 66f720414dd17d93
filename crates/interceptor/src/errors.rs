//! Error types for the interceptor domain.
//!
//! Three layers, innermost first:
//!
//! - [`ComparisonError`] is what a [`crate::CommitComparer`] implementation
//!   reports about its single upstream call.
//! - [`LookupError`] adds the repository-name check that precedes the call and
//!   the context of which comparison failed.
//! - [`InterceptError`] is the request-level failure the handler converts into
//!   a failed [`crate::DecisionEnvelope`]. It carries its own HTTP status and
//!   domain [`Code`] classification.

use thiserror::Error;

use crate::{Code, CommitRef, RepositoryName};

// ---------------------------------------------------------------------------
// Port-level errors
// ---------------------------------------------------------------------------

/// Failure of one upstream comparison call.
///
/// None of these are retried by the interceptor.
#[derive(Debug, Error)]
pub enum ComparisonError {
    /// The request never produced a response (DNS, connect, TLS, timeout).
    #[error("request failed: {0}")]
    Transport(String),

    /// The upstream answered with a non-success status.
    #[error("upstream responded with {status}: {body}")]
    Status {
        /// HTTP status code of the upstream response.
        status: u16,
        /// Response body text, possibly truncated.
        body: String,
    },

    /// The upstream answered successfully but the body was not a comparison.
    #[error("malformed comparison payload: {0}")]
    Payload(String),
}

// ---------------------------------------------------------------------------
// Lookup errors
// ---------------------------------------------------------------------------

/// Failure to resolve the changed files of a push.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The repository full name is not `<owner>/<repo>`.
    #[error("repo name not in format <owner>/<repo>: {0}")]
    MalformedRepository(String),

    /// The comparison itself failed.
    #[error("compare {repository} {base} to {head}: {source}")]
    Compare {
        /// Repository the comparison ran against.
        repository: RepositoryName,
        /// The push's `before` commit.
        base: CommitRef,
        /// The push's `after` commit.
        head: CommitRef,
        /// What the comparer reported.
        source: ComparisonError,
    },
}

// ---------------------------------------------------------------------------
// Request-level errors
// ---------------------------------------------------------------------------

/// Every way a single event delivery can fail.
#[derive(Debug, Error)]
pub enum InterceptError {
    /// The request body could not be read in full.
    #[error("{0}")]
    ReadBody(String),

    /// The body is not a push event payload.
    #[error("{0}")]
    DecodeEvent(#[from] serde_json::Error),

    /// The changed files could not be looked up.
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// The success envelope could not be encoded.
    #[error("encode response: {0}")]
    EncodeResponse(String),
}

impl InterceptError {
    /// HTTP status the failure is reported with: 400 for input the caller
    /// sent wrong, 500 for everything on our side of the wire.
    pub fn http_status(&self) -> u16 {
        match self {
            InterceptError::ReadBody(_) | InterceptError::DecodeEvent(_) => 400,
            InterceptError::Lookup(_) | InterceptError::EncodeResponse(_) => 500,
        }
    }

    /// Domain status code embedded in the failed envelope.
    pub fn code(&self) -> Code {
        match self {
            InterceptError::ReadBody(_) | InterceptError::DecodeEvent(_) => Code::InvalidArgument,
            InterceptError::Lookup(_) | InterceptError::EncodeResponse(_) => Code::Unknown,
        }
    }

    /// Returns `true` for failures caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        self.http_status() < 500
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_failures_are_client_errors() {
        let decode = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        for err in [
            InterceptError::ReadBody("connection reset".into()),
            InterceptError::DecodeEvent(decode),
        ] {
            assert_eq!(err.http_status(), 400);
            assert_eq!(err.code(), Code::InvalidArgument);
            assert!(err.is_client_error());
        }
    }

    #[test]
    fn lookup_failures_are_server_errors() {
        let err = InterceptError::from(LookupError::MalformedRepository("repo".into()));
        assert_eq!(err.http_status(), 500);
        assert_eq!(err.code(), Code::Unknown);
        assert_eq!(err.to_string(), "repo name not in format <owner>/<repo>: repo");
    }

    #[test]
    fn compare_failure_message_names_the_comparison() {
        let err = LookupError::Compare {
            repository: RepositoryName::parse("org/repo").unwrap(),
            base: CommitRef::new("a1").unwrap(),
            head: CommitRef::new("b2").unwrap(),
            source: ComparisonError::Status {
                status: 404,
                body: "Not Found".into(),
            },
        };
        assert_eq!(
            err.to_string(),
            "compare org/repo a1 to b2: upstream responded with 404: Not Found"
        );
    }
}
