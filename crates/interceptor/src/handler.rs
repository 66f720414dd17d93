//! The event handler: one push event in, one decision envelope out.
//!
//! [`Interceptor::respond`] never fails. Every error is caught here and
//! turned into a failed [`DecisionEnvelope`] paired with the HTTP status for
//! its failure class, so transports only ever copy a [`Reply`] onto the wire.

use std::sync::Arc;

use tracing::{debug, error, info, warn, Instrument};

use crate::{
    CommitComparer, DecisionEnvelope, DeliveryId, InterceptError, LookupError, PushEvent,
    RepositoryName,
};

/// Body written when even the error envelope cannot be encoded.
const FALLBACK_ERROR_BODY: &[u8] =
    br#"{"continue":false,"status":{"code":2,"message":"failed to encode response"}}"#;

// ---------------------------------------------------------------------------
// Reply
// ---------------------------------------------------------------------------

/// An encoded envelope ready to be written to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// HTTP status code to respond with.
    pub http_status: u16,
    /// JSON-encoded [`DecisionEnvelope`].
    pub body: Vec<u8>,
}

impl Reply {
    /// Content type of every reply body.
    pub const CONTENT_TYPE: &'static str = "application/json";

    /// Encodes the failed envelope for `err`.
    pub fn from_error(err: &InterceptError) -> Self {
        if err.is_client_error() {
            warn!(status = err.http_status(), code = %err.code(), error = %err, "rejecting event");
        } else {
            error!(status = err.http_status(), code = %err.code(), error = %err, "failed to handle event");
        }

        let envelope = DecisionEnvelope::failure(err.code(), err.to_string());
        let body = serde_json::to_vec(&envelope).unwrap_or_else(|encode_err| {
            error!(error = %encode_err, "failed to encode error envelope");
            FALLBACK_ERROR_BODY.to_vec()
        });

        Self {
            http_status: err.http_status(),
            body,
        }
    }
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Resolves the ordered list of paths touched by `event`.
///
/// The repository name is validated here rather than at decode time, so a
/// malformed name surfaces as a lookup failure.
pub async fn lookup_changed_files(
    comparer: &dyn CommitComparer,
    event: &PushEvent,
) -> Result<Vec<String>, LookupError> {
    let full_name = event.repository.full_name.as_str();
    let repository = RepositoryName::parse(full_name)
        .ok_or_else(|| LookupError::MalformedRepository(full_name.to_string()))?;

    let comparison = comparer
        .compare(&repository, &event.before, &event.after)
        .await
        .map_err(|source| LookupError::Compare {
            repository: repository.clone(),
            base: event.before.clone(),
            head: event.after.clone(),
            source,
        })?;

    Ok(comparison.changed_paths())
}

// ---------------------------------------------------------------------------
// Interceptor
// ---------------------------------------------------------------------------

/// Turns push events into decision envelopes using a shared comparer.
///
/// Cheap to clone; all clones share the same comparer.
#[derive(Clone)]
pub struct Interceptor {
    comparer: Arc<dyn CommitComparer>,
}

impl Interceptor {
    /// Creates an interceptor bound to `comparer` for its whole lifetime.
    pub fn new(comparer: Arc<dyn CommitComparer>) -> Self {
        Self { comparer }
    }

    /// Decodes `body`, looks up the changed files and builds the envelope.
    pub async fn intercept(&self, body: &[u8]) -> Result<DecisionEnvelope, InterceptError> {
        debug!(event = %String::from_utf8_lossy(body), "handling event");

        let event = PushEvent::from_slice(body)?;
        info!(
            repository = %event.repository.full_name,
            before = %event.before,
            after = %event.after,
            "decoded push event"
        );

        let files_changed = lookup_changed_files(self.comparer.as_ref(), &event).await?;
        info!(count = files_changed.len(), "files changed");
        debug!(files = ?files_changed, "changed paths");

        Ok(DecisionEnvelope::files_changed(files_changed))
    }

    /// Handles one delivery end to end, producing the bytes to write back.
    pub async fn respond(&self, body: &[u8]) -> Reply {
        async {
            let envelope = match self.intercept(body).await {
                Ok(envelope) => envelope,
                Err(err) => return Reply::from_error(&err),
            };

            match serde_json::to_vec(&envelope) {
                Ok(encoded) => {
                    debug!(response = %String::from_utf8_lossy(&encoded), "responded");
                    Reply {
                        http_status: 200,
                        body: encoded,
                    }
                }
                Err(err) => Reply::from_error(&InterceptError::EncodeResponse(err.to_string())),
            }
        }
        .instrument(delivery_span(body.len()))
        .await
    }

    /// Answers a delivery whose body could not be read at all.
    ///
    /// Logged under its own delivery span, like any other event.
    pub fn reject_unreadable(&self, reason: impl Into<String>) -> Reply {
        let _entered = delivery_span(0).entered();
        Reply::from_error(&InterceptError::ReadBody(reason.into()))
    }
}

fn delivery_span(bytes: usize) -> tracing::Span {
    let delivery = DeliveryId::new_random();
    tracing::info_span!("event", %delivery, bytes)
}

impl std::fmt::Debug for Interceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interceptor").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::{ChangedFile, Code, CommitComparison, CommitRef, ComparisonError};

    /// Records every call and replays a canned outcome.
    struct FakeComparer {
        outcome: fn() -> Result<CommitComparison, ComparisonError>,
        calls: Mutex<Vec<(String, String, String)>>,
    }

    impl FakeComparer {
        fn new(outcome: fn() -> Result<CommitComparison, ComparisonError>) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(String, String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommitComparer for FakeComparer {
        async fn compare(
            &self,
            repository: &RepositoryName,
            base: &CommitRef,
            head: &CommitRef,
        ) -> Result<CommitComparison, ComparisonError> {
            self.calls.lock().unwrap().push((
                repository.to_string(),
                base.to_string(),
                head.to_string(),
            ));
            (self.outcome)()
        }
    }

    fn three_files() -> Result<CommitComparison, ComparisonError> {
        Ok(CommitComparison {
            files: vec![
                ChangedFile {
                    filename: Some("folder/subfolder1/file".into()),
                    previous_filename: None,
                },
                ChangedFile {
                    filename: None,
                    previous_filename: Some("folder/subfolder2/file".into()),
                },
                ChangedFile {
                    filename: Some("folder/subfolder3/file".into()),
                    previous_filename: None,
                },
            ],
        })
    }

    fn not_found() -> Result<CommitComparison, ComparisonError> {
        Err(ComparisonError::Status {
            status: 404,
            body: "Not Found".into(),
        })
    }

    const PUSH: &[u8] =
        br#"{"before":"beforeRef","after":"afterRef","repository":{"full_name":"org/repo"}}"#;

    fn decode(reply: &Reply) -> DecisionEnvelope {
        serde_json::from_slice(&reply.body).expect("reply body is an envelope")
    }

    #[tokio::test]
    async fn reports_changed_files_in_upstream_order() {
        let comparer = FakeComparer::new(three_files);
        let interceptor = Interceptor::new(comparer.clone());

        let reply = interceptor.respond(PUSH).await;
        let envelope = decode(&reply);

        assert_eq!(reply.http_status, 200);
        assert!(envelope.proceed);
        assert_eq!(envelope.status.code, Code::Ok);
        assert_eq!(envelope.status.message, "");
        assert_eq!(
            envelope.changed_paths().unwrap(),
            vec![
                "folder/subfolder1/file",
                "folder/subfolder2/file",
                "folder/subfolder3/file",
            ]
        );
        assert_eq!(
            comparer.calls(),
            vec![(
                "org/repo".to_string(),
                "beforeRef".to_string(),
                "afterRef".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn invalid_json_is_a_client_error() {
        let comparer = FakeComparer::new(three_files);
        let interceptor = Interceptor::new(comparer.clone());

        let reply = interceptor.respond(b"{not json").await;
        let envelope = decode(&reply);

        assert_eq!(reply.http_status, 400);
        assert!(!envelope.proceed);
        assert_eq!(envelope.status.code, Code::InvalidArgument);
        assert!(!envelope.status.message.is_empty());
        assert!(envelope.extensions.is_empty());
        assert!(comparer.calls().is_empty());
    }

    #[tokio::test]
    async fn malformed_repository_fails_as_a_lookup() {
        let comparer = FakeComparer::new(three_files);
        let interceptor = Interceptor::new(comparer.clone());
        let body = br#"{"before":"a","after":"b","repository":{"full_name":"no-slash"}}"#;

        let reply = interceptor.respond(body).await;
        let envelope = decode(&reply);

        assert_eq!(reply.http_status, 500);
        assert!(!envelope.proceed);
        assert_eq!(envelope.status.code, Code::Unknown);
        assert!(envelope.status.message.contains("no-slash"));
        assert!(comparer.calls().is_empty());
    }

    #[tokio::test]
    async fn upstream_failure_is_a_server_error() {
        let interceptor = Interceptor::new(FakeComparer::new(not_found));

        let reply = interceptor.respond(PUSH).await;
        let envelope = decode(&reply);

        assert_eq!(reply.http_status, 500);
        assert!(!envelope.proceed);
        assert_eq!(envelope.status.code, Code::Unknown);
        assert_eq!(
            envelope.status.message,
            "compare org/repo beforeRef to afterRef: upstream responded with 404: Not Found"
        );
    }

    #[tokio::test]
    async fn identical_events_produce_identical_bytes() {
        let interceptor = Interceptor::new(FakeComparer::new(three_files));

        let first = interceptor.respond(PUSH).await;
        let second = interceptor.respond(PUSH).await;

        assert_eq!(first, second);
    }

    #[test]
    fn read_failures_become_invalid_argument_replies() {
        let reply = Reply::from_error(&InterceptError::ReadBody("length limit exceeded".into()));
        let envelope = decode(&reply);

        assert_eq!(reply.http_status, 400);
        assert_eq!(envelope.status.code, Code::InvalidArgument);
        assert_eq!(envelope.status.message, "length limit exceeded");
    }

    #[test]
    fn unreadable_bodies_are_rejected_without_a_lookup() {
        let comparer = FakeComparer::new(three_files);
        let interceptor = Interceptor::new(comparer.clone());

        let reply = interceptor.reject_unreadable("length limit exceeded");
        let envelope = decode(&reply);

        assert_eq!(reply.http_status, 400);
        assert!(!envelope.proceed);
        assert_eq!(envelope.status.code, Code::InvalidArgument);
        assert_eq!(envelope.status.message, "length limit exceeded");
        assert!(comparer.calls().is_empty());
    }
}
