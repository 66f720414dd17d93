//! Inbound push event payload.
//!
//! GitHub push payloads carry dozens of fields; the interceptor needs exactly
//! three of them. Decoding is strict about those three (a payload missing any
//! of them is rejected) and ignores everything else.

use serde::Deserialize;

use crate::{CommitRef, RepositoryFullName};

/// A branch reference moving from one commit to another.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PushEvent {
    /// Commit the reference pointed at before the push.
    pub before: CommitRef,
    /// Commit the reference points at after the push.
    pub after: CommitRef,
    /// Repository the push happened in.
    pub repository: PushRepository,
}

/// The `repository` object of a push payload, reduced to its full name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PushRepository {
    /// `"owner/name"`.
    pub full_name: RepositoryFullName,
}

impl PushEvent {
    /// Decodes a push event from a raw JSON body.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_the_three_required_fields_and_ignores_the_rest() {
        let body = br#"{
            "ref": "refs/heads/main",
            "before": "beforeRef",
            "after": "afterRef",
            "repository": { "full_name": "org/repo", "private": true },
            "pusher": { "name": "someone" }
        }"#;

        let event = PushEvent::from_slice(body).expect("valid push payload");

        assert_eq!(event.before.as_str(), "beforeRef");
        assert_eq!(event.after.as_str(), "afterRef");
        assert_eq!(event.repository.full_name.as_str(), "org/repo");
    }

    #[test]
    fn rejects_a_payload_without_a_repository() {
        let body = br#"{"before":"a","after":"b"}"#;
        assert!(PushEvent::from_slice(body).is_err());
    }

    #[test]
    fn rejects_non_json() {
        assert!(PushEvent::from_slice(b"not json").is_err());
    }
}
