//! Newtype domain identifiers.
//!
//! Every value that names something upstream (a commit, a repository) or
//! correlates activity (a delivery) is a distinct newtype. This prevents
//! accidentally passing, for example, a [`CommitRef`] where a repository
//! owner is expected, even though both are strings under the hood.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: String-backed (Git names)
// ---------------------------------------------------------------------------

string_id! {
    /// A Git commit reference as reported by a push event.
    ///
    /// Usually a 40-character SHA, but anything the upstream compare endpoint
    /// accepts (branch names, tags) is passed through untouched.
    CommitRef
}

string_id! {
    /// The full `"owner/name"` form of a repository, exactly as the push
    /// event carried it. Not validated; see [`RepositoryName::parse`].
    RepositoryFullName
}

// ---------------------------------------------------------------------------
// Repository name: validated owner/name pair
// ---------------------------------------------------------------------------

/// A repository identified by its owner and name.
///
/// Only constructed through [`RepositoryName::parse`], which guarantees both
/// segments are non-empty and that neither contains a `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryName {
    owner: String,
    name: String,
}

impl RepositoryName {
    /// Splits a full name on `/`, requiring exactly two non-empty segments.
    ///
    /// Returns `None` for `"repo"`, `"org/"`, `"/repo"`, `"a/b/c"` and similar.
    pub fn parse(full_name: &str) -> Option<Self> {
        let mut segments = full_name.split('/');
        let owner = segments.next()?;
        let name = segments.next()?;
        if segments.next().is_some() || owner.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    /// The account or organisation that owns the repository.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// The repository name without its owner.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for RepositoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single inbound event delivery (one call of the event handler).
///
/// Generated fresh for every request and recorded on the request's span so all
/// log lines from a single delivery can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeliveryId(Uuid);

impl DeliveryId {
    /// Generates a new random delivery identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for DeliveryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_owner_and_name() {
        let repo = RepositoryName::parse("org/repo").expect("valid name");
        assert_eq!(repo.owner(), "org");
        assert_eq!(repo.name(), "repo");
        assert_eq!(repo.to_string(), "org/repo");
    }

    #[test]
    fn rejects_names_without_exactly_two_segments() {
        for bad in ["", "repo", "org/", "/repo", "/", "org/repo/extra", "a//b"] {
            assert_eq!(RepositoryName::parse(bad), None, "{bad:?} should be rejected");
        }
    }

    #[test]
    fn string_ids_reject_empty_values() {
        assert!(CommitRef::new("").is_none());
        assert_eq!(CommitRef::new("abc123").unwrap().as_str(), "abc123");
    }

    #[test]
    fn delivery_ids_are_unique() {
        assert_ne!(DeliveryId::new_random(), DeliveryId::new_random());
    }
}
