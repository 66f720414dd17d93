//! The decision envelope returned to the orchestration system.
//!
//! The wire shape is fixed:
//!
//! ```json
//! {
//!   "continue": true,
//!   "status": { "code": 0, "message": "" },
//!   "extensions": { "filesChanged": ["a.txt"] }
//! }
//! ```
//!
//! `extensions` is omitted on failure. `continue` and the status code are
//! coupled: a successful envelope always continues with [`Code::Ok`], a
//! failed one never continues and never carries [`Code::Ok`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Extension key under which the changed-path list is published.
pub const FILES_CHANGED_KEY: &str = "filesChanged";

// ---------------------------------------------------------------------------
// Domain status code
// ---------------------------------------------------------------------------

/// Application-level outcome code, independent of the HTTP status.
///
/// Uses the gRPC canonical code numbering, which is what trigger
/// orchestrators expect in the `status.code` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum Code {
    Ok,
    Cancelled,
    Unknown,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    ResourceExhausted,
    FailedPrecondition,
    Aborted,
    OutOfRange,
    Unimplemented,
    Internal,
    Unavailable,
    DataLoss,
    Unauthenticated,
}

impl Code {
    const ALL: [Code; 17] = [
        Code::Ok,
        Code::Cancelled,
        Code::Unknown,
        Code::InvalidArgument,
        Code::DeadlineExceeded,
        Code::NotFound,
        Code::AlreadyExists,
        Code::PermissionDenied,
        Code::ResourceExhausted,
        Code::FailedPrecondition,
        Code::Aborted,
        Code::OutOfRange,
        Code::Unimplemented,
        Code::Internal,
        Code::Unavailable,
        Code::DataLoss,
        Code::Unauthenticated,
    ];

    /// Returns the numeric wire value.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Returns `true` only for [`Code::Ok`].
    pub fn is_ok(self) -> bool {
        self == Code::Ok
    }
}

impl From<Code> for i32 {
    fn from(code: Code) -> Self {
        code.as_i32()
    }
}

impl TryFrom<i32> for Code {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        usize::try_from(value)
            .ok()
            .and_then(|index| Code::ALL.get(index).copied())
            .ok_or_else(|| format!("unknown status code {value}"))
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Code::Ok => "OK",
            Code::Cancelled => "CANCELLED",
            Code::Unknown => "UNKNOWN",
            Code::InvalidArgument => "INVALID_ARGUMENT",
            Code::DeadlineExceeded => "DEADLINE_EXCEEDED",
            Code::NotFound => "NOT_FOUND",
            Code::AlreadyExists => "ALREADY_EXISTS",
            Code::PermissionDenied => "PERMISSION_DENIED",
            Code::ResourceExhausted => "RESOURCE_EXHAUSTED",
            Code::FailedPrecondition => "FAILED_PRECONDITION",
            Code::Aborted => "ABORTED",
            Code::OutOfRange => "OUT_OF_RANGE",
            Code::Unimplemented => "UNIMPLEMENTED",
            Code::Internal => "INTERNAL",
            Code::Unavailable => "UNAVAILABLE",
            Code::DataLoss => "DATA_LOSS",
            Code::Unauthenticated => "UNAUTHENTICATED",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Outcome code plus a human-readable message (empty on success).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// Outcome class, serialized as its integer value.
    pub code: Code,
    /// Why the event was rejected. Empty when `code` is [`Code::Ok`].
    #[serde(default)]
    pub message: String,
}

/// The response contract of the interceptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionEnvelope {
    /// Whether the orchestrator should proceed with the triggered run.
    #[serde(rename = "continue")]
    pub proceed: bool,
    pub status: Status,
    /// Open extension data. A `BTreeMap` keeps key order, and therefore the
    /// encoded bytes, stable across identical requests.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extensions: BTreeMap<String, serde_json::Value>,
}

impl DecisionEnvelope {
    /// A continuing envelope publishing `files_changed` under [`FILES_CHANGED_KEY`].
    pub fn files_changed(files_changed: Vec<String>) -> Self {
        let mut extensions = BTreeMap::new();
        extensions.insert(
            FILES_CHANGED_KEY.to_string(),
            serde_json::Value::from(files_changed),
        );
        Self {
            proceed: true,
            status: Status {
                code: Code::Ok,
                message: String::new(),
            },
            extensions,
        }
    }

    /// A halting envelope. `code` must not be [`Code::Ok`]; it is coerced to
    /// [`Code::Unknown`] if it is.
    pub fn failure(code: Code, message: impl Into<String>) -> Self {
        let code = if code.is_ok() { Code::Unknown } else { code };
        Self {
            proceed: false,
            status: Status {
                code,
                message: message.into(),
            },
            extensions: BTreeMap::new(),
        }
    }

    /// Reads back the changed-path list, if this envelope carries one.
    pub fn changed_paths(&self) -> Option<Vec<String>> {
        let values = self.extensions.get(FILES_CHANGED_KEY)?.as_array()?;
        values
            .iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect()
    }
}
