//! Core domain of the files-changed interceptor.
//!
//! This crate turns a source-control push event into a decision envelope that
//! tells a trigger orchestrator whether to proceed, and which files the push
//! touched. The file list comes from a [`CommitComparer`], a port implemented
//! by infrastructure crates; this crate never talks to the network itself.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`CommitRef`, `RepositoryName`, `DeliveryId`) |
//! | [`event`] | The inbound push event payload |
//! | [`comparison`] | The `CommitComparer` port and its result type |
//! | [`envelope`] | The outbound decision envelope and domain status codes |
//! | [`errors`] | Port, lookup and request-level error types |
//! | [`handler`] | The event handler (`Interceptor`) |

pub mod comparison;
pub mod envelope;
pub mod errors;
pub mod event;
pub mod handler;
pub mod identifiers;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use comparison::{ChangedFile, CommitComparer, CommitComparison};
pub use envelope::{Code, DecisionEnvelope, Status, FILES_CHANGED_KEY};
pub use errors::{ComparisonError, InterceptError, LookupError};
pub use event::{PushEvent, PushRepository};
pub use handler::{lookup_changed_files, Interceptor, Reply};
pub use identifiers::{CommitRef, DeliveryId, RepositoryFullName, RepositoryName};
