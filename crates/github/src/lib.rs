//! GitHub infrastructure adapter.
//!
//! Implements [`interceptor::CommitComparer`] against the GitHub REST API
//! "compare two commits" endpoint:
//!
//! ```text
//! GET {base_url}/repos/{owner}/{repo}/compare/{base}...{head}
//! ```
//!
//! The base URL is configurable so GitHub Enterprise hosts (`https://host/api/v3/`)
//! and local mocks work the same way as `https://api.github.com/`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules. HTTP
//! transport, status handling and payload decoding live here; the
//! [`interceptor`] crate only sees [`interceptor::CommitComparison`] and
//! [`interceptor::ComparisonError`].

mod client;

pub use client::{ClientBuildError, GithubClient, USER_AGENT};
pub use reqwest::Url;
