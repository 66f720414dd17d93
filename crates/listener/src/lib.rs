//! HTTP event source for the files-changed interceptor.
//!
//! Binds an HTTP server that receives push events from a trigger orchestrator
//! and answers each with a decision envelope produced by
//! [`interceptor::Interceptor`].
//!
//! | Route | Method | Behaviour |
//! |-------|--------|-----------|
//! | `/health` | any | `200`, empty body, never touches the upstream |
//! | `/` (and every other path) | any | event handler |
//!
//! Shutdown is two-phase: once the caller's shutdown future resolves, the
//! server stops accepting connections and in-flight requests get a bounded
//! grace period ([`SHUTDOWN_GRACE`] in production) to finish. Whatever is
//! still running after that is abandoned.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Routing, body reading and the serve loop live here.
//! The [`interceptor`] crate sees only raw body bytes and returns a
//! [`interceptor::Reply`].

mod routes;
mod server;

pub use routes::{router, MAX_EVENT_BYTES};
pub use server::{bind, serve, ListenerError, LISTEN_PORT, SHUTDOWN_GRACE};
