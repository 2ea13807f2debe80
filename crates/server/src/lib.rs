//! Password grant login with fingerprint-bound bearer sessions.
//!
//! A successful login issues an opaque access token backed by a session record
//! in Redis. Every protected request presents the token, which is checked
//! against the address and user-agent it was issued to and has its expiry
//! pushed back. Logging out deletes the record.

pub mod api;
pub mod authenticator;
pub mod config;
pub mod error;
pub mod response;
pub mod session;
pub mod state;

pub use state::AppState;
