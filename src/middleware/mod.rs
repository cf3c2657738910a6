//! Middleware module
//!
//! Contains HTTP middleware for session authentication, origin checks and
//! request logging.

pub mod auth;
pub mod csrf;
pub mod logging;

// Re-export commonly used items
pub use auth::{require_login, AuthError, Principal, SessionVerifier};
pub use csrf::{verify_origin, OriginCheck};
pub use logging::{log_request, REQUEST_ID_HEADER, TRACE_ID_HEADER};
