//! Error types shared by the HTTP layer

pub mod types;

pub use types::{ApiError, UPSTREAM_FAILURE_MESSAGE};
