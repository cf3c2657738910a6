//! API endpoint handlers module
//!
//! Contains all HTTP endpoint handler implementations.

pub mod ai;
pub mod health;
pub mod index;
