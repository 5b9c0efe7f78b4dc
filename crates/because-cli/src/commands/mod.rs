//! Command implementations.

pub mod search;
pub mod setup;
