//! Command implementations for the isolated runner CLI

pub mod completions;
pub mod helpers;
pub mod locate;
pub mod resolve;
pub mod version;
