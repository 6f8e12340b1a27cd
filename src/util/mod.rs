//! Shared helpers.

pub mod fs;
pub mod json;
