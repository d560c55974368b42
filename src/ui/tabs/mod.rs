//! Tab-specific content rendering.

pub mod create;
pub mod users;
