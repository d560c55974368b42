//! REST API client module for the remote user service.
//!
//! This module provides the `ApiClient` for communicating with the
//! user directory API: list, create, update, and delete user records.
//!
//! The service is a public demo endpoint: it answers writes with an
//! echo of the request but does not persist them, so callers keep their
//! own local mirror of the list.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
