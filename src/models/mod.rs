//! Data models for the users directory.
//!
//! - `User`: one user record with profile fields and optional nested
//!   address/company detail
//! - `UserDraft`: the editable subset backing the create and edit forms
//! - `ValidationError`: per-field client-side validation failures

pub mod user;

pub use user::{Address, Company, Field, Geo, User, UserDraft, UserSortColumn, ValidationError};
