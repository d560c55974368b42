//! Local mirror of the remote user list.
//!
//! The mirror is one human-readable JSON array (`users.json`) under the
//! platform cache directory. It is read-through on first load, overwritten
//! on every local mutation, and never expired. Two processes pointed at the
//! same file race and the last save wins; that is a documented limitation,
//! not something this module tries to hide.

pub mod ops;
pub mod store;

pub use store::MirrorStore;
