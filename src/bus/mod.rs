//! In-process notification bus for "user created" events.
//!
//! One `CreationBus` instance is owned by the application root and passed by
//! reference to whatever needs to publish or observe creations. Delivery is
//! synchronous, in registration order, and in-process only.

pub mod creation;

pub use creation::{CreationBus, Subscription};
