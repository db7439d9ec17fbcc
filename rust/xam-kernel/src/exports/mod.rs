//! Guest-facing XAM exports.
//!
//! Exports take raw guest values (handles and guest addresses, 0 meaning
//! "not supplied") and report outcomes as guest result codes. Host-side
//! failures, such as an unmapped guest pointer, are logged and classified
//! here; they never propagate to the caller as Rust errors.

pub mod enumerate;
pub mod info;
pub mod loader;
pub mod memory;

pub use info::ONLINE_SCHEMA;
pub use loader::DEFAULT_LAUNCH_PATH;
