//! Test utilities for the xam workspace.
//!
//! This crate provides:
//! - Synthetic enumerators whose items carry their own index, so a drained
//!   buffer can be checked for order, duplicates and omissions
//! - A recording object directory for asserting how handles were resolved
//!
//! It is intended for use within the workspace's test suites and tools only.

pub mod data_gen;
pub mod directory;

pub use data_gen::{StealingEnumerator, decode_indices, numbered_enumerator, random_split};
pub use directory::RecordingDirectory;
