//! Command implementations for xam-cmd

pub mod drain;
pub mod schema;
