//! Core definitions shared by all xam-* crates: host-side errors and the
//! guest-visible result codes.

pub mod error;
pub mod result;
pub mod status;

pub use result::Result;
pub use status::{XResult, XStatus};
