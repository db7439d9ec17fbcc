//! XAM kernel state and exports.
//!
//! [`KernelState`] owns guest memory, the system heap and the enumeration
//! handle directory, and implements the XAM exports that operate on them:
//! enumeration (`XamEnumerate`), loader launch data, heap allocation and a few
//! title information queries.

pub mod config;
pub mod exports;
pub mod module;
pub mod overlapped;
pub mod state;

pub use config::KernelConfig;
pub use module::{ExecutableModule, StaticModule, XEX_HEADER_EXECUTION_INFO};
pub use state::{KernelState, LoaderData};
