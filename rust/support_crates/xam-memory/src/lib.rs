//! Guest memory:
//! - `GuestMemory`: a flat, bounds-checked guest address space with big-endian
//!   load/store helpers.
//! - `SystemHeap`: a first-fit allocator handing out zero-filled blocks from a
//!   range of guest memory.

pub mod guest;
pub mod heap;

pub use guest::GuestMemory;
pub use heap::SystemHeap;

/// Guest addresses are 32 bits wide; 0 is reserved as the null pointer.
pub type GuestAddress = u32;
