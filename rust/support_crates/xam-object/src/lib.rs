//! Handle-addressed object directory.
//!
//! Guest code never holds host references: it holds an opaque [`Handle`] and
//! every export resolves it through an [`ObjectDirectory`]. The directory owns
//! the objects; callers that resolve a handle get a shared reference that keeps
//! the object alive for the duration of the call, even if the handle is
//! released concurrently.

use std::sync::Arc;

pub mod handle;
pub mod table;

pub use handle::Handle;
pub use table::ObjectTable;

/// Resolves opaque handles to live objects of type `T`.
pub trait ObjectDirectory<T: ?Sized>: Send + Sync {
    /// Looks up the object registered under `handle`.
    ///
    /// Returns `None` for handles that were never issued or have been released.
    fn resolve(&self, handle: Handle) -> Option<Arc<T>>;

    /// Takes ownership of `object` and issues a fresh handle for it.
    ///
    /// Returns `None` once the handle space is exhausted.
    fn register(&self, object: Arc<T>) -> Option<Handle>;

    /// Drops the directory's reference to the object behind `handle`.
    ///
    /// Returns `false` if the handle was not live.
    fn release(&self, handle: Handle) -> bool;
}
