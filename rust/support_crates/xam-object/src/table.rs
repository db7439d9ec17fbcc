use std::{collections::HashMap, sync::Arc};

use parking_lot::RwLock;

use crate::{Handle, ObjectDirectory};

/// First handle value issued by a table.
pub const HANDLE_BASE: u32 = 0xF800_0000;

/// Distance between consecutive handle values. The low two bits of a handle
/// are never set.
pub const HANDLE_STRIDE: u32 = 4;

/// The standard [`ObjectDirectory`]: a lock-protected map from handle to object.
///
/// Handles are issued in increasing order starting at [`HANDLE_BASE`] and are
/// never reused for the lifetime of the table, so a stale handle can only
/// resolve to nothing, never to an unrelated object.
pub struct ObjectTable<T: ?Sized> {
    inner: RwLock<TableState<T>>,
}

struct TableState<T: ?Sized> {
    objects: HashMap<Handle, Arc<T>>,
    next: Option<u32>,
}

impl<T: ?Sized> ObjectTable<T> {
    pub fn new() -> ObjectTable<T> {
        ObjectTable {
            inner: RwLock::new(TableState {
                objects: HashMap::new(),
                next: Some(HANDLE_BASE),
            }),
        }
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.inner.read().objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the handles of all live objects, in issue order.
    pub fn handles(&self) -> Vec<Handle> {
        let mut handles = self.inner.read().objects.keys().copied().collect::<Vec<_>>();
        handles.sort_unstable();
        handles
    }
}

impl<T: ?Sized> Default for ObjectTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ObjectDirectory<T> for ObjectTable<T>
where
    T: ?Sized + Send + Sync,
{
    fn resolve(&self, handle: Handle) -> Option<Arc<T>> {
        self.inner.read().objects.get(&handle).cloned()
    }

    fn register(&self, object: Arc<T>) -> Option<Handle> {
        let mut state = self.inner.write();
        let raw = state.next?;
        state.next = raw.checked_add(HANDLE_STRIDE);
        let handle = Handle::from_raw(raw);
        state.objects.insert(handle, object);
        log::trace!("registered object {handle}");
        Some(handle)
    }

    fn release(&self, handle: Handle) -> bool {
        let released = self.inner.write().objects.remove(&handle).is_some();
        if released {
            log::trace!("released object {handle}");
        }
        released
    }
}

impl<T: ?Sized> std::fmt::Debug for ObjectTable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectTable")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}
