use std::sync::Arc;

use parking_lot::Mutex;
use xam_enumerator::Enumerator;
use xam_object::{Handle, ObjectDirectory, ObjectTable};

/// An enumerator directory that records every handle it is asked to resolve.
#[derive(Default)]
pub struct RecordingDirectory {
    table: ObjectTable<dyn Enumerator>,
    resolved: Mutex<Vec<Handle>>,
}

impl RecordingDirectory {
    pub fn new() -> RecordingDirectory {
        Self::default()
    }

    /// Registers `enumerator`, panicking if the handle space is exhausted.
    pub fn insert(&self, enumerator: Arc<dyn Enumerator>) -> Handle {
        self.table
            .register(enumerator)
            .expect("handle space exhausted")
    }

    /// Handles passed to `resolve`, in call order.
    pub fn resolved(&self) -> Vec<Handle> {
        self.resolved.lock().clone()
    }
}

impl ObjectDirectory<dyn Enumerator> for RecordingDirectory {
    fn resolve(&self, handle: Handle) -> Option<Arc<dyn Enumerator>> {
        self.resolved.lock().push(handle);
        self.table.resolve(handle)
    }

    fn register(&self, object: Arc<dyn Enumerator>) -> Option<Handle> {
        self.table.register(object)
    }

    fn release(&self, handle: Handle) -> bool {
        self.table.release(handle)
    }
}
