use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use parking_lot::Mutex;
use xam_common::Result;
use xam_enumerator::Enumerator;
use xam_memory::{GuestAddress, GuestMemory, SystemHeap};
use xam_object::{Handle, ObjectDirectory, ObjectTable};

use crate::{config::KernelConfig, module::ExecutableModule};

/// Launch state shared between a title and the title it launches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoaderData {
    pub launch_data_present: bool,
    pub launch_data: Vec<u8>,
    pub launch_flags: u32,
    /// Title to run next; `None` means return to the dashboard.
    pub launch_path: Option<String>,
}

/// Everything the XAM exports operate on.
pub struct KernelState {
    config: KernelConfig,
    memory: Arc<GuestMemory>,
    heap: SystemHeap,
    enumerators: ObjectTable<dyn Enumerator>,
    executable: Option<Arc<dyn ExecutableModule>>,
    pub(crate) loader: Mutex<LoaderData>,
    pub(crate) online_schema: Mutex<Option<GuestAddress>>,
    terminate_requested: AtomicBool,
}

impl KernelState {
    /// Maps guest memory and sets up the system heap as described by `config`.
    pub fn new(config: KernelConfig) -> Result<KernelState> {
        config.validate()?;
        let memory = Arc::new(GuestMemory::new(config.guest_base, config.memory_size)?);
        let heap = SystemHeap::new(memory.clone(), config.guest_base, config.system_heap_size)?;
        log::debug!("kernel state: {memory:?}, {heap:?}");
        Ok(KernelState {
            config,
            memory,
            heap,
            enumerators: ObjectTable::new(),
            executable: None,
            loader: Mutex::new(LoaderData::default()),
            online_schema: Mutex::new(None),
            terminate_requested: AtomicBool::new(false),
        })
    }

    pub fn with_executable_module(mut self, module: Arc<dyn ExecutableModule>) -> KernelState {
        self.executable = Some(module);
        self
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn memory(&self) -> &GuestMemory {
        &self.memory
    }

    pub fn heap(&self) -> &SystemHeap {
        &self.heap
    }

    pub fn executable_module(&self) -> Option<&Arc<dyn ExecutableModule>> {
        self.executable.as_ref()
    }

    /// The directory enumeration handles are resolved through.
    pub fn enumerators(&self) -> &ObjectTable<dyn Enumerator> {
        &self.enumerators
    }

    /// Hands an enumerator to the kernel and returns the guest handle for it.
    pub fn register_enumerator(&self, enumerator: Arc<dyn Enumerator>) -> Option<Handle> {
        let handle = self.enumerators.register(enumerator)?;
        log::debug!("registered enumerator {handle}");
        Some(handle)
    }

    /// Closes an enumeration handle. Returns `false` if it was not open.
    pub fn release_handle(&self, handle: Handle) -> bool {
        self.enumerators.release(handle)
    }

    pub fn loader_data(&self) -> LoaderData {
        self.loader.lock().clone()
    }

    /// Asks the host to stop the running title.
    pub fn terminate_title(&self) {
        log::info!("title termination requested");
        self.terminate_requested.store(true, Ordering::Release);
    }

    pub fn is_terminate_requested(&self) -> bool {
        self.terminate_requested.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for KernelState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KernelState")
            .field("memory", &self.memory)
            .field("heap", &self.heap)
            .field("enumerators", &self.enumerators)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use xam_testkit::numbered_enumerator;

    use super::*;

    fn small_config() -> KernelConfig {
        KernelConfig {
            guest_base: 0x1000_0000,
            memory_size: 0x10000,
            system_heap_size: 0x8000,
        }
    }

    #[test]
    fn test_new_maps_memory_and_heap() {
        let state = KernelState::new(small_config()).unwrap();
        assert_eq!(state.memory().base(), 0x1000_0000);
        assert_eq!(state.memory().size(), 0x10000);
        assert_eq!(state.heap().base(), 0x1000_0000);
        assert_eq!(state.heap().size(), 0x8000);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = KernelConfig {
            guest_base: 0,
            ..small_config()
        };
        assert!(KernelState::new(config).is_err());
    }

    #[test]
    fn test_register_and_release() {
        let state = KernelState::new(small_config()).unwrap();
        let handle = state
            .register_enumerator(Arc::new(numbered_enumerator(8, 1, 2).unwrap()))
            .unwrap();
        assert!(state.enumerators().resolve(handle).is_some());
        assert!(state.release_handle(handle));
        assert!(!state.release_handle(handle));
    }

    #[test]
    fn test_terminate_flag() {
        let state = KernelState::new(small_config()).unwrap();
        assert!(!state.is_terminate_requested());
        state.terminate_title();
        assert!(state.is_terminate_requested());
    }
}
