use std::sync::Arc;

use xam_common::{XResult, XStatus};
use xam_kernel::{
    KernelConfig, KernelState, StaticModule, XEX_HEADER_EXECUTION_INFO,
    exports::{DEFAULT_LAUNCH_PATH, ONLINE_SCHEMA},
};

fn kernel() -> KernelState {
    KernelState::new(KernelConfig {
        guest_base: 0x2000_0000,
        memory_size: 0x4000,
        system_heap_size: 0x1000,
    })
    .unwrap()
}

fn kernel_running(path: &str) -> KernelState {
    kernel().with_executable_module(Arc::new(
        StaticModule::new(path).with_header(XEX_HEADER_EXECUTION_INFO, 0x2000_3F00),
    ))
}

fn guest_string(state: &KernelState, s: &str) -> u32 {
    let address = state.heap().alloc(s.len() as u32 + 1).unwrap();
    state.memory().copy_in(address, s.as_bytes()).unwrap();
    address
}

#[test]
fn test_launch_data_round_trip() {
    let state = kernel();
    let size_ptr = state.heap().alloc(4).unwrap();
    assert_eq!(state.loader_get_launch_data_size(size_ptr), XResult::NOT_FOUND);
    assert_eq!(state.memory().load_u32(size_ptr).unwrap(), 0);

    let data = state.heap().alloc(6).unwrap();
    state.memory().copy_in(data, b"resume").unwrap();
    assert_eq!(state.loader_set_launch_data(data, 6), XResult::SUCCESS);
    assert_eq!(state.loader_get_launch_data_size(size_ptr), XResult::SUCCESS);
    assert_eq!(state.memory().load_u32(size_ptr).unwrap(), 6);

    // Truncated to the caller's buffer.
    let out = state.heap().alloc(8).unwrap();
    assert_eq!(state.loader_get_launch_data(out, 3), XResult::SUCCESS);
    assert_eq!(state.memory().read_bytes(out, 8).unwrap(), b"res\0\0\0\0\0");

    assert_eq!(state.loader_set_launch_data(0, 0), XResult::SUCCESS);
    assert_eq!(state.loader_get_launch_data(out, 8), XResult::NOT_FOUND);
    assert_eq!(state.loader_get_launch_data_size(0), XResult::INVALID_PARAMETER);
}

#[test]
fn test_launch_title_resolves_bare_names() {
    let state = kernel_running("game:\\bin\\default.xex");
    let name = guest_string(&state, "next.xex");
    state.loader_launch_title(name, 3);
    let loader = state.loader_data();
    assert_eq!(loader.launch_path.as_deref(), Some("game:\\bin\\next.xex"));
    assert_eq!(loader.launch_flags, 3);
    assert!(state.is_terminate_requested());
}

#[test]
fn test_launch_title_keeps_full_paths() {
    let state = kernel_running("game:\\default.xex");
    let name = guest_string(&state, "dvd:\\other\\title.xex");
    state.loader_launch_title(name, 0);
    assert_eq!(
        state.loader_data().launch_path.as_deref(),
        Some("dvd:\\other\\title.xex")
    );
}

#[test]
fn test_launch_title_empty_and_dashboard() {
    let state = kernel_running("game:\\default.xex");
    let name = guest_string(&state, "");
    state.loader_launch_title(name, 0);
    assert_eq!(
        state.loader_data().launch_path.as_deref(),
        Some(DEFAULT_LAUNCH_PATH)
    );

    let state = kernel();
    assert!(!state.is_terminate_requested());
    state.loader_launch_title(0, 0);
    assert_eq!(state.loader_data().launch_path, None);
    assert!(state.is_terminate_requested());
}

#[test]
fn test_launch_title_unreadable_name_keeps_path() {
    let state = kernel_running("game:\\bin\\default.xex");
    let name = guest_string(&state, "next.xex");
    state.loader_launch_title(name, 1);

    state.loader_launch_title(0x1000_0000, 2);
    let loader = state.loader_data();
    assert_eq!(loader.launch_path.as_deref(), Some("game:\\bin\\next.xex"));
    assert_eq!(loader.launch_flags, 2);
    assert!(state.is_terminate_requested());
}

#[test]
fn test_terminate_title() {
    let state = kernel();
    state.loader_terminate_title();
    assert!(state.is_terminate_requested());
}

#[test]
fn test_alloc_and_free() {
    let state = kernel();
    let out = state.heap().alloc(4).unwrap();
    let available = state.heap().available();

    assert_eq!(state.xam_alloc(0, 100, out), XResult::SUCCESS);
    let block = state.memory().load_u32(out).unwrap();
    assert_ne!(block, 0);
    assert!(state.heap().available() < available);
    assert_eq!(state.memory().read_bytes(block, 100).unwrap(), vec![0; 100]);

    assert_eq!(state.xam_free(block), XResult::SUCCESS);
    assert_eq!(state.heap().available(), available);
}

#[test]
fn test_free_never_fails() {
    let state = kernel();
    let block = state.heap().alloc(16).unwrap();
    let available = state.heap().available();
    assert_eq!(state.xam_free(0), XResult::SUCCESS);
    assert_eq!(state.xam_free(block + 4), XResult::SUCCESS);
    assert_eq!(state.heap().available(), available);

    assert_eq!(state.xam_free(block), XResult::SUCCESS);
    let after_free = state.heap().available();
    assert_eq!(state.xam_free(block), XResult::SUCCESS);
    assert_eq!(state.heap().available(), after_free);
}

#[test]
fn test_alloc_exhaustion() {
    let state = kernel();
    let out = state.heap().alloc(4).unwrap();
    state.memory().store_u32(out, 0xDEAD).unwrap();
    assert_eq!(state.xam_alloc(0, 0x2000, out), XResult::NOT_ENOUGH_MEMORY);
    assert_eq!(state.memory().load_u32(out).unwrap(), 0);
    assert_eq!(state.xam_alloc(0, 4, 0), XResult::INVALID_PARAMETER);
}

#[test]
fn test_execution_id() {
    let state = kernel_running("game:\\default.xex");
    let info_ptr = state.heap().alloc(4).unwrap();
    assert_eq!(state.xam_get_execution_id(info_ptr), XStatus::SUCCESS);
    assert_eq!(state.memory().load_u32(info_ptr).unwrap(), 0x2000_3F00);
    assert_eq!(state.xam_get_execution_id(0), XStatus::INVALID_PARAMETER);

    let state = kernel_running("game:\\default.xex")
        .with_executable_module(Arc::new(StaticModule::new("game:\\default.xex")));
    assert_eq!(state.xam_get_execution_id(info_ptr), XStatus::NOT_FOUND);

    assert_eq!(kernel().xam_get_execution_id(info_ptr), XStatus::NOT_FOUND);
}

#[test]
fn test_online_schema_is_cached() {
    let state = kernel();
    let address = state.xam_get_online_schema();
    assert_ne!(address, 0);
    assert_eq!(state.xam_get_online_schema(), address);

    let schema_ptr = state.memory().load_u32(address).unwrap();
    assert_eq!(schema_ptr, address + 8);
    assert_eq!(
        state.memory().load_u32(address + 4).unwrap(),
        ONLINE_SCHEMA.len() as u32
    );
    assert_eq!(
        state
            .memory()
            .read_bytes(schema_ptr, ONLINE_SCHEMA.len())
            .unwrap(),
        ONLINE_SCHEMA
    );
}
