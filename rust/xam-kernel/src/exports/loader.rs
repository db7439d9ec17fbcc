use xam_common::XResult;
use xam_memory::GuestAddress;

use crate::{
    module::{base_guest_path, guest_file_name, join_guest_paths},
    state::KernelState,
};

/// Title launched when the guest asks for an empty path.
pub const DEFAULT_LAUNCH_PATH: &str = "game:\\default.xex";

/// Longest launch path read from guest memory.
const MAX_PATH: usize = 260;

impl KernelState {
    /// `XamLoaderSetLaunchData`: stores `size` bytes from `data_ptr` for the
    /// next title. A size of zero clears the launch data.
    pub fn loader_set_launch_data(&self, data_ptr: GuestAddress, size: u32) -> XResult {
        let data = if size == 0 {
            Vec::new()
        } else {
            match self.memory().read_bytes(data_ptr, size as usize) {
                Ok(data) => data,
                Err(err) => {
                    log::warn!("XamLoaderSetLaunchData: {err}");
                    return XResult::INVALID_PARAMETER;
                }
            }
        };
        let mut loader = self.loader.lock();
        loader.launch_data_present = size != 0;
        loader.launch_data = data;
        XResult::SUCCESS
    }

    /// `XamLoaderGetLaunchDataSize`.
    pub fn loader_get_launch_data_size(&self, size_ptr: GuestAddress) -> XResult {
        if size_ptr == 0 {
            return XResult::INVALID_PARAMETER;
        }
        let (result, size) = {
            let loader = self.loader.lock();
            if loader.launch_data_present {
                (XResult::SUCCESS, loader.launch_data.len() as u32)
            } else {
                (XResult::NOT_FOUND, 0)
            }
        };
        match self.memory().store_u32(size_ptr, size) {
            Ok(()) => result,
            Err(err) => {
                log::warn!("XamLoaderGetLaunchDataSize: {err}");
                XResult::INVALID_PARAMETER
            }
        }
    }

    /// `XamLoaderGetLaunchData`: copies at most `buffer_size` bytes of the
    /// launch data to `buffer_ptr`.
    pub fn loader_get_launch_data(&self, buffer_ptr: GuestAddress, buffer_size: u32) -> XResult {
        let loader = self.loader.lock();
        if !loader.launch_data_present {
            return XResult::NOT_FOUND;
        }
        let len = loader.launch_data.len().min(buffer_size as usize);
        match self.memory().copy_in(buffer_ptr, &loader.launch_data[..len]) {
            Ok(()) => XResult::SUCCESS,
            Err(err) => {
                log::warn!("XamLoaderGetLaunchData: {err}");
                XResult::INVALID_PARAMETER
            }
        }
    }

    /// `XamLoaderLaunchTitle`: records the next title and requests that the
    /// current one terminates.
    ///
    /// A bare file name is resolved relative to the running executable. A null
    /// `name_ptr` means "exit to the dashboard". A name that cannot be read
    /// leaves the previously recorded launch path in place.
    pub fn loader_launch_title(&self, name_ptr: GuestAddress, flags: u32) {
        let launch_path = if name_ptr == 0 {
            log::info!("XamLoaderLaunchTitle: exit to dashboard requested");
            Some(None)
        } else {
            match self.memory().read_c_string(name_ptr, MAX_PATH) {
                Ok(path) => Some(Some(self.resolve_launch_path(&path))),
                Err(err) => {
                    log::warn!(
                        "XamLoaderLaunchTitle: unreadable name {name_ptr:#010X}, \
                         keeping previous launch path: {err}"
                    );
                    None
                }
            }
        };
        {
            let mut loader = self.loader.lock();
            loader.launch_flags = flags;
            if let Some(launch_path) = launch_path {
                loader.launch_path = launch_path;
            }
            log::info!(
                "XamLoaderLaunchTitle: {:?} (flags {flags:#X})",
                loader.launch_path
            );
        }
        self.terminate_title();
    }

    /// `XamLoaderTerminateTitle`.
    pub fn loader_terminate_title(&self) {
        self.terminate_title();
    }

    fn resolve_launch_path(&self, path: &str) -> String {
        if path.is_empty() {
            return DEFAULT_LAUNCH_PATH.to_string();
        }
        match self.executable_module() {
            Some(module) if guest_file_name(path) == path => {
                join_guest_paths(base_guest_path(module.path()), path)
            }
            _ => path.to_string(),
        }
    }
}
