use std::collections::HashMap;

use xam_common::XStatus;
use xam_memory::GuestAddress;

/// Optional header key of the execution info block (title id, media id, ...).
pub const XEX_HEADER_EXECUTION_INFO: u32 = 0x0004_0006;

/// The running title's executable, as far as XAM exports need to know it.
pub trait ExecutableModule: Send + Sync {
    /// Guest path of the executable, e.g. `game:\default.xex`.
    fn path(&self) -> &str;

    /// Guest address of the optional header `key`, or the failure status the
    /// loader reports for a missing header.
    fn opt_header(&self, key: u32) -> Result<GuestAddress, XStatus>;
}

/// An executable module described by a path and a fixed header table.
#[derive(Debug, Clone, Default)]
pub struct StaticModule {
    path: String,
    headers: HashMap<u32, GuestAddress>,
}

impl StaticModule {
    pub fn new(path: impl Into<String>) -> StaticModule {
        StaticModule {
            path: path.into(),
            headers: HashMap::new(),
        }
    }

    pub fn with_header(mut self, key: u32, address: GuestAddress) -> StaticModule {
        self.headers.insert(key, address);
        self
    }
}

impl ExecutableModule for StaticModule {
    fn path(&self) -> &str {
        &self.path
    }

    fn opt_header(&self, key: u32) -> Result<GuestAddress, XStatus> {
        self.headers.get(&key).copied().ok_or(XStatus::NOT_FOUND)
    }
}

/// Directory part of a guest path (everything before the last `\`).
pub fn base_guest_path(path: &str) -> &str {
    path.rfind('\\').map_or("", |i| &path[..i])
}

/// File name part of a guest path (everything after the last `\`).
pub fn guest_file_name(path: &str) -> &str {
    path.rfind('\\').map_or(path, |i| &path[i + 1..])
}

/// Joins two guest path fragments with a single `\`.
pub fn join_guest_paths(base: &str, name: &str) -> String {
    if base.is_empty() {
        return name.to_string();
    }
    format!(
        "{}\\{}",
        base.trim_end_matches('\\'),
        name.trim_start_matches('\\')
    )
}
