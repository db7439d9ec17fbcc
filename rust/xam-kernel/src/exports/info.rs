use xam_common::XStatus;
use xam_memory::GuestAddress;

use crate::{module::XEX_HEADER_EXECUTION_INFO, state::KernelState};

/// Placeholder online schema handed to titles that ask for one.
pub const ONLINE_SCHEMA: [u8; 44] = [
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x2C, 0x00, 0x00, 0x00, 0x2C, 0x00, 0x00, 0x00, 0x2C, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00,
    0x00, 0x2C, 0x00, 0x00, 0x00, 0x00, 0x00, 0x2C, 0x00, 0x00, 0x00, 0x00, 0x00, 0x18,
];

impl KernelState {
    /// `XamGetExecutionId`: stores the guest address of the running title's
    /// execution info block at `info_ptr`.
    pub fn xam_get_execution_id(&self, info_ptr: GuestAddress) -> XStatus {
        let Some(module) = self.executable_module() else {
            log::warn!("XamGetExecutionId: no executable module");
            return XStatus::NOT_FOUND;
        };
        let header = match module.opt_header(XEX_HEADER_EXECUTION_INFO) {
            Ok(header) => header,
            Err(status) => return status,
        };
        match self.memory().store_u32(info_ptr, header) {
            Ok(()) => XStatus::SUCCESS,
            Err(err) => {
                log::warn!("XamGetExecutionId: {err}");
                XStatus::INVALID_PARAMETER
            }
        }
    }

    /// `XamGetOnlineSchema`: returns the address of a `{ schema_ptr, size }`
    /// pair followed by the schema bytes.
    ///
    /// The block is allocated from the system heap on first use and shared by
    /// all later calls. Returns 0 if it cannot be allocated.
    pub fn xam_get_online_schema(&self) -> GuestAddress {
        let mut schema = self.online_schema.lock();
        if let Some(address) = *schema {
            return address;
        }
        let size = 8 + ONLINE_SCHEMA.len() as u32;
        let address = match self.heap().alloc(size) {
            Ok(address) => address,
            Err(err) => {
                log::error!("XamGetOnlineSchema: {err}");
                return 0;
            }
        };
        let written = self
            .memory()
            .copy_in(address + 8, &ONLINE_SCHEMA)
            .and_then(|_| self.memory().store_u32(address, address + 8))
            .and_then(|_| self.memory().store_u32(address + 4, ONLINE_SCHEMA.len() as u32));
        if let Err(err) = written {
            log::error!("XamGetOnlineSchema: {err}");
            if let Err(err) = self.heap().free(address) {
                log::error!("XamGetOnlineSchema: {err}");
            }
            return 0;
        }
        *schema = Some(address);
        address
    }
}
