//! Guest-visible result codes.
//!
//! XAM exports report outcomes in two vocabularies: Win32-style error codes
//! (`X_ERROR_*`, modeled by [`XResult`]) and NT-style status codes
//! (`X_STATUS_*`, modeled by [`XStatus`]). Both are plain 32-bit values as far
//! as the guest is concerned, so they are kept as transparent newtypes rather
//! than closed enums: a guest may observe any value an export hands back.

use std::fmt;

/// Facility code used by `HRESULT_FROM_WIN32`.
const FACILITY_WIN32: u32 = 7;

/// A Win32-style result code as returned by XAM exports.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct XResult(pub u32);

impl XResult {
    pub const SUCCESS: XResult = XResult(0);
    pub const INVALID_HANDLE: XResult = XResult(0x0000_0006);
    pub const NOT_ENOUGH_MEMORY: XResult = XResult(0x0000_0008);
    pub const NO_MORE_FILES: XResult = XResult(0x0000_0012);
    pub const INVALID_PARAMETER: XResult = XResult(0x0000_0057);
    pub const INSUFFICIENT_BUFFER: XResult = XResult(0x0000_007A);
    pub const IO_PENDING: XResult = XResult(0x0000_03E5);
    pub const NOT_FOUND: XResult = XResult(0x0000_0490);
    pub const FUNCTION_FAILED: XResult = XResult(0x0000_065B);

    #[inline]
    pub fn code(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn is_success(self) -> bool {
        self == XResult::SUCCESS
    }

    /// Maps the code into an HRESULT the way `HRESULT_FROM_WIN32` does:
    /// non-positive codes pass through unchanged, everything else gets the
    /// Win32 facility and the failure bit.
    pub fn to_hresult(self) -> u32 {
        if (self.0 as i32) <= 0 {
            self.0
        } else {
            (self.0 & 0xFFFF) | (FACILITY_WIN32 << 16) | 0x8000_0000
        }
    }

    fn name(self) -> Option<&'static str> {
        Some(match self {
            XResult::SUCCESS => "SUCCESS",
            XResult::INVALID_HANDLE => "INVALID_HANDLE",
            XResult::NOT_ENOUGH_MEMORY => "NOT_ENOUGH_MEMORY",
            XResult::NO_MORE_FILES => "NO_MORE_FILES",
            XResult::INVALID_PARAMETER => "INVALID_PARAMETER",
            XResult::INSUFFICIENT_BUFFER => "INSUFFICIENT_BUFFER",
            XResult::IO_PENDING => "IO_PENDING",
            XResult::NOT_FOUND => "NOT_FOUND",
            XResult::FUNCTION_FAILED => "FUNCTION_FAILED",
            _ => return None,
        })
    }
}

impl fmt::Debug for XResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "X_ERROR_{name}({:#X})", self.0),
            None => write!(f, "XResult({:#X})", self.0),
        }
    }
}

impl fmt::Display for XResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl From<XResult> for u32 {
    fn from(result: XResult) -> u32 {
        result.0
    }
}

/// An NT-style status code.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct XStatus(pub u32);

impl XStatus {
    pub const SUCCESS: XStatus = XStatus(0);
    pub const INVALID_PARAMETER: XStatus = XStatus(0xC000_000D);
    pub const NOT_FOUND: XStatus = XStatus(0xC000_0225);

    #[inline]
    pub fn code(self) -> u32 {
        self.0
    }

    /// Equivalent of `XFAILED`: the severity bits mark an error.
    #[inline]
    pub fn is_failure(self) -> bool {
        (self.0 as i32) < 0
    }
}

impl fmt::Debug for XStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "XStatus({:#010X})", self.0)
    }
}

impl From<XStatus> for u32 {
    fn from(status: XStatus) -> u32 {
        status.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hresult_from_win32() {
        assert_eq!(XResult::SUCCESS.to_hresult(), 0);
        assert_eq!(XResult::INVALID_HANDLE.to_hresult(), 0x8007_0006);
        assert_eq!(XResult::NO_MORE_FILES.to_hresult(), 0x8007_0012);
        assert_eq!(XResult::INSUFFICIENT_BUFFER.to_hresult(), 0x8007_007A);
        // Already an HRESULT: the sign bit is set, so it passes through.
        assert_eq!(XResult(0x8007_0057).to_hresult(), 0x8007_0057);
    }

    #[test]
    fn test_debug_names() {
        assert_eq!(format!("{:?}", XResult::IO_PENDING), "X_ERROR_IO_PENDING(0x3E5)");
        assert_eq!(format!("{:?}", XResult(0x1234)), "XResult(0x1234)");
    }

    #[test]
    fn test_status_failure() {
        assert!(!XStatus::SUCCESS.is_failure());
        assert!(XStatus::NOT_FOUND.is_failure());
        assert!(XStatus::INVALID_PARAMETER.is_failure());
    }
}
