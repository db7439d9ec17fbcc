use xam_common::XResult;

/// Host-side image of the fields an overlapped (deferred) completion fills in.
///
/// The guest polls or waits on its overlapped block; whatever mechanism does
/// that only reads these three values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverlappedRecord {
    /// Coarse status: `SUCCESS` or `FUNCTION_FAILED`, except for handle
    /// failures which report `INVALID_HANDLE` directly.
    pub result: XResult,
    /// Platform-style extended status, an HRESULT. Only meaningful on failure.
    pub extended_error: u32,
    /// Operation-specific value; the number of items for enumeration.
    pub length: u32,
}

impl OverlappedRecord {
    /// Fills the record in one step.
    pub fn complete(&mut self, result: XResult, extended_error: u32, length: u32) {
        self.result = result;
        self.extended_error = extended_error;
        self.length = length;
    }
}

/// How the outcome of a call is delivered back to the caller.
#[derive(Debug)]
pub enum CompletionMode<'a> {
    /// The result code is returned directly and the item count goes to the slot.
    Sync(&'a mut u32),
    /// The call returns `IO_PENDING`; the real outcome goes to the record.
    Async(&'a mut OverlappedRecord),
}

impl<'a> CompletionMode<'a> {
    /// Picks the completion channel from the pair of optional outputs a guest
    /// export receives.
    ///
    /// Exactly one of the two must be supplied; any other combination is a
    /// caller contract violation and yields `INVALID_PARAMETER`.
    pub fn from_outputs(
        items_returned: Option<&'a mut u32>,
        overlapped: Option<&'a mut OverlappedRecord>,
    ) -> Result<CompletionMode<'a>, XResult> {
        match (items_returned, overlapped) {
            (Some(slot), None) => Ok(CompletionMode::Sync(slot)),
            (None, Some(record)) => Ok(CompletionMode::Async(record)),
            _ => Err(XResult::INVALID_PARAMETER),
        }
    }

    pub fn is_async(&self) -> bool {
        matches!(self, CompletionMode::Async(_))
    }

    /// Reports a detailed `result` and item `count` through the selected
    /// channel and returns what the call itself should return.
    ///
    /// The count is only reported on success; every other result reports zero.
    pub fn dispatch(self, result: XResult, count: u32) -> XResult {
        let count = if result.is_success() { count } else { 0 };
        match self {
            CompletionMode::Sync(slot) => {
                *slot = count;
                result
            }
            CompletionMode::Async(record) => {
                let coarse = if result.is_success() {
                    XResult::SUCCESS
                } else {
                    XResult::FUNCTION_FAILED
                };
                record.complete(coarse, result.to_hresult(), count);
                XResult::IO_PENDING
            }
        }
    }

    /// Reports an unresolvable handle.
    ///
    /// Synchronous callers get `INVALID_HANDLE` back immediately and their
    /// slot is left alone. Overlapped callers always see `IO_PENDING`, with
    /// `INVALID_HANDLE` in both status fields of the record.
    pub fn invalid_handle(self) -> XResult {
        match self {
            CompletionMode::Sync(_) => XResult::INVALID_HANDLE,
            CompletionMode::Async(record) => {
                record.complete(XResult::INVALID_HANDLE, XResult::INVALID_HANDLE.code(), 0);
                XResult::IO_PENDING
            }
        }
    }
}
