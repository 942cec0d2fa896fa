//! This module provides a handle table: the service every mount uses to
//! reserve the handle numbers it hands out and to persist a small cursor per
//! handle between calls.
//!
//! Mounts only see the [`HandleAllocator`] trait. [`HandleTable`] is the
//! implementation hosts (and the tests) plug in.

#![allow(clippy::cast_possible_truncation)]
#![warn(missing_docs)]

mod commonconstants;
mod handletable;

pub use commonconstants::*;
pub use handletable::HandleTable;

use sysdefs::constants::err_const::Errno;

/// Service consumed by mounts to reserve handle numbers and store a cursor
/// for each of them.
///
/// Implementations serialize internally, so one allocator can be shared by
/// several mounts behind an `Arc`.
pub trait HandleAllocator: Send + Sync {
    /// Reserves `requested_handle` for `owner`. Returns the handle that was
    /// actually reserved; callers treat anything other than an echo of
    /// `requested_handle` as a broken contract.
    fn allocate_reserved_handle(&self, owner: u32, requested_handle: u64) -> Result<u64, Errno>;

    /// Cursor stored for `handle` (zero right after reservation).
    fn get_offset(&self, handle: u64) -> Result<i64, Errno>;

    /// Replaces the cursor stored for `handle`.
    fn set_offset(&self, handle: u64, offset: i64) -> Result<(), Errno>;
}
