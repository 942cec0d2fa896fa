// A single table of reserved handles guarded by one lock. Every mount that
// shares the table goes through the same mutex, which is plenty for the
// handful of handles a manifest declares.

use std::collections::HashMap;

use parking_lot::Mutex;
use sysdefs::constants::err_const::Errno;

use crate::commonconstants::{FDTableEntry, FDT_KINDMAX, FD_PER_PROCESS_MAX};
use crate::HandleAllocator;

/// Reference [`HandleAllocator`]: a map from handle to owner and cursor.
#[derive(Debug, Default)]
pub struct HandleTable {
    entries: Mutex<HashMap<u64, FDTableEntry>>,
}

impl HandleTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Owner kind that reserved `handle`, if any.
    pub fn owner_of(&self, handle: u64) -> Option<u32> {
        self.entries.lock().get(&handle).map(|entry| entry.fdkind)
    }
}

impl HandleAllocator for HandleTable {
    fn allocate_reserved_handle(&self, owner: u32, requested_handle: u64) -> Result<u64, Errno> {
        if owner >= FDT_KINDMAX {
            panic!("Owner kind {:#x} is in the reserved range", owner);
        }
        // Handles past the per-process limit would never be looked up again.
        if requested_handle >= FD_PER_PROCESS_MAX {
            return Err(Errno::EBADF);
        }

        let mut entries = self.entries.lock();
        if let Some(existing) = entries.get(&requested_handle) {
            log::warn!(
                "handle {} already reserved by owner {}, refused for owner {}",
                requested_handle,
                existing.fdkind,
                owner
            );
            return Err(Errno::EBUSY);
        }
        entries.insert(
            requested_handle,
            FDTableEntry {
                fdkind: owner,
                perfdinfo: 0,
            },
        );
        log::trace!("reserved handle {} for owner {}", requested_handle, owner);
        Ok(requested_handle)
    }

    fn get_offset(&self, handle: u64) -> Result<i64, Errno> {
        self.entries
            .lock()
            .get(&handle)
            .map(|entry| entry.perfdinfo)
            .ok_or(Errno::EBADF)
    }

    fn set_offset(&self, handle: u64, offset: i64) -> Result<(), Errno> {
        match self.entries.lock().get_mut(&handle) {
            Some(entry) => {
                entry.perfdinfo = offset;
                Ok(())
            }
            None => Err(Errno::EBADF),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    const OWNER_A: u32 = 1;
    const OWNER_B: u32 = 2;

    #[test]
    fn reserve_echoes_requested_handle() {
        let table = HandleTable::new();
        assert_eq!(table.allocate_reserved_handle(OWNER_A, 0), Ok(0));
        assert_eq!(table.allocate_reserved_handle(OWNER_A, 7), Ok(7));
        assert_eq!(table.owner_of(7), Some(OWNER_A));
        assert_eq!(table.owner_of(3), None);
    }

    #[test]
    fn double_reservation_is_refused() {
        let table = HandleTable::new();
        table.allocate_reserved_handle(OWNER_A, 4).unwrap();
        assert_eq!(table.allocate_reserved_handle(OWNER_B, 4), Err(Errno::EBUSY));
        assert_eq!(table.owner_of(4), Some(OWNER_A));
    }

    #[test]
    fn out_of_range_handle() {
        let table = HandleTable::new();
        assert_eq!(
            table.allocate_reserved_handle(OWNER_A, FD_PER_PROCESS_MAX),
            Err(Errno::EBADF)
        );
    }

    #[test]
    fn offsets_start_at_zero_and_persist() {
        let table = HandleTable::new();
        table.allocate_reserved_handle(OWNER_A, 2).unwrap();
        assert_eq!(table.get_offset(2), Ok(0));
        table.set_offset(2, 5).unwrap();
        assert_eq!(table.get_offset(2), Ok(5));
        assert_eq!(table.get_offset(3), Err(Errno::EBADF));
        assert_eq!(table.set_offset(3, 1), Err(Errno::EBADF));
    }

    #[test]
    #[should_panic]
    fn reserved_owner_kind_panics() {
        let table = HandleTable::new();
        let _ = table.allocate_reserved_handle(FDT_KINDMAX, 0);
    }

    #[test]
    fn shared_between_threads() {
        let table = Arc::new(HandleTable::new());
        let mut workers = vec![];
        for t in 0..4u64 {
            let table = Arc::clone(&table);
            workers.push(thread::spawn(move || {
                for h in 0..16u64 {
                    let handle = t * 16 + h;
                    table.allocate_reserved_handle(OWNER_A, handle).unwrap();
                    table.set_offset(handle, handle as i64).unwrap();
                }
            }));
        }
        for w in workers {
            w.join().unwrap();
        }
        for handle in 0..64u64 {
            assert_eq!(table.get_offset(handle), Ok(handle as i64));
        }
    }
}
