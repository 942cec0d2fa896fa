//! Bitmap page allocator backing `mmap`, `munmap` and `brk`.
//!
//! The arena is split into 64 KiB pages. A page is handed out by setting its
//! bit and given back by clearing it; nothing else about a mapping is
//! remembered. Only two mapping shapes are served: read-only copies of a
//! descriptor's contents and anonymous read/write memory.
use bit_set::BitSet;
use sysdefs::constants::err_const::{syscall_error, syscall_ret, Errno};
use sysdefs::constants::fs_const::{
    MAP_ANONYMOUS, MAP_FAILED, MAP_PAGESHIFT, MAP_PAGESIZE, PROT_READ, PROT_WRITE,
};

use crate::arena::HeapArena;
use crate::mem_helper::{pages_for, round_up_page};
use crate::ArenaConfig;

/// Where the bytes of a file-backed mapping come from.
pub trait MapSource {
    /// Current size of the object behind `fd`.
    fn source_size(&self, fd: i32) -> Result<u64, Errno>;

    /// Positioned read that does not move any cursor of `fd`. Returns the
    /// number of bytes read, zero at end of data.
    fn read_at(&self, fd: i32, buf: &mut [u8], offset: i64) -> Result<usize, Errno>;
}

/// A [`MapSource`] with no descriptors, for callers that only ever map
/// anonymous memory.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnonymousOnly;

impl MapSource for AnonymousOnly {
    fn source_size(&self, _fd: i32) -> Result<u64, Errno> {
        Err(Errno::EBADF)
    }

    fn read_at(&self, _fd: i32, _buf: &mut [u8], _offset: i64) -> Result<usize, Errno> {
        Err(Errno::EBADF)
    }
}

#[derive(Debug)]
pub struct PageAllocator {
    arena: HeapArena,
    pages: BitSet,
    page_count: usize,
    config: ArenaConfig,
}

impl PageAllocator {
    pub fn new(base: u64, size: u64, config: ArenaConfig) -> Self {
        let arena = HeapArena::new(base, size);
        let page_count = (arena.size() >> MAP_PAGESHIFT) as usize;
        log::debug!("page allocator: {} pages of {} bytes", page_count, MAP_PAGESIZE);
        PageAllocator {
            arena,
            pages: BitSet::with_capacity(page_count),
            page_count,
            config,
        }
    }

    pub fn arena(&self) -> &HeapArena {
        &self.arena
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn free_pages(&self) -> usize {
        self.page_count - self.pages.len()
    }

    pub fn is_page_allocated(&self, index: usize) -> bool {
        self.pages.contains(index)
    }

    fn page_addr(&self, index: usize) -> u64 {
        self.arena.base() + ((index as u64) << MAP_PAGESHIFT)
    }

    /// First-fit search for `count` consecutive free pages.
    fn find_free_run(&self, count: usize) -> Option<usize> {
        if count == 0 || count > self.page_count {
            return None;
        }
        let mut run_start = 0;
        let mut run_len = 0;
        for index in 0..self.page_count {
            if self.pages.contains(index) {
                run_len = 0;
                run_start = index + 1;
                continue;
            }
            run_len += 1;
            if run_len == count {
                return Some(run_start);
            }
        }
        None
    }

    fn allocate_pages(&mut self, length: u64) -> Result<(usize, usize), Errno> {
        let count = pages_for(length) as usize;
        let first = match self.find_free_run(count) {
            Some(first) => first,
            None => {
                log::debug!("no run of {} free pages left", count);
                return Err(Errno::ENOMEM);
            }
        };
        for index in first..first + count {
            self.pages.insert(index);
        }
        Ok((first, count))
    }

    fn release_pages(&mut self, first: usize, count: usize) {
        for index in first..first + count {
            if !self.pages.remove(index) {
                log::debug!("page {} was not allocated", index);
            }
        }
    }

    /// Moves the program break, see [`HeapArena::set_brk`].
    pub fn brk(&mut self, addr: u64) -> Result<u64, Errno> {
        self.arena.set_brk(addr)
    }

    /// Maps memory inside the arena.
    ///
    /// Input:
    ///     - source: resolves `fd` for file-backed mappings
    ///     - addr: placement hint, ignored
    ///     - length: mapping length for anonymous mappings
    ///     - prot, flags: must match one of the two supported shapes
    ///     - fd, offset: descriptor and starting offset for file-backed mappings
    ///
    /// Return:
    ///     - guest address of the first mapped page
    ///     - ENOSYS for unsupported shapes, ENOMEM when no run fits,
    ///       EBADF when the descriptor cannot be sized
    #[allow(clippy::too_many_arguments)]
    pub fn mmap(
        &mut self,
        source: &dyn MapSource,
        addr: u64,
        length: u64,
        prot: i32,
        flags: i32,
        fd: i32,
        offset: i64,
    ) -> Result<u64, Errno> {
        log::trace!(
            "mmap(addr={:#x}, len={}, prot={:#x}, flags={:#x}, fd={}, off={})",
            addr,
            length,
            prot,
            flags,
            fd,
            offset
        );
        let anonymous = flags & MAP_ANONYMOUS != 0;
        let read_write = PROT_READ | PROT_WRITE;

        if prot & PROT_READ != 0 && !anonymous && fd >= 0 {
            self.map_source(source, fd, offset)
        } else if prot & read_write == read_write && anonymous && length > 0 {
            let (first, count) = self.allocate_pages(length)?;
            let start = self.page_addr(first);
            if self.config.zero_fill_anonymous {
                let len = count << MAP_PAGESHIFT;
                if let Some(bytes) = self.arena.bytes_mut(start, len) {
                    bytes.fill(0);
                }
            }
            log::debug!("anonymous mapping of {} pages at {:#x}", count, start);
            Ok(start)
        } else {
            log::debug!("unsupported mmap shape prot={:#x} flags={:#x}", prot, flags);
            Err(Errno::ENOSYS)
        }
    }

    fn map_source(&mut self, source: &dyn MapSource, fd: i32, offset: i64) -> Result<u64, Errno> {
        if offset < 0 {
            return Err(Errno::EINVAL);
        }
        let size = source.source_size(fd).map_err(|_| Errno::EBADF)?;
        let length = if size == 0 { MAP_PAGESIZE as u64 } else { size };
        let (first, count) = self.allocate_pages(length)?;
        let start = self.page_addr(first);

        let to_copy = size.saturating_sub(offset as u64) as usize;
        if let Err(e) = self.copy_from_source(source, fd, start, offset, to_copy) {
            self.release_pages(first, count);
            return Err(e);
        }
        log::debug!(
            "mapped {} bytes of fd {} into {} pages at {:#x}",
            to_copy,
            fd,
            count,
            start
        );
        Ok(start)
    }

    fn copy_from_source(
        &mut self,
        source: &dyn MapSource,
        fd: i32,
        start: u64,
        offset: i64,
        len: usize,
    ) -> Result<(), Errno> {
        let region = self.arena.bytes_mut(start, len).ok_or(Errno::EFAULT)?;
        let mut done = 0;
        while done < len {
            let n = source.read_at(fd, &mut region[done..], offset + done as i64)?;
            if n == 0 {
                break;
            }
            done += n;
        }
        Ok(())
    }

    /// Unmaps every page overlapping `[addr, addr + round_up(length))`.
    /// Ranges outside the arena are logged and ignored; the call itself
    /// never fails.
    pub fn munmap(&mut self, addr: u64, length: u64) -> Result<(), Errno> {
        if !self.arena.contains(addr) {
            log::warn!("munmap of {:#x} outside the heap arena ignored", addr);
            return Ok(());
        }
        let end = addr
            .saturating_add(round_up_page(length))
            .min(self.arena.end());
        // a zero length covers no page, even when addr is mid-page
        if end <= addr {
            log::debug!("munmap {:#x}: empty range", addr);
            return Ok(());
        }
        let first = ((addr - self.arena.base()) >> MAP_PAGESHIFT) as usize;
        let last = (pages_for(end - self.arena.base()) as usize).min(self.page_count);
        if last > first {
            self.release_pages(first, last - first);
        }
        log::debug!("munmap {:#x}: released pages {}..{}", addr, first, last);
        Ok(())
    }

    /// Borrow mapped bytes at a guest address, if inside the arena.
    pub fn region(&self, addr: u64, len: usize) -> Option<&[u8]> {
        self.arena.bytes(addr, len)
    }

    pub fn region_mut(&mut self, addr: u64, len: usize) -> Option<&mut [u8]> {
        self.arena.bytes_mut(addr, len)
    }

    //------------------------------------SYSCALL SURFACE------------------------------------
    /*
     *   brk_syscall() returns the new break, or -1 with errno set
     */
    pub fn brk_syscall(&mut self, addr: u64) -> i64 {
        match self.brk(addr) {
            Ok(brk) => brk as i64,
            Err(e) => syscall_error(e, "brk", "break past the heap arena") as i64,
        }
    }

    /*
     *   mmap_syscall() returns the mapped address, or MAP_FAILED with errno set
     */
    #[allow(clippy::too_many_arguments)]
    pub fn mmap_syscall(
        &mut self,
        source: &dyn MapSource,
        addr: u64,
        length: u64,
        prot: i32,
        flags: i32,
        fd: i32,
        offset: i64,
    ) -> i64 {
        match self.mmap(source, addr, length, prot, flags, fd, offset) {
            Ok(mapped) => mapped as i64,
            Err(e) => {
                syscall_error(e, "mmap", e.message());
                MAP_FAILED
            }
        }
    }

    /*
     *   munmap_syscall() always returns 0
     */
    pub fn munmap_syscall(&mut self, addr: u64, length: u64) -> i32 {
        syscall_ret(self.munmap(addr, length).map(|_| 0), "munmap")
    }
}
