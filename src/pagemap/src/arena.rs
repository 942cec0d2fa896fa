//! The heap arena: one bounded, owned byte range addressed with guest
//! addresses starting at `base`.
use sysdefs::constants::err_const::Errno;

use crate::mem_helper::{align_up, platform_page_size};

#[derive(Debug)]
pub struct HeapArena {
    base: u64,
    size: u64,
    brk: u64,
    memory: Vec<u8>,
}

impl HeapArena {
    /// Builds an arena over `[base, base + size)`. The base is moved up to
    /// the host page alignment and the size shrinks by the same amount.
    pub fn new(base: u64, size: u64) -> Self {
        let (base, size) = match align_up(base, platform_page_size()) {
            Some(aligned) => (aligned, size.saturating_sub(aligned - base)),
            None => (base, 0),
        };
        // an arena that would wrap the address space is clipped at the top
        let size = size.min(u64::MAX - base);
        log::debug!("heap arena at {:#x}, {} bytes", base, size);
        HeapArena {
            base,
            size,
            brk: base,
            memory: vec![0; size as usize],
        }
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// First address past the arena.
    pub fn end(&self) -> u64 {
        self.base + self.size
    }

    pub fn brk(&self) -> u64 {
        self.brk
    }

    pub fn contains(&self, addr: u64) -> bool {
        addr >= self.base && addr < self.end()
    }

    /// Moves the program break.
    ///
    /// Input:
    ///     - addr: requested break. Anything below the base is a query.
    ///
    /// Return:
    ///     - the break after the call, or ENOMEM past the arena end
    pub fn set_brk(&mut self, addr: u64) -> Result<u64, Errno> {
        if addr < self.base {
            return Ok(self.brk);
        }
        if addr > self.end() {
            log::debug!("brk {:#x} past arena end {:#x}", addr, self.end());
            return Err(Errno::ENOMEM);
        }
        self.brk = addr;
        Ok(self.brk)
    }

    fn span(&self, addr: u64, len: usize) -> Option<(usize, usize)> {
        if addr < self.base {
            return None;
        }
        let start = addr - self.base;
        let stop = start.checked_add(len as u64)?;
        if stop > self.size {
            return None;
        }
        Some((start as usize, stop as usize))
    }

    /// Borrow `len` bytes at guest address `addr`, if fully inside the arena.
    pub fn bytes(&self, addr: u64, len: usize) -> Option<&[u8]> {
        let (start, stop) = self.span(addr, len)?;
        Some(&self.memory[start..stop])
    }

    pub fn bytes_mut(&mut self, addr: u64, len: usize) -> Option<&mut [u8]> {
        let (start, stop) = self.span(addr, len)?;
        Some(&mut self.memory[start..stop])
    }
}
