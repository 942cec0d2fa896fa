//! Heap memory manager for the sandbox: a bitmap page allocator that emulates
//! `mmap`, `munmap` and `brk` over one pre-allocated arena.
//!
//! Addresses handed out are guest addresses inside `[base, base + size)`.
//! The arena owns its bytes; callers reach them through the bounds-checked
//! [`PageAllocator::region`] accessors, never through raw pointers.
use serde::{Deserialize, Serialize};

mod allocator;
mod arena;
pub mod mem_helper;


pub use allocator::{AnonymousOnly, MapSource, PageAllocator};
pub use arena::HeapArena;

/// Allocator policy knobs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Clear anonymous mappings before returning them. Off by default, so a
    /// fresh mapping may still hold bytes from an earlier one.
    pub zero_fill_anonymous: bool,
}
