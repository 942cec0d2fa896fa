// Constants shared by every handle table implementation.

/// Per-process maximum number of handles...
pub const FD_PER_PROCESS_MAX: u64 = 1024;

/// All owner kinds defined by mounts must be below this value.
pub const FDT_KINDMAX: u32 = 0xff00_0000;

/// One reserved slot, looked up by handle.
#[derive(Clone, Copy, Hash, Debug, PartialEq, Eq)]
pub struct FDTableEntry {
    /// Which mount reserved the handle. User defined, below [`FDT_KINDMAX`].
    pub fdkind: u32,
    /// Per-handle cursor. Mounts use it for whatever position they need to
    /// persist between calls, e.g. a directory listing index.
    pub perfdinfo: i64,
}
