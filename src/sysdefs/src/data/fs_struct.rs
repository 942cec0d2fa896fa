//! Plain structs handed across the syscall surface.

//stat/fstat output. Derives Eq so tests can compare whole records.
#[derive(Eq, PartialEq, Default, Debug, Clone, Copy)]
#[repr(C)]
pub struct StatData {
    pub st_dev: u64,
    pub st_ino: u64,
    pub st_mode: u32,
    pub st_nlink: u32,
    pub st_uid: u32,
    pub st_gid: u32,
    pub st_rdev: u64,
    pub st_size: i64,
    pub st_blksize: i32,
    pub st_blocks: i64,
    // (seconds, nanoseconds)
    pub st_atim: (u64, u64),
    pub st_mtim: (u64, u64),
    pub st_ctim: (u64, u64),
}

/// Fixed header of a `linux_dirent64` record. The entry type byte and the
/// NUL-terminated name follow it, and the record is padded to 8 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C, packed)]
pub struct ClippedDirent {
    pub d_ino: u64,
    pub d_off: u64,
    pub d_reclen: u16,
}

pub const CLIPPED_DIRENT_SIZE: usize = 19;

/// Alignment of every dirent record written into a caller buffer.
pub const DIRENT_ALIGN: usize = 8;

impl ClippedDirent {
    /// Size of a full record carrying `name_len` bytes of name.
    pub fn record_len(name_len: usize) -> usize {
        // header + d_type + name + NUL, rounded up
        let raw = CLIPPED_DIRENT_SIZE + 1 + name_len + 1;
        raw.div_ceil(DIRENT_ALIGN) * DIRENT_ALIGN
    }

    /// Serializes a record into `buf` in native byte order. `buf` must be
    /// at least `record_len(name.len())` bytes; padding is zeroed.
    pub fn write_record(&self, d_type: u8, name: &[u8], buf: &mut [u8]) {
        let d_ino = self.d_ino;
        let d_off = self.d_off;
        let d_reclen = self.d_reclen;
        let reclen = d_reclen as usize;
        buf[..reclen].fill(0);
        buf[0..8].copy_from_slice(&d_ino.to_ne_bytes());
        buf[8..16].copy_from_slice(&d_off.to_ne_bytes());
        buf[16..18].copy_from_slice(&d_reclen.to_ne_bytes());
        buf[18] = d_type;
        buf[CLIPPED_DIRENT_SIZE..CLIPPED_DIRENT_SIZE + name.len()].copy_from_slice(name);
    }
}

/// Advisory lock record as passed through F_GETLK / F_SETLK. The channel
/// mount stores it verbatim and never interprets it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct FlockStruct {
    pub l_type: i16,
    pub l_whence: i16,
    pub l_start: i64,
    pub l_len: i64,
    pub l_pid: i32,
}
