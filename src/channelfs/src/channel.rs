//! Channel data model: the immutable descriptor a host declares, and the
//! runtime state the mount keeps beside it.
use serde::{Deserialize, Serialize};
use sysdefs::constants::fs_const::{
    O_ACCMODE, O_RDONLY, O_RDWR, O_WRONLY, S_IFBLK, S_IFIFO, S_IRUSR, S_IRWXU, S_IWUSR,
};
use sysdefs::data::fs_struct::FlockStruct;

/// Open flags value of a channel or directory that is not open.
pub const HANDLE_CLOSED: i32 = -1;

/// How reads and writes of a channel relate to each other. "Seq" sides only
/// ever move forward from where the last transfer ended, "Rand" sides can be
/// positioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessType {
    SeqGetSeqPut,
    RandGetSeqPut,
    SeqGetRandPut,
    RandGetRandPut,
}

/// Quotas declared for a channel. A zero count or size removes the
/// capability entirely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelLimits {
    pub gets: u64,
    pub get_size: u64,
    pub puts: u64,
    pub put_size: u64,
}

impl ChannelLimits {
    pub const fn read_only() -> Self {
        ChannelLimits {
            gets: u64::MAX,
            get_size: u64::MAX,
            puts: 0,
            put_size: 0,
        }
    }

    pub const fn write_only() -> Self {
        ChannelLimits {
            gets: 0,
            get_size: 0,
            puts: u64::MAX,
            put_size: u64::MAX,
        }
    }

    pub const fn read_write() -> Self {
        ChannelLimits {
            gets: u64::MAX,
            get_size: u64::MAX,
            puts: u64::MAX,
            put_size: u64::MAX,
        }
    }

    pub fn can_read(&self) -> bool {
        self.gets != 0 && self.get_size != 0
    }

    pub fn can_write(&self) -> bool {
        self.puts != 0 && self.put_size != 0
    }

    /// Whether open flags `oflag` only ask for directions these limits allow.
    pub fn permits(&self, oflag: i32) -> bool {
        match oflag & O_ACCMODE {
            O_RDONLY => self.can_read(),
            O_WRONLY => self.can_write(),
            _ => self.can_read() && self.can_write(),
        }
    }
}

/// One channel as declared by the host manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelDescriptor {
    pub name: String,
    pub access_type: AccessType,
    pub limits: ChannelLimits,
    /// Size known at startup; zero for streams.
    #[serde(default)]
    pub size: i64,
}

impl ChannelDescriptor {
    pub fn new(name: &str, access_type: AccessType, limits: ChannelLimits, size: i64) -> Self {
        ChannelDescriptor {
            name: name.to_string(),
            access_type,
            limits,
            size,
        }
    }
}

/// Mutable per-channel state. Lives as long as the mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRuntime {
    pub flags: i32,
    pub sequential_pos: i64,
    pub random_pos: i64,
    /// Highest write position reached on random-write channels.
    pub maxsize: i64,
    /// Mode override; 0 means derive the mode from the descriptor.
    pub mode: u32,
    pub lock: FlockStruct,
}

impl Default for ChannelRuntime {
    fn default() -> Self {
        ChannelRuntime {
            flags: HANDLE_CLOSED,
            sequential_pos: 0,
            random_pos: 0,
            maxsize: 0,
            mode: 0,
            lock: FlockStruct::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChannelItem {
    pub descriptor: ChannelDescriptor,
    pub runtime: ChannelRuntime,
}

impl ChannelItem {
    pub fn new(descriptor: ChannelDescriptor) -> Self {
        ChannelItem {
            descriptor,
            runtime: ChannelRuntime::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn access_type(&self) -> AccessType {
        self.descriptor.access_type
    }

    pub fn is_open(&self) -> bool {
        self.runtime.flags >= 0
    }

    /// Size reported by stat and used for SEEK_END.
    pub fn effective_size(&self) -> i64 {
        self.runtime.maxsize.max(self.descriptor.size)
    }

    /// Reopens are idempotent, so a closed channel is the only one whose
    /// flags get stored.
    pub(crate) fn mark_open(&mut self, oflag: i32) {
        self.runtime.flags = oflag;
    }

    /// Drops the open state. Cursors go back to zero; the synthetic size
    /// survives unless `retain_size` is false.
    pub(crate) fn mark_closed(&mut self, retain_size: bool) {
        self.runtime.flags = HANDLE_CLOSED;
        self.runtime.sequential_pos = 0;
        self.runtime.random_pos = 0;
        if !retain_size {
            self.runtime.maxsize = 0;
        }
    }

    /// `st_mode` of the channel.
    ///
    /// Permission bits follow the declared limits. The file type is FIFO for
    /// channels that can only move one way through a sequential side and
    /// block device otherwise. A mode override replaces the file type.
    pub fn permissions(&self) -> u32 {
        let limits = &self.descriptor.limits;
        let mut perm = 0;
        if limits.can_read() {
            perm |= S_IRUSR;
        }
        if limits.can_write() {
            perm |= S_IWUSR;
        }

        if self.runtime.mode != 0 {
            return perm | self.runtime.mode;
        }

        let rw = perm & S_IRWXU;
        let fifo = match self.descriptor.access_type {
            AccessType::SeqGetSeqPut => rw == S_IRUSR || rw == S_IWUSR,
            AccessType::RandGetSeqPut => rw == S_IWUSR,
            AccessType::SeqGetRandPut => rw == S_IRUSR,
            AccessType::RandGetRandPut => false,
        };
        if fifo {
            perm | S_IFIFO
        } else {
            perm | S_IFBLK
        }
    }

    /// Whether the stored open flags allow reading.
    pub fn opened_for_read(&self) -> bool {
        self.is_open() && matches!(self.runtime.flags & O_ACCMODE, O_RDONLY | O_RDWR)
    }

    /// Whether the stored open flags allow writing.
    pub fn opened_for_write(&self) -> bool {
        self.is_open() && matches!(self.runtime.flags & O_ACCMODE, O_WRONLY | O_RDWR)
    }
}
