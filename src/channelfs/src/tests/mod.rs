
use std::collections::HashMap;
use std::sync::Arc;

use fdtables::HandleTable;
use parking_lot::Mutex;
use sysdefs::data::fs_struct::CLIPPED_DIRENT_SIZE;

use crate::channel::{AccessType, ChannelDescriptor, ChannelLimits};
use crate::config::MountConfig;
use crate::devices::emulated_channels;
use crate::io::ChannelIo;
use crate::mount::ChannelsMount;

/// In-memory byte-transfer primitive. Every handle is a growable buffer;
/// each call is recorded so tests can check which offset the mount used.
#[derive(Default)]
pub(crate) struct FakeChannelIo {
    pub data: Mutex<HashMap<i32, Vec<u8>>>,
    pub calls: Mutex<Vec<(&'static str, i32, i64)>>,
    pub fail_with: Mutex<Option<i32>>,
}

impl FakeChannelIo {
    pub fn preload(&self, handle: i32, bytes: &[u8]) {
        self.data.lock().insert(handle, bytes.to_vec());
    }

    pub fn contents(&self, handle: i32) -> Vec<u8> {
        self.data.lock().get(&handle).cloned().unwrap_or_default()
    }

    pub fn last_call(&self) -> Option<(&'static str, i32, i64)> {
        self.calls.lock().last().copied()
    }
}

impl ChannelIo for FakeChannelIo {
    fn pread(&self, handle: i32, buf: &mut [u8], offset: i64) -> i32 {
        self.calls.lock().push(("pread", handle, offset));
        if let Some(errno) = *self.fail_with.lock() {
            return -errno;
        }
        let data = self.data.lock();
        let bytes = data.get(&handle).map(Vec::as_slice).unwrap_or(&[]);
        let start = (offset as usize).min(bytes.len());
        let n = buf.len().min(bytes.len() - start);
        buf[..n].copy_from_slice(&bytes[start..start + n]);
        n as i32
    }

    fn pwrite(&self, handle: i32, buf: &[u8], offset: i64) -> i32 {
        self.calls.lock().push(("pwrite", handle, offset));
        if let Some(errno) = *self.fail_with.lock() {
            return -errno;
        }
        let mut data = self.data.lock();
        let bytes = data.entry(handle).or_default();
        let start = offset as usize;
        if bytes.len() < start + buf.len() {
            bytes.resize(start + buf.len(), 0);
        }
        bytes[start..start + buf.len()].copy_from_slice(buf);
        buf.len() as i32
    }
}

// Handles of the sample manifest, in declaration order.
pub(crate) const STDIN: i32 = 0;
pub(crate) const STDOUT: i32 = 1;
pub(crate) const INPUT: i32 = 2;
pub(crate) const LOG: i32 = 3;
pub(crate) const SCRATCH: i32 = 4;
pub(crate) const STREAM: i32 = 5;
pub(crate) const DATA_A: i32 = 6;
pub(crate) const DATA_B: i32 = 7;

pub(crate) fn sample_channels() -> Vec<ChannelDescriptor> {
    vec![
        ChannelDescriptor::new(
            "/dev/stdin",
            AccessType::SeqGetSeqPut,
            ChannelLimits::read_only(),
            0,
        ),
        ChannelDescriptor::new(
            "/dev/stdout",
            AccessType::SeqGetSeqPut,
            ChannelLimits::write_only(),
            0,
        ),
        ChannelDescriptor::new(
            "/data/input",
            AccessType::RandGetSeqPut,
            ChannelLimits::read_only(),
            10,
        ),
        ChannelDescriptor::new(
            "/data/log",
            AccessType::SeqGetRandPut,
            ChannelLimits::read_write(),
            0,
        ),
        ChannelDescriptor::new(
            "/data/scratch",
            AccessType::RandGetRandPut,
            ChannelLimits::read_write(),
            0,
        ),
        ChannelDescriptor::new(
            "/data/stream",
            AccessType::SeqGetSeqPut,
            ChannelLimits::read_write(),
            0,
        ),
        ChannelDescriptor::new("/data/a", AccessType::RandGetRandPut, ChannelLimits::read_only(), 3),
        ChannelDescriptor::new("/data/b", AccessType::RandGetRandPut, ChannelLimits::read_only(), 3),
        ChannelDescriptor::new(
            "/data/sub/c",
            AccessType::RandGetRandPut,
            ChannelLimits::read_only(),
            0,
        ),
    ]
}

pub(crate) struct Fixture {
    pub mount: ChannelsMount,
    pub io: Arc<FakeChannelIo>,
    pub handles: Arc<HandleTable>,
}

pub(crate) fn setup_with(host: Vec<ChannelDescriptor>, config: MountConfig) -> Fixture {
    let io = Arc::new(FakeChannelIo::default());
    let handles = Arc::new(HandleTable::new());
    let mount = ChannelsMount::new(
        handles.clone(),
        io.clone(),
        host,
        emulated_channels(),
        config,
    );
    Fixture { mount, io, handles }
}

pub(crate) fn setup() -> Fixture {
    setup_with(sample_channels(), MountConfig::default())
}

/// Decoded dirent: (inode, next offset, type, name).
pub(crate) fn parse_dirents(buf: &[u8]) -> Vec<(u64, u64, u8, String)> {
    let mut out = vec![];
    let mut pos = 0;
    while pos < buf.len() {
        let ino = u64::from_ne_bytes(buf[pos..pos + 8].try_into().unwrap());
        let off = u64::from_ne_bytes(buf[pos + 8..pos + 16].try_into().unwrap());
        let reclen = u16::from_ne_bytes(buf[pos + 16..pos + 18].try_into().unwrap()) as usize;
        let d_type = buf[pos + 18];
        let name_bytes = &buf[pos + CLIPPED_DIRENT_SIZE..pos + reclen];
        let name_len = name_bytes.iter().position(|b| *b == 0).unwrap();
        let name = String::from_utf8(name_bytes[..name_len].to_vec()).unwrap();
        out.push((ino, off, d_type, name));
        pos += reclen;
    }
    out
}
