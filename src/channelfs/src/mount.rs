//! The channel mount: POSIX file calls on top of the channel registry and
//! the synthetic directory tree.
//!
//! Every call comes in two shapes. The inherent methods (`open`, `read`, ...)
//! return `Result<_, Errno>`. The [`MountsInterface`] implementation wraps
//! them into the `-1` + errno convention the guest libc expects.
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use fdtables::HandleAllocator;
use pagemap::MapSource;
use sysdefs::constants::channel_const::{
    DEV_BLOCK_DEVICE_BLK_SIZE, DEV_CHAR_DEVICE_BLK_SIZE, DEV_DEVICE_ID, DEV_DIRECTORY_BLK_SIZE,
    DEV_DIRECTORY_SIZE, DEV_OWNER_GID, DEV_OWNER_UID, MOUNT_KIND_CHANNELS, STAT_BLOCK_UNIT,
};
use sysdefs::constants::err_const::{syscall_error, syscall_ret, Errno};
use sysdefs::constants::fs_const::{
    DT_BLK, DT_CHR, DT_DIR, DT_FIFO, DT_REG, DT_UNKNOWN, F_GETLK, F_SETLK, F_SETLKW, O_ACCMODE,
    O_DIRECTORY, O_RDONLY, SEEK_CUR, SEEK_END, SEEK_SET, S_IFBLK, S_IFCHR, S_IFDIR, S_IFIFO,
    S_IFMT, S_IFREG, S_IRUSR, S_IXUSR,
};
use sysdefs::data::fs_struct::{ClippedDirent, FlockStruct, StatData};

use crate::channel::{AccessType, ChannelDescriptor, ChannelItem, HANDLE_CLOSED};
use crate::config::MountConfig;
use crate::devices;
use crate::io::{transfer_result, ChannelIo};
use crate::position::{PosAccess, PosWhence};
use crate::readdir::{DirChild, DirEntry, ManifestDirs};
use crate::registry::ChannelRegistry;

// Largest transfer the primitive can report in its i32 return.
const MAX_TRANSFER: usize = i32::MAX as usize;

/// Which backend a mount is. Lets a dispatcher holding several
/// `MountsInterface` objects tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountId {
    Channels,
}

/// Inode number reported for a handle; inode 0 is never valid.
pub fn inode_from_handle(handle: i32) -> u64 {
    handle as u64 + 1
}

/// fcntl commands the channel mount understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FcntlRequest {
    GetLock,
    SetLock(FlockStruct),
}

impl FcntlRequest {
    /// Decodes a raw fcntl command. Anything but the lock commands is ENOSYS.
    pub fn from_raw(cmd: i32, lock: &FlockStruct) -> Result<FcntlRequest, Errno> {
        match cmd {
            F_GETLK => Ok(FcntlRequest::GetLock),
            F_SETLK | F_SETLKW => Ok(FcntlRequest::SetLock(*lock)),
            _ => Err(Errno::ENOSYS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FcntlReply {
    Lock(FlockStruct),
    Done,
}

/// The file-call surface every mount kind provides.
pub trait MountsInterface {
    fn mount_id(&self) -> MountId;

    fn chown_syscall(&self, path: &str, uid: u32, gid: u32) -> i32;
    fn chmod_syscall(&self, path: &str, mode: u32) -> i32;
    fn stat_syscall(&self, path: &str, statbuf: &mut StatData) -> i32;
    fn mkdir_syscall(&mut self, path: &str, mode: u32) -> i32;
    fn rmdir_syscall(&mut self, path: &str) -> i32;
    fn umount_syscall(&mut self, path: &str) -> i32;
    fn mount_syscall(&mut self, path: &str) -> i32;
    fn read_syscall(&mut self, fd: i32, buf: &mut [u8]) -> isize;
    fn write_syscall(&mut self, fd: i32, buf: &[u8]) -> isize;
    fn fchown_syscall(&self, fd: i32, uid: u32, gid: u32) -> i32;
    fn fchmod_syscall(&self, fd: i32, mode: u32) -> i32;
    fn fstat_syscall(&self, fd: i32, statbuf: &mut StatData) -> i32;
    fn getdents_syscall(&mut self, fd: i32, buf: &mut [u8]) -> i32;
    fn fsync_syscall(&mut self, fd: i32) -> i32;
    fn close_syscall(&mut self, fd: i32) -> i32;
    fn lseek_syscall(&mut self, fd: i32, offset: i64, whence: i32) -> i64;
    fn open_syscall(&mut self, path: &str, oflag: i32, mode: u32) -> i32;
    fn fcntl_syscall(&mut self, fd: i32, cmd: i32, lock: &mut FlockStruct) -> i32;
    fn remove_syscall(&mut self, path: &str) -> i32;
    fn unlink_syscall(&mut self, path: &str) -> i32;
    fn access_syscall(&self, path: &str, amode: i32) -> i32;
    fn ftruncate_syscall(&mut self, fd: i32, length: i64) -> i32;
    fn truncate_syscall(&mut self, path: &str, length: i64) -> i32;
    fn isatty_syscall(&self, fd: i32) -> i32;
    fn dup_syscall(&mut self, fd: i32) -> i32;
    fn dup2_syscall(&mut self, oldfd: i32, newfd: i32) -> i32;
    fn link_syscall(&mut self, oldpath: &str, newpath: &str) -> i32;
}

/// Calls that only make sense for one kind of mount, reached by a
/// dispatcher that already knows the handle belongs here.
pub trait MountSpecificInterface {
    /// Whether `handle` names a channel of this mount.
    fn check_handle(&self, handle: i32) -> bool;
    /// Path of an open channel handle.
    fn handle_path(&self, handle: i32) -> Option<&str>;
    /// Open flags stored for a channel handle.
    fn file_status_flags(&self, handle: i32) -> Result<i32, Errno>;
    fn set_file_status_flags(&mut self, handle: i32, flags: i32) -> Result<i32, Errno>;
}

pub struct ChannelsMount {
    registry: ChannelRegistry,
    dirs: ManifestDirs,
    handle_allocator: Arc<dyn HandleAllocator>,
    io: Arc<dyn ChannelIo>,
    config: MountConfig,
}

impl ChannelsMount {
    /// Builds the mount and reserves every channel and directory handle with
    /// the handle allocator.
    ///
    /// Panics if the allocator does not hand back exactly the requested
    /// handle: the rest of the mount relies on handle == index.
    pub fn new(
        handle_allocator: Arc<dyn HandleAllocator>,
        io: Arc<dyn ChannelIo>,
        host_channels: Vec<ChannelDescriptor>,
        emu_channels: Vec<ChannelDescriptor>,
        config: MountConfig,
    ) -> Self {
        let registry = ChannelRegistry::new(host_channels, emu_channels);
        let dirs = ManifestDirs::from_channels(&registry);

        let channel_handles = registry.iter().map(|(handle, _)| handle);
        let dir_handles = dirs.iter().map(|dir| dir.handle);
        for handle in channel_handles.chain(dir_handles) {
            match handle_allocator.allocate_reserved_handle(MOUNT_KIND_CHANNELS, handle as u64) {
                Ok(got) if got == handle as u64 => {}
                other => panic!(
                    "handle allocator did not reserve handle {}: {:?}",
                    handle, other
                ),
            }
        }
        log::debug!(
            "channels mount ready: {} channels, {} directories",
            registry.count(),
            dirs.len()
        );

        ChannelsMount {
            registry,
            dirs,
            handle_allocator,
            io,
            config,
        }
    }

    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    pub fn dirs(&self) -> &ManifestDirs {
        &self.dirs
    }

    fn open_channel_mut(&mut self, fd: i32) -> Result<&mut ChannelItem, Errno> {
        match self.registry.get_mut(fd) {
            Some(item) if item.is_open() => Ok(item),
            _ => Err(Errno::EBADF),
        }
    }

    //------------------------------------OPEN------------------------------------
    /*
     *   open() returns the channel or directory handle. Reopening something
     *   already open returns the same handle and leaves its flags alone.
     */
    pub fn open(&mut self, path: &str, oflag: i32) -> Result<i32, Errno> {
        log::trace!("open {} oflag={:#o}", path, oflag);
        if oflag & O_DIRECTORY != 0 {
            return self.open_dir(path, oflag);
        }

        let handle = match self.registry.match_by_name(path) {
            Some((handle, _)) => handle,
            None => return Err(Errno::ENOENT),
        };
        let item = self.registry.get_mut(handle).ok_or(Errno::ENOENT)?;
        if item.is_open() {
            return Ok(handle);
        }
        if !item.descriptor.limits.permits(oflag) {
            log::debug!("{} limits forbid oflag {:#o}", path, oflag);
            return Err(Errno::EACCES);
        }
        item.mark_open(oflag);
        Ok(handle)
    }

    fn open_dir(&mut self, path: &str, oflag: i32) -> Result<i32, Errno> {
        let dir = self.dirs.match_dir_mut(path).ok_or(Errno::ENOENT)?;
        if dir.is_open() {
            return Ok(dir.handle);
        }
        if oflag & O_ACCMODE != O_RDONLY {
            return Err(Errno::EACCES);
        }
        dir.flags = oflag;
        Ok(dir.handle)
    }

    //------------------------------------READ / WRITE------------------------------------
    pub fn read(&mut self, fd: i32, buf: &mut [u8]) -> Result<usize, Errno> {
        let len = buf.len().min(MAX_TRANSFER);
        let buf = &mut buf[..len];
        let item = self.open_channel_mut(fd)?;
        if !item.opened_for_read() {
            return Err(Errno::EINVAL);
        }
        let pos = item.position(PosWhence::Get, PosAccess::Read, 0)?;
        if pos.checked_add(len as i64).is_none() {
            return Err(Errno::EOVERFLOW);
        }

        let n = match devices::emu_handle_read(item.name(), buf) {
            Some(result) => result?,
            None => transfer_result(self.io.pread(fd, buf, pos))?,
        };
        // the borrow of self.io ended, take the item again
        let item = self.open_channel_mut(fd)?;
        if n > 0 {
            item.position(PosWhence::SetRelative, PosAccess::Read, n as i64)?;
        }
        Ok(n)
    }

    pub fn write(&mut self, fd: i32, buf: &[u8]) -> Result<usize, Errno> {
        let buf = &buf[..buf.len().min(MAX_TRANSFER)];
        let item = self.open_channel_mut(fd)?;
        if !item.opened_for_write() {
            return Err(Errno::EINVAL);
        }
        let pos = item.position(PosWhence::Get, PosAccess::Write, 0)?;
        if pos.checked_add(buf.len() as i64).is_none() {
            return Err(Errno::EOVERFLOW);
        }

        let n = match devices::emu_handle_write(item.name(), buf) {
            Some(result) => result?,
            None => transfer_result(self.io.pwrite(fd, buf, pos))?,
        };
        let item = self.open_channel_mut(fd)?;
        if n > 0 {
            let end = item.position(PosWhence::SetRelative, PosAccess::Write, n as i64)?;
            let random_write = matches!(
                item.access_type(),
                AccessType::SeqGetRandPut | AccessType::RandGetRandPut
            );
            if random_write && end > item.runtime.maxsize {
                item.runtime.maxsize = end;
            }
        }
        Ok(n)
    }

    //------------------------------------LSEEK------------------------------------
    pub fn lseek(&mut self, fd: i32, offset: i64, whence: i32) -> Result<i64, Errno> {
        let item = self.open_channel_mut(fd)?;
        match whence {
            SEEK_SET => item.position(PosWhence::SetAbsolute, PosAccess::Seek, offset),
            SEEK_CUR if offset == 0 => item.position(PosWhence::Get, PosAccess::Seek, 0),
            SEEK_CUR => item.position(PosWhence::SetRelative, PosAccess::Seek, offset),
            SEEK_END => {
                let target = item
                    .effective_size()
                    .checked_add(offset)
                    .ok_or(Errno::EOVERFLOW)?;
                item.position(PosWhence::SetAbsolute, PosAccess::Seek, target)
            }
            _ => Err(Errno::EINVAL),
        }
    }

    //------------------------------------STAT------------------------------------
    pub fn stat(&self, path: &str) -> Result<StatData, Errno> {
        if let Some((handle, item)) = self.registry.match_by_name(path) {
            return Ok(channel_stat(handle, item));
        }
        match self.dirs.match_dir(path) {
            Some(dir) => Ok(dir_stat(dir)),
            None => Err(Errno::ENOENT),
        }
    }

    pub fn fstat(&self, fd: i32) -> Result<StatData, Errno> {
        if let Some(item) = self.registry.get(fd) {
            return Ok(channel_stat(fd, item));
        }
        match self.dirs.match_handle(fd) {
            Some(dir) => Ok(dir_stat(dir)),
            None => Err(Errno::EBADF),
        }
    }

    //------------------------------------GETDENTS------------------------------------
    /*
     *   getdents() fills `buf` with as many whole records as fit, starting at
     *   the listing index stored for the handle, and stores the next index.
     *   Returns the number of bytes written; 0 once the listing is exhausted.
     */
    pub fn getdents(&mut self, fd: i32, buf: &mut [u8]) -> Result<usize, Errno> {
        if self.dirs.match_handle(fd).is_none() {
            return Err(Errno::EBADF);
        }
        let start = self
            .handle_allocator
            .get_offset(fd as u64)
            .unwrap_or_else(|e| panic!("directory handle {} lost its reservation: {}", fd, e));
        let start = usize::try_from(start).unwrap_or(0);

        let mut index = start;
        let mut written = 0;
        while let Some(child) = self.dirs.list(&self.registry, fd, index) {
            let name = child.name().as_bytes();
            let reclen = ClippedDirent::record_len(name.len());
            let d_reclen = u16::try_from(reclen).map_err(|_| Errno::ENAMETOOLONG)?;
            if written + reclen > buf.len() {
                break;
            }
            let d_type = match child {
                DirChild::Dir(_) => DT_DIR,
                DirChild::Channel(_, item) => dirent_type(item.permissions()),
            };
            let dirent = ClippedDirent {
                d_ino: inode_from_handle(child.handle()),
                d_off: (index + 1) as u64,
                d_reclen,
            };
            dirent.write_record(d_type, name, &mut buf[written..]);
            written += reclen;
            index += 1;
        }

        if written == 0 && self.dirs.list(&self.registry, fd, index).is_some() {
            return Err(Errno::EINVAL);
        }
        self.handle_allocator.set_offset(fd as u64, index as i64)?;
        log::trace!("getdents fd={} entries {}..{}", fd, start, index);
        Ok(written)
    }

    //------------------------------------CLOSE------------------------------------
    pub fn close(&mut self, fd: i32) -> Result<(), Errno> {
        let retain = self.config.retain_synthetic_size;
        if let Some(item) = self.registry.get_mut(fd) {
            if item.is_open() {
                item.mark_closed(retain);
                return Ok(());
            }
        }
        if let Some(dir) = self.dirs.match_handle_mut(fd) {
            if dir.is_open() {
                dir.flags = HANDLE_CLOSED;
                self.handle_allocator.set_offset(fd as u64, 0)?;
                return Ok(());
            }
        }
        Err(Errno::EBADF)
    }

    //------------------------------------FCNTL------------------------------------
    pub fn fcntl(&mut self, fd: i32, request: FcntlRequest) -> Result<FcntlReply, Errno> {
        let item = self.open_channel_mut(fd)?;
        match request {
            FcntlRequest::GetLock => Ok(FcntlReply::Lock(item.runtime.lock)),
            FcntlRequest::SetLock(lock) => {
                item.runtime.lock = lock;
                Ok(FcntlReply::Done)
            }
        }
    }

    //------------------------------------UNLINK------------------------------------
    /*
     *   Channels can never be removed: EPERM for an existing one, ENOENT
     *   otherwise.
     */
    pub fn unlink(&self, path: &str) -> Result<(), Errno> {
        match self.registry.match_by_name(path) {
            Some(_) => Err(Errno::EPERM),
            None => Err(Errno::ENOENT),
        }
    }

    /// Overrides the mode stat reports for channel `name`.
    pub fn set_channel_mode(&mut self, name: &str, mode: u32) -> Result<(), Errno> {
        let handle = match self.registry.match_by_name(name) {
            Some((handle, _)) => handle,
            None => return Err(Errno::ENOENT),
        };
        if let Some(item) = self.registry.get_mut(handle) {
            item.runtime.mode = mode;
        }
        Ok(())
    }
}

fn now() -> (u64, u64) {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| (d.as_secs(), d.subsec_nanos() as u64))
        .unwrap_or((0, 0))
}

fn fill_stat(ino: u64, mode: u32, nlink: u32, blksize: i32, size: i64) -> StatData {
    let blksize64 = blksize as i64;
    let blocks = (size.saturating_add(blksize64 - 1) / blksize64).saturating_mul(blksize64)
        / STAT_BLOCK_UNIT;
    let time = now();
    StatData {
        st_dev: DEV_DEVICE_ID,
        st_ino: ino,
        st_mode: mode,
        st_nlink: nlink,
        st_uid: DEV_OWNER_UID,
        st_gid: DEV_OWNER_GID,
        st_rdev: 0,
        st_size: size,
        st_blksize: blksize,
        st_blocks: blocks,
        st_atim: time,
        st_mtim: time,
        st_ctim: time,
    }
}

fn channel_stat(handle: i32, item: &ChannelItem) -> StatData {
    let mode = item.permissions();
    let blksize = match mode & S_IFMT {
        S_IFIFO | S_IFCHR => DEV_CHAR_DEVICE_BLK_SIZE,
        _ => DEV_BLOCK_DEVICE_BLK_SIZE,
    };
    fill_stat(
        inode_from_handle(handle),
        mode,
        1,
        blksize,
        item.effective_size(),
    )
}

fn dir_stat(dir: &DirEntry) -> StatData {
    fill_stat(
        inode_from_handle(dir.handle),
        S_IRUSR | S_IFDIR | S_IXUSR,
        dir.nlink,
        DEV_DIRECTORY_BLK_SIZE,
        DEV_DIRECTORY_SIZE,
    )
}

fn dirent_type(mode: u32) -> u8 {
    match mode & S_IFMT {
        S_IFIFO => DT_FIFO,
        S_IFCHR => DT_CHR,
        S_IFBLK => DT_BLK,
        S_IFDIR => DT_DIR,
        S_IFREG => DT_REG,
        _ => DT_UNKNOWN,
    }
}

impl MountsInterface for ChannelsMount {
    fn mount_id(&self) -> MountId {
        MountId::Channels
    }

    fn chown_syscall(&self, _path: &str, _uid: u32, _gid: u32) -> i32 {
        syscall_error(Errno::ENOSYS, "chown", "channel ownership is fixed")
    }

    fn chmod_syscall(&self, _path: &str, _mode: u32) -> i32 {
        syscall_error(Errno::EPERM, "chmod", "channel modes come from the manifest")
    }

    fn stat_syscall(&self, path: &str, statbuf: &mut StatData) -> i32 {
        syscall_ret(self.stat(path).map(|st| *statbuf = st).map(|_| 0), "stat")
    }

    fn mkdir_syscall(&mut self, _path: &str, _mode: u32) -> i32 {
        syscall_error(Errno::ENOSYS, "mkdir", "directories are implied by channel names")
    }

    fn rmdir_syscall(&mut self, _path: &str) -> i32 {
        syscall_error(Errno::ENOSYS, "rmdir", "directories are implied by channel names")
    }

    fn umount_syscall(&mut self, _path: &str) -> i32 {
        syscall_error(Errno::ENOSYS, "umount", "channels mount cannot host mounts")
    }

    fn mount_syscall(&mut self, _path: &str) -> i32 {
        syscall_error(Errno::ENOSYS, "mount", "channels mount cannot host mounts")
    }

    fn read_syscall(&mut self, fd: i32, buf: &mut [u8]) -> isize {
        syscall_ret(self.read(fd, buf).map(|n| n as isize), "read")
    }

    fn write_syscall(&mut self, fd: i32, buf: &[u8]) -> isize {
        syscall_ret(self.write(fd, buf).map(|n| n as isize), "write")
    }

    fn fchown_syscall(&self, _fd: i32, _uid: u32, _gid: u32) -> i32 {
        syscall_error(Errno::ENOSYS, "fchown", "channel ownership is fixed")
    }

    fn fchmod_syscall(&self, _fd: i32, _mode: u32) -> i32 {
        syscall_error(Errno::EPERM, "fchmod", "channel modes come from the manifest")
    }

    fn fstat_syscall(&self, fd: i32, statbuf: &mut StatData) -> i32 {
        syscall_ret(self.fstat(fd).map(|st| *statbuf = st).map(|_| 0), "fstat")
    }

    fn getdents_syscall(&mut self, fd: i32, buf: &mut [u8]) -> i32 {
        syscall_ret(self.getdents(fd, buf).map(|n| n as i32), "getdents")
    }

    fn fsync_syscall(&mut self, _fd: i32) -> i32 {
        syscall_error(Errno::ENOSYS, "fsync", "channels have nothing to flush")
    }

    fn close_syscall(&mut self, fd: i32) -> i32 {
        syscall_ret(self.close(fd).map(|_| 0), "close")
    }

    fn lseek_syscall(&mut self, fd: i32, offset: i64, whence: i32) -> i64 {
        syscall_ret(self.lseek(fd, offset, whence), "lseek")
    }

    fn open_syscall(&mut self, path: &str, oflag: i32, _mode: u32) -> i32 {
        syscall_ret(self.open(path, oflag), "open")
    }

    fn fcntl_syscall(&mut self, fd: i32, cmd: i32, lock: &mut FlockStruct) -> i32 {
        let request = match FcntlRequest::from_raw(cmd, lock) {
            Ok(request) => request,
            Err(e) => return syscall_error(e, "fcntl", "only lock commands are supported"),
        };
        match self.fcntl(fd, request) {
            Ok(FcntlReply::Lock(stored)) => {
                *lock = stored;
                0
            }
            Ok(FcntlReply::Done) => 0,
            Err(e) => syscall_error(e, "fcntl", e.message()),
        }
    }

    fn remove_syscall(&mut self, path: &str) -> i32 {
        syscall_ret(self.unlink(path).map(|_| 0), "remove")
    }

    fn unlink_syscall(&mut self, path: &str) -> i32 {
        syscall_ret(self.unlink(path).map(|_| 0), "unlink")
    }

    fn access_syscall(&self, _path: &str, _amode: i32) -> i32 {
        syscall_error(Errno::ENOSYS, "access", "use stat on channels")
    }

    fn ftruncate_syscall(&mut self, _fd: i32, _length: i64) -> i32 {
        syscall_error(Errno::ENOSYS, "ftruncate", "channel sizes are fixed")
    }

    fn truncate_syscall(&mut self, _path: &str, _length: i64) -> i32 {
        syscall_error(Errno::ENOSYS, "truncate", "channel sizes are fixed")
    }

    fn isatty_syscall(&self, _fd: i32) -> i32 {
        syscall_error(Errno::ENOSYS, "isatty", "channels are never terminals")
    }

    fn dup_syscall(&mut self, _fd: i32) -> i32 {
        syscall_error(Errno::ENOSYS, "dup", "channel handles cannot be duplicated")
    }

    fn dup2_syscall(&mut self, _oldfd: i32, _newfd: i32) -> i32 {
        syscall_error(Errno::ENOSYS, "dup2", "channel handles cannot be duplicated")
    }

    fn link_syscall(&mut self, _oldpath: &str, _newpath: &str) -> i32 {
        syscall_error(Errno::ENOSYS, "link", "channel names are fixed")
    }
}

impl MountSpecificInterface for ChannelsMount {
    fn check_handle(&self, handle: i32) -> bool {
        self.registry.get(handle).is_some()
    }

    fn handle_path(&self, handle: i32) -> Option<&str> {
        self.registry
            .get(handle)
            .filter(|item| item.is_open())
            .map(|item| item.name())
    }

    fn file_status_flags(&self, handle: i32) -> Result<i32, Errno> {
        match self.registry.get(handle) {
            Some(item) if item.is_open() => Ok(item.runtime.flags),
            _ => Err(Errno::EBADF),
        }
    }

    fn set_file_status_flags(&mut self, _handle: i32, _flags: i32) -> Result<i32, Errno> {
        Err(Errno::ENOSYS)
    }
}

/// Lets the page allocator copy an open channel into a file-backed mapping.
/// Reads go through the device layer and the primitive at an explicit
/// offset, so channel cursors do not move.
impl MapSource for ChannelsMount {
    fn source_size(&self, fd: i32) -> Result<u64, Errno> {
        match self.registry.get(fd) {
            Some(item) if item.is_open() => Ok(item.effective_size().max(0) as u64),
            _ => Err(Errno::EBADF),
        }
    }

    fn read_at(&self, fd: i32, buf: &mut [u8], offset: i64) -> Result<usize, Errno> {
        let item = match self.registry.get(fd) {
            Some(item) if item.is_open() => item,
            _ => return Err(Errno::EBADF),
        };
        if !item.opened_for_read() {
            return Err(Errno::EACCES);
        }
        let len = buf.len().min(MAX_TRANSFER);
        let buf = &mut buf[..len];
        match devices::emu_handle_read(item.name(), buf) {
            Some(result) => result,
            None => transfer_result(self.io.pread(fd, buf, offset)),
        }
    }
}
