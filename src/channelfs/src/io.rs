//! The byte-transfer primitive the mount delegates real channel I/O to.
use sysdefs::constants::err_const::Errno;

/// Positioned transfer on a channel handle, supplied by the host.
///
/// Both calls return the number of bytes moved, or a negative errno.
pub trait ChannelIo {
    fn pread(&self, handle: i32, buf: &mut [u8], offset: i64) -> i32;
    fn pwrite(&self, handle: i32, buf: &[u8], offset: i64) -> i32;
}

/// Turns a primitive return value into a byte count or an errno.
pub(crate) fn transfer_result(ret: i32) -> Result<usize, Errno> {
    if ret < 0 {
        Err(Errno::from_negative(ret))
    } else {
        Ok(ret as usize)
    }
}
