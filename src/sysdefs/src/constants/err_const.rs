//! Errno values and the last-error convention used by every `*_syscall`
//! entry point.
//!
//! Internal operations return `Result<T, Errno>`. The POSIX-facing wrappers
//! collapse that into a sentinel (`-1`) and record the code so that callers
//! can fetch it with [`get_errno`].
// Let's not have clippy warn for EAGAIN, etc.
#![allow(clippy::upper_case_acronyms)]

use std::cell::Cell;
use std::fmt;

macro_rules! reversible_enum {
    ($(#[$settings: meta])* $visibility: vis enum $enumname:ident {
        $($valuename: ident = $value: literal => $msg: expr,)*
    }) => {
        $(#[$settings])*
        $visibility enum $enumname {
            $($valuename = $value,)*
        }

        impl $enumname {
            /// Maps a raw errno code back to its variant.
            $visibility fn from_discriminant(v: i32) -> Result<Self, ()> {
                match v {
                    $($value => Ok($enumname::$valuename),)*
                    _ => Err(()),
                }
            }

            /// Short human readable description, as `strerror` would give.
            $visibility fn message(&self) -> &'static str {
                match self {
                    $($enumname::$valuename => $msg,)*
                }
            }
        }
    }
}

reversible_enum! {
    #[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
    #[repr(i32)]
    /// Errno values surfaced by the mount and the page allocator.
    /// Values match Linux asm-generic.
    pub enum Errno {
        EPERM = 1 => "Operation not permitted",
        ENOENT = 2 => "No such file or directory",
        EINTR = 4 => "Interrupted system call",
        EIO = 5 => "I/O error",
        ENXIO = 6 => "No such device or address",
        EBADF = 9 => "Bad file number",
        EAGAIN = 11 => "Try again",
        ENOMEM = 12 => "Out of memory",
        EACCES = 13 => "Permission denied",
        EFAULT = 14 => "Bad address",
        EBUSY = 16 => "Device or resource busy",
        EEXIST = 17 => "File exists",
        ENODEV = 19 => "No such device",
        ENOTDIR = 20 => "Not a directory",
        EISDIR = 21 => "Is a directory",
        EINVAL = 22 => "Invalid argument",
        EMFILE = 24 => "Too many open files",
        ENOTTY = 25 => "Not a typewriter",
        EFBIG = 27 => "File too large",
        ENOSPC = 28 => "No space left on device",
        ESPIPE = 29 => "Illegal seek",
        EROFS = 30 => "Read-only file system",
        EPIPE = 32 => "Broken pipe",
        ERANGE = 34 => "Math result not representable",
        ENAMETOOLONG = 36 => "File name too long",
        ENOLCK = 37 => "No record locks available",
        ENOSYS = 38 => "Function not implemented",
        ENOTEMPTY = 39 => "Directory not empty",
        EOVERFLOW = 75 => "Value too large for defined data type",
        EBADFD = 77 => "File descriptor in bad state",
    }
}

impl Errno {
    /// Converts the negative return of a byte-transfer primitive
    /// (`-errno`) into a variant. Unknown codes become `EIO`.
    pub fn from_negative(ret: i32) -> Errno {
        Errno::from_discriminant(ret.saturating_neg()).unwrap_or(Errno::EIO)
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.message())
    }
}

impl std::error::Error for Errno {}

thread_local! {
    // Only one logical thread drives a mount, so per-thread storage behaves
    // like the process-wide errno of the emulated program.
    static LAST_ERRNO: Cell<i32> = const { Cell::new(0) };
}

/// Returns the errno recorded by the most recent failing syscall.
pub fn get_errno() -> i32 {
    LAST_ERRNO.with(|e| e.get())
}

pub fn set_errno(code: i32) {
    LAST_ERRNO.with(|e| e.set(code));
}

/// Records `e` as the last error, logs the failure and returns the `-1`
/// sentinel.
pub fn syscall_error(e: Errno, syscall: &str, message: &str) -> i32 {
    set_errno(e as i32);
    log::debug!("{}: {} [{}]", syscall, message, e);
    -1
}

/// Collapses an internal result into the syscall return convention: the
/// value on success, `-1` with errno recorded on failure.
pub fn syscall_ret<T: From<i8>>(result: Result<T, Errno>, syscall: &str) -> T {
    match result {
        Ok(v) => v,
        Err(e) => T::from(syscall_error(e, syscall, e.message()) as i8),
    }
}
