// File system, fcntl, dirent and mman constants.
// Values are the Linux asm-generic ones so guest libc sees bit-exact flags.
#![allow(dead_code)]

// ===== File Access Modes =====
// Source: include/uapi/asm-generic/fcntl.h
pub const O_RDONLY: i32 = 0o0; // Open read-only
pub const O_WRONLY: i32 = 0o1; // Open write-only
pub const O_RDWR: i32 = 0o2; // Open read-write
pub const O_ACCMODE: i32 = 0o3; // Mask for file access modes

// ===== File Creation and Status Flags =====
pub const O_CREAT: i32 = 0o100;
pub const O_EXCL: i32 = 0o200;
pub const O_TRUNC: i32 = 0o1000;
pub const O_APPEND: i32 = 0o2000;
pub const O_NONBLOCK: i32 = 0o4000;
pub const O_DIRECTORY: i32 = 0o200000; // Must be a directory
pub const O_CLOEXEC: i32 = 0o2000000;

// ===== File Types =====
// Source: include/uapi/linux/stat.h
pub const S_IFMT: u32 = 0o170000; // Bit mask for file type
pub const S_IFSOCK: u32 = 0o140000;
pub const S_IFLNK: u32 = 0o120000;
pub const S_IFREG: u32 = 0o100000;
pub const S_IFBLK: u32 = 0o060000;
pub const S_IFDIR: u32 = 0o040000;
pub const S_IFCHR: u32 = 0o020000;
pub const S_IFIFO: u32 = 0o010000;

// ===== Permission Bits =====
pub const S_IRWXU: u32 = 0o700;
pub const S_IRUSR: u32 = 0o400; // Owner read
pub const S_IWUSR: u32 = 0o200; // Owner write
pub const S_IXUSR: u32 = 0o100; // Owner execute
pub const S_IRWXG: u32 = 0o070;
pub const S_IRWXO: u32 = 0o007;
pub const S_IRWXA: u32 = S_IRWXU | S_IRWXG | S_IRWXO;

// ===== Seek =====
pub const SEEK_SET: i32 = 0;
pub const SEEK_CUR: i32 = 1;
pub const SEEK_END: i32 = 2;

// ===== fcntl Commands =====
pub const F_DUPFD: i32 = 0;
pub const F_GETFD: i32 = 1;
pub const F_SETFD: i32 = 2;
pub const F_GETFL: i32 = 3;
pub const F_SETFL: i32 = 4;
pub const F_GETLK: i32 = 5;
pub const F_SETLK: i32 = 6;
pub const F_SETLKW: i32 = 7;

// ===== Lock Types =====
pub const F_RDLCK: i16 = 0;
pub const F_WRLCK: i16 = 1;
pub const F_UNLCK: i16 = 2;

// ===== Directory Entry Types =====
// Source: include/dirent.h
pub const DT_UNKNOWN: u8 = 0;
pub const DT_FIFO: u8 = 1;
pub const DT_CHR: u8 = 2;
pub const DT_DIR: u8 = 4;
pub const DT_BLK: u8 = 6;
pub const DT_REG: u8 = 8;

// ===== Memory Protection =====
// Source: include/uapi/asm-generic/mman-common.h
pub const PROT_NONE: i32 = 0x0;
pub const PROT_READ: i32 = 0x1;
pub const PROT_WRITE: i32 = 0x2;
pub const PROT_EXEC: i32 = 0x4;

// ===== Mapping Flags =====
pub const MAP_SHARED: i32 = 0x01;
pub const MAP_PRIVATE: i32 = 0x02;
pub const MAP_FIXED: i32 = 0x10;
pub const MAP_ANONYMOUS: i32 = 0x20;

pub const MAP_FAILED: i64 = -1;

// ===== Heap Pages =====
// The heap arena is carved into 64 KiB pages, matching the guest page size.
pub const MAP_PAGESHIFT: u32 = 16;
pub const MAP_PAGESIZE: usize = 1 << MAP_PAGESHIFT;
