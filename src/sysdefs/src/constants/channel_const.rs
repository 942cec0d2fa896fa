// Identity values reported by stat for channel and directory nodes.
#![allow(dead_code)]

// ===== Device Identity =====
pub const DEV_DEVICE_ID: u64 = 2049; // st_dev for every node of the channel mount
pub const DEV_OWNER_UID: u32 = 1000;
pub const DEV_OWNER_GID: u32 = 1000;

// ===== Block Sizes =====
pub const DEV_CHAR_DEVICE_BLK_SIZE: i32 = 4096; // FIFO and char nodes
pub const DEV_BLOCK_DEVICE_BLK_SIZE: i32 = 65536; // random-access nodes
pub const DEV_DIRECTORY_BLK_SIZE: i32 = 4096;
pub const DEV_DIRECTORY_SIZE: i64 = 4096;

// st_blocks is always counted in these units
pub const STAT_BLOCK_UNIT: i64 = 512;

// ===== Handle Owners =====
// Identifies which mount reserved a handle in the shared handle table.
pub const MOUNT_KIND_CHANNELS: u32 = 1;
