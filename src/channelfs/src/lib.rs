//! A POSIX file surface over a fixed set of named channels.
//!
//! The host declares channels up front (name, access type, limits, size).
//! This crate lets a guest open, read, write, seek, stat and list them as if
//! they were files in a directory tree:
//!
//! * [`registry`] holds the channels, one handle per channel;
//! * [`position`] decides which cursor each operation moves;
//! * [`devices`] answers `/dev/zero` and friends without host I/O;
//! * [`readdir`] derives directories from channel paths;
//! * [`mount`] ties it together behind [`MountsInterface`].
//!
//! Real transfers go through a host supplied [`ChannelIo`]; handle numbers
//! come from an [`fdtables::HandleAllocator`].
pub mod channel;
pub mod config;
pub mod devices;
pub mod io;
pub mod mount;
pub mod position;
pub mod readdir;
pub mod registry;

#[cfg(test)]
mod tests;

pub use channel::{AccessType, ChannelDescriptor, ChannelItem, ChannelLimits, ChannelRuntime};
pub use config::MountConfig;
pub use io::ChannelIo;
pub use mount::{
    ChannelsMount, FcntlReply, FcntlRequest, MountId, MountSpecificInterface, MountsInterface,
};
pub use registry::ChannelRegistry;
