//! Definitions shared by the channel mount, the handle table and the page
//! allocator: errno values with the last-error convention, Linux-compatible
//! constants, and the plain structs returned through the syscall surface.
pub mod constants;
pub mod data;
