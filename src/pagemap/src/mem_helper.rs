//! Page arithmetic shared by the arena and the allocator.
use sysdefs::constants::fs_const::{MAP_PAGESHIFT, MAP_PAGESIZE};

/// Fallback when the host refuses to report its page size.
const DEFAULT_PLATFORM_PAGESIZE: u64 = 4096;

/// Rounds `length` up to a whole number of heap pages.
pub fn round_up_page(length: u64) -> u64 {
    if length % MAP_PAGESIZE as u64 == 0 {
        length
    } else {
        ((length >> MAP_PAGESHIFT) + 1) << MAP_PAGESHIFT
    }
}

/// Number of heap pages needed to hold `length` bytes.
pub fn pages_for(length: u64) -> u64 {
    round_up_page(length) >> MAP_PAGESHIFT
}

/// Rounds `value` up to a multiple of `align` (a power of two). `None` if
/// the result does not fit.
pub fn align_up(value: u64, align: u64) -> Option<u64> {
    let mask = align - 1;
    value.checked_add(mask).map(|v| v & !mask)
}

/// Page size of the host, used to align the arena base.
pub fn platform_page_size() -> u64 {
    let ret = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if ret <= 0 {
        DEFAULT_PLATFORM_PAGESIZE
    } else {
        ret as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_rounding() {
        assert_eq!(round_up_page(0), 0);
        assert_eq!(round_up_page(1), 65536);
        assert_eq!(round_up_page(65536), 65536);
        assert_eq!(round_up_page(65537), 131072);
        assert_eq!(pages_for(100_000), 2);
    }

    #[test]
    fn alignment() {
        assert_eq!(align_up(0x1001, 0x1000), Some(0x2000));
        assert_eq!(align_up(0x2000, 0x1000), Some(0x2000));
        assert_eq!(align_up(u64::MAX, 0x1000), None);
        assert!(platform_page_size().is_power_of_two());
    }
}
