//! Device-style channels served without touching the byte-transfer
//! primitive: `/dev/zero`, `/dev/null`, `/dev/full`, `/dev/random` and
//! `/dev/urandom`.
use rand::RngCore;
use sysdefs::constants::err_const::Errno;

use crate::channel::{AccessType, ChannelDescriptor, ChannelLimits};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Zero,
    Null,
    Full,
    Random,
    URandom,
}

impl DeviceKind {
    pub const ALL: [DeviceKind; 5] = [
        DeviceKind::Zero,
        DeviceKind::Null,
        DeviceKind::Full,
        DeviceKind::Random,
        DeviceKind::URandom,
    ];

    pub fn from_name(name: &str) -> Option<DeviceKind> {
        match name {
            "/dev/zero" => Some(DeviceKind::Zero),
            "/dev/null" => Some(DeviceKind::Null),
            "/dev/full" => Some(DeviceKind::Full),
            "/dev/random" => Some(DeviceKind::Random),
            "/dev/urandom" => Some(DeviceKind::URandom),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DeviceKind::Zero => "/dev/zero",
            DeviceKind::Null => "/dev/null",
            DeviceKind::Full => "/dev/full",
            DeviceKind::Random => "/dev/random",
            DeviceKind::URandom => "/dev/urandom",
        }
    }

    fn read(self, buf: &mut [u8]) -> Result<usize, Errno> {
        match self {
            DeviceKind::Zero | DeviceKind::Full => {
                buf.fill(0);
                Ok(buf.len())
            }
            DeviceKind::Null => Ok(0),
            DeviceKind::Random | DeviceKind::URandom => {
                rand::thread_rng().fill_bytes(buf);
                Ok(buf.len())
            }
        }
    }

    fn write(self, len: usize) -> Result<usize, Errno> {
        match self {
            DeviceKind::Full => Err(Errno::ENOSPC),
            _ => Ok(len),
        }
    }
}

/// Read interception. `None` means `name` is not an emulated device and the
/// read must go to the primitive.
pub fn emu_handle_read(name: &str, buf: &mut [u8]) -> Option<Result<usize, Errno>> {
    DeviceKind::from_name(name).map(|dev| dev.read(buf))
}

/// Write interception, same contract as [`emu_handle_read`].
pub fn emu_handle_write(name: &str, buf: &[u8]) -> Option<Result<usize, Errno>> {
    DeviceKind::from_name(name).map(|dev| dev.write(buf.len()))
}

/// Descriptors for every emulated device, ready to be passed as the
/// emulation-only channel list when building a mount.
pub fn emulated_channels() -> Vec<ChannelDescriptor> {
    DeviceKind::ALL
        .iter()
        .map(|dev| {
            ChannelDescriptor::new(
                dev.name(),
                AccessType::SeqGetSeqPut,
                ChannelLimits::read_write(),
                0,
            )
        })
        .collect()
}
