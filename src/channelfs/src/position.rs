//! Cursor state machine for the four channel access types.
//!
//! Every channel keeps a sequential and a random cursor. Which one a read, a
//! write or an explicit seek touches depends on the access type:
//!
//! | access type      | read       | write      | lseek                             |
//! |------------------|------------|------------|-----------------------------------|
//! | `SeqGetSeqPut`   | sequential | sequential | query only                        |
//! | `RandGetSeqPut`  | random     | sequential | random if opened for reading      |
//! | `SeqGetRandPut`  | sequential | random     | random if opened for writing      |
//! | `RandGetRandPut` | random     | random     | random                            |
//!
//! A query never changes anything. A set computes the candidate offset first
//! and refuses it with EOVERFLOW when it would be negative.
use sysdefs::constants::err_const::Errno;
use sysdefs::constants::fs_const::{O_ACCMODE, O_RDONLY, O_RDWR, O_WRONLY};

use crate::channel::{AccessType, ChannelItem, ChannelRuntime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosWhence {
    Get,
    SetAbsolute,
    SetRelative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosAccess {
    Seek,
    Read,
    Write,
}

fn set_safe_offset(whence: PosWhence, cursor: &mut i64, offset: i64) -> Result<i64, Errno> {
    let candidate = match whence {
        PosWhence::SetAbsolute => Some(offset),
        PosWhence::SetRelative => cursor.checked_add(offset),
        PosWhence::Get => return Ok(*cursor),
    };
    match candidate {
        Some(pos) if pos >= 0 => {
            *cursor = pos;
            Ok(pos)
        }
        _ => Err(Errno::EOVERFLOW),
    }
}

fn seq_get_seq_put(
    rt: &mut ChannelRuntime,
    whence: PosWhence,
    access: PosAccess,
    offset: i64,
) -> Result<i64, Errno> {
    if whence == PosWhence::Get {
        return Ok(rt.sequential_pos);
    }
    match access {
        PosAccess::Seek => Err(Errno::ESPIPE),
        PosAccess::Read | PosAccess::Write => {
            set_safe_offset(whence, &mut rt.sequential_pos, offset)
        }
    }
}

fn rand_get_seq_put(
    rt: &mut ChannelRuntime,
    whence: PosWhence,
    access: PosAccess,
    offset: i64,
) -> Result<i64, Errno> {
    match access {
        PosAccess::Seek => match rt.flags & O_ACCMODE {
            O_RDONLY | O_RDWR => set_safe_offset(whence, &mut rt.random_pos, offset),
            _ if whence == PosWhence::Get => Ok(rt.sequential_pos),
            _ => Err(Errno::ESPIPE),
        },
        PosAccess::Read => set_safe_offset(whence, &mut rt.random_pos, offset),
        PosAccess::Write => set_safe_offset(whence, &mut rt.sequential_pos, offset),
    }
}

fn seq_get_rand_put(
    rt: &mut ChannelRuntime,
    whence: PosWhence,
    access: PosAccess,
    offset: i64,
) -> Result<i64, Errno> {
    match access {
        PosAccess::Seek => match rt.flags & O_ACCMODE {
            O_WRONLY | O_RDWR => set_safe_offset(whence, &mut rt.random_pos, offset),
            _ if whence == PosWhence::Get => Ok(rt.sequential_pos),
            _ => Err(Errno::ESPIPE),
        },
        PosAccess::Read => set_safe_offset(whence, &mut rt.sequential_pos, offset),
        PosAccess::Write => set_safe_offset(whence, &mut rt.random_pos, offset),
    }
}

fn rand_get_rand_put(
    rt: &mut ChannelRuntime,
    whence: PosWhence,
    _access: PosAccess,
    offset: i64,
) -> Result<i64, Errno> {
    set_safe_offset(whence, &mut rt.random_pos, offset)
}

/// Queries or moves the cursor that `access` uses on a channel of type
/// `access_type`.
///
/// Input:
///     - whence: query, absolute set, or relative advance
///     - access: which operation the cursor is for
///     - offset: new absolute offset or delta; ignored for queries
///
/// Return:
///     - the (possibly new) cursor value
///     - ESPIPE for a seek the channel cannot honor, EOVERFLOW for an offset
///       that would go negative
pub fn channel_pos(
    access_type: AccessType,
    rt: &mut ChannelRuntime,
    whence: PosWhence,
    access: PosAccess,
    offset: i64,
) -> Result<i64, Errno> {
    match access_type {
        AccessType::SeqGetSeqPut => seq_get_seq_put(rt, whence, access, offset),
        AccessType::RandGetSeqPut => rand_get_seq_put(rt, whence, access, offset),
        AccessType::SeqGetRandPut => seq_get_rand_put(rt, whence, access, offset),
        AccessType::RandGetRandPut => rand_get_rand_put(rt, whence, access, offset),
    }
}

impl ChannelItem {
    pub fn position(
        &mut self,
        whence: PosWhence,
        access: PosAccess,
        offset: i64,
    ) -> Result<i64, Errno> {
        channel_pos(self.descriptor.access_type, &mut self.runtime, whence, access, offset)
    }

    /// Current cursor for `access`, without touching anything.
    pub fn current_pos(&self, access: PosAccess) -> i64 {
        let mut rt = self.runtime.clone();
        // a query cannot fail
        channel_pos(self.descriptor.access_type, &mut rt, PosWhence::Get, access, 0).unwrap_or(0)
    }
}
