use crate::constants::{ANIM_MASK, CMD_ANIM};
use crate::error::MapError;

/// Decoded `anim` command: animation id, flags and frame faces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimDefinition {
    pub id: u16,
    pub flags: u16,
    pub frames: Vec<u16>,
}

/// Decodes an `anim` payload: `u16 id, u16 flags, u16 face...`.
///
/// At least one frame is required and the frame list must be whole.
pub fn decode_anim(payload: &[u8]) -> Result<AnimDefinition, MapError> {
    let malformed = |offset| MapError::MalformedPayload {
        command: CMD_ANIM,
        offset,
        cells_applied: 0,
    };

    let mut p = 0usize;
    let id = read_u16_be!(payload, p).ok_or_else(|| malformed(p))?;
    let flags = read_u16_be!(payload, p).ok_or_else(|| malformed(p))?;

    let rest = payload.len() - p;
    if rest == 0 || rest % 2 != 0 {
        return Err(malformed(payload.len()));
    }

    let mut frames = Vec::with_capacity(rest / 2);
    while let Some(face) = read_u16_be!(payload, p) {
        frames.push(face);
    }

    Ok(AnimDefinition {
        id: id & ANIM_MASK,
        flags,
        frames,
    })
}
