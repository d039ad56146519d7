//! Map command decoders.
//!
//! Both wire generations are parsed one cell at a time into a [`CellUpdate`]
//! and only a completely parsed cell is applied. A payload that ends in the
//! middle of a cell stops the command with [`MapError::MalformedPayload`]; the
//! cells before it stay applied.
//!
//! [`MapError::MalformedPayload`]: crate::error::MapError::MalformedPayload

mod anim;
mod apply;
pub mod extended;
pub mod legacy;

pub use anim::{decode_anim, AnimDefinition};
pub use apply::apply_cell_update;

use crate::constants::MAXLAYERS;

/// Animation reference carried by an extended layer entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnimRef {
    pub id: u16,
    /// ANIM_RANDOM / ANIM_SYNC bits
    pub flags: u16,
    pub speed: u8,
}

/// Everything a command said about one layer of one cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayerUpdate {
    pub face: Option<u16>,
    pub animation: Option<AnimRef>,
    pub smooth: Option<u16>,
}

impl LayerUpdate {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.face.is_none() && self.animation.is_none() && self.smooth.is_none()
    }
}

/// One fully parsed cell of a map command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellUpdate {
    pub x: i32,
    pub y: i32,
    /// explicit "nothing here" marker (extended layout)
    pub clear: bool,
    /// darkness as sent on the wire (light level, 255 = fully lit)
    pub darkness: Option<u8>,
    pub layers: [LayerUpdate; MAXLAYERS],
}

impl CellUpdate {
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            clear: false,
            darkness: None,
            layers: [LayerUpdate::default(); MAXLAYERS],
        }
    }

    /// Whether the cell carries any visible data. A cell without it is fog.
    pub fn has_data(&self) -> bool {
        self.darkness.is_some() || self.layers.iter().any(|l| !l.is_empty())
    }
}

/// Counters for one decoded command, used for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeSummary {
    pub cells_applied: usize,
    pub cells_skipped: usize,
    pub cells_fogged: usize,
    pub scrolls: usize,
}
