use crate::constants::{CellFlags, MAXLAYERS};

/// One layer slot of a map cell.
///
/// The same layout serves two roles. As a head it holds the face the server
/// sent for this tile plus animation state. As a tail it holds the face of a
/// big image anchored elsewhere, and `size_x`/`size_y` give the offset from
/// this tile to that anchor (anchor = this + offset).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapCellLayer {
    /// face id, 0 = nothing on this layer
    pub face: u16,
    pub size_x: u8,
    pub size_y: u8,
    /// animation id, 0 = not animated
    pub animation: u16,
    pub animation_speed: u8,
    pub animation_left: u8,
    pub animation_phase: u16,
}

impl MapCellLayer {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.face == 0
    }

    /// Offset from this tail to its head, in tiles.
    #[inline]
    pub fn offset(&self) -> (u8, u8) {
        (self.size_x, self.size_y)
    }

    pub fn clear_animation(&mut self) {
        self.animation = 0;
        self.animation_speed = 0;
        self.animation_left = 0;
        self.animation_phase = 0;
    }
}

/// Client-side map cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapCell {
    pub heads: [MapCellLayer; MAXLAYERS],
    pub tails: [MapCellLayer; MAXLAYERS],
    pub smooth: [u16; MAXLAYERS],
    /// 0 = lit, 255 = black
    pub darkness: u8,
    pub flags: CellFlags,
}

impl MapCell {
    /// A cell with nothing on any layer and no pending state.
    pub fn is_blank(&self) -> bool {
        self.heads.iter().all(MapCellLayer::is_empty)
            && self.tails.iter().all(MapCellLayer::is_empty)
            && self.darkness == 0
    }

    #[inline]
    pub fn is_cleared(&self) -> bool {
        self.flags.contains(CellFlags::CLEARED)
    }

    /// Turns the cell into fog of war: all faces and animations go away, the
    /// darkness value is kept.
    pub fn fog(&mut self) {
        self.heads = [MapCellLayer::default(); MAXLAYERS];
        self.tails = [MapCellLayer::default(); MAXLAYERS];
        self.flags.insert(CellFlags::CLEARED | CellFlags::NEEDS_REDRAW);
    }

    /// State of a tile that scrolled into view without data yet.
    pub fn revealed() -> Self {
        Self {
            flags: CellFlags::CLEARED | CellFlags::NEEDS_REDRAW,
            ..Self::default()
        }
    }
}
