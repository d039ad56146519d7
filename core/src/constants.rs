//! Constants module - map protocol limits, wire tags and per-cell flags

use bitflags::bitflags;

// =============================================================================
// Viewport limits
// =============================================================================

/// Largest viewport the protocol can address (6 bits per coordinate).
pub const MAX_VIEW: usize = 64;

/// Number of face layers stored per cell.
pub const MAXLAYERS: usize = 10;

/// Layers carried by the legacy `map1`/`map1a` layout (floor, middle, top).
pub const LEGACY_LAYERS: usize = 3;

/// Largest big face extent in tiles. Larger images are clipped to this size.
pub const MAX_FACE_SIZE: u8 = 16;

// =============================================================================
// Legacy layout (map1 / map1a)
// =============================================================================

/// Presence bit for the darkness byte.
pub const MAP1_DARKNESS_BIT: u16 = 0x8;

/// Presence bits for the three face layers, in read order floor, middle, top.
pub const MAP1_LAYER_BITS: [u16; LEGACY_LAYERS] = [0x4, 0x2, 0x1];

/// All presence bits of a legacy mask.
pub const MAP1_PRESENCE_MASK: u16 = 0xf;

// =============================================================================
// Extended layout (map2)
// =============================================================================

/// Coordinates are sent biased by this amount so big faces left/above the
/// view can be addressed.
pub const MAP2_COORD_OFFSET: i32 = 15;

/// Mask bit marking an embedded scroll instead of a cell.
pub const MAP2_SCROLL_BIT: u16 = 0x1;

/// Entry type byte terminating the current cell.
pub const MAP2_END_OF_CELL: u8 = 0xff;

pub const MAP2_TYPE_CLEAR: u8 = 0x00;
pub const MAP2_TYPE_DARKNESS: u8 = 0x01;
pub const MAP2_LAYER_START: u8 = 0x10;

/// Low bits of an entry type byte hold the type, the top 3 bits its length.
pub const MAP2_TYPE_MASK: u8 = 0x1f;
pub const MAP2_LENGTH_SHIFT: u8 = 5;

// =============================================================================
// Face / animation values
// =============================================================================

/// Set on a layer face value when it names an animation instead of a face.
pub const FACE_IS_ANIM: u16 = 1 << 15;

pub const ANIM_MASK: u16 = 0x1fff;
pub const ANIM_FLAGS_MASK: u16 = 0x6000;
pub const ANIM_RANDOM: u16 = 1 << 13;
pub const ANIM_SYNC: u16 = 2 << 13;

// =============================================================================
// Command names
// =============================================================================

pub const CMD_MAP1: &str = "map1";
pub const CMD_MAP1A: &str = "map1a";
pub const CMD_MAP2: &str = "map2";
pub const CMD_MAP_SCROLL: &str = "map_scroll";
pub const CMD_NEWMAP: &str = "newmap";
pub const CMD_ANIM: &str = "anim";

// =============================================================================
// Cell flags
// =============================================================================

bitflags! {
    /// Per-cell state bits. Every bit is independent of the others.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct CellFlags: u8 {
        /// the renderer has to repaint this cell
        const NEEDS_REDRAW = 1 << 0;
        /// darkness holds a value sent by the server
        const HAVE_DARKNESS = 1 << 1;
        /// smoothing of this cell has to be recomputed
        const NEEDS_RESMOOTH = 1 << 2;
        /// fog of war: not currently visible
        const CLEARED = 1 << 3;
    }
}
