//! Legacy map layout (`map1` / `map1a`).
//!
//! Every cell starts with a 16 bit mask:
//!
//! ```text
//! bits 15..10  x
//! bits  9..4   y
//! bit   3      darkness byte follows
//! bit   2      floor face (u16) follows
//! bit   1      middle face (u16) follows
//! bit   0      top face (u16) follows
//! ```
//!
//! Fields follow in that order. A mask without any of the low four bits means
//! the tile is no longer visible.

use crate::constants::{MAP1_DARKNESS_BIT, MAP1_LAYER_BITS, MAP1_PRESENCE_MASK};
use crate::decoder::{apply_cell_update, CellUpdate, DecodeSummary};
use crate::error::MapError;
use crate::face_table::FaceTable;
use crate::map_grid::MapGrid;

/// Parses one cell starting at `*offset`. The offset only moves past the
/// cell when it was complete.
pub fn parse_cell(bytes: &[u8], offset: &mut usize) -> Option<CellUpdate> {
    let mut p = *offset;
    let mask = read_u16_be!(bytes, p)?;

    let x = ((mask >> 10) & 0x3f) as i32;
    let y = ((mask >> 4) & 0x3f) as i32;
    let mut update = CellUpdate::new(x, y);

    if mask & MAP1_PRESENCE_MASK != 0 {
        if mask & MAP1_DARKNESS_BIT != 0 {
            update.darkness = Some(read_u8!(bytes, p)?);
        }
        for (layer, bit) in MAP1_LAYER_BITS.iter().enumerate() {
            if mask & bit != 0 {
                update.layers[layer].face = Some(read_u16_be!(bytes, p)?);
            }
        }
    }

    *offset = p;
    Some(update)
}

/// Decodes a whole `map1`/`map1a` payload into the grid.
pub fn apply(
    grid: &mut MapGrid,
    faces: &mut FaceTable,
    command: &'static str,
    payload: &[u8],
) -> Result<DecodeSummary, MapError> {
    let mut summary = DecodeSummary::default();
    let mut offset = 0usize;

    while offset < payload.len() {
        let Some(update) = parse_cell(payload, &mut offset) else {
            return Err(MapError::MalformedPayload {
                command,
                offset,
                cells_applied: summary.cells_applied,
            });
        };
        apply_cell_update(grid, faces, &update, &mut summary);
    }

    Ok(summary)
}

/// Encodes the mask of a legacy cell.
pub fn encode_mask(x: u8, y: u8, presence: u16) -> u16 {
    ((x as u16 & 0x3f) << 10) | ((y as u16 & 0x3f) << 4) | (presence & MAP1_PRESENCE_MASK)
}
