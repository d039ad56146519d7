//! Extended map layout (`map2`).
//!
//! Each item starts with a 16 bit mask. Coordinates are biased by
//! `MAP2_COORD_OFFSET`; bit 0 turns the item into an embedded scroll by
//! `(x, y)`. A cell is followed by entries, each introduced by a type byte
//! whose top three bits give the number of payload bytes and whose low five
//! bits give the type. `0xff` ends the cell.
//!
//! Layer entries carry a u16 face. With `FACE_IS_ANIM` set the value is an
//! animation reference; a third byte is then the animation speed (smoothing
//! otherwise) and a fourth byte is smoothing.

use crate::constants::{
    ANIM_FLAGS_MASK, ANIM_MASK, FACE_IS_ANIM, MAP2_COORD_OFFSET, MAP2_END_OF_CELL,
    MAP2_LAYER_START, MAP2_LENGTH_SHIFT, MAP2_SCROLL_BIT, MAP2_TYPE_CLEAR, MAP2_TYPE_DARKNESS,
    MAP2_TYPE_MASK, MAXLAYERS,
};
use crate::decoder::{apply_cell_update, AnimRef, CellUpdate, DecodeSummary};
use crate::error::MapError;
use crate::face_table::FaceTable;
use crate::map_grid::MapGrid;

/// One item of a `map2` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Map2Item {
    Scroll { dx: i32, dy: i32 },
    Cell(CellUpdate),
}

/// Parses one item starting at `*offset`. The offset only moves past the
/// item when it was complete, including the cell terminator.
pub fn parse_item(bytes: &[u8], offset: &mut usize) -> Option<Map2Item> {
    let mut p = *offset;
    let mask = read_u16_be!(bytes, p)?;
    let x = ((mask >> 10) & 0x3f) as i32 - MAP2_COORD_OFFSET;
    let y = ((mask >> 4) & 0x3f) as i32 - MAP2_COORD_OFFSET;

    if mask & MAP2_SCROLL_BIT != 0 {
        *offset = p;
        return Some(Map2Item::Scroll { dx: x, dy: y });
    }

    let mut update = CellUpdate::new(x, y);
    loop {
        let tag = read_u8!(bytes, p)?;
        if tag == MAP2_END_OF_CELL {
            break;
        }
        let len = (tag >> MAP2_LENGTH_SHIFT) as usize;
        let entry_type = tag & MAP2_TYPE_MASK;

        match entry_type {
            MAP2_TYPE_CLEAR => {
                update.clear = true;
                update.darkness = None;
                update.layers = Default::default();
            }
            MAP2_TYPE_DARKNESS => {
                update.darkness = Some(read_u8!(bytes, p)?);
            }
            t if t >= MAP2_LAYER_START && ((t - MAP2_LAYER_START) as usize) < MAXLAYERS => {
                let layer = (t - MAP2_LAYER_START) as usize;
                let value = read_u16_be!(bytes, p)?;
                let entry = &mut update.layers[layer];

                let is_anim = value & FACE_IS_ANIM != 0;
                let mut anim = AnimRef {
                    id: value & ANIM_MASK,
                    flags: value & ANIM_FLAGS_MASK,
                    speed: 0,
                };
                if len > 2 {
                    let opt = read_u8!(bytes, p)?;
                    if is_anim {
                        anim.speed = opt;
                    } else {
                        entry.smooth = Some(opt as u16);
                    }
                }
                if len > 3 {
                    entry.smooth = Some(read_u8!(bytes, p)? as u16);
                }

                if is_anim {
                    entry.animation = Some(anim);
                    entry.face = None;
                } else {
                    entry.face = Some(value);
                    entry.animation = None;
                }
            }
            t if t >= MAP2_LAYER_START => {
                log::warn!(
                    "map2: layer {} at {x},{y} exceeds {MAXLAYERS} layers, skipped",
                    t - MAP2_LAYER_START
                );
                skip_bytes!(bytes, p, len)?;
            }
            other => {
                log::debug!("map2: skipping unknown entry type {other:#04x} ({len} bytes)");
                skip_bytes!(bytes, p, len)?;
            }
        }
    }

    *offset = p;
    Some(Map2Item::Cell(update))
}

/// Decodes a whole `map2` payload into the grid, scrolling in place when the
/// payload embeds a scroll.
pub fn apply(
    grid: &mut MapGrid,
    faces: &mut FaceTable,
    payload: &[u8],
) -> Result<DecodeSummary, MapError> {
    let mut summary = DecodeSummary::default();
    let mut offset = 0usize;

    while offset < payload.len() {
        let Some(item) = parse_item(payload, &mut offset) else {
            return Err(MapError::MalformedPayload {
                command: crate::constants::CMD_MAP2,
                offset,
                cells_applied: summary.cells_applied,
            });
        };
        match item {
            Map2Item::Scroll { dx, dy } => {
                grid.scroll(dx, dy);
                summary.scrolls += 1;
            }
            Map2Item::Cell(update) => apply_cell_update(grid, faces, &update, &mut summary),
        }
    }

    Ok(summary)
}

/// Encodes an item mask for view coordinate `(x, y)`.
pub fn encode_mask(x: i32, y: i32, scroll: bool) -> u16 {
    let bx = ((x + MAP2_COORD_OFFSET) as u16) & 0x3f;
    let by = ((y + MAP2_COORD_OFFSET) as u16) & 0x3f;
    (bx << 10) | (by << 4) | if scroll { MAP2_SCROLL_BIT } else { 0 }
}

/// Type byte of an entry with `len` payload bytes.
pub fn encode_tag(entry_type: u8, len: u8) -> u8 {
    (len << MAP2_LENGTH_SHIFT) | (entry_type & MAP2_TYPE_MASK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{ANIM_SYNC, CellFlags};

    fn cell_header(buf: &mut Vec<u8>, x: i32, y: i32) {
        buf.extend_from_slice(&encode_mask(x, y, false).to_be_bytes());
    }

    fn layer_face(buf: &mut Vec<u8>, layer: u8, face: u16) {
        buf.push(encode_tag(MAP2_LAYER_START + layer, 2));
        buf.extend_from_slice(&face.to_be_bytes());
    }

    #[test]
    fn coordinates_are_biased() {
        let mut buf = Vec::new();
        cell_header(&mut buf, 0, 3);
        buf.push(MAP2_END_OF_CELL);

        let mut offset = 0;
        let Some(Map2Item::Cell(update)) = parse_item(&buf, &mut offset) else {
            panic!("expected a cell");
        };
        assert_eq!((update.x, update.y), (0, 3));
        assert!(!update.has_data());
        assert_eq!(offset, buf.len());
    }

    #[test]
    fn scroll_mask_is_parsed() {
        let buf = encode_mask(-1, 2, true).to_be_bytes();
        let mut offset = 0;
        assert_eq!(
            parse_item(&buf, &mut offset),
            Some(Map2Item::Scroll { dx: -1, dy: 2 })
        );
        assert_eq!(offset, 2);
    }

    #[test]
    fn layer_entry_with_smoothing() {
        let mut buf = Vec::new();
        cell_header(&mut buf, 4, 4);
        buf.push(encode_tag(MAP2_LAYER_START + 7, 3));
        buf.extend_from_slice(&0x0123u16.to_be_bytes());
        buf.push(9);
        buf.push(encode_tag(MAP2_TYPE_DARKNESS, 1));
        buf.push(30);
        buf.push(MAP2_END_OF_CELL);

        let mut offset = 0;
        let Some(Map2Item::Cell(update)) = parse_item(&buf, &mut offset) else {
            panic!("expected a cell");
        };
        assert_eq!(update.layers[7].face, Some(0x0123));
        assert_eq!(update.layers[7].smooth, Some(9));
        assert_eq!(update.darkness, Some(30));
    }

    #[test]
    fn animation_entry_with_speed_and_smoothing() {
        let mut buf = Vec::new();
        cell_header(&mut buf, 1, 1);
        buf.push(encode_tag(MAP2_LAYER_START, 4));
        buf.extend_from_slice(&(FACE_IS_ANIM | ANIM_SYNC | 33).to_be_bytes());
        buf.push(6);
        buf.push(2);
        buf.push(MAP2_END_OF_CELL);

        let mut offset = 0;
        let Some(Map2Item::Cell(update)) = parse_item(&buf, &mut offset) else {
            panic!("expected a cell");
        };
        let layer = update.layers[0];
        assert_eq!(layer.face, None);
        assert_eq!(
            layer.animation,
            Some(AnimRef {
                id: 33,
                flags: ANIM_SYNC,
                speed: 6
            })
        );
        assert_eq!(layer.smooth, Some(2));
    }

    #[test]
    fn unknown_entry_is_skipped() {
        let mut buf = Vec::new();
        cell_header(&mut buf, 2, 2);
        buf.push(encode_tag(0x05, 3));
        buf.extend_from_slice(&[1, 2, 3]);
        layer_face(&mut buf, 0, 50);
        buf.push(MAP2_END_OF_CELL);

        let mut offset = 0;
        let Some(Map2Item::Cell(update)) = parse_item(&buf, &mut offset) else {
            panic!("expected a cell");
        };
        assert_eq!(update.layers[0].face, Some(50));
    }

    #[test]
    fn missing_terminator_is_truncation() {
        let mut buf = Vec::new();
        cell_header(&mut buf, 2, 2);
        layer_face(&mut buf, 0, 50);

        let mut offset = 0;
        assert!(parse_item(&buf, &mut offset).is_none());
        assert_eq!(offset, 0);
    }

    #[test]
    fn apply_handles_scroll_and_cells() {
        let mut grid = MapGrid::with_size(11, 11).unwrap();
        let mut faces = FaceTable::new();
        faces.register_animation(33, ANIM_SYNC, vec![70, 71]);

        let mut first = Vec::new();
        cell_header(&mut first, 5, 5);
        layer_face(&mut first, 0, 20);
        first.push(MAP2_END_OF_CELL);
        apply(&mut grid, &mut faces, &first).unwrap();

        let mut buf = Vec::new();
        buf.extend_from_slice(&encode_mask(1, 0, true).to_be_bytes());
        cell_header(&mut buf, -2, 3);
        layer_face(&mut buf, 0, 9);
        buf.push(MAP2_END_OF_CELL);
        cell_header(&mut buf, 0, 0);
        buf.push(encode_tag(MAP2_LAYER_START + 9, 2));
        buf.extend_from_slice(&(FACE_IS_ANIM | 33).to_be_bytes());
        buf.push(MAP2_END_OF_CELL);

        let summary = apply(&mut grid, &mut faces, &buf).unwrap();

        assert_eq!(summary.scrolls, 1);
        assert_eq!(summary.cells_skipped, 1);
        assert_eq!(summary.cells_applied, 1);
        assert_eq!(grid.face_at(4, 5, 0), 20);
        assert_eq!(grid.face_at(5, 5, 0), 0);
        assert_eq!(grid.face_at(0, 0, 9), 70);
        assert!(grid.cell(10, 0).unwrap().flags.contains(CellFlags::CLEARED));
    }

    #[test]
    fn clear_entry_marks_fog() {
        let mut grid = MapGrid::with_size(11, 11).unwrap();
        let mut faces = FaceTable::new();
        let mut buf = Vec::new();
        cell_header(&mut buf, 3, 3);
        layer_face(&mut buf, 2, 15);
        buf.push(MAP2_END_OF_CELL);
        cell_header(&mut buf, 3, 3);
        buf.push(encode_tag(MAP2_TYPE_CLEAR, 0));
        buf.push(MAP2_END_OF_CELL);

        apply(&mut grid, &mut faces, &buf).unwrap();

        let cell = grid.cell(3, 3).unwrap();
        assert!(cell.is_cleared());
        assert_eq!(cell.heads[2].face, 0);
    }

    #[test]
    fn truncated_payload_reports_offset() {
        let mut grid = MapGrid::with_size(11, 11).unwrap();
        let mut faces = FaceTable::new();
        let mut buf = Vec::new();
        cell_header(&mut buf, 1, 1);
        layer_face(&mut buf, 0, 5);
        buf.push(MAP2_END_OF_CELL);
        let second = buf.len();
        cell_header(&mut buf, 2, 1);
        buf.push(encode_tag(MAP2_LAYER_START, 2));
        buf.push(0);

        let err = apply(&mut grid, &mut faces, &buf).unwrap_err();

        assert_eq!(
            err,
            MapError::MalformedPayload {
                command: "map2",
                offset: second,
                cells_applied: 1,
            }
        );
        assert_eq!(grid.face_at(1, 1, 0), 5);
    }
}
