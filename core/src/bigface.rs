//! Multi-tile ("big") faces.
//!
//! A big face is sent once, for its anchor tile (the bottom-right tile of the
//! image). The client writes tail entries into the tiles up and to the left
//! that the image covers; each tail stores the offset back to the anchor. The
//! tails are never trusted on their own: [`resolve_bigface`] re-checks the
//! live head every time, so a head that changed or went into fog makes its
//! old tails disappear instead of leaving image fragments behind.

use crate::constants::{CellFlags, MAXLAYERS};
use crate::face_table::FaceTable;
use crate::map_grid::MapGrid;
use crate::types::MapCellLayer;

/// Face to draw at `(x, y)` on `layer` plus the `(ww, hh)` offset of this
/// tile inside the face image, counted from the anchor tile.
///
/// Stale tails (anchor outside the view or no longer showing the same face)
/// are cleared and reported as blank.
pub fn resolve_bigface(grid: &mut MapGrid, x: i32, y: i32, layer: usize) -> (u16, u8, u8) {
    if layer >= MAXLAYERS {
        return (0, 0, 0);
    }
    let Some(cell) = grid.cell(x, y) else {
        return (0, 0, 0);
    };

    let head = cell.heads[layer];
    if head.face != 0 {
        return (head.face, 0, 0);
    }

    let tail = cell.tails[layer];
    if tail.face == 0 {
        return (0, 0, 0);
    }

    let (dx, dy) = tail.offset();
    let anchor_face = grid
        .cell(x + dx as i32, y + dy as i32)
        .map(|anchor| anchor.heads[layer].face);

    if anchor_face == Some(tail.face) {
        return (tail.face, dx, dy);
    }

    log::trace!(
        "stale tail at {x},{y} layer {layer}: face {} anchor {anchor_face:?}",
        tail.face
    );
    if let Some(cell) = grid.cell_mut(x, y) {
        cell.tails[layer] = MapCellLayer::default();
        cell.flags.insert(CellFlags::NEEDS_REDRAW);
    }
    (0, 0, 0)
}

/// Replaces the head face at `(x, y)` on `layer`, keeping tails consistent:
/// tails of the previous face are removed and tails for the new face are
/// written. Animation fields of the head are left alone.
///
/// Returns `false` when the face was already set (nothing changed).
pub(crate) fn set_head_face(
    grid: &mut MapGrid,
    faces: &FaceTable,
    x: i32,
    y: i32,
    layer: usize,
    face: u16,
) -> bool {
    let Some(cell) = grid.cell_mut(x, y) else {
        return false;
    };
    let old = cell.heads[layer].face;
    if old == face {
        return false;
    }
    cell.heads[layer].face = face;
    cell.heads[layer].size_x = 0;
    cell.heads[layer].size_y = 0;
    cell.flags.insert(CellFlags::NEEDS_REDRAW);

    if faces.is_big(old) {
        let (w, h) = faces.face_size(old);
        clear_tails(grid, x, y, layer, old, w, h);
    }
    if faces.is_big(face) {
        let (w, h) = faces.face_size(face);
        expand_tails(grid, x, y, layer, face, w, h);
    }
    true
}

/// Visits every tile a `w` x `h` face anchored at `(x, y)` covers, except the
/// anchor itself, with the offset from that tile back to the anchor.
fn for_each_tail(w: u8, h: u8, mut f: impl FnMut(u8, u8)) {
    for dx in 0..w {
        for dy in 0..h {
            if dx == 0 && dy == 0 {
                continue;
            }
            f(dx, dy);
        }
    }
}

fn expand_tails(grid: &mut MapGrid, x: i32, y: i32, layer: usize, face: u16, w: u8, h: u8) {
    for_each_tail(w, h, |dx, dy| {
        let Some(cell) = grid.cell_mut(x - dx as i32, y - dy as i32) else {
            return;
        };
        cell.tails[layer] = MapCellLayer {
            face,
            size_x: dx,
            size_y: dy,
            ..MapCellLayer::default()
        };
        cell.flags.insert(CellFlags::NEEDS_REDRAW);
    });
}

/// Only removes tails that still point at this anchor with this face; a tail
/// slot reused by another big face is kept.
fn clear_tails(grid: &mut MapGrid, x: i32, y: i32, layer: usize, face: u16, w: u8, h: u8) {
    for_each_tail(w, h, |dx, dy| {
        let Some(cell) = grid.cell_mut(x - dx as i32, y - dy as i32) else {
            return;
        };
        let tail = cell.tails[layer];
        if tail.face == face && tail.offset() == (dx, dy) {
            cell.tails[layer] = MapCellLayer::default();
            cell.flags.insert(CellFlags::NEEDS_REDRAW);
        }
    });
}
