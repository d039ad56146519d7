use rand::Rng;

use crate::bigface::set_head_face;
use crate::constants::{ANIM_FLAGS_MASK, ANIM_RANDOM, ANIM_SYNC, CellFlags};
use crate::decoder::{AnimRef, CellUpdate, DecodeSummary};
use crate::face_table::FaceTable;
use crate::map_grid::MapGrid;

const NEIGHBOURS: [(i32, i32); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

/// Applies one parsed cell to the grid.
///
/// A cell outside the view is skipped. A cell without data (or with an
/// explicit clear) becomes fog; data after a clear is applied normally.
pub fn apply_cell_update(
    grid: &mut MapGrid,
    faces: &mut FaceTable,
    update: &CellUpdate,
    summary: &mut DecodeSummary,
) {
    let (x, y) = (update.x, update.y);
    if !grid.is_inside(x, y) {
        log::debug!(
            "map update for {x},{y} outside {}x{} view, skipped",
            grid.width(),
            grid.height()
        );
        summary.cells_skipped += 1;
        return;
    }

    let has_data = update.has_data();
    if update.clear || !has_data {
        if let Some(cell) = grid.cell_mut(x, y) {
            cell.fog();
        }
        if !has_data {
            summary.cells_fogged += 1;
            return;
        }
    }

    if let Some(cell) = grid.cell_mut(x, y) {
        if cell.is_cleared() {
            // Fog-era lighting is not carried over into the visible tile.
            cell.darkness = 0;
            cell.flags.remove(CellFlags::CLEARED | CellFlags::HAVE_DARKNESS);
            cell.flags.insert(CellFlags::NEEDS_REDRAW);
        }
    }

    for (layer, layer_update) in update.layers.iter().enumerate() {
        if let Some(anim) = layer_update.animation {
            apply_animation(grid, faces, x, y, layer, anim);
        } else if let Some(face) = layer_update.face {
            apply_face(grid, faces, x, y, layer, face);
        }
        if let Some(smooth) = layer_update.smooth {
            apply_smooth(grid, x, y, layer, smooth);
        }
    }

    if let Some(light) = update.darkness {
        apply_darkness(grid, x, y, light);
    }

    summary.cells_applied += 1;
}

fn apply_face(grid: &mut MapGrid, faces: &FaceTable, x: i32, y: i32, layer: usize, face: u16) {
    if let Some(cell) = grid.cell_mut(x, y) {
        let head = &mut cell.heads[layer];
        if head.animation != 0 {
            head.clear_animation();
            cell.flags.insert(CellFlags::NEEDS_REDRAW);
        }
    }
    set_head_face(grid, faces, x, y, layer, face);
}

fn apply_animation(
    grid: &mut MapGrid,
    faces: &mut FaceTable,
    x: i32,
    y: i32,
    layer: usize,
    anim: AnimRef,
) {
    let frame_count = match faces.animation(anim.id) {
        Some(animation) if animation.frame_count() > 0 => animation.frame_count(),
        _ => {
            log::warn!("map layer {layer} at {x},{y} uses unknown animation {}", anim.id);
            return;
        }
    };
    let is_sync = anim.flags & ANIM_FLAGS_MASK == ANIM_SYNC;

    if is_sync {
        if let Some(shared) = faces.animation_mut(anim.id) {
            shared.speed = anim.speed;
        }
    }

    let Some(cell) = grid.cell_mut(x, y) else {
        return;
    };
    let head = &mut cell.heads[layer];
    if head.animation == anim.id {
        // Still the same animation: keep it running.
        head.animation_speed = anim.speed;
        return;
    }

    let (phase, left) = match anim.flags & ANIM_FLAGS_MASK {
        ANIM_RANDOM => {
            let mut rng = rand::thread_rng();
            (
                rng.gen_range(0..frame_count) as u16,
                rng.gen_range(0..anim.speed.max(1)),
            )
        }
        ANIM_SYNC => faces
            .animation(anim.id)
            .map_or((0, 0), |shared| (shared.phase, shared.speed_left)),
        _ => (0, 0),
    };

    head.animation = anim.id;
    head.animation_speed = anim.speed;
    head.animation_left = left;
    head.animation_phase = phase;
    cell.flags.insert(CellFlags::NEEDS_REDRAW);

    let face = faces.animation(anim.id).map_or(0, |a| a.frame(phase));
    set_head_face(grid, faces, x, y, layer, face);
}

fn apply_smooth(grid: &mut MapGrid, x: i32, y: i32, layer: usize, smooth: u16) {
    let Some(cell) = grid.cell_mut(x, y) else {
        return;
    };
    if cell.smooth[layer] == smooth {
        return;
    }
    cell.smooth[layer] = smooth;
    cell.flags.insert(CellFlags::NEEDS_RESMOOTH);

    for (dx, dy) in NEIGHBOURS {
        if let Some(neighbour) = grid.cell_mut(x + dx, y + dy) {
            neighbour.flags.insert(CellFlags::NEEDS_RESMOOTH);
        }
    }
}

fn apply_darkness(grid: &mut MapGrid, x: i32, y: i32, light: u8) {
    let Some(cell) = grid.cell_mut(x, y) else {
        return;
    };
    let darkness = 255 - light;
    if cell.darkness != darkness || !cell.flags.contains(CellFlags::HAVE_DARKNESS) {
        cell.flags.insert(CellFlags::NEEDS_REDRAW);
    }
    cell.darkness = darkness;
    cell.flags.insert(CellFlags::HAVE_DARKNESS);
}
