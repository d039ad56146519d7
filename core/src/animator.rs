use crate::bigface::set_head_face;
use crate::constants::MAXLAYERS;
use crate::face_table::FaceTable;
use crate::map_grid::MapGrid;

/// Advances every animated layer in the view by one client tick.
///
/// Synchronized animation state in `faces` advances first so tiles that join
/// a synchronized animation later pick up the current phase. Fog cells are
/// not animated. Returns the number of layers whose displayed face changed.
pub fn advance(grid: &mut MapGrid, faces: &mut FaceTable) -> usize {
    faces.advance_sync();

    let mut changes: Vec<(i32, i32, usize, u16)> = Vec::new();

    for y in 0..grid.height() as i32 {
        for x in 0..grid.width() as i32 {
            let Some(cell) = grid.cell_mut(x, y) else {
                continue;
            };
            if cell.is_cleared() {
                continue;
            }

            for layer in 0..MAXLAYERS {
                let head = &mut cell.heads[layer];
                if head.animation == 0 {
                    continue;
                }
                let Some(animation) = faces.animation(head.animation) else {
                    continue;
                };
                if animation.frame_count() == 0 {
                    continue;
                }

                head.animation_left = head.animation_left.saturating_add(1);
                if head.animation_left < head.animation_speed.max(1) {
                    continue;
                }
                head.animation_left = 0;
                head.animation_phase =
                    ((head.animation_phase as usize + 1) % animation.frame_count()) as u16;
                changes.push((x, y, layer, animation.frame(head.animation_phase)));
            }
        }
    }

    let mut changed = 0;
    for (x, y, layer, face) in changes {
        if set_head_face(grid, faces, x, y, layer, face) {
            changed += 1;
        }
    }
    changed
}
