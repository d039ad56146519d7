use crate::map_grid::MapGrid;
use crate::types::MapCell;

impl MapGrid {
    /// Shifts the view so that afterwards cell `(x, y)` holds what was at
    /// `(x + dx, y + dy)`.
    ///
    /// Tiles without a source are left blank and marked as fog until the
    /// server sends them. The move happens in place: rows are visited in the
    /// direction of `dy` so a source row is always read before it is
    /// overwritten, and each row segment is a memmove so `dx` may overlap.
    pub fn scroll(&mut self, dx: i32, dy: i32) {
        let width = self.width() as i32;
        let height = self.height() as i32;
        if width == 0 || height == 0 || (dx == 0 && dy == 0) {
            return;
        }

        log::debug!("scroll {dx},{dy} on {width}x{height}");

        if dx.unsigned_abs() >= width as u32 || dy.unsigned_abs() >= height as u32 {
            for y in 0..height {
                for x in 0..width {
                    if let Some(cell) = self.cell_mut(x, y) {
                        *cell = MapCell::revealed();
                    }
                }
            }
            return;
        }

        let len = (width - dx.abs()) as usize;
        let src_x = dx.max(0) as usize;
        let dst_x = (-dx).max(0) as usize;

        if dy >= 0 {
            for y in 0..height - dy {
                self.move_row_segment(src_x, (y + dy) as usize, dst_x, y as usize, len);
            }
        } else {
            for y in (-dy..height).rev() {
                self.move_row_segment(src_x, (y + dy) as usize, dst_x, y as usize, len);
            }
        }

        for y in 0..height {
            let row_revealed = !(0..height).contains(&(y + dy));
            for x in 0..width {
                if row_revealed || !(0..width).contains(&(x + dx)) {
                    if let Some(cell) = self.cell_mut(x, y) {
                        *cell = MapCell::revealed();
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::map_grid::MapGrid;

    fn marked_grid(width: usize, height: usize) -> MapGrid {
        let mut grid = MapGrid::with_size(width, height).unwrap();
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                let cell = grid.cell_mut(x, y).unwrap();
                cell.heads[0].face = (y * 100 + x + 1) as u16;
                cell.darkness = (x * 7 + y) as u8;
            }
        }
        grid
    }

    fn check_scroll(width: usize, height: usize, dx: i32, dy: i32) {
        let before = marked_grid(width, height);
        let mut after = before.clone();
        after.scroll(dx, dy);

        for y in 0..height as i32 {
            for x in 0..width as i32 {
                let got = after.cell(x, y).unwrap();
                match before.cell(x + dx, y + dy) {
                    Some(src) => assert_eq!(got, src, "({x},{y}) after scroll {dx},{dy}"),
                    None => {
                        assert!(got.is_blank(), "({x},{y}) should be blank");
                        assert!(got.is_cleared(), "({x},{y}) should be fog");
                    }
                }
            }
        }
    }

    #[test]
    fn scroll_every_direction() {
        for dy in -2..=2 {
            for dx in -2..=2 {
                check_scroll(7, 5, dx, dy);
            }
        }
    }

    #[test]
    fn scroll_zero_is_noop() {
        let before = marked_grid(4, 4);
        let mut after = before.clone();
        after.scroll(0, 0);
        assert_eq!(before, after);
    }

    #[test]
    fn scroll_past_dimension_resets_everything() {
        let mut grid = marked_grid(5, 3);
        grid.scroll(0, 3);
        assert!(grid.iter_cells().all(|(_, _, c)| c.is_blank() && c.is_cleared()));

        let mut grid = marked_grid(5, 3);
        grid.scroll(-7, 1);
        assert!(grid.iter_cells().all(|(_, _, c)| c.is_blank() && c.is_cleared()));
    }

    #[test]
    fn extreme_offsets_reset_everything() {
        for (dx, dy) in [(i32::MIN, 0), (0, i32::MIN), (i32::MAX, 1), (-1, i32::MAX)] {
            let mut grid = marked_grid(5, 3);
            grid.scroll(dx, dy);
            assert!(grid.iter_cells().all(|(_, _, c)| c.is_blank() && c.is_cleared()));
        }
    }

    #[test]
    fn scroll_on_empty_grid_does_nothing() {
        let mut grid = MapGrid::new();
        grid.scroll(1, 1);
        assert!(grid.is_empty());
    }
}
