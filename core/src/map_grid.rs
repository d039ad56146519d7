use crate::constants::{CellFlags, MAX_VIEW, MAXLAYERS};
use crate::error::MapError;
use crate::types::MapCell;

/// The viewport-sized cell store.
///
/// Coordinates are always relative to the top-left of the viewport. Cells live
/// in one flat buffer indexed by `y * width + x` and are only reachable
/// through the bounds-checked accessors below.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapGrid {
    width: usize,
    height: usize,
    cells: Vec<MapCell>,
}

impl MapGrid {
    /// An empty 0x0 grid. Call [`MapGrid::set_size`] once the viewport is known.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a grid that is already sized.
    pub fn with_size(width: usize, height: usize) -> Result<Self, MapError> {
        let mut grid = Self::new();
        grid.set_size(width, height)?;
        Ok(grid)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Reallocates the grid for a new viewport. Identical dimensions are a
    /// no-op so a repeated negotiation does not wipe the view.
    ///
    /// The replacement buffer is fully built before it is swapped in.
    pub fn set_size(&mut self, width: usize, height: usize) -> Result<(), MapError> {
        if width == self.width && height == self.height {
            return Ok(());
        }
        if width > MAX_VIEW || height > MAX_VIEW {
            return Err(MapError::ViewportTooLarge { width, height });
        }

        let count = width * height;
        let mut cells: Vec<MapCell> = Vec::new();
        cells
            .try_reserve_exact(count)
            .map_err(|_| MapError::Allocation { cells: count })?;
        cells.resize(count, MapCell::default());

        log::debug!(
            "map grid resized {}x{} -> {}x{}",
            self.width,
            self.height,
            width,
            height
        );

        self.cells = cells;
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Zero-fills every cell, keeping the dimensions. The whole view is
    /// flagged for repaint.
    pub fn reset(&mut self) {
        for cell in self.cells.iter_mut() {
            *cell = MapCell {
                flags: CellFlags::NEEDS_REDRAW,
                ..MapCell::default()
            };
        }
    }

    #[inline]
    pub fn is_inside(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if self.is_inside(x, y) {
            Some(y as usize * self.width + x as usize)
        } else {
            None
        }
    }

    pub fn cell(&self, x: i32, y: i32) -> Option<&MapCell> {
        self.index(x, y).and_then(|idx| self.cells.get(idx))
    }

    pub fn cell_mut(&mut self, x: i32, y: i32) -> Option<&mut MapCell> {
        self.index(x, y).and_then(|idx| self.cells.get_mut(idx))
    }

    /// Head face of a single tile, ignoring big face tails. 0 when the
    /// coordinate or layer is out of range.
    pub fn face_at(&self, x: i32, y: i32, layer: usize) -> u16 {
        if layer >= MAXLAYERS {
            return 0;
        }
        self.cell(x, y).map_or(0, |cell| cell.heads[layer].face)
    }

    /// Iterates every cell in row-major order with its coordinates.
    pub fn iter_cells(&self) -> impl Iterator<Item = (i32, i32, &MapCell)> {
        let width = self.width;
        self.cells.iter().enumerate().map(move |(idx, cell)| {
            ((idx % width) as i32, (idx / width) as i32, cell)
        })
    }

    /// Returns the coordinates of every cell flagged for repaint and clears
    /// the flag.
    pub fn take_dirty(&mut self) -> Vec<(i32, i32)> {
        let width = self.width;
        let mut dirty = Vec::new();
        for (idx, cell) in self.cells.iter_mut().enumerate() {
            if cell.flags.contains(CellFlags::NEEDS_REDRAW) {
                cell.flags.remove(CellFlags::NEEDS_REDRAW);
                dirty.push(((idx % width) as i32, (idx / width) as i32));
            }
        }
        dirty
    }

    /// Clears the resmooth flag everywhere once smoothing was recomputed.
    pub fn clear_resmooth(&mut self) {
        for cell in self.cells.iter_mut() {
            cell.flags.remove(CellFlags::NEEDS_RESMOOTH);
        }
    }

    /// Moves `len` cells from row `src_y` starting at column `src_x` to row
    /// `dst_y` column `dst_x`. Overlapping ranges behave like memmove.
    pub(crate) fn move_row_segment(
        &mut self,
        src_x: usize,
        src_y: usize,
        dst_x: usize,
        dst_y: usize,
        len: usize,
    ) {
        if len == 0 || src_y >= self.height || dst_y >= self.height {
            return;
        }
        if src_x + len > self.width || dst_x + len > self.width {
            return;
        }
        let src = src_y * self.width + src_x;
        let dst = dst_y * self.width + dst_x;
        self.cells.copy_within(src..src + len, dst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_is_empty() {
        let grid = MapGrid::new();
        assert_eq!(grid.width(), 0);
        assert_eq!(grid.height(), 0);
        assert!(grid.is_empty());
        assert!(!grid.is_inside(0, 0));
    }

    #[test]
    fn set_size_allocates_blank_cells() {
        let mut grid = MapGrid::new();
        grid.set_size(11, 9).unwrap();
        assert_eq!(grid.len(), 99);
        assert!(grid.iter_cells().all(|(_, _, c)| c.is_blank()));
    }

    #[test]
    fn set_size_same_dimensions_keeps_contents() {
        let mut grid = MapGrid::with_size(5, 5).unwrap();
        grid.cell_mut(2, 3).unwrap().heads[0].face = 77;

        grid.set_size(5, 5).unwrap();

        assert_eq!(grid.face_at(2, 3, 0), 77);
    }

    #[test]
    fn set_size_rejects_oversized_viewport() {
        let mut grid = MapGrid::with_size(4, 4).unwrap();
        let err = grid.set_size(MAX_VIEW + 1, 4).unwrap_err();
        assert_eq!(
            err,
            MapError::ViewportTooLarge {
                width: MAX_VIEW + 1,
                height: 4
            }
        );
        // Still the old grid.
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.len(), 16);
    }

    #[test]
    fn reset_keeps_dimensions_and_marks_redraw() {
        let mut grid = MapGrid::with_size(3, 2).unwrap();
        grid.cell_mut(1, 1).unwrap().heads[2].face = 5;
        grid.cell_mut(0, 0).unwrap().darkness = 200;

        grid.reset();

        assert_eq!((grid.width(), grid.height()), (3, 2));
        for (_, _, cell) in grid.iter_cells() {
            assert!(cell.is_blank());
            assert!(cell.flags.contains(CellFlags::NEEDS_REDRAW));
        }
    }

    #[test]
    fn accessors_are_bounds_checked() {
        let mut grid = MapGrid::with_size(4, 3).unwrap();
        assert!(grid.cell(-1, 0).is_none());
        assert!(grid.cell(4, 0).is_none());
        assert!(grid.cell(0, 3).is_none());
        assert!(grid.cell_mut(3, 2).is_some());
        assert_eq!(grid.face_at(9, 9, 0), 0);
        assert_eq!(grid.face_at(0, 0, MAXLAYERS), 0);
    }

    #[test]
    fn iter_cells_is_row_major() {
        let grid = MapGrid::with_size(3, 2).unwrap();
        let coords: Vec<(i32, i32)> = grid.iter_cells().map(|(x, y, _)| (x, y)).collect();
        assert_eq!(
            coords,
            vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]
        );
    }

    #[test]
    fn take_dirty_returns_and_clears_flags() {
        let mut grid = MapGrid::with_size(3, 3).unwrap();
        grid.cell_mut(2, 1)
            .unwrap()
            .flags
            .insert(CellFlags::NEEDS_REDRAW | CellFlags::CLEARED);

        assert_eq!(grid.take_dirty(), vec![(2, 1)]);
        assert!(grid.take_dirty().is_empty());
        assert!(grid.cell(2, 1).unwrap().is_cleared());
    }

    #[test]
    fn move_row_segment_handles_overlap() {
        let mut grid = MapGrid::with_size(4, 1).unwrap();
        for x in 0..4 {
            grid.cell_mut(x, 0).unwrap().heads[0].face = x as u16 + 1;
        }

        grid.move_row_segment(0, 0, 1, 0, 3);

        let faces: Vec<u16> = (0..4).map(|x| grid.face_at(x, 0, 0)).collect();
        assert_eq!(faces, vec![1, 1, 2, 3]);
    }
}
