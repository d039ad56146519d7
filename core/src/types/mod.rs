//! Data types module - map cell structures shared by every engine component

mod map_cell;

pub use map_cell::{MapCell, MapCellLayer};
