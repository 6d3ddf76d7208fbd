use bit_set::BitSet;

use crate::units::{Height, Width};

/// Which family of grid lines a `WallGrid` records.
///
/// Horizontal walls block vertical movement: cell `[r][c]` sits on the grid line
/// between cell rows `r-1` and `r` at column `c`. Vertical walls block horizontal
/// movement: cell `[r][c]` sits between cell columns `c-1` and `c` in row `r`.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// A 2d boolean grid of wall segments, one bit per grid line position.
///
/// Sizing follows from the orientation for a `width x height` cell maze:
/// horizontal grids are `(height+1) x width`, vertical grids `height x (width+1)`,
/// so the outermost rows/columns are the maze border.
#[derive(Eq, PartialEq, Clone, Debug)]
pub struct WallGrid {
    walls: BitSet,
    rows: usize,
    columns: usize,
    orientation: Orientation,
}

impl WallGrid {
    /// A fully walled grid sized for a `width x height` cell maze.
    pub fn new(orientation: Orientation, width: Width, height: Height) -> WallGrid {
        let (Width(w), Height(h)) = (width, height);
        let (rows, columns) = match orientation {
            Orientation::Horizontal => (h + 1, w),
            Orientation::Vertical => (h, w + 1),
        };
        let mut grid = WallGrid {
            walls: BitSet::with_capacity(rows * columns),
            rows,
            columns,
            orientation,
        };
        grid.fill();
        grid
    }

    #[inline]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Every position walled.
    pub fn fill(&mut self) {
        for bit in 0..self.rows * self.columns {
            self.walls.insert(bit);
        }
    }

    #[inline]
    pub fn is_wall(&self, row: usize, column: usize) -> bool {
        self.walls.contains(self.bit_index(row, column))
    }

    #[inline]
    pub fn set(&mut self, row: usize, column: usize) {
        let bit = self.bit_index(row, column);
        self.walls.insert(bit);
    }

    /// Remove the wall at the given position. Clearing an already clear bit is a no-op.
    #[inline]
    pub fn clear(&mut self, row: usize, column: usize) {
        let bit = self.bit_index(row, column);
        self.walls.remove(bit);
    }

    /// The number of wall segments present.
    pub fn wall_count(&self) -> usize {
        self.walls.len()
    }

    #[inline]
    fn bit_index(&self, row: usize, column: usize) -> usize {
        debug_assert!(row < self.rows && column < self.columns,
                      "wall position ({}, {}) out of range for {} x {} grid",
                      row, column, self.rows, self.columns);
        row * self.columns + column
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn horizontal_grid_sizing() {
        let g = WallGrid::new(Orientation::Horizontal, Width(4), Height(3));
        assert_eq!(g.rows(), 4);
        assert_eq!(g.columns(), 4);
        assert_eq!(g.wall_count(), 16);
    }

    #[test]
    fn vertical_grid_sizing() {
        let g = WallGrid::new(Orientation::Vertical, Width(4), Height(3));
        assert_eq!(g.rows(), 3);
        assert_eq!(g.columns(), 5);
        assert_eq!(g.wall_count(), 15);
    }

    #[test]
    fn new_grid_is_fully_walled() {
        let g = WallGrid::new(Orientation::Horizontal, Width(3), Height(2));
        for row in 0..g.rows() {
            for col in 0..g.columns() {
                assert!(g.is_wall(row, col));
            }
        }
    }

    #[test]
    fn clear_and_set_roundtrip() {
        let mut g = WallGrid::new(Orientation::Vertical, Width(3), Height(3));
        assert!(g.is_wall(1, 2));
        g.clear(1, 2);
        assert!(!g.is_wall(1, 2));
        // clearing again is a no-op
        g.clear(1, 2);
        assert!(!g.is_wall(1, 2));
        assert_eq!(g.wall_count(), 3 * 4 - 1);
        g.set(1, 2);
        assert!(g.is_wall(1, 2));
        assert_eq!(g.wall_count(), 3 * 4);
    }

    #[test]
    fn fill_restores_cleared_walls() {
        let mut g = WallGrid::new(Orientation::Horizontal, Width(2), Height(2));
        g.clear(0, 0);
        g.clear(2, 1);
        g.fill();
        assert_eq!(g.wall_count(), 6);
    }
}
