//! Perfect maze generation with Eller's algorithm.
//!
//! The maze is a pair of boolean wall grids rather than a linked cell graph: one grid
//! for the horizontal wall segments and one for the vertical segments. Generation works
//! row by row, tracking which cells of the current row are already connected with a
//! set id per column, merging adjacent sets at random and guaranteeing every set at
//! least one passage downwards before moving on. The result is a spanning tree of the
//! cells: every cell reachable from every other by exactly one path.

use rand::{Rng, SeedableRng, XorShiftRng};
use smallvec::SmallVec;
use std::error::Error;
use std::fmt;

use crate::units::{Height, Width};
use crate::utils::{self, FnvHashSet};
use crate::walls::{Orientation, WallGrid};

/// Column not yet assigned to any connected set in the row being processed.
const UNASSIGNED: i64 = -1;

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum MazeError {
    /// Mazes smaller than 2 x 2 have no interior to carve.
    InvalidDimension { width: usize, height: usize },
}

impl fmt::Display for MazeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            MazeError::InvalidDimension { width, height } => {
                write!(f, "invalid maze dimension {} x {}, both sides must be at least 2",
                       width, height)
            }
        }
    }
}

impl Error for MazeError {}

/// Eller's algorithm maze generator over two wall grids.
///
/// Owns its random number generator, so two instances never interfere and a seeded
/// instance replays the same draw sequence regardless of what else the process does.
pub struct EllerMaze {
    width: usize,
    height: usize,
    rng: XorShiftRng,
    horizontal_walls: WallGrid,
    vertical_walls: WallGrid,
    generated: bool,
}

impl fmt::Debug for EllerMaze {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "EllerMaze :: width: {:?}, height: {:?}, generated: {:?}",
               self.width, self.height, self.generated)
    }
}

impl EllerMaze {
    /// A fully walled, ungenerated maze.
    ///
    /// A seed gives a reproducible maze; without one the generator is randomly seeded.
    pub fn new(width: Width, height: Height, seed: Option<u32>) -> Result<EllerMaze, MazeError> {
        let (Width(w), Height(h)) = (width, height);
        if w <= 1 || h <= 1 {
            return Err(MazeError::InvalidDimension { width: w, height: h });
        }

        let rng = match seed {
            Some(s) => seeded_rng(s),
            None => rand::weak_rng(),
        };

        Ok(EllerMaze {
            width: w,
            height: h,
            rng,
            horizontal_walls: WallGrid::new(Orientation::Horizontal, width, height),
            vertical_walls: WallGrid::new(Orientation::Vertical, width, height),
            generated: false,
        })
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
    pub fn horizontal_walls(&self) -> &WallGrid {
        &self.horizontal_walls
    }

    #[inline]
    pub fn vertical_walls(&self) -> &WallGrid {
        &self.vertical_walls
    }

    /// Entrance cell `(row, column)`, with its border opening in horizontal wall row 0.
    #[inline]
    pub fn entrance(&self) -> (usize, usize) {
        (0, 0)
    }

    /// Exit cell `(row, column)`, with its border opening in the bottom horizontal wall row.
    #[inline]
    pub fn exit_point(&self) -> (usize, usize) {
        (self.height - 1, self.width - 1)
    }

    #[inline]
    pub fn is_generated(&self) -> bool {
        self.generated
    }

    /// Carve the maze. Any previous carving is discarded: the grids are refilled and
    /// regenerated from scratch, so repeated calls are not additive.
    pub fn generate(&mut self) {
        self.horizontal_walls.fill();
        self.vertical_walls.fill();

        let mut row_sets: Vec<i64> = vec![UNASSIGNED; self.width];

        for row in 0..self.height {
            assign_fresh_sets(&mut row_sets);

            let vertical_removals = self.merge_adjacent_cells(&mut row_sets, row);
            let horizontal_removals = self.add_downward_connections(&row_sets, row);

            for &(r, c) in &vertical_removals {
                self.vertical_walls.clear(r, c);
            }
            for &(r, c) in &horizontal_removals {
                self.horizontal_walls.clear(r, c);
            }

            self.propagate_sets(&mut row_sets, row);

            if row == self.height - 1 {
                self.finalise_last_row(&mut row_sets, row);
            }
        }

        self.carve_entrance_and_exit();
        self.generated = true;
    }

    /// Scan adjacent column pairs left to right; pairs in different sets merge with
    /// probability 0.5, unioning the two sets and marking the vertical wall between
    /// them for removal. Merged pairs are never revisited, so a wall cannot be
    /// marked twice.
    fn merge_adjacent_cells(&mut self, row_sets: &mut [i64], row: usize) -> Vec<(usize, usize)> {
        let mut removals = Vec::new();

        for col in 0..self.width - 1 {
            if row_sets[col] != row_sets[col + 1] && self.rng.gen::<f64>() > 0.5 {
                let (old_set, new_set) = (row_sets[col + 1], row_sets[col]);
                union_sets(row_sets, old_set, new_set);
                removals.push((row, col + 1));
            }
        }

        removals
    }

    /// Every set gets its first passage to the row below unconditionally; any further
    /// column of an already connected set adds an extra passage with probability 0.7.
    /// The last row has no row below and gets nothing.
    fn add_downward_connections(&mut self, row_sets: &[i64], row: usize) -> Vec<(usize, usize)> {
        if row == self.height - 1 {
            return Vec::new();
        }

        let mut removals = Vec::new();
        let mut connected_sets: FnvHashSet<i64> = utils::fnv_hashset(self.width);

        for col in 0..self.width {
            let set_id = row_sets[col];
            if !connected_sets.contains(&set_id) || self.rng.gen::<f64>() > 0.3 {
                removals.push((row + 1, col));
                connected_sets.insert(set_id);
            }
        }

        removals
    }

    /// Columns whose downward passage survived carry their set into the next row;
    /// the rest reset to unassigned and will receive fresh sets. The last row keeps
    /// its sets for the closing sweep.
    fn propagate_sets(&self, row_sets: &mut Vec<i64>, row: usize) {
        if row == self.height - 1 {
            return;
        }

        let mut next_row_sets = vec![UNASSIGNED; self.width];
        for col in 0..self.width {
            if !self.horizontal_walls.is_wall(row + 1, col) {
                next_row_sets[col] = row_sets[col];
            }
        }
        *row_sets = next_row_sets;
    }

    /// Force-merge every adjacent pair still in different sets, no probability draw.
    /// Collapses any remaining disconnected sets into one along the bottom row.
    fn finalise_last_row(&mut self, row_sets: &mut [i64], row: usize) {
        for col in 0..self.width - 1 {
            if row_sets[col] != row_sets[col + 1] {
                self.vertical_walls.clear(row, col + 1);
                let (old_set, new_set) = (row_sets[col + 1], row_sets[col]);
                union_sets(row_sets, old_set, new_set);
            }
        }
    }

    fn carve_entrance_and_exit(&mut self) {
        let (_, entrance_col) = self.entrance();
        let (_, exit_col) = self.exit_point();
        self.horizontal_walls.clear(0, entrance_col);
        self.horizontal_walls.clear(self.height, exit_col);
    }

    /// Display projection of the maze: a `(2*height+1) x (2*width+1)` matrix where
    /// `true` is a wall. Odd/odd positions are the cells and always open; the
    /// position between two cells is open exactly when the wall bit between them
    /// is clear. Pure view of the current grids, callable any number of times.
    pub fn maze_matrix(&self) -> Vec<Vec<bool>> {
        let matrix_rows = self.height * 2 + 1;
        let matrix_columns = self.width * 2 + 1;
        let mut maze = vec![vec![true; matrix_columns]; matrix_rows];

        for row in 0..self.height {
            for col in 0..self.width {
                maze[row * 2 + 1][col * 2 + 1] = false;

                if col < self.width - 1 && !self.vertical_walls.is_wall(row, col + 1) {
                    maze[row * 2 + 1][col * 2 + 2] = false;
                }
                if row < self.height - 1 && !self.horizontal_walls.is_wall(row + 1, col) {
                    maze[row * 2 + 2][col * 2 + 1] = false;
                }
            }
        }

        maze
    }

    /// The cells sharing an open (carved) wall with `(row, col)`.
    pub fn open_neighbours(&self, row: usize, col: usize) -> SmallVec<[(usize, usize); 4]> {
        let mut neighbours = SmallVec::new();

        if row > 0 && !self.horizontal_walls.is_wall(row, col) {
            neighbours.push((row - 1, col));
        }
        if row < self.height - 1 && !self.horizontal_walls.is_wall(row + 1, col) {
            neighbours.push((row + 1, col));
        }
        if col > 0 && !self.vertical_walls.is_wall(row, col) {
            neighbours.push((row, col - 1));
        }
        if col < self.width - 1 && !self.vertical_walls.is_wall(row, col + 1) {
            neighbours.push((row, col + 1));
        }

        neighbours
    }

    /// Carved interior wall openings, excluding the two border openings.
    /// A perfect maze has exactly `width * height - 1` of them.
    pub fn interior_openings(&self) -> usize {
        let mut open = 0;

        // interior vertical grid lines: columns 1..width
        for row in 0..self.height {
            for col in 1..self.width {
                if !self.vertical_walls.is_wall(row, col) {
                    open += 1;
                }
            }
        }
        // interior horizontal grid lines: rows 1..height
        for row in 1..self.height {
            for col in 0..self.width {
                if !self.horizontal_walls.is_wall(row, col) {
                    open += 1;
                }
            }
        }

        open
    }

    #[cfg(test)]
    pub(crate) fn clear_all_walls(&mut self) {
        for row in 0..self.horizontal_walls.rows() {
            for col in 0..self.horizontal_walls.columns() {
                self.horizontal_walls.clear(row, col);
            }
        }
        for row in 0..self.vertical_walls.rows() {
            for col in 0..self.vertical_walls.columns() {
                self.vertical_walls.clear(row, col);
            }
        }
        self.generated = true;
    }
}

/// Give every unassigned column a set id one above the current row maximum.
fn assign_fresh_sets(row_sets: &mut [i64]) {
    for col in 0..row_sets.len() {
        if row_sets[col] == UNASSIGNED {
            let max_set = row_sets.iter().max().map_or(UNASSIGNED, |&s| s);
            row_sets[col] = if max_set >= 0 { max_set + 1 } else { 1 };
        }
    }
}

/// Relabel every column of `old_set` as `new_set`. A linear rescan is a naive
/// union-find but the row is at most `width` columns long.
fn union_sets(row_sets: &mut [i64], old_set: i64, new_set: i64) {
    for set_id in row_sets.iter_mut() {
        if *set_id == old_set {
            *set_id = new_set;
        }
    }
}

/// Deterministic xorshift state for a seed. The xor constants are all distinct so
/// the state words can never be simultaneously zero.
fn seeded_rng(seed: u32) -> XorShiftRng {
    XorShiftRng::from_seed([0x193a_6754 ^ seed,
                            0xa8a7_d469 ^ seed,
                            0x9783_0e05 ^ seed,
                            0x113b_a7bb ^ seed])
}

#[cfg(test)]
mod tests {

    use super::*;
    use quickcheck::{quickcheck, TestResult};

    fn generated(width: usize, height: usize, seed: u32) -> EllerMaze {
        let mut maze = EllerMaze::new(Width(width), Height(height), Some(seed))
            .expect("valid dimensions");
        maze.generate();
        maze
    }

    #[test]
    fn dimensions_must_both_exceed_one() {
        assert_eq!(EllerMaze::new(Width(1), Height(5), None).err(),
                   Some(MazeError::InvalidDimension { width: 1, height: 5 }));
        assert_eq!(EllerMaze::new(Width(5), Height(1), None).err(),
                   Some(MazeError::InvalidDimension { width: 5, height: 1 }));
        assert_eq!(EllerMaze::new(Width(0), Height(0), None).err(),
                   Some(MazeError::InvalidDimension { width: 0, height: 0 }));
        assert!(EllerMaze::new(Width(2), Height(2), None).is_ok());
    }

    #[test]
    fn ungenerated_maze_is_fully_walled() {
        let maze = EllerMaze::new(Width(4), Height(3), Some(7)).unwrap();
        assert!(!maze.is_generated());
        assert_eq!(maze.horizontal_walls().wall_count(), 4 * 4);
        assert_eq!(maze.vertical_walls().wall_count(), 3 * 5);
    }

    #[test]
    fn same_seed_same_maze() {
        let a = generated(10, 8, 99);
        let b = generated(10, 8, 99);
        assert_eq!(a.horizontal_walls(), b.horizontal_walls());
        assert_eq!(a.vertical_walls(), b.vertical_walls());
        assert_eq!(a.maze_matrix(), b.maze_matrix());
    }

    #[test]
    fn spanning_tree_opening_count() {
        for &(w, h, seed) in &[(2, 2, 1), (5, 4, 2), (12, 3, 3), (7, 7, 42)] {
            let maze = generated(w, h, seed);
            assert_eq!(maze.interior_openings(), w * h - 1,
                       "maze {} x {} seed {} is not a spanning tree", w, h, seed);
        }
    }

    #[test]
    fn borders_walled_except_entrance_and_exit() {
        let maze = generated(6, 4, 17);
        let h = maze.horizontal_walls();
        let v = maze.vertical_walls();

        for col in 0..6 {
            assert_eq!(h.is_wall(0, col), col != 0, "top border at column {}", col);
            assert_eq!(h.is_wall(4, col), col != 5, "bottom border at column {}", col);
        }
        for row in 0..4 {
            assert!(v.is_wall(row, 0), "left border at row {}", row);
            assert!(v.is_wall(row, 6), "right border at row {}", row);
        }
    }

    #[test]
    fn two_by_two_seed_example() {
        let maze = generated(2, 2, 1);

        assert_eq!(maze.interior_openings(), 3);
        assert!(!maze.horizontal_walls().is_wall(0, 0), "entrance opening");
        assert!(!maze.horizontal_walls().is_wall(2, 1), "exit opening");

        // a fresh instance with the same seed carves the identical maze
        let again = generated(2, 2, 1);
        assert_eq!(maze.horizontal_walls(), again.horizontal_walls());
        assert_eq!(maze.vertical_walls(), again.vertical_walls());
    }

    #[test]
    fn regenerate_resets_rather_than_accumulates() {
        let mut maze = EllerMaze::new(Width(6), Height(6), Some(5)).unwrap();
        maze.generate();
        maze.generate();
        assert_eq!(maze.interior_openings(), 6 * 6 - 1);
    }

    #[test]
    fn matrix_shape_and_parity() {
        let maze = generated(5, 3, 11);
        let matrix = maze.maze_matrix();

        assert_eq!(matrix.len(), 2 * 3 + 1);
        for matrix_row in &matrix {
            assert_eq!(matrix_row.len(), 2 * 5 + 1);
        }
        for row in 0..matrix.len() {
            for col in 0..matrix[row].len() {
                if row % 2 == 0 && col % 2 == 0 {
                    assert!(matrix[row][col], "even/even ({}, {}) must be a wall", row, col);
                }
                if row % 2 == 1 && col % 2 == 1 {
                    assert!(!matrix[row][col], "odd/odd ({}, {}) must be open", row, col);
                }
            }
        }
    }

    #[test]
    fn open_neighbours_follow_wall_bits() {
        let maze = generated(4, 4, 23);

        for row in 0..4 {
            for col in 0..4 {
                for &(n_row, n_col) in maze.open_neighbours(row, col).iter() {
                    // neighbour links are symmetric
                    assert!(maze.open_neighbours(n_row, n_col)
                                .iter()
                                .any(|&back| back == (row, col)),
                            "asymmetric link between ({}, {}) and ({}, {})",
                            row, col, n_row, n_col);
                }
            }
        }
    }

    #[test]
    fn prop_generation_deterministic_and_perfect() {
        fn prop(w: u8, h: u8, seed: u32) -> TestResult {
            let (w, h) = (w as usize, h as usize);
            if w < 2 || h < 2 || w > 16 || h > 16 {
                return TestResult::discard();
            }

            let a = generated(w, h, seed);
            let b = generated(w, h, seed);
            if a.horizontal_walls() != b.horizontal_walls() ||
               a.vertical_walls() != b.vertical_walls() {
                return TestResult::error("same seed produced different grids");
            }

            // spanning tree edge count: connected + acyclic given the BFS check in pathing
            TestResult::from_bool(a.interior_openings() == w * h - 1)
        }
        quickcheck(prop as fn(u8, u8, u32) -> TestResult);
    }
}
