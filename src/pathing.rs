//! Route finding over a generated maze: breadth first flood fill distances from a
//! start cell and shortest path extraction by walking back down the distances.

use crate::generator::EllerMaze;
use crate::utils::{self, FnvHashMap};

/// Steps from a fixed start cell to every cell reachable through open walls.
#[derive(Debug, Clone)]
pub struct Distances {
    start: (usize, usize),
    distances: FnvHashMap<(usize, usize), u32>,
    max_distance: u32,
}

impl Distances {
    /// Flood fill from `start`. `None` if the start is out of range or the maze has
    /// not been generated yet (an ungenerated maze has no open walls to traverse).
    pub fn new(maze: &EllerMaze, start: (usize, usize)) -> Option<Distances> {
        let (start_row, start_col) = start;
        if !maze.is_generated() || start_row >= maze.height() || start_col >= maze.width() {
            return None;
        }

        let cells_count = maze.width() * maze.height();
        let mut distances = utils::fnv_hashmap(cells_count);
        distances.insert(start, 0);
        let mut max = 0;

        // Unweighted graph: the first time a cell is seen is its shortest distance,
        // so the distances map doubles as the visited set.
        let mut frontier = vec![start];
        while !frontier.is_empty() {

            let mut new_frontier = vec![];
            for cell in &frontier {

                let distance_to_cell = distances[cell];
                if distance_to_cell > max {
                    max = distance_to_cell;
                }

                for &neighbour in maze.open_neighbours(cell.0, cell.1).iter() {
                    if !distances.contains_key(&neighbour) {
                        distances.insert(neighbour, distance_to_cell + 1);
                        new_frontier.push(neighbour);
                    }
                }
            }
            frontier = new_frontier;
        }

        Some(Distances {
            start,
            distances,
            max_distance: max,
        })
    }

    #[inline]
    pub fn start(&self) -> (usize, usize) {
        self.start
    }

    /// The largest distance to any reachable cell.
    #[inline]
    pub fn max(&self) -> u32 {
        self.max_distance
    }

    #[inline]
    pub fn distance_from_start_to(&self, cell: (usize, usize)) -> Option<u32> {
        self.distances.get(&cell).cloned()
    }

    /// How many cells the flood fill reached, start included.
    #[inline]
    pub fn cells_reached(&self) -> usize {
        self.distances.len()
    }
}

/// The unique path from the distances' start cell to `end`, start first.
/// `None` if `end` was never reached by the flood fill.
pub fn shortest_path(maze: &EllerMaze,
                     distances_from_start: &Distances,
                     end: (usize, usize))
                     -> Option<Vec<(usize, usize)>> {

    distances_from_start.distance_from_start_to(end)?;

    // Walk from the end towards the start, always stepping to a neighbour one step
    // closer. In a perfect maze that neighbour is unique.
    let mut path = vec![end];
    let mut current = end;
    while current != distances_from_start.start() {

        let here = distances_from_start.distance_from_start_to(current)?;
        let step_down = maze.open_neighbours(current.0, current.1)
                            .iter()
                            .cloned()
                            .find(|&neighbour| {
                                distances_from_start.distance_from_start_to(neighbour) ==
                                Some(here - 1)
                            })?;
        path.push(step_down);
        current = step_down;
    }

    path.reverse();
    Some(path)
}
