//! Conversion of a generated maze into a watertight triangle mesh: one floor slab
//! plus one cuboid per wall segment still present in the wall grids.
//!
//! Vertices are deduplicated so that touching cuboids (floor/wall junctions,
//! adjacent wall segments sharing a corner) reference the same stored vertex.
//! Deduplication is keyed on integer lattice coordinates rather than on the float
//! positions themselves: every coordinate the builder ever emits is
//! `cells * cell_size + halves * (wall_thickness / 2)` on the x/y axes and one of
//! three fixed levels on z, so an integer key identifies a vertex exactly and the
//! float position is derived from the key only once, at insertion.

use glam::Vec3;
use itertools::Itertools;

use crate::generator::EllerMaze;
use crate::utils::{self, FnvHashMap};

/// An indexed triangle mesh. Axis convention: x runs along maze columns, y along
/// maze rows, z is up.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    pub faces: Vec<[u32; 3]>,
}

impl Mesh {
    fn clear(&mut self) {
        self.vertices.clear();
        self.faces.clear();
    }
}

/// Height level of a vertex: the ground plane, the top of the floor slab or the
/// top of a wall.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug)]
enum ZLevel {
    Base,
    FloorTop,
    WallTop,
}

/// One axis coordinate as `cells * cell_size + halves * (wall_thickness / 2)`.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug)]
struct AxisOffset {
    cells: i32,
    halves: i8,
}

impl AxisOffset {
    fn on_grid_line(cells: usize) -> AxisOffset {
        AxisOffset { cells: cells as i32, halves: 0 }
    }

    fn beside_grid_line(cells: usize, halves: i8) -> AxisOffset {
        AxisOffset { cells: cells as i32, halves }
    }
}

#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug)]
struct VertexKey {
    x: AxisOffset,
    y: AxisOffset,
    z: ZLevel,
}

/// Builds the solid for a generated maze. The mesh is cleared and fully rebuilt on
/// every `build` call; the builder is reusable but not additive.
///
/// Geometry dimensions are taken as given: zero or negative values produce
/// degenerate but well-formed geometry rather than an error.
pub struct MeshBuilder<'a> {
    maze: &'a EllerMaze,
    cell_size: f32,
    wall_height: f32,
    wall_thickness: f32,
    floor_thickness: f32,
    mesh: Mesh,
    vertex_lookup: FnvHashMap<VertexKey, u32>,
}

impl<'a> MeshBuilder<'a> {
    pub fn new(maze: &'a EllerMaze,
               cell_size: f32,
               wall_height: f32,
               wall_thickness: f32,
               floor_thickness: f32)
               -> MeshBuilder<'a> {
        MeshBuilder {
            maze,
            cell_size,
            wall_height,
            wall_thickness,
            floor_thickness,
            mesh: Mesh::default(),
            vertex_lookup: utils::fnv_hashmap(0),
        }
    }

    #[inline]
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// The number of cuboids the current wall grids expand to: the floor plus one
    /// per wall segment present.
    pub fn cuboid_count(&self) -> usize {
        1 + self.maze.horizontal_walls().wall_count() + self.maze.vertical_walls().wall_count()
    }

    /// Rebuild the mesh from the maze's current wall grids.
    pub fn build(&mut self) {
        self.mesh.clear();
        self.vertex_lookup.clear();

        self.emit_floor();

        let (height, width) = (self.maze.height(), self.maze.width());
        for (row, col) in (0..height).cartesian_product(0..width + 1) {
            if self.maze.vertical_walls().is_wall(row, col) {
                self.emit_vertical_wall(row, col);
            }
        }
        for (row, col) in (0..height + 1).cartesian_product(0..width) {
            if self.maze.horizontal_walls().is_wall(row, col) {
                self.emit_horizontal_wall(row, col);
            }
        }
    }

    /// Floor slab spanning the whole maze footprint.
    fn emit_floor(&mut self) {
        self.emit_cuboid(AxisOffset::on_grid_line(0),
                         AxisOffset::on_grid_line(self.maze.width()),
                         AxisOffset::on_grid_line(0),
                         AxisOffset::on_grid_line(self.maze.height()),
                         ZLevel::FloorTop);
    }

    /// Wall segment centred on the vertical grid line at `col`, spanning one cell
    /// along the row direction.
    fn emit_vertical_wall(&mut self, row: usize, col: usize) {
        self.emit_cuboid(AxisOffset::beside_grid_line(col, -1),
                         AxisOffset::beside_grid_line(col, 1),
                         AxisOffset::on_grid_line(row),
                         AxisOffset::on_grid_line(row + 1),
                         ZLevel::WallTop);
    }

    /// Wall segment centred on the horizontal grid line at `row`, spanning one cell
    /// along the column direction.
    fn emit_horizontal_wall(&mut self, row: usize, col: usize) {
        self.emit_cuboid(AxisOffset::on_grid_line(col),
                         AxisOffset::on_grid_line(col + 1),
                         AxisOffset::beside_grid_line(row, -1),
                         AxisOffset::beside_grid_line(row, 1),
                         ZLevel::WallTop);
    }

    /// Expand one axis-aligned cuboid: 8 vertices (deduplicated), 6 quads, 12
    /// triangles. Quad winding keeps every face normal pointing outwards.
    fn emit_cuboid(&mut self,
                   x0: AxisOffset,
                   x1: AxisOffset,
                   y0: AxisOffset,
                   y1: AxisOffset,
                   top: ZLevel) {
        let v0 = self.add_vertex(VertexKey { x: x0, y: y0, z: ZLevel::Base });
        let v1 = self.add_vertex(VertexKey { x: x1, y: y0, z: ZLevel::Base });
        let v2 = self.add_vertex(VertexKey { x: x1, y: y1, z: ZLevel::Base });
        let v3 = self.add_vertex(VertexKey { x: x0, y: y1, z: ZLevel::Base });
        let v4 = self.add_vertex(VertexKey { x: x0, y: y0, z: top });
        let v5 = self.add_vertex(VertexKey { x: x1, y: y0, z: top });
        let v6 = self.add_vertex(VertexKey { x: x1, y: y1, z: top });
        let v7 = self.add_vertex(VertexKey { x: x0, y: y1, z: top });

        self.add_quad(v0, v3, v2, v1); // bottom
        self.add_quad(v0, v4, v7, v3); // x0 side
        self.add_quad(v0, v1, v5, v4); // y0 side
        self.add_quad(v1, v2, v6, v5); // x1 side
        self.add_quad(v2, v3, v7, v6); // y1 side
        self.add_quad(v4, v5, v6, v7); // top
    }

    fn add_vertex(&mut self, key: VertexKey) -> u32 {
        if let Some(&index) = self.vertex_lookup.get(&key) {
            return index;
        }
        let index = self.mesh.vertices.len() as u32;
        self.mesh.vertices.push(self.key_position(key));
        self.vertex_lookup.insert(key, index);
        index
    }

    fn key_position(&self, key: VertexKey) -> Vec3 {
        let half_thickness = self.wall_thickness * 0.5;
        let axis = |offset: AxisOffset| {
            offset.cells as f32 * self.cell_size + offset.halves as f32 * half_thickness
        };
        let z = match key.z {
            ZLevel::Base => 0.0,
            ZLevel::FloorTop => self.floor_thickness,
            ZLevel::WallTop => self.wall_height,
        };
        Vec3::new(axis(key.x), axis(key.y), z)
    }

    fn add_quad(&mut self, v0: u32, v1: u32, v2: u32, v3: u32) {
        self.mesh.faces.push([v0, v1, v2]);
        self.mesh.faces.push([v0, v2, v3]);
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::units::{Height, Width};

    fn generated(width: usize, height: usize, seed: u32) -> EllerMaze {
        let mut maze = EllerMaze::new(Width(width), Height(height), Some(seed))
            .expect("valid dimensions");
        maze.generate();
        maze
    }

    #[test]
    fn face_count_is_twelve_per_cuboid() {
        let maze = generated(3, 3, 5);
        let mut builder = MeshBuilder::new(&maze, 10.0, 5.0, 1.0, 1.0);
        builder.build();

        assert_eq!(builder.mesh().faces.len(), 12 * builder.cuboid_count());
    }

    #[test]
    fn vertices_are_shared_between_touching_cuboids() {
        let maze = generated(4, 4, 21);
        let mut builder = MeshBuilder::new(&maze, 10.0, 5.0, 1.0, 1.0);
        builder.build();

        // adjacent border wall segments alone guarantee shared corners
        assert!(builder.mesh().vertices.len() < 8 * builder.cuboid_count());
    }

    #[test]
    fn shared_vertices_are_bit_identical() {
        let maze = generated(3, 2, 8);
        let mut builder = MeshBuilder::new(&maze, 7.3, 4.1, 0.9, 1.7);
        builder.build();

        let vertices = &builder.mesh().vertices;
        for (i, a) in vertices.iter().enumerate() {
            for b in &vertices[i + 1..] {
                assert_ne!(a, b, "deduplication missed a coincident vertex pair");
            }
        }
    }

    #[test]
    fn rebuild_replaces_rather_than_appends() {
        let maze = generated(3, 3, 5);
        let mut builder = MeshBuilder::new(&maze, 10.0, 5.0, 1.0, 1.0);
        builder.build();
        let first = builder.mesh().clone();
        builder.build();
        assert_eq!(*builder.mesh(), first);
    }

    #[test]
    fn floor_only_configuration_is_a_single_cuboid() {
        let mut maze = generated(2, 2, 1);
        maze.clear_all_walls();

        let mut builder = MeshBuilder::new(&maze, 10.0, 5.0, 1.0, 1.0);
        builder.build();

        assert_eq!(builder.cuboid_count(), 1);
        assert_eq!(builder.mesh().vertices.len(), 8);
        assert_eq!(builder.mesh().faces.len(), 12);
        // footprint spans width * cell_size by height * cell_size
        assert!(builder.mesh().vertices.contains(&Vec3::new(20.0, 20.0, 0.0)));
        assert!(builder.mesh().vertices.contains(&Vec3::new(0.0, 0.0, 1.0)));
    }

    #[test]
    fn degenerate_dimensions_do_not_crash() {
        let maze = generated(2, 3, 4);
        let mut builder = MeshBuilder::new(&maze, 0.0, -1.0, 0.0, 0.0);
        builder.build();
        assert_eq!(builder.mesh().faces.len(), 12 * builder.cuboid_count());
    }
}
