//! STL serialization of a built mesh, in both the text and the fixed-layout binary
//! encoding. The binary layout is the conventional one: an 80 byte header, a little
//! endian u32 triangle count, then 50 bytes per triangle (normal, three vertices,
//! zero attribute count).

use glam::Vec3;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::generator::EllerMaze;
use crate::mesh::{Mesh, MeshBuilder};

/// Solid name written to the ASCII header and footer lines.
pub const SOLID_NAME: &str = "maze_3D";

/// Model identifier at the start of the 80 byte binary header, space padded.
const BINARY_HEADER_TAG: &[u8] = b"3D Maze Model";

/// Serializes a mesh to STL. Borrows the mesh immutably; writing never changes it.
pub struct StlWriter<'a> {
    mesh: &'a Mesh,
}

impl<'a> StlWriter<'a> {
    pub fn new(mesh: &'a Mesh) -> StlWriter<'a> {
        StlWriter { mesh }
    }

    /// Normalized cross product of the triangle edges, in vertex winding order.
    /// Zero-area triangles get the fixed default normal instead of a NaN vector.
    fn facet_normal(&self, face: [u32; 3]) -> Vec3 {
        let a = self.mesh.vertices[face[0] as usize];
        let b = self.mesh.vertices[face[1] as usize];
        let c = self.mesh.vertices[face[2] as usize];

        let normal = (b - a).cross(c - a).normalize_or_zero();
        if normal == Vec3::ZERO {
            Vec3::Z
        } else {
            normal
        }
    }

    /// Text encoding: solid header, one facet block per triangle, solid footer.
    pub fn write_ascii<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "solid {}", SOLID_NAME)?;

        for &face in &self.mesh.faces {
            let normal = self.facet_normal(face);
            writeln!(out, "  facet normal {} {} {}", normal.x, normal.y, normal.z)?;
            writeln!(out, "    outer loop")?;
            for &index in &face {
                let vertex = self.mesh.vertices[index as usize];
                writeln!(out, "      vertex {} {} {}", vertex.x, vertex.y, vertex.z)?;
            }
            writeln!(out, "    endloop")?;
            writeln!(out, "  endfacet")?;
        }

        writeln!(out, "endsolid {}", SOLID_NAME)?;
        Ok(())
    }

    /// Binary encoding: 80 byte header + u32 count + 50 bytes per triangle.
    pub fn write_binary<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let mut header = [b' '; 80];
        header[..BINARY_HEADER_TAG.len()].copy_from_slice(BINARY_HEADER_TAG);
        out.write_all(&header)?;

        out.write_all(&(self.mesh.faces.len() as u32).to_le_bytes())?;

        for &face in &self.mesh.faces {
            write_vector(out, self.facet_normal(face))?;
            for &index in &face {
                write_vector(out, self.mesh.vertices[index as usize])?;
            }
            out.write_all(&0u16.to_le_bytes())?;
        }

        Ok(())
    }

    /// Write the mesh to a file in the chosen encoding.
    pub fn export<P: AsRef<Path>>(&self, path: P, ascii: bool) -> io::Result<()> {
        let file = File::create(path)?;
        let mut out = BufWriter::new(file);
        if ascii {
            self.write_ascii(&mut out)?;
        } else {
            self.write_binary(&mut out)?;
        }
        out.flush()
    }
}

fn write_vector<W: Write>(out: &mut W, v: Vec3) -> io::Result<()> {
    for &component in &[v.x, v.y, v.z] {
        out.write_all(&component.to_le_bytes())?;
    }
    Ok(())
}

/// One-call export of a maze: build the solid and write it to `path`.
///
/// Returns `Ok(false)` without touching the filesystem when the maze has not been
/// generated yet; the caller can prompt for generation instead of failing. File
/// I/O errors propagate.
pub fn export_maze_stl<P: AsRef<Path>>(maze: &EllerMaze,
                                       path: P,
                                       cell_size: f32,
                                       wall_height: f32,
                                       wall_thickness: f32,
                                       floor_thickness: f32,
                                       ascii: bool)
                                       -> io::Result<bool> {
    if !maze.is_generated() {
        return Ok(false);
    }

    let mut builder = MeshBuilder::new(maze, cell_size, wall_height, wall_thickness,
                                       floor_thickness);
    builder.build();
    StlWriter::new(builder.mesh()).export(path, ascii)?;
    Ok(true)
}
