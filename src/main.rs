use chrono::Utc;
use docopt::Docopt;
use error_chain::bail;
use serde_derive::Deserialize;

use maze3d::{
    generator::EllerMaze,
    pathing::{self, Distances},
    stl::export_maze_stl,
    units::{Height, Width},
};
use std::{
    fs::File,
    io::prelude::*,
};

const USAGE: &str = "Maze3d

Usage:
    maze3d -h | --help
    maze3d [(--grid-size=<n>|[--grid-width=<w> --grid-height=<h>])] [--seed=<s>] [text [--text-out=<path>] [--show-path]] [stl [--stl-out=<path>] [--cell-size=<c>] [--wall-height=<z>] [--wall-thickness=<t>] [--floor-thickness=<f>] [--ascii]]

Options:
    -h --help              Show this screen.
    --grid-size=<n>        The maze size is n * n cells.
    --grid-width=<w>       The maze width in a w*h cell maze [default: 10].
    --grid-height=<h>      The maze height in a w*h cell maze [default: 10].
    --seed=<s>             Seed for a reproducible maze. Random when omitted.
    --text-out=<path>      Write the textual rendering to a file instead of stdout.
    --show-path            Overlay the entrance to exit solution on the rendering.
    --stl-out=<path>       STL output file path. Defaults to maze_<unix-seconds>.stl.
    --cell-size=<c>        Side length of one maze cell [default: 10].
    --wall-height=<z>      Height of the walls above the floor [default: 5].
    --wall-thickness=<t>   Thickness of each wall segment [default: 1].
    --floor-thickness=<f>  Thickness of the floor slab [default: 1].
    --ascii                Write the text STL variant instead of binary.
";

#[derive(Debug, Deserialize)]
struct MazeArgs {
    flag_grid_size: Option<usize>,
    flag_grid_width: usize,
    flag_grid_height: usize,
    flag_seed: Option<u32>,
    cmd_text: bool,
    flag_text_out: String,
    flag_show_path: bool,
    cmd_stl: bool,
    flag_stl_out: String,
    flag_cell_size: f32,
    flag_wall_height: f32,
    flag_wall_thickness: f32,
    flag_floor_thickness: f32,
    flag_ascii: bool,
}

// Driver errors live here; library errors and io failures convert into them so
// `?` works throughout main.
mod errors {
    use error_chain::*;
    error_chain! {

        foreign_links {
            DocOptFailure(::docopt::Error);
            BadMaze(::maze3d::generator::MazeError);
            Io(::std::io::Error);
        }
    }
}
use crate::errors::*;

fn main() -> Result<()> {

    let args: MazeArgs = Docopt::new(USAGE).and_then(|d| d.deserialize())?;

    let (width, height) = if let Some(square_size) = args.flag_grid_size {
        (square_size, square_size)
    } else {
        (args.flag_grid_width, args.flag_grid_height)
    };

    let mut maze = EllerMaze::new(Width(width), Height(height), args.flag_seed)?;
    maze.generate();

    if args.cmd_text {
        let rendering = render_text(&maze, args.flag_show_path);
        if args.flag_text_out.is_empty() {
            println!("{}", rendering);
        } else {
            let mut file = File::create(&args.flag_text_out)
                .chain_err(|| format!("failed to create {}", args.flag_text_out))?;
            file.write_all(rendering.as_bytes())?;
        }
    }

    if args.cmd_stl {
        let out_path = if args.flag_stl_out.is_empty() {
            default_export_file_name()
        } else {
            args.flag_stl_out.clone()
        };

        let exported = export_maze_stl(&maze,
                                       &out_path,
                                       args.flag_cell_size,
                                       args.flag_wall_height,
                                       args.flag_wall_thickness,
                                       args.flag_floor_thickness,
                                       args.flag_ascii)
            .chain_err(|| format!("failed to write {}", out_path))?;
        if !exported {
            bail!("no generated maze to export");
        }
        println!("wrote {}", out_path);
    }

    Ok(())
}

fn default_export_file_name() -> String {
    format!("maze_{}.stl", Utc::now().timestamp())
}

/// Render the projection matrix as block glyphs, optionally overlaying the
/// entrance to exit solution path.
fn render_text(maze: &EllerMaze, show_path: bool) -> String {

    let matrix = maze.maze_matrix();
    let mut glyphs: Vec<Vec<&str>> = matrix.iter()
        .map(|matrix_row| {
            matrix_row.iter()
                      .map(|&wall| if wall { "██" } else { "  " })
                      .collect()
        })
        .collect();

    if show_path {
        if let Some(distances) = Distances::new(maze, maze.entrance()) {
            if let Some(path) = pathing::shortest_path(maze, &distances, maze.exit_point()) {
                for &(row, col) in &path {
                    glyphs[row * 2 + 1][col * 2 + 1] = "░░";
                }
                // passages between consecutive path cells
                for pair in path.windows(2) {
                    let matrix_row = pair[0].0 + pair[1].0 + 1;
                    let matrix_col = pair[0].1 + pair[1].1 + 1;
                    glyphs[matrix_row][matrix_col] = "░░";
                }
            }
        }
    }

    let mut rendering = String::new();
    for glyph_row in &glyphs {
        for glyph in glyph_row {
            rendering.push_str(glyph);
        }
        rendering.push('\n');
    }
    rendering
}
