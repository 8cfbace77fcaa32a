use docopt::Docopt;
use serde_derive::Deserialize;
use mazegen::{
    generators::{self, Algorithm},
    units::{Height, Width},
};
use std::{
    io,
    io::prelude::*,
    fs::File,
};

const USAGE: &str = "Mazegen

Usage:
    mazegen_driver -h | --help
    mazegen_driver [backtracker|prim|kruskal|aldous-broder|wilson|eller] [--width=<w>] [--height=<h>] [--seed=<n>] [--text-out=<path>]

Options:
    -h --help          Show this screen.
    --width=<w>        The maze width in grid squares, must be odd [default: 21].
    --height=<h>       The maze height in grid squares, must be odd [default: 21].
    --seed=<n>         Random seed. Zero seeds from fresh entropy, any other value reproduces the same maze [default: 0].
    --text-out=<path>  Write the textual rendering of the maze to a file instead of stdout.
";

#[derive(Debug, Deserialize)]
struct MazeArgs {
    cmd_backtracker: bool,
    cmd_prim: bool,
    cmd_kruskal: bool,
    cmd_aldous_broder: bool,
    cmd_wilson: bool,
    cmd_eller: bool,
    flag_width: usize,
    flag_height: usize,
    flag_seed: u64,
    flag_text_out: String,
}

// We'll put our errors in an `errors` module, and the rest of the binary
// will `use errors::*;` to get access to everything `error_chain!` creates.
mod errors {
    use error_chain::*;
    error_chain! {

        links {
            Maze(::mazegen::errors::Error, ::mazegen::errors::ErrorKind);
        }

        foreign_links {
            DocOptFailure(::docopt::Error);
            Io(::std::io::Error);
        }
    }
}
use crate::errors::*;

fn main() -> Result<()> {

    let args: MazeArgs = Docopt::new(USAGE).and_then(|d| d.deserialize())?;

    let algorithm = selected_algorithm(&args);
    let maze = generators::generate(Width(args.flag_width),
                                    Height(args.flag_height),
                                    args.flag_seed,
                                    algorithm)?;

    if args.flag_text_out.is_empty() {
        println!("{}", maze);
    } else {
        write_text_to_file(&format!("{}", maze), &args.flag_text_out)
            .chain_err(|| format!("Failed to write maze to text file {}", args.flag_text_out))?;
    }

    Ok(())
}

fn selected_algorithm(maze_args: &MazeArgs) -> Algorithm {

    if maze_args.cmd_backtracker {
        Algorithm::Backtracker
    } else if maze_args.cmd_prim {
        Algorithm::Prim
    } else if maze_args.cmd_kruskal {
        Algorithm::Kruskal
    } else if maze_args.cmd_aldous_broder {
        Algorithm::AldousBroder
    } else if maze_args.cmd_wilson {
        Algorithm::Wilson
    } else if maze_args.cmd_eller {
        Algorithm::Eller
    } else {
        Algorithm::default()
    }
}

fn write_text_to_file(data: &str, file_name: &str) -> io::Result<()> {
    let mut f = File::create(file_name)?;
    f.write_all(data.as_bytes())?;
    Ok(())
}
