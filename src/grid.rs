use std::fmt;

use error_chain::bail;
use itertools::Itertools;

use crate::cells::{Cell, Direction, Lattice};
use crate::errors::*;
use crate::units::{ColumnsCount, Height, RowsCount, Width};

/// A rectangular maze as a boolean occupancy matrix: `true` is wall, `false`
/// is open floor.
///
/// Cells sit at odd `(x, y)` coordinate pairs and the even coordinates
/// between and around them hold the walls, which is why both dimensions must
/// be odd: the outermost ring is then wall on every side.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl Grid {
    /// Create an all walls grid. Errors if either dimension is even.
    pub fn new(width: Width, height: Height) -> Result<Grid> {
        let (width, height) = (width.0, height.0);
        if width % 2 == 0 || height % 2 == 0 {
            bail!(ErrorKind::InvalidDimensions(width, height));
        }

        Ok(Grid {
            width: width,
            height: height,
            cells: vec![true; width * height],
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

    /// The lattice of carvable cells this grid holds.
    pub fn lattice(&self) -> Lattice {
        Lattice::new(ColumnsCount((self.width - 1) / 2),
                     RowsCount((self.height - 1) / 2))
    }

    /// Is the given grid coordinate a wall?
    #[inline]
    pub fn is_wall(&self, x: usize, y: usize) -> bool {
        self.cells[y * self.width + x]
    }

    /// Is the lattice cell already open, i.e. carved into the maze?
    pub fn is_cell_open(&self, cell: Cell) -> bool {
        let (x, y) = grid_coordinate(cell);
        !self.is_wall(x, y)
    }

    /// Open the grid square underneath a lattice cell.
    pub fn open_cell(&mut self, cell: Cell) {
        let (x, y) = grid_coordinate(cell);
        self.open(x, y);
    }

    /// Carve a passage between two lattice adjacent cells: both cells and
    /// the wall between them become open floor. Carving the same pair again
    /// changes nothing.
    ///
    /// Panics if the cells are not adjacent on the lattice.
    pub fn carve(&mut self, a: Cell, b: Cell) {
        let (ax, ay) = grid_coordinate(a);
        let (bx, by) = grid_coordinate(b);
        assert!((ax == bx && ay.max(by) - ay.min(by) == 2) ||
                (ay == by && ax.max(bx) - ax.min(bx) == 2),
                "cells {:?} and {:?} are not adjacent on the lattice",
                a,
                b);

        self.open(ax, ay);
        self.open((ax + bx) / 2, (ay + by) / 2);
        self.open(bx, by);
    }

    /// Is the wall between two lattice adjacent cells carved through?
    pub fn is_carved_between(&self, a: Cell, b: Cell) -> bool {
        let (ax, ay) = grid_coordinate(a);
        let (bx, by) = grid_coordinate(b);
        !self.is_wall((ax + bx) / 2, (ay + by) / 2)
    }

    /// Number of carved passages between cell pairs. A perfect maze over `n`
    /// cells has exactly `n - 1`.
    pub fn carved_edge_count(&self) -> usize {
        let lattice = self.lattice();
        let mut count = 0;
        for cell in &lattice {
            // Looking east and south only so no passage is counted twice.
            for neighbour in [lattice.neighbour_at_direction(cell, Direction::East),
                              lattice.neighbour_at_direction(cell, Direction::South)]
                .iter()
                .filter_map(|neighbour_maybe| *neighbour_maybe) {
                if self.is_carved_between(cell, neighbour) {
                    count += 1;
                }
            }
        }
        count
    }

    fn open(&mut self, x: usize, y: usize) {
        self.cells[y * self.width + x] = false;
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {

        const WALL: char = '#';
        const FLOOR: char = ' ';

        let output = (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| if self.is_wall(x, y) { WALL } else { FLOOR })
                    .collect::<String>()
            })
            .join("\n");

        write!(f, "{}", output)
    }
}

fn grid_coordinate(cell: Cell) -> (usize, usize) {
    (2 * cell.col + 1, 2 * cell.row + 1)
}
