use bit_set::BitSet;
use rand::{Rng, XorShiftRng};
use smallvec::SmallVec;

use crate::units::{ColumnsCount, RowsCount};

/// A cell on the generation lattice, addressed by column and row.
///
/// Lattice cell `(col, row)` sits at grid coordinate `(2*col + 1, 2*row + 1)`;
/// the even grid coordinates between and around the cells hold walls.
#[derive(Hash, Eq, PartialEq, Debug, Copy, Clone, Ord, PartialOrd)]
pub struct Cell {
    pub col: usize,
    pub row: usize,
}
impl Cell {
    pub fn new(col: usize, row: usize) -> Cell {
        Cell { col: col, row: row }
    }
}
pub type CellSmallVec = SmallVec<[Cell; 4]>;

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

/// The cells available for carving on a grid, as a `columns x rows` lattice.
///
/// A `width x height` grid holds a `(width - 1) / 2` by `(height - 1) / 2`
/// lattice. Either count may be zero, leaving nothing to carve.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct Lattice {
    columns: usize,
    rows: usize,
}

impl Lattice {
    pub fn new(columns: ColumnsCount, rows: RowsCount) -> Lattice {
        Lattice {
            columns: columns.0,
            rows: rows.0,
        }
    }

    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.columns * self.rows
    }

    /// Row major index of a cell, usable as a key into per cell tables.
    #[inline]
    pub fn cell_index(&self, cell: Cell) -> usize {
        cell.row * self.columns + cell.col
    }

    /// The cell at a row major index. Inverse of `cell_index`.
    #[inline]
    pub fn cell_from_index(&self, index: usize) -> Cell {
        let row = index / self.columns;
        let col = index - (row * self.columns);
        Cell {
            col: col,
            row: row,
        }
    }

    /// Cells adjacent on the lattice: North, South, East then West, skipping
    /// any that would fall off the lattice edge.
    pub fn neighbours(&self, cell: Cell) -> CellSmallVec {

        [self.neighbour_at_direction(cell, Direction::North),
         self.neighbour_at_direction(cell, Direction::South),
         self.neighbour_at_direction(cell, Direction::East),
         self.neighbour_at_direction(cell, Direction::West)]
            .iter()
            .filter_map(|neighbour_maybe| *neighbour_maybe)
            .collect()
    }

    /// The adjacent cell in the given direction, if it is on the lattice.
    pub fn neighbour_at_direction(&self, cell: Cell, direction: Direction) -> Option<Cell> {
        let (col, row) = (cell.col, cell.row);
        match direction {
            Direction::North => {
                if row > 0 {
                    Some(Cell::new(col, row - 1))
                } else {
                    None
                }
            }
            Direction::South => {
                if row + 1 < self.rows {
                    Some(Cell::new(col, row + 1))
                } else {
                    None
                }
            }
            Direction::East => {
                if col + 1 < self.columns {
                    Some(Cell::new(col + 1, row))
                } else {
                    None
                }
            }
            Direction::West => {
                if col > 0 {
                    Some(Cell::new(col - 1, row))
                } else {
                    None
                }
            }
        }
    }

    /// A uniformly random cell on the lattice.
    ///
    /// Panics if the lattice has no cells.
    pub fn random_cell(&self, rng: &mut XorShiftRng) -> Cell {
        let index = rng.gen::<usize>() % self.size();
        self.cell_from_index(index)
    }

    pub fn iter(&self) -> CellIter {
        CellIter {
            current_cell_number: 0,
            columns: self.columns,
            cells_count: self.size(),
        }
    }
}

/// Row major iterator over every cell on a lattice.
#[derive(Debug, Copy, Clone)]
pub struct CellIter {
    current_cell_number: usize,
    columns: usize,
    cells_count: usize,
}
impl Iterator for CellIter {
    type Item = Cell;
    fn next(&mut self) -> Option<Self::Item> {
        if self.current_cell_number < self.cells_count {
            let row = self.current_cell_number / self.columns;
            let col = self.current_cell_number - (row * self.columns);
            self.current_cell_number += 1;
            Some(Cell::new(col, row))
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let lower_bound = self.cells_count - self.current_cell_number;
        let upper_bound = lower_bound;
        (lower_bound, Some(upper_bound))
    }
}

impl<'a> IntoIterator for &'a Lattice {
    type Item = Cell;
    type IntoIter = CellIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A set of lattice cells backed by one bit per cell.
///
/// The generators keep several per cell flags this way (visited, frontier
/// membership, absorbed into the tree) and want the marked count without a
/// scan.
#[derive(Debug, Clone)]
pub struct CellSet {
    bits: BitSet,
    lattice: Lattice,
    marked: usize,
}

impl CellSet {
    pub fn new(lattice: &Lattice) -> CellSet {
        CellSet {
            bits: BitSet::with_capacity(lattice.size()),
            lattice: *lattice,
            marked: 0,
        }
    }

    /// Add a cell to the set. An already marked cell leaves the count alone.
    pub fn mark(&mut self, cell: Cell) {
        if self.bits.insert(self.lattice.cell_index(cell)) {
            self.marked += 1;
        }
    }

    /// Take a cell back out of the set.
    pub fn unmark(&mut self, cell: Cell) {
        if self.bits.remove(self.lattice.cell_index(cell)) {
            self.marked -= 1;
        }
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.bits.contains(self.lattice.cell_index(cell))
    }

    /// How many cells are currently marked.
    #[inline]
    pub fn count(&self) -> usize {
        self.marked
    }
}
