use rand::{Rng, SeedableRng, XorShiftRng};

use crate::cells::{Cell, CellSet, CellSmallVec, Direction};
use crate::errors::*;
use crate::grid::Grid;
use crate::union_find::UnionFind;
use crate::units::{Height, Width};
use crate::utils::fnv_hashmap;

/// The selectable maze generation strategies. Every one of them carves a
/// perfect maze, they differ in texture and cost.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Algorithm {
    Backtracker,
    Prim,
    Kruskal,
    AldousBroder,
    Wilson,
    Eller,
}

impl Algorithm {
    pub const ALL: [Algorithm; 6] = [Algorithm::Backtracker,
                                     Algorithm::Prim,
                                     Algorithm::Kruskal,
                                     Algorithm::AldousBroder,
                                     Algorithm::Wilson,
                                     Algorithm::Eller];
}

impl Default for Algorithm {
    fn default() -> Algorithm {
        Algorithm::Backtracker
    }
}

/// Generate a maze.
///
/// Checks that `width` and `height` are both odd, runs the chosen algorithm
/// over a fresh all walls grid, then opens the entrance at grid `(1, 1)` and
/// the exit at grid `(width - 2, height - 2)`.
///
/// A `seed` of zero draws fresh entropy so every call produces a different
/// maze. Any other seed reproduces the same maze for the same arguments,
/// bit for bit.
pub fn generate(width: Width, height: Height, seed: u64, algorithm: Algorithm) -> Result<Grid> {
    let mut grid = Grid::new(width, height)?;
    let mut rng = seeded_rng(seed);

    match algorithm {
        Algorithm::Backtracker => backtracker(&mut grid, &mut rng),
        Algorithm::Prim => prim(&mut grid, &mut rng),
        Algorithm::Kruskal => kruskal(&mut grid, &mut rng),
        Algorithm::AldousBroder => aldous_broder(&mut grid, &mut rng),
        Algorithm::Wilson => wilson(&mut grid, &mut rng),
        Algorithm::Eller => eller(&mut grid, &mut rng),
    }

    open_entrance_and_exit(&mut grid);

    Ok(grid)
}

/// `generate` with the default algorithm.
pub fn generate_default(width: Width, height: Height, seed: u64) -> Result<Grid> {
    generate(width, height, seed, Algorithm::default())
}

/// Randomized depth first search with an explicit stack.
///
/// From the top left cell the walk dives into a random still walled
/// neighbour, carving as it goes, and pops back only when the cell on top of
/// the stack is boxed in. Produces long winding corridors with few branches.
pub fn backtracker(grid: &mut Grid, rng: &mut XorShiftRng) {
    let lattice = grid.lattice();
    if lattice.size() == 0 {
        return;
    }

    let start = Cell::new(0, 0);
    grid.open_cell(start);
    let mut stack = vec![start];

    while let Some(&current) = stack.last() {
        let walled: CellSmallVec = lattice.neighbours(current)
            .iter()
            .filter(|neighbour| !grid.is_cell_open(**neighbour))
            .cloned()
            .collect();

        if walled.is_empty() {
            stack.pop();
        } else {
            let next = walled[rng.gen::<usize>() % walled.len()];
            grid.carve(current, next);
            stack.push(next);
        }
    }
}

/// Randomized Prim's algorithm, growing the maze outward from a random cell.
///
/// Keeps a frontier of walled cells bordering the maze, each listed at most
/// once thanks to a membership marker. Detaching a random frontier cell and
/// carving it to a random already carved neighbour gives mazes with many
/// short dead ends.
pub fn prim(grid: &mut Grid, rng: &mut XorShiftRng) {
    let lattice = grid.lattice();
    if lattice.size() == 0 {
        return;
    }

    let mut in_maze = CellSet::new(&lattice);
    let mut in_frontier = CellSet::new(&lattice);
    let mut frontier: Vec<Cell> = Vec::new();

    let start = lattice.random_cell(rng);
    grid.open_cell(start);
    in_maze.mark(start);
    for neighbour in lattice.neighbours(start).iter() {
        in_frontier.mark(*neighbour);
        frontier.push(*neighbour);
    }

    while !frontier.is_empty() {
        let chosen = rng.gen::<usize>() % frontier.len();
        let cell = frontier.swap_remove(chosen);
        in_frontier.unmark(cell);

        let carved_neighbours: CellSmallVec = lattice.neighbours(cell)
            .iter()
            .filter(|neighbour| in_maze.contains(**neighbour))
            .cloned()
            .collect();
        if carved_neighbours.is_empty() {
            continue;
        }

        let attach_to = carved_neighbours[rng.gen::<usize>() % carved_neighbours.len()];
        grid.carve(attach_to, cell);
        in_maze.mark(cell);

        for neighbour in lattice.neighbours(cell).iter() {
            if !in_maze.contains(*neighbour) && !in_frontier.contains(*neighbour) {
                in_frontier.mark(*neighbour);
                frontier.push(*neighbour);
            }
        }
    }
}

/// Randomized Kruskal's algorithm over the candidate walls.
///
/// Lists the east and south wall of every cell once, in row major order,
/// shuffles, then knocks a wall through whenever its two sides belong to
/// different connected sets, tracked in a union-find over cell indices.
pub fn kruskal(grid: &mut Grid, rng: &mut XorShiftRng) {
    let lattice = grid.lattice();
    if lattice.size() == 0 {
        return;
    }

    grid.open_cell(Cell::new(0, 0));

    let mut edges: Vec<(Cell, Cell)> = Vec::with_capacity(2 * lattice.size());
    for cell in &lattice {
        for neighbour in [lattice.neighbour_at_direction(cell, Direction::East),
                          lattice.neighbour_at_direction(cell, Direction::South)]
            .iter()
            .filter_map(|neighbour_maybe| *neighbour_maybe) {
            edges.push((cell, neighbour));
        }
    }
    rng.shuffle(&mut edges);

    let mut connected = UnionFind::new(lattice.size());
    for (a, b) in edges {
        if connected.union(lattice.cell_index(a), lattice.cell_index(b)) {
            grid.carve(a, b);
        }
    }
}

/// Aldous-Broder unbiased random walk.
///
/// Wanders uniformly at random over the lattice, carving the arrival passage
/// whenever the walk steps onto a cell for the first time. Samples uniformly
/// from every possible maze, paying for it with aimless revisits while
/// hunting down the last unvisited cells.
pub fn aldous_broder(grid: &mut Grid, rng: &mut XorShiftRng) {
    let lattice = grid.lattice();
    if lattice.size() == 0 {
        return;
    }

    let mut visited = CellSet::new(&lattice);
    let mut current = lattice.random_cell(rng);
    grid.open_cell(current);
    visited.mark(current);

    while visited.count() < lattice.size() {
        let neighbours = lattice.neighbours(current);
        let next = neighbours[rng.gen::<usize>() % neighbours.len()];

        if !visited.contains(next) {
            grid.carve(current, next);
            visited.mark(next);
        }
        current = next;
    }
}

/// Wilson's algorithm: loop erased random walks.
///
/// A single random cell seeds the tree. Every round walks randomly from a
/// cell outside the tree; whenever the walk crosses its own path the loop
/// just made is erased by truncating back to the first visit. On reaching
/// the tree the surviving path is carved and absorbed. Samples uniformly
/// like Aldous-Broder, without the slow endgame.
pub fn wilson(grid: &mut Grid, rng: &mut XorShiftRng) {
    let lattice = grid.lattice();
    if lattice.size() == 0 {
        return;
    }

    let mut in_tree = CellSet::new(&lattice);
    let seed_cell = lattice.random_cell(rng);
    grid.open_cell(seed_cell);
    in_tree.mark(seed_cell);

    // Walk state, reused between rounds. The map stays in lockstep with the
    // path, giving each on-path cell index its position.
    let mut path: Vec<Cell> = Vec::new();
    let mut position_on_path = fnv_hashmap::<usize, usize>(lattice.size());

    while in_tree.count() < lattice.size() {
        let mut start = lattice.random_cell(rng);
        while in_tree.contains(start) {
            start = lattice.random_cell(rng);
        }

        path.clear();
        position_on_path.clear();
        path.push(start);
        position_on_path.insert(lattice.cell_index(start), 0);

        let mut current = start;
        while !in_tree.contains(current) {
            let neighbours = lattice.neighbours(current);
            let next = neighbours[rng.gen::<usize>() % neighbours.len()];

            if let Some(&rejoin_at) = position_on_path.get(&lattice.cell_index(next)) {
                for erased in path.drain(rejoin_at + 1..) {
                    position_on_path.remove(&lattice.cell_index(erased));
                }
                current = next;
            } else {
                position_on_path.insert(lattice.cell_index(next), path.len());
                path.push(next);
                current = next;
            }
        }

        // The last path element is the tree cell the walk ran into.
        for pair in path.windows(2) {
            grid.carve(pair[0], pair[1]);
            in_tree.mark(pair[0]);
            in_tree.mark(pair[1]);
        }
    }
}

/// Eller's algorithm, streaming the maze a row at a time.
///
/// Each row carries set labels recording which of its cells are already
/// connected. Horizontal merges join differing sets on a coin flip, forced
/// on the last row so the maze ends up fully connected; then every set
/// carves at least one passage downward and cells left without one start
/// the next row in fresh singleton sets. The downward carves never need a
/// cycle check: the row below is untouched, so each one reaches a brand new
/// cell.
pub fn eller(grid: &mut Grid, rng: &mut XorShiftRng) {
    let lattice = grid.lattice();
    if lattice.size() == 0 {
        return;
    }

    let columns = lattice.columns();
    let rows = lattice.rows();

    let mut row_sets: Vec<usize> = (1..columns + 1).collect();
    let mut next_set_id = columns + 1;

    for row in 0..rows {
        let is_last_row = row == rows - 1;

        for col in 0..columns {
            grid.open_cell(Cell::new(col, row));
        }

        // Join differing sets to the east on a coin flip, always on the
        // last row.
        for col in 0..columns - 1 {
            if row_sets[col] != row_sets[col + 1] && (is_last_row || rng.gen::<bool>()) {
                grid.carve(Cell::new(col, row), Cell::new(col + 1, row));

                let absorbed = row_sets[col + 1];
                let winner = row_sets[col];
                for set in row_sets.iter_mut() {
                    if *set == absorbed {
                        *set = winner;
                    }
                }
            }
        }

        if is_last_row {
            break;
        }

        let mut members_by_set = fnv_hashmap::<usize, Vec<usize>>(columns);
        for col in 0..columns {
            members_by_set.entry(row_sets[col]).or_insert_with(Vec::new).push(col);
        }

        // Every set sends at least one passage down to stay reachable.
        let mut carved_down = vec![false; columns];
        for members in members_by_set.values_mut() {
            let guaranteed = 1 + rng.gen::<usize>() % members.len().max(1);
            rng.shuffle(members);
            for (position, &col) in members.iter().enumerate() {
                if position < guaranteed || rng.gen::<bool>() {
                    grid.carve(Cell::new(col, row), Cell::new(col, row + 1));
                    carved_down[col] = true;
                }
            }
        }

        for col in 0..columns {
            if !carved_down[col] {
                row_sets[col] = next_set_id;
                next_set_id += 1;
            }
        }
    }
}

/// Open the fixed entrance and exit: the cells just inside the top left and
/// bottom right corners. Skipped on degenerate grids with nothing to carve,
/// which stay all walls.
fn open_entrance_and_exit(grid: &mut Grid) {
    let lattice = grid.lattice();
    if lattice.size() == 0 {
        return;
    }
    grid.open_cell(Cell::new(lattice.columns() - 1, lattice.rows() - 1));
    grid.open_cell(Cell::new(0, 0));
}

fn seeded_rng(seed: u64) -> XorShiftRng {
    let seed = if seed == 0 {
        rand::thread_rng().gen::<u64>()
    } else {
        seed
    };
    // XorShift state must not be all zero; the fixed words keep any u64 valid.
    XorShiftRng::from_seed([seed as u32, (seed >> 32) as u32, 0x9e3779b9, 0x2545f491])
}

#[cfg(test)]
mod tests {

    use super::*;
    use petgraph::algo::connected_components;
    use petgraph::{Graph, Undirected};
    use quickcheck::quickcheck;

    /// A perfect maze opens every cell and its carved passages form one
    /// connected component with exactly `cells - 1` edges, so no cycles.
    fn assert_perfect_maze(grid: &Grid) {
        let lattice = grid.lattice();
        let cells_count = lattice.size();
        if cells_count == 0 {
            return;
        }

        let mut graph = Graph::<(), (), Undirected>::new_undirected();
        let node_indices: Vec<_> = (0..cells_count).map(|_| graph.add_node(())).collect();
        for cell in &lattice {
            assert!(grid.is_cell_open(cell), "walled in cell {:?}", cell);
            for neighbour in [lattice.neighbour_at_direction(cell, Direction::East),
                              lattice.neighbour_at_direction(cell, Direction::South)]
                .iter()
                .filter_map(|neighbour_maybe| *neighbour_maybe) {
                if grid.is_carved_between(cell, neighbour) {
                    graph.add_edge(node_indices[lattice.cell_index(cell)],
                                   node_indices[lattice.cell_index(neighbour)],
                                   ());
                }
            }
        }

        assert_eq!(grid.carved_edge_count(), cells_count - 1);
        assert_eq!(graph.edge_count(), cells_count - 1);
        assert_eq!(connected_components(&graph), 1);
    }

    fn assert_entrance_and_exit_open(grid: &Grid) {
        assert!(!grid.is_wall(1, 1));
        assert!(!grid.is_wall(grid.width() - 2, grid.height() - 2));
    }

    fn check_perfect_mazes_at_many_sizes(algorithm: Algorithm) {
        for &(width, height) in &[(3, 3), (5, 5), (21, 11), (11, 21), (33, 33)] {
            let maze = generate(Width(width), Height(height), 97, algorithm)
                .expect("odd dimensions");
            assert_perfect_maze(&maze);
            assert_entrance_and_exit_open(&maze);
        }
    }

    #[test]
    fn backtracker_carves_perfect_mazes() {
        check_perfect_mazes_at_many_sizes(Algorithm::Backtracker);
    }

    #[test]
    fn prim_carves_perfect_mazes() {
        check_perfect_mazes_at_many_sizes(Algorithm::Prim);
    }

    #[test]
    fn kruskal_carves_perfect_mazes() {
        check_perfect_mazes_at_many_sizes(Algorithm::Kruskal);
    }

    #[test]
    fn aldous_broder_carves_perfect_mazes() {
        check_perfect_mazes_at_many_sizes(Algorithm::AldousBroder);
    }

    #[test]
    fn wilson_carves_perfect_mazes() {
        check_perfect_mazes_at_many_sizes(Algorithm::Wilson);
    }

    #[test]
    fn eller_carves_perfect_mazes() {
        check_perfect_mazes_at_many_sizes(Algorithm::Eller);
    }

    #[test]
    fn algorithms_can_run_on_a_caller_made_grid() {
        let mut maze = Grid::new(Width(9), Height(9)).expect("odd dimensions");
        let mut rng = XorShiftRng::from_seed([3, 5, 7, 11]);
        eller(&mut maze, &mut rng);
        assert_perfect_maze(&maze);
    }

    #[test]
    fn entrance_and_exit_are_forced_open() {
        for &algorithm in Algorithm::ALL.iter() {
            let maze = generate(Width(11), Height(11), 31, algorithm).expect("odd dimensions");
            assert!(!maze.is_wall(1, 1));
            assert!(!maze.is_wall(9, 9));
        }
    }

    #[test]
    fn even_dimensions_are_rejected() {
        for &algorithm in Algorithm::ALL.iter() {
            for &(width, height) in &[(10, 11), (11, 10), (0, 11), (8, 8)] {
                match generate(Width(width), Height(height), 1, algorithm) {
                    Err(ref e) => {
                        match *e.kind() {
                            ErrorKind::InvalidDimensions(w, h) => {
                                assert_eq!((w, h), (width, height));
                            }
                            _ => panic!("unexpected error for {}x{}", width, height),
                        }
                    }
                    Ok(_) => panic!("{}x{} must not generate", width, height),
                }
            }
        }
    }

    #[test]
    fn degenerate_dimensions_stay_all_walls() {
        for &algorithm in Algorithm::ALL.iter() {
            for &(width, height) in &[(1, 1), (1, 21), (21, 1)] {
                let maze = generate(Width(width), Height(height), 5, algorithm)
                    .expect("odd dimensions");
                for y in 0..maze.height() {
                    for x in 0..maze.width() {
                        assert!(maze.is_wall(x, y));
                    }
                }
            }
        }
    }

    #[test]
    fn fixed_seeds_reproduce_the_same_maze() {
        for &algorithm in Algorithm::ALL.iter() {
            let first = generate(Width(21), Height(13), 12345, algorithm).expect("odd dimensions");
            let second = generate(Width(21), Height(13), 12345, algorithm).expect("odd dimensions");
            assert_eq!(first, second);
        }
    }

    #[test]
    fn different_seeds_give_different_mazes() {
        let first = generate(Width(21), Height(21), 11111, Algorithm::Backtracker)
            .expect("odd dimensions");
        let second = generate(Width(21), Height(21), 22222, Algorithm::Backtracker)
            .expect("odd dimensions");
        assert_ne!(first, second);
    }

    #[test]
    fn seed_zero_draws_fresh_entropy() {
        let mazes: Vec<Grid> = (0..20)
            .map(|_| {
                generate(Width(21), Height(21), 0, Algorithm::Backtracker)
                    .expect("odd dimensions")
            })
            .collect();
        assert!(mazes.iter().any(|maze| *maze != mazes[0]));
    }

    #[test]
    fn default_algorithm_is_the_backtracker() {
        let via_default = generate_default(Width(13), Height(13), 99).expect("odd dimensions");
        let explicit = generate(Width(13), Height(13), 99, Algorithm::Backtracker)
            .expect("odd dimensions");
        assert_eq!(via_default, explicit);
    }

    #[test]
    fn five_by_five_kruskal_is_a_three_edge_tree() {
        let maze = generate(Width(5), Height(5), 42, Algorithm::Kruskal).expect("odd dimensions");
        assert_eq!(maze.lattice().size(), 4);
        assert_eq!(maze.carved_edge_count(), 3);
        assert_perfect_maze(&maze);

        let again = generate(Width(5), Height(5), 42, Algorithm::Kruskal).expect("odd dimensions");
        assert_eq!(maze, again);
    }

    #[test]
    fn three_by_three_wilson_is_a_single_open_cell() {
        let maze = generate(Width(3), Height(3), 7, Algorithm::Wilson).expect("odd dimensions");
        assert_eq!(maze.carved_edge_count(), 0);
        for y in 0..3 {
            for x in 0..3 {
                // The lone cell doubles as entrance and exit.
                assert_eq!(maze.is_wall(x, y), !(x == 1 && y == 1));
            }
        }
    }

    #[test]
    fn quickcheck_every_algorithm_carves_spanning_trees() {

        fn p(width_steps: u8, height_steps: u8, seed: u64, algorithm_pick: u8) -> bool {
            let width = 2 * ((width_steps % 8) as usize) + 3;
            let height = 2 * ((height_steps % 8) as usize) + 3;
            let algorithm = Algorithm::ALL[(algorithm_pick % 6) as usize];
            let seed = seed.max(1);

            let maze = generate(Width(width), Height(height), seed, algorithm)
                .expect("dimensions are odd by construction");
            let lattice = maze.lattice();

            let mut connectivity = UnionFind::new(lattice.size());
            let mut components = lattice.size();
            for cell in &lattice {
                for neighbour in [lattice.neighbour_at_direction(cell, Direction::East),
                                  lattice.neighbour_at_direction(cell, Direction::South)]
                    .iter()
                    .filter_map(|neighbour_maybe| *neighbour_maybe) {
                    if maze.is_carved_between(cell, neighbour) &&
                       connectivity.union(lattice.cell_index(cell),
                                          lattice.cell_index(neighbour)) {
                        components -= 1;
                    }
                }
            }

            components == 1 && maze.carved_edge_count() == lattice.size() - 1 &&
            lattice.iter().all(|cell| maze.is_cell_open(cell)) &&
            !maze.is_wall(1, 1) &&
            !maze.is_wall(maze.width() - 2, maze.height() - 2)
        }
        quickcheck(p as fn(u8, u8, u64, u8) -> bool)
    }
}
