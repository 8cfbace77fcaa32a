//! Disjoint set bookkeeping over cell indices.
//!
//! Kruskal's algorithm needs to know, for every candidate wall, whether the
//! cells either side of it are already joined by some carved passage. Cells
//! are keyed by their row major lattice index.

#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    /// Create `size` singleton sets, one per cell index.
    pub fn new(size: usize) -> UnionFind {
        UnionFind {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    /// The representative index of the set containing `index`.
    ///
    /// Two iterative passes: the first walks up to the root, the second
    /// re-points everything on the walked chain directly at it.
    pub fn find(&mut self, index: usize) -> usize {
        let mut root = index;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        let mut on_chain = index;
        while self.parent[on_chain] != root {
            let next = self.parent[on_chain];
            self.parent[on_chain] = root;
            on_chain = next;
        }

        root
    }

    /// Merge the sets holding `a` and `b`, attaching the shallower tree
    /// under the deeper. Returns false when they were already one set.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let a_root = self.find(a);
        let b_root = self.find(b);
        if a_root == b_root {
            return false;
        }

        if self.rank[a_root] < self.rank[b_root] {
            self.parent[a_root] = b_root;
        } else if self.rank[a_root] > self.rank[b_root] {
            self.parent[b_root] = a_root;
        } else {
            self.parent[b_root] = a_root;
            self.rank[a_root] += 1;
        }
        true
    }
}
