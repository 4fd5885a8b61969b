//! First homology via the dual skeleton.
//!
//! The fundamental group of the underlying manifold (with ideal vertices
//! removed and real boundary retained) is presented by the dual 2-complex:
//! one generator for each internal triangle outside a dual spanning
//! forest, and one relation for each internal edge, reading off the
//! triangles crossed while circling the edge.  Abelianising and running
//! Smith normal form over the integers yields H₁.

use ndarray::Array2;

use crate::tetrahedron::FaceGluing;
use crate::triangulation::Triangulation;

/// A finitely generated abelian group in invariant factor form:
/// ℤ^rank ⊕ ℤ/d₁ ⊕ … ⊕ ℤ/dₖ with d₁ | d₂ | … | dₖ and every dᵢ > 1.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbelianGroup {
    rank: usize,
    invariant_factors: Vec<u64>,
}

impl AbelianGroup {
    /// The trivial group.
    pub fn trivial() -> AbelianGroup {
        AbelianGroup {
            rank: 0,
            invariant_factors: Vec::new(),
        }
    }

    /// A free abelian group of the given rank.
    pub fn free(rank: usize) -> AbelianGroup {
        AbelianGroup {
            rank,
            invariant_factors: Vec::new(),
        }
    }

    /// Builds the cokernel of a relation matrix acting on `generators`
    /// free generators: rows are relations, columns are generators.
    pub fn from_presentation(relations: Array2<i64>, generators: usize) -> AbelianGroup {
        debug_assert_eq!(relations.ncols(), generators);
        let diagonal = smith_diagonal(relations);
        AbelianGroup {
            rank: generators - diagonal.len(),
            invariant_factors: diagonal
                .into_iter()
                .filter(|&d| d > 1)
                .map(|d| d as u64)
                .collect(),
        }
    }

    /// The free rank.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// The invariant factors d₁ | d₂ | … | dₖ, each greater than 1.
    pub fn invariant_factors(&self) -> &[u64] {
        &self.invariant_factors
    }

    /// Whether this is the trivial group.
    pub fn is_trivial(&self) -> bool {
        self.rank == 0 && self.invariant_factors.is_empty()
    }

    /// Whether this is infinite cyclic.
    pub fn is_z(&self) -> bool {
        self.rank == 1 && self.invariant_factors.is_empty()
    }

    /// The number of invariant factors divisible by `p`: the rank of the
    /// p-torsion subgroup for prime `p`.
    pub fn torsion_rank(&self, p: u64) -> usize {
        self.invariant_factors
            .iter()
            .filter(|&&d| d % p == 0)
            .count()
    }
}

impl std::fmt::Display for AbelianGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        match self.rank {
            0 => {}
            1 => parts.push("Z".into()),
            r => parts.push(format!("Z^{r}")),
        }
        for d in &self.invariant_factors {
            parts.push(format!("Z/{d}"));
        }
        if parts.is_empty() {
            write!(f, "0")
        } else {
            write!(f, "{}", parts.join(" + "))
        }
    }
}

/// Computes H₁ of a triangulation from the dual-skeleton presentation.
///
/// Precondition: the triangulation is valid (the recognisers check this
/// before calling).  Invalid edges are skipped rather than misread.
pub(crate) fn homology_h1(tri: &Triangulation) -> AbelianGroup {
    let skel = tri.skeleton();
    let n = tri.num_tetrahedra();
    if n == 0 {
        return AbelianGroup::trivial();
    }

    // Grow a dual spanning forest over the tetrahedra.
    let mut in_forest = vec![false; skel.triangles().len()];
    let mut visited = vec![false; n];
    for root in 0..n {
        if visited[root] {
            continue;
        }
        visited[root] = true;
        let mut queue = vec![root];
        while let Some(t) = queue.pop() {
            for face in 0..4 {
                let Some(FaceGluing { tet: u, .. }) = tri.tets()[t].adj[face] else {
                    continue;
                };
                if !visited[u] {
                    visited[u] = true;
                    in_forest[skel.tet_triangle(t, face)] = true;
                    queue.push(u);
                }
            }
        }
    }

    // Generators: internal triangles outside the forest.
    let mut generator = vec![usize::MAX; skel.triangles().len()];
    let mut num_generators = 0;
    for (i, triangle) in skel.triangles().iter().enumerate() {
        if !triangle.is_boundary() && !in_forest[i] {
            generator[i] = num_generators;
            num_generators += 1;
        }
    }

    // Relations: circle each internal edge, recording signed crossings.
    // A crossing is positive when it exits through the triangle's first
    // embedding.
    let mut rows: Vec<Vec<i64>> = Vec::new();
    for edge in skel.edges() {
        if edge.is_boundary() || !edge.is_valid() {
            continue;
        }
        let mut row = vec![0i64; num_generators];
        for emb in edge.embeddings() {
            let exit = skel.tet_edge_mapping(emb.tet, emb.edge).apply(3);
            let class = skel.tet_triangle(emb.tet, exit);
            let g = generator[class];
            if g == usize::MAX {
                continue;
            }
            let first = skel.triangles()[class].embeddings()[0];
            if (first.tet, first.face) == (emb.tet, exit) {
                row[g] += 1;
            } else {
                row[g] -= 1;
            }
        }
        rows.push(row);
    }

    let mut matrix = Array2::zeros((rows.len(), num_generators));
    for (i, row) in rows.iter().enumerate() {
        for (j, &x) in row.iter().enumerate() {
            matrix[[i, j]] = x;
        }
    }
    AbelianGroup::from_presentation(matrix, num_generators)
}

/// Reduces an integer matrix to Smith normal form and returns the nonzero
/// diagonal entries, which satisfy the divisibility chain.
fn smith_diagonal(mut m: Array2<i64>) -> Vec<i64> {
    let (rows, cols) = m.dim();
    let mut diag = Vec::new();
    let mut t = 0;
    'outer: while t < rows.min(cols) {
        // Pivot on a smallest-magnitude nonzero entry of the trailing block.
        let mut pivot: Option<(usize, usize)> = None;
        for i in t..rows {
            for j in t..cols {
                if m[[i, j]] != 0
                    && pivot.map_or(true, |(pi, pj)| m[[i, j]].abs() < m[[pi, pj]].abs())
                {
                    pivot = Some((i, j));
                }
            }
        }
        let Some((pi, pj)) = pivot else { break };
        swap_rows(&mut m, t, pi);
        swap_cols(&mut m, t, pj);

        // Clear row and column t by Euclidean steps.
        loop {
            let mut cleared = true;
            for i in (t + 1)..rows {
                if m[[i, t]] != 0 {
                    let q = m[[i, t]] / m[[t, t]];
                    for j in t..cols {
                        let sub = q * m[[t, j]];
                        m[[i, j]] -= sub;
                    }
                    if m[[i, t]] != 0 {
                        swap_rows(&mut m, t, i);
                        cleared = false;
                    }
                }
            }
            for j in (t + 1)..cols {
                if m[[t, j]] != 0 {
                    let q = m[[t, j]] / m[[t, t]];
                    for i in t..rows {
                        let sub = q * m[[i, t]];
                        m[[i, j]] -= sub;
                    }
                    if m[[t, j]] != 0 {
                        swap_cols(&mut m, t, j);
                        cleared = false;
                    }
                }
            }
            if cleared {
                break;
            }
        }

        // Restore the divisibility chain if the trailing block disagrees.
        let d = m[[t, t]];
        for i in (t + 1)..rows {
            for j in (t + 1)..cols {
                if m[[i, j]] % d != 0 {
                    for j2 in t..cols {
                        let add = m[[i, j2]];
                        m[[t, j2]] += add;
                    }
                    continue 'outer;
                }
            }
        }
        diag.push(d.abs());
        t += 1;
    }
    diag
}

fn swap_rows(m: &mut Array2<i64>, a: usize, b: usize) {
    if a != b {
        for j in 0..m.ncols() {
            m.swap([a, j], [b, j]);
        }
    }
}

fn swap_cols(m: &mut Array2<i64>, a: usize, b: usize) {
    if a != b {
        for i in 0..m.nrows() {
            m.swap([i, a], [i, b]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perm::Perm4;
    use ndarray::array;

    fn p(a: u8, b: u8, c: u8, d: u8) -> Perm4 {
        Perm4::from_images(a, b, c, d).unwrap()
    }

    #[test]
    fn test_smith_diagonal() {
        assert_eq!(smith_diagonal(array![[2, 0], [0, 3]]), vec![1, 6]);
        assert_eq!(smith_diagonal(array![[2, 4], [4, 8]]), vec![2]);
        assert_eq!(smith_diagonal(array![[0, 0], [0, 0]]), Vec::<i64>::new());
        assert_eq!(smith_diagonal(array![[8]]), vec![8]);
        assert_eq!(smith_diagonal(array![[2, 0], [0, 2]]), vec![2, 2]);
    }

    #[test]
    fn test_group_classification() {
        let g = AbelianGroup::from_presentation(array![[8]], 1);
        assert_eq!(g.rank(), 0);
        assert_eq!(g.invariant_factors(), &[8]);
        assert_eq!(g.torsion_rank(2), 1);
        assert_eq!(g.torsion_rank(3), 0);
        assert_eq!(g.to_string(), "Z/8");

        let free = AbelianGroup::from_presentation(Array2::zeros((0, 2)), 2);
        assert_eq!(free.rank(), 2);
        assert!(free.invariant_factors().is_empty());
        assert_eq!(free.to_string(), "Z^2");

        assert!(AbelianGroup::trivial().is_trivial());
        assert!(AbelianGroup::free(1).is_z());
    }

    #[test]
    fn test_two_torsion_ranks() {
        // Z/2 + Z/2 must keep two invariant factors.
        let g = AbelianGroup::from_presentation(array![[2, 0], [0, 2]], 2);
        assert_eq!(g.rank(), 0);
        assert_eq!(g.invariant_factors(), &[2, 2]);
        assert_eq!(g.torsion_rank(2), 2);
    }

    #[test]
    fn test_homology_of_doubled_tetrahedron() {
        let mut tri = Triangulation::new();
        let a = tri.new_tetrahedron();
        let b = tri.new_tetrahedron();
        for f in 0..4 {
            tri.join(a, f, b, Perm4::IDENTITY).unwrap();
        }
        assert!(tri.homology_h1().is_trivial());
    }

    #[test]
    fn test_homology_of_ball() {
        let mut tri = Triangulation::new();
        tri.new_tetrahedron();
        assert!(tri.homology_h1().is_trivial());
    }

    #[test]
    fn test_homology_of_figure_eight() {
        let mut tri = Triangulation::new();
        let r = tri.new_tetrahedron();
        let s = tri.new_tetrahedron();
        tri.join(r, 0, s, p(1, 3, 0, 2)).unwrap();
        tri.join(r, 1, s, p(2, 0, 3, 1)).unwrap();
        tri.join(r, 2, s, p(0, 3, 2, 1)).unwrap();
        tri.join(r, 3, s, p(2, 1, 0, 3)).unwrap();
        assert!(tri.homology_h1().is_z());
    }
}
