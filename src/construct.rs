//! Bulk construction: tabular gluing descriptions and the standard layered
//! families (solid tori and lens spaces).
//!
//! A layered solid torus starts from the one-tetrahedron solid torus and
//! repeatedly layers a fresh tetrahedron across one edge of the two-triangle
//! boundary torus.  Throughout the construction the top tetrahedron exposes
//! faces 2 and 3, its boundary edge classes are 01, {02, 13} and {03, 12},
//! and the class identifications keep a fixed normal form (13 ~ 02 via
//! 1↦2, 3↦0; 12 ~ 03 via 1↦3, 2↦0).  Layering over an edge replaces it by
//! the opposite diagonal of the boundary square, so the meridian weights
//! evolve along the reverse Euclidean chain of the target parameters.
//!
//! Folding the two boundary triangles onto each other across a boundary
//! edge of weight p fills the solid torus along a slope meeting the
//! meridian p times, which is how the layered lens spaces arise.

use crate::error::{Result, TriError};
use crate::perm::{perm, Perm4};
use crate::triangulation::Triangulation;

/// Boundary bookkeeping for a layered solid torus under construction:
/// the top tetrahedron and the meridian weights at its boundary edge
/// classes 01, {02,13} and {03,12}.
struct LayerState {
    top: usize,
    weights: [u64; 3],
}

/// The gluings of the new tetrahedron's faces 0 and 1 onto the old top's
/// faces 2 and 3, for layering over each of the three boundary edge
/// classes in turn.
const LAYER_GLUINGS: [(Perm4, Perm4); 3] = [
    (perm(2, 3, 0, 1), perm(2, 3, 0, 1)),
    (perm(2, 0, 1, 3), perm(1, 3, 2, 0)),
    (perm(2, 1, 0, 3), perm(0, 3, 2, 1)),
];

/// Folds of the top tetrahedron's face 2 onto its face 3, snapping across
/// each of the three boundary edge classes in turn.  Each matches the
/// class's identification normal form, so the folded edge stays valid.
const FOLD_GLUINGS: [Perm4; 3] = [perm(0, 1, 3, 2), perm(1, 2, 3, 0), perm(2, 0, 3, 1)];

impl Triangulation {
    /// Bulk-constructs tetrahedra from an adjacency table (entries are
    /// tetrahedron indices, or -1 for boundary) and a parallel table of
    /// gluing permutation codes.
    ///
    /// Both tables must describe each gluing from both sides consistently.
    /// On any error the triangulation is left unchanged.
    pub fn insert_construction(
        &mut self,
        adjacencies: &[[i64; 4]],
        gluings: &[[u8; 4]],
    ) -> Result<()> {
        let n = adjacencies.len();
        if gluings.len() != n {
            return Err(TriError::BadConstruction {
                tet: 0,
                face: 0,
                reason: "adjacency and gluing tables differ in length",
            });
        }

        // Validate everything before creating a single tetrahedron.
        for (i, row) in adjacencies.iter().enumerate() {
            for (f, &a) in row.iter().enumerate() {
                if a < 0 {
                    continue;
                }
                let j = a as usize;
                if j >= n {
                    return Err(TriError::BadConstruction {
                        tet: i,
                        face: f,
                        reason: "adjacent tetrahedron index out of range",
                    });
                }
                let p = Perm4::from_code(gluings[i][f])?;
                let pf = p.apply(f);
                if j == i && pf == f {
                    return Err(TriError::BadConstruction {
                        tet: i,
                        face: f,
                        reason: "face glued to itself",
                    });
                }
                if adjacencies[j][pf] != i as i64 {
                    return Err(TriError::BadConstruction {
                        tet: i,
                        face: f,
                        reason: "adjacency table is not symmetric",
                    });
                }
                if Perm4::from_code(gluings[j][pf])? != p.inverse() {
                    return Err(TriError::BadConstruction {
                        tet: i,
                        face: f,
                        reason: "gluing table is not inverse-symmetric",
                    });
                }
            }
        }

        let mut staging = Triangulation::new();
        staging.new_tetrahedra(n);
        for (i, row) in adjacencies.iter().enumerate() {
            for (f, &a) in row.iter().enumerate() {
                if a < 0 {
                    continue;
                }
                let j = a as usize;
                let p = Perm4::from_code(gluings[i][f])?;
                if (j, p.apply(f)) > (i, f) {
                    staging.join(i, f, j, p)?;
                }
            }
        }
        self.move_contents_from(&mut staging);
        Ok(())
    }

    /// Inserts a layered solid torus whose meridian disc meets the three
    /// boundary edge classes `a`, `b` and `a + b` times, returning the
    /// index of the top tetrahedron (whose faces 2 and 3 form the
    /// boundary).
    ///
    /// Requires `gcd(a, b) == 1`; the order of `a` and `b` is immaterial.
    pub fn insert_layered_solid_torus(&mut self, a: u64, b: u64) -> Result<usize> {
        let (a, b) = if a <= b { (a, b) } else { (b, a) };
        if gcd(a, b) != 1 {
            return Err(TriError::BadLayeringParameters(a, b));
        }
        let state = self.build_layered_solid_torus(a, b)?;
        Ok(state.top)
    }

    /// Inserts a triangulation of the lens space L(p, q), built by folding
    /// the boundary of a layered solid torus across its weight-`p` edge.
    /// Returns the index of the top (folded) tetrahedron.
    ///
    /// Requires `gcd(p, q) == 1` and `q < p`, except for the two closed
    /// degenerate cases L(1, 0) (the 3-sphere) and L(0, 1) (S² × S¹).
    pub fn insert_layered_lens_space(&mut self, p: u64, q: u64) -> Result<usize> {
        if gcd(p, q) != 1 || (q >= p && (p, q) != (0, 1)) {
            return Err(TriError::BadLayeringParameters(p, q));
        }
        let (state, fold_over) = match p {
            0 => (self.build_layered_solid_torus(0, 1)?, 0),
            1 => (self.build_layered_solid_torus(1, 2)?, 0),
            2 => (self.build_layered_solid_torus(1, 1)?, 1),
            3 => (self.build_layered_solid_torus(1, 2)?, 2),
            _ => {
                let a = q.min(p - q);
                let state = self.build_layered_solid_torus(a, p - a)?;
                (state, 0)
            }
        };
        debug_assert_eq!(state.weights[fold_over], p);
        self.join(state.top, 2, state.top, FOLD_GLUINGS[fold_over])?;
        Ok(state.top)
    }

    /// Builds the layered solid torus for coprime `a <= b`, tracking the
    /// boundary weights.
    fn build_layered_solid_torus(&mut self, a: u64, b: u64) -> Result<LayerState> {
        // The one-tetrahedron solid torus: weights 1, 2, 3.
        let base = self.new_tetrahedron();
        self.join(base, 0, base, perm(1, 2, 3, 0))?;
        let mut state = LayerState {
            top: base,
            weights: [1, 2, 3],
        };

        match (a, b) {
            (1, 2) => return Ok(state),
            (1, 1) => {
                self.layer(&mut state, 2)?;
                return Ok(state);
            }
            (0, 1) => {
                self.layer(&mut state, 2)?;
                self.layer(&mut state, 1)?;
                return Ok(state);
            }
            _ => {}
        }

        // Reverse Euclidean chain from (a, b) down to the base pair.
        let mut pairs = Vec::new();
        let (mut x, mut y) = (a, b);
        while (x, y) != (1, 2) {
            pairs.push((x, y));
            let (p, q) = (y - x, x);
            (x, y) = if p <= q { (p, q) } else { (q, p) };
        }

        for &(x, y) in pairs.iter().rev() {
            // Layer over the boundary edge whose weight does not survive.
            let over = (0..3)
                .find(|&i| {
                    let mut rest = [state.weights[(i + 1) % 3], state.weights[(i + 2) % 3]];
                    rest.sort_unstable();
                    rest == [x, y]
                })
                .expect("the layering chain retains two of the three weights");
            self.layer(&mut state, over)?;
        }
        Ok(state)
    }

    /// Layers one tetrahedron over the boundary edge class `over` of the
    /// current top, replacing that edge by the opposite diagonal.
    fn layer(&mut self, state: &mut LayerState, over: usize) -> Result<()> {
        let n = self.new_tetrahedron();
        let (pa, pb) = LAYER_GLUINGS[over];
        self.join(n, 0, state.top, pa)?;
        self.join(n, 1, state.top, pb)?;

        let w = state.weights;
        let (u, v) = match over {
            0 => (w[1], w[2]),
            1 => (w[0], w[2]),
            _ => (w[0], w[1]),
        };
        let new_diag = if w[over] == u + v {
            u.abs_diff(v)
        } else {
            u + v
        };
        state.weights = match over {
            0 => [new_diag, w[1], w[2]],
            1 => [new_diag, w[2], w[0]],
            _ => [new_diag, w[1], w[0]],
        };
        state.top = n;
        Ok(())
    }
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::VertexLink;

    #[test]
    fn test_one_tetrahedron_solid_torus() {
        let mut tri = Triangulation::new();
        let top = tri.insert_layered_solid_torus(1, 2).unwrap();
        assert_eq!(tri.num_tetrahedra(), 1);
        assert_eq!(top, 0);
        assert!(tri.is_valid());
        assert!(tri.is_orientable());
        assert!(!tri.is_closed());
        assert_eq!(tri.num_vertices(), 1);
        assert_eq!(tri.num_boundary_components(), 1);
        let bc = &tri.skeleton().boundary_components()[0];
        assert!(bc.is_real());
        assert_eq!(bc.euler_characteristic(), 0);
        assert!(bc.is_orientable());
        assert!(tri.homology_h1().is_z());
    }

    #[test]
    fn test_lst_3_4_7() {
        let mut tri = Triangulation::new();
        tri.insert_layered_solid_torus(3, 4).unwrap();
        assert_eq!(tri.num_tetrahedra(), 3);
        assert!(tri.is_valid());
        assert!(tri.is_orientable());
        assert_eq!(tri.num_vertices(), 1);
        assert_eq!(tri.num_boundary_components(), 1);
        assert_eq!(
            tri.skeleton().boundary_components()[0].euler_characteristic(),
            0
        );
        assert!(tri.homology_h1().is_z());
    }

    #[test]
    fn test_lst_argument_order_and_validation() {
        let mut tri = Triangulation::new();
        tri.insert_layered_solid_torus(4, 3).unwrap();
        assert_eq!(tri.num_tetrahedra(), 3);
        assert!(matches!(
            Triangulation::new().insert_layered_solid_torus(2, 4),
            Err(TriError::BadLayeringParameters(2, 4))
        ));
    }

    #[test]
    fn test_lens_space_sphere() {
        let mut tri = Triangulation::new();
        tri.insert_layered_lens_space(1, 0).unwrap();
        assert_eq!(tri.num_tetrahedra(), 1);
        assert!(tri.is_valid());
        assert!(tri.is_closed());
        assert!(tri.is_orientable());
        assert!(tri.is_connected());
        assert_eq!(tri.num_vertices(), 1);
        assert!(tri.homology_h1().is_trivial());
    }

    #[test]
    fn test_lens_space_8_3() {
        let mut tri = Triangulation::new();
        tri.insert_layered_lens_space(8, 3).unwrap();
        assert_eq!(tri.num_tetrahedra(), 3);
        assert!(tri.is_valid());
        assert!(tri.is_closed());
        assert!(tri.is_orientable());
        let h1 = tri.homology_h1();
        assert_eq!(h1.rank(), 0);
        assert_eq!(h1.invariant_factors(), &[8]);
    }

    #[test]
    fn test_lens_space_small_torsion() {
        let mut rp3 = Triangulation::new();
        rp3.insert_layered_lens_space(2, 1).unwrap();
        assert!(rp3.is_valid() && rp3.is_closed() && rp3.is_orientable());
        assert_eq!(rp3.homology_h1().invariant_factors(), &[2]);

        let mut l31 = Triangulation::new();
        l31.insert_layered_lens_space(3, 1).unwrap();
        assert!(l31.is_valid() && l31.is_closed() && l31.is_orientable());
        assert_eq!(l31.homology_h1().invariant_factors(), &[3]);

        let mut s2xs1 = Triangulation::new();
        s2xs1.insert_layered_lens_space(0, 1).unwrap();
        assert!(s2xs1.is_valid() && s2xs1.is_closed() && s2xs1.is_orientable());
        assert!(s2xs1.homology_h1().is_z());
    }

    #[test]
    fn test_lens_space_validation() {
        assert!(Triangulation::new().insert_layered_lens_space(4, 2).is_err());
        assert!(Triangulation::new().insert_layered_lens_space(3, 5).is_err());
    }

    #[test]
    fn test_interior_vertex_of_lens_space() {
        let mut tri = Triangulation::new();
        tri.insert_layered_lens_space(8, 3).unwrap();
        for v in tri.skeleton().vertices() {
            assert_eq!(v.link(), VertexLink::Sphere);
        }
    }

    #[test]
    fn test_insert_construction_figure_eight() {
        // The two-tetrahedron figure eight knot complement as a table.
        let mut byhand = Triangulation::new();
        let r = byhand.new_tetrahedron();
        let s = byhand.new_tetrahedron();
        let ps = [
            Perm4::from_images(1, 3, 0, 2).unwrap(),
            Perm4::from_images(2, 0, 3, 1).unwrap(),
            Perm4::from_images(0, 3, 2, 1).unwrap(),
            Perm4::from_images(2, 1, 0, 3).unwrap(),
        ];
        for (f, p) in ps.iter().enumerate() {
            byhand.join(r, f, s, *p).unwrap();
        }

        let mut adj = [[-1i64; 4]; 2];
        let mut glu = [[0u8; 4]; 2];
        for f in 0..4 {
            adj[0][f] = 1;
            glu[0][f] = ps[f].code();
            let pf = ps[f].apply(f);
            adj[1][pf] = 0;
            glu[1][pf] = ps[f].inverse().code();
        }
        let mut tri = Triangulation::new();
        tri.insert_construction(&adj, &glu).unwrap();

        assert_eq!(tri.num_tetrahedra(), 2);
        assert_eq!(tri.num_vertices(), byhand.num_vertices());
        assert_eq!(tri.num_edges(), byhand.num_edges());
        assert_eq!(tri.num_triangles(), byhand.num_triangles());
        assert!(tri.is_ideal());
    }

    #[test]
    fn test_insert_construction_rejects_asymmetric_tables() {
        let adj = [[1i64, -1, -1, -1], [-1, -1, -1, -1]];
        let glu = [[Perm4::IDENTITY.code(); 4]; 2];
        let mut tri = Triangulation::new();
        assert!(matches!(
            tri.insert_construction(&adj, &glu),
            Err(TriError::BadConstruction { .. })
        ));
        // Nothing was inserted.
        assert!(tri.is_empty());
    }
}
