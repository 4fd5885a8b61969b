//! Standard sub-triangulations: snapped balls and the two flavours of
//! embedded 2-sphere built from them or from a pair of triangles.
//!
//! The recognisers here return a tagged descriptor carrying only the
//! parameters of the sub-triangulation found, and the 2-sphere types can
//! cut the ambient triangulation along themselves and fill both sides
//! with balls, keeping the tetrahedron count unchanged.  If the sphere
//! separates, the reduced triangulation carries the two connected-sum
//! terms as separate components.

use crate::error::{Result, TriError};
use crate::perm::{edge_number, perm, Perm4, EDGE_END, EDGE_START};
use crate::triangulation::Triangulation;

/// A single tetrahedron with two faces glued to each other across an
/// edge: a 3-ball with a two-triangle sphere boundary, pinched along the
/// equator edge.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SnappedBall {
    tet: usize,
    /// The lower-numbered glued face.
    face0: usize,
    /// The higher-numbered glued face.
    face1: usize,
}

impl SnappedBall {
    /// Recognizes whether the given tetrahedron forms a snapped ball:
    /// some face glued to another face of the same tetrahedron by the
    /// transposition of the two face numbers.
    pub fn recognize(tri: &Triangulation, tet: usize) -> Result<Option<SnappedBall>> {
        let cell = tri.tetrahedron(tet)?;
        for face in 0..3 {
            if cell.adjacent_tetrahedron(face) != Some(tet) {
                continue;
            }
            let gluing = cell.adjacent_gluing(face).unwrap();
            let partner = gluing.apply(face);
            if gluing == Perm4::transposition(face, partner)? {
                return Ok(Some(SnappedBall {
                    tet,
                    face0: face,
                    face1: partner,
                }));
            }
        }
        Ok(None)
    }

    /// The tetrahedron forming this ball.
    pub fn tetrahedron(&self) -> usize {
        self.tet
    }

    /// The edge of the tetrahedron running around the sphere's equator.
    pub fn equator_edge(&self) -> usize {
        edge_number(self.face0, self.face1)
    }

    /// The degree-one edge inside the ball (opposite the equator).
    pub fn internal_edge(&self) -> usize {
        5 - self.equator_edge()
    }

    /// The two faces of the tetrahedron on the ball's sphere boundary.
    pub fn boundary_faces(&self) -> [usize; 2] {
        [EDGE_START[self.equator_edge()], EDGE_END[self.equator_edge()]]
    }
}

/// A 2-sphere formed by two snapped balls whose equator edges coincide:
/// the two central discs meet along the shared equator.
#[derive(Debug, Copy, Clone)]
pub struct SnappedTwoSphere {
    balls: [SnappedBall; 2],
}

impl SnappedTwoSphere {
    /// Recognizes whether the two given tetrahedra form a snapped
    /// 2-sphere: both are snapped balls and their equator edges are the
    /// same edge of the triangulation.
    pub fn recognize(
        tri: &Triangulation,
        tet0: usize,
        tet1: usize,
    ) -> Result<Option<SnappedTwoSphere>> {
        if tet0 == tet1 {
            return Ok(None);
        }
        let Some(b0) = SnappedBall::recognize(tri, tet0)? else {
            return Ok(None);
        };
        let Some(b1) = SnappedBall::recognize(tri, tet1)? else {
            return Ok(None);
        };
        let skel = tri.skeleton();
        if skel.tet_edge(tet0, b0.equator_edge()) != skel.tet_edge(tet1, b1.equator_edge()) {
            return Ok(None);
        }
        Ok(Some(SnappedTwoSphere { balls: [b0, b1] }))
    }

    /// One of the two snapped balls.
    pub fn snapped_ball(&self, index: usize) -> SnappedBall {
        self.balls[index]
    }

    /// Cuts the given triangulation along this 2-sphere and fills the two
    /// resulting sphere boundaries with balls, without changing the number
    /// of tetrahedra.  If the sphere separates, the result holds the two
    /// connected-sum terms.
    ///
    /// The original triangulation is untouched; the reduced copy is
    /// returned.  Fails with [`TriError::NotApplicable`] if the equator
    /// edge is not an internal edge circling through each ball exactly
    /// once.
    pub fn reduce(&self, tri: &Triangulation) -> Result<Triangulation> {
        let [b0, b1] = self.balls;
        // Ring data around the shared equator.
        let (ring_maps, nbrs) = {
            let skel = tri.skeleton();
            let class = skel.tet_edge(b0.tet, b0.equator_edge());
            let edge = &skel.edges()[class];
            if edge.is_boundary() || !edge.is_valid() {
                return Err(TriError::NotApplicable(
                    "the equator of a snapped 2-sphere must be internal and valid",
                ));
            }
            let mut maps = [Perm4::IDENTITY; 2];
            for (which, ball) in [b0, b1].iter().enumerate() {
                let hits: Vec<_> = edge
                    .embeddings()
                    .iter()
                    .filter(|emb| emb.tet == ball.tet)
                    .collect();
                if hits.len() != 1 || hits[0].edge != ball.equator_edge() {
                    return Err(TriError::NotApplicable(
                        "the equator must circle through each snapped ball once",
                    ));
                }
                maps[which] = skel.tet_edge_mapping(ball.tet, ball.equator_edge());
            }
            // The four slots around the sphere, and their outside
            // neighbours: side A runs from ball 0's exit to ball 1's
            // entry, side B the other way.
            let slots = [
                (b0.tet, maps[0].apply(3)),
                (b1.tet, maps[1].apply(2)),
                (b0.tet, maps[0].apply(2)),
                (b1.tet, maps[1].apply(3)),
            ];
            let nbrs: Vec<_> = slots
                .iter()
                .map(|&(t, f)| {
                    let g = tri.tets()[t].adj[f].expect("internal ring faces are glued");
                    (g.tet, g.gluing)
                })
                .collect();
            (maps, nbrs)
        };

        let mut reduced = tri.clone();
        reduced.isolate(b0.tet)?;
        reduced.isolate(b1.tet)?;

        // Plug each side with a fresh snapped ball parallel to the removed
        // ones: vertices 2 and 3 go to the equator ends, faces 0 and 1
        // onto the two exposed triangles, and faces 2 and 3 fold onto each
        // other to restore the cone identifications of the old boundary
        // discs.  A side whose exposed faces were glued straight to each
        // other closes into its own small summand.
        let side_maps = [perm(3, 2, 0, 1), perm(2, 3, 0, 1)];
        for side in 0..2 {
            let (v0, h0) = nbrs[2 * side];
            let (v1, h1) = nbrs[2 * side + 1];
            let phi0 = ring_maps[0].compose(side_maps[side]);
            let phi1 = ring_maps[1].compose(side_maps[side]);
            let plug = reduced.new_tetrahedron();
            reduced.join(plug, 2, plug, perm(0, 1, 3, 2))?;
            if v0 == b1.tet {
                let q = phi1.inverse().compose(h0).compose(phi0);
                reduced.join(plug, 0, plug, q)?;
            } else {
                reduced.join(plug, 0, v0, h0.compose(phi0))?;
                reduced.join(plug, 1, v1, h1.compose(phi1))?;
            }
        }

        let mut old = [b0.tet, b1.tet];
        old.sort_unstable();
        for &t in old.iter().rev() {
            reduced.remove_tetrahedron(t)?;
        }
        Ok(reduced)
    }
}

/// A 2-sphere formed by two distinct internal triangles glued to each
/// other along all three edges (a pillow).
#[derive(Debug, Copy, Clone)]
pub struct PillowTwoSphere {
    triangles: [usize; 2],
    /// Maps corners 0,1,2 of the first triangle to corners of the second.
    mapping: Perm4,
}

impl PillowTwoSphere {
    /// Recognizes whether the two given triangle classes form a pillow
    /// 2-sphere: distinct internal triangles, each with three distinct
    /// internal edges, identified edge for edge with compatible mappings.
    pub fn recognize(
        tri: &Triangulation,
        triangle0: usize,
        triangle1: usize,
    ) -> Option<PillowTwoSphere> {
        let skel = tri.skeleton();
        if triangle0 == triangle1 {
            return None;
        }
        let t0 = skel.triangles().get(triangle0)?;
        let t1 = skel.triangles().get(triangle1)?;
        if t0.is_boundary() || t1.is_boundary() {
            return None;
        }
        let e0: Vec<usize> = (0..3).map(|i| skel.triangle_edge(triangle0, i)).collect();
        let e1: Vec<usize> = (0..3).map(|i| skel.triangle_edge(triangle1, i)).collect();
        if e0[0] == e0[1] || e0[0] == e0[2] || e0[1] == e0[2] {
            return None;
        }
        if e0.iter().any(|&e| skel.edges()[e].is_boundary()) {
            return None;
        }
        let join_to = (0..3).find(|&i| e1[i] == e0[0])?;
        let mapping = skel
            .triangle_edge_mapping(triangle1, join_to)
            .compose(skel.triangle_edge_mapping(triangle0, 0).inverse());
        for i in 1..3 {
            if e1[mapping.apply(i)] != e0[i] {
                return None;
            }
            if skel.triangle_edge_mapping(triangle1, mapping.apply(i))
                != mapping.compose(skel.triangle_edge_mapping(triangle0, i))
            {
                return None;
            }
        }
        Some(PillowTwoSphere {
            triangles: [triangle0, triangle1],
            mapping,
        })
    }

    /// One of the two triangle classes.
    pub fn triangle(&self, index: usize) -> usize {
        self.triangles[index]
    }

    /// The corner correspondence induced by the three edge gluings.
    pub fn mapping(&self) -> Perm4 {
        self.mapping
    }

    /// Cuts the given triangulation along this 2-sphere and folds each of
    /// the two resulting pillow boundaries shut, filling it with a ball;
    /// the number of tetrahedra is unchanged.  If the sphere separates,
    /// the result holds the two connected-sum terms.
    pub fn reduce(&self, tri: &Triangulation) -> Result<Triangulation> {
        let [tri0, tri1] = self.triangles;
        // Work out which side of each triangle faces which: walk the ring
        // of a shared edge from the first triangle's front slot; the
        // second triangle's slot crossed along the way bounds the same
        // side as the first triangle's back slot.
        let (pairs, gluings) = {
            let skel = tri.skeleton();
            let f0 = skel.triangles()[tri0].embeddings()[0];
            let b0 = skel.triangles()[tri0].embeddings()[1];
            let f1 = skel.triangles()[tri1].embeddings()[0];
            let b1 = skel.triangles()[tri1].embeddings()[1];

            // Walk the ring of the first triangle's edge 0: the cell
            // entered after crossing that triangle lies on the same side
            // of the sphere as the next crossing of the second triangle.
            let m0 = skel.tet_triangle_mapping(f0.tet, f0.face);
            let slot_edge = edge_number(m0.apply(1), m0.apply(2));
            let class = skel.tet_edge(f0.tet, slot_edge);
            let ring = skel.edges()[class].embeddings();
            let exit_of = |emb: &crate::skeleton::EdgeEmbedding| {
                skel.tet_edge_mapping(emb.tet, emb.edge).apply(3)
            };
            let start = ring
                .iter()
                .position(|emb| skel.tet_triangle(emb.tet, exit_of(emb)) == tri0)
                .ok_or(TriError::NotApplicable(
                    "pillow sphere edges must circle both triangles",
                ))?;
            let exit_slot = (ring[start].tet, exit_of(&ring[start]));
            let (entered, other0) = if exit_slot == (f0.tet, f0.face) {
                (b0, f0)
            } else {
                (f0, b0)
            };
            let mut crossed = None;
            for step in 1..=ring.len() {
                let emb = ring[(start + step) % ring.len()];
                let exit = exit_of(&emb);
                if skel.tet_triangle(emb.tet, exit) == tri1 {
                    crossed = Some((emb.tet, exit));
                    break;
                }
            }
            let crossed = crossed.ok_or(TriError::NotApplicable(
                "pillow sphere edges must circle both triangles",
            ))?;
            let (x1, y1) = if crossed == (f1.tet, f1.face) {
                (f1, b1)
            } else {
                (b1, f1)
            };
            // The entered slot pairs with the crossing of the second
            // triangle; the remaining two slots form the other side.
            let ext = self.mapping;
            let q_entered = skel
                .tet_triangle_mapping(x1.tet, x1.face)
                .compose(ext)
                .compose(skel.tet_triangle_mapping(entered.tet, entered.face).inverse());
            let q_other = skel
                .tet_triangle_mapping(y1.tet, y1.face)
                .compose(ext)
                .compose(skel.tet_triangle_mapping(other0.tet, other0.face).inverse());
            (
                [
                    ((entered.tet, entered.face), (x1.tet, x1.face)),
                    ((other0.tet, other0.face), (y1.tet, y1.face)),
                ],
                [q_entered, q_other],
            )
        };

        let mut reduced = tri.clone();
        reduced.unjoin(pairs[0].0 .0, pairs[0].0 .1)?;
        reduced.unjoin(pairs[1].1 .0, pairs[1].1 .1)?;
        for (pair, q) in pairs.iter().zip(gluings.iter()) {
            let ((ta, fa), (tb, _)) = *pair;
            reduced.join(ta, fa, tb, *q)?;
        }
        Ok(reduced)
    }
}
