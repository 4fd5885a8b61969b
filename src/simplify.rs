//! Local simplification: the 3-2 move and a greedy driver.
//!
//! The 3-2 move removes an internal valid edge of degree three whose ring
//! consists of three distinct tetrahedra, replacing the bipyramid around
//! the edge by two tetrahedra glued along the equatorial triangle.  The
//! recognition routines interleave this reduction with their crushing
//! loops to keep the working triangulations small.

use crate::error::Result;
use crate::perm::Perm4;
use crate::triangulation::Triangulation;

/// Relabelling of ring tetrahedron `i`'s vertices into the new top cell:
/// apex to 0, the two equator vertices to their slots, the remaining
/// vertex to the slot of the missing equator vertex.
fn top_map(i: usize, map: Perm4) -> Perm4 {
    let mut images = [0u8; 4];
    images[map.apply(0)] = 0;
    images[map.apply(2)] = (i + 1) as u8;
    images[map.apply(3)] = ((i + 1) % 3 + 1) as u8;
    images[map.apply(1)] = ((i + 2) % 3 + 1) as u8;
    Perm4::from_images(images[0], images[1], images[2], images[3])
        .expect("ring labels are distinct")
}

/// As [`top_map`] but into the bottom cell (apexes swapped).
fn bottom_map(i: usize, map: Perm4) -> Perm4 {
    let mut images = [0u8; 4];
    images[map.apply(1)] = 0;
    images[map.apply(2)] = (i + 1) as u8;
    images[map.apply(3)] = ((i + 1) % 3 + 1) as u8;
    images[map.apply(0)] = ((i + 2) % 3 + 1) as u8;
    Perm4::from_images(images[0], images[1], images[2], images[3])
        .expect("ring labels are distinct")
}

impl Triangulation {
    /// Whether the 3-2 move can be performed about the given edge class:
    /// internal, valid, degree three, with three distinct tetrahedra
    /// around it.
    pub fn three_two_available(&self, edge: usize) -> bool {
        let skel = self.skeleton();
        let Some(e) = skel.edges().get(edge) else {
            return false;
        };
        if e.is_boundary() || !e.is_valid() || e.degree() != 3 {
            return false;
        }
        let t: Vec<usize> = e.embeddings().iter().map(|emb| emb.tet).collect();
        t[0] != t[1] && t[1] != t[2] && t[0] != t[2]
    }

    /// Performs the 3-2 move about the given edge class, if available.
    /// Returns whether the triangulation changed.
    pub fn three_two_move(&mut self, edge: usize) -> Result<bool> {
        if !self.three_two_available(edge) {
            return Ok(false);
        }

        // Ring data: tetrahedra, ring mappings and the six outer slots
        // (two per ring cell, opposite the edge's two ends).
        let (ring, outer) = {
            let skel = self.skeleton();
            let e = &skel.edges()[edge];
            let ring: Vec<(usize, Perm4)> = e
                .embeddings()
                .iter()
                .map(|emb| (emb.tet, skel.tet_edge_mapping(emb.tet, emb.edge)))
                .collect();
            // Outer slot k of cell i: k = 0 is the face opposite the lower
            // apex (bottom outer), k = 1 the face opposite the upper apex.
            let mut outer = Vec::new();
            for &(t, map) in &ring {
                for k in 0..2 {
                    let face = map.apply(k);
                    let nbr = self.tets()[t].adj[face]
                        .map(|g| (g.tet, g.gluing.apply(face), g.gluing));
                    outer.push(((t, face), nbr));
                }
            }
            (ring, outer)
        };

        // Where each outer slot reattaches: cell, face and relabelling.
        let new_slot = |slot: (usize, usize)| -> (usize, Perm4) {
            let i = ring.iter().position(|&(t, _)| t == slot.0).unwrap();
            let (t, map) = ring[i];
            debug_assert_eq!(t, slot.0);
            if slot.1 == map.apply(0) {
                (1, bottom_map(i, map)) // bottom outer goes to the lower cell
            } else {
                (0, top_map(i, map))
            }
        };

        for &(t, _) in &ring {
            self.isolate(t)?;
        }
        let top = self.new_tetrahedron();
        let bottom = self.new_tetrahedron();
        self.join(top, 0, bottom, Perm4::IDENTITY)?;
        let new_tet = [top, bottom];

        let mut done = [false; 6];
        for (s, &(slot, nbr)) in outer.iter().enumerate() {
            if done[s] {
                continue;
            }
            done[s] = true;
            let Some((v, vface, h)) = nbr else {
                continue; // stays boundary
            };
            let (cell, m) = new_slot(slot);
            if let Some(partner) = outer
                .iter()
                .position(|&(other_slot, _)| other_slot == (v, vface))
            {
                // Glued to another outer slot of the same bipyramid.
                done[partner] = true;
                let (cell2, m2) = new_slot((v, vface));
                let gluing = m2.compose(h).compose(m.inverse());
                self.join(new_tet[cell], m.apply(slot.1), new_tet[cell2], gluing)?;
            } else {
                self.join(new_tet[cell], m.apply(slot.1), v, h.compose(m.inverse()))?;
            }
        }

        let mut old: Vec<usize> = ring.iter().map(|&(t, _)| t).collect();
        old.sort_unstable();
        for &t in old.iter().rev() {
            self.remove_tetrahedron(t)?;
        }
        Ok(true)
    }

    /// Greedily applies 3-2 moves until none remains.  Returns whether the
    /// triangulation changed at all.
    pub fn simplify(&mut self) -> Result<bool> {
        let mut changed = false;
        loop {
            let candidate =
                (0..self.num_edges()).find(|&e| self.three_two_available(e));
            match candidate {
                Some(e) => {
                    self.three_two_move(e)?;
                    changed = true;
                }
                None => return Ok(changed),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perm::perm;

    /// Three tetrahedra around a central degree-three edge 01, with all
    /// six outer faces on the boundary: a triangular bipyramid.
    fn bipyramid() -> Triangulation {
        let mut tri = Triangulation::new();
        let t: Vec<usize> = (0..3).map(|_| tri.new_tetrahedron()).collect();
        let g = perm(0, 1, 3, 2);
        for i in 0..3 {
            tri.join(t[i], 3, t[(i + 1) % 3], g).unwrap();
        }
        tri
    }

    #[test]
    fn test_three_two_collapses_bipyramid() {
        let mut tri = bipyramid();
        let central: Vec<usize> = (0..tri.num_edges())
            .filter(|&e| tri.three_two_available(e))
            .collect();
        assert_eq!(central.len(), 1);
        assert!(tri.three_two_move(central[0]).unwrap());
        assert_eq!(tri.num_tetrahedra(), 2);
        assert!(tri.is_valid());
        assert!(tri.is_connected());
        assert!(!tri.is_closed());
        // Still a ball: sphere boundary, trivial homology.
        assert_eq!(tri.num_boundary_components(), 1);
        assert_eq!(
            tri.skeleton().boundary_components()[0].euler_characteristic(),
            2
        );
        assert_eq!(tri.euler_characteristic(), 1);
        assert!(tri.homology_h1().is_trivial());
    }

    #[test]
    fn test_simplify_driver_uses_the_move() {
        let mut tri = bipyramid();
        assert!(tri.simplify().unwrap());
        assert_eq!(tri.num_tetrahedra(), 2);
        // A second pass finds nothing further.
        assert!(!tri.simplify().unwrap());
    }

    #[test]
    fn test_simplify_preserves_lens_homology() {
        let mut tri = Triangulation::new();
        tri.insert_layered_lens_space(8, 3).unwrap();
        tri.simplify().unwrap();
        assert!(tri.is_valid());
        assert!(tri.is_closed());
        assert_eq!(tri.homology_h1().invariant_factors(), &[8]);
    }

    #[test]
    fn test_three_two_rejects_boundary_and_low_degree() {
        let mut tri = Triangulation::new();
        tri.insert_layered_solid_torus(1, 2).unwrap();
        for e in 0..tri.num_edges() {
            assert!(!tri.three_two_available(e));
        }
        assert!(!tri.simplify().unwrap());
    }
}
