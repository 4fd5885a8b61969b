//! Global transforms: subdivision, boundary/ideal conversion, book
//! opening and component splitting.

use std::collections::HashMap;

use crate::error::Result;
use crate::perm::{face_ordering, perm, Perm4, ALL_PERMS_S4};
use crate::tetrahedron::FaceGluing;
use crate::triangulation::Triangulation;

/// A point of the 12-piece subdivision used by [`ideal_to_finite`]:
/// an original vertex, an edge midpoint, or the cell centre.
///
/// [`ideal_to_finite`]: Triangulation::ideal_to_finite
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
enum Point {
    Vertex(usize),
    Mid(usize, usize),
    Centre,
}

impl Point {
    fn mid(a: usize, b: usize) -> Point {
        Point::Mid(a.min(b), b.max(a))
    }

    /// Applies a vertex relabelling.
    fn map(self, g: Perm4) -> Point {
        match self {
            Point::Vertex(v) => Point::Vertex(g.apply(v)),
            Point::Mid(a, b) => Point::mid(g.apply(a), g.apply(b)),
            Point::Centre => Point::Centre,
        }
    }

    /// Whether the point lies on the given face.
    fn on_face(self, f: usize) -> bool {
        match self {
            Point::Vertex(v) => v != f,
            Point::Mid(a, b) => a != f && b != f,
            Point::Centre => false,
        }
    }
}

/// The twelve pieces cutting a tetrahedron at its edge midpoints: four
/// corner cells and the central octahedron coned from the centre.
fn twelve_pieces() -> Vec<[Point; 4]> {
    let mut pieces = Vec::with_capacity(12);
    // Corner cells: the original vertex plus its three edge midpoints.
    for v in 0..4 {
        let others: Vec<usize> = (0..4).filter(|&w| w != v).collect();
        pieces.push([
            Point::Vertex(v),
            Point::mid(v, others[0]),
            Point::mid(v, others[1]),
            Point::mid(v, others[2]),
        ]);
    }
    // Cones from the centre over the corner-cut triangles.
    for v in 0..4 {
        let others: Vec<usize> = (0..4).filter(|&w| w != v).collect();
        pieces.push([
            Point::Centre,
            Point::mid(v, others[0]),
            Point::mid(v, others[1]),
            Point::mid(v, others[2]),
        ]);
    }
    // Cones from the centre over the medial triangles of the faces.
    for f in 0..4 {
        let (a, b, c) = {
            let o: Vec<usize> = (0..4).filter(|&w| w != f).collect();
            (o[0], o[1], o[2])
        };
        pieces.push([
            Point::Centre,
            Point::mid(b, c),
            Point::mid(a, c),
            Point::mid(a, b),
        ]);
    }
    pieces
}

/// The gluing identifying face `face_a` of a piece with face `face_b` of
/// another piece: the three shared points match up and the opposite
/// corners correspond.
fn piece_gluing(a: &[Point; 4], face_a: usize, b: &[Point; 4], face_b: usize) -> Perm4 {
    let mut images = [4u8; 4];
    for (pa, pt) in a.iter().enumerate() {
        if pa == face_a {
            images[pa] = face_b as u8;
        } else {
            let pb = b
                .iter()
                .position(|q| q == pt)
                .expect("shared face points match");
            images[pa] = pb as u8;
        }
    }
    Perm4::from_images(images[0], images[1], images[2], images[3])
        .expect("piece faces are glued bijectively")
}

impl Triangulation {
    /// Splits the triangulation into its connected components, returned in
    /// component order.  Tetrahedra keep their relative order and their
    /// descriptions; the original triangulation is left untouched.
    pub fn split_into_components(&self) -> Vec<Triangulation> {
        let skel = self.skeleton();
        let mut parts: Vec<Triangulation> = (0..skel.components().len())
            .map(|_| Triangulation::new())
            .collect();
        let n = self.num_tetrahedra();
        let mut new_index = vec![0usize; n];
        for t in 0..n {
            let c = skel.tet_component(t);
            new_index[t] =
                parts[c].new_tetrahedron_with(self.tets()[t].description().to_owned());
        }
        for t in 0..n {
            let c = skel.tet_component(t);
            for face in 0..4 {
                let Some(FaceGluing { tet: u, gluing }) = self.tets()[t].adj[face] else {
                    continue;
                };
                if (u, gluing.apply(face)) > (t, face) {
                    parts[c]
                        .join(new_index[t], face, new_index[u], gluing)
                        .expect("component gluings transfer cleanly");
                }
            }
        }
        parts
    }

    /// Replaces every tetrahedron by its 24 barycentric pieces.
    ///
    /// Piece `p` of a cell spans the vertex `p[0]`, the midpoint of edge
    /// `p[0] p[1]`, the centroid of face `p[3]` and the centre; pieces are
    /// glued within a cell by composing with transpositions and across the
    /// old face gluings beyond it.
    pub fn barycentric_subdivision(&mut self) {
        let n = self.num_tetrahedra();
        if n == 0 {
            return;
        }
        let mut result = Triangulation::new();
        result.new_tetrahedra(24 * n);
        let swaps = [perm(1, 0, 2, 3), perm(0, 2, 1, 3), perm(0, 1, 3, 2)];
        for t in 0..n {
            for (j, p) in ALL_PERMS_S4.iter().enumerate() {
                let me = 24 * t + j;
                for (face, swap) in swaps.iter().enumerate() {
                    let partner = 24 * t + p.compose(*swap).s4_index();
                    if partner > me {
                        result
                            .join(me, face, partner, Perm4::IDENTITY)
                            .expect("interior pieces glue consistently");
                    }
                }
                if let Some(FaceGluing { tet: u, gluing }) = self.tets()[t].adj[p.apply(3)] {
                    let partner = 24 * u + gluing.compose(*p).s4_index();
                    if partner > me {
                        result
                            .join(me, 3, partner, Perm4::IDENTITY)
                            .expect("subdivided gluings mirror the originals");
                    }
                }
            }
        }
        *self = result;
    }

    /// Cones every real boundary triangle to a new apex, turning each real
    /// boundary component into a single (typically ideal) vertex.
    ///
    /// Does nothing on a triangulation without real boundary.
    pub fn finite_to_ideal(&mut self) -> Result<()> {
        if !self.has_boundary_triangles() {
            return Ok(());
        }

        // Plan the side gluings between cone cells while the skeleton is
        // alive: one join per boundary edge, pairing its two end slots.
        struct SideJoin {
            slot_a: (usize, usize),
            face_a: usize,
            slot_b: (usize, usize),
            face_b: usize,
            gluing: Perm4,
        }
        let mut cone_slots: Vec<(usize, usize)> = Vec::new();
        let mut side_joins: Vec<SideJoin> = Vec::new();
        {
            let skel = self.skeleton();
            for t in 0..self.num_tetrahedra() {
                for f in 0..4 {
                    if self.tets()[t].adj[f].is_none() {
                        cone_slots.push((t, f));
                    }
                }
            }
            for edge in 0..skel.edges().len() {
                if !skel.edges()[edge].is_boundary() {
                    continue;
                }
                let front = skel.edges()[edge].embeddings()[0];
                let back = *skel.edges()[edge].embeddings().last().unwrap();
                let fmap = skel.tet_edge_mapping(front.tet, front.edge);
                let bmap = skel.tet_edge_mapping(back.tet, back.edge);
                let (fa, fb) = (front.tet, fmap.apply(2));
                let (ba, bb) = (back.tet, bmap.apply(3));
                // Positions of the edge ends within each cone cell.
                let fo_a = face_ordering(fb);
                let fo_b = face_ordering(bb);
                let a0 = fo_a.preimage(fmap.apply(0));
                let a1 = fo_a.preimage(fmap.apply(1));
                let b0 = fo_b.preimage(bmap.apply(0));
                let b1 = fo_b.preimage(bmap.apply(1));
                let (ca, cb) = (3 - a0 - a1, 3 - b0 - b1);
                let mut images = [0u8; 4];
                images[a0] = b0 as u8;
                images[a1] = b1 as u8;
                images[ca] = cb as u8;
                images[3] = 3;
                side_joins.push(SideJoin {
                    slot_a: (fa, fb),
                    face_a: ca,
                    slot_b: (ba, bb),
                    face_b: cb,
                    gluing: Perm4::from_images(images[0], images[1], images[2], images[3])
                        .expect("cone side positions are distinct"),
                });
            }
        }

        let mut cone_of: HashMap<(usize, usize), usize> = HashMap::new();
        for &(t, f) in &cone_slots {
            let apex = self.new_tetrahedron();
            cone_of.insert((t, f), apex);
            self.join(apex, 3, t, face_ordering(f))?;
        }
        for sj in side_joins {
            let a = cone_of[&sj.slot_a];
            let b = cone_of[&sj.slot_b];
            debug_assert_eq!(sj.gluing.apply(sj.face_a), sj.face_b);
            self.join(a, sj.face_a, b, sj.gluing)?;
        }
        Ok(())
    }

    /// Truncates every ideal or invalid vertex, producing real boundary in
    /// its place.  Standard vertices are untouched; if every vertex is
    /// standard this is a no-op.
    ///
    /// Each tetrahedron is cut at its edge midpoints into four corner
    /// cells and a central octahedron (coned from the centre into eight
    /// cells); corner cells at non-standard vertices are then discarded.
    pub fn ideal_to_finite(&mut self) -> Result<()> {
        let n = self.num_tetrahedra();
        let doomed: Vec<(usize, usize)> = {
            let skel = self.skeleton();
            (0..n)
                .flat_map(|t| (0..4).map(move |v| (t, v)))
                .filter(|&(t, v)| !skel.vertices()[skel.tet_vertex(t, v)].is_standard())
                .collect()
        };
        if doomed.is_empty() {
            return Ok(());
        }

        let pieces = twelve_pieces();
        let mut result = Triangulation::new();
        result.new_tetrahedra(12 * n);

        // Gluings between the twelve pieces of one cell: every pair of
        // pieces sharing three points.
        for t in 0..n {
            for i in 0..12 {
                for j in (i + 1)..12 {
                    let shared: Vec<&Point> = pieces[i]
                        .iter()
                        .filter(|p| pieces[j].contains(p))
                        .collect();
                    if shared.len() != 3 {
                        continue;
                    }
                    let face_i = pieces[i]
                        .iter()
                        .position(|p| !pieces[j].contains(p))
                        .unwrap();
                    let face_j = pieces[j]
                        .iter()
                        .position(|p| !pieces[i].contains(p))
                        .unwrap();
                    let g = piece_gluing(&pieces[i], face_i, &pieces[j], face_j);
                    result.join(12 * t + i, face_i, 12 * t + j, g)?;
                }
            }
        }

        // Gluings across the old faces: each old face carries three corner
        // sub-triangles and one medial triangle.
        for t in 0..n {
            for f in 0..4 {
                let Some(FaceGluing { tet: u, gluing }) = self.tets()[t].adj[f] else {
                    continue;
                };
                if (u, gluing.apply(f)) <= (t, f) {
                    continue;
                }
                for (i, piece) in pieces.iter().enumerate() {
                    for face_i in 0..4 {
                        let tri: Vec<Point> = (0..4)
                            .filter(|&p| p != face_i)
                            .map(|p| piece[p])
                            .collect();
                        if !tri.iter().all(|pt| pt.on_face(f)) {
                            continue;
                        }
                        // Locate the partner sub-face in the adjacent cell.
                        let image: Vec<Point> = tri.iter().map(|pt| pt.map(gluing)).collect();
                        let (j, face_j) = find_sub_face(&pieces, &image)
                            .expect("sub-faces match across a gluing");
                        let mut images = [4u8; 4];
                        for p in 0..4 {
                            if p == face_i {
                                images[p] = face_j as u8;
                            } else {
                                let target = piece[p].map(gluing);
                                images[p] = pieces[j]
                                    .iter()
                                    .position(|q| *q == target)
                                    .expect("points carry across the gluing")
                                    as u8;
                            }
                        }
                        let g =
                            Perm4::from_images(images[0], images[1], images[2], images[3])
                                .expect("sub-face gluings are bijective");
                        result.join(12 * t + i, face_i, 12 * u + j, g)?;
                    }
                }
            }
        }

        // Discard the corner cells at non-standard vertices (corner cell v
        // of cell t is piece v).
        let mut condemned: Vec<usize> = doomed.iter().map(|&(t, v)| 12 * t + v).collect();
        condemned.sort_unstable();
        for &index in condemned.iter().rev() {
            result.remove_tetrahedron(index)?;
        }

        *self = result;
        Ok(())
    }

    /// Opens the book along an internal triangle that has two boundary
    /// edges and one interior edge, turning it into a pair of boundary
    /// triangles.  Returns whether the move was performed.
    pub fn open_book(&mut self, triangle: usize) -> Result<bool> {
        let slot = {
            let skel = self.skeleton();
            if triangle >= skel.triangles().len() {
                return Err(crate::error::TriError::InvalidLabel {
                    kind: "triangle",
                    label: triangle,
                });
            }
            let tri = &skel.triangles()[triangle];
            if tri.is_boundary() {
                return Ok(false);
            }
            let edges: Vec<usize> = (0..3).map(|i| skel.triangle_edge(triangle, i)).collect();
            if edges[0] == edges[1] || edges[1] == edges[2] || edges[0] == edges[2] {
                return Ok(false);
            }
            let on_boundary: Vec<bool> = edges
                .iter()
                .map(|&e| skel.edges()[e].is_boundary())
                .collect();
            if on_boundary.iter().filter(|&&b| b).count() != 2 {
                return Ok(false);
            }
            let emb = tri.embeddings()[0];
            (emb.tet, emb.face)
        };
        self.unjoin(slot.0, slot.1)?;
        Ok(true)
    }
}

fn find_sub_face(pieces: &[[Point; 4]], triangle: &[Point]) -> Option<(usize, usize)> {
    for (j, piece) in pieces.iter().enumerate() {
        for face in 0..4 {
            let matches = (0..4)
                .filter(|&p| p != face)
                .all(|p| triangle.contains(&piece[p]));
            if matches {
                return Some((j, face));
            }
        }
    }
    None
}
