//! The triangulation container: a sequence of tetrahedra plus the lazily
//! rebuilt skeletal snapshot.
//!
//! All mutation goes through the methods here (and the construction and
//! transform modules).  Every mutator validates its arguments before
//! touching any state, so a failed call leaves the triangulation
//! unchanged, and every successful mutation marks the skeletal snapshot
//! and all cached properties stale.

use std::cell::{Cell, OnceCell};

use crate::error::{Result, TriError};
use crate::homology::AbelianGroup;
use crate::perm::Perm4;
use crate::skeleton::Skeleton;
use crate::tetrahedron::{FaceGluing, Tetrahedron};

/// A 3-manifold triangulation: tetrahedra glued across faces.
///
/// Tetrahedra are addressed by index in insertion order.  Removing a
/// tetrahedron compacts the sequence, shifting the indices of all later
/// tetrahedra down by one.
///
/// Skeletal data (vertices, edges, triangles, components, boundary
/// components) is computed on first query after a mutation and cached
/// until the next mutation; indices into the skeleton are only meaningful
/// against the current snapshot.
#[derive(Debug, Clone, Default)]
pub struct Triangulation {
    tets: Vec<Tetrahedron>,
    skeleton: OnceCell<Skeleton>,
    h1: OnceCell<AbelianGroup>,
    pub(crate) three_sphere: Cell<Option<bool>>,
    pub(crate) three_ball: Cell<Option<bool>>,
    pub(crate) solid_torus: Cell<Option<bool>>,
}

impl Triangulation {
    /// Creates an empty triangulation.
    pub fn new() -> Triangulation {
        Triangulation::default()
    }

    /// Number of tetrahedra.
    pub fn num_tetrahedra(&self) -> usize {
        self.tets.len()
    }

    /// Whether the triangulation contains no tetrahedra.
    pub fn is_empty(&self) -> bool {
        self.tets.is_empty()
    }

    /// The tetrahedron at the given index.
    pub fn tetrahedron(&self, index: usize) -> Result<&Tetrahedron> {
        self.tets.get(index).ok_or(TriError::TetrahedronOutOfRange {
            index,
            len: self.tets.len(),
        })
    }

    /// Iterates over all tetrahedra in index order.
    pub fn tetrahedra(&self) -> impl Iterator<Item = &Tetrahedron> {
        self.tets.iter()
    }

    pub(crate) fn tets(&self) -> &[Tetrahedron] {
        &self.tets
    }

    /// Appends a new isolated tetrahedron and returns its index.
    pub fn new_tetrahedron(&mut self) -> usize {
        self.new_tetrahedron_with("")
    }

    /// Appends a new isolated tetrahedron carrying a description.
    pub fn new_tetrahedron_with(&mut self, description: impl Into<String>) -> usize {
        self.invalidate();
        self.tets.push(Tetrahedron::new(description));
        self.tets.len() - 1
    }

    /// Appends `n` new isolated tetrahedra, returning their index range.
    pub fn new_tetrahedra(&mut self, n: usize) -> std::ops::Range<usize> {
        self.invalidate();
        let start = self.tets.len();
        self.tets
            .extend(std::iter::repeat_with(Tetrahedron::default).take(n));
        start..self.tets.len()
    }

    /// Replaces the description of the tetrahedron at `index`.
    ///
    /// Descriptions are inert labels; changing one does not touch the
    /// skeleton.
    pub fn set_description(&mut self, index: usize, description: impl Into<String>) -> Result<()> {
        self.tetrahedron(index)?;
        self.tets[index].description = description.into();
        Ok(())
    }

    /// Removes the tetrahedron at `index`, first unjoining all its faces.
    ///
    /// Tetrahedra after `index` shift down by one.
    pub fn remove_tetrahedron(&mut self, index: usize) -> Result<()> {
        self.tetrahedron(index)?;
        self.isolate(index)?;
        self.tets.remove(index);
        for tet in &mut self.tets {
            for slot in &mut tet.adj {
                if let Some(g) = slot {
                    debug_assert_ne!(g.tet, index);
                    if g.tet > index {
                        g.tet -= 1;
                    }
                }
            }
        }
        self.invalidate();
        Ok(())
    }

    /// Removes every tetrahedron, leaving the triangulation empty.
    pub fn remove_all_tetrahedra(&mut self) {
        self.tets.clear();
        self.invalidate();
    }

    /// Glues `face` of tetrahedron `tet` to tetrahedron `other` via the
    /// given vertex permutation (which maps `face` to the partner face).
    ///
    /// Self-gluings between two distinct faces of one tetrahedron are
    /// allowed.  Fails if either face involved is already glued, or if the
    /// call would glue a face to itself.
    pub fn join(&mut self, tet: usize, face: usize, other: usize, gluing: Perm4) -> Result<()> {
        self.check_face(tet, face)?;
        self.tetrahedron(other)?;
        let other_face = gluing.apply(face);
        if tet == other && face == other_face {
            return Err(TriError::JoinFaceToItself { tet, face });
        }
        if self.tets[tet].adj[face].is_some() {
            return Err(TriError::FaceAlreadyJoined { tet, face });
        }
        if self.tets[other].adj[other_face].is_some() {
            return Err(TriError::FaceAlreadyJoined {
                tet: other,
                face: other_face,
            });
        }
        self.invalidate();
        self.tets[tet].adj[face] = Some(FaceGluing { tet: other, gluing });
        self.tets[other].adj[other_face] = Some(FaceGluing {
            tet,
            gluing: gluing.inverse(),
        });
        Ok(())
    }

    /// Unglues the given face, leaving both sides boundary.  Idempotent;
    /// returns the index of the former partner, if the face was glued.
    pub fn unjoin(&mut self, tet: usize, face: usize) -> Result<Option<usize>> {
        self.check_face(tet, face)?;
        let Some(FaceGluing { tet: other, gluing }) = self.tets[tet].adj[face] else {
            return Ok(None);
        };
        self.invalidate();
        self.tets[tet].adj[face] = None;
        self.tets[other].adj[gluing.apply(face)] = None;
        Ok(Some(other))
    }

    /// Unglues every face of the given tetrahedron.
    pub fn isolate(&mut self, tet: usize) -> Result<()> {
        for face in 0..4 {
            self.unjoin(tet, face)?;
        }
        Ok(())
    }

    /// Moves the entire contents of `other` into this triangulation,
    /// leaving `other` empty.  The transferred tetrahedra keep their
    /// relative order, re-indexed after the existing ones.
    pub fn move_contents_from(&mut self, other: &mut Triangulation) {
        let offset = self.tets.len();
        self.invalidate();
        other.invalidate();
        for mut tet in other.tets.drain(..) {
            for slot in &mut tet.adj {
                if let Some(g) = slot {
                    g.tet += offset;
                }
            }
            self.tets.push(tet);
        }
    }

    /// Appends a deep copy of `other` to this triangulation.
    pub fn insert_triangulation(&mut self, other: &Triangulation) {
        let mut copy = other.clone();
        self.move_contents_from(&mut copy);
    }

    pub(crate) fn check_face(&self, tet: usize, face: usize) -> Result<()> {
        self.tetrahedron(tet)?;
        if face >= 4 {
            return Err(TriError::InvalidLabel {
                kind: "face",
                label: face,
            });
        }
        Ok(())
    }

    pub(crate) fn invalidate(&mut self) {
        self.skeleton.take();
        self.h1.take();
        self.three_sphere.set(None);
        self.three_ball.set(None);
        self.solid_torus.set(None);
    }

    /// The current skeletal snapshot, rebuilding it if stale.
    pub fn skeleton(&self) -> &Skeleton {
        self.skeleton.get_or_init(|| Skeleton::build(&self.tets))
    }

    /// Number of vertices in the skeleton.
    pub fn num_vertices(&self) -> usize {
        self.skeleton().vertices().len()
    }

    /// Number of edges in the skeleton.
    pub fn num_edges(&self) -> usize {
        self.skeleton().edges().len()
    }

    /// Number of triangles in the skeleton.
    pub fn num_triangles(&self) -> usize {
        self.skeleton().triangles().len()
    }

    /// Number of connected components.
    pub fn num_components(&self) -> usize {
        self.skeleton().components().len()
    }

    /// Number of boundary components (real, ideal and invalid-vertex).
    pub fn num_boundary_components(&self) -> usize {
        self.skeleton().boundary_components().len()
    }

    /// Whether every edge is valid and every vertex link is a sphere, a
    /// disc, or the link of an ideal vertex.
    pub fn is_valid(&self) -> bool {
        self.skeleton().is_valid()
    }

    /// Whether every component admits a consistent orientation.
    pub fn is_orientable(&self) -> bool {
        self.skeleton().components().iter().all(|c| c.is_orientable())
    }

    /// Whether the triangulation consists of exactly one component.
    ///
    /// The empty triangulation is not connected.
    pub fn is_connected(&self) -> bool {
        self.num_components() == 1
    }

    /// Whether the triangulation has no boundary components of any kind.
    pub fn is_closed(&self) -> bool {
        self.num_boundary_components() == 0
    }

    /// Whether some vertex is ideal.
    pub fn is_ideal(&self) -> bool {
        self.skeleton().vertices().iter().any(|v| v.is_ideal())
    }

    /// Whether any face of any tetrahedron lies on the boundary.
    pub fn has_boundary_triangles(&self) -> bool {
        self.tets.iter().any(|t| t.has_boundary())
    }

    /// Euler characteristic of the triangulation as a cell complex.
    pub fn euler_characteristic(&self) -> i64 {
        let s = self.skeleton();
        s.vertices().len() as i64 - s.edges().len() as i64 + s.triangles().len() as i64
            - self.tets.len() as i64
    }

    /// First homology of the underlying manifold (ideal vertices removed,
    /// real boundary retained).
    ///
    /// Precondition: the triangulation is valid.
    pub fn homology_h1(&self) -> &AbelianGroup {
        self.h1
            .get_or_init(|| crate::homology::homology_h1(self))
    }
}
