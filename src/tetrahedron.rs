//! The tetrahedron: the primitive 3-cell of a triangulation.

use crate::perm::Perm4;

/// One face slot of a tetrahedron: the partner cell and the gluing
/// permutation onto it.
///
/// The permutation maps vertex labels of the owning tetrahedron to vertex
/// labels of the partner; in particular it maps the glued face number to
/// the partner's face number.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FaceGluing {
    /// Index of the adjacent tetrahedron (possibly the owning one)
    pub tet: usize,
    /// Vertex map across the gluing
    pub gluing: Perm4,
}

/// A single tetrahedron of a [`Triangulation`](crate::Triangulation).
///
/// Tetrahedra are owned by their triangulation and addressed by their
/// stable insertion index.  Each of the four faces is either boundary or
/// glued to a face of some tetrahedron in the same triangulation; face `k`
/// is opposite vertex `k`.
#[derive(Debug, Clone, Default)]
pub struct Tetrahedron {
    pub(crate) adj: [Option<FaceGluing>; 4],
    pub(crate) description: String,
}

impl Tetrahedron {
    pub(crate) fn new(description: impl Into<String>) -> Tetrahedron {
        Tetrahedron {
            adj: [None; 4],
            description: description.into(),
        }
    }

    /// The index of the tetrahedron glued to the given face, if any.
    pub fn adjacent_tetrahedron(&self, face: usize) -> Option<usize> {
        self.adj[face].map(|g| g.tet)
    }

    /// The gluing permutation across the given face, if the face is glued.
    pub fn adjacent_gluing(&self, face: usize) -> Option<Perm4> {
        self.adj[face].map(|g| g.gluing)
    }

    /// The face of the adjacent tetrahedron that the given face is glued
    /// to: `adjacent_gluing(face)[face]`.
    pub fn adjacent_face(&self, face: usize) -> Option<usize> {
        self.adj[face].map(|g| g.gluing.apply(face))
    }

    /// Whether any face of this tetrahedron lies on the boundary.
    pub fn has_boundary(&self) -> bool {
        self.adj.iter().any(|g| g.is_none())
    }

    /// The optional human-readable description of this tetrahedron.
    pub fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_tetrahedron_is_isolated() {
        let tet = Tetrahedron::new("");
        assert!(tet.has_boundary());
        for f in 0..4 {
            assert_eq!(tet.adjacent_tetrahedron(f), None);
            assert_eq!(tet.adjacent_gluing(f), None);
            assert_eq!(tet.adjacent_face(f), None);
        }
    }
}
