//! Error types for the manifold3 library.

use thiserror::Error;

/// Result type alias for triangulation operations
pub type Result<T> = std::result::Result<T, TriError>;

/// Errors that can occur when building or querying triangulations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TriError {
    /// A byte that does not decode to a permutation of {0,1,2,3}
    #[error("Invalid permutation code: {0:#04x}")]
    InvalidPermCode(u8),

    /// Images passed to a permutation constructor do not form {0,1,2,3}
    #[error("Images ({0}, {1}, {2}, {3}) are not a permutation of 0..4")]
    NotAPermutation(u8, u8, u8, u8),

    /// A vertex or face label outside 0..4, or an edge label outside 0..6
    #[error("Invalid {kind} label: {label}")]
    InvalidLabel {
        /// What the label was supposed to identify ("vertex", "face", "edge")
        kind: &'static str,
        /// The offending label
        label: usize,
    },

    /// Tetrahedron index outside the triangulation
    #[error("Tetrahedron index {index} out of range (have {len})")]
    TetrahedronOutOfRange {
        /// The requested index
        index: usize,
        /// Number of tetrahedra present
        len: usize,
    },

    /// Attempted to glue a face that is already glued
    #[error("Face {face} of tetrahedron {tet} is already glued")]
    FaceAlreadyJoined {
        /// The tetrahedron whose face is occupied
        tet: usize,
        /// The occupied face
        face: usize,
    },

    /// Attempted to glue a face of a tetrahedron to itself
    #[error("Cannot glue face {face} of tetrahedron {tet} to itself")]
    JoinFaceToItself {
        /// The tetrahedron
        tet: usize,
        /// The face that would be identified with itself
        face: usize,
    },

    /// A tabular construction whose adjacency or gluing entries are not
    /// mutually consistent
    #[error("Inconsistent construction table at tetrahedron {tet}, face {face}: {reason}")]
    BadConstruction {
        /// The tetrahedron at which the inconsistency was found
        tet: usize,
        /// The face at which the inconsistency was found
        face: usize,
        /// What went wrong
        reason: &'static str,
    },

    /// Layered construction parameters that do not describe a valid object
    #[error("Invalid layering parameters ({0}, {1}): must be coprime")]
    BadLayeringParameters(u64, u64),

    /// A signature string that cannot be decoded
    #[error("Malformed signature: {0}")]
    BadSignature(String),

    /// A query whose preconditions exclude the given triangulation
    #[error("Operation not applicable: {0}")]
    NotApplicable(&'static str),

    /// The normal-surface collaborator could not certify an answer
    #[error("Collaborator could not decide: {0}")]
    Unsupported(String),
}
