//! # manifold3
//!
//! A pure Rust engine for 3-manifold triangulations: tetrahedra glued
//! across faces, the derived skeleton (vertices, edges, triangles,
//! components, boundary components), and the canonical topological
//! queries built directly on it — is-3-sphere, is-3-ball, is-solid-torus
//! and connected sum decomposition.
//!
//! ## Features
//!
//! - **Pure Rust**: no FFI, no unsafe code
//! - **Index addressed**: cells and skeletal objects are arena indices,
//!   so a stale reference after a mutation is a detectable error rather
//!   than undefined behaviour
//! - **Lazy skeleton**: every mutation marks the skeletal snapshot stale;
//!   the next query rebuilds it in one pass
//! - **External surface engine**: normal-surface enumeration is consumed
//!   through the [`SurfaceOracle`] trait, never implemented here
//!
//! ## Quick Start
//!
//! ```
//! use manifold3::Triangulation;
//!
//! let mut tri = Triangulation::new();
//! tri.insert_layered_lens_space(8, 3)?;
//! assert!(tri.is_valid() && tri.is_closed() && tri.is_orientable());
//! assert_eq!(tri.homology_h1().invariant_factors(), &[8]);
//! # Ok::<(), manifold3::TriError>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`error`] - Error types and the result alias
//! - [`perm`] - Permutations of {0,1,2,3} and the fixed numbering tables
//! - [`tetrahedron`] - The primitive cell
//! - [`triangulation`] - The container and its mutation operations
//! - [`skeleton`] - Derived vertices, edges, triangles, components and
//!   boundary components
//! - [`homology`] - Abelian groups and first homology
//! - [`subcomplex`] - Snapped balls and the embedded 2-sphere pieces
//! - [`surface`] - The normal-surface collaborator interface
//!
//! Construction (tabular, layered solid tori, lens spaces), the global
//! transforms (barycentric subdivision, boundary/ideal conversion, book
//! opening, component splitting), simplification, the gluing signature
//! codec and the recognition routines are implemented directly on
//! [`Triangulation`].

#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod error;
pub mod homology;
pub mod perm;
pub mod skeleton;
pub mod subcomplex;
pub mod surface;
pub mod tetrahedron;
pub mod triangulation;

// Operations implemented on Triangulation.
mod construct;
mod recognize;
mod signature;
mod simplify;
mod transform;

// Re-exports for convenience
pub use error::{Result, TriError};
pub use homology::AbelianGroup;
pub use perm::{
    edge_number, edge_ordering, face_ordering, Perm4, ALL_PERMS_S2, ALL_PERMS_S2_INV,
    ALL_PERMS_S3, ALL_PERMS_S3_INV, ALL_PERMS_S4, ALL_PERMS_S4_INV, EDGE_END, EDGE_NUMBER,
    EDGE_START,
};
pub use skeleton::{
    BoundaryComponent, BoundaryKind, Component, Edge, EdgeEmbedding, Skeleton, Triangle,
    TriangleEmbedding, TriangleType, Vertex, VertexEmbedding, VertexLink,
};
pub use subcomplex::{PillowTwoSphere, SnappedBall, SnappedTwoSphere};
pub use surface::{NormalSurface, SurfaceOracle};
pub use tetrahedron::Tetrahedron;
pub use triangulation::Triangulation;
