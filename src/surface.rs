//! The seam to the normal-surface engine.
//!
//! The recognition routines consume normal and almost-normal 2-spheres
//! and discs but never enumerate them; an external engine supplies them
//! through these traits.  A surface is opaque here: it only reports edge
//! weights and knows how to crush itself.

use crate::error::Result;
use crate::triangulation::Triangulation;

/// A normal or almost-normal surface inside some triangulation, as seen
/// by this crate: edge weights plus the crushing operation.
pub trait NormalSurface {
    /// The number of times the surface meets the given edge class.
    fn edge_weight(&self, edge: usize) -> u64;

    /// Cuts the ambient triangulation along this surface and crushes each
    /// remaining piece's copy of the surface to a point, returning the
    /// resulting triangulation (possibly empty, possibly disconnected).
    fn crush(&self) -> Triangulation;
}

/// The queries the recognition routines pose to a normal-surface engine.
///
/// Either query may fail with [`TriError::Unsupported`] when the engine
/// cannot certify an answer; the recognisers propagate that error rather
/// than guess.
///
/// [`TriError::Unsupported`]: crate::TriError::Unsupported
pub trait SurfaceOracle {
    /// The engine's surface representation.
    type Surface: NormalSurface;

    /// A vertex normal 2-sphere (closed case) or properly embedded normal
    /// disc (bounded case) that is not a vertex link, if one exists.
    fn non_trivial_sphere_or_disc(
        &self,
        tri: &Triangulation,
    ) -> Result<Option<Self::Surface>>;

    /// An octagonal almost-normal 2-sphere in a closed 0-efficient
    /// one-vertex triangulation, if one exists.
    fn octagonal_almost_normal_sphere(
        &self,
        tri: &Triangulation,
    ) -> Result<Option<Self::Surface>>;
}
