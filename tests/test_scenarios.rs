//! End-to-end recognition scenarios over the standard families, driven by
//! small stand-in surface engines.
//!
//! The real normal-surface engine is an external collaborator; the
//! engines here answer its two queries for the specific situations each
//! scenario reaches (0-efficient inputs, or a scripted crush), so these
//! tests pin down the recognition drivers end to end.

use std::cell::RefCell;
use std::collections::VecDeque;

use manifold3::{NormalSurface, Perm4, Result, SurfaceOracle, TriError, Triangulation};

/// A surface that is never produced.
#[derive(Debug)]
enum NoSurface {}

impl NormalSurface for NoSurface {
    fn edge_weight(&self, _edge: usize) -> u64 {
        match *self {}
    }
    fn crush(&self) -> Triangulation {
        match *self {}
    }
}

/// A token almost-normal sphere; never crushed by the recognisers.
struct Token;

impl NormalSurface for Token {
    fn edge_weight(&self, _edge: usize) -> u64 {
        0
    }
    fn crush(&self) -> Triangulation {
        Triangulation::new()
    }
}

/// Engine for 0-efficient inputs containing an octagonal almost-normal
/// sphere (small 3-spheres and the pieces they cone to).
struct SphereRich;

impl SurfaceOracle for SphereRich {
    type Surface = Token;
    fn non_trivial_sphere_or_disc(&self, _tri: &Triangulation) -> Result<Option<Token>> {
        Ok(None)
    }
    fn octagonal_almost_normal_sphere(
        &self,
        _tri: &Triangulation,
    ) -> Result<Option<Token>> {
        Ok(Some(Token))
    }
}

/// Engine for 0-efficient inputs with no almost-normal sphere.
struct SphereFree;

impl SurfaceOracle for SphereFree {
    type Surface = NoSurface;
    fn non_trivial_sphere_or_disc(
        &self,
        _tri: &Triangulation,
    ) -> Result<Option<NoSurface>> {
        Ok(None)
    }
    fn octagonal_almost_normal_sphere(
        &self,
        _tri: &Triangulation,
    ) -> Result<Option<NoSurface>> {
        Ok(None)
    }
}

/// Replays scripted crush results for the leading surface queries, then
/// reports 0-efficiency.
struct Scripted {
    crushes: RefCell<VecDeque<Triangulation>>,
}

impl Scripted {
    fn new(crushes: Vec<Triangulation>) -> Scripted {
        Scripted {
            crushes: RefCell::new(crushes.into()),
        }
    }
}

struct ScriptedSurface {
    result: Triangulation,
}

impl NormalSurface for ScriptedSurface {
    fn edge_weight(&self, _edge: usize) -> u64 {
        0
    }
    fn crush(&self) -> Triangulation {
        self.result.clone()
    }
}

impl SurfaceOracle for Scripted {
    type Surface = ScriptedSurface;
    fn non_trivial_sphere_or_disc(
        &self,
        _tri: &Triangulation,
    ) -> Result<Option<ScriptedSurface>> {
        Ok(self
            .crushes
            .borrow_mut()
            .pop_front()
            .map(|result| ScriptedSurface { result }))
    }
    fn octagonal_almost_normal_sphere(
        &self,
        _tri: &Triangulation,
    ) -> Result<Option<ScriptedSurface>> {
        Ok(None)
    }
}

/// Engine that cannot certify anything: recognisers must propagate the
/// failure instead of guessing.
struct Undecided;

impl SurfaceOracle for Undecided {
    type Surface = NoSurface;
    fn non_trivial_sphere_or_disc(
        &self,
        _tri: &Triangulation,
    ) -> Result<Option<NoSurface>> {
        Err(TriError::Unsupported("quad space unavailable".into()))
    }
    fn octagonal_almost_normal_sphere(
        &self,
        _tri: &Triangulation,
    ) -> Result<Option<NoSurface>> {
        Err(TriError::Unsupported("quad space unavailable".into()))
    }
}

fn lens(p: u64, q: u64) -> Triangulation {
    let mut tri = Triangulation::new();
    tri.insert_layered_lens_space(p, q).unwrap();
    tri
}

fn figure_eight() -> Triangulation {
    let mut tri = Triangulation::new();
    let p = |a, b, c, d| Perm4::from_images(a, b, c, d).unwrap();
    let r = tri.new_tetrahedron();
    let s = tri.new_tetrahedron();
    tri.join(r, 0, s, p(1, 3, 0, 2)).unwrap();
    tri.join(r, 1, s, p(2, 0, 3, 1)).unwrap();
    tri.join(r, 2, s, p(0, 3, 2, 1)).unwrap();
    tri.join(r, 3, s, p(2, 1, 0, 3)).unwrap();
    tri
}

#[test]
fn test_scenario_lens_1_0() {
    // L(1,0): the 3-sphere.
    let tri = lens(1, 0);
    assert!(tri.homology_h1().is_trivial());
    assert_eq!(tri.num_components(), 1);
    assert_eq!(tri.num_boundary_components(), 0);
    assert!(tri.is_three_sphere(&SphereRich).unwrap());
}

#[test]
fn test_scenario_lens_8_3() {
    // L(8,3): not a sphere, H1 = Z/8, a single prime summand.
    let tri = lens(8, 3);
    assert!(!tri.is_three_sphere(&SphereFree).unwrap());
    assert_eq!(tri.homology_h1().rank(), 0);
    assert_eq!(tri.homology_h1().invariant_factors(), &[8]);
    let primes = tri.connected_sum_decomposition(&SphereFree).unwrap();
    assert_eq!(primes.len(), 1);
}

#[test]
fn test_scenario_two_projective_space_summands() {
    // The composite RP3 # RP3 decomposes into two projective spaces:
    // crushing its essential sphere hands back the two summands.
    let input = lens(2, 1);
    let mut both = Triangulation::new();
    both.insert_layered_lens_space(2, 1).unwrap();
    both.insert_layered_lens_space(2, 1).unwrap();
    let engine = Scripted::new(vec![both]);
    let primes = input.connected_sum_decomposition(&engine).unwrap();
    assert_eq!(primes.len(), 2);
    for prime in &primes {
        assert_eq!(prime.homology_h1().invariant_factors(), &[2]);
    }
}

#[test]
fn test_scenario_three_projective_space_summands() {
    // Three RP3 summands surfacing across two crushing rounds: the first
    // crush splits off one summand, the second splits the rest.
    let input = lens(2, 1);
    let mut first = Triangulation::new();
    first.insert_layered_lens_space(2, 1).unwrap();
    first.insert_layered_lens_space(2, 1).unwrap();
    first.insert_layered_lens_space(2, 1).unwrap();
    let engine = Scripted::new(vec![first]);
    let primes = input.connected_sum_decomposition(&engine).unwrap();
    assert_eq!(primes.len(), 3);
    for prime in &primes {
        assert_eq!(prime.homology_h1().invariant_factors(), &[2]);
    }
}

#[test]
fn test_scenario_layered_solid_torus_3_4() {
    let tri = {
        let mut t = Triangulation::new();
        t.insert_layered_solid_torus(3, 4).unwrap();
        t
    };
    // One torus boundary component and H1 = Z.
    assert_eq!(tri.num_boundary_components(), 1);
    let bc = &tri.skeleton().boundary_components()[0];
    assert!(bc.is_real());
    assert_eq!(bc.euler_characteristic(), 0);
    assert!(bc.is_orientable());
    assert!(tri.homology_h1().is_z());
    // Crushing the meridian disc reduces it to a ball.
    let mut ball = Triangulation::new();
    ball.new_tetrahedron();
    assert!(tri.is_solid_torus(&Scripted::new(vec![ball])).unwrap());
    assert!(!tri.is_ball(&SphereRich).unwrap());
}

#[test]
fn test_scenario_figure_eight() {
    let tri = figure_eight();
    assert_eq!(tri.num_boundary_components(), 1);
    assert!(tri.skeleton().boundary_components()[0].is_ideal());
    assert_eq!(
        tri.skeleton().boundary_components()[0].euler_characteristic(),
        0
    );
    assert!(tri.homology_h1().is_z());
    assert!(!tri.is_three_sphere(&SphereRich).unwrap());
    assert!(!tri.is_ball(&SphereRich).unwrap());
    assert!(!tri.is_solid_torus(&SphereFree).unwrap());
}

#[test]
fn test_empty_triangulation_answers_no() {
    let tri = Triangulation::new();
    assert_eq!(tri.num_components(), 0);
    assert!(!tri.is_three_sphere(&SphereRich).unwrap());
    assert!(!tri.is_ball(&SphereRich).unwrap());
    assert!(!tri.is_solid_torus(&SphereRich).unwrap());
}

#[test]
fn test_engine_failures_propagate() {
    // L(1,0) passes every fast check, so the first engine query decides;
    // an undecided engine must surface as an error, not a guess.
    let tri = lens(1, 0);
    assert!(matches!(
        tri.is_three_sphere(&Undecided),
        Err(TriError::Unsupported(_))
    ));
    // The error is not cached: a capable engine still gets through.
    assert!(tri.is_three_sphere(&SphereRich).unwrap());
}

#[test]
fn test_solid_torus_converts_ideal_boundary() {
    // An ideal solid torus: cone the boundary of LST(1,2) to a cusp.
    let mut tri = Triangulation::new();
    tri.insert_layered_solid_torus(1, 2).unwrap();
    tri.finite_to_ideal().unwrap();
    assert!(tri.is_ideal());
    assert!(tri.homology_h1().is_z());
    // With no essential disc reported, the recogniser says no, but it
    // must get past the ideal-to-finite conversion and homology gate.
    assert!(!tri.is_solid_torus(&SphereFree).unwrap());
}
