//! Recognition and decomposition: is-3-sphere, is-3-ball, is-solid-torus
//! and the connected sum decomposition.
//!
//! Each routine works on clones, repeatedly simplifying and crushing
//! along surfaces supplied by the [`SurfaceOracle`].  The closed-case
//! logic rests on 0-efficiency theory: once no non-trivial normal sphere
//! remains, a closed orientable triangulation with more than one vertex
//! is a 3-sphere, and a one-vertex one is a 3-sphere exactly when it
//! contains an octagonal almost-normal sphere.
//!
//! Precondition failures answer `false` (the question is well posed and
//! the answer is no); only the decomposition, whose empty result already
//! means "3-sphere", reports them as [`TriError::NotApplicable`].

use crate::error::{Result, TriError};
use crate::homology::AbelianGroup;
use crate::surface::{NormalSurface, SurfaceOracle};
use crate::triangulation::Triangulation;

impl Triangulation {
    /// Determines whether this is a triangulation of the 3-sphere.
    ///
    /// The answer is cached until the next mutation.
    pub fn is_three_sphere<E: SurfaceOracle>(&self, engine: &E) -> Result<bool> {
        if let Some(known) = self.three_sphere.get() {
            return Ok(known);
        }
        let answer = self.compute_three_sphere(engine)?;
        self.three_sphere.set(Some(answer));
        Ok(answer)
    }

    fn compute_three_sphere<E: SurfaceOracle>(&self, engine: &E) -> Result<bool> {
        if !(self.is_valid() && self.is_closed() && self.is_orientable() && self.is_connected())
        {
            return Ok(false);
        }

        // Check homology on a simplified copy before the heavy machinery.
        let mut working = self.clone();
        working.simplify()?;
        if !working.homology_h1().is_trivial() {
            return Ok(false);
        }

        // The original triangulation is the connected sum of everything on
        // the stack; each entry has trivial homology.
        let mut to_process = vec![working];
        while let Some(processing) = to_process.pop() {
            match engine.non_trivial_sphere_or_disc(&processing)? {
                Some(sphere) => {
                    let mut crushed = sphere.crush();
                    crushed.simplify()?;
                    if !crushed.is_empty() {
                        to_process.extend(crushed.split_into_components());
                    }
                }
                None => {
                    // 0-efficient.  With more than one vertex this piece
                    // must itself be a 3-sphere; with one vertex it is a
                    // 3-sphere exactly when an octagonal almost-normal
                    // sphere exists.
                    if processing.num_vertices() > 1 {
                        continue;
                    }
                    if engine
                        .octagonal_almost_normal_sphere(&processing)?
                        .is_none()
                    {
                        return Ok(false);
                    }
                }
            }
        }
        Ok(true)
    }

    /// Determines whether this is a triangulation of the 3-ball.
    ///
    /// The answer is cached until the next mutation.
    pub fn is_ball<E: SurfaceOracle>(&self, engine: &E) -> Result<bool> {
        if let Some(known) = self.three_ball.get() {
            return Ok(known);
        }
        let answer = self.compute_ball(engine)?;
        self.three_ball.set(Some(answer));
        Ok(answer)
    }

    fn compute_ball<E: SurfaceOracle>(&self, engine: &E) -> Result<bool> {
        if !(self.is_valid()
            && self.has_boundary_triangles()
            && self.is_orientable()
            && self.is_connected()
            && self.num_boundary_components() == 1
            && self.skeleton().boundary_components()[0].euler_characteristic() == 2)
        {
            return Ok(false);
        }

        // Cone the boundary to a point (fill it with a ball) and ask the
        // sphere recogniser.
        let mut working = self.clone();
        working.simplify()?;
        working.finite_to_ideal()?;
        working.simplify()?;
        working.is_three_sphere(engine)
    }

    /// Determines whether this is a triangulation of the solid torus.
    ///
    /// The answer is cached until the next mutation.
    pub fn is_solid_torus<E: SurfaceOracle>(&self, engine: &E) -> Result<bool> {
        if let Some(known) = self.solid_torus.get() {
            return Ok(known);
        }
        let answer = self.compute_solid_torus(engine)?;
        self.solid_torus.set(Some(answer));
        Ok(answer)
    }

    fn compute_solid_torus<E: SurfaceOracle>(&self, engine: &E) -> Result<bool> {
        {
            let preconds = self.is_valid()
                && self.is_orientable()
                && self.is_connected()
                && self.num_boundary_components() == 1
                && {
                    let bc = &self.skeleton().boundary_components()[0];
                    bc.euler_characteristic() == 0 && bc.is_orientable()
                };
            if !preconds {
                return Ok(false);
            }
        }

        // Work with real boundary, and verify H1 before crushing; the
        // homology also rules out hidden S2 x S1 summands, which keeps
        // the piece classification below complete.
        let mut working = self.clone();
        working.simplify()?;
        if working.is_ideal() {
            working.ideal_to_finite()?;
            working.simplify()?;
        }
        if !working.homology_h1().is_z() {
            return Ok(false);
        }

        loop {
            // working stays homeomorphic to the original manifold.
            if working.num_vertices() > 1 {
                working.simplify()?;
                if working.num_vertices() > 1 {
                    working.barycentric_subdivision();
                    working.simplify()?;
                }
            }

            let Some(surface) = engine.non_trivial_sphere_or_disc(&working)? else {
                // No non-trivial disc: not a solid torus.
                return Ok(false);
            };

            let mut crushed = surface.crush();
            crushed.simplify()?;

            // Crushing can only undo connected sums, cut along properly
            // embedded discs, and gain or lose balls and spheres.  Any
            // closed piece must be a sphere, any sphere-boundary piece a
            // ball, and at most one piece keeps the torus boundary.
            let mut survivor: Option<Triangulation> = None;
            for piece in crushed.split_into_components() {
                if piece.is_closed() {
                    if !piece.is_three_sphere(engine)? {
                        return Ok(false);
                    }
                } else if piece.num_boundary_components() > 1 {
                    // Homology already excluded S2 x S1 summands.
                    log::warn!(
                        "solid torus crush produced a piece with multiple \
                         boundary components; this should not be possible"
                    );
                    return Ok(false);
                } else if piece.skeleton().boundary_components()[0].euler_characteristic()
                    == 2
                {
                    if !piece.is_ball(engine)? {
                        return Ok(false);
                    }
                } else {
                    if survivor.is_some() {
                        log::warn!(
                            "solid torus crush produced multiple torus-boundary \
                             pieces; this should not be possible"
                        );
                        return Ok(false);
                    }
                    survivor = Some(piece);
                }
            }

            match survivor {
                // Everything reduced to balls and spheres: the original
                // manifold was a solid torus.
                None => return Ok(true),
                Some(next) => working = next,
            }
        }
    }

    /// Decomposes a valid closed orientable connected triangulation into
    /// its prime connected summands, returned as separate triangulations:
    /// none for the 3-sphere, one for a prime manifold, two or more for a
    /// composite.
    ///
    /// Fails with [`TriError::NotApplicable`] when the preconditions do
    /// not hold.
    pub fn connected_sum_decomposition<E: SurfaceOracle>(
        &self,
        engine: &E,
    ) -> Result<Vec<Triangulation>> {
        if !(self.is_valid() && self.is_closed() && self.is_orientable() && self.is_connected())
        {
            return Err(TriError::NotApplicable(
                "connected sum decomposition needs a valid closed orientable \
                 connected triangulation",
            ));
        }

        let mut working = self.clone();
        working.simplify()?;
        let (init_z, init_z2, init_z3) = ranks(working.homology_h1());

        // The original manifold is the connected sum of everything on the
        // stack, everything in primes, and possibly some S2 x S1, RP3 and
        // L(3,1) terms consumed silently by crushing.
        let mut to_process = vec![working];
        let mut primes: Vec<Triangulation> = Vec::new();
        while let Some(processing) = to_process.pop() {
            match engine.non_trivial_sphere_or_disc(&processing)? {
                Some(sphere) => {
                    let mut crushed = sphere.crush();
                    crushed.simplify()?;
                    if !crushed.is_empty() {
                        to_process.extend(crushed.split_into_components());
                    }
                }
                None => {
                    // 0-efficient, hence prime; discard the 3-spheres.
                    if processing.num_vertices() > 1 {
                        continue;
                    }
                    if engine
                        .octagonal_almost_normal_sphere(&processing)?
                        .is_some()
                    {
                        continue;
                    }
                    primes.push(processing);
                }
            }
        }

        // Put back the summands that crushing may have consumed without
        // detection, reading them off the homology deficit.
        let mut final_z = 0;
        let mut final_z2 = 0;
        let mut final_z3 = 0;
        for prime in &primes {
            let (z, z2, z3) = ranks(prime.homology_h1());
            final_z += z;
            final_z2 += z2;
            final_z3 += z3;
        }
        for _ in final_z..init_z {
            primes.push(lens_summand(0, 1)?);
        }
        for _ in final_z2..init_z2 {
            primes.push(lens_summand(2, 1)?);
        }
        for _ in final_z3..init_z3 {
            primes.push(lens_summand(3, 1)?);
        }
        Ok(primes)
    }
}

fn ranks(h1: &AbelianGroup) -> (usize, usize, usize) {
    (h1.rank(), h1.torsion_rank(2), h1.torsion_rank(3))
}

fn lens_summand(p: u64, q: u64) -> Result<Triangulation> {
    let mut tri = Triangulation::new();
    tri.insert_layered_lens_space(p, q)?;
    Ok(tri)
}
