//! Permutations of {0,1,2,3} and the fixed vertex/edge/face numbering of a
//! tetrahedron.
//!
//! Gluings between tetrahedron faces are described by permutations of the
//! four vertex labels.  A permutation is packed into a single byte: bits
//! 2k and 2k+1 hold the image of k.  Permutations are tiny value types and
//! are passed around by copy.
//!
//! This module also publishes the process-wide numbering tables: face k of a
//! tetrahedron is opposite vertex k, and the six edges are numbered so that
//! [`EDGE_START`]`[e] < `[`EDGE_END`]`[e]` and opposite edge numbers sum
//! to 5.

use crate::error::{Result, TriError};

/// A permutation of {0,1,2,3}, stored as a packed byte.
///
/// The identity has code `0b1110_0100`: each 2-bit field holds its own
/// index.  Exactly 24 byte values are valid codes.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Perm4 {
    code: u8,
}

/// Internal code of the identity permutation.
const IDENTITY_CODE: u8 = 0b1110_0100;

impl Perm4 {
    /// The identity permutation.
    pub const IDENTITY: Perm4 = Perm4 {
        code: IDENTITY_CODE,
    };

    /// Creates the transposition of `a` and `b` (the identity if `a == b`).
    ///
    /// Fails with [`TriError::InvalidLabel`] unless both labels lie in 0..4.
    pub fn transposition(a: usize, b: usize) -> Result<Perm4> {
        check_label("vertex", a, 4)?;
        check_label("vertex", b, 4)?;
        let mut images = [0u8, 1, 2, 3];
        images.swap(a, b);
        Ok(Perm4::pack(images))
    }

    /// Creates the permutation mapping 0,1,2,3 to `a`,`b`,`c`,`d`.
    ///
    /// Fails with [`TriError::NotAPermutation`] unless {`a`,`b`,`c`,`d`} =
    /// {0,1,2,3}.
    pub fn from_images(a: u8, b: u8, c: u8, d: u8) -> Result<Perm4> {
        let mut seen = [false; 4];
        for x in [a, b, c, d] {
            if x > 3 || seen[x as usize] {
                return Err(TriError::NotAPermutation(a, b, c, d));
            }
            seen[x as usize] = true;
        }
        Ok(Perm4::pack([a, b, c, d]))
    }

    /// Reconstructs a permutation from its packed byte code.
    ///
    /// Fails with [`TriError::InvalidPermCode`] if the byte does not decode
    /// to a permutation of {0,1,2,3}.
    pub fn from_code(code: u8) -> Result<Perm4> {
        let p = Perm4 { code };
        let mut seen = [false; 4];
        for x in 0..4 {
            seen[p.apply(x)] = true;
        }
        if seen == [true; 4] {
            Ok(p)
        } else {
            Err(TriError::InvalidPermCode(code))
        }
    }

    /// Returns the packed byte code of this permutation.
    ///
    /// The code is sufficient to reconstruct the permutation via
    /// [`Perm4::from_code`].
    pub fn code(self) -> u8 {
        self.code
    }

    /// The image of `x` under this permutation.  `x` must lie in 0..4.
    #[inline]
    pub fn apply(self, x: usize) -> usize {
        debug_assert!(x < 4);
        ((self.code >> (2 * x)) & 3) as usize
    }

    /// The preimage of `y` under this permutation.  `y` must lie in 0..4.
    #[inline]
    pub fn preimage(self, y: usize) -> usize {
        self.inverse().apply(y)
    }

    /// The composition `self ∘ other`: `(p.compose(q)).apply(x) ==
    /// p.apply(q.apply(x))`.
    pub fn compose(self, other: Perm4) -> Perm4 {
        Perm4::pack([
            self.apply(other.apply(0)) as u8,
            self.apply(other.apply(1)) as u8,
            self.apply(other.apply(2)) as u8,
            self.apply(other.apply(3)) as u8,
        ])
    }

    /// The unique permutation `q` with `self ∘ q = identity`.
    pub fn inverse(self) -> Perm4 {
        // The image of apply(k) under the inverse is k; assemble the code
        // directly (the k = 0 term contributes nothing).
        Perm4 {
            code: (1 << (2 * self.apply(1)))
                + (2 << (2 * self.apply(2)))
                + (3 << (2 * self.apply(3))),
        }
    }

    /// +1 for even permutations, -1 for odd ones.
    pub fn sign(self) -> i8 {
        let mut inversions = 0;
        for i in 0..4 {
            for j in (i + 1)..4 {
                if self.apply(i) > self.apply(j) {
                    inversions += 1;
                }
            }
        }
        if inversions % 2 == 0 {
            1
        } else {
            -1
        }
    }

    /// Whether this is the identity permutation.
    pub fn is_identity(self) -> bool {
        self.code == IDENTITY_CODE
    }

    /// Position of this permutation in [`ALL_PERMS_S4`].
    pub fn s4_index(self) -> usize {
        ALL_PERMS_S4
            .iter()
            .position(|p| p.code == self.code)
            .expect("every valid Perm4 appears in ALL_PERMS_S4")
    }

    /// Packs four images known to form a permutation.
    const fn pack(images: [u8; 4]) -> Perm4 {
        Perm4 {
            code: images[0] | (images[1] << 2) | (images[2] << 4) | (images[3] << 6),
        }
    }
}

impl Default for Perm4 {
    fn default() -> Self {
        Perm4::IDENTITY
    }
}

impl std::fmt::Display for Perm4 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}{}{}",
            self.apply(0),
            self.apply(1),
            self.apply(2),
            self.apply(3)
        )
    }
}

impl std::fmt::Debug for Perm4 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Perm4({self})")
    }
}

fn check_label(kind: &'static str, label: usize, bound: usize) -> Result<()> {
    if label < bound {
        Ok(())
    } else {
        Err(TriError::InvalidLabel { kind, label })
    }
}

/// Shorthand used throughout the crate for a permutation given by its four
/// images.  Panics on bad input, so it is reserved for compile-time-known
/// tables and tests; fallible construction goes through
/// [`Perm4::from_images`].
pub(crate) const fn perm(a: u8, b: u8, c: u8, d: u8) -> Perm4 {
    // Table entries are written out by hand; a wrong entry would corrupt
    // every downstream computation, so verify cheaply even in release.
    assert!(1 << a | 1 << b | 1 << c | 1 << d == 0b1111);
    Perm4::pack([a, b, c, d])
}

/// All 24 permutations of four elements.
///
/// Permutations at even indices are even, those at odd indices are odd.
/// The ordering is not lexicographical.
pub const ALL_PERMS_S4: [Perm4; 24] = [
    perm(0, 1, 2, 3),
    perm(0, 1, 3, 2),
    perm(0, 2, 3, 1),
    perm(0, 2, 1, 3),
    perm(0, 3, 1, 2),
    perm(0, 3, 2, 1),
    perm(1, 0, 3, 2),
    perm(1, 0, 2, 3),
    perm(1, 2, 0, 3),
    perm(1, 2, 3, 0),
    perm(1, 3, 2, 0),
    perm(1, 3, 0, 2),
    perm(2, 0, 1, 3),
    perm(2, 0, 3, 1),
    perm(2, 1, 3, 0),
    perm(2, 1, 0, 3),
    perm(2, 3, 0, 1),
    perm(2, 3, 1, 0),
    perm(3, 0, 2, 1),
    perm(3, 0, 1, 2),
    perm(3, 1, 0, 2),
    perm(3, 1, 2, 0),
    perm(3, 2, 1, 0),
    perm(3, 2, 0, 1),
];

/// Inverse index table for [`ALL_PERMS_S4`]: the inverse of
/// `ALL_PERMS_S4[i]` is `ALL_PERMS_S4[ALL_PERMS_S4_INV[i]]`.
pub const ALL_PERMS_S4_INV: [usize; 24] = [
    0, 1, 4, 3, 2, 5, 6, 7, 12, 19, 18, 13, 8, 11, 20, 15, 16, 23, 10, 9, 14, 21, 22, 17,
];

/// The six permutations fixing 3, i.e. the symmetries of a single face.
///
/// Permutations at even indices are even.
pub const ALL_PERMS_S3: [Perm4; 6] = [
    perm(0, 1, 2, 3),
    perm(0, 2, 1, 3),
    perm(1, 2, 0, 3),
    perm(1, 0, 2, 3),
    perm(2, 0, 1, 3),
    perm(2, 1, 0, 3),
];

/// Inverse index table for [`ALL_PERMS_S3`].
pub const ALL_PERMS_S3_INV: [usize; 6] = [0, 1, 4, 3, 2, 5];

/// The two permutations fixing both 2 and 3.
pub const ALL_PERMS_S2: [Perm4; 2] = [perm(0, 1, 2, 3), perm(1, 0, 2, 3)];

/// Inverse index table for [`ALL_PERMS_S2`].
pub const ALL_PERMS_S2_INV: [usize; 2] = [0, 1];

/// `EDGE_NUMBER[i][j]` is the edge joining vertices `i` and `j` of a
/// tetrahedron; the diagonal is -1.  Opposite edge numbers sum to 5.
pub const EDGE_NUMBER: [[i8; 4]; 4] = [
    [-1, 0, 1, 2],
    [0, -1, 3, 4],
    [1, 3, -1, 5],
    [2, 4, 5, -1],
];

/// The lower-numbered endpoint of each edge.
pub const EDGE_START: [usize; 6] = [0, 0, 0, 1, 1, 2];

/// The higher-numbered endpoint of each edge.
pub const EDGE_END: [usize; 6] = [1, 2, 3, 2, 3, 3];

/// The edge of a tetrahedron joining vertices `u` and `v`.
///
/// `u` and `v` must be distinct labels in 0..4.
#[inline]
pub fn edge_number(u: usize, v: usize) -> usize {
    debug_assert!(u < 4 && v < 4 && u != v);
    EDGE_NUMBER[u][v] as usize
}

/// Canonical orderings of the vertices of each face: `FACE_ORDERING[f]`
/// maps (0,1,2) to the vertices of face `f` in increasing order, and maps
/// 3 to `f` itself.
pub const FACE_ORDERING: [Perm4; 4] = [
    perm(1, 2, 3, 0),
    perm(0, 2, 3, 1),
    perm(0, 1, 3, 2),
    perm(0, 1, 2, 3),
];

/// Canonical orderings of the vertices of each edge: `EDGE_ORDERING[e]`
/// maps (0,1) to the ends of edge `e` in increasing order.  The images of
/// 2 and 3 are chosen to make every entry an even permutation.
pub const EDGE_ORDERING: [Perm4; 6] = [
    perm(0, 1, 2, 3),
    perm(0, 2, 3, 1),
    perm(0, 3, 1, 2),
    perm(1, 2, 0, 3),
    perm(1, 3, 2, 0),
    perm(2, 3, 0, 1),
];

/// The canonical vertex ordering of the given face; see [`FACE_ORDERING`].
pub fn face_ordering(face: usize) -> Perm4 {
    FACE_ORDERING[face]
}

/// The canonical vertex ordering of the given edge; see [`EDGE_ORDERING`].
pub fn edge_ordering(edge: usize) -> Perm4 {
    EDGE_ORDERING[edge]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let id = Perm4::IDENTITY;
        for x in 0..4 {
            assert_eq!(id.apply(x), x);
        }
        assert!(id.is_identity());
        assert_eq!(id.sign(), 1);
    }

    #[test]
    fn test_transposition() {
        let t = Perm4::transposition(1, 3).unwrap();
        assert_eq!(t.apply(1), 3);
        assert_eq!(t.apply(3), 1);
        assert_eq!(t.apply(0), 0);
        assert_eq!(t.sign(), -1);
        assert!(Perm4::transposition(2, 2).unwrap().is_identity());
        assert!(Perm4::transposition(0, 4).is_err());
    }

    #[test]
    fn test_from_images_rejects_non_permutations() {
        assert!(Perm4::from_images(0, 1, 2, 2).is_err());
        assert!(Perm4::from_images(0, 1, 2, 4).is_err());
        assert_eq!(
            Perm4::from_images(1, 2, 3, 0).unwrap().to_string(),
            "1230"
        );
    }

    #[test]
    fn test_code_round_trip() {
        for p in ALL_PERMS_S4 {
            assert_eq!(Perm4::from_code(p.code()).unwrap(), p);
        }
        // 0 decodes to the constant map onto 0.
        assert!(Perm4::from_code(0).is_err());
        assert!(Perm4::from_code(0xff).is_err());
    }

    #[test]
    fn test_compose_inverse() {
        for p in ALL_PERMS_S4 {
            assert!(p.compose(p.inverse()).is_identity());
            assert!(p.inverse().compose(p).is_identity());
            for q in ALL_PERMS_S4 {
                let pq = p.compose(q);
                for x in 0..4 {
                    assert_eq!(pq.apply(x), p.apply(q.apply(x)));
                }
                assert_eq!(pq.sign(), p.sign() * q.sign());
            }
        }
    }

    #[test]
    fn test_s4_table_parity_and_inverses() {
        for (i, p) in ALL_PERMS_S4.iter().enumerate() {
            assert_eq!(p.sign(), if i % 2 == 0 { 1 } else { -1 });
            assert_eq!(p.inverse(), ALL_PERMS_S4[ALL_PERMS_S4_INV[i]]);
            assert_eq!(p.s4_index(), i);
        }
    }

    #[test]
    fn test_s3_s2_tables() {
        for (i, p) in ALL_PERMS_S3.iter().enumerate() {
            assert_eq!(p.apply(3), 3);
            assert_eq!(p.sign(), if i % 2 == 0 { 1 } else { -1 });
            assert_eq!(p.inverse(), ALL_PERMS_S3[ALL_PERMS_S3_INV[i]]);
        }
        for (i, p) in ALL_PERMS_S2.iter().enumerate() {
            assert_eq!(p.apply(2), 2);
            assert_eq!(p.apply(3), 3);
            assert_eq!(p.inverse(), ALL_PERMS_S2[ALL_PERMS_S2_INV[i]]);
        }
    }

    #[test]
    fn test_edge_tables() {
        for e in 0..6 {
            assert!(EDGE_START[e] < EDGE_END[e]);
            assert_eq!(edge_number(EDGE_START[e], EDGE_END[e]), e);
            assert_eq!(edge_number(EDGE_END[e], EDGE_START[e]), e);
            // Opposite edges sum to 5.
            let opp = 5 - e;
            let (s, t) = (EDGE_START[e], EDGE_END[e]);
            let (os, ot) = (EDGE_START[opp], EDGE_END[opp]);
            assert_eq!(
                [s, t, os, ot].iter().collect::<std::collections::HashSet<_>>().len(),
                4
            );
        }
    }

    #[test]
    fn test_orderings() {
        for f in 0..4 {
            let p = face_ordering(f);
            assert_eq!(p.apply(3), f);
            assert!(p.apply(0) < p.apply(1) && p.apply(1) < p.apply(2));
        }
        for e in 0..6 {
            let p = edge_ordering(e);
            assert_eq!(p.apply(0), EDGE_START[e]);
            assert_eq!(p.apply(1), EDGE_END[e]);
            assert_eq!(p.sign(), 1);
        }
    }

    #[test]
    fn test_preimage() {
        for p in ALL_PERMS_S4 {
            for y in 0..4 {
                assert_eq!(p.apply(p.preimage(y)), y);
            }
        }
    }
}
