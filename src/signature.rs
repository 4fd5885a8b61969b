//! A compact printable encoding of the complete gluing table.
//!
//! The format is a plain serialisation, not a canonical form: two
//! triangulations share a signature exactly when their gluing tables match
//! slot for slot.  Layout, using a 64-character alphabet:
//!
//! * one character giving the digit width `d`, then `d` little-endian
//!   base-64 digits of the tetrahedron count `n`;
//! * for every tetrahedron and every face in order, `d` digits holding the
//!   adjacent tetrahedron index (the value `n` marks a boundary face),
//!   followed for glued faces by one character holding the index of the
//!   gluing permutation in [`ALL_PERMS_S4`].
//!
//! Decoding validates every index, permutation and the two-sided
//! consistency of the table, so any corrupted string is rejected rather
//! than producing a half-glued triangulation.

use crate::error::{Result, TriError};
use crate::perm::ALL_PERMS_S4;
use crate::triangulation::Triangulation;

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+-";

fn digit_value(c: u8) -> Option<usize> {
    ALPHABET.iter().position(|&a| a == c)
}

fn push_int(out: &mut String, mut value: usize, width: usize) {
    for _ in 0..width {
        out.push(ALPHABET[value % 64] as char);
        value /= 64;
    }
    debug_assert_eq!(value, 0);
}

/// Little-endian base-64 digit count needed to carry `value`.
fn width_for(value: usize) -> usize {
    let mut width = 1;
    let mut cap = 64;
    while cap <= value {
        width += 1;
        cap *= 64;
    }
    width
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take_int(&mut self, width: usize) -> Result<usize> {
        let mut value = 0usize;
        let mut scale = 1usize;
        for _ in 0..width {
            let Some(&c) = self.bytes.get(self.pos) else {
                return Err(TriError::BadSignature("unexpected end of string".into()));
            };
            let Some(d) = digit_value(c) else {
                return Err(TriError::BadSignature(format!(
                    "invalid character {:?}",
                    c as char
                )));
            };
            value += d * scale;
            scale *= 64;
            self.pos += 1;
        }
        Ok(value)
    }

    fn finished(&self) -> bool {
        self.pos == self.bytes.len()
    }
}

impl Triangulation {
    /// Serialises the complete gluing table as printable ASCII.
    ///
    /// [`Triangulation::from_signature`] round-trips with this exactly.
    pub fn signature(&self) -> String {
        let n = self.num_tetrahedra();
        let width = width_for(n);
        let mut out = String::new();
        out.push(ALPHABET[width] as char);
        push_int(&mut out, n, width);
        for tet in self.tetrahedra() {
            for face in 0..4 {
                match (tet.adjacent_tetrahedron(face), tet.adjacent_gluing(face)) {
                    (Some(adj), Some(gluing)) => {
                        push_int(&mut out, adj, width);
                        push_int(&mut out, gluing.s4_index(), 1);
                    }
                    _ => push_int(&mut out, n, width),
                }
            }
        }
        out
    }

    /// Rebuilds a triangulation from a string produced by
    /// [`Triangulation::signature`].
    pub fn from_signature(signature: &str) -> Result<Triangulation> {
        let mut reader = Reader {
            bytes: signature.as_bytes(),
            pos: 0,
        };
        let width = reader.take_int(1)?;
        if width == 0 {
            return Err(TriError::BadSignature("zero digit width".into()));
        }
        let n = reader.take_int(width)?;

        let mut adjacencies = vec![[-1i64; 4]; n];
        let mut gluings = vec![[0u8; 4]; n];
        for i in 0..n {
            for f in 0..4 {
                let adj = reader.take_int(width)?;
                if adj > n {
                    return Err(TriError::BadSignature(format!(
                        "adjacent index {adj} out of range"
                    )));
                }
                if adj == n {
                    continue;
                }
                let perm_index = reader.take_int(1)?;
                if perm_index >= 24 {
                    return Err(TriError::BadSignature(format!(
                        "permutation index {perm_index} out of range"
                    )));
                }
                adjacencies[i][f] = adj as i64;
                gluings[i][f] = ALL_PERMS_S4[perm_index].code();
            }
        }
        if !reader.finished() {
            return Err(TriError::BadSignature("trailing characters".into()));
        }

        let mut tri = Triangulation::new();
        tri.insert_construction(&adjacencies, &gluings)
            .map_err(|e| TriError::BadSignature(e.to_string()))?;
        Ok(tri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perm::Perm4;


    fn round_trip(tri: &Triangulation) {
        let sig = tri.signature();
        let back = Triangulation::from_signature(&sig).unwrap();
        assert_eq!(back.num_tetrahedra(), tri.num_tetrahedra());
        for (a, b) in tri.tetrahedra().zip(back.tetrahedra()) {
            for f in 0..4 {
                assert_eq!(a.adjacent_tetrahedron(f), b.adjacent_tetrahedron(f));
                assert_eq!(a.adjacent_gluing(f), b.adjacent_gluing(f));
            }
        }
        assert_eq!(back.signature(), sig);
    }

    #[test]
    fn test_round_trip_empty() {
        round_trip(&Triangulation::new());
    }

    #[test]
    fn test_round_trip_isolated_tetrahedron() {
        let mut tri = Triangulation::new();
        tri.new_tetrahedron();
        round_trip(&tri);
    }

    #[test]
    fn test_round_trip_layered_families() {
        let mut lst = Triangulation::new();
        lst.insert_layered_solid_torus(3, 4).unwrap();
        round_trip(&lst);

        let mut lens = Triangulation::new();
        lens.insert_layered_lens_space(8, 3).unwrap();
        round_trip(&lens);
    }

    #[test]
    fn test_round_trip_figure_eight() {
        let mut tri = Triangulation::new();
        let r = tri.new_tetrahedron();
        let s = tri.new_tetrahedron();
        tri.join(r, 0, s, Perm4::from_images(1, 3, 0, 2).unwrap())
            .unwrap();
        tri.join(r, 1, s, Perm4::from_images(2, 0, 3, 1).unwrap())
            .unwrap();
        tri.join(r, 2, s, Perm4::from_images(0, 3, 2, 1).unwrap())
            .unwrap();
        tri.join(r, 3, s, Perm4::from_images(2, 1, 0, 3).unwrap())
            .unwrap();
        round_trip(&tri);
    }

    #[test]
    fn test_rejects_malformed_strings() {
        assert!(Triangulation::from_signature("").is_err());
        assert!(Triangulation::from_signature("!!").is_err());
        assert!(Triangulation::from_signature("BB").is_err()); // truncated
        let mut tri = Triangulation::new();
        tri.insert_layered_solid_torus(1, 2).unwrap();
        let mut sig = tri.signature();
        sig.push('A');
        assert!(Triangulation::from_signature(&sig).is_err());
    }
}
