// File:    crypto.rs
// Author:  apezoo
// Date:    2026-10-18
//
// Description: Byte-level XOR primitives shared by the key reconciler, the match searcher and the match lifecycle.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! This module contains the XOR primitives used throughout the engine.

/// Performs a simple XOR operation between two byte slices.
///
/// # Panics
///
/// Panics if the slices are not of equal length.
#[must_use]
pub fn xor(a: &[u8], b: &[u8]) -> Vec<u8> {
    assert_eq!(
        a.len(),
        b.len(),
        "Input slices must have the same length for XOR operation."
    );
    a.iter().zip(b.iter()).map(|(x, y)| x ^ y).collect()
}

/// Derives the key bytes implied by placing `crib` over `ciphertext` at `start`.
///
/// Only the bytes where the crib overlaps the ciphertext are produced, so the
/// result is shorter than the crib when the span runs past the end of the
/// ciphertext, and empty when `start` lies beyond it.
#[must_use]
pub fn key_segment(ciphertext: &[u8], start: usize, crib: &[u8]) -> Vec<u8> {
    let window = ciphertext.get(start..).unwrap_or_default();
    window.iter().zip(crib).map(|(c, p)| c ^ p).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xor_is_its_own_inverse() {
        let plaintext = b"attack at dawn";
        let pad: Vec<u8> = (0..plaintext.len()).map(|i| (i * 31 % 256) as u8).collect();
        let ciphertext = xor(plaintext, &pad);
        assert_eq!(xor(&ciphertext, &pad), plaintext);
    }

    #[test]
    #[should_panic(expected = "same length")]
    fn xor_rejects_mismatched_lengths() {
        let _ = xor(&[1, 2, 3], &[1, 2]);
    }

    #[test]
    fn key_segment_truncates_at_ciphertext_end() {
        let ciphertext = [1, 6, 7, 4];
        assert_eq!(key_segment(&ciphertext, 0, &[3, 4]), vec![2, 2]);
        assert_eq!(key_segment(&ciphertext, 3, &[6, 6, 6]), vec![2]);
        assert!(key_segment(&ciphertext, 4, &[1]).is_empty());
        assert!(key_segment(&ciphertext, 9, &[1]).is_empty());
    }
}
