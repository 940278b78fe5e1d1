// File:    search.rs
// Author:  apezoo
// Date:    2026-10-18
//
// Description: Slides the current crib over every offset of every ciphertext and scores the key each alignment implies.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! Crib dragging: sliding the current crib over every offset of every ciphertext.

use crate::ciphertext::CiphertextSet;
use crate::classifier::{ByteClass, ByteClassifier};
use crate::crypto;
use crate::matching::{Match, MatchIdAllocator, MatchStatus};
use log::debug;
use std::time::Instant;

/// Score deducted for each decoded byte that is only `acceptable`.
pub const ACCEPTABLE_PENALTY: f64 = 5.0;
/// Score added for each corroborating decode made only of `valid` bytes.
pub const CLEAN_DECODE_BONUS: f64 = 0.3;

/// Finds the possible matches for `crib`.
///
/// For every offset, the ciphertexts are tried as anchor in ascending index
/// order; the first anchor whose candidate key decodes the other ciphertexts
/// plausibly yields a [`MatchStatus::Possible`] match and ends the scan at
/// that offset. Possible matches are ranked 1, 2, ... in the order found.
/// Candidates that add nothing to `confirmed_key`, or contradict
/// one of its non-zero bytes, are skipped. An offset needs at least two other
/// ciphertexts covering the span before anything is reported there.
///
/// When the crib is non-empty and nothing qualifies, a single
/// [`MatchStatus::New`] placeholder starting at the key length is returned so
/// the crib can be placed by hand. An empty crib yields nothing.
///
/// # Panics
///
/// Panics if `confirmed_key` is not exactly `ciphertexts.key_length()` long.
pub fn search(
    ciphertexts: &CiphertextSet,
    crib: &[u8],
    classifier: &ByteClassifier,
    confirmed_key: &[u8],
    ids: &mut MatchIdAllocator,
) -> Vec<Match> {
    let key_length = ciphertexts.key_length();
    assert_eq!(
        confirmed_key.len(),
        key_length,
        "Confirmed key must span the whole key length."
    );

    let mut found = Vec::new();
    if crib.is_empty() {
        return found;
    }

    let started = Instant::now();
    let last_start = key_length.checked_sub(crib.len());
    for start in last_start.into_iter().flat_map(|last| 0..=last) {
        let known = &confirmed_key[start..start + crib.len()];

        for anchor in ciphertexts {
            let Some(window) = anchor.span(start, crib.len()) else {
                continue;
            };
            let candidate = crypto::xor(window, crib);

            if candidate == known {
                continue;
            }
            if known.iter().zip(&candidate).any(|(&k, &c)| k != 0 && k != c) {
                continue;
            }

            let Some(score) =
                score_candidate(ciphertexts, classifier, anchor.index, start, &candidate, known)
            else {
                continue;
            };

            if score > 0.0 {
                found.push(Match {
                    id: ids.allocate(),
                    crib: crib.to_vec(),
                    key: candidate,
                    ciphertext_index: anchor.index,
                    start,
                    status: MatchStatus::Possible,
                    score,
                    rank: found.len() + 1,
                });
                break;
            }
        }
    }

    debug!(
        "searched {} offsets x {} ciphertexts for a {}-byte crib in {:?}: {} possible",
        last_start.map_or(0, |last| last + 1),
        ciphertexts.len(),
        crib.len(),
        started.elapsed(),
        found.len()
    );

    if found.is_empty() {
        found.push(Match {
            id: ids.allocate(),
            crib: crib.to_vec(),
            key: vec![0; crib.len()],
            ciphertext_index: 0,
            start: key_length,
            status: MatchStatus::New,
            score: 0.0,
            rank: 0,
        });
    }
    found
}

/// Scores `candidate` as the key at `start` by decoding every other ciphertext
/// that covers the span.
///
/// Returns `None` when fewer than two other ciphertexts cover the span. A
/// single fatal byte in any decode drops the score to zero. Positions where
/// `known` already agrees with the candidate are not classified.
#[allow(clippy::cast_precision_loss)]
fn score_candidate(
    ciphertexts: &CiphertextSet,
    classifier: &ByteClassifier,
    anchor: usize,
    start: usize,
    candidate: &[u8],
    known: &[u8],
) -> Option<f64> {
    let mut hp = candidate.len() as f64;
    let mut corroborating = 0usize;

    'witnesses: for witness in ciphertexts {
        if witness.index == anchor {
            continue;
        }
        let Some(window) = witness.span(start, candidate.len()) else {
            continue;
        };
        corroborating += 1;

        let mut clean = true;
        for ((&k, &c), &confirmed) in candidate.iter().zip(window).zip(known) {
            if confirmed == k {
                continue;
            }
            match classifier.classify(k ^ c) {
                ByteClass::Valid => {}
                ByteClass::Acceptable => {
                    hp -= ACCEPTABLE_PENALTY;
                    clean = false;
                }
                ByteClass::Fatal => {
                    hp = 0.0;
                    break 'witnesses;
                }
            }
        }
        if clean {
            hp += CLEAN_DECODE_BONUS;
        }
    }

    (corroborating > 1).then_some(hp)
}

/// Remembers which crib the current possible matches were computed for.
#[derive(Debug, Default, Clone)]
pub struct SearchMemo {
    last_crib: Option<Vec<u8>>,
}

impl SearchMemo {
    /// Whether the matches from the last run are still valid for `crib`.
    #[must_use]
    pub fn is_fresh(&self, crib: &[u8]) -> bool {
        self.last_crib.as_deref() == Some(crib)
    }

    /// Records that a search for `crib` has just run.
    pub fn record(&mut self, crib: &[u8]) {
        self.last_crib = Some(crib.to_vec());
    }

    /// Forces the next lookup to run a fresh search.
    pub fn invalidate(&mut self) {
        self.last_crib = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> (CiphertextSet, ByteClassifier) {
        let set = CiphertextSet::new(vec![
            vec![1, 6, 7, 4],
            vec![5, 10, 11, 3],
            vec![6, 1, 0, 3],
        ]);
        (set, ByteClassifier::from_bytes(1..=9, []))
    }

    #[test]
    fn score_rewards_clean_decodes() {
        let (set, classifier) = scenario();
        let score = score_candidate(&set, &classifier, 0, 0, &[2, 2], &[0, 0]);
        assert!((score.unwrap() - 2.6).abs() < 1e-9);
    }

    #[test]
    fn acceptable_bytes_cost_five_each() {
        let (set, _) = scenario();
        // ct1 decodes to [7, 8], ct2 to [4, 3]; make 8 and 3 merely acceptable.
        let classifier = ByteClassifier::from_bytes([1, 2, 4, 5, 6, 7, 9], [8, 3]);
        let score = score_candidate(&set, &classifier, 0, 0, &[2, 2], &[0, 0]).unwrap();
        assert!((score - (2.0 - 10.0)).abs() < 1e-9);
    }

    #[test]
    fn known_key_bytes_are_not_classified() {
        let (set, _) = scenario();
        let classifier = ByteClassifier::from_bytes([7, 4], []);
        // Position 1 is already established, so 8 and 3 are never looked at.
        let score = score_candidate(&set, &classifier, 0, 0, &[2, 2], &[0, 2]).unwrap();
        assert!((score - 2.6).abs() < 1e-9);
    }

    #[test]
    fn single_witness_is_never_enough() {
        let set = CiphertextSet::new(vec![vec![1, 6], vec![5, 10], vec![6]]);
        let classifier = ByteClassifier::from_bytes(1..=9, []);
        assert_eq!(score_candidate(&set, &classifier, 0, 0, &[2, 2], &[0, 0]), None);
    }

    #[test]
    fn memo_tracks_last_crib() {
        let mut memo = SearchMemo::default();
        assert!(!memo.is_fresh(b""));
        memo.record(b"the");
        assert!(memo.is_fresh(b"the"));
        assert!(!memo.is_fresh(b"then"));
        memo.invalidate();
        assert!(!memo.is_fresh(b"the"));
    }
}
