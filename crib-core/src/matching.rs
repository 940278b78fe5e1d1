// File:    matching.rs
// Author:  apezoo
// Date:    2026-10-18
//
// Description: The match record, its handles and lifecycle status, shared by the searcher, the key reconciler and the workspace.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! The match record shared by the searcher, the reconciler and the lifecycle.

use crate::ciphertext::CiphertextSet;
use crate::crypto;
use std::fmt;

/// Stable handle for a match inside a [`Workspace`](crate::workspace::Workspace).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatchId(pub u64);

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out fresh [`MatchId`]s.
#[derive(Debug, Default)]
pub struct MatchIdAllocator {
    next: u64,
}

impl MatchIdAllocator {
    /// Returns an id that has not been handed out before.
    pub const fn allocate(&mut self) -> MatchId {
        let id = MatchId(self.next);
        self.next += 1;
        id
    }
}

/// Where a match is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    /// Found by the searcher; awaiting a user decision.
    Possible,
    /// Accepted by the user; its key bytes are authoritative.
    Confirmed,
    /// Placeholder emitted when a search finds nothing, to be placed by hand.
    New,
}

/// One alignment of a crib against one ciphertext.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    /// Handle assigned by the owning workspace.
    pub id: MatchId,
    /// The crib bytes, frozen when the match was created.
    pub crib: Vec<u8>,
    /// `ciphertext[start..start + crib.len()] ^ crib`, truncated at the ciphertext's end.
    pub key: Vec<u8>,
    /// Index of the ciphertext the crib is aligned against.
    pub ciphertext_index: usize,
    /// Offset of the crib in key coordinates.
    pub start: usize,
    /// Lifecycle state.
    pub status: MatchStatus,
    /// Plausibility score from the search; zero for placeholders and restored matches.
    pub score: f64,
    /// 1-based position in the listing of the search that found it. Stays fixed
    /// until the crib changes; zero for matches that were not listed.
    pub rank: usize,
}

impl Match {
    /// One past the last offset covered by the crib.
    #[must_use]
    pub fn end(&self) -> usize {
        self.start + self.crib.len()
    }

    /// Whether this match's crib span lies entirely inside `other`'s.
    #[must_use]
    pub fn is_within(&self, other: &Self) -> bool {
        self.start >= other.start && self.end() <= other.end()
    }

    /// Recomputes `key` from the referenced ciphertext and the frozen crib.
    ///
    /// A ciphertext index that no longer exists yields an empty key.
    pub fn recalculate_key(&mut self, ciphertexts: &CiphertextSet) {
        self.key = ciphertexts
            .get(self.ciphertext_index)
            .map(|ct| crypto::key_segment(&ct.bytes, self.start, &self.crib))
            .unwrap_or_default();
    }
}
