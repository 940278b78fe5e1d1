// File:    workspace.rs
// Author:  apezoo
// Date:    2026-10-18
//
// Description: The working set of a crib dragging session: ciphertexts, current crib, classifier and the confirmed/pending matches, with the operations that move matches through their lifecycle.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! The crib dragging working set and the match lifecycle operations.

use crate::ciphertext::{self, CiphertextSet};
use crate::classifier::ByteClassifier;
use crate::error::CribError;
use crate::key::build_key;
use crate::matching::{Match, MatchId, MatchIdAllocator, MatchStatus};
use crate::search::{self, SearchMemo};
use log::{debug, warn};

/// Everything a crib dragging session works on.
///
/// Confirmed matches are kept in confirmation order, oldest first; pending
/// matches are the possible matches (or the placeholder) from the last search.
#[derive(Debug)]
pub struct Workspace {
    ciphertexts: CiphertextSet,
    ciphertexts_text: String,
    crib: Vec<u8>,
    classifier: ByteClassifier,
    confirmed: Vec<Match>,
    pending: Vec<Match>,
    memo: SearchMemo,
    ids: MatchIdAllocator,
}

impl Workspace {
    /// Creates a workspace over an already decoded ciphertext set.
    #[must_use]
    pub fn new(ciphertexts: CiphertextSet, classifier: ByteClassifier) -> Self {
        Self {
            ciphertexts,
            ciphertexts_text: String::new(),
            crib: Vec::new(),
            classifier,
            confirmed: Vec::new(),
            pending: Vec::new(),
            memo: SearchMemo::default(),
            ids: MatchIdAllocator::default(),
        }
    }

    /// Creates a workspace from hex/base64 ciphertext text.
    ///
    /// # Errors
    ///
    /// Returns [`CribError::InvalidCiphertext`] if the text does not decode.
    pub fn from_text(text: &str, classifier: ByteClassifier) -> Result<Self, CribError> {
        let mut workspace = Self::new(ciphertext::parse_ciphertexts(text)?, classifier);
        workspace.ciphertexts_text = text.to_string();
        Ok(workspace)
    }

    /// The ciphertext set.
    #[must_use]
    pub const fn ciphertexts(&self) -> &CiphertextSet {
        &self.ciphertexts
    }

    /// The text the ciphertext set was parsed from, if any.
    #[must_use]
    pub fn ciphertexts_text(&self) -> &str {
        &self.ciphertexts_text
    }

    /// Length of the shared key coordinate space.
    #[must_use]
    pub const fn key_length(&self) -> usize {
        self.ciphertexts.key_length()
    }

    /// The current crib.
    #[must_use]
    pub fn crib(&self) -> &[u8] {
        &self.crib
    }

    /// The byte classifier used for scoring.
    #[must_use]
    pub const fn classifier(&self) -> &ByteClassifier {
        &self.classifier
    }

    /// Confirmed matches, oldest confirmation first.
    #[must_use]
    pub fn confirmed(&self) -> &[Match] {
        &self.confirmed
    }

    /// Matches from the last search that have not been confirmed or removed.
    #[must_use]
    pub fn pending(&self) -> &[Match] {
        &self.pending
    }

    /// Looks a match up by handle.
    #[must_use]
    pub fn get(&self, id: MatchId) -> Option<&Match> {
        self.confirmed
            .iter()
            .chain(&self.pending)
            .find(|m| m.id == id)
    }

    /// Replaces the current crib. The next [`refresh`](Self::refresh) searches
    /// again only if the bytes actually changed.
    pub fn set_crib(&mut self, crib: impl Into<Vec<u8>>) {
        self.crib = crib.into();
    }

    /// Replaces the `valid` classifier pattern.
    ///
    /// # Errors
    ///
    /// Returns [`CribError::InvalidPattern`] and keeps the old table if the pattern is invalid.
    pub fn set_valid_pattern(&mut self, pattern: &str) -> Result<(), CribError> {
        self.classifier.set_valid_pattern(pattern)?;
        self.memo.invalidate();
        Ok(())
    }

    /// Replaces the `acceptable` classifier pattern.
    ///
    /// # Errors
    ///
    /// Returns [`CribError::InvalidPattern`] and keeps the old table if the pattern is invalid.
    pub fn set_acceptable_pattern(&mut self, pattern: &str) -> Result<(), CribError> {
        self.classifier.set_acceptable_pattern(pattern)?;
        self.memo.invalidate();
        Ok(())
    }

    /// Replaces the ciphertext set.
    ///
    /// Confirmed matches that refer to a ciphertext that no longer exists are
    /// dropped; the rest get their keys recomputed. Pending matches are
    /// discarded and the next refresh searches again.
    ///
    /// # Errors
    ///
    /// Returns [`CribError::InvalidCiphertext`] if the text does not decode; the
    /// workspace is left untouched in that case.
    pub fn set_ciphertexts(&mut self, text: &str) -> Result<(), CribError> {
        self.ciphertexts = ciphertext::parse_ciphertexts(text)?;
        self.ciphertexts_text = text.to_string();

        let count = self.ciphertexts.len();
        self.confirmed.retain(|m| {
            let keep = m.ciphertext_index < count;
            if !keep {
                warn!(
                    "dropping confirmed match {} on missing ciphertext {}",
                    m.id, m.ciphertext_index
                );
            }
            keep
        });
        for m in &mut self.confirmed {
            m.recalculate_key(&self.ciphertexts);
        }
        self.pending.clear();
        self.memo.invalidate();
        Ok(())
    }

    /// The key established by confirmed matches alone.
    #[must_use]
    pub fn confirmed_key(&self) -> Vec<u8> {
        build_key(&self.confirmed, self.key_length())
    }

    /// The key from confirmed matches, with pending possible matches filling
    /// the offsets nothing confirmed covers.
    #[must_use]
    pub fn key(&self) -> Vec<u8> {
        build_key(self.confirmed.iter().chain(&self.pending), self.key_length())
    }

    /// Each ciphertext XORed with [`key`](Self::key).
    #[must_use]
    pub fn decoded(&self) -> Vec<Vec<u8>> {
        let key = self.key();
        self.ciphertexts
            .iter()
            .map(|ct| ct.bytes.iter().zip(&key).map(|(c, k)| c ^ k).collect())
            .collect()
    }

    /// Brings the pending matches up to date with the current crib.
    ///
    /// The search only runs when the crib differs from the one the pending
    /// matches were computed for.
    ///
    /// # Errors
    ///
    /// Returns [`CribError::NoCiphertexts`] if the workspace has no ciphertexts.
    pub fn refresh(&mut self) -> Result<(), CribError> {
        if self.ciphertexts.is_empty() {
            return Err(CribError::NoCiphertexts);
        }
        if self.memo.is_fresh(&self.crib) {
            return Ok(());
        }

        let confirmed_key = self.confirmed_key();
        self.pending = search::search(
            &self.ciphertexts,
            &self.crib,
            &self.classifier,
            &confirmed_key,
            &mut self.ids,
        );
        self.memo.record(&self.crib);
        Ok(())
    }

    /// Confirms a pending match.
    ///
    /// Every other match whose crib span lies entirely inside the confirmed
    /// one is removed, and the match becomes the most recently confirmed.
    ///
    /// # Errors
    ///
    /// Returns [`CribError::AlreadyConfirmed`] if the match is already
    /// confirmed, or [`CribError::UnknownMatch`] if it does not exist.
    pub fn confirm(&mut self, id: MatchId) -> Result<(), CribError> {
        if self.confirmed.iter().any(|m| m.id == id) {
            return Err(CribError::AlreadyConfirmed(id));
        }
        let pos = self
            .pending
            .iter()
            .position(|m| m.id == id)
            .ok_or(CribError::UnknownMatch(id))?;
        let mut m = self.pending.remove(pos);
        m.status = MatchStatus::Confirmed;

        let absorbed: Vec<MatchId> = self
            .confirmed
            .iter()
            .chain(&self.pending)
            .filter(|other| other.is_within(&m))
            .map(|other| other.id)
            .collect();
        for &other in &absorbed {
            self.remove(other)?;
        }

        debug!(
            "confirmed {} at {} on ciphertext {} ({} absorbed)",
            m.id,
            m.start,
            m.ciphertext_index,
            absorbed.len()
        );
        self.confirmed.push(m);
        Ok(())
    }

    /// Confirms every pending match in order and clears the crib.
    ///
    /// A lone placeholder is confirmed too, parked past the end of the key
    /// until it is moved. Returns how many matches were confirmed; nothing
    /// changes when no match is pending.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`confirm`](Self::confirm).
    pub fn confirm_all(&mut self) -> Result<usize, CribError> {
        let mut count = 0;
        while let Some(id) = self.pending.first().map(|m| m.id) {
            self.confirm(id)?;
            count += 1;
        }
        if count > 0 {
            self.crib.clear();
            self.memo.record(&self.crib);
        }
        Ok(count)
    }

    /// Removes a match, confirmed or pending, and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`CribError::UnknownMatch`] if it does not exist.
    pub fn remove(&mut self, id: MatchId) -> Result<Match, CribError> {
        let removed = if let Some(pos) = self.confirmed.iter().position(|m| m.id == id) {
            self.confirmed.remove(pos)
        } else if let Some(pos) = self.pending.iter().position(|m| m.id == id) {
            self.pending.remove(pos)
        } else {
            return Err(CribError::UnknownMatch(id));
        };
        debug!("removed {} ({:?})", removed.id, removed.status);
        Ok(removed)
    }

    /// Drops every match, confirmed and pending.
    pub fn clear_matches(&mut self) {
        self.confirmed.clear();
        self.pending.clear();
        self.memo.invalidate();
    }

    /// Moves a match to a new offset and/or ciphertext and recomputes its key
    /// from its own crib.
    ///
    /// `start` is clamped to `[0, key_length]` and `ciphertext_index` to the
    /// existing ciphertexts. Returns `false` when the clamped position equals
    /// the current one.
    ///
    /// # Errors
    ///
    /// Returns [`CribError::NoCiphertexts`] if there are no ciphertexts, or
    /// [`CribError::UnknownMatch`] if the match does not exist.
    pub fn reposition(
        &mut self,
        id: MatchId,
        start: i64,
        ciphertext_index: i64,
    ) -> Result<bool, CribError> {
        let last_index = self
            .ciphertexts
            .len()
            .checked_sub(1)
            .ok_or(CribError::NoCiphertexts)?;
        let start = clamp(start, self.key_length());
        let ciphertext_index = clamp(ciphertext_index, last_index);

        let m = self
            .confirmed
            .iter_mut()
            .chain(&mut self.pending)
            .find(|m| m.id == id)
            .ok_or(CribError::UnknownMatch(id))?;
        if m.start == start && m.ciphertext_index == ciphertext_index {
            return Ok(false);
        }

        m.start = start;
        m.ciphertext_index = ciphertext_index;
        m.recalculate_key(&self.ciphertexts);
        debug!("moved {} to {start} on ciphertext {ciphertext_index}", m.id);
        Ok(true)
    }

    /// Returns the placeholder for the current crib, creating one if the last
    /// search produced possible matches instead. `None` when the crib is empty.
    pub fn placeholder(&mut self) -> Option<MatchId> {
        if self.crib.is_empty() {
            return None;
        }
        if let Some(m) = self.pending.iter().find(|m| m.status == MatchStatus::New) {
            return Some(m.id);
        }
        let id = self.ids.allocate();
        self.pending.push(Match {
            id,
            crib: self.crib.clone(),
            key: vec![0; self.crib.len()],
            ciphertext_index: 0,
            start: self.key_length(),
            status: MatchStatus::New,
            score: 0.0,
            rank: 0,
        });
        Some(id)
    }

    /// Adds a possible match for the current crib restored from saved state,
    /// recomputing its key. See [`mark_searched`](Self::mark_searched).
    ///
    /// # Errors
    ///
    /// Returns [`CribError::CiphertextIndexOutOfRange`] if the ciphertext does not exist.
    pub fn restore_pending(
        &mut self,
        ciphertext_index: usize,
        start: usize,
        rank: usize,
        score: f64,
    ) -> Result<MatchId, CribError> {
        if ciphertext_index >= self.ciphertexts.len() {
            return Err(CribError::CiphertextIndexOutOfRange {
                index: ciphertext_index,
                count: self.ciphertexts.len(),
            });
        }
        let mut m = Match {
            id: self.ids.allocate(),
            crib: self.crib.clone(),
            key: Vec::new(),
            ciphertext_index,
            start,
            status: MatchStatus::Possible,
            score,
            rank,
        };
        m.recalculate_key(&self.ciphertexts);
        let id = m.id;
        self.pending.push(m);
        Ok(id)
    }

    /// Treats the pending matches as the search result for the current crib,
    /// so [`refresh`](Self::refresh) keeps them until the crib changes.
    pub fn mark_searched(&mut self) {
        self.memo.record(&self.crib);
    }

    /// Adds a confirmed match restored from saved state, recomputing its key.
    ///
    /// # Errors
    ///
    /// Returns [`CribError::CiphertextIndexOutOfRange`] if the ciphertext does not exist.
    pub fn restore_confirmed(
        &mut self,
        crib: Vec<u8>,
        ciphertext_index: usize,
        start: usize,
    ) -> Result<MatchId, CribError> {
        if ciphertext_index >= self.ciphertexts.len() {
            return Err(CribError::CiphertextIndexOutOfRange {
                index: ciphertext_index,
                count: self.ciphertexts.len(),
            });
        }
        let mut m = Match {
            id: self.ids.allocate(),
            crib,
            key: Vec::new(),
            ciphertext_index,
            start,
            status: MatchStatus::Confirmed,
            score: 0.0,
            rank: 0,
        };
        m.recalculate_key(&self.ciphertexts);
        let id = m.id;
        self.confirmed.push(m);
        Ok(id)
    }
}

fn clamp(value: i64, max: usize) -> usize {
    usize::try_from(value.max(0)).map_or(max, |v| v.min(max))
}
