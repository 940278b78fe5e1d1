// File:    key.rs
// Author:  apezoo
// Date:    2026-10-18
//
// Description: Folds the key segments of a set of matches into the best-known key stream.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! Reconciles match key segments into the best-known key stream.

use crate::matching::{Match, MatchStatus};
use log::trace;

/// Builds the key implied by `matches`, in storage order.
///
/// Matches are applied from last to first, each overwriting what came before,
/// so where spans overlap the earliest match in storage order wins. Placeholder
/// matches and matches starting at or beyond `key_length` are ignored, and
/// segments are clipped to `key_length`. Offsets no match covers stay zero.
#[must_use]
pub fn build_key<'a, I>(matches: I, key_length: usize) -> Vec<u8>
where
    I: IntoIterator<Item = &'a Match>,
    I::IntoIter: DoubleEndedIterator,
{
    let mut key = vec![0u8; key_length];
    for m in matches.into_iter().rev() {
        if m.status == MatchStatus::New || m.start >= key_length {
            continue;
        }
        let end = (m.start + m.key.len()).min(key_length);
        key[m.start..end].copy_from_slice(&m.key[..end - m.start]);
    }
    trace!(
        "reconciled key: {} of {key_length} bytes set",
        key.iter().filter(|&&b| b != 0).count()
    );
    key
}
