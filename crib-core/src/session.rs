// File:    session.rs
// Author:  apezoo
// Date:    2026-10-18
//
// Description: Saves and restores a crib dragging session as JSON, rebuilding match keys from the ciphertexts on load.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! Persistence of a crib dragging session.

use crate::classifier::ByteClassifier;
use crate::error::CribError;
use crate::matching::MatchStatus;
use crate::workspace::Workspace;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A confirmed match as persisted. Its key is rebuilt on load.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SavedMatch {
    /// The match's frozen crib.
    #[serde(with = "base64_bytes")]
    pub crib_bytes: Vec<u8>,
    /// The ciphertext the crib was aligned against.
    pub ciphertext_index: usize,
    /// The crib's offset.
    pub start: usize,
}

/// A possible match for the saved crib, kept so its listing survives a reload.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedCandidate {
    /// The ciphertext the crib was aligned against.
    pub ciphertext_index: usize,
    /// The crib's offset.
    pub start: usize,
    /// Position in the search listing.
    pub rank: usize,
    /// Search score.
    pub score: f64,
}

/// Everything needed to rebuild a [`Workspace`] exactly.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// The ciphertexts as entered (hex or base64, one per line).
    pub ciphertexts_raw_text: String,
    /// The current crib.
    #[serde(with = "base64_bytes")]
    pub crib_bytes: Vec<u8>,
    /// Pattern for the `valid` classifier table.
    pub valid_pattern: String,
    /// Pattern for the `acceptable` classifier table.
    pub acceptable_pattern: String,
    /// Confirmed matches in confirmation order.
    pub confirmed_matches: Vec<SavedMatch>,
    /// Possible matches still pending for `crib_bytes`, in listing order.
    /// When absent the crib is searched again on the next refresh.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_matches: Option<Vec<SavedCandidate>>,
}

impl SessionState {
    /// Captures the persistent part of a workspace. Keys are left out, and of
    /// the pending matches only the possible ones are kept.
    #[must_use]
    pub fn capture(workspace: &Workspace) -> Self {
        Self {
            ciphertexts_raw_text: workspace.ciphertexts_text().to_string(),
            crib_bytes: workspace.crib().to_vec(),
            valid_pattern: workspace.classifier().valid_pattern().to_string(),
            acceptable_pattern: workspace.classifier().acceptable_pattern().to_string(),
            confirmed_matches: workspace
                .confirmed()
                .iter()
                .map(|m| SavedMatch {
                    crib_bytes: m.crib.clone(),
                    ciphertext_index: m.ciphertext_index,
                    start: m.start,
                })
                .collect(),
            pending_matches: Some(
                workspace
                    .pending()
                    .iter()
                    .filter(|m| m.status == MatchStatus::Possible)
                    .map(|m| SavedCandidate {
                        ciphertext_index: m.ciphertext_index,
                        start: m.start,
                        rank: m.rank,
                        score: m.score,
                    })
                    .collect(),
            ),
        }
    }

    /// Rebuilds the workspace, recomputing each match's key. Saved possible
    /// matches are restored as the search result for the saved crib.
    ///
    /// # Errors
    ///
    /// Returns an error if the ciphertext text or a pattern is invalid, or a
    /// saved match refers to a ciphertext that does not exist.
    pub fn restore(&self) -> Result<Workspace, CribError> {
        let classifier =
            ByteClassifier::from_patterns(&self.valid_pattern, &self.acceptable_pattern)?;
        let mut workspace = Workspace::from_text(&self.ciphertexts_raw_text, classifier)?;
        workspace.set_crib(self.crib_bytes.clone());
        for saved in &self.confirmed_matches {
            workspace.restore_confirmed(
                saved.crib_bytes.clone(),
                saved.ciphertext_index,
                saved.start,
            )?;
        }
        if let Some(pending) = &self.pending_matches {
            for saved in pending {
                workspace.restore_pending(
                    saved.ciphertext_index,
                    saved.start,
                    saved.rank,
                    saved.score,
                )?;
            }
            workspace.mark_searched();
        }
        Ok(workspace)
    }
}

/// Loads a session from `path`. A missing file yields an empty session.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_state(path: &Path) -> Result<SessionState, CribError> {
    if path.exists() {
        let state_str = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&state_str)?)
    } else {
        Ok(SessionState::default())
    }
}

/// Saves a session to `path` as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if the state cannot be serialized or the file cannot be written.
pub fn save_state(path: &Path, state: &SessionState) -> Result<(), CribError> {
    let state_str = serde_json::to_string_pretty(state)?;
    fs::write(path, state_str)?;
    Ok(())
}

mod base64_bytes {
    use base64::{Engine as _, engine::general_purpose};
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(
        bytes: &[u8],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&general_purpose::STANDARD.encode(bytes))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        general_purpose::STANDARD
            .decode(encoded)
            .map_err(serde::de::Error::custom)
    }
}
