// File:    error.rs
// Author:  apezoo
// Date:    2026-10-18
//
// Description: Error types for the crib dragging engine.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! Error types for the crib dragging engine.

use crate::matching::MatchId;
use thiserror::Error;

/// Which of the two classifier tables a pattern belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// The table of bytes that look like ordinary plaintext.
    Valid,
    /// The table of bytes that are rare but tolerated.
    Acceptable,
}

impl std::fmt::Display for PatternKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Valid => f.write_str("valid"),
            Self::Acceptable => f.write_str("acceptable"),
        }
    }
}

/// The error type for all fallible engine operations.
#[derive(Error, Debug)]
pub enum CribError {
    /// Reading or writing a session or sample file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A session or sample payload could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A piece of the ciphertext input is neither hex nor base64, or failed to decode.
    #[error("ciphertext {line}: {reason}")]
    InvalidCiphertext {
        /// 1-based position of the offending piece in the input.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// A classifier pattern failed to compile. The previous tables stay in effect.
    #[error("invalid {which} pattern: {source}")]
    InvalidPattern {
        /// The table the pattern was meant for.
        which: PatternKind,
        /// The underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// The engine was asked to work without any ciphertexts.
    #[error("no ciphertexts loaded")]
    NoCiphertexts,

    /// `confirm` was called on a match that is already confirmed.
    #[error("match {0} is already confirmed")]
    AlreadyConfirmed(MatchId),

    /// No match with this handle exists in the workspace.
    #[error("no match with id {0}")]
    UnknownMatch(MatchId),

    /// A persisted match refers to a ciphertext that does not exist.
    #[error("ciphertext index {index} out of range ({count} ciphertexts)")]
    CiphertextIndexOutOfRange {
        /// The index that was requested.
        index: usize,
        /// The number of ciphertexts available.
        count: usize,
    },

    /// A drag update arrived for an interaction that never started.
    #[error("no drag in progress for this interaction")]
    UnknownInteraction,
}
