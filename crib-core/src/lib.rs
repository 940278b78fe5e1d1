// File:    lib.rs
// Author:  apezoo
// Date:    2026-10-18
//
// Description: The main library crate for crib-core, the engine behind crib dragging against many-time pad ciphertexts.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! # Crib Core Library
//!
//! When several messages are encrypted with the same one-time pad, XOR-ing a
//! guessed plaintext fragment (a crib) into one ciphertext reveals key bytes
//! that can be checked against all the others. This library searches for such
//! alignments, scores how plausible they are, and reconstructs the key from
//! the ones the user confirms.

/// Ciphertext sets and parsing them from hex/base64 text.
pub mod ciphertext;
/// Byte classification tables used to score trial decodes.
pub mod classifier;
/// XOR primitives.
pub mod crypto;
/// Relative repositioning of matches by pointer drags.
pub mod drag;
/// Error types.
pub mod error;
/// Reconciling match key segments into one key.
pub mod key;
/// The match record and its identifiers.
pub mod matching;
/// Generating many-time pad sample sets.
pub mod sample;
/// The crib search.
pub mod search;
/// Saving and restoring sessions.
pub mod session;
/// The working set and the match lifecycle.
pub mod workspace;
