// File:    sample.rs
// Author:  apezoo
// Date:    2026-10-18
//
// Description: Generates many-time pad sample sets: several plaintexts encrypted under one random key, for practising crib dragging.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

use crate::crypto;
use base64::{Engine as _, engine::general_purpose};
use rand::{TryRngCore, rngs::OsRng};
use std::collections::BTreeMap;

/// Splits sample text into named plaintext sets.
///
/// Blocks are separated by a line containing only `%%`. The first line of a
/// block names the set; every following line is one plaintext. Blocks that
/// are empty after trimming are skipped.
#[must_use]
pub fn parse_sample_sets(text: &str) -> BTreeMap<String, Vec<Vec<u8>>> {
    let mut sets = BTreeMap::new();
    for block in text.split("\n%%\n") {
        let mut lines = block.trim().lines();
        let Some(name) = lines.next().filter(|name| !name.is_empty()) else {
            continue;
        };
        let plaintexts = lines.map(|line| line.as_bytes().to_vec()).collect();
        sets.insert(name.to_string(), plaintexts);
    }
    sets
}

/// Encrypts every plaintext with the same key, truncating the key to each
/// plaintext's length.
///
/// # Panics
///
/// Panics if a plaintext is longer than `key`.
#[must_use]
pub fn encrypt_with_key(plaintexts: &[Vec<u8>], key: &[u8]) -> Vec<Vec<u8>> {
    plaintexts
        .iter()
        .map(|plain| crypto::xor(plain, &key[..plain.len()]))
        .collect()
}

/// Generates a random key as long as the longest plaintext and encrypts every
/// plaintext with it.
///
/// # Returns
///
/// The key and the ciphertexts, in plaintext order.
///
/// # Errors
///
/// This function will return an error if the operating system's random number generator fails.
pub fn encrypt_with_random_key(
    plaintexts: &[Vec<u8>],
) -> std::io::Result<(Vec<u8>, Vec<Vec<u8>>)> {
    let mut rng = OsRng;
    let mut key = vec![0u8; plaintexts.iter().map(Vec::len).max().unwrap_or(0)];
    // Use the failable `try_fill_bytes` and map the error to an `io::Error`.
    rng.try_fill_bytes(&mut key).map_err(std::io::Error::other)?;

    let ciphertexts = encrypt_with_key(plaintexts, &key);
    Ok((key, ciphertexts))
}

/// Turns sample text into base64 ciphertext sets, each under its own fresh key.
///
/// # Errors
///
/// This function will return an error if the operating system's random number generator fails.
pub fn generate_samples(text: &str) -> std::io::Result<BTreeMap<String, Vec<String>>> {
    parse_sample_sets(text)
        .into_iter()
        .map(|(name, plaintexts)| {
            let (_, ciphertexts) = encrypt_with_random_key(&plaintexts)?;
            let encoded: Vec<String> = ciphertexts
                .iter()
                .map(|ct| general_purpose::STANDARD.encode(ct))
                .collect();
            Ok((name, encoded))
        })
        .collect()
}
