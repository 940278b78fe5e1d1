// File:    ciphertext.rs
// Author:  apezoo
// Date:    2026-10-18
//
// Description: The ciphertext set and its parsing from newline or comma separated hex/base64 text.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! The ciphertext set the engine works on, and parsing it from hex/base64 text.

use crate::error::CribError;
use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

/// One ciphertext and its position in the set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ciphertext {
    /// Position in the set, assigned by insertion order.
    pub index: usize,
    /// The raw ciphertext bytes.
    pub bytes: Vec<u8>,
}

impl Ciphertext {
    /// The bytes at `[start, start + len)`, if this ciphertext covers that span.
    #[must_use]
    pub fn span(&self, start: usize, len: usize) -> Option<&[u8]> {
        self.bytes.get(start..start.checked_add(len)?)
    }
}

/// An ordered set of ciphertexts sharing one key stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CiphertextSet {
    ciphertexts: Vec<Ciphertext>,
    key_length: usize,
}

impl CiphertextSet {
    /// Builds a set from raw byte buffers, indexing them in order.
    #[must_use]
    pub fn new(buffers: Vec<Vec<u8>>) -> Self {
        let ciphertexts: Vec<Ciphertext> = buffers
            .into_iter()
            .enumerate()
            .map(|(index, bytes)| Ciphertext { index, bytes })
            .collect();
        let key_length = ciphertexts.iter().map(|c| c.bytes.len()).max().unwrap_or(0);
        Self {
            ciphertexts,
            key_length,
        }
    }

    /// Length of the shared key coordinate space: the longest ciphertext.
    #[must_use]
    pub const fn key_length(&self) -> usize {
        self.key_length
    }

    /// Number of ciphertexts in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ciphertexts.len()
    }

    /// Whether the set holds no ciphertexts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ciphertexts.is_empty()
    }

    /// The ciphertext at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Ciphertext> {
        self.ciphertexts.get(index)
    }

    /// Iterates over the ciphertexts in ascending index order.
    pub fn iter(&self) -> std::slice::Iter<'_, Ciphertext> {
        self.ciphertexts.iter()
    }
}

impl<'a> IntoIterator for &'a CiphertextSet {
    type Item = &'a Ciphertext;
    type IntoIter = std::slice::Iter<'a, Ciphertext>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Parses ciphertexts from free-form text.
///
/// Pieces are separated by newlines, or by commas when the text has no
/// newline. Each trimmed, non-empty piece is decoded as hex when it is made of
/// only lowercase-or-digit or only uppercase-or-digit characters, and as
/// standard base64 otherwise.
///
/// # Errors
///
/// Returns [`CribError::InvalidCiphertext`] for the first piece that is neither
/// hex nor base64 or fails to decode.
pub fn parse_ciphertexts(text: &str) -> Result<CiphertextSet, CribError> {
    let separator = if text.contains('\n') {
        '\n'
    } else if text.contains(',') {
        ','
    } else {
        '\n'
    };

    let buffers = text
        .split(separator)
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .enumerate()
        .map(|(i, piece)| decode_piece(piece).map_err(|reason| CribError::InvalidCiphertext {
            line: i + 1,
            reason,
        }))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CiphertextSet::new(buffers))
}

/// Standard alphabet, padding optional.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

fn decode_piece(piece: &str) -> Result<Vec<u8>, String> {
    if looks_like_hex(piece) {
        hex::decode(piece).map_err(|e| format!("invalid hex: {e}"))
    } else if piece
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'='))
    {
        LENIENT_BASE64
            .decode(piece)
            .map_err(|e| format!("invalid base64: {e}"))
    } else {
        Err(format!("'{piece}' isn't hex or base64"))
    }
}

fn looks_like_hex(piece: &str) -> bool {
    let lower = piece
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit());
    let upper = piece
        .bytes()
        .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());
    lower || upper
}
