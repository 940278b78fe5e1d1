// File:    classifier.rs
// Author:  apezoo
// Date:    2026-10-18
//
// Description: Byte classification tables compiled from regex patterns, used to judge trial decodes.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! Byte classification tables used to judge whether a trial decode looks like plaintext.

use crate::error::{CribError, PatternKind};
use regex::Regex;

/// Pattern used for the `valid` table when the user leaves it empty.
pub const DEFAULT_VALID_PATTERN: &str = r#"[A-Za-z0-9 ,.'"!?;:()\n-]"#;
/// Pattern used for the `acceptable` table when the user leaves it empty.
pub const DEFAULT_ACCEPTABLE_PATTERN: &str = r"[\x20-\x7e]";

/// How a single decoded byte is judged by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteClass {
    /// Looks like ordinary plaintext.
    Valid,
    /// Rare in plaintext but tolerated at a cost.
    Acceptable,
    /// Never expected in plaintext; disqualifies a candidate outright.
    Fatal,
}

/// Two membership tables over all 256 byte values.
///
/// A byte that is in neither table is fatal. When a byte is in both tables
/// it counts as valid.
#[derive(Debug, Clone)]
pub struct ByteClassifier {
    valid: [bool; 256],
    acceptable: [bool; 256],
    valid_pattern: String,
    acceptable_pattern: String,
}

impl ByteClassifier {
    /// Builds a classifier from two regex patterns.
    ///
    /// Each pattern is tested against the single character whose code point is
    /// the byte value (so `0xe9` is tested as `é`). An empty pattern selects the
    /// corresponding default.
    ///
    /// # Errors
    ///
    /// Returns [`CribError::InvalidPattern`] if either pattern fails to compile.
    pub fn from_patterns(valid: &str, acceptable: &str) -> Result<Self, CribError> {
        Ok(Self {
            valid: compile(valid, PatternKind::Valid)?,
            acceptable: compile(acceptable, PatternKind::Acceptable)?,
            valid_pattern: valid.to_string(),
            acceptable_pattern: acceptable.to_string(),
        })
    }

    /// Builds a classifier directly from lookup tables.
    ///
    /// The stored patterns are left empty, so a session saved from this
    /// classifier reloads with the default patterns.
    #[must_use]
    pub const fn from_tables(valid: [bool; 256], acceptable: [bool; 256]) -> Self {
        Self {
            valid,
            acceptable,
            valid_pattern: String::new(),
            acceptable_pattern: String::new(),
        }
    }

    /// Builds a classifier from explicit byte sets.
    #[must_use]
    pub fn from_bytes(
        valid: impl IntoIterator<Item = u8>,
        acceptable: impl IntoIterator<Item = u8>,
    ) -> Self {
        let mut valid_table = [false; 256];
        for b in valid {
            valid_table[usize::from(b)] = true;
        }
        let mut acceptable_table = [false; 256];
        for b in acceptable {
            acceptable_table[usize::from(b)] = true;
        }
        Self::from_tables(valid_table, acceptable_table)
    }

    /// Replaces the `valid` table. On error the previous table stays in effect.
    ///
    /// # Errors
    ///
    /// Returns [`CribError::InvalidPattern`] if the pattern fails to compile.
    pub fn set_valid_pattern(&mut self, pattern: &str) -> Result<(), CribError> {
        self.valid = compile(pattern, PatternKind::Valid)?;
        self.valid_pattern = pattern.to_string();
        Ok(())
    }

    /// Replaces the `acceptable` table. On error the previous table stays in effect.
    ///
    /// # Errors
    ///
    /// Returns [`CribError::InvalidPattern`] if the pattern fails to compile.
    pub fn set_acceptable_pattern(&mut self, pattern: &str) -> Result<(), CribError> {
        self.acceptable = compile(pattern, PatternKind::Acceptable)?;
        self.acceptable_pattern = pattern.to_string();
        Ok(())
    }

    /// The pattern the `valid` table was built from, as entered.
    #[must_use]
    pub fn valid_pattern(&self) -> &str {
        &self.valid_pattern
    }

    /// The pattern the `acceptable` table was built from, as entered.
    #[must_use]
    pub fn acceptable_pattern(&self) -> &str {
        &self.acceptable_pattern
    }

    /// Whether `b` is in the `valid` table.
    #[must_use]
    pub const fn is_valid(&self, b: u8) -> bool {
        self.valid[b as usize]
    }

    /// Whether `b` is in the `acceptable` table.
    #[must_use]
    pub const fn is_acceptable(&self, b: u8) -> bool {
        self.acceptable[b as usize]
    }

    /// Classifies a decoded byte.
    #[must_use]
    pub const fn classify(&self, b: u8) -> ByteClass {
        if self.is_valid(b) {
            ByteClass::Valid
        } else if self.is_acceptable(b) {
            ByteClass::Acceptable
        } else {
            ByteClass::Fatal
        }
    }
}

impl Default for ByteClassifier {
    fn default() -> Self {
        Self::from_patterns("", "")
            .unwrap_or_else(|_| Self::from_tables([false; 256], [false; 256]))
    }
}

fn compile(pattern: &str, which: PatternKind) -> Result<[bool; 256], CribError> {
    let effective = match (pattern.is_empty(), which) {
        (false, _) => pattern,
        (true, PatternKind::Valid) => DEFAULT_VALID_PATTERN,
        (true, PatternKind::Acceptable) => DEFAULT_ACCEPTABLE_PATTERN,
    };
    let regex =
        Regex::new(effective).map_err(|source| CribError::InvalidPattern { which, source })?;

    let mut table = [false; 256];
    let mut buf = [0u8; 4];
    for b in 0..=u8::MAX {
        table[usize::from(b)] = regex.is_match(char::from(b).encode_utf8(&mut buf));
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_patterns_split_printable_ascii() {
        let classifier = ByteClassifier::default();
        assert_eq!(classifier.classify(b'e'), ByteClass::Valid);
        assert_eq!(classifier.classify(b' '), ByteClass::Valid);
        assert_eq!(classifier.classify(b'\n'), ByteClass::Valid);
        assert_eq!(classifier.classify(b'#'), ByteClass::Acceptable);
        assert_eq!(classifier.classify(0x00), ByteClass::Fatal);
        assert_eq!(classifier.classify(0xff), ByteClass::Fatal);
    }

    #[test]
    fn patterns_see_latin1_code_points() {
        let classifier = ByteClassifier::from_patterns("é", "x").unwrap();
        assert!(classifier.is_valid(0xe9));
        assert!(!classifier.is_valid(b'e'));
    }

    #[test]
    fn invalid_pattern_keeps_previous_table() {
        let mut classifier = ByteClassifier::from_patterns("[a-z]", "[0-9]").unwrap();
        let err = classifier.set_valid_pattern("[a-").unwrap_err();
        assert!(matches!(
            err,
            CribError::InvalidPattern {
                which: PatternKind::Valid,
                ..
            }
        ));
        assert!(classifier.is_valid(b'q'));
        assert_eq!(classifier.valid_pattern(), "[a-z]");

        classifier.set_acceptable_pattern("[#@]").unwrap();
        assert!(classifier.is_acceptable(b'@'));
        assert!(!classifier.is_acceptable(b'5'));
    }

    #[test]
    fn from_bytes_marks_only_listed_values() {
        let classifier = ByteClassifier::from_bytes(1..=9, [42]);
        assert_eq!(classifier.classify(5), ByteClass::Valid);
        assert_eq!(classifier.classify(42), ByteClass::Acceptable);
        assert_eq!(classifier.classify(10), ByteClass::Fatal);
    }
}
