//! Commit id derivation.
//!
//! Ids come from a djb2 rolling hash. It is deterministic and cheap but has
//! no collision resistance: [`IdWidth::Short`] keeps 7 hex digits, so only
//! 2^28 distinct ids exist. [`IdWidth::Full`] keeps the whole 64-bit value
//! and mixes the staged file bytes into the input.

use crate::storage::types::{CommitId, IdWidth};

const DJB2_SEED: u64 = 5381;

/// djb2 over raw bytes
///
/// Each byte is added as a *signed* value, matching a `char`-based loop on
/// platforms where `char` is signed, so ids stay stable for non-ASCII input.
pub fn djb2(bytes: &[u8]) -> u64 {
    bytes.iter().fold(DJB2_SEED, |hash, &b| {
        hash.wrapping_shl(5)
            .wrapping_add(hash)
            .wrapping_add(b as i8 as i64 as u64)
    })
}

/// Incremental form of [`djb2`], for hashing input that arrives in pieces.
#[derive(Debug, Clone, Copy)]
pub struct Hasher {
    state: u64,
}

impl Hasher {
    pub fn new() -> Self {
        Self { state: DJB2_SEED }
    }

    pub fn update(&mut self, bytes: &[u8]) -> &mut Self {
        for &b in bytes {
            self.state = self
                .state
                .wrapping_shl(5)
                .wrapping_add(self.state)
                .wrapping_add(b as i8 as i64 as u64);
        }
        self
    }

    pub fn finish(&self) -> u64 {
        self.state
    }

    /// render the digest as a commit id of the given width
    pub fn finish_id(&self, width: IdWidth) -> CommitId {
        to_commit_id(self.state, width)
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

/// hash arbitrary bytes straight to a commit id
pub fn hash_id(bytes: &[u8], width: IdWidth) -> CommitId {
    to_commit_id(djb2(bytes), width)
}

/// unpadded lowercase hex, truncated to the width
fn to_commit_id(digest: u64, width: IdWidth) -> CommitId {
    let mut hex = format!("{:x}", digest);
    hex.truncate(width.max_len());
    CommitId::new(hex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_djb2_empty_is_seed() {
        assert_eq!(djb2(b""), 5381);
    }

    #[test]
    fn test_djb2_known_values() {
        // 5381 * 33 + 'a'
        assert_eq!(djb2(b"a"), 177_670);
        // (5381 * 33 + 'a') * 33 + 'b'
        assert_eq!(djb2(b"ab"), 5_863_208);
    }

    #[test]
    fn test_signed_bytes() {
        // 0xff is added as -1
        assert_eq!(djb2(&[0xff]), 5381 * 33 - 1);
    }

    #[test]
    fn test_incremental_matches_oneshot() {
        let mut hasher = Hasher::new();
        hasher.update(b"first").update(b"1700000000");
        assert_eq!(hasher.finish(), djb2(b"first1700000000"));
    }

    #[test]
    fn test_hash_id_width() {
        let short = hash_id(b"first1700000000", IdWidth::Short);
        let full = hash_id(b"first1700000000", IdWidth::Full);
        assert_eq!(short.as_str().len(), 7);
        assert!(full.as_str().len() > 7);
        assert!(full.as_str().starts_with(short.as_str()));
        assert!(CommitId::from_hex(full.as_str()).is_ok());
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(
            hash_id(b"first1700000000", IdWidth::Short),
            hash_id(b"first1700000000", IdWidth::Short)
        );
        assert_ne!(
            hash_id(b"first1700000000", IdWidth::Short),
            hash_id(b"second1700000001", IdWidth::Short)
        );
    }

    #[test]
    fn test_trailing_change_only_reaches_low_digits() {
        // a change in the last byte only moves the low bits, which the
        // short form truncates away
        let a = b"first1700000000";
        let b = b"first1700000001";
        assert_eq!(hash_id(a, IdWidth::Short), hash_id(b, IdWidth::Short));
        assert_ne!(hash_id(a, IdWidth::Full), hash_id(b, IdWidth::Full));
    }
}
