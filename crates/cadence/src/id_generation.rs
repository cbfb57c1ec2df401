//! Hash-based ID generation.
//!
//! IDs take the form `{prefix}-{hash}` where `hash` is a base36 rendering of a
//! SHA-256 digest over the entity's seed material, a timestamp and a retry
//! nonce. The hash length adapts to how many IDs are already registered:
//!
//! - up to 500 IDs: 4 chars
//! - up to 1,500: 5 chars
//! - beyond: 6 chars
//!
//! Issues use the configured project prefix (e.g., `proj-a3f8`); other
//! entity kinds use the fixed prefixes in [`IdKind`].
//!
//! # Example
//!
//! ```
//! use cadence::id_generation::IdGenerator;
//!
//! let mut generator = IdGenerator::new();
//! let id = generator.generate("proj", &["Fix login", "alice"], 1_700_000_000).unwrap();
//! assert!(id.starts_with("proj-"));
//! ```

use sha2::{Digest, Sha256};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

const BASE36_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const MAX_NONCE: u32 = 100;
const MAX_HASH_LENGTH: usize = 6;

/// Errors that can occur during ID generation
#[derive(Debug, Error)]
pub enum IdGenerationError {
    /// Unable to generate a unique ID after exhausting all nonces and length increases
    #[error("Unable to generate unique ID after {attempts} attempts")]
    CollisionExhausted {
        /// Number of nonces tried
        attempts: u32,
    },

    /// Invalid length parameter
    #[error("Length must be greater than 0")]
    InvalidLength,
}

/// Fixed prefixes for non-issue entities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    /// Sprints: `sprint-xxxx`
    Sprint,
    /// Time logs: `log-xxxx`
    TimeLog,
    /// Projects: `prj-xxxx`
    Project,
    /// Boards: `board-xxxx`
    Board,
    /// Releases: `rel-xxxx`
    Release,
}

impl IdKind {
    /// The prefix used for this kind
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Sprint => "sprint",
            Self::TimeLog => "log",
            Self::Project => "prj",
            Self::Board => "board",
            Self::Release => "rel",
        }
    }
}

/// Hash-based ID generator with collision detection
///
/// The generator remembers every ID it produced or was told about through
/// [`register_id`](Self::register_id); a freshly loaded store must register
/// its existing IDs before generating new ones.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    existing_ids: HashSet<String>,
}

impl IdGenerator {
    /// Create a generator with no registered IDs
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an existing ID to prevent collisions
    pub fn register_id(&mut self, id: impl Into<String>) {
        self.existing_ids.insert(id.into());
    }

    /// Forget every registered ID
    pub fn clear_state(&mut self) {
        self.existing_ids.clear();
    }

    /// Number of registered IDs
    pub fn registered(&self) -> usize {
        self.existing_ids.len()
    }

    /// Generate a new unique ID.
    ///
    /// # Arguments
    ///
    /// * `prefix` - ID prefix (issue prefix or an [`IdKind::prefix`])
    /// * `seed` - Entity-specific material mixed into the hash
    /// * `timestamp` - Creation time in Unix seconds
    ///
    /// # Errors
    ///
    /// Returns an error if no unique ID could be found after trying all nonces
    /// at the maximum length.
    pub fn generate(
        &mut self,
        prefix: &str,
        seed: &[&str],
        timestamp: i64,
    ) -> Result<String, IdGenerationError> {
        let mut id_length = self.adaptive_length();

        loop {
            for nonce in 0..MAX_NONCE {
                let id = Self::hash_id(prefix, seed, timestamp, nonce, id_length)?;

                if !self.existing_ids.contains(&id) {
                    if nonce > 0 {
                        debug!(nonce, id_length, "Generated unique ID after collision retries");
                    }
                    self.existing_ids.insert(id.clone());
                    return Ok(id);
                }
            }

            if id_length >= MAX_HASH_LENGTH {
                return Err(IdGenerationError::CollisionExhausted {
                    attempts: MAX_NONCE,
                });
            }

            warn!(
                id_length,
                max_nonce = MAX_NONCE,
                "All nonces exhausted, increasing ID length"
            );
            id_length += 1;
        }
    }

    fn hash_id(
        prefix: &str,
        seed: &[&str],
        timestamp: i64,
        nonce: u32,
        length: usize,
    ) -> Result<String, IdGenerationError> {
        let content = format!("{}|{}|{}", seed.join("|"), timestamp, nonce);

        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        let hash_bytes = hasher.finalize();

        let hash_str = encode_base36(&hash_bytes[..8], length)?;
        Ok(format!("{prefix}-{hash_str}"))
    }

    fn adaptive_length(&self) -> usize {
        match self.existing_ids.len() {
            0..=500 => 4,
            501..=1500 => 5,
            _ => 6,
        }
    }
}

/// Encode bytes as a fixed-length base36 string.
///
/// Only the first 8 bytes contribute; wrapping shifts keep the conversion
/// deterministic for longer input.
fn encode_base36(bytes: &[u8], length: usize) -> Result<String, IdGenerationError> {
    if length == 0 {
        return Err(IdGenerationError::InvalidLength);
    }

    let mut n: u64 = 0;
    for &byte in bytes {
        n = n.wrapping_shl(8).wrapping_add(u64::from(byte));
    }

    let mut result = Vec::with_capacity(length);
    while result.len() < length {
        // n % 36 always fits a usize index
        #[allow(clippy::cast_possible_truncation)]
        let remainder = (n % 36) as usize;
        result.push(char::from(BASE36_CHARS[remainder]));
        n /= 36;
    }

    result.reverse();
    Ok(result.into_iter().collect())
}

/// Validate ID format: `{prefix}-{hash}` with a 4-6 char alphanumeric hash.
pub fn validate_id(id: &str, prefix: &str) -> bool {
    let Some(hash) = id
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('-'))
    else {
        return false;
    };

    (4..=MAX_HASH_LENGTH).contains(&hash.len()) && hash.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TS: i64 = 1_704_067_200;

    #[test]
    fn test_base36_encoding() {
        let result = encode_base36(&[0x12, 0x34, 0x56, 0x78], 4).unwrap();
        assert_eq!(result.len(), 4);
        assert!(result.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_base36_rejects_zero_length() {
        assert!(matches!(
            encode_base36(&[1, 2, 3], 0),
            Err(IdGenerationError::InvalidLength)
        ));
    }

    #[test]
    fn test_adaptive_length_grows_with_registrations() {
        let mut generator = IdGenerator::new();
        assert_eq!(generator.adaptive_length(), 4);

        for i in 0..800 {
            generator.register_id(format!("seed-{i}"));
        }
        assert_eq!(generator.adaptive_length(), 5);

        for i in 800..2000 {
            generator.register_id(format!("seed-{i}"));
        }
        assert_eq!(generator.adaptive_length(), 6);
    }

    #[test]
    fn test_id_generation_uses_prefix() {
        let mut generator = IdGenerator::new();
        let id = generator
            .generate(IdKind::Sprint.prefix(), &["Sprint 1"], TS)
            .unwrap();

        assert!(id.starts_with("sprint-"));
        assert!(validate_id(&id, "sprint"));
    }

    #[test]
    fn test_identical_input_yields_distinct_ids() {
        let mut generator = IdGenerator::new();

        let id1 = generator.generate("proj", &["Same", "alice"], TS).unwrap();
        let id2 = generator.generate("proj", &["Same", "alice"], TS).unwrap();

        assert_ne!(id1, id2);
    }

    #[test]
    fn test_registered_ids_are_avoided() {
        let mut generator = IdGenerator::new();
        let first = IdGenerator::new()
            .generate("proj", &["Title"], TS)
            .unwrap();

        generator.register_id(first.clone());
        let second = generator.generate("proj", &["Title"], TS).unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_id_validation() {
        assert!(validate_id("proj-a3f8", "proj"));
        assert!(validate_id("proj-abc123", "proj"));

        assert!(!validate_id("invalid", "proj"));
        assert!(!validate_id("proj-", "proj"));
        assert!(!validate_id("proj-ab", "proj"));
        assert!(!validate_id("proj-abcdefg", "proj"));
        assert!(!validate_id("other-a3f8", "proj"));
        assert!(!validate_id("proj-a3!8", "proj"));
    }
}
