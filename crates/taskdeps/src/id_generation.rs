//! Hash-based identifiers for dependency edges.
//!
//! Edge IDs have the form `dep-{hash}` where `{hash}` is a base36 prefix of a
//! SHA256 digest over the endpoint pair, the creation time and a nonce.
//!
//! # Example
//!
//! ```
//! use taskdeps::domain::TaskId;
//! use taskdeps::id_generation::{validate_edge_id, EdgeIdGenerator};
//!
//! let mut generator = EdgeIdGenerator::new();
//! let id = generator
//!     .generate(&TaskId::new("t2"), &TaskId::new("t1"))
//!     .unwrap();
//!
//! assert!(validate_edge_id(id.as_str()));
//! ```

use crate::domain::{EdgeId, TaskId};
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

/// Prefix shared by all edge identifiers
pub const EDGE_ID_PREFIX: &str = "dep";

const BASE36_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const MAX_NONCE: u32 = 100;
const DEFAULT_HASH_LENGTH: usize = 6;
const MAX_HASH_LENGTH: usize = 10;

/// Errors that can occur during ID generation
#[derive(Debug, Error)]
pub enum IdGenerationError {
    /// Unable to generate a unique ID after exhausting all nonces and lengths
    #[error("Unable to generate unique ID after {attempts} attempts")]
    CollisionExhausted { attempts: u32 },
}

/// Collision-checked generator for [`EdgeId`]s.
///
/// Every ID the generator hands out or is told about via [`register`](Self::register)
/// is remembered, so removed edges never have their IDs reused within a session.
#[derive(Debug, Default)]
pub struct EdgeIdGenerator {
    existing_ids: HashSet<String>,
}

impl EdgeIdGenerator {
    /// Create an empty generator
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an existing ID to prevent collisions
    pub fn register(&mut self, id: &EdgeId) {
        self.existing_ids.insert(id.as_str().to_string());
    }

    /// Whether the ID has been generated or registered before
    pub fn contains(&self, id: &EdgeId) -> bool {
        self.existing_ids.contains(id.as_str())
    }

    /// Generate a new unique edge ID for `task_id -> depends_on`.
    ///
    /// # Errors
    ///
    /// Returns [`IdGenerationError::CollisionExhausted`] if every nonce collides
    /// at every permitted length.
    pub fn generate(
        &mut self,
        task_id: &TaskId,
        depends_on: &TaskId,
    ) -> Result<EdgeId, IdGenerationError> {
        let timestamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let mut attempts = 0;

        for length in DEFAULT_HASH_LENGTH..=MAX_HASH_LENGTH {
            for nonce in 0..MAX_NONCE {
                attempts += 1;
                let id = hash_id(task_id, depends_on, timestamp, nonce, length);

                if self.existing_ids.insert(id.clone()) {
                    if nonce > 0 {
                        debug!(nonce, length, "Generated unique edge ID after collisions");
                    }
                    return Ok(EdgeId::new(id));
                }
            }

            warn!(
                length,
                max_nonce = MAX_NONCE,
                "All nonces exhausted, increasing edge ID length"
            );
        }

        Err(IdGenerationError::CollisionExhausted { attempts })
    }
}

fn hash_id(
    task_id: &TaskId,
    depends_on: &TaskId,
    timestamp: i64,
    nonce: u32,
    length: usize,
) -> String {
    let content = format!("{task_id}|{depends_on}|{timestamp}|{nonce}");

    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let hash_bytes = hasher.finalize();

    format!(
        "{EDGE_ID_PREFIX}-{}",
        encode_base36(&hash_bytes[..8], length)
    )
}

/// Encode up to eight bytes as a fixed-length base36 string.
fn encode_base36(bytes: &[u8], length: usize) -> String {
    let mut n: u64 = 0;
    for &byte in bytes {
        n = n.wrapping_shl(8).wrapping_add(u64::from(byte));
    }

    let mut result = Vec::with_capacity(length);
    while result.len() < length {
        let remainder = (n % 36) as usize;
        result.push(char::from(BASE36_CHARS[remainder]));
        n /= 36;
    }

    result.iter().rev().collect()
}

/// Check that a string looks like an edge ID (`dep-` followed by 6-10
/// lowercase alphanumerics).
pub fn validate_edge_id(id: &str) -> bool {
    let Some(hash) = id
        .strip_prefix(EDGE_ID_PREFIX)
        .and_then(|rest| rest.strip_prefix('-'))
    else {
        return false;
    };

    (DEFAULT_HASH_LENGTH..=MAX_HASH_LENGTH).contains(&hash.len())
        && hash
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
}
