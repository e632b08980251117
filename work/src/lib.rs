//! SHA-256 proof-of-work.
//!
//! A nonce is valid for a payload and difficulty when the first eight bytes of
//! `SHA-256(payload || nonce_be)`, read as a big-endian `u64`, are greater than
//! or equal to the difficulty. Generation brute-forces that condition across
//! several threads; verification is a single hash.
//!
//! ```
//! use powork_work::{generate_work, verify_work, work_difficulty};
//!
//! let payload = b"hello";
//! let difficulty = 0xff00_0000_0000_0000;
//!
//! let nonce = generate_work(payload, difficulty, 2);
//! assert!(verify_work(payload, difficulty, nonce));
//! assert!(work_difficulty(payload, nonce) >= difficulty);
//! ```

pub mod difficulty;
pub mod error;
pub mod generator;
pub mod validator;

pub use difficulty::{expected_attempts, scale_difficulty, work_difficulty};
pub use error::WorkError;
pub use generator::{generate_work, worker_range, WorkGenerator};
pub use validator::{verify_batch, verify_work, WorkItem};

use std::fmt;

/// The result of PoW generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorkNonce(pub u64);

impl fmt::Display for WorkNonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl From<WorkNonce> for u64 {
    fn from(nonce: WorkNonce) -> Self {
        nonce.0
    }
}
