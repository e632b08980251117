//! Mapping from `(payload, nonce)` to a work value, plus tuning helpers.
//!
//! `WorkBuffer` is the only place the hash is computed and the only place a
//! value is compared against a difficulty. Verification and every generator
//! worker go through it.

use powork_crypto::sha256;

/// Scratch buffer holding `payload || nonce_be`.
///
/// Each generator worker owns one and rewrites only the trailing eight bytes
/// per attempt.
pub(crate) struct WorkBuffer {
    input: Vec<u8>,
    payload_len: usize,
}

impl WorkBuffer {
    pub(crate) fn new(payload: &[u8]) -> Self {
        let mut input = Vec::with_capacity(payload.len() + 8);
        input.extend_from_slice(payload);
        input.extend_from_slice(&[0u8; 8]);
        Self {
            input,
            payload_len: payload.len(),
        }
    }

    /// Work value of `nonce`: the first eight digest bytes as a big-endian `u64`.
    #[inline]
    pub(crate) fn value_at(&mut self, nonce: u64) -> u64 {
        self.input[self.payload_len..].copy_from_slice(&nonce.to_be_bytes());
        let hash = sha256(&self.input);
        u64::from_be_bytes([
            hash[0], hash[1], hash[2], hash[3], hash[4], hash[5], hash[6], hash[7],
        ])
    }

    #[inline]
    pub(crate) fn meets(&mut self, nonce: u64, difficulty: u64) -> bool {
        self.value_at(nonce) >= difficulty
    }
}

/// Returns the work value (achieved difficulty) of `nonce` for `payload`.
///
/// Pure: any payload length and any nonce are valid inputs.
pub fn work_difficulty(payload: &[u8], nonce: u64) -> u64 {
    WorkBuffer::new(payload).value_at(nonce)
}

/// Mean number of hashes needed to find a nonce meeting `difficulty`.
///
/// Each attempt succeeds with probability `(2^64 - difficulty) / 2^64`.
pub fn expected_attempts(difficulty: u64) -> f64 {
    let space = 2f64.powi(64);
    let qualifying = (u64::MAX - difficulty) as f64 + 1.0;
    space / qualifying
}

/// Raise `base` so the expected work grows by `multiplier`.
///
/// The inverse gap `u64::MAX - base` is divided by the multiplier, which
/// raises the threshold. A zero base stays zero (work disabled), and a
/// multiplier that is not a positive finite number leaves `base` unchanged.
pub fn scale_difficulty(base: u64, multiplier: f64) -> u64 {
    if base == 0 || !multiplier.is_finite() || multiplier <= 0.0 {
        return base;
    }
    let inverse = u64::MAX - base;
    // `as` saturates, so multipliers below 1 bottom out at zero.
    let scaled = u64::MAX - (inverse as f64 / multiplier) as u64;
    // f64 rounding must not lower the bar when asked to raise it.
    if multiplier >= 1.0 {
        scaled.max(base)
    } else {
        scaled
    }
}
