//! PoW validation.

use rayon::prelude::*;

use crate::difficulty::WorkBuffer;

/// Validate that `nonce` meets `difficulty` for `payload`.
///
/// Difficulty 0 accepts every nonce. Costs exactly one hash.
pub fn verify_work(payload: &[u8], difficulty: u64, nonce: u64) -> bool {
    WorkBuffer::new(payload).meets(nonce, difficulty)
}

/// One proof awaiting validation.
#[derive(Clone, Copy, Debug)]
pub struct WorkItem<'a> {
    pub payload: &'a [u8],
    pub difficulty: u64,
    pub nonce: u64,
}

/// Validate many proofs in parallel on the global rayon pool.
///
/// Output order matches input order.
pub fn verify_batch(items: &[WorkItem<'_>]) -> Vec<bool> {
    items
        .par_iter()
        .map(|item| verify_work(item.payload, item.difficulty, item.nonce))
        .collect()
}
