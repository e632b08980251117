use std::time::Duration;

use thiserror::Error;

/// Ways a bounded generation can end without a nonce.
///
/// Plain [`WorkGenerator::generate`](crate::WorkGenerator::generate) never
/// produces these; it blocks until a nonce is found.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkError {
    #[error("work generation cancelled")]
    Cancelled,

    #[error("work generation timed out after {elapsed:?}")]
    TimedOut { elapsed: Duration },

    #[error("every worker exhausted its nonce range without finding valid work")]
    Exhausted,
}
