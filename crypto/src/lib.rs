//! Cryptographic primitives for powork.
//!
//! - **SHA-256** for mapping a payload and nonce to a work value
//!
//! Every hash computed by the proof-of-work crates goes through this crate, so
//! generation and verification can never disagree on the hash function.

pub mod hash;

pub use hash::{sha256, sha256_multi};
