//! Thin adapter to a CKKS-style homomorphic-arithmetic backend.
//!
//! The sorting circuits in this workspace never talk to a concrete
//! encryption library. They are written against the [`FheEngine`] trait,
//! which captures the capability set of an approximate-arithmetic scheme:
//! slot-packed encode/encrypt, pointwise arithmetic, cyclic rotation, noise
//! refresh and bounded-degree polynomial approximation of arbitrary
//! continuous functions.
//!
//! [`PlainEngine`] is the single-party reference instantiation: it computes
//! on cleartext slots but reproduces the two properties that actually shape
//! circuit design, namely the error of Chebyshev polynomial approximation
//! and the consumption of multiplicative depth.

#![warn(missing_docs)]

pub mod chebyshev;
mod ciphertext;
mod engine;
mod plain;

pub use ciphertext::{EncryptedVector, Plaintext};
pub use engine::FheEngine;
pub use plain::{PlainEngine, SecurityProfile};

/// Errors surfaced by the homomorphic backend.
///
/// Depth exhaustion is fatal for the computation that hit it: ciphertext
/// state has already been consumed mid-circuit, so callers propagate instead
/// of retrying.
#[derive(Debug, thiserror::Error)]
pub enum FheError {
    /// The requested operation needs more multiplicative levels than the
    /// context was provisioned with.
    #[error("depth budget exhausted: operation needs level {required} but only {available} levels are provisioned")]
    DepthExhausted {
        /// Level the ciphertext would reach.
        required: usize,
        /// Total levels provisioned at context setup.
        available: usize,
    },
    /// The polynomial degree is not evaluable by the backend.
    #[error("unsupported approximation degree {0}")]
    InvalidDegree(usize),
    /// Noise refresh was requested on a context generated without
    /// bootstrapping support.
    #[error("bootstrapping is not enabled for this context")]
    BootstrapUnavailable,
}
