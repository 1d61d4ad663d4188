//! Oblivious sorting of encrypted reals.
//!
//! Two circuit designs sort an encrypted vector without ever decrypting it:
//!
//! - [`ComparisonNetworkSorter`] evaluates a bitonic sorting network
//!   directly on an n-slot ciphertext, one compare-exchange layer at a time,
//!   refreshing noise between layers.
//! - [`RankPermutationSorter`] computes every element's normalized rank from
//!   pairwise comparisons on an n²-slot grid and selects each element into
//!   its target position through an approximately one-hot permutation
//!   matrix.
//!
//! Both are generic over the [`fhe_core::FheEngine`] backend and only use
//! its capability set: pointwise arithmetic, cyclic rotation, noise refresh
//! and bounded-degree polynomial approximation.

pub mod input;
pub mod masks;
pub mod network;
pub mod params;
pub mod permutation;
pub mod report;

pub use network::ComparisonNetworkSorter;
pub use params::{NetworkParams, ParamError, PermutationParams};
pub use permutation::RankPermutationSorter;
pub use report::SortReport;
