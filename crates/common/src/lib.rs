//! FairCoin consensus-boundary primitives.
//!
//! This library decodes and verifies signed sync-checkpoint messages, computes
//! block proof-of-work hashes under every supported mining algorithm, and
//! provides the immutable per-network parameter sets both of them depend on.

#![cfg_attr(test, allow(clippy::arithmetic_side_effects))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::cast_sign_loss))]
#![cfg_attr(test, allow(clippy::indexing_slicing))]
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::cast_possible_truncation))]

/// Types and functions related to the FairCoin network.
pub mod faircoin;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
