/// Block header types.
pub mod block;
/// Genesis block information.
pub mod genesis;
