/// Block data structures and the genesis anchor.
pub mod blockdata;
/// Signed sync-checkpoint messages.
pub mod checkpoint;
/// Consensus encoding and decoding functionality.
pub mod consensus;
/// Hash functions and types.
pub mod hashes;
/// I/O traits used by the consensus codec.
pub mod io;
/// Network identifiers.
pub mod network;
/// Validated, memoized per-network parameters.
pub mod params;
/// Proof-of-work hashing and difficulty targets.
pub mod pow;
