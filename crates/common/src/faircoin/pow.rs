//! Proof-of-work hashing.
//!
//! A block's proof-of-work hash is computed over its 80-byte header by one of
//! several digest pipelines, chosen by the algorithm tag the block carries.
//! Pipelines are listed in a single table; supporting a new algorithm means
//! adding a [`PowAlgorithm`] variant and one [`PIPELINES`] row.
//!
//! Hashes are returned as [`BlockHash`], which stores the raw digest and
//! displays it byte-reversed. Comparison against a [`Target`] interprets the
//! raw digest as a little-endian integer, the same ordering the reversed
//! display form shows.

mod target;

use bitcoin::BlockHash;
use serde::{Deserialize, Serialize};
pub use target::Target;
use tracing::trace;

use crate::faircoin::hashes::{Hash, double_digest, groestl_digest};

/// Raw algorithm identifier as carried alongside a block header.
///
/// Any value is representable. Values without a [`PowAlgorithm`] are hashed
/// with [`PowAlgorithm::DEFAULT`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AlgorithmTag(pub u8);

impl AlgorithmTag {
    /// Tag of the double SHA-256 pipeline.
    pub const SHA256D: Self = Self(0);
    /// Tag of the Groestl pipeline.
    pub const GROESTL: Self = Self(1);
}

impl From<u8> for AlgorithmTag {
    fn from(tag: u8) -> Self {
        Self(tag)
    }
}

impl From<PowAlgorithm> for AlgorithmTag {
    fn from(algorithm: PowAlgorithm) -> Self {
        algorithm.tag()
    }
}

/// The proof-of-work pipelines this client understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowAlgorithm {
    /// `sha256d(header)`.
    Sha256d,
    /// `sha256(groestl512(header))`.
    Groestl,
}

/// Digest function of a pipeline.
pub type PowFn = fn(&[u8]) -> BlockHash;

/// One row of the dispatch table.
#[derive(Clone, Copy)]
pub struct Pipeline {
    /// Algorithm implemented by this row.
    pub algorithm: PowAlgorithm,
    /// Tag selecting this row.
    pub tag: AlgorithmTag,
    /// Human-readable name.
    pub name: &'static str,
    /// Header digest.
    pub hash: PowFn,
}

/// Dispatch table from algorithm tag to digest pipeline.
pub static PIPELINES: [Pipeline; 2] = [
    Pipeline {
        algorithm: PowAlgorithm::Sha256d,
        tag: AlgorithmTag::SHA256D,
        name: "sha256d",
        hash: sha256d_pow,
    },
    Pipeline {
        algorithm: PowAlgorithm::Groestl,
        tag: AlgorithmTag::GROESTL,
        name: "groestl",
        hash: groestl_pow,
    },
];

fn sha256d_pow(header: &[u8]) -> BlockHash {
    BlockHash::from_byte_array(double_digest(header).to_byte_array())
}

fn groestl_pow(header: &[u8]) -> BlockHash {
    BlockHash::from_byte_array(groestl_digest(header).to_byte_array())
}

impl PowAlgorithm {
    /// Algorithm used for unknown tags and for every genesis block.
    pub const DEFAULT: Self = PowAlgorithm::Sha256d;

    /// Looks up the algorithm selected by `tag`.
    pub fn from_tag(tag: AlgorithmTag) -> Option<Self> {
        PIPELINES
            .iter()
            .find(|pipeline| pipeline.tag == tag)
            .map(|pipeline| pipeline.algorithm)
    }

    /// Returns this algorithm's tag.
    pub fn tag(self) -> AlgorithmTag {
        self.pipeline().tag
    }

    /// Returns this algorithm's name.
    pub fn name(self) -> &'static str {
        self.pipeline().name
    }

    /// Hashes a serialized header with this algorithm.
    pub fn hash(self, header: &[u8]) -> BlockHash {
        (self.pipeline().hash)(header)
    }

    fn pipeline(self) -> &'static Pipeline {
        // Every variant has exactly one row; the table test enforces it.
        PIPELINES
            .iter()
            .find(|pipeline| pipeline.algorithm == self)
            .unwrap_or(&PIPELINES[0])
    }
}

/// Computes the proof-of-work hash of a serialized block header.
///
/// `header` must be the header-only serialization (no transactions), byte for
/// byte what the miner hashed. Tags without a pipeline fall back to
/// [`PowAlgorithm::DEFAULT`]; the resulting hash simply fails the later target
/// comparison if the block really used another algorithm.
///
/// The function is total: any input length is accepted and hashed, and the
/// result depends only on `header` and `tag`.
pub fn compute_pow_hash(header: &[u8], tag: AlgorithmTag) -> BlockHash {
    let algorithm = PowAlgorithm::from_tag(tag).unwrap_or_else(|| {
        trace!(tag = tag.0, "unknown proof-of-work algorithm tag, using default");
        PowAlgorithm::DEFAULT
    });
    algorithm.hash(header)
}
