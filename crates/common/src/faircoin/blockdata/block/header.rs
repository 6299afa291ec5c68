//! Block header as seen by proof-of-work validation.

use bitcoin::block::{BlockHash, Header as InnerHeader, ValidationError};
use serde::{Deserialize, Serialize};

use crate::faircoin::{
    consensus::serialize,
    pow::{AlgorithmTag, Target, compute_pow_hash},
};

/// A standard 80-byte block header together with the algorithm tag that
/// selects its proof-of-work pipeline.
///
/// Only the header is ever hashed; transactions never take part in either the
/// identity hash or the proof-of-work hash.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PowHeader {
    header: InnerHeader,
    algorithm: AlgorithmTag,
}

impl PowHeader {
    /// Size of the serialized header in bytes.
    pub const SIZE: usize = InnerHeader::SIZE;

    /// Creates a header mined with the given algorithm.
    pub fn new(header: InnerHeader, algorithm: AlgorithmTag) -> Self {
        Self { header, algorithm }
    }

    /// The wrapped consensus header.
    pub fn header(&self) -> &InnerHeader {
        &self.header
    }

    /// The algorithm tag carried with this header.
    pub fn algorithm(&self) -> AlgorithmTag {
        self.algorithm
    }

    /// Header-only consensus serialization, the exact input of both hashes.
    pub fn header_bytes(&self) -> Vec<u8> {
        serialize(&self.header)
    }

    /// Identity hash of the block (double SHA-256 whatever the algorithm).
    pub fn block_hash(&self) -> BlockHash {
        self.header.block_hash()
    }

    /// Proof-of-work hash under this header's algorithm.
    pub fn pow_hash(&self) -> BlockHash {
        compute_pow_hash(&self.header_bytes(), self.algorithm)
    }

    /// Target encoded in the header's `bits` field, if it is well formed.
    pub fn target(&self) -> Option<Target> {
        Target::from_compact(self.header.bits)
    }

    /// Checks the proof-of-work hash against `required_target`.
    ///
    /// # Errors
    ///
    /// * `ValidationError::BadTarget` - The header's own target differs from
    ///   `required_target`
    /// * `ValidationError::BadProofOfWork` - The hash is above the target
    pub fn validate_pow(&self, required_target: Target) -> Result<BlockHash, ValidationError> {
        if self.target() != Some(required_target) {
            return Err(ValidationError::BadTarget);
        }
        let hash = self.pow_hash();
        if required_target.is_met_by(hash) {
            Ok(hash)
        } else {
            Err(ValidationError::BadProofOfWork)
        }
    }
}

impl From<InnerHeader> for PowHeader {
    /// Wraps a header mined with the default algorithm.
    fn from(header: InnerHeader) -> Self {
        PowHeader::new(header, AlgorithmTag::SHA256D)
    }
}

#[cfg(test)]
mod tests {
    use hex::FromHex;

    use super::*;
    use crate::faircoin::{consensus::deserialize, pow::PowAlgorithm};

    // Bitcoin block 1.
    const BLOCK_ONE_HEADER: &str = "\
        01000000\
        6fe28c0ab6f1b372c1a6a246ae63f74f931e8365e15a089c68d6190000000000\
        982051fd1e4ba744bbbe680e1fee14677ba1a3c3540bf7b1cdb606e857233e0e\
        61bc6649\
        ffff001d\
        01e36299";

    fn block_one() -> InnerHeader {
        let bytes = Vec::from_hex(BLOCK_ONE_HEADER).unwrap();
        deserialize(&bytes).unwrap()
    }

    #[test]
    fn test_header_bytes_are_80_bytes_verbatim() {
        let header = PowHeader::from(block_one());
        let bytes = header.header_bytes();
        assert_eq!(bytes.len(), PowHeader::SIZE);
        assert_eq!(bytes, Vec::from_hex(BLOCK_ONE_HEADER).unwrap());
    }

    #[test]
    fn test_default_pow_hash_equals_block_hash() {
        let header = PowHeader::from(block_one());
        assert_eq!(header.pow_hash(), header.block_hash());
        assert_eq!(
            header.block_hash().to_string(),
            "00000000839a8e6886ab5951d76f411475428afc90947ee320161bbf18eb6048"
        );
    }

    #[test]
    fn test_groestl_pow_hash_differs_from_identity_hash() {
        let header = PowHeader::new(block_one(), PowAlgorithm::Groestl.tag());
        assert_ne!(header.pow_hash(), header.block_hash());
        assert_eq!(
            header.pow_hash(),
            PowAlgorithm::Groestl.hash(&header.header_bytes())
        );
    }

    #[test]
    fn test_validate_pow() {
        let header = PowHeader::from(block_one());
        let target = header.target().unwrap();
        assert_eq!(header.validate_pow(target).unwrap(), header.block_hash());

        // The same header claimed under groestl does not meet the target.
        let groestl = PowHeader::new(block_one(), AlgorithmTag::GROESTL);
        assert!(matches!(
            groestl.validate_pow(target),
            Err(ValidationError::BadProofOfWork)
        ));

        let other = Target::from_hex("01").unwrap();
        assert!(matches!(
            header.validate_pow(other),
            Err(ValidationError::BadTarget)
        ));
    }
}
