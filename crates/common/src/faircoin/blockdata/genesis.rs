//! Genesis block information for the FairCoin networks.

use bitcoin::{
    CompactTarget, TxMerkleNode,
    block::{Header as InnerHeader, Version},
};
use serde::{Deserialize, Serialize};

use crate::faircoin::{
    blockdata::block::{BlockHash, PowHeader},
    hashes::Hash,
    network::Network,
    pow::PowAlgorithm,
};

/// Genesis block information for different networks.
///
/// `hash` is the published genesis hash of the network. When the merkle root
/// of the genesis coinbase is known, the header can be rebuilt from these
/// fields and must hash to `hash`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisInfo {
    /// The published hash of the genesis block.
    pub hash: BlockHash,
    /// The merkle root of the genesis block, `None` if the genesis coinbase
    /// is not known.
    pub merkle_root: Option<TxMerkleNode>,
    /// The timestamp of the genesis block.
    pub timestamp: u32,
    /// The nonce of the genesis block.
    pub nonce: u32,
    /// The bits (difficulty) of the genesis block.
    pub bits: u32,
    /// The version of the genesis block.
    pub version: i32,
}

impl GenesisInfo {
    /// Returns the genesis block information for the specified network.
    pub fn for_network(network: Network) -> Self {
        match network {
            Network::Mainnet => Self::mainnet(),
            Network::Testnet => Self::testnet(),
        }
    }

    /// Returns the genesis block information for the mainnet network.
    // TODO: fill in `merkle_root` once the FairCoin genesis coinbase is
    // available; the header cannot be rebuilt without it.
    pub fn mainnet() -> Self {
        Self {
            hash: BlockHash::from_byte_array([
                0x75, 0xf2, 0x5e, 0xb0, 0xbc, 0xcd, 0xba, 0x75, 0x82, 0x53, 0x93, 0x52, 0x2d, 0xf0,
                0x4f, 0x30, 0xd2, 0x6a, 0x3f, 0x91, 0xf9, 0x80, 0x59, 0xe4, 0x96, 0xe2, 0x08, 0x0c,
                0x8b, 0x18, 0xae, 0xf1,
            ]),
            merkle_root: None,
            timestamp: 1389138974,
            nonce: 102078,
            bits: 0x1e0fffff,
            version: 1,
        }
    }

    /// Returns the genesis block information for the testnet network.
    pub fn testnet() -> Self {
        Self {
            hash: BlockHash::from_byte_array([
                0x8c, 0x08, 0xe3, 0x9d, 0x05, 0x19, 0x77, 0x2a, 0xdf, 0x09, 0xe2, 0x28, 0x7d, 0x1c,
                0x04, 0x69, 0x6a, 0x8c, 0xb7, 0xbd, 0x12, 0x5d, 0xe6, 0x51, 0x62, 0x9a, 0x2d, 0x26,
                0x1a, 0x28, 0xf7, 0x5d,
            ]),
            merkle_root: None,
            timestamp: 1389138974,
            nonce: 280528,
            bits: 0x1e0fffff,
            version: 1,
        }
    }

    /// Rebuilds the genesis header from these fields.
    ///
    /// Genesis blocks are always mined with the default algorithm. Returns
    /// `None` when the merkle root is unknown.
    pub fn to_header(&self) -> Option<PowHeader> {
        let inner_header = InnerHeader {
            version: Version::from_consensus(self.version),
            prev_blockhash: BlockHash::all_zeros(), // Genesis block has no previous block
            merkle_root: self.merkle_root?,
            time: self.timestamp,
            bits: CompactTarget::from_consensus(self.bits),
            nonce: self.nonce,
        };
        Some(PowHeader::new(inner_header, PowAlgorithm::DEFAULT.tag()))
    }

    /// Hash of the rebuilt header under the default proof-of-work pipeline,
    /// if the header can be rebuilt.
    pub fn computed_hash(&self) -> Option<BlockHash> {
        self.to_header().map(|header| header.pow_hash())
    }
}
