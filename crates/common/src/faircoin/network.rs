use std::{fmt, str::FromStr};

use bitcoin::p2p::Magic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::faircoin::consensus::Params;

/// Errors that can occur when parsing a chain type.
#[derive(Clone, Debug, Error)]
pub enum ChainTypeError {
    /// The provided chain type string is invalid.
    #[error("Invalid chain type: {0}")]
    InvalidChainType(String),
}

/// Error for network magic bytes that belong to no supported network.
#[derive(Clone, Copy, Debug, Error)]
#[error("Unknown network magic: {0}")]
pub struct UnknownMagicError(Magic);

/// The FairCoin network variants.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Network {
    /// Main production network.
    #[serde(rename = "faircoin", alias = "mainnet")]
    Mainnet,
    /// Test network.
    #[serde(rename = "faircointestnet", alias = "testnet")]
    Testnet,
}

impl Network {
    /// Every supported network, in declaration order.
    pub const ALL: [Network; 2] = [Network::Mainnet, Network::Testnet];

    /// Converts a magic value to the corresponding Network variant.
    ///
    /// # Returns
    ///
    /// * `Some(Network)` - The corresponding network if the magic is recognized
    /// * `None` - If the magic bytes don't match any known network
    pub fn from_magic(magic: Magic) -> Option<Network> {
        Network::try_from(magic).ok()
    }

    /// Returns the magic bytes for this network.
    pub fn magic(self) -> Magic {
        Magic::from(self)
    }

    /// Returns the string representation of this network.
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "faircoin",
            Network::Testnet => "faircointestnet",
        }
    }

    /// Returns the raw constant table for this network.
    ///
    /// The table is unvalidated; use
    /// [`NetworkParameters::for_network`](crate::faircoin::params::NetworkParameters::for_network)
    /// for the checked, memoized form.
    pub fn consensus_params(self) -> Params {
        match self {
            Network::Mainnet => Params::MAINNET,
            Network::Testnet => Params::TESTNET,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Network> for Magic {
    fn from(network: Network) -> Self {
        Magic::from_bytes(network.consensus_params().packet_magic.to_be_bytes())
    }
}

impl TryFrom<Magic> for Network {
    type Error = UnknownMagicError;

    fn try_from(magic: Magic) -> Result<Self, Self::Error> {
        Network::ALL
            .into_iter()
            .find(|network| network.magic() == magic)
            .ok_or(UnknownMagicError(magic))
    }
}

impl FromStr for Network {
    type Err = ChainTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Network::try_from(s)
    }
}

impl TryFrom<&str> for Network {
    type Error = ChainTypeError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "faircoin" | "mainnet" | "main" => Ok(Network::Mainnet),
            "faircointestnet" | "testnet" | "test" => Ok(Network::Testnet),
            other => Err(ChainTypeError::InvalidChainType(other.to_string())),
        }
    }
}

impl TryFrom<String> for Network {
    type Error = ChainTypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Network::try_from(s.as_str())
    }
}
