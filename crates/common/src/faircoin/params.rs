//! Validated per-network parameters.
//!
//! [`NetworkParameters`] turns a network's constant table
//! ([`Params`](crate::faircoin::consensus::Params)) and genesis anchor
//! ([`GenesisInfo`]) into parsed, cross-checked values. Each network's
//! instance is built at most once per process and shared read-only.

use std::{collections::BTreeMap, str::FromStr, sync::OnceLock};

use bitcoin::{
    CompactTarget,
    p2p::Magic,
    secp256k1::{self, PublicKey},
};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::faircoin::{
    blockdata::{block::BlockHash, genesis::GenesisInfo},
    consensus::Params,
    network::Network,
    pow::Target,
};

/// Defects in a built-in constant table.
///
/// These mean the compiled-in constants are corrupt, not that an input was
/// bad.
#[derive(Debug, Error)]
pub enum ParamsError {
    /// The checkpoint signing key is not a valid secp256k1 public key.
    #[error("invalid checkpoint signing key for {network}: {source}")]
    SigningKey {
        /// Network whose table is corrupt.
        network: Network,
        /// Parse failure.
        source: secp256k1::Error,
    },
    /// A checkpoint hash is not 64 hex characters.
    #[error("invalid checkpoint hash at height {height} for {network}: {source}")]
    Checkpoint {
        /// Network whose table is corrupt.
        network: Network,
        /// Height of the bad entry.
        height: u32,
        /// Parse failure.
        source: <BlockHash as FromStr>::Err,
    },
    /// The same height is pinned twice.
    #[error("duplicate checkpoint at height {height} for {network}")]
    DuplicateCheckpoint {
        /// Network whose table is corrupt.
        network: Network,
        /// Repeated height.
        height: u32,
    },
    /// The maximum target does not decode.
    #[error("invalid maximum target {bits:#010x} for {network}")]
    MaxTarget {
        /// Network whose table is corrupt.
        network: Network,
        /// Offending compact target.
        bits: u32,
    },
    /// The rebuilt genesis header does not hash to the expected value.
    #[error("genesis hash mismatch for {network}: expected {expected}, computed {computed}")]
    GenesisMismatch {
        /// Network whose table is corrupt.
        network: Network,
        /// Hash listed in the genesis anchor.
        expected: BlockHash,
        /// Hash of the header rebuilt from the anchor's fields.
        computed: BlockHash,
    },
}

/// Parsed, self-checked parameters of one network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkParameters {
    network: Network,
    id: &'static str,
    checkpoint_signing_key: PublicKey,
    genesis: GenesisInfo,
    checkpoints: BTreeMap<u32, BlockHash>,
    magic: Magic,
    port: u16,
    address_header: u8,
    p2sh_header: u8,
    dumped_private_key_header: u8,
    interval: u32,
    target_timespan: u32,
    max_target: Target,
    subsidy_decrease_block_count: u32,
    spendable_coinbase_depth: u32,
    dns_seeds: &'static [&'static str],
    payment_protocol_id: Option<&'static str>,
}

static MAINNET: OnceLock<NetworkParameters> = OnceLock::new();
static TESTNET: OnceLock<NetworkParameters> = OnceLock::new();

impl NetworkParameters {
    /// Returns the process-wide parameters for `network`.
    ///
    /// The first call for a network builds and checks the parameters;
    /// concurrent first calls still build them only once. Later calls return
    /// the same instance.
    ///
    /// # Panics
    ///
    /// If the built-in constants of `network` fail their self-check. That is a
    /// build defect and the process must not continue with such constants.
    #[allow(clippy::panic, reason = "Corrupt compiled-in constants are unrecoverable")]
    pub fn for_network(network: Network) -> &'static NetworkParameters {
        let cell = match network {
            Network::Mainnet => &MAINNET,
            Network::Testnet => &TESTNET,
        };
        cell.get_or_init(|| match NetworkParameters::new(network) {
            Ok(params) => params,
            Err(err) => {
                error!(%network, %err, "built-in network parameters are corrupt");
                panic!("corrupt built-in parameters for {network}: {err}")
            }
        })
    }

    /// Builds fresh parameters for `network` from its built-in tables.
    ///
    /// Prefer [`for_network`](Self::for_network), which memoizes.
    pub fn new(network: Network) -> Result<Self, ParamsError> {
        Self::from_parts(&network.consensus_params(), GenesisInfo::for_network(network))
    }

    /// Builds parameters from an explicit constant table and genesis anchor.
    ///
    /// # Errors
    ///
    /// Any [`ParamsError`]; in particular `GenesisMismatch` if `genesis`
    /// can be rebuilt and does not hash to its own `hash` field. A genesis
    /// without a merkle root is accepted as published.
    pub fn from_parts(params: &Params, genesis: GenesisInfo) -> Result<Self, ParamsError> {
        let network = params.network;

        let checkpoint_signing_key = PublicKey::from_str(params.checkpoint_signing_key)
            .map_err(|source| ParamsError::SigningKey { network, source })?;

        let max_target = Target::from_compact(CompactTarget::from_consensus(params.max_target_bits))
            .ok_or(ParamsError::MaxTarget {
                network,
                bits: params.max_target_bits,
            })?;

        let mut checkpoints = BTreeMap::new();
        for &(height, hash) in params.checkpoints {
            let hash = BlockHash::from_str(hash).map_err(|source| ParamsError::Checkpoint {
                network,
                height,
                source,
            })?;
            if checkpoints.insert(height, hash).is_some() {
                return Err(ParamsError::DuplicateCheckpoint { network, height });
            }
        }

        match genesis.computed_hash() {
            Some(computed) if computed != genesis.hash => {
                return Err(ParamsError::GenesisMismatch {
                    network,
                    expected: genesis.hash,
                    computed,
                });
            }
            Some(_) => {}
            None => warn!(
                %network,
                genesis = %genesis.hash,
                "genesis merkle root unknown, genesis hash not self-checked"
            ),
        }

        debug!(
            %network,
            genesis = %genesis.hash,
            checkpoints = checkpoints.len(),
            "network parameters constructed"
        );

        Ok(Self {
            network,
            id: params.id,
            checkpoint_signing_key,
            genesis,
            checkpoints,
            magic: Magic::from_bytes(params.packet_magic.to_be_bytes()),
            port: params.port,
            address_header: params.address_header,
            p2sh_header: params.p2sh_header,
            dumped_private_key_header: params.dumped_private_key_header,
            interval: params.interval,
            target_timespan: params.target_timespan,
            max_target,
            subsidy_decrease_block_count: params.subsidy_decrease_block_count,
            spendable_coinbase_depth: params.spendable_coinbase_depth,
            dns_seeds: params.dns_seeds,
            payment_protocol_id: params.payment_protocol_id,
        })
    }

    /// Network these parameters describe.
    pub fn network(&self) -> Network {
        self.network
    }

    /// Stable identifier of the network.
    pub fn id(&self) -> &'static str {
        self.id
    }

    /// Key that signs sync-checkpoints on this network.
    pub fn checkpoint_signing_key(&self) -> &PublicKey {
        &self.checkpoint_signing_key
    }

    /// Genesis anchor.
    pub fn genesis(&self) -> &GenesisInfo {
        &self.genesis
    }

    /// Published hash of the genesis block.
    pub fn genesis_hash(&self) -> BlockHash {
        self.genesis.hash
    }

    /// Pinned block hashes by height.
    pub fn checkpoints(&self) -> &BTreeMap<u32, BlockHash> {
        &self.checkpoints
    }

    /// Whether `height` is pinned.
    pub fn is_checkpoint(&self, height: u32) -> bool {
        self.checkpoints.contains_key(&height)
    }

    /// Returns `false` only if `height` is pinned to a different hash.
    pub fn passes_checkpoint(&self, height: u32, hash: BlockHash) -> bool {
        self.checkpoints
            .get(&height)
            .is_none_or(|pinned| *pinned == hash)
    }

    /// Highest pinned height, if any.
    pub fn last_checkpoint_height(&self) -> Option<u32> {
        self.checkpoints.keys().next_back().copied()
    }

    /// Message start bytes.
    pub fn magic(&self) -> Magic {
        self.magic
    }

    /// Default P2P port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Version byte of pay-to-pubkey-hash addresses.
    pub fn address_header(&self) -> u8 {
        self.address_header
    }

    /// Version byte of pay-to-script-hash addresses.
    pub fn p2sh_header(&self) -> u8 {
        self.p2sh_header
    }

    /// Address version bytes this network accepts.
    pub fn acceptable_address_codes(&self) -> [u8; 2] {
        [self.address_header, self.p2sh_header]
    }

    /// Version byte of dumped private keys.
    pub fn dumped_private_key_header(&self) -> u8 {
        self.dumped_private_key_header
    }

    /// Blocks between difficulty retargets.
    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// Seconds each retarget interval should take.
    pub fn target_timespan(&self) -> u32 {
        self.target_timespan
    }

    /// Easiest target a block may claim.
    pub fn max_target(&self) -> Target {
        self.max_target
    }

    /// Blocks between subsidy halvings.
    pub fn subsidy_decrease_block_count(&self) -> u32 {
        self.subsidy_decrease_block_count
    }

    /// Confirmations before a coinbase output is spendable.
    pub fn spendable_coinbase_depth(&self) -> u32 {
        self.spendable_coinbase_depth
    }

    /// DNS seeds for peer discovery.
    pub fn dns_seeds(&self) -> &'static [&'static str] {
        self.dns_seeds
    }

    /// Payment protocol network id, if supported.
    pub fn payment_protocol_id(&self) -> Option<&'static str> {
        self.payment_protocol_id
    }
}
