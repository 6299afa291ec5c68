use crate::faircoin::network::Network;

/// Blocks between difficulty retargets.
pub const INTERVAL: u32 = 2016;
/// Expected duration of one retarget interval, in seconds.
pub const TARGET_TIMESPAN: u32 = 14 * 24 * 60 * 60; // two weeks

/// Built-in constant table for one network.
///
/// Values are kept in their textual form exactly as published. They are
/// parsed and cross-checked by
/// [`NetworkParameters`](crate::faircoin::params::NetworkParameters); nothing
/// should read these fields directly without going through that type.
#[derive(Debug, Clone, Copy)]
pub struct Params {
    /// Network for which these parameters are defined.
    pub network: Network,
    /// Stable identifier of the network.
    pub id: &'static str,
    /// Hex SEC1 encoding of the key that signs sync-checkpoints.
    pub checkpoint_signing_key: &'static str,
    /// Message start bytes, big-endian as they appear on the wire.
    pub packet_magic: u32,
    /// Default P2P port.
    pub port: u16,
    /// Version byte of pay-to-pubkey-hash addresses.
    pub address_header: u8,
    /// Version byte of pay-to-script-hash addresses.
    pub p2sh_header: u8,
    /// Version byte of dumped (WIF) private keys.
    pub dumped_private_key_header: u8,
    /// Difficulty retarget interval, in blocks.
    pub interval: u32,
    /// Difficulty retarget timespan, in seconds.
    pub target_timespan: u32,
    /// Easiest allowed target, compact encoding.
    pub max_target_bits: u32,
    /// Blocks between block subsidy halvings.
    pub subsidy_decrease_block_count: u32,
    /// Confirmations before a coinbase output may be spent.
    pub spendable_coinbase_depth: u32,
    /// Pinned `(height, block hash)` pairs, hashes in display order.
    pub checkpoints: &'static [(u32, &'static str)],
    /// DNS seeds used for peer discovery.
    pub dns_seeds: &'static [&'static str],
    /// Payment protocol network id, if the network supports it.
    pub payment_protocol_id: Option<&'static str>,
}

impl Params {
    /// Constants for the FairCoin production network.
    pub const MAINNET: Self = Self {
        network: Network::Mainnet,
        id: "org.bitcoin.production",
        checkpoint_signing_key: "04b81f9a8d519834e3e35d46c6a3526ec317408a256f54f54cf54ffe8514ce702b705129a53a63f90af8796bb4a2633ffde7522b900f4ce253db92b7a2c799cfab",
        packet_magic: 0xe4e8_e9e5,
        port: 46392,
        address_header: 95,
        p2sh_header: 36,
        dumped_private_key_header: 223,
        interval: INTERVAL,
        target_timespan: TARGET_TIMESPAN,
        max_target_bits: 0x1e0f_ffff,
        subsidy_decrease_block_count: 210_000,
        spendable_coinbase_depth: 100,
        // Blocks that are not BIP30 compliant, at a minimum.
        checkpoints: &[
            (40_000, "5346de84305836f881fb15a884088286bf23d3361e8e1e9d0b58916c46817801"),
            (80_000, "f6f8b3d1334057117fddc385dabfbc3bce3826e170985c804af914db99a1f7f6"),
            (94_614, "31d3eef28d9c6c1a15d7b12571d93ab563cbd661f06a2d47d2fb0323e6fca1aa"),
        ],
        dns_seeds: &["seed1.fair-coin.org", "seed2.fair-coin.org"],
        payment_protocol_id: Some("main"),
    };
    /// Constants for the FairCoin test network.
    pub const TESTNET: Self = Self {
        network: Network::Testnet,
        id: "org.bitcoin.test",
        checkpoint_signing_key: "04e6951f77356e7998fa968caedfc0aab07e3bb733a85a33930812d6aa23d8b518e3bda6033079934381527b99cda27ae2584e3a9e4f7c48b51bc7641c0cb9a1d5",
        packet_magic: 0xfabf_b5da,
        port: 18392,
        address_header: 111,
        p2sh_header: 196,
        dumped_private_key_header: 239,
        interval: INTERVAL,
        target_timespan: TARGET_TIMESPAN,
        max_target_bits: 0x1e0f_ffff,
        subsidy_decrease_block_count: 210_000,
        spendable_coinbase_depth: 100,
        checkpoints: &[],
        dns_seeds: &[],
        payment_protocol_id: None,
    };
}
