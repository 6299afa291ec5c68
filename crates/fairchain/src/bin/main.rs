//! Command line tool for the FairCoin consensus boundary.
//!
//! Inspects network parameters, computes proof-of-work hashes of raw headers,
//! and decodes, verifies and issues sync-checkpoints.

use std::str::FromStr;

use bitcoin::secp256k1::SecretKey;
use clap::{Parser, Subcommand};
use fairchain_common::faircoin::{
    blockdata::{
        block::{BlockHash, InnerHeader, PowHeader},
        genesis::GenesisInfo,
    },
    checkpoint::{CheckpointMessage, CheckpointPayload},
    consensus::deserialize,
    network::Network,
    params::NetworkParameters,
    pow::{AlgorithmTag, PowAlgorithm, compute_pow_hash},
};
use serde::Serialize;
use tracing::{debug, info, warn};
use tracing_subscriber::{
    EnvFilter, Registry, fmt::time::ChronoUtc, layer::SubscriberExt, util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "fairchain")]
#[command(author, version, about = "Inspect FairCoin checkpoints, proof-of-work hashes and network parameters.", long_about = None)]
struct Args {
    /// Use the specified network (mainnet, testnet).
    #[arg(short, long, global = true, default_value = "mainnet")]
    network: Network,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Disable colored output.
    #[arg(long, global = true, default_value_t = false)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the network's parameters as JSON.
    Params,
    /// Compute the proof-of-work hash of a serialized block header.
    PowHash {
        /// Header bytes as hex.
        header: String,
        /// Algorithm tag carried by the block.
        #[arg(short, long, default_value_t = 0)]
        algorithm: u8,
        /// Also check the hash against the header's own target.
        #[arg(long, default_value_t = false)]
        check: bool,
    },
    /// Decode a checkpoint and verify it against the network's signing key.
    VerifyCheckpoint {
        /// Encoded checkpoint as hex.
        envelope: String,
    },
    /// Build and sign a checkpoint.
    SignCheckpoint {
        /// Hash of the block to pin.
        hash: String,
        /// Signing key as hex.
        #[arg(long)]
        secret_key: String,
    },
}

#[derive(Serialize)]
struct ParamsReport<'a> {
    network: Network,
    id: &'a str,
    genesis: &'a GenesisInfo,
    checkpoint_signing_key: String,
    magic: String,
    port: u16,
    address_header: u8,
    p2sh_header: u8,
    dumped_private_key_header: u8,
    interval: u32,
    target_timespan: u32,
    max_target_bits: u32,
    checkpoints: Vec<(u32, BlockHash)>,
    dns_seeds: &'a [&'a str],
}

#[derive(Serialize)]
struct CheckpointReport {
    version: u32,
    checkpoint_hash: BlockHash,
    signature_valid: bool,
    pinned_height: Option<u32>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    init_tracing(&args)?;

    let params = NetworkParameters::for_network(args.network);
    info!(network = %params.network(), genesis = %params.genesis_hash(), "loaded network parameters");

    match &args.command {
        Command::Params => print_params(params)?,
        Command::PowHash {
            header,
            algorithm,
            check,
        } => pow_hash(params, header, AlgorithmTag(*algorithm), *check)?,
        Command::VerifyCheckpoint { envelope } => verify_checkpoint(params, envelope)?,
        Command::SignCheckpoint { hash, secret_key } => sign_checkpoint(hash, secret_key)?,
    }

    Ok(())
}

fn print_params(params: &NetworkParameters) -> Result<(), Box<dyn std::error::Error>> {
    let report = ParamsReport {
        network: params.network(),
        id: params.id(),
        genesis: params.genesis(),
        checkpoint_signing_key: params.checkpoint_signing_key().to_string(),
        magic: params.magic().to_string(),
        port: params.port(),
        address_header: params.address_header(),
        p2sh_header: params.p2sh_header(),
        dumped_private_key_header: params.dumped_private_key_header(),
        interval: params.interval(),
        target_timespan: params.target_timespan(),
        max_target_bits: params
            .max_target()
            .to_compact()
            .map(|bits| bits.to_consensus())
            .unwrap_or_default(),
        checkpoints: params.checkpoints().iter().map(|(h, b)| (*h, *b)).collect(),
        dns_seeds: params.dns_seeds(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn pow_hash(
    params: &NetworkParameters,
    header_hex: &str,
    tag: AlgorithmTag,
    check: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = hex::decode(header_hex.trim())?;
    if PowAlgorithm::from_tag(tag).is_none() {
        warn!(tag = tag.0, "unknown algorithm tag, hashing with {}", PowAlgorithm::DEFAULT.name());
    }

    if !check {
        println!("{}", compute_pow_hash(&bytes, tag));
        return Ok(());
    }

    let header = PowHeader::new(deserialize::<InnerHeader>(&bytes)?, tag);
    let target = header.target().ok_or("header carries an invalid target")?;
    if target > params.max_target() {
        warn!("header target is easier than the network maximum");
    }
    match header.validate_pow(target) {
        Ok(hash) => println!("{hash} meets target"),
        Err(err) => println!("{} fails: {err}", header.pow_hash()),
    }
    Ok(())
}

fn verify_checkpoint(
    params: &NetworkParameters,
    envelope_hex: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = hex::decode(envelope_hex.trim())?;
    let message = CheckpointMessage::decode(&bytes)?;
    debug!(%message, version = message.version(), "decoded checkpoint");

    let pinned_height = params
        .checkpoints()
        .iter()
        .find(|(_, hash)| **hash == message.checkpoint_hash())
        .map(|(height, _)| *height);

    let report = CheckpointReport {
        version: message.version(),
        checkpoint_hash: message.checkpoint_hash(),
        signature_valid: message.is_signature_valid_for(params),
        pinned_height,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn sign_checkpoint(hash: &str, secret_key: &str) -> Result<(), Box<dyn std::error::Error>> {
    let checkpoint_hash = BlockHash::from_str(hash)?;
    let secret_key = SecretKey::from_str(secret_key.trim())?;

    let message = CheckpointMessage::sign(CheckpointPayload::new(checkpoint_hash), &secret_key);
    info!(%message, "signed checkpoint");
    println!("{}", hex::encode(message.encode()));
    Ok(())
}

fn init_tracing(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let level = match args.log_level.as_str() {
        "error" => tracing::Level::ERROR,
        "warn" => tracing::Level::WARN,
        "info" => tracing::Level::INFO,
        "debug" => tracing::Level::DEBUG,
        "trace" => tracing::Level::TRACE,
        _ => {
            eprintln!(
                "Invalid log level: {}. Using 'info' as default.",
                args.log_level
            );
            tracing::Level::INFO
        }
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let use_ansi = std::io::IsTerminal::is_terminal(&std::io::stderr()) && !args.no_color;

    // Logs go to stderr so command output stays machine readable.
    let subscriber = Registry::default().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_level(true)
            .with_target(true)
            .with_ansi(use_ansi)
            .with_timer(ChronoUtc::rfc_3339()),
    );

    subscriber.try_init()?;

    Ok(())
}
