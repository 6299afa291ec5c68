//! Signed sync-checkpoint messages.
//!
//! Checkpoints are broadcast on the peer-to-peer network by the holder of a
//! hard-coded signing key and pin a known-good block hash, protecting the
//! chain against unwanted forks.
//!
//! A checkpoint has two layers:
//!
//! - a [`SignedEnvelope`]: an opaque `content` byte array and a DER ECDSA
//!   `signature` over `sha256d(content)`;
//! - a [`CheckpointPayload`]: the `version` and `checkpoint_hash` fields that
//!   `content` carries.
//!
//! Decoding and verification are separate steps. A decoded
//! [`CheckpointMessage`] means nothing until
//! [`CheckpointMessage::is_signature_valid`] returns `true` for the network's
//! trusted key.

use std::{fmt, sync::LazyLock};

use bitcoin::secp256k1::{
    Message, PublicKey, Secp256k1, SecretKey, VerifyOnly, ecdsa::Signature,
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::faircoin::{
    blockdata::block::BlockHash,
    consensus::{
        ConsensusCodec, EncodeDecodeError, VarInt, deserialize_partial, serialize,
    },
    hashes::{Hash, double_digest},
    params::NetworkParameters,
};

static VERIFIER: LazyLock<Secp256k1<VerifyOnly>> = LazyLock::new(Secp256k1::verification_only);

/// Why a checkpoint envelope could not be decoded.
#[derive(Debug, Error)]
pub enum EnvelopeFault {
    /// A length prefix or field ran past the end of the input, or a var-int
    /// was not minimally encoded.
    ///
    /// Non-minimal length prefixes are rejected even though older peers
    /// accepted them; signers always write the minimal form.
    #[error("truncated or invalid encoding: {0}")]
    Encoding(#[from] EncodeDecodeError),
    /// The inner payload did not occupy exactly its declared length.
    #[error("inner payload consumed {consumed} bytes but declares {declared}")]
    InnerLength {
        /// Length announced by the inner length prefix.
        declared: u64,
        /// Bytes actually read for version and hash.
        consumed: usize,
    },
    /// Bytes were left over after the envelope.
    #[error("{0} trailing bytes after the envelope")]
    TrailingBytes(usize),
}

/// Errors produced while decoding a checkpoint.
///
/// A message that fails to decode must be discarded whole.
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// The bytes are not a well-formed checkpoint envelope.
    #[error("malformed checkpoint envelope: {0}")]
    MalformedEnvelope(#[from] EnvelopeFault),
}

impl From<EncodeDecodeError> for CheckpointError {
    fn from(err: EncodeDecodeError) -> Self {
        CheckpointError::MalformedEnvelope(EnvelopeFault::Encoding(err))
    }
}

/// Outer layer of a checkpoint: opaque content and a signature over it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, ConsensusCodec)]
pub struct SignedEnvelope {
    content: Vec<u8>,
    signature: Vec<u8>,
}

impl SignedEnvelope {
    /// Wraps already signed content.
    pub fn new(content: Vec<u8>, signature: Vec<u8>) -> Self {
        Self { content, signature }
    }

    /// Signs `content` with `secret_key`.
    ///
    /// Only tooling that issues checkpoints needs this.
    pub fn sign(content: Vec<u8>, secret_key: &SecretKey) -> Self {
        let secp = Secp256k1::signing_only();
        let signature = secp
            .sign_ecdsa(&signing_message(&content), secret_key)
            .serialize_der()
            .to_vec();
        Self { content, signature }
    }

    /// The signed bytes, exactly as received.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// DER encoded ECDSA signature.
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Checks the signature over the full content against `key`.
    ///
    /// Signatures are parsed leniently and normalised to low-S before
    /// verification. Anything that fails to parse or verify yields `false`.
    pub fn verify(&self, key: &PublicKey) -> bool {
        let Ok(mut signature) = Signature::from_der_lax(&self.signature) else {
            debug!("checkpoint signature is not DER encoded");
            return false;
        };
        signature.normalize_s();
        VERIFIER
            .verify_ecdsa(&signing_message(&self.content), &signature, key)
            .is_ok()
    }
}

fn signing_message(content: &[u8]) -> Message {
    Message::from_digest(double_digest(content).to_byte_array())
}

/// Inner layer of a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ConsensusCodec)]
pub struct CheckpointPayload {
    version: u32,
    checkpoint_hash: BlockHash,
}

impl CheckpointPayload {
    /// Version written by this implementation.
    pub const CURRENT_VERSION: u32 = 1;

    /// Creates a current-version payload pinning `checkpoint_hash`.
    pub fn new(checkpoint_hash: BlockHash) -> Self {
        Self::with_version(Self::CURRENT_VERSION, checkpoint_hash)
    }

    /// Creates a payload with an explicit version.
    pub fn with_version(version: u32, checkpoint_hash: BlockHash) -> Self {
        Self {
            version,
            checkpoint_hash,
        }
    }

    /// Payload format version. Consumers must reject versions they do not
    /// understand.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Hash of the pinned block.
    pub fn checkpoint_hash(&self) -> BlockHash {
        self.checkpoint_hash
    }

    /// Replaces the pinned hash before signing.
    pub fn set_checkpoint_hash(&mut self, checkpoint_hash: BlockHash) {
        self.checkpoint_hash = checkpoint_hash;
    }

    /// Re-reads the payload from the start of an encoded envelope.
    ///
    /// The leading var-int is the content length; the version and hash that
    /// follow it must occupy exactly that many bytes.
    fn read_from_envelope(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let (VarInt(declared), prefix_len) = deserialize_partial::<VarInt>(bytes)?;
        let rest = bytes.get(prefix_len..).unwrap_or_default();
        let (payload, consumed) = deserialize_partial::<CheckpointPayload>(rest)?;
        if u64::try_from(consumed).ok() != Some(declared) {
            return Err(EnvelopeFault::InnerLength { declared, consumed }.into());
        }
        Ok(payload)
    }
}

/// A decoded sync-checkpoint.
///
/// Before doing anything with a checkpoint, check
/// [`is_signature_valid`](Self::is_signature_valid).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointMessage {
    envelope: SignedEnvelope,
    payload: CheckpointPayload,
}

impl CheckpointMessage {
    /// Decodes a checkpoint from its wire form.
    ///
    /// # Errors
    ///
    /// * `CheckpointError::MalformedEnvelope` - If a length prefix overruns
    ///   the input, the inner payload does not match its declared length, or
    ///   bytes remain after the envelope
    pub fn decode(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let (envelope, consumed) = deserialize_partial::<SignedEnvelope>(bytes)?;
        let trailing = bytes.len().saturating_sub(consumed);
        if trailing != 0 {
            return Err(EnvelopeFault::TrailingBytes(trailing).into());
        }

        let payload = CheckpointPayload::read_from_envelope(bytes)?;
        Ok(Self { envelope, payload })
    }

    /// Builds and signs a checkpoint for `payload`.
    pub fn sign(payload: CheckpointPayload, secret_key: &SecretKey) -> Self {
        let envelope = SignedEnvelope::sign(serialize(&payload), secret_key);
        Self { envelope, payload }
    }

    /// Encodes the checkpoint in its wire form.
    pub fn encode(&self) -> Vec<u8> {
        serialize(&self.envelope)
    }

    /// Whether the signature verifies against `key`.
    ///
    /// Don't do anything with a checkpoint whose signature does not verify:
    /// that would let any peer rewrite the chain.
    pub fn is_signature_valid(&self, key: &PublicKey) -> bool {
        let valid = self.envelope.verify(key);
        if !valid {
            warn!(checkpoint = %self.payload.checkpoint_hash, "rejecting checkpoint with invalid signature");
        }
        valid
    }

    /// Whether the signature verifies against the network's trusted key.
    pub fn is_signature_valid_for(&self, params: &NetworkParameters) -> bool {
        self.is_signature_valid(params.checkpoint_signing_key())
    }

    /// The outer signed layer.
    pub fn envelope(&self) -> &SignedEnvelope {
        &self.envelope
    }

    /// The parsed inner layer.
    pub fn payload(&self) -> &CheckpointPayload {
        &self.payload
    }

    /// Payload format version.
    pub fn version(&self) -> u32 {
        self.payload.version
    }

    /// Hash of the pinned block.
    pub fn checkpoint_hash(&self) -> BlockHash {
        self.payload.checkpoint_hash
    }
}

impl fmt::Display for CheckpointMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sync-checkpoint: {}", self.payload.checkpoint_hash)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::faircoin::{consensus::Decodable, io::Read, network::Network};

    const HEIGHT_40000: &str = "5346de84305836f881fb15a884088286bf23d3361e8e1e9d0b58916c46817801";

    fn signing_key() -> (SecretKey, PublicKey) {
        let secp = Secp256k1::new();
        let secret = SecretKey::from_slice(&[0x42; 32]).unwrap();
        let public = PublicKey::from_secret_key(&secp, &secret);
        (secret, public)
    }

    fn signed_bytes(hash: BlockHash) -> Vec<u8> {
        let (secret, _) = signing_key();
        CheckpointMessage::sign(CheckpointPayload::new(hash), &secret).encode()
    }

    fn sample_hash() -> BlockHash {
        BlockHash::from_str(HEIGHT_40000).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let (_, public) = signing_key();
        let bytes = signed_bytes(sample_hash());

        let message = CheckpointMessage::decode(&bytes).unwrap();
        assert_eq!(message.version(), CheckpointPayload::CURRENT_VERSION);
        assert_eq!(message.checkpoint_hash(), sample_hash());
        assert!(message.is_signature_valid(&public));
        assert_eq!(message.encode(), bytes);
    }

    #[test]
    fn test_wire_layout() {
        let bytes = signed_bytes(sample_hash());
        let message = CheckpointMessage::decode(&bytes).unwrap();
        let signature_len = message.envelope().signature().len();

        // content: var-int 36, version 1 LE, hash in consensus order
        assert_eq!(bytes[0], 36);
        assert_eq!(&bytes[1..5], &[1, 0, 0, 0]);
        assert_eq!(&bytes[5..37], sample_hash().as_byte_array());
        assert_eq!(usize::from(bytes[37]), signature_len);
        assert_eq!(bytes.len(), 38 + signature_len);
        assert_eq!(message.envelope().content(), &bytes[1..37]);
    }

    #[test]
    fn test_signature_from_other_key_is_invalid() {
        let bytes = signed_bytes(sample_hash());
        let message = CheckpointMessage::decode(&bytes).unwrap();
        for network in Network::ALL {
            let params = NetworkParameters::for_network(network);
            assert!(!message.is_signature_valid_for(params));
        }
    }

    #[test]
    fn test_any_flipped_content_bit_invalidates_signature() {
        let (_, public) = signing_key();
        let bytes = signed_bytes(sample_hash());

        for byte in 1..37 {
            for bit in 0..8 {
                let mut tampered = bytes.clone();
                tampered[byte] ^= 1 << bit;

                let message = CheckpointMessage::decode(&tampered)
                    .expect("tampered content still decodes");
                assert!(!message.is_signature_valid(&public), "byte {byte} bit {bit}");
            }
        }
    }

    #[test]
    fn test_tampered_hash_is_still_readable() {
        let (_, public) = signing_key();
        let mut bytes = signed_bytes(sample_hash());
        bytes[5] ^= 0x01;

        let message = CheckpointMessage::decode(&bytes).unwrap();
        assert_ne!(message.checkpoint_hash(), sample_hash());
        assert!(!message.is_signature_valid(&public));
    }

    #[test]
    fn test_truncation_is_rejected() {
        let bytes = signed_bytes(sample_hash());
        for len in 0..bytes.len() {
            let result = CheckpointMessage::decode(&bytes[..len]);
            assert!(
                matches!(result, Err(CheckpointError::MalformedEnvelope(_))),
                "prefix of {len} bytes decoded"
            );
        }
    }

    #[test]
    fn test_non_minimal_length_prefix_is_rejected() {
        let bytes = signed_bytes(sample_hash());
        // 36 written as a three-byte var-int.
        let mut padded = vec![0xfd, 36, 0];
        padded.extend_from_slice(&bytes[1..]);

        assert!(matches!(
            CheckpointMessage::decode(&padded),
            Err(CheckpointError::MalformedEnvelope(EnvelopeFault::Encoding(_)))
        ));
    }

    #[test]
    fn test_codec_decodes_from_plain_reader() {
        fn decode_payload<R: Read + ?Sized>(
            reader: &mut R,
        ) -> Result<CheckpointPayload, EncodeDecodeError> {
            CheckpointPayload::consensus_decode_from_finite_reader(reader)
        }

        let payload = CheckpointPayload::new(sample_hash());
        let bytes = serialize(&payload);
        let mut reader: &[u8] = &bytes;

        assert_eq!(decode_payload(&mut reader).unwrap(), payload);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_trailing_bytes_are_rejected() {
        let mut bytes = signed_bytes(sample_hash());
        bytes.push(0);
        assert!(matches!(
            CheckpointMessage::decode(&bytes),
            Err(CheckpointError::MalformedEnvelope(EnvelopeFault::TrailingBytes(1)))
        ));
    }

    #[test]
    fn test_inner_length_mismatch_is_rejected() {
        let (secret, _) = signing_key();
        let mut content = serialize(&CheckpointPayload::new(sample_hash()));

        content.push(0xaa);
        let long = SignedEnvelope::sign(content.clone(), &secret);
        assert!(matches!(
            CheckpointMessage::decode(&serialize(&long)),
            Err(CheckpointError::MalformedEnvelope(EnvelopeFault::InnerLength {
                declared: 37,
                consumed: 36
            }))
        ));

        content.truncate(30);
        let short = SignedEnvelope::sign(content, &secret);
        assert!(matches!(
            CheckpointMessage::decode(&serialize(&short)),
            Err(CheckpointError::MalformedEnvelope(EnvelopeFault::InnerLength {
                declared: 30,
                ..
            }))
        ));
    }

    #[test]
    fn test_garbage_signature_is_invalid_not_an_error() {
        let (_, public) = signing_key();
        let content = serialize(&CheckpointPayload::new(sample_hash()));
        let envelope = SignedEnvelope::new(content, vec![0x30, 0x01, 0x02]);

        let message = CheckpointMessage::decode(&serialize(&envelope)).unwrap();
        assert!(!message.is_signature_valid(&public));
    }

    #[test]
    fn test_high_s_signature_is_accepted() {
        let secp = Secp256k1::new();
        let (secret, public) = signing_key();
        let content = serialize(&CheckpointPayload::new(sample_hash()));

        let low = secp.sign_ecdsa(&signing_message(&content), &secret);
        // Negate s by hand: s' = n - s.
        let mut compact = low.serialize_compact();
        let order = bitcoin::secp256k1::constants::CURVE_ORDER;
        let mut borrow = 0u16;
        for i in (32..64).rev() {
            let lhs = u16::from(order[i - 32]);
            let rhs = u16::from(compact[i]) + borrow;
            let (diff, next) = if lhs >= rhs { (lhs - rhs, 0) } else { (lhs + 256 - rhs, 1) };
            compact[i] = diff as u8;
            borrow = next;
        }
        let high = Signature::from_compact(&compact).unwrap();
        assert_ne!(high, low);

        let envelope = SignedEnvelope::new(content, high.serialize_der().to_vec());
        assert!(envelope.verify(&public));
    }

    #[test]
    fn test_unknown_version_still_decodes() {
        let (secret, public) = signing_key();
        let payload = CheckpointPayload::with_version(7, sample_hash());
        let bytes = CheckpointMessage::sign(payload, &secret).encode();

        let message = CheckpointMessage::decode(&bytes).unwrap();
        assert_eq!(message.version(), 7);
        assert!(message.is_signature_valid(&public));
    }

    #[test]
    fn test_set_checkpoint_hash() {
        let mut payload = CheckpointPayload::new(BlockHash::all_zeros());
        payload.set_checkpoint_hash(sample_hash());
        assert_eq!(payload.checkpoint_hash(), sample_hash());
        assert_eq!(payload.version(), 1);
    }

    #[test]
    fn test_builtin_checkpoint_at_height_40000() {
        let (_, public) = signing_key();
        let params = NetworkParameters::for_network(Network::Mainnet);
        let pinned = params.checkpoints()[&40_000];

        let message = CheckpointMessage::decode(&signed_bytes(pinned)).unwrap();
        assert!(message.is_signature_valid(&public));
        assert_eq!(message.checkpoint_hash(), sample_hash());
        assert!(params.passes_checkpoint(40_000, message.checkpoint_hash()));
    }

    #[test]
    fn test_display() {
        let message = CheckpointMessage::decode(&signed_bytes(sample_hash())).unwrap();
        assert_eq!(message.to_string(), format!("sync-checkpoint: {HEIGHT_40000}"));
    }
}
