//! Difficulty targets.
//!
//! A [`Target`] is the 256-bit threshold a proof-of-work hash must not exceed.
//! Headers carry it in the 32-bit compact form ([`CompactTarget`]): one size
//! byte followed by a 24-bit mantissa.

use bitcoin::{BlockHash, CompactTarget};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::faircoin::hashes::Hash;

/// A difficulty target expressed as an unsigned 256-bit integer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Target(U256);

impl Target {
    /// Creates a Target from bytes (big-endian).
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Self(U256::from_big_endian(bytes))
    }

    /// Creates a new `Target` from a hexadecimal string representation.
    pub fn from_hex(hex: &str) -> Option<Self> {
        U256::from_str_radix(hex, 16).ok().map(Target)
    }

    /// Decodes a compact target.
    ///
    /// # Returns
    ///
    /// * `Some(Target)` - The expanded target
    /// * `None` - If the mantissa is zero or negative, or the value does not
    ///   fit in 256 bits
    pub fn from_compact(compact: CompactTarget) -> Option<Self> {
        let n = compact.to_consensus();
        let exponent = n >> 24;
        let mantissa = n & 0x007f_ffff;

        if n & 0x0080_0000 != 0 {
            return None; // Sign bit set
        }

        if mantissa == 0 {
            return None;
        }

        let base = U256::from(mantissa);

        #[allow(clippy::arithmetic_side_effects, reason = "Shift amounts are bounds checked")]
        let target = if exponent <= 3 {
            let shift_bits = 3u32.checked_sub(exponent)?.checked_mul(8)?;
            base >> shift_bits
        } else {
            let shift_bits = exponent.checked_sub(3)?.checked_mul(8)?;
            // The mantissa occupies up to 23 bits; it must stay inside 256.
            if shift_bits.checked_add(mantissa.ilog2())? >= 256 {
                return None;
            }
            base << shift_bits
        };

        Some(Target(target))
    }

    /// Encodes the target in compact form.
    ///
    /// Returns `None` only if the target needs more than 255 bytes, which a
    /// 256-bit value never does.
    pub fn to_compact(self) -> Option<CompactTarget> {
        if self.0.is_zero() {
            return Some(CompactTarget::from_consensus(0));
        }

        let bit_length = u32::try_from(self.0.bits()).ok()?;
        let mut size = bit_length.checked_add(7)?.checked_div(8)?;

        let mut mantissa = (if size <= 3 {
            let shift_bits = 3u32.checked_sub(size)?.checked_mul(8)?;
            self.0.low_u32().checked_shl(shift_bits)?
        } else {
            let shift_bits = size.checked_sub(3)?.checked_mul(8)?;
            #[allow(clippy::arithmetic_side_effects, reason = "shift_bits < 256")]
            let shifted = self.0 >> shift_bits;
            shifted.low_u32()
        }) & 0x00ff_ffff;

        // A set high bit would read back as a negative mantissa.
        if mantissa & 0x0080_0000 != 0 {
            mantissa = mantissa.checked_shr(8)?;
            size = size.checked_add(1)?;
        }

        if size > 255 {
            return None;
        }

        let compact = size.checked_shl(24)?.checked_add(mantissa)?;
        Some(CompactTarget::from_consensus(compact))
    }

    /// Whether `hash`, read as a 256-bit little-endian integer, is at or below
    /// this target.
    pub fn is_met_by(self, hash: BlockHash) -> bool {
        U256::from_little_endian(hash.as_byte_array()) <= self.0
    }

    /// Difficulty of this target relative to `max_attainable_target`.
    ///
    /// # Returns
    /// * `Some(u128)` - The difficulty, capped at `u128::MAX`
    /// * `None` - When this target is zero
    pub fn difficulty(self, max_attainable_target: Target) -> Option<u128> {
        let diff = max_attainable_target.0.checked_div(self.0)?;
        if diff > U256::from(u128::MAX) {
            Some(u128::MAX)
        } else {
            Some(diff.as_u128())
        }
    }
}

impl From<U256> for Target {
    fn from(value: U256) -> Self {
        Target(value)
    }
}
