// Copyright (c) 2025 The Stealth Core Developers
// SPDX-License-Identifier: MIT
// Licensed under the MIT License;
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// https://github.com/stealth-dev/stealth-core/blob/master/LICENSE
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Per-block chain trust and difficulty retargeting (spec §4.6). Chain
//! trust is compared with a plain `u128` here rather than a dedicated
//! 256-bit integer type: every target this chain's `nBits` can express
//! fits comfortably inside 128 bits, and `SetBestChain` only ever compares
//! cumulative sums of these contributions against each other, never
//! against a raw 256-bit constant. Widening to a real bignum crate is
//! straightforward if a future target ever saturates this.

use common::chain::ChainParams;

/// Mainnet/testnet share the same proof-of-work floor (spec §9); expressed
/// as compact bits matching the genesis block's own difficulty.
pub const POW_LIMIT_BITS: u32 = 0x1d00ffff;

/// Decodes Bitcoin-style compact ("nBits") difficulty encoding into a
/// target. Saturates rather than panicking on an oversized exponent --
/// a malformed `nBits` is caught by `CheckBlock`'s proof-of-work check,
/// not here.
pub fn bits_to_target(bits: u32) -> u128 {
    let exponent = (bits >> 24) as i32;
    let mantissa = (bits & 0x007f_ffff) as u128;
    if exponent <= 3 {
        mantissa >> (8 * (3 - exponent)).max(0)
    } else {
        let shift = 8 * (exponent - 3);
        if shift >= 128 {
            u128::MAX
        } else {
            mantissa << shift
        }
    }
}

/// Inverse of [`bits_to_target`], used by [`compute_next_bits`] to repack
/// a retargeted value back into compact form.
pub fn target_to_bits(target: u128) -> u32 {
    if target == 0 {
        return 0;
    }
    let mut bytes = target.to_be_bytes().to_vec();
    while bytes.first() == Some(&0) && bytes.len() > 1 {
        bytes.remove(0);
    }
    let mut size = bytes.len() as i32;
    let mut mantissa: u32 = if bytes.len() >= 3 {
        u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]])
    } else {
        let mut padded = vec![0u8; 3 - bytes.len()];
        padded.extend_from_slice(&bytes);
        u32::from_be_bytes([0, padded[0], padded[1], padded[2]])
    };
    // If the high bit of the mantissa is set it would be read back as a
    // sign bit; shift down one byte and bump the exponent to compensate.
    if mantissa & 0x0080_0000 != 0 {
        mantissa >>= 8;
        size += 1;
    }
    (mantissa & 0x007f_ffff) | ((size as u32) << 24)
}

/// `GetNextTargetRequired` (spec §4.6): the classic Bitcoin-style
/// averaging retarget, applied once per block rather than per interval.
/// `actual_spacing` is the gap between this block's timestamp and its
/// parent's, clamped to `[1, nTargetTimespan]` by the caller's context
/// check before reaching here.
pub fn compute_next_bits(prev_bits: u32, actual_spacing: i64, params: &ChainParams) -> u32 {
    let interval = (params.target_timespan / params.target_spacing).max(1) as i128;
    let target = params.target_spacing as i128;
    let actual_spacing = actual_spacing.clamp(1, params.target_timespan) as i128;
    let prev_target = bits_to_target(prev_bits) as i128;

    let numerator = (interval - 1) * target + 2 * actual_spacing;
    let denominator = (interval + 1) * target;
    let new_target = (prev_target * numerator) / denominator;
    let pow_limit = bits_to_target(POW_LIMIT_BITS) as i128;
    let clamped = new_target.clamp(1, pow_limit);
    target_to_bits(clamped as u128)
}

/// The trust a single block contributes to its chain (spec §4.6):
/// qPoS blocks contribute the staker's round weight, proof-of-stake
/// blocks `2^256/(target+1)` approximated here as `u128::MAX/(target+1)`,
/// and proof-of-work blocks `bnProofOfWorkLimit/(target+1)`, floored at 1
/// so an all-zero-bits block can never contribute nothing.
pub fn block_trust(bits: u32, is_qpos: bool, is_proof_of_stake: bool, staker_weight: Option<u64>) -> u128 {
    if is_qpos {
        return staker_weight.unwrap_or(1) as u128;
    }
    let target = bits_to_target(bits);
    if is_proof_of_stake {
        u128::MAX / (target + 1)
    } else {
        let limit = bits_to_target(POW_LIMIT_BITS);
        (limit / (target + 1)).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_to_target_roundtrips_through_target_to_bits() {
        let bits = 0x1d00ffff;
        let target = bits_to_target(bits);
        assert_eq!(target_to_bits(target), bits);
    }

    #[test]
    fn lower_bits_means_higher_target_and_lower_trust() {
        let easy = bits_to_target(0x1d00ffff);
        let hard = bits_to_target(0x1c00ffff);
        assert!(hard < easy);
    }

    #[test]
    fn retarget_increases_difficulty_when_blocks_come_fast() {
        let params = ChainParams::mainnet();
        let next = compute_next_bits(0x1d00ffff, 1, &params);
        let prev_target = bits_to_target(0x1d00ffff);
        let next_target = bits_to_target(next);
        assert!(next_target <= prev_target);
    }

    #[test]
    fn pow_trust_is_at_least_one() {
        let trust = block_trust(0x1d00ffff, false, false, None);
        assert!(trust >= 1);
    }
}
