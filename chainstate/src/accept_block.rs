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

//! `AcceptBlock` (spec §4.6): the rules that depend on where a block sits
//! in the chain -- its parent's timestamp, the height it claims, the
//! registry's qPoS slot assignment. `CheckBlock` has already run by the
//! time these are checked.

use crate::error::{Error, Result};
use common::chain::{Block, ChainParams, Fork};
use registry::StakerRegistry;

/// Context needed to accept a block on top of a known parent.
pub struct AcceptContext<'a> {
    pub height: i32,
    pub fork: Fork,
    pub prev_time: u32,
    /// Median of the last several blocks' timestamps (`GetPastTimeLimit`);
    /// `0` at genesis, where there is no past to take a median of.
    pub past_time_limit: u32,
    pub adjusted_time: i64,
    pub params: &'a ChainParams,
}

pub fn accept_block(block: &Block, ctx: &AcceptContext<'_>, registry: &StakerRegistry) -> Result<()> {
    check_timestamp(block, ctx)?;

    if !block.header.is_qpos() {
        if ctx.fork < Fork::ForkQPoS {
            check_coinbase_height(block, ctx.height)?;
        }
    } else {
        let staker_id = block.header.staker_id.expect("CheckBlock already required this");
        let time = block.header.time as i64;
        if !registry.stakers.contains_key(&staker_id) {
            return Err(Error::Registry(registry::Error::StakerNotFound(staker_id)));
        }
        if !timestamp_in_assigned_slot(registry, staker_id, time) {
            return Err(Error::Registry(registry::Error::TimestampOutOfSlot));
        }
    }

    Ok(())
}

/// qPoS requires a strictly later timestamp than the parent; pre-qPoS
/// blocks only need to clear the median-time floor plus future drift
/// (spec §4.6, `CheckBlockHeader`).
fn check_timestamp(block: &Block, ctx: &AcceptContext<'_>) -> Result<()> {
    let time = block.header.time;
    if block.header.is_qpos() {
        if ctx.height > 0 && time <= ctx.prev_time {
            return Err(Error::TimestampNotAdvancing { time, floor: ctx.prev_time });
        }
    } else if ctx.height > 0 && time <= ctx.past_time_limit {
        return Err(Error::TimestampNotAdvancing { time, floor: ctx.past_time_limit });
    }
    let limit = (ctx.adjusted_time + ctx.params.max_clock_drift) as u32;
    if time > limit {
        return Err(Error::TimestampTooFarInFuture { time, limit });
    }
    Ok(())
}

/// Pre-qPoS coinbase scriptSig must begin with its own block height,
/// little-endian minimal encoding (spec §4.6, `CheckBlock`'s
/// `BIP34`-style rule, mirrored here without the historic activation
/// height gate since this chain carries it unconditionally before qPoS).
fn check_coinbase_height(block: &Block, height: i32) -> Result<()> {
    let coinbase = block.transactions.first().ok_or(Error::MissingCoinbase)?;
    let script_sig = &coinbase.inputs.first().ok_or(Error::MissingCoinbase)?.script_sig;
    let encoded_height = encode_minimal_height(height);
    if !script_sig.starts_with(&encoded_height) {
        return Err(Error::BadCoinbaseHeight);
    }
    Ok(())
}

fn encode_minimal_height(height: i32) -> Vec<u8> {
    let mut bytes = height.to_le_bytes().to_vec();
    while bytes.last() == Some(&0) && bytes.len() > 1 {
        bytes.pop();
    }
    let mut out = vec![bytes.len() as u8];
    out.extend(bytes);
    out
}

fn timestamp_in_assigned_slot(registry: &StakerRegistry, staker_id: u32, time: i64) -> bool {
    registry
        .queue
        .iter()
        .find(|slot| slot.staker_id == staker_id)
        .map(|slot| time >= slot.start && time < slot.end)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_height_encoding_strips_trailing_zero_bytes() {
        assert_eq!(encode_minimal_height(1), vec![1, 1]);
        assert_eq!(encode_minimal_height(256), vec![2, 0, 1]);
    }
}
