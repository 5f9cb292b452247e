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

//! The dynamic memory-cost and hash-limit schedules a feework must clear,
//! both a function of how full the block already is. Blocks reserve their
//! last fifth for money-fee transactions, so there is no way to fill a
//! block entirely with feeless ones.

use common::chain::ChainParams;

/// Which caller is asking: a miner deciding what to put in the next block,
/// or a relay deciding whether to forward a transaction it doesn't control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayMode {
    Block,
    Relay,
}

/// `GetFeeworkHardness`: the memory cost (KiB) a feework must use to count,
/// given how full the block already is. Scales linearly with the tx's own
/// size, then compounds ~10% per step as the block's feeless allotment
/// fills, over up to `FEEWORK_BLOCK_PARTS` steps. Returns `u32::MAX` once
/// adding this tx would exceed `FEELESS_MAX_BLOCK_SIZE`.
pub fn feework_hardness(
    params: &ChainParams,
    block_size: u64,
    mode: RelayMode,
    tx_bytes: u64,
) -> u32 {
    let max_size = params.feeless_max_block_size as u64;
    let parts = params.feework_block_parts as u64;
    let jump = params.feework_cost_pct_jump_per_part as u64;
    let multiplier = 1000 * (100 + jump);

    let base_cost = match mode {
        RelayMode::Relay => params.relay_feeless_mcost_min as u64,
        RelayMode::Block => params.feeless_mcost_min as u64,
    };

    let mut cost = (1 + tx_bytes / 1000) * base_cost;

    let new_block_size = block_size + tx_bytes;
    if new_block_size > max_size {
        return u32::MAX;
    }

    let steps = (parts * new_block_size) / max_size;
    for _ in 2..=steps {
        cost = (cost * multiplier) / 100_000;
    }

    cost.min(u32::MAX as u64) as u32
}

/// `GetFeeworkLimit`: the hash ceiling a feework's digest must not exceed,
/// given how full the block already is. Decreases linearly with the tx's
/// own size, then decays by `FEEWORK_LIMIT_PCT_DECAY_PER_PART` percent per
/// step as the block's feeless allotment fills.
pub fn feework_limit(params: &ChainParams, block_size: u64, mode: RelayMode, tx_bytes: u64) -> u64 {
    let max_size = params.feeless_max_block_size as u64;
    let parts = params.feework_block_parts as u64;
    let decay = params.feework_limit_pct_decay_per_part as u64;

    let base_limit = match mode {
        RelayMode::Relay => params.relay_tx_feework_limit,
        RelayMode::Block => params.tx_feework_limit,
    };

    let mut limit = base_limit / (1 + tx_bytes / 1000);

    let new_block_size = block_size + tx_bytes;
    if new_block_size > max_size {
        return 0;
    }

    let steps = (parts * new_block_size) / max_size;
    for _ in 1..steps {
        limit = (decay * limit) / 100;
    }

    limit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hardness_rises_as_block_fills() {
        let params = ChainParams::mainnet();
        let empty = feework_hardness(&params, 0, RelayMode::Block, 250);
        let full = feework_hardness(
            &params,
            params.feeless_max_block_size as u64 - 500,
            RelayMode::Block,
            250,
        );
        assert!(full > empty);
    }

    #[test]
    fn hardness_saturates_past_feeless_cap() {
        let params = ChainParams::mainnet();
        let result = feework_hardness(&params, params.feeless_max_block_size as u64, RelayMode::Block, 1);
        assert_eq!(result, u32::MAX);
    }

    #[test]
    fn limit_falls_as_block_fills() {
        let params = ChainParams::mainnet();
        let empty = feework_limit(&params, 0, RelayMode::Block, 250);
        let full = feework_limit(
            &params,
            params.feeless_max_block_size as u64 - 500,
            RelayMode::Block,
            250,
        );
        assert!(full < empty);
    }

    #[test]
    fn limit_is_zero_past_feeless_cap() {
        let params = ChainParams::mainnet();
        let result = feework_limit(&params, params.feeless_max_block_size as u64, RelayMode::Block, 1);
        assert_eq!(result, 0);
    }
}
