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

//! The dynamic minimum money fee: a base rate per kilobyte that rises as a
//! block or the relay policy's notional block approaches full, mirroring
//! `feework`'s hardness/limit schedules for the feeless lane.

use common::chain::ChainParams;
use common::primitives::{money_range, Amount, MAX_MONEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeMode {
    /// Evaluated against a block actually being assembled or connected.
    Block,
    /// Evaluated against the relay policy's notional half-full block, used
    /// to gate mempool admission independent of what any miner is doing.
    Relay,
}

/// `GetMinFee`: the minimum money fee `tx_bytes` of transaction must pay
/// given a block (or relay-policy) that already holds `block_size` bytes.
pub fn min_fee(params: &ChainParams, block_size: usize, mode: FeeMode, tx_bytes: usize) -> Amount {
    let base_fee = match mode {
        FeeMode::Relay => params.min_relay_tx_fee,
        FeeMode::Block => params.min_tx_fee,
    };
    let mut min_fee = match base_fee.checked_mul(1 + (tx_bytes / 1000) as i64) {
        Some(f) => f,
        None => return MAX_MONEY,
    };

    let new_block_size = block_size + tx_bytes;
    if block_size != 1 && new_block_size >= params.max_block_size_gen / 2 {
        if new_block_size >= params.max_block_size_gen {
            return MAX_MONEY;
        }
        let scale = (params.max_block_size_gen / (params.max_block_size_gen - new_block_size)) as i64;
        min_fee = match min_fee.checked_mul(scale) {
            Some(f) => f,
            None => return MAX_MONEY,
        };
    }

    if !money_range(min_fee) {
        min_fee = MAX_MONEY;
    }
    min_fee
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_fee_scales_with_tx_size() {
        let params = ChainParams::mainnet();
        let one_kb = min_fee(&params, 0, FeeMode::Block, 1_000);
        let two_kb = min_fee(&params, 0, FeeMode::Block, 1_999);
        assert!(two_kb > one_kb);
    }

    #[test]
    fn fee_rises_as_block_fills_past_half() {
        let params = ChainParams::mainnet();
        let half = params.max_block_size_gen / 2;
        let empty = min_fee(&params, 2, FeeMode::Block, 100);
        let nearly_full = min_fee(&params, half, FeeMode::Block, 100);
        assert!(nearly_full > empty);
    }

    #[test]
    fn fee_saturates_at_max_money_past_generation_cap() {
        let params = ChainParams::mainnet();
        let fee = min_fee(&params, params.max_block_size_gen, FeeMode::Block, 100);
        assert_eq!(fee, MAX_MONEY);
    }

    #[test]
    fn relay_mode_uses_the_relay_base_rate() {
        let params = ChainParams::mainnet();
        assert_eq!(
            min_fee(&params, 0, FeeMode::Relay, 500),
            min_fee(&params, 0, FeeMode::Block, 500)
        );
    }
}
