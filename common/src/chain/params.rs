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

//! Immutable, process-wide chain parameters. Two profiles exist --
//! [`ChainParams::mainnet`] and [`ChainParams::testnet`] -- built once at
//! startup and passed by reference everywhere; there is no notion of
//! reloading or mutating parameters at runtime.

use crate::chain::fork::{Fork, ForkSchedule, ProtocolVersionSchedule};
use crate::chain::genesis::{self, GenesisParams};
use crate::primitives::{Amount, CENT, COIN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Testnet,
}

pub struct ChainParams {
    pub network: Network,
    pub genesis: GenesisParams,
    pub forks: ForkSchedule,
    pub protocol_versions: ProtocolVersionSchedule,

    pub max_block_size: usize,
    pub max_block_size_gen: usize,
    pub max_standard_tx_size: usize,
    pub max_block_sigops: usize,
    pub max_orphan_transactions: usize,

    pub min_tx_fee: Amount,
    pub min_relay_tx_fee: Amount,
    pub min_txout_amount: Amount,
    pub max_txfee: Amount,

    pub max_clock_drift: i64,
    pub future_drift: i64,

    pub target_spacing: i64,
    pub target_timespan: i64,
    pub coinbase_maturity: i32,

    pub stake_min_age: i64,
    pub stake_max_age: i64,
    pub modifier_interval: i64,
    pub modifier_interval_ratio: i64,

    /// Feework constants (spec §4.3), grounded on the same values for both
    /// networks in the reference client.
    pub feeless_mcost_min: u32,
    pub relay_feeless_mcost_min: u32,
    pub feework_max_multiplier: u32,
    pub feework_block_parts: u32,
    pub feework_cost_pct_jump_per_part: u32,
    pub feework_limit_pct_decay_per_part: u32,
    pub tx_feework_limit: u64,
    pub relay_tx_feework_limit: u64,
    pub feeless_max_depth: i32,
    pub feeless_max_block_size: usize,

    /// 5-second slots from the qPoS fork; mainnet and testnet share this value.
    pub qp_target_spacing: i64,
    pub blocks_per_snapshot: i32,
}

impl ChainParams {
    pub fn feework_max_mcost(&self) -> u32 {
        self.feework_max_multiplier * self.feeless_mcost_min
    }

    pub fn get_fork(&self, height: i32) -> Fork {
        self.forks.get_fork(height)
    }

    pub fn mainnet() -> Self {
        ChainParams {
            network: Network::Mainnet,
            genesis: genesis::mainnet(),
            forks: ForkSchedule::new(vec![
                (0, Fork::Genesis),
                (5460, Fork::Fork002),
                (130_669, Fork::Fork004),
                (1_732_201, Fork::Fork005),
                (2_378_000, Fork::Fork006),
                (3_657_600, Fork::ForkPurchase),
                (3_673_500, Fork::ForkPurchase2),
                (3_683_900, Fork::ForkPurchase3),
                (3_695_100, Fork::ForkQPoS),
                (3_695_100, Fork::ForkQPoSB),
                (3_695_200, Fork::ForkNft),
                (3_702_300, Fork::ForkFeeless),
                (3_702_301, Fork::ForkMissfix),
            ]),
            protocol_versions: ProtocolVersionSchedule::new(vec![
                (Fork::Genesis, 60_000),
                (Fork::ForkQPoS, 60_020),
                (Fork::ForkFeeless, 60_030),
            ]),
            max_block_size: 1_000_000,
            max_block_size_gen: 500_000,
            max_standard_tx_size: 100_000,
            max_block_sigops: 20_000,
            max_orphan_transactions: 10_000,
            min_tx_fee: CENT,
            min_relay_tx_fee: CENT,
            min_txout_amount: CENT,
            max_txfee: Amount::from_atoms(COIN.to_atoms() / 4),
            max_clock_drift: 2 * 60 * 60,
            future_drift: 17,
            target_spacing: 60,
            target_timespan: 60 * 30,
            coinbase_maturity: 40,
            stake_min_age: 60 * 60 * 24 * 3,
            stake_max_age: 60 * 60 * 24 * 9,
            modifier_interval: 5 * 60,
            modifier_interval_ratio: 3,
            feeless_mcost_min: 1 << 8,
            relay_feeless_mcost_min: 1 << 8,
            feework_max_multiplier: 18,
            feework_block_parts: 31,
            feework_cost_pct_jump_per_part: 10,
            feework_limit_pct_decay_per_part: 91,
            tx_feework_limit: 0x0006_ffff_ffff_ffff,
            relay_tx_feework_limit: 0x0006_ffff_ffff_ffff,
            feeless_max_depth: 24,
            feeless_max_block_size: 1_000_000 / 5,
            qp_target_spacing: 5,
            blocks_per_snapshot: 100,
        }
    }

    pub fn testnet() -> Self {
        let mut p = Self::mainnet();
        p.network = Network::Testnet;
        p.genesis = genesis::testnet();
        p.coinbase_maturity = 10;
        p.stake_min_age = 60;
        p.stake_max_age = 40 * 60;
        p.modifier_interval = 30;
        p.target_spacing = 20;
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feeless_max_block_size_is_a_fifth_of_max_block_size() {
        let p = ChainParams::mainnet();
        assert_eq!(p.feeless_max_block_size, p.max_block_size / 5);
    }

    #[test]
    fn testnet_uses_shorter_stake_ages() {
        let p = ChainParams::testnet();
        assert!(p.stake_max_age < ChainParams::mainnet().stake_max_age);
    }

    #[test]
    fn feework_max_mcost_is_18x_min() {
        let p = ChainParams::mainnet();
        assert_eq!(p.feework_max_mcost(), 18 * p.feeless_mcost_min);
    }
}
