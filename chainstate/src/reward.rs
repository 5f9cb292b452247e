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

//! Pre-qPoS block subsidies: the height-tiered proof-of-work schedule and
//! the PPCoin-style coin-age proof-of-stake reward. Both freeze once a
//! chain reaches qPoS, where [`registry::price::qpos_reward`] takes over.

use common::primitives::{Amount, CENT, COIN};
use utxo::Utxo;

const COIN_ATOMS: i64 = COIN.to_atoms();
const CENT_ATOMS: i64 = CENT.to_atoms();

/// Coin-seconds are capped per input at nine days, so a single ancient
/// output can't dominate a block's coin age.
const MAX_COIN_SECONDS: i64 = 9 * 24 * 60 * 60;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Minimum age (in seconds since the spent output's own timestamp) an
/// input must clear before it contributes coin age.
pub fn stake_min_age(testnet: bool) -> u32 {
    if testnet {
        60
    } else {
        60 * 60 * 24 * 3
    }
}

/// `nRewardCoinYear`: the annualized proof-of-stake return, expressed as an
/// [`Amount`] per coin-year so `proof_of_stake_reward` can scale linearly.
fn max_proof_of_stake_per_coin_year(testnet: bool) -> Amount {
    if testnet {
        Amount::from_atoms(20 * COIN_ATOMS)
    } else {
        // 20% APY: 0.20 * COIN
        Amount::from_atoms(COIN_ATOMS / 5)
    }
}

/// The coinbase subsidy for a pre-qPoS proof-of-work block, before the
/// block's fees are added in. Height brackets below are the historical
/// premine and early-fairness schedule; they never change once mined.
pub fn proof_of_work_subsidy(height: i32, testnet: bool) -> Amount {
    let atoms = if testnet {
        if height == 0 {
            16 * COIN_ATOMS
        } else {
            90_000 * COIN_ATOMS
        }
    } else if height == 0 {
        16 * COIN_ATOMS // genesis coinbase is unspendable
    } else if height <= 10 {
        23_300 * COIN_ATOMS
    } else if height <= 260 {
        16 * COIN_ATOMS
    } else if height <= 1_700 {
        8_000 * COIN_ATOMS
    } else if height <= 3_140 {
        4_000 * COIN_ATOMS
    } else if height <= 4_580 {
        2_000 * COIN_ATOMS
    } else {
        1_000 * COIN_ATOMS
    };
    Amount::from_atoms(atoms)
}

/// `GetProofOfWorkReward`: subsidy plus the block's collected fees.
pub fn proof_of_work_reward(height: i32, fees: Amount, testnet: bool) -> Option<Amount> {
    proof_of_work_subsidy(height, testnet).checked_add(fees)
}

/// One input's contribution to a transaction's coin age, in cent-seconds.
/// `utxo` is the spent output, `tx_time` is the spending transaction's own
/// timestamp. Inputs younger than [`stake_min_age`] contribute nothing; a
/// coinbase/coinstake origin still ages normally once past maturity, since
/// maturity and stake-min-age are independent gates.
fn input_cent_seconds(utxo: &Utxo, tx_time: u32, min_age: u32) -> i64 {
    let Some(source_time) = utxo.source_time else { return 0 };
    if source_time > tx_time {
        return 0; // timestamp violation; caller has already rejected this tx
    }
    if source_time.saturating_add(min_age) > tx_time {
        return 0;
    }
    let age_seconds = i64::from(tx_time - source_time).min(MAX_COIN_SECONDS);
    let value = utxo.output.value.to_atoms();
    value.saturating_mul(age_seconds) / CENT_ATOMS
}

/// `CTransaction::GetCoinAge`: total coin-days consumed by a non-coinbase
/// transaction's inputs, given their resolved [`Utxo`] entries and the
/// transaction's own timestamp.
pub fn transaction_coin_age(inputs: &[Utxo], tx_time: u32, min_age: u32) -> u64 {
    let cent_seconds: i64 = inputs.iter().map(|u| input_cent_seconds(u, tx_time, min_age)).sum();
    let coin_days = cent_seconds * CENT_ATOMS / COIN_ATOMS / SECONDS_PER_DAY;
    coin_days.max(0) as u64
}

/// `CBlock::GetCoinAge`: sum of every transaction's coin age in the block,
/// floored at one coin-day so a proof-of-stake block always earns some
/// reward.
pub fn block_coin_age(per_tx: impl IntoIterator<Item = u64>) -> u64 {
    let total: u64 = per_tx.into_iter().sum();
    total.max(1)
}

/// `GetProofOfStakeReward`: linear in coin-age, scaled by the fixed
/// per-coin-year rate. `nBits` doesn't actually enter the legacy formula
/// despite being passed in upstream; it is accepted here only to keep the
/// call site symmetric with the proof-of-work path.
pub fn proof_of_stake_reward(coin_age: u64, testnet: bool) -> Amount {
    let rate = max_proof_of_stake_per_coin_year(testnet).to_atoms();
    let subsidy = (coin_age as i64).saturating_mul(rate) / 365;
    Amount::from_atoms(subsidy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::chain::TxOutput;

    fn utxo_at(value: i64, source_time: u32) -> Utxo {
        Utxo::new(
            TxOutput { value: Amount::from_atoms(value), script_pubkey: vec![] },
            1,
            false,
            false,
            Some(source_time),
        )
    }

    #[test]
    fn mainnet_subsidy_brackets() {
        assert_eq!(proof_of_work_subsidy(0, false), Amount::from_atoms(16 * COIN_ATOMS));
        assert_eq!(proof_of_work_subsidy(5, false), Amount::from_atoms(23_300 * COIN_ATOMS));
        assert_eq!(proof_of_work_subsidy(260, false), Amount::from_atoms(16 * COIN_ATOMS));
        assert_eq!(proof_of_work_subsidy(5_000, false), Amount::from_atoms(1_000 * COIN_ATOMS));
    }

    #[test]
    fn proof_of_work_reward_adds_fees() {
        let reward = proof_of_work_reward(5, Amount::from_atoms(500), false).unwrap();
        assert_eq!(reward, Amount::from_atoms(23_300 * COIN_ATOMS + 500));
    }

    #[test]
    fn coin_younger_than_min_age_contributes_nothing() {
        let utxo = utxo_at(100 * COIN_ATOMS, 1_000);
        let age = transaction_coin_age(&[utxo], 1_100, stake_min_age(false));
        assert_eq!(age, 0);
    }

    #[test]
    fn coin_age_scales_with_value_and_time() {
        let min_age = stake_min_age(true);
        let spend_time = 10_000 + min_age + SECONDS_PER_DAY as u32;
        let utxo = utxo_at(100 * COIN_ATOMS, 10_000);
        let age = transaction_coin_age(&[utxo], spend_time, min_age);
        assert_eq!(age, 100);
    }

    #[test]
    fn block_coin_age_floors_at_one() {
        assert_eq!(block_coin_age(std::iter::empty()), 1);
        assert_eq!(block_coin_age([0, 0]), 1);
        assert_eq!(block_coin_age([3, 4]), 7);
    }

    #[test]
    fn proof_of_stake_reward_is_linear_in_coin_age() {
        let reward_one_day = proof_of_stake_reward(365, false);
        assert_eq!(reward_one_day, max_proof_of_stake_per_coin_year(false));
    }
}
