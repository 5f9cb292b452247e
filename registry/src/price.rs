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

//! The staker pricing curve and the qPoS block subsidy, grounded on the
//! reference client's `GetStakerPrice`/`GetQPoSReward`.

use common::chain::Network;

/// Mainnet/testnet tier boundaries and scale constants for [`staker_price`].
struct PriceCurve {
    k_scale: i64,
    k_incentive: i64,
    k_tier: u32,
}

const INVERSE_WAIT_INCREASE: i64 = 3_153_600;

fn curve_for(network: Network) -> PriceCurve {
    match network {
        Network::Mainnet => PriceCurve { k_scale: 12_000, k_incentive: 64, k_tier: 32 - 11 },
        Network::Testnet => PriceCurve { k_scale: 4_000, k_incentive: 200, k_tier: 64 - 22 },
    }
}

/// `floor(log2(n)) + 1` for `n > 0`, `0` for `n == 0` -- the number of bits
/// needed to represent `n`.
fn bit_length(n: u32) -> u32 {
    32 - n.leading_zeros()
}

/// The price (in base units) to register the `n`-th qualified staker, given
/// the circulating money supply at the block preceding the purchase.
/// `is_purchase` inflates the effective supply slightly to account for the
/// expected wait before the purchase transaction confirms.
pub fn staker_price(network: Network, n: u32, money_supply: i64, is_purchase: bool) -> i64 {
    let curve = curve_for(network);
    let blen = bit_length(n + curve.k_tier) as i64;
    let mut supply = money_supply;
    if is_purchase {
        supply += supply / INVERSE_WAIT_INCREASE;
    }
    (supply / curve.k_scale) * (blen - 1) + curve.k_incentive * n as i64
}

/// 1%/year qPoS block subsidy: `money_supply / (blocks_per_year / 100)`
/// where `blocks_per_year` assumes 5-second qPoS slots.
pub fn qpos_reward(money_supply: i64) -> i64 {
    const BLOCKS_PER_YEAR: i64 = 6_311_520;
    const RECIPROCAL_INFLATION: i64 = 100;
    money_supply / (BLOCKS_PER_YEAR / RECIPROCAL_INFLATION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_length_matches_known_values() {
        assert_eq!(bit_length(0), 0);
        assert_eq!(bit_length(1), 1);
        assert_eq!(bit_length(2), 2);
        assert_eq!(bit_length(3), 2);
        assert_eq!(bit_length(4), 3);
        assert_eq!(bit_length(255), 8);
        assert_eq!(bit_length(256), 9);
    }

    #[test]
    fn price_rises_with_staker_count() {
        let supply = 10_000_000 * 1_000_000;
        let low = staker_price(Network::Mainnet, 1, supply, false);
        let high = staker_price(Network::Mainnet, 400, supply, false);
        assert!(high > low);
    }

    #[test]
    fn purchase_mode_inflates_effective_supply() {
        let supply = 50_000 * 1_000_000;
        let plain = staker_price(Network::Mainnet, 5, supply, false);
        let purchase = staker_price(Network::Mainnet, 5, supply, true);
        assert!(purchase >= plain);
    }

    #[test]
    fn qpos_reward_is_roughly_one_percent_annualized() {
        let supply = 6_311_520 * 100;
        assert_eq!(qpos_reward(supply), 1);
    }
}
