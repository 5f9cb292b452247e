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

pub mod amount;
mod hash256;

pub use amount::{Amount, CENT, COIN};
pub use hash256::Hash256;

/// `MAX_MONEY` is a consistency-check ceiling, not the true money supply
/// limit -- the actual supply follows from `GetProofOfWorkReward` and
/// `GetQPoSReward` integrated over the chain's history. By coincidence the
/// original 43.3M cap is good for almost exactly a decade of 1%/year
/// inflation after the qPoS transition.
pub const MAX_MONEY: Amount = Amount::from_atoms(COIN.to_atoms() * 43_300_000);

/// `0 <= v <= MAX_MONEY`.
pub fn money_range(v: Amount) -> bool {
    v.to_atoms() >= 0 && v <= MAX_MONEY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_range_bounds() {
        assert!(money_range(Amount::from_atoms(0)));
        assert!(money_range(MAX_MONEY));
        assert!(!money_range(Amount::from_atoms(-1)));
        assert!(!money_range(Amount::from_atoms(MAX_MONEY.to_atoms() + 1)));
    }
}
