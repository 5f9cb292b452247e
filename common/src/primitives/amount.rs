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

use serialization::{Cursor, Decode, Encode, EncodeAsElement};
use std::ops::{Add, Neg, Sub};

/// A signed amount of base units. Signed so that fee/reward deltas can be
/// represented without a separate type; validated non-negative at the
/// boundaries that require it (`money_range`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

/// One coin is one million base units.
pub const COIN: Amount = Amount::from_atoms(1_000_000);

/// One cent is 1/100th of a coin.
pub const CENT: Amount = Amount::from_atoms(COIN.to_atoms() / 100);

impl Amount {
    pub const fn from_atoms(atoms: i64) -> Self {
        Amount(atoms)
    }

    pub const fn to_atoms(self) -> i64 {
        self.0
    }

    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Amount)
    }

    pub fn checked_mul(self, rhs: i64) -> Option<Amount> {
        self.0.checked_mul(rhs).map(Amount)
    }
}

impl Add for Amount {
    type Output = Amount;
    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl Sub for Amount {
    type Output = Amount;
    fn sub(self, rhs: Amount) -> Amount {
        Amount(self.0 - rhs.0)
    }
}

impl Neg for Amount {
    type Output = Amount;
    fn neg(self) -> Amount {
        Amount(-self.0)
    }
}

impl std::iter::Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::from_atoms(0), |acc, x| acc + x)
    }
}

impl Encode for Amount {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        self.0.encode_to(buf)
    }
}

impl EncodeAsElement for Amount {}

impl Decode for Amount {
    fn decode(cursor: &mut Cursor<'_>) -> serialization::Result<Self> {
        Ok(Amount(i64::decode(cursor)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coin_and_cent() {
        assert_eq!(COIN.to_atoms(), 1_000_000);
        assert_eq!(CENT.to_atoms(), 10_000);
    }

    #[test]
    fn checked_arithmetic_overflows_to_none() {
        let max = Amount::from_atoms(i64::MAX);
        assert_eq!(max.checked_add(Amount::from_atoms(1)), None);
    }
}
