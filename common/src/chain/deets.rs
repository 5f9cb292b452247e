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

//! Registry-affecting operations extracted from transaction outputs, cached
//! on the block as `vDeets`. This module only carries the data shapes;
//! extraction and registry semantics live in the registry crate, which
//! depends on `common` rather than the other way around.

use crate::primitives::Amount;

/// The stable numeric identity of a staker, assigned at purchase time.
pub type StakerId = u32;

/// Which role key a `SetKey` deet rotates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyRole {
    Owner,
    Manager,
    Delegate,
    Controller,
}

/// `ENABLE`/`DISABLE` target state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StakerState {
    Enabled,
    Disabled,
}

/// One registry-affecting operation, in the order it appears among a
/// transaction's outputs. The enclosing `(tx_index, output_index)` position
/// is tracked by the caller building `vDeets`, not stored here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deet {
    Purchase1 { price: Amount, owner_pubkey: Vec<u8>, alias: String },
    Purchase4 {
        price: Amount,
        owner_pubkey: Vec<u8>,
        delegate_pubkey: Vec<u8>,
        manager_pubkey: Option<Vec<u8>>,
        controller_pubkey: Vec<u8>,
        payout_pcm: u32,
        alias: String,
    },
    SetKey { staker_id: StakerId, role: KeyRole, pubkey: Vec<u8>, payout_pcm: Option<u32> },
    SetState { staker_id: StakerId, state: StakerState },
    Claim { pubkey: Vec<u8>, value: Amount },
    SetMeta { staker_id: StakerId, key: String, value: String },
}

impl Deet {
    pub fn staker_id(&self) -> Option<StakerId> {
        match self {
            Deet::SetKey { staker_id, .. }
            | Deet::SetState { staker_id, .. }
            | Deet::SetMeta { staker_id, .. } => Some(*staker_id),
            Deet::Purchase1 { .. } | Deet::Purchase4 { .. } | Deet::Claim { .. } => None,
        }
    }
}
