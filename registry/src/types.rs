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

use common::chain::StakerId;
use common::primitives::{Amount, Hash256};
use serialization::{Cursor, Decode, Encode, EncodeAsElement};
use std::collections::BTreeMap;

/// A staker's activation state, independent of its qPoS queue membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryState {
    Pending,
    Enabled,
    Disabled,
    Disqualified,
}

impl Encode for RegistryState {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        let tag: u8 = match self {
            RegistryState::Pending => 0,
            RegistryState::Enabled => 1,
            RegistryState::Disabled => 2,
            RegistryState::Disqualified => 3,
        };
        tag.encode_to(buf);
    }
}

impl Decode for RegistryState {
    fn decode(cursor: &mut Cursor<'_>) -> serialization::Result<Self> {
        Ok(match u8::decode(cursor)? {
            0 => RegistryState::Pending,
            1 => RegistryState::Enabled,
            2 => RegistryState::Disabled,
            _ => RegistryState::Disqualified,
        })
    }
}

/// One registered staker. Owner, manager, delegate and controller keys may
/// coincide (a PURCHASE1 registration sets all four to the same key).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakerRecord {
    pub owner_key: Vec<u8>,
    pub manager_key: Vec<u8>,
    pub delegate_key: Vec<u8>,
    pub controller_key: Vec<u8>,
    pub delegate_payout_pcm: u32,
    pub ledger_balance: Amount,
    pub state: RegistryState,
    pub weight: u64,
    pub missed_counter: u32,
    pub meta: BTreeMap<String, String>,
    /// Height at which the staker was enabled; used for the enable-cooldown
    /// check (`CanEnableStaker`).
    pub enabled_at_height: Option<i32>,
}

impl StakerRecord {
    pub fn new_from_purchase(owner_key: Vec<u8>) -> Self {
        StakerRecord {
            manager_key: owner_key.clone(),
            delegate_key: owner_key.clone(),
            controller_key: owner_key.clone(),
            owner_key,
            delegate_payout_pcm: 0,
            ledger_balance: Amount::from_atoms(0),
            state: RegistryState::Pending,
            weight: 0,
            missed_counter: 0,
            meta: BTreeMap::new(),
            enabled_at_height: None,
        }
    }

    pub fn is_qualified(&self) -> bool {
        matches!(self.state, RegistryState::Enabled)
    }
}

/// One slot in the current round's queue: a staker id and its
/// `[start, end)` timestamp window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueSlot {
    pub staker_id: StakerId,
    pub start: i64,
    pub end: i64,
}

/// The full registry state (spec §3). Cloned wholesale to make a temporary
/// registry for speculative validation (spec §4.5's clock-discipline rule
/// and §4.6's `ProcessBlock`), since a staker registry is small relative to
/// the UTXO set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakerRegistry {
    pub stakers: BTreeMap<StakerId, StakerRecord>,
    pub aliases: BTreeMap<String, StakerId>,
    pub nft_assignments: BTreeMap<u32, StakerId>,
    pub queue: Vec<QueueSlot>,
    pub round: u64,
    pub round_seed: Hash256,
    pub queue_min_time: i64,
    pub current_slot: usize,
    pub pico_power: u64,
    pub last_block_hash: Hash256,
    pub last_block_height: i32,
    pub ledgers: BTreeMap<Vec<u8>, Amount>,
    pub replay_mode: bool,
    pub next_staker_id: StakerId,
}

impl Default for StakerRegistry {
    fn default() -> Self {
        StakerRegistry {
            stakers: BTreeMap::new(),
            aliases: BTreeMap::new(),
            nft_assignments: BTreeMap::new(),
            queue: Vec::new(),
            round: 0,
            round_seed: Hash256::ZERO,
            queue_min_time: 0,
            current_slot: 0,
            pico_power: 0,
            last_block_hash: Hash256::ZERO,
            last_block_height: 0,
            ledgers: BTreeMap::new(),
            replay_mode: false,
            next_staker_id: 1,
        }
    }
}

impl StakerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn qualified_staker_count(&self) -> u32 {
        self.stakers.values().filter(|s| s.is_qualified()).count() as u32
    }

    pub fn alias_exists(&self, alias: &str) -> bool {
        self.aliases.contains_key(&alias.to_lowercase())
    }
}

fn encode_string(s: &str, buf: &mut Vec<u8>) {
    s.as_bytes().to_vec().encode_to(buf);
}

fn decode_string(cursor: &mut Cursor<'_>) -> serialization::Result<String> {
    let bytes = Vec::<u8>::decode(cursor)?;
    String::from_utf8(bytes).map_err(|_| serialization::Error::UnexpectedEof)
}

impl Encode for StakerRecord {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        self.owner_key.encode_to(buf);
        self.manager_key.encode_to(buf);
        self.delegate_key.encode_to(buf);
        self.controller_key.encode_to(buf);
        self.delegate_payout_pcm.encode_to(buf);
        self.ledger_balance.encode_to(buf);
        self.state.encode_to(buf);
        self.weight.encode_to(buf);
        self.missed_counter.encode_to(buf);
        (self.meta.len() as u64).encode_to(buf);
        for (k, v) in &self.meta {
            encode_string(k, buf);
            encode_string(v, buf);
        }
        self.enabled_at_height.is_some().encode_to(buf);
        if let Some(h) = self.enabled_at_height {
            h.encode_to(buf);
        }
    }
}

impl EncodeAsElement for StakerRecord {}

impl Decode for StakerRecord {
    fn decode(cursor: &mut Cursor<'_>) -> serialization::Result<Self> {
        let owner_key = Vec::<u8>::decode(cursor)?;
        let manager_key = Vec::<u8>::decode(cursor)?;
        let delegate_key = Vec::<u8>::decode(cursor)?;
        let controller_key = Vec::<u8>::decode(cursor)?;
        let delegate_payout_pcm = u32::decode(cursor)?;
        let ledger_balance = Amount::decode(cursor)?;
        let state = RegistryState::decode(cursor)?;
        let weight = u64::decode(cursor)?;
        let missed_counter = u32::decode(cursor)?;
        let meta_len = u64::decode(cursor)?;
        let mut meta = BTreeMap::new();
        for _ in 0..meta_len {
            let k = decode_string(cursor)?;
            let v = decode_string(cursor)?;
            meta.insert(k, v);
        }
        let has_enabled_at = bool::decode(cursor)?;
        let enabled_at_height = if has_enabled_at { Some(i32::decode(cursor)?) } else { None };
        Ok(StakerRecord {
            owner_key,
            manager_key,
            delegate_key,
            controller_key,
            delegate_payout_pcm,
            ledger_balance,
            state,
            weight,
            missed_counter,
            meta,
            enabled_at_height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staker_record_roundtrips() {
        let mut record = StakerRecord::new_from_purchase(vec![1, 2, 3]);
        record.meta.insert("nick".to_string(), "satoshi".to_string());
        record.state = RegistryState::Enabled;
        let bytes = record.encode();
        let decoded = StakerRecord::decode_all(&bytes).unwrap();
        assert_eq!(record, decoded);
    }

    #[test]
    fn new_registry_has_no_stakers() {
        let reg = StakerRegistry::new();
        assert_eq!(reg.qualified_staker_count(), 0);
    }
}
