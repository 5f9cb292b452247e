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

//! Registry snapshots, written every `BLOCKS_PER_SNAPSHOT` blocks so a
//! reorganization can replay forward from the nearest ancestor instead of
//! from genesis (spec §4.5).

use crate::error::{Error, Result};
use crate::types::{QueueSlot, RegistryState, StakerRecord, StakerRegistry};
use common::chain::StakerId;
use common::primitives::{Amount, Hash256};
use serialization::{Cursor, Decode, Encode, EncodeAsElement};
use storage::{KvRead, KvWrite};

const SNAPSHOT_MAP: &str = "registry_snapshots";

fn height_key(height: i32) -> Vec<u8> {
    height.to_be_bytes().to_vec()
}

impl Encode for QueueSlot {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        self.staker_id.encode_to(buf);
        self.start.encode_to(buf);
        self.end.encode_to(buf);
    }
}

impl EncodeAsElement for QueueSlot {}

impl Decode for QueueSlot {
    fn decode(cursor: &mut Cursor<'_>) -> serialization::Result<Self> {
        Ok(QueueSlot {
            staker_id: StakerId::decode(cursor)?,
            start: i64::decode(cursor)?,
            end: i64::decode(cursor)?,
        })
    }
}

impl Encode for StakerRegistry {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        (self.stakers.len() as u64).encode_to(buf);
        for (id, record) in &self.stakers {
            id.encode_to(buf);
            record.encode_to(buf);
        }
        (self.aliases.len() as u64).encode_to(buf);
        for (alias, id) in &self.aliases {
            alias.as_bytes().to_vec().encode_to(buf);
            id.encode_to(buf);
        }
        (self.nft_assignments.len() as u64).encode_to(buf);
        for (nft, id) in &self.nft_assignments {
            nft.encode_to(buf);
            id.encode_to(buf);
        }
        self.queue.encode_to(buf);
        self.round.encode_to(buf);
        self.round_seed.encode_to(buf);
        self.queue_min_time.encode_to(buf);
        (self.current_slot as u64).encode_to(buf);
        self.pico_power.encode_to(buf);
        self.last_block_hash.encode_to(buf);
        self.last_block_height.encode_to(buf);
        (self.ledgers.len() as u64).encode_to(buf);
        for (pubkey, amount) in &self.ledgers {
            pubkey.clone().encode_to(buf);
            amount.encode_to(buf);
        }
        self.replay_mode.encode_to(buf);
        self.next_staker_id.encode_to(buf);
    }
}

impl Decode for StakerRegistry {
    fn decode(cursor: &mut Cursor<'_>) -> serialization::Result<Self> {
        let mut reg = StakerRegistry::new();
        let n_stakers = u64::decode(cursor)?;
        for _ in 0..n_stakers {
            let id = StakerId::decode(cursor)?;
            let record = StakerRecord::decode(cursor)?;
            reg.stakers.insert(id, record);
        }
        let n_aliases = u64::decode(cursor)?;
        for _ in 0..n_aliases {
            let alias_bytes = Vec::<u8>::decode(cursor)?;
            let alias = String::from_utf8(alias_bytes).map_err(|_| serialization::Error::UnexpectedEof)?;
            let id = StakerId::decode(cursor)?;
            reg.aliases.insert(alias, id);
        }
        let n_nft = u64::decode(cursor)?;
        for _ in 0..n_nft {
            let nft = u32::decode(cursor)?;
            let id = StakerId::decode(cursor)?;
            reg.nft_assignments.insert(nft, id);
        }
        reg.queue = Vec::<QueueSlot>::decode(cursor)?;
        reg.round = u64::decode(cursor)?;
        reg.round_seed = Hash256::decode(cursor)?;
        reg.queue_min_time = i64::decode(cursor)?;
        reg.current_slot = u64::decode(cursor)? as usize;
        reg.pico_power = u64::decode(cursor)?;
        reg.last_block_hash = Hash256::decode(cursor)?;
        reg.last_block_height = i32::decode(cursor)?;
        let n_ledgers = u64::decode(cursor)?;
        for _ in 0..n_ledgers {
            let pubkey = Vec::<u8>::decode(cursor)?;
            let amount = Amount::decode(cursor)?;
            reg.ledgers.insert(pubkey, amount);
        }
        reg.replay_mode = bool::decode(cursor)?;
        reg.next_staker_id = StakerId::decode(cursor)?;
        Ok(reg)
    }
}

/// Persists `registry` as the snapshot for `height`, overwriting any prior
/// snapshot at that height (snapshots are taken on the main chain only).
pub fn write_snapshot<S: KvWrite>(store: &mut S, height: i32, registry: &StakerRegistry) -> Result<()> {
    store.put(SNAPSHOT_MAP, &height_key(height), registry.encode()).map_err(Error::Storage)
}

/// `GetRegistrySnapshot`: the latest snapshot at a height `<= at_height`, or
/// a null (default) registry if none exists yet.
pub fn get_snapshot<S: KvRead>(store: &S, at_height: i32) -> Result<StakerRegistry> {
    let rows = store.iter_prefix(SNAPSHOT_MAP, &[]).map_err(Error::Storage)?;
    let best = rows
        .into_iter()
        .filter_map(|(k, v)| {
            let mut buf = [0u8; 4];
            buf.copy_from_slice(&k);
            let h = i32::from_be_bytes(buf);
            (h <= at_height).then_some((h, v))
        })
        .max_by_key(|(h, _)| *h);
    match best {
        Some((_, bytes)) => {
            StakerRegistry::decode_all(&bytes).map_err(|_| Error::InvariantViolation("corrupt registry snapshot"))
        }
        None => Ok(StakerRegistry::new()),
    }
}

/// The miss counter threshold past which a staker is dropped from the round
/// queue entirely on retarget, reflected as `Disqualified` so `queue.rs`'s
/// round-building scan excludes it going forward.
pub fn is_disqualified(state: RegistryState) -> bool {
    matches!(state, RegistryState::Disqualified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::MemoryStore;

    #[test]
    fn snapshot_roundtrips_through_storage() {
        let mut store = MemoryStore::new();
        let mut reg = StakerRegistry::new();
        reg.stakers.insert(1, StakerRecord::new_from_purchase(vec![1, 2, 3]));
        reg.aliases.insert("alice".to_string(), 1);
        reg.last_block_height = 500;
        write_snapshot(&mut store, 500, &reg).unwrap();

        let loaded = get_snapshot(&store, 500).unwrap();
        assert_eq!(loaded.last_block_height, 500);
        assert_eq!(loaded.aliases.get("alice"), Some(&1));
    }

    #[test]
    fn missing_snapshot_returns_null_registry() {
        let store = MemoryStore::new();
        let loaded = get_snapshot(&store, 100).unwrap();
        assert_eq!(loaded.stakers.len(), 0);
    }

    #[test]
    fn snapshot_lookup_takes_the_latest_at_or_before_height() {
        let mut store = MemoryStore::new();
        let mut reg100 = StakerRegistry::new();
        reg100.last_block_height = 100;
        write_snapshot(&mut store, 100, &reg100).unwrap();
        let mut reg200 = StakerRegistry::new();
        reg200.last_block_height = 200;
        write_snapshot(&mut store, 200, &reg200).unwrap();

        assert_eq!(get_snapshot(&store, 150).unwrap().last_block_height, 100);
        assert_eq!(get_snapshot(&store, 250).unwrap().last_block_height, 200);
    }
}
