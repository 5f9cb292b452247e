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

//! The deterministic qPoS round queue: a PRNG-permuted ordering of eligible
//! stakers, each assigned one `QP_TARGET_SPACING`-second slot per round.

use crate::error::{Error, Result};
use crate::types::{QueueSlot, StakerRegistry};
use common::chain::StakerId;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

/// Builds the queue for a new round: permute the currently-enabled staker
/// ids deterministically from `round_seed`, then lay out `[start, end)`
/// slots of `slot_seconds` each starting at `queue_min_time`.
pub fn build_round_queue(
    registry: &StakerRegistry,
    slot_seconds: i64,
) -> Vec<QueueSlot> {
    let mut ids: Vec<StakerId> =
        registry.stakers.iter().filter(|(_, s)| s.is_qualified()).map(|(id, _)| *id).collect();
    let mut seed = [0u8; 32];
    seed.copy_from_slice(registry.round_seed.as_bytes());
    let mut rng = ChaCha20Rng::from_seed(seed);
    ids.shuffle(&mut rng);

    let mut slots = Vec::with_capacity(ids.len());
    let mut t = registry.queue_min_time;
    for id in ids {
        slots.push(QueueSlot { staker_id: id, start: t, end: t + slot_seconds });
        t += slot_seconds;
    }
    slots
}

impl StakerRegistry {
    /// Spec §4.5 `TimestampIsValid`: `time` must fall within `staker_id`'s
    /// slot of the current queue.
    pub fn timestamp_is_valid(&self, staker_id: StakerId, time: i64) -> bool {
        self.queue
            .iter()
            .any(|slot| slot.staker_id == staker_id && time >= slot.start && time < slot.end)
    }

    pub fn slot_for(&self, staker_id: StakerId) -> Option<QueueSlot> {
        self.queue.iter().copied().find(|slot| slot.staker_id == staker_id)
    }

    /// Records a missed slot, disqualifying the staker once its miss
    /// counter crosses `max_misses`.
    pub fn record_missed_slot(&mut self, staker_id: StakerId, max_misses: u32) -> Result<()> {
        let record = self
            .stakers
            .get_mut(&staker_id)
            .ok_or(Error::StakerNotFound(staker_id))?;
        record.missed_counter += 1;
        if record.missed_counter >= max_misses {
            record.state = crate::types::RegistryState::Disqualified;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StakerRecord;

    fn registry_with_n_stakers(n: u32) -> StakerRegistry {
        let mut reg = StakerRegistry::new();
        for i in 1..=n {
            let mut rec = StakerRecord::new_from_purchase(vec![i as u8]);
            rec.state = crate::types::RegistryState::Enabled;
            reg.stakers.insert(i, rec);
        }
        reg.round_seed = crypto::sha256d(b"round-0");
        reg.queue_min_time = 1_700_000_000;
        reg
    }

    #[test]
    fn queue_contains_every_enabled_staker_exactly_once() {
        let reg = registry_with_n_stakers(5);
        let queue = build_round_queue(&reg, 5);
        assert_eq!(queue.len(), 5);
        let mut ids: Vec<_> = queue.iter().map(|s| s.staker_id).collect();
        ids.sort();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn same_seed_produces_same_permutation() {
        let reg = registry_with_n_stakers(10);
        let q1 = build_round_queue(&reg, 5);
        let q2 = build_round_queue(&reg, 5);
        assert_eq!(q1, q2);
    }

    #[test]
    fn timestamp_valid_only_inside_slot_window() {
        let mut reg = registry_with_n_stakers(1);
        reg.queue = build_round_queue(&reg, 5);
        let slot = reg.slot_for(1).unwrap();
        assert!(reg.timestamp_is_valid(1, slot.start));
        assert!(!reg.timestamp_is_valid(1, slot.end));
    }

    #[test]
    fn missed_slot_disqualifies_past_threshold() {
        let mut reg = registry_with_n_stakers(1);
        reg.record_missed_slot(1, 3).unwrap();
        reg.record_missed_slot(1, 3).unwrap();
        assert_eq!(reg.stakers[&1].state, crate::types::RegistryState::Enabled);
        reg.record_missed_slot(1, 3).unwrap();
        assert_eq!(reg.stakers[&1].state, crate::types::RegistryState::Disqualified);
    }
}
