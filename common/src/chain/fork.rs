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

//! The fork schedule: a sorted list of `(height, fork)` pairs and the
//! monotone-scan lookup `GetFork(height)` that returns the fork active at
//! that height (spec §4.1). Named forks are given in ascending order.

/// A named height boundary past which protocol rules change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Fork {
    Genesis,
    Fork002,
    Fork004,
    Fork005,
    Fork006,
    ForkPurchase,
    ForkPurchase2,
    ForkPurchase3,
    ForkQPoS,
    ForkQPoSB,
    ForkNft,
    ForkFeeless,
    ForkMissfix,
}

/// Ascending `(height, fork)` schedule. `GetFork` does a monotone scan: the
/// active fork is the greatest one whose height is `<= target`.
#[derive(Debug, Clone)]
pub struct ForkSchedule(Vec<(i32, Fork)>);

impl ForkSchedule {
    /// Build a schedule from ascending `(height, fork)` pairs. Panics (a
    /// programmer error, per spec §4.1) if the pairs are not strictly
    /// ascending in height or don't start at height 0.
    pub fn new(pairs: Vec<(i32, Fork)>) -> Self {
        assert!(!pairs.is_empty(), "fork schedule must not be empty");
        assert_eq!(pairs[0].0, 0, "fork schedule must start at height 0");
        for w in pairs.windows(2) {
            assert!(w[0].0 < w[1].0, "fork schedule heights must be ascending");
        }
        ForkSchedule(pairs)
    }

    /// The fork active at `height`: the greatest fork whose height is `<=
    /// height`. Lookups on an empty schedule are a programmer error (spec
    /// §4.1 "Failure: none").
    pub fn get_fork(&self, height: i32) -> Fork {
        let mut active = self.0[0].1;
        for &(h, fork) in &self.0 {
            if h > height {
                break;
            }
            active = fork;
        }
        active
    }

    pub fn height_of(&self, fork: Fork) -> Option<i32> {
        self.0.iter().find(|(_, f)| *f == fork).map(|(h, _)| *h)
    }
}

/// Same monotone-scan idiom, used to resolve the protocol-version floor for
/// peers at a given fork.
#[derive(Debug, Clone)]
pub struct ProtocolVersionSchedule(Vec<(Fork, u32)>);

impl ProtocolVersionSchedule {
    pub fn new(pairs: Vec<(Fork, u32)>) -> Self {
        ProtocolVersionSchedule(pairs)
    }

    pub fn min_protocol_version(&self, fork: Fork) -> u32 {
        self.0
            .iter()
            .filter(|(f, _)| *f <= fork)
            .map(|(_, v)| *v)
            .last()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mainnet_schedule() -> ForkSchedule {
        ForkSchedule::new(vec![
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
        ])
    }

    #[test]
    fn fork_at_exact_boundary() {
        let s = mainnet_schedule();
        assert_eq!(s.get_fork(5460), Fork::Fork002);
        assert_eq!(s.get_fork(5459), Fork::Genesis);
    }

    #[test]
    fn fork_between_boundaries() {
        let s = mainnet_schedule();
        assert_eq!(s.get_fork(1_000_000), Fork::Fork004);
    }

    #[test]
    fn fork_past_last_boundary() {
        let s = mainnet_schedule();
        assert_eq!(s.get_fork(10_000_000), Fork::ForkMissfix);
    }

    #[test]
    #[should_panic(expected = "ascending")]
    fn non_ascending_schedule_panics() {
        ForkSchedule::new(vec![(0, Fork::Genesis), (5, Fork::Fork002), (3, Fork::Fork004)]);
    }
}
