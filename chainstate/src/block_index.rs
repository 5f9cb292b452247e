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

//! The block index tree. Every accepted block header (whether or not it
//! ever becomes part of the best chain) gets a slot in a flat arena;
//! parent/child links are plain integer indices rather than `Rc`/`Arc`
//! pointers, so the tree never needs interior mutability or reference
//! counting to walk in either direction.

use common::chain::BlockHeader;
use common::primitives::Hash256;
use std::collections::HashMap;

pub type Handle = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStatus {
    /// Header checked and connected to a known parent; not necessarily on
    /// the best chain.
    Valid,
    /// On the best chain as of the last `set_best`.
    Active,
}

#[derive(Debug, Clone)]
pub struct BlockIndex {
    pub header: BlockHeader,
    pub height: i32,
    /// Cumulative chain trust from genesis to this block, inclusive
    /// (spec §4.6's "SetBestChain" comparison key).
    pub trust: u128,
    pub prev: Option<Handle>,
    pub status: BlockStatus,
    /// `nMoneySupply` as of this block, inclusive. Carried on the index
    /// itself (mirroring `CBlockIndex::nMoneySupply`) so a reorganization
    /// can read a fork ancestor's supply back out instead of replaying
    /// every block's accounting from genesis.
    pub money_supply: i64,
}

impl BlockIndex {
    pub fn hash(&self) -> Hash256 {
        self.header.hash()
    }
}

/// Arena of [`BlockIndex`] plus the hash index and current best-chain
/// pointer. Mirrors `mapBlockIndex`/`pindexBest` from the reference
/// client, minus the global mutable statics.
#[derive(Debug, Default, Clone)]
pub struct BlockTree {
    nodes: Vec<BlockIndex>,
    by_hash: HashMap<Hash256, Handle>,
    best: Option<Handle>,
}

impl BlockTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, header: BlockHeader, prev: Option<Handle>, trust_delta: u128, money_supply: i64) -> Handle {
        let hash = header.hash();
        let height = match prev {
            Some(p) => self.nodes[p].height + 1,
            None => 0,
        };
        let trust = match prev {
            Some(p) => self.nodes[p].trust.saturating_add(trust_delta),
            None => trust_delta,
        };
        let handle = self.nodes.len();
        self.nodes.push(BlockIndex { header, height, trust, prev, status: BlockStatus::Valid, money_supply });
        self.by_hash.insert(hash, handle);
        handle
    }

    pub fn get(&self, handle: Handle) -> &BlockIndex {
        &self.nodes[handle]
    }

    pub fn by_hash(&self, hash: &Hash256) -> Option<Handle> {
        self.by_hash.get(hash).copied()
    }

    pub fn contains(&self, hash: &Hash256) -> bool {
        self.by_hash.contains_key(hash)
    }

    pub fn best(&self) -> Option<Handle> {
        self.best
    }

    pub fn best_hash(&self) -> Option<Hash256> {
        self.best.map(|h| self.nodes[h].hash())
    }

    pub fn height(&self) -> i32 {
        self.best.map(|h| self.nodes[h].height).unwrap_or(-1)
    }

    /// Records the money supply as of `handle`, once it is known (after
    /// `connect_block` runs). Kept separate from [`insert`](Self::insert)
    /// since a header can be inserted speculatively before it is connected.
    pub fn set_money_supply(&mut self, handle: Handle, money_supply: i64) {
        self.nodes[handle].money_supply = money_supply;
    }

    pub fn set_best(&mut self, handle: Handle) {
        self.best = Some(handle);
        self.nodes[handle].status = BlockStatus::Active;
    }

    /// Walks back from `from` to the ancestor at `target_height`. `None` if
    /// `target_height` is negative or above `from`'s own height.
    pub fn ancestor_at_height(&self, from: Handle, target_height: i32) -> Option<Handle> {
        if target_height < 0 || target_height > self.nodes[from].height {
            return None;
        }
        let mut cursor = from;
        while self.nodes[cursor].height > target_height {
            cursor = self.nodes[cursor].prev?;
        }
        Some(cursor)
    }

    /// Lowest common ancestor of `a` and `b`, walking the shorter branch up
    /// to the taller one's height first and then both in lockstep.
    pub fn find_fork(&self, a: Handle, b: Handle) -> Handle {
        let (mut x, mut y) = (a, b);
        while self.nodes[x].height > self.nodes[y].height {
            x = self.nodes[x].prev.expect("height > 0 implies a parent");
        }
        while self.nodes[y].height > self.nodes[x].height {
            y = self.nodes[y].prev.expect("height > 0 implies a parent");
        }
        while x != y {
            x = self.nodes[x].prev.expect("distinct chains share a genesis ancestor");
            y = self.nodes[y].prev.expect("distinct chains share a genesis ancestor");
        }
        x
    }

    /// The handles strictly between `ancestor` and `tip`, in connect order
    /// (root-ward first). `ancestor` itself is excluded.
    pub fn path_from_ancestor(&self, tip: Handle, ancestor: Handle) -> Vec<Handle> {
        let mut path = Vec::new();
        let mut cursor = tip;
        while cursor != ancestor {
            path.push(cursor);
            cursor = self.nodes[cursor].prev.expect("ancestor lies on this branch");
        }
        path.reverse();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(prev: Hash256, nonce: u32) -> BlockHeader {
        BlockHeader {
            version: 7,
            prev_hash: prev,
            merkle_root: Hash256::ZERO,
            time: 0,
            bits: 0x1d00ffff,
            nonce,
            height: None,
            staker_id: None,
        }
    }

    #[test]
    fn find_fork_on_diverging_branches() {
        let mut tree = BlockTree::new();
        let genesis = tree.insert(header(Hash256::ZERO, 0), None, 1, 0);
        let a1 = tree.insert(header(tree.get(genesis).hash(), 1), Some(genesis), 1, 0);
        let a2 = tree.insert(header(tree.get(a1).hash(), 2), Some(a1), 1, 0);
        let b1 = tree.insert(header(tree.get(genesis).hash(), 3), Some(genesis), 1, 0);
        assert_eq!(tree.find_fork(a2, b1), genesis);
    }

    #[test]
    fn path_from_ancestor_is_root_to_tip_order() {
        let mut tree = BlockTree::new();
        let genesis = tree.insert(header(Hash256::ZERO, 0), None, 1, 0);
        let a1 = tree.insert(header(tree.get(genesis).hash(), 1), Some(genesis), 1, 0);
        let a2 = tree.insert(header(tree.get(a1).hash(), 2), Some(a1), 1, 0);
        assert_eq!(tree.path_from_ancestor(a2, genesis), vec![a1, a2]);
    }
}
