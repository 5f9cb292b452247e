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

//! Blocks that arrive before their parent: held here keyed by hash and by
//! the parent hash they're waiting on (`mapOrphanBlocks` /
//! `mapOrphanBlocksByPrev`), and replayed once that parent connects.

use common::chain::Block;
use common::primitives::Hash256;
use std::collections::HashMap;

/// Caps total buffered orphans. The legacy node had no such limit for
/// blocks (only for orphan transactions); an unbounded map of whole blocks
/// from unauthenticated peers is a much larger memory-exhaustion surface,
/// so a cap is carried here even though nothing in the original enforces one.
const MAX_ORPHAN_BLOCKS: usize = 750;

#[derive(Debug, Default)]
pub struct OrphanPool {
    by_hash: HashMap<Hash256, Block>,
    by_prev: HashMap<Hash256, Vec<Hash256>>,
}

impl OrphanPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_hash.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_hash.is_empty()
    }

    pub fn contains(&self, hash: &Hash256) -> bool {
        self.by_hash.contains_key(hash)
    }

    /// Buffer `block`, evicting the oldest-inserted orphan first if this
    /// would exceed [`MAX_ORPHAN_BLOCKS`]. Does nothing if `hash` is
    /// already buffered.
    pub fn insert(&mut self, hash: Hash256, block: Block) {
        if self.by_hash.contains_key(&hash) {
            return;
        }
        if self.by_hash.len() >= MAX_ORPHAN_BLOCKS {
            if let Some(&oldest) = self.by_hash.keys().next() {
                self.remove(&oldest);
            }
        }
        let prev_hash = block.header.prev_hash;
        self.by_prev.entry(prev_hash).or_default().push(hash);
        self.by_hash.insert(hash, block);
    }

    /// Drop `hash` from both indices, returning the block if it was present.
    pub fn remove(&mut self, hash: &Hash256) -> Option<Block> {
        let block = self.by_hash.remove(hash)?;
        let prev_hash = block.header.prev_hash;
        if let Some(children) = self.by_prev.get_mut(&prev_hash) {
            children.retain(|h| h != hash);
            if children.is_empty() {
                self.by_prev.remove(&prev_hash);
            }
        }
        Some(block)
    }

    /// Every orphan directly waiting on `parent_hash`, removed from the
    /// pool. Caller is expected to try `accept_block` on each in turn and
    /// re-buffer (via [`insert`](Self::insert)) any that are still orphans
    /// of a *different* missing ancestor -- shouldn't happen once `parent_hash`
    /// itself connects, but a malformed orphan chain could still loop back.
    pub fn take_children_of(&mut self, parent_hash: &Hash256) -> Vec<Block> {
        let Some(hashes) = self.by_prev.remove(parent_hash) else { return Vec::new() };
        hashes.into_iter().filter_map(|h| self.by_hash.remove(&h)).collect()
    }

    /// Walks an orphan chain back to the first block still missing its
    /// parent, mirroring `WantedByOrphan`'s use in relay: a peer announcing
    /// only the tip of an orphan chain is re-asked for the block this node
    /// actually needs next.
    pub fn root_ancestor_needed<'a>(&'a self, mut hash: &'a Hash256) -> &'a Hash256 {
        while let Some(block) = self.by_hash.get(hash) {
            hash = &block.header.prev_hash;
        }
        hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::chain::BlockHeader;

    fn block(prev: Hash256, nonce: u32) -> Block {
        Block {
            header: BlockHeader {
                version: 1,
                prev_hash: prev,
                merkle_root: Hash256::ZERO,
                time: 1,
                bits: 0x1d00ffff,
                nonce,
                height: None,
                staker_id: None,
            },
            transactions: vec![],
            deets: vec![],
            signature: vec![],
        }
    }

    fn hash_of(nonce: u32) -> Hash256 {
        let mut bytes = [0u8; 32];
        bytes[0..4].copy_from_slice(&nonce.to_le_bytes());
        Hash256::from_bytes(bytes)
    }

    #[test]
    fn children_are_indexed_by_prev_hash() {
        let mut pool = OrphanPool::new();
        let parent = hash_of(1);
        let child_a = block(parent, 2);
        let child_b = block(parent, 3);
        pool.insert(hash_of(2), child_a);
        pool.insert(hash_of(3), child_b);

        assert_eq!(pool.len(), 2);
        let children = pool.take_children_of(&parent);
        assert_eq!(children.len(), 2);
        assert!(pool.is_empty());
    }

    #[test]
    fn duplicate_insert_is_a_no_op() {
        let mut pool = OrphanPool::new();
        let parent = hash_of(1);
        pool.insert(hash_of(2), block(parent, 2));
        pool.insert(hash_of(2), block(parent, 99));
        assert_eq!(pool.len(), 1);
        let children = pool.take_children_of(&parent);
        assert_eq!(children[0].header.nonce, 2);
    }

    #[test]
    fn root_ancestor_needed_walks_the_chain() {
        let mut pool = OrphanPool::new();
        let root = hash_of(1);
        let mid = hash_of(2);
        let tip = hash_of(3);
        pool.insert(mid, block(root, 2));
        pool.insert(tip, block(mid, 3));

        assert_eq!(pool.root_ancestor_needed(&tip), &root);
    }

    #[test]
    fn remove_cleans_up_empty_prev_buckets() {
        let mut pool = OrphanPool::new();
        let parent = hash_of(1);
        let child = hash_of(2);
        pool.insert(child, block(parent, 2));
        pool.remove(&child);
        assert!(pool.is_empty());
        assert!(pool.take_children_of(&parent).is_empty());
    }
}
