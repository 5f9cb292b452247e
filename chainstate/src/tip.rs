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

//! Adapts a [`BlockTree`] handle into the [`feework::ChainTip`] view
//! collaborators (feework, mempool) need, without those crates taking on a
//! dependency on the block index's own representation.

use crate::block_index::{BlockTree, Handle};
use common::chain::{ChainParams, Fork};
use common::primitives::Hash256;
use feework::ChainTip;

pub struct TreeTip<'a> {
    pub tree: &'a BlockTree,
    pub at: Handle,
    pub params: &'a ChainParams,
}

impl<'a> ChainTip for TreeTip<'a> {
    fn tip_height(&self) -> i32 {
        self.tree.get(self.at).height
    }

    fn block_hash_at(&self, height: i32) -> Option<Hash256> {
        self.tree.ancestor_at_height(self.at, height).map(|h| self.tree.get(h).hash())
    }

    fn fork_at(&self, height: i32) -> Fork {
        self.params.get_fork(height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::chain::BlockHeader;

    fn header(prev: Hash256, nonce: u32) -> BlockHeader {
        BlockHeader {
            version: 1,
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
    fn reports_height_and_ancestor_hashes() {
        let mut tree = BlockTree::new();
        let genesis = tree.insert(header(Hash256::ZERO, 0), None, 1, 0);
        let a1 = tree.insert(header(tree.get(genesis).hash(), 1), Some(genesis), 1, 0);
        let params = ChainParams::mainnet();
        let tip = TreeTip { tree: &tree, at: a1, params: &params };
        assert_eq!(tip.tip_height(), 1);
        assert_eq!(tip.block_hash_at(0), Some(tree.get(genesis).hash()));
        assert_eq!(tip.block_hash_at(5), None);
    }
}
