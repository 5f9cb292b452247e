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

use common::chain::{build_merkle_root, Block, BlockHeader, Transaction};
use common::primitives::Hash256;

/// A fluent builder for [`Block`]s. Computes the merkle root from whatever
/// transactions are set at [`Self::build`] time, so callers never need to
/// keep it in sync by hand. `vDeets` and the block signature default to
/// empty; set them explicitly for tests that exercise those paths.
pub struct BlockBuilder {
    version: u32,
    prev_hash: Hash256,
    time: u32,
    bits: u32,
    nonce: u32,
    height: Option<i32>,
    staker_id: Option<u32>,
    transactions: Vec<Transaction>,
    deets: Vec<(usize, usize, common::chain::Deet)>,
    signature: Vec<u8>,
}

impl Default for BlockBuilder {
    fn default() -> Self {
        Self {
            version: 1,
            prev_hash: Hash256::ZERO,
            time: 1_700_000_000,
            bits: 0x1d00ffff,
            nonce: 0,
            height: None,
            staker_id: None,
            transactions: Vec::new(),
            deets: Vec::new(),
            signature: Vec::new(),
        }
    }
}

impl BlockBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prev_hash(mut self, prev_hash: Hash256) -> Self {
        self.prev_hash = prev_hash;
        self
    }

    pub fn time(mut self, time: u32) -> Self {
        self.time = time;
        self
    }

    pub fn bits(mut self, bits: u32) -> Self {
        self.bits = bits;
        self
    }

    pub fn nonce(mut self, nonce: u32) -> Self {
        self.nonce = nonce;
        self
    }

    /// Marks this as a qPoS block at `height`, staked by `staker_id`.
    pub fn qpos(mut self, height: i32, staker_id: u32) -> Self {
        self.height = Some(height);
        self.staker_id = Some(staker_id);
        self
    }

    pub fn transaction(mut self, tx: Transaction) -> Self {
        self.transactions.push(tx);
        self
    }

    pub fn transactions(mut self, txs: Vec<Transaction>) -> Self {
        self.transactions = txs;
        self
    }

    pub fn signature(mut self, signature: Vec<u8>) -> Self {
        self.signature = signature;
        self
    }

    pub fn build(self) -> Block {
        let txids: Vec<Hash256> = self.transactions.iter().map(|tx| tx.txid()).collect();
        let header = BlockHeader {
            version: self.version,
            prev_hash: self.prev_hash,
            merkle_root: build_merkle_root(&txids),
            time: self.time,
            bits: self.bits,
            nonce: self.nonce,
            height: self.height,
            staker_id: self.staker_id,
        };
        Block { header, transactions: self.transactions, deets: self.deets, signature: self.signature }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TxBuilder;

    #[test]
    fn build_computes_merkle_root_over_given_transactions() {
        let tx = TxBuilder::new().build();
        let block = BlockBuilder::new().transaction(tx.clone()).build();
        assert_eq!(block.header.merkle_root, build_merkle_root(&[tx.txid()]));
    }

    #[test]
    fn qpos_marks_header_accordingly() {
        let block = BlockBuilder::new().qpos(10, 3).build();
        assert!(block.header.is_qpos());
        assert_eq!(block.header.height, Some(10));
        assert_eq!(block.header.staker_id, Some(3));
    }
}
