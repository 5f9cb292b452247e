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

//! Persists full block bodies keyed by hash, for reorgs and for serving
//! relayed blocks back to peers. `vDeets` is never written: it's rebuilt by
//! [`crate::deets::build_vdeets`] on the way back out, since it's a derived
//! cache rather than part of the wire block.

use crate::deets::build_vdeets;
use crate::error::Result;
use common::chain::{Block, BlockHeader, Fork, Transaction};
use common::primitives::Hash256;
use serialization::{Cursor, Decode, Encode};
use storage::{KvRead, KvWrite};

const MAP: &str = "blocks";

fn encode_body(block: &Block) -> Vec<u8> {
    let mut buf = Vec::new();
    block.header.encode_to(&mut buf);
    block.transactions.encode_to(&mut buf);
    block.signature.encode_to(&mut buf);
    buf
}

fn decode_body(bytes: &[u8], fork: Fork) -> serialization::Result<Block> {
    let mut cursor = Cursor::new(bytes);
    let header = if fork >= Fork::ForkQPoS {
        BlockHeader::decode_qpos(&mut cursor)?
    } else {
        BlockHeader::decode_legacy(&mut cursor)?
    };
    let transactions = Vec::<Transaction>::decode(&mut cursor)?;
    let signature = Vec::<u8>::decode(&mut cursor)?;
    let deets = build_vdeets(&transactions, fork);
    Ok(Block { header, transactions, deets, signature })
}

pub fn put_block<S: KvWrite>(store: &mut S, block: &Block) -> Result<()> {
    let hash = block.hash();
    store.put(MAP, hash.as_bytes(), encode_body(block))?;
    Ok(())
}

pub fn get_block<S: KvRead>(store: &S, hash: &Hash256, fork: Fork) -> Result<Option<Block>> {
    match store.get(MAP, hash.as_bytes())? {
        Some(bytes) => {
            let block = decode_body(&bytes, fork)
                .map_err(|_| crate::error::Error::InvariantViolation("stored block body is corrupt"))?;
            Ok(Some(block))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::chain::{OutPoint, TxInput, TxOutput};
    use common::primitives::Amount;
    use storage::MemoryStore;

    fn sample_block() -> Block {
        let tx = Transaction {
            version: 1,
            time: None,
            inputs: vec![TxInput::new(OutPoint::null(), vec![0; 4])],
            outputs: vec![TxOutput { value: Amount::from_atoms(1_000), script_pubkey: vec![] }],
        };
        Block {
            header: BlockHeader {
                version: 1,
                prev_hash: Hash256::ZERO,
                merkle_root: Hash256::ZERO,
                time: 100,
                bits: 0x1d00ffff,
                nonce: 7,
                height: None,
                staker_id: None,
            },
            transactions: vec![tx],
            deets: vec![],
            signature: vec![],
        }
    }

    #[test]
    fn round_trips_a_legacy_block() {
        let mut store = MemoryStore::new();
        let block = sample_block();
        put_block(&mut store, &block).unwrap();
        let loaded = get_block(&store, &block.hash(), Fork::Fork005).unwrap().unwrap();
        assert_eq!(loaded.header, block.header);
        assert_eq!(loaded.transactions, block.transactions);
        assert_eq!(loaded.signature, block.signature);
    }

    #[test]
    fn missing_hash_returns_none() {
        let store = MemoryStore::new();
        assert_eq!(get_block(&store, &Hash256::ZERO, Fork::Fork005).unwrap(), None);
    }
}
