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

use crate::chain::deets::Deet;
use crate::chain::Transaction;
use crate::primitives::Hash256;
use serialization::{Cursor, Decode, Encode};

/// `nHeight`/`nStakerID` are present in the wire header from the qPoS fork
/// onward; before that the header is the legacy five-field shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub version: u32,
    pub prev_hash: Hash256,
    pub merkle_root: Hash256,
    pub time: u32,
    pub bits: u32,
    pub nonce: u32,
    /// `Some` from the qPoS fork onward; ignored (and must be `None`) before it.
    pub height: Option<i32>,
    /// `Some` from the qPoS fork onward; ignored (and must be `None`) before it.
    pub staker_id: Option<u32>,
}

impl BlockHeader {
    pub fn hash(&self) -> Hash256 {
        crypto::sha256d(&self.encode())
    }

    pub fn is_qpos(&self) -> bool {
        self.height.is_some()
    }
}

impl Encode for BlockHeader {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        self.version.encode_to(buf);
        self.prev_hash.encode_to(buf);
        self.merkle_root.encode_to(buf);
        self.time.encode_to(buf);
        self.bits.encode_to(buf);
        self.nonce.encode_to(buf);
        if let Some(height) = self.height {
            height.encode_to(buf);
            self.staker_id.expect("qPoS header must carry a staker id").encode_to(buf);
        }
    }
}

/// Header decoding alone cannot tell whether the trailing height/staker-id
/// pair is present (that depends on the fork active at this header's
/// height, which requires chain-state context this crate does not hold).
/// Callers decode the legacy five fields via [`BlockHeader::decode_legacy`]
/// or the qPoS seven-field shape via [`BlockHeader::decode_qpos`], chosen by
/// the fork schedule.
impl BlockHeader {
    pub fn decode_legacy(cursor: &mut Cursor<'_>) -> serialization::Result<Self> {
        Ok(BlockHeader {
            version: u32::decode(cursor)?,
            prev_hash: Hash256::decode(cursor)?,
            merkle_root: Hash256::decode(cursor)?,
            time: u32::decode(cursor)?,
            bits: u32::decode(cursor)?,
            nonce: u32::decode(cursor)?,
            height: None,
            staker_id: None,
        })
    }

    pub fn decode_qpos(cursor: &mut Cursor<'_>) -> serialization::Result<Self> {
        let mut header = Self::decode_legacy(cursor)?;
        header.height = Some(i32::decode(cursor)?);
        header.staker_id = Some(u32::decode(cursor)?);
        Ok(header)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BlockError {
    #[error("block exceeds max size")]
    TooLarge,
    #[error("vDeets order does not match tx/output order")]
    BadDeetsOrder,
}

/// header plus ordered transactions plus the cached `vDeets` extraction.
/// The block-signature field (empty for genesis) is carried separately from
/// the header because it signs the header and is excluded from the header
/// hash itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
    pub deets: Vec<(usize, usize, Deet)>,
    pub signature: Vec<u8>,
}

pub const MAX_BLOCK_SIZE: usize = 1_000_000;

impl Block {
    pub fn hash(&self) -> Hash256 {
        self.header.hash()
    }

    /// `vDeets` must be ordered first by tx index, then by output index.
    pub fn check_deets_order(&self) -> Result<(), BlockError> {
        let mut prev: Option<(usize, usize)> = None;
        for (tx_idx, out_idx, _) in &self.deets {
            if let Some(p) = prev {
                if (*tx_idx, *out_idx) <= p {
                    return Err(BlockError::BadDeetsOrder);
                }
            }
            prev = Some((*tx_idx, *out_idx));
        }
        Ok(())
    }

    pub fn has_coinbase(&self) -> bool {
        self.transactions.first().map(|tx| tx.is_coinbase()).unwrap_or(false)
    }

    pub fn has_coinstake(&self) -> bool {
        self.transactions.get(1).map(|tx| tx.is_coinstake()).unwrap_or(false)
    }
}

/// Builds the merkle root over a transaction list the way the reference
/// client does: leaves are txids, internal nodes are `sha256d(left || right)`,
/// an odd trailing leaf is duplicated rather than carried unpaired.
pub fn build_merkle_root(txids: &[Hash256]) -> Hash256 {
    if txids.is_empty() {
        return Hash256::ZERO;
    }
    let mut level: Vec<Hash256> = txids.to_vec();
    while level.len() > 1 {
        if level.len() % 2 == 1 {
            level.push(*level.last().unwrap());
        }
        level = level
            .chunks(2)
            .map(|pair| {
                let mut buf = Vec::with_capacity(64);
                buf.extend_from_slice(pair[0].as_bytes());
                buf.extend_from_slice(pair[1].as_bytes());
                crypto::sha256d(&buf)
            })
            .collect();
    }
    level[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> BlockHeader {
        BlockHeader {
            version: 7,
            prev_hash: Hash256::ZERO,
            merkle_root: Hash256::ZERO,
            time: 1_700_000_000,
            bits: 0x1d00ffff,
            nonce: 42,
            height: None,
            staker_id: None,
        }
    }

    #[test]
    fn legacy_header_roundtrips() {
        let header = sample_header();
        let bytes = header.encode();
        let mut cursor = Cursor::new(&bytes);
        let decoded = BlockHeader::decode_legacy(&mut cursor).unwrap();
        assert_eq!(header, decoded);
    }

    #[test]
    fn qpos_header_roundtrips_with_height_and_staker() {
        let mut header = sample_header();
        header.height = Some(3_700_000);
        header.staker_id = Some(17);
        let bytes = header.encode();
        let mut cursor = Cursor::new(&bytes);
        let decoded = BlockHeader::decode_qpos(&mut cursor).unwrap();
        assert_eq!(header, decoded);
    }

    #[test]
    fn merkle_root_of_single_tx_is_its_txid() {
        let txid = crypto::sha256d(b"one");
        assert_eq!(build_merkle_root(&[txid]), txid);
    }

    #[test]
    fn merkle_root_duplicates_odd_trailing_leaf() {
        let a = crypto::sha256d(b"a");
        let b = crypto::sha256d(b"b");
        let c = crypto::sha256d(b"c");
        let with_dup = build_merkle_root(&[a, b, c, c]);
        let odd = build_merkle_root(&[a, b, c]);
        assert_eq!(with_dup, odd);
    }

    #[test]
    fn deets_order_violation_detected() {
        let mut block = Block {
            header: sample_header(),
            transactions: vec![],
            deets: vec![(0, 1, Deet::SetState { staker_id: 1, state: crate::chain::deets::StakerState::Enabled })],
            signature: vec![],
        };
        block.deets.push((0, 0, Deet::SetState { staker_id: 2, state: crate::chain::deets::StakerState::Disabled }));
        assert_eq!(block.check_deets_order(), Err(BlockError::BadDeetsOrder));
    }
}
