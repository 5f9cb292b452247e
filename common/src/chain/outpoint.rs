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

use crate::primitives::Hash256;
use serialization::{Cursor, Decode, Encode, EncodeAsElement};

/// A reference to a specific output of a specific prior transaction.
/// `index == u32::MAX` marks a coinbase/coinstake's null input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutPoint {
    pub tx_hash: Hash256,
    pub index: u32,
}

impl OutPoint {
    pub const fn new(tx_hash: Hash256, index: u32) -> Self {
        OutPoint { tx_hash, index }
    }

    pub fn null() -> Self {
        OutPoint { tx_hash: Hash256::ZERO, index: u32::MAX }
    }

    pub fn is_null(&self) -> bool {
        self.tx_hash.is_zero() && self.index == u32::MAX
    }
}

impl Encode for OutPoint {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        self.tx_hash.encode_to(buf);
        self.index.encode_to(buf);
    }
}

impl EncodeAsElement for OutPoint {}

impl Decode for OutPoint {
    fn decode(cursor: &mut Cursor<'_>) -> serialization::Result<Self> {
        Ok(OutPoint { tx_hash: Hash256::decode(cursor)?, index: u32::decode(cursor)? })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_outpoint_roundtrips() {
        let op = OutPoint::null();
        assert!(op.is_null());
        let bytes = op.encode();
        let decoded = OutPoint::decode_all(&bytes).unwrap();
        assert_eq!(op, decoded);
    }
}
