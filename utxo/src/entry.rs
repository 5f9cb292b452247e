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

use common::chain::TxOutput;
use serialization::{Cursor, Decode, Encode, EncodeAsElement};

/// A still-unspent output, together with the provenance the spender needs to
/// enforce coinbase/coinstake maturity and transaction-timestamp ordering.
/// Presence in the store means unspent; a spend is a deletion, so there is
/// no separate "spent" flag to keep in sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utxo {
    pub output: TxOutput,
    pub height: i32,
    pub is_coinbase: bool,
    pub is_coinstake: bool,
    pub source_time: Option<u32>,
}

impl Utxo {
    pub fn new(
        output: TxOutput,
        height: i32,
        is_coinbase: bool,
        is_coinstake: bool,
        source_time: Option<u32>,
    ) -> Self {
        Utxo { output, height, is_coinbase, is_coinstake, source_time }
    }
}

impl Encode for Utxo {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        self.output.encode_to(buf);
        self.height.encode_to(buf);
        self.is_coinbase.encode_to(buf);
        self.is_coinstake.encode_to(buf);
        match self.source_time {
            Some(t) => {
                true.encode_to(buf);
                t.encode_to(buf);
            }
            None => false.encode_to(buf),
        }
    }
}

impl EncodeAsElement for Utxo {}

impl Decode for Utxo {
    fn decode(cursor: &mut Cursor<'_>) -> serialization::Result<Self> {
        let output = TxOutput::decode(cursor)?;
        let height = i32::decode(cursor)?;
        let is_coinbase = bool::decode(cursor)?;
        let is_coinstake = bool::decode(cursor)?;
        let source_time = if bool::decode(cursor)? { Some(u32::decode(cursor)?) } else { None };
        Ok(Utxo { output, height, is_coinbase, is_coinstake, source_time })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::primitives::Amount;

    #[test]
    fn utxo_roundtrips_with_source_time() {
        let utxo = Utxo::new(
            TxOutput { value: Amount::from_atoms(5_000), script_pubkey: vec![1, 2, 3] },
            100,
            true,
            false,
            Some(1_700_000_000),
        );
        let bytes = utxo.encode();
        assert_eq!(Utxo::decode_all(&bytes).unwrap(), utxo);
    }

    #[test]
    fn utxo_roundtrips_without_source_time() {
        let utxo = Utxo::new(
            TxOutput { value: Amount::from_atoms(1), script_pubkey: vec![] },
            0,
            false,
            false,
            None,
        );
        let bytes = utxo.encode();
        assert_eq!(Utxo::decode_all(&bytes).unwrap(), utxo);
    }
}
