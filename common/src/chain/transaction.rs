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

use crate::primitives::{money_range, Amount, Hash256, MAX_MONEY};
use crate::chain::OutPoint;
use serialization::{Cursor, Decode, Encode, EncodeAsElement};
use std::collections::HashSet;

/// Transactions at this version and above omit the legacy per-tx timestamp
/// and may carry a feework output in place of a money fee.
pub const FEELESS_VERSION: i32 = 2;

/// The highest transaction version this node will relay or mine.
pub const CURRENT_VERSION: i32 = 2;

/// The highest block version this node will relay or mine.
pub const CURRENT_BLOCK_VERSION: i32 = 8;

/// A reference to a previous output, an unlocking script, and a sequence
/// number. Sequence numbers below `SEQUENCE_FINAL` participate in the
/// legacy relative-locktime-free "final" check only by being non-final;
/// this core does not implement BIP68-style relative locktime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxInput {
    pub prev_out: OutPoint,
    pub script_sig: Vec<u8>,
    pub sequence: u32,
}

pub const SEQUENCE_FINAL: u32 = 0xffff_ffff;

impl TxInput {
    pub fn new(prev_out: OutPoint, script_sig: Vec<u8>) -> Self {
        TxInput { prev_out, script_sig, sequence: SEQUENCE_FINAL }
    }

    pub fn is_final(&self) -> bool {
        self.sequence == SEQUENCE_FINAL
    }
}

impl Encode for TxInput {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        self.prev_out.encode_to(buf);
        self.script_sig.encode_to(buf);
        self.sequence.encode_to(buf);
    }
}

impl EncodeAsElement for TxInput {}

impl Decode for TxInput {
    fn decode(cursor: &mut Cursor<'_>) -> serialization::Result<Self> {
        Ok(TxInput {
            prev_out: OutPoint::decode(cursor)?,
            script_sig: Vec::<u8>::decode(cursor)?,
            sequence: u32::decode(cursor)?,
        })
    }
}

/// An amount paid to a locking script. `amount == 0 && script.is_empty()`
/// marks the distinguished "empty" output used as a coinstake's first slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutput {
    pub value: Amount,
    pub script_pubkey: Vec<u8>,
}

impl TxOutput {
    pub fn is_empty(&self) -> bool {
        self.value == Amount::from_atoms(0) && self.script_pubkey.is_empty()
    }
}

impl Encode for TxOutput {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        self.value.encode_to(buf);
        self.script_pubkey.encode_to(buf);
    }
}

impl EncodeAsElement for TxOutput {}

impl Decode for TxOutput {
    fn decode(cursor: &mut Cursor<'_>) -> serialization::Result<Self> {
        Ok(TxOutput { value: Amount::decode(cursor)?, script_pubkey: Vec::<u8>::decode(cursor)? })
    }
}

/// A structural error in a transaction, checked independent of chain state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TxError {
    #[error("transaction has no inputs")]
    NoInputs,
    #[error("transaction has no outputs")]
    NoOutputs,
    #[error("transaction exceeds max block size: {0} bytes")]
    TooLarge(usize),
    #[error("transaction spends the same outpoint twice")]
    DuplicateInput,
    #[error("output value out of money range")]
    OutOfMoneyRange,
    #[error("sum of output values exceeds MAX_MONEY")]
    OutputsOverflow,
    #[error("coinbase scriptSig length {0} out of range [2, 100]")]
    BadCoinbaseScriptLength(usize),
}

/// version, optional legacy timestamp, ordered inputs, ordered outputs.
///
/// `time` is present in wire form only for `version < FEELESS_VERSION`;
/// transactions at `FEELESS_VERSION` or above never carry it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub version: i32,
    pub time: Option<u32>,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
}

pub const MAX_BLOCK_SIZE: usize = 1_000_000;

impl Transaction {
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].prev_out.is_null()
    }

    /// A coinstake has an empty first output and at least one more output
    /// paying the stake reward; the second output is not itself checked for
    /// emptiness here (chain-state aware rules live in the block validator).
    pub fn is_coinstake(&self) -> bool {
        !self.is_coinbase()
            && self.outputs.len() >= 2
            && self.outputs[0].is_empty()
    }

    pub fn txid(&self) -> Hash256 {
        crypto::sha256d(&self.encode())
    }

    /// Structural checks independent of chain state (spec: `CheckTransaction`
    /// minus the fork-gated per-output amount floor, which the caller applies
    /// once it knows the active fork).
    pub fn check_structure(&self) -> Result<(), TxError> {
        if self.inputs.is_empty() {
            return Err(TxError::NoInputs);
        }
        if self.outputs.is_empty() {
            return Err(TxError::NoOutputs);
        }
        let size = self.encode().len();
        if size > MAX_BLOCK_SIZE {
            return Err(TxError::TooLarge(size));
        }
        let mut seen = HashSet::with_capacity(self.inputs.len());
        for input in &self.inputs {
            if !seen.insert(input.prev_out) {
                return Err(TxError::DuplicateInput);
            }
        }
        let mut total = Amount::from_atoms(0);
        for output in &self.outputs {
            if !money_range(output.value) {
                return Err(TxError::OutOfMoneyRange);
            }
            total = match total.checked_add(output.value) {
                Some(t) if t <= MAX_MONEY => t,
                _ => return Err(TxError::OutputsOverflow),
            };
        }
        if self.is_coinbase() {
            let len = self.inputs[0].script_sig.len();
            if !(2..=100).contains(&len) {
                return Err(TxError::BadCoinbaseScriptLength(len));
            }
        }
        Ok(())
    }
}

impl Encode for Transaction {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        self.version.encode_to(buf);
        if self.version < FEELESS_VERSION {
            self.time.expect("pre-feeless transactions must carry a timestamp").encode_to(buf);
        }
        self.inputs.encode_to(buf);
        self.outputs.encode_to(buf);
    }
}

impl Decode for Transaction {
    fn decode(cursor: &mut Cursor<'_>) -> serialization::Result<Self> {
        let version = i32::decode(cursor)?;
        let time = if version < FEELESS_VERSION { Some(u32::decode(cursor)?) } else { None };
        let inputs = Vec::<TxInput>::decode(cursor)?;
        let outputs = Vec::<TxOutput>::decode(cursor)?;
        Ok(Transaction { version, time, inputs, outputs })
    }
}

impl EncodeAsElement for Transaction {}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tx(version: i32) -> Transaction {
        Transaction {
            version,
            time: if version < FEELESS_VERSION { Some(1_700_000_000) } else { None },
            inputs: vec![TxInput::new(OutPoint::new(Hash256::ZERO, 0), vec![1, 2, 3])],
            outputs: vec![TxOutput { value: Amount::from_atoms(1_000), script_pubkey: vec![4, 5] }],
        }
    }

    #[test]
    fn feeless_version_has_no_wire_timestamp() {
        let tx = sample_tx(FEELESS_VERSION);
        let bytes = tx.encode();
        let decoded = Transaction::decode_all(&bytes).unwrap();
        assert_eq!(decoded.time, None);
        assert_eq!(tx, decoded);
    }

    #[test]
    fn pre_feeless_version_roundtrips_timestamp() {
        let tx = sample_tx(1);
        let bytes = tx.encode();
        let decoded = Transaction::decode_all(&bytes).unwrap();
        assert_eq!(decoded.time, Some(1_700_000_000));
        assert_eq!(tx, decoded);
    }

    #[test]
    fn duplicate_input_outpoint_is_rejected() {
        let mut tx = sample_tx(FEELESS_VERSION);
        tx.inputs.push(tx.inputs[0].clone());
        assert_eq!(tx.check_structure(), Err(TxError::DuplicateInput));
    }

    #[test]
    fn coinbase_requires_null_single_input() {
        let mut tx = sample_tx(FEELESS_VERSION);
        tx.inputs = vec![TxInput::new(OutPoint::null(), vec![0u8; 4])];
        assert!(tx.is_coinbase());
        assert!(tx.check_structure().is_ok());
    }

    #[test]
    fn empty_outputs_rejected() {
        let mut tx = sample_tx(FEELESS_VERSION);
        tx.outputs.clear();
        assert_eq!(tx.check_structure(), Err(TxError::NoOutputs));
    }
}
