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

use common::chain::{OutPoint, Transaction, TxInput, TxOutput, FEELESS_VERSION};
use common::primitives::Amount;
use script::{Opcode, Script};

use crate::random_pubkey;

/// A fluent builder for [`Transaction`]s. Defaults to a feeless-version,
/// single-input-single-output spend to a fresh P2PK output; call the
/// `with_*` methods to shape it into a coinbase, a coinstake, or a
/// multi-input/output transaction.
pub struct TxBuilder {
    version: i32,
    time: Option<u32>,
    inputs: Vec<TxInput>,
    outputs: Vec<TxOutput>,
}

impl Default for TxBuilder {
    fn default() -> Self {
        Self {
            version: FEELESS_VERSION,
            time: None,
            inputs: vec![TxInput::new(OutPoint::new(crate::random_hash(), 0), p2pk_script())],
            outputs: vec![TxOutput { value: Amount::from_atoms(50_000_000), script_pubkey: p2pk_script() }],
        }
    }
}

impl TxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(mut self, version: i32) -> Self {
        self.version = version;
        if version < FEELESS_VERSION && self.time.is_none() {
            self.time = Some(0);
        }
        self
    }

    pub fn time(mut self, time: u32) -> Self {
        self.time = Some(time);
        self
    }

    pub fn clear_inputs(mut self) -> Self {
        self.inputs.clear();
        self
    }

    pub fn clear_outputs(mut self) -> Self {
        self.outputs.clear();
        self
    }

    pub fn input(mut self, prev_out: OutPoint, script_sig: Vec<u8>) -> Self {
        self.inputs.push(TxInput::new(prev_out, script_sig));
        self
    }

    pub fn output(mut self, value: Amount, script_pubkey: Vec<u8>) -> Self {
        self.outputs.push(TxOutput { value, script_pubkey });
        self
    }

    pub fn empty_output(mut self) -> Self {
        self.outputs.push(TxOutput { value: Amount::from_atoms(0), script_pubkey: Vec::new() });
        self
    }

    /// Replaces the inputs with the single null-outpoint input a coinbase
    /// requires, spending a fresh height-tagged scriptSig.
    pub fn coinbase(mut self, height: i32) -> Self {
        self.inputs = vec![TxInput::new(OutPoint::null(), coinbase_script_sig(height))];
        self
    }

    /// Replaces the outputs with a coinstake's distinguished empty first
    /// output followed by a reward payout.
    pub fn coinstake(mut self, reward: Amount) -> Self {
        self.outputs = vec![
            TxOutput { value: Amount::from_atoms(0), script_pubkey: Vec::new() },
            TxOutput { value: reward, script_pubkey: p2pk_script() },
        ];
        self
    }

    pub fn build(self) -> Transaction {
        Transaction { version: self.version, time: self.time, inputs: self.inputs, outputs: self.outputs }
    }
}

fn p2pk_script() -> Vec<u8> {
    Script::new(vec![]).push_bytes(&random_pubkey().0).push_op(Opcode::CheckSig).0
}

/// Minimal little-endian height encoding, length-prefixed, matching
/// `chainstate`'s pre-qPoS `CheckBlock` coinbase-height rule.
fn coinbase_script_sig(height: i32) -> Vec<u8> {
    let mut bytes = height.to_le_bytes().to_vec();
    while bytes.last() == Some(&0) && bytes.len() > 1 {
        bytes.pop();
    }
    let mut script = vec![bytes.len() as u8];
    script.extend(bytes);
    script
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_build_is_structurally_valid() {
        let tx = TxBuilder::new().build();
        assert!(tx.check_structure().is_ok());
        assert!(!tx.is_coinbase());
    }

    #[test]
    fn coinbase_builder_produces_a_coinbase() {
        let tx = TxBuilder::new().clear_inputs().clear_outputs().coinbase(5).output(Amount::from_atoms(1), p2pk_script()).build();
        assert!(tx.is_coinbase());
    }

    #[test]
    fn coinstake_builder_produces_a_coinstake() {
        let tx = TxBuilder::new().clear_outputs().coinstake(Amount::from_atoms(1_000)).build();
        assert!(tx.is_coinstake());
    }
}
