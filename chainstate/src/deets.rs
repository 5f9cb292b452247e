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

//! `vDeets`: the per-block cache of registry-affecting operations, built by
//! scanning every transaction's outputs once a block is received. Never
//! transmitted on the wire -- a block read back out of storage has its
//! `vDeets` rebuilt by this same scan rather than persisted alongside it.

use common::chain::{Deet, Fork, Transaction};
use script::{extract_deet, Script};

/// Scans `transactions` in order and returns every extracted [`Deet`]
/// tagged with its `(tx_index, output_index)` position, the shape
/// [`common::chain::Block::check_deets_order`] expects.
pub fn build_vdeets(transactions: &[Transaction], fork: Fork) -> Vec<(usize, usize, Deet)> {
    let purchase4_with_manager = fork >= Fork::ForkPurchase2;
    let mut deets = Vec::new();
    for (tx_idx, tx) in transactions.iter().enumerate() {
        for (out_idx, output) in tx.outputs.iter().enumerate() {
            let script = Script::new(output.script_pubkey.clone());
            if let Ok(Some(deet)) = extract_deet(&script, purchase4_with_manager) {
                deets.push((tx_idx, out_idx, deet));
            }
        }
    }
    deets
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::chain::{OutPoint, TxInput, TxOutput};
    use common::primitives::{Amount, Hash256};
    use script::payload::ClaimPayload;
    use script::{Opcode, Script as S};

    #[test]
    fn finds_a_claim_deet_at_its_output_position() {
        let payload = ClaimPayload { pubkey: [3u8; 33], value: Amount::from_atoms(100) };
        let claim_script = S::new(vec![]).push_bytes(&payload.encode()).push_op(Opcode::Claim);
        let tx = Transaction {
            version: 1,
            time: None,
            inputs: vec![TxInput::new(OutPoint::new(Hash256::ZERO, 0), vec![])],
            outputs: vec![
                TxOutput { value: Amount::from_atoms(0), script_pubkey: vec![] },
                TxOutput { value: Amount::from_atoms(100), script_pubkey: claim_script.0 },
            ],
        };
        let deets = build_vdeets(&[tx], Fork::ForkQPoS);
        assert_eq!(deets.len(), 1);
        assert_eq!((deets[0].0, deets[0].1), (0, 1));
    }
}
