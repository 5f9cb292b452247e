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

//! `CheckBlock` (spec §4.6): the structural rules that hold regardless of
//! where in the chain a block ends up -- no storage lookups, no notion of
//! "the tip". Everything here is a function of the block's own bytes plus
//! the fork active at its claimed height.

use crate::error::{Error, Result};
use common::chain::{Block, ChainParams, Deet, Fork};
use common::primitives::{money_range, Amount, Hash256, MAX_MONEY};
use registry::StakerRegistry;
use script::{check_output_amount, check_transaction, legacy_sigop_count, solve, Script};
use std::collections::{HashMap, HashSet};

/// Structural validation of a single block, independent of chain context.
/// Per-transaction `CheckTransaction` and the block-wide `vDeets`
/// aggregation rules (spec §4.6: no duplicate alias, no two key rotations
/// on the same staker, claims within ledger balance) both live here.
pub fn check_block(block: &Block, fork: Fork, params: &ChainParams, registry: &StakerRegistry) -> Result<()> {
    if block.transactions.is_empty() && !block.header.is_qpos() {
        return Err(Error::Empty);
    }

    if block.header.is_qpos() {
        if block.header.height.is_none() || block.header.staker_id.is_none() {
            return Err(Error::QPosMissingHeader);
        }
        if block.has_coinbase() {
            return Err(Error::QPosCoinbasePresent);
        }
        if block.transactions.len() > 1 && block.transactions[1].is_coinstake() {
            return Err(Error::QPosCoinstakePresent);
        }
    } else {
        if fork >= Fork::ForkQPoS {
            return Err(Error::PosNotAllowed);
        }
        if !block.has_coinbase() {
            return Err(Error::MissingCoinbase);
        }
        let is_proof_of_stake = block.has_coinstake();
        if is_proof_of_stake {
            if fork >= Fork::ForkQPoS {
                return Err(Error::PosNotAllowed);
            }
        } else if fork >= Fork::Fork002 {
            return Err(Error::PowNotAllowed);
        }
    }

    block.check_deets_order()?;

    let txids: Vec<Hash256> = block.transactions.iter().map(|tx| tx.txid()).collect();
    let mut seen_txids = HashSet::with_capacity(txids.len());
    for txid in &txids {
        if !seen_txids.insert(*txid) {
            return Err(Error::DuplicateTransaction(*txid));
        }
    }

    let merkle_root = common::chain::build_merkle_root(&txids);
    if merkle_root != block.header.merkle_root {
        return Err(Error::BadMerkleRoot);
    }

    let mut sigop_count = 0usize;
    for tx in &block.transactions {
        let output_scripts: Vec<Script> =
            tx.outputs.iter().map(|o| Script::new(o.script_pubkey.clone())).collect();
        check_transaction(tx, &output_scripts, fork, Amount::from_atoms(1))?;
        for (output, script) in tx.outputs.iter().zip(&output_scripts) {
            let template = solve(script).template;
            check_output_amount(fork, template, output.value, Amount::from_atoms(1))?;
            sigop_count += legacy_sigop_count(script);
        }
    }
    if sigop_count > params.max_block_sigops {
        return Err(Error::TooManySigops { actual: sigop_count, allowed: params.max_block_sigops });
    }

    check_vdeets_aggregation(block, registry)?;
    Ok(())
}

/// Block-wide `vDeets` rules that need to see every transaction at once
/// (spec §4.6): two transactions in the same block cannot register the
/// same alias or rotate a key on the same staker, and the sum of a
/// pubkey's claims across the block cannot exceed its registry ledger
/// balance.
fn check_vdeets_aggregation(block: &Block, registry: &StakerRegistry) -> Result<()> {
    let mut seen_aliases = HashSet::new();
    let mut seen_setkey_stakers = HashSet::new();
    let mut claims: HashMap<Vec<u8>, Amount> = HashMap::new();

    for (_, _, deet) in &block.deets {
        match deet {
            Deet::Purchase1 { alias, .. } | Deet::Purchase4 { alias, .. } => {
                let lower = alias.to_lowercase();
                if !seen_aliases.insert(lower.clone()) {
                    return Err(Error::DuplicateAliasInBlock(lower));
                }
            }
            Deet::SetKey { staker_id, .. } => {
                if !seen_setkey_stakers.insert(*staker_id) {
                    return Err(Error::DuplicateSetKeyInBlock(*staker_id));
                }
            }
            Deet::Claim { pubkey, value } => {
                let total = claims.entry(pubkey.clone()).or_insert(Amount::from_atoms(0));
                *total = total.checked_add(*value).filter(|t| money_range(*t) && *t <= MAX_MONEY).unwrap_or(MAX_MONEY);
            }
            Deet::SetState { .. } | Deet::SetMeta { .. } => {}
        }
    }

    for (pubkey, total) in claims {
        let balance =
            registry.ledgers.get(&pubkey).copied().unwrap_or(Amount::from_atoms(0));
        if total > balance {
            return Err(Error::ClaimExceedsLedgerInBlock);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::chain::{BlockHeader, OutPoint, Transaction, TxInput, TxOutput};

    fn coinbase() -> Transaction {
        Transaction {
            version: common::chain::CURRENT_VERSION,
            time: Some(0),
            inputs: vec![TxInput::new(OutPoint::null(), vec![2, 0, 0])],
            outputs: vec![TxOutput { value: Amount::from_atoms(0), script_pubkey: vec![] }],
        }
    }

    fn header_for(transactions: &[Transaction]) -> BlockHeader {
        let txids: Vec<Hash256> = transactions.iter().map(|t| t.txid()).collect();
        BlockHeader {
            version: 7,
            prev_hash: Hash256::ZERO,
            merkle_root: common::chain::build_merkle_root(&txids),
            time: 0,
            bits: 0x1d00ffff,
            nonce: 0,
            height: None,
            staker_id: None,
        }
    }

    #[test]
    fn legacy_block_without_coinbase_is_rejected() {
        let txs = vec![];
        let block = Block {
            header: header_for(&txs),
            transactions: txs,
            deets: vec![],
            signature: vec![],
        };
        assert_eq!(
            check_block(&block, Fork::Genesis, &ChainParams::mainnet(), &StakerRegistry::new()),
            Err(Error::Empty)
        );
    }

    #[test]
    fn legacy_block_with_coinbase_passes_structural_checks() {
        let txs = vec![coinbase()];
        let block = Block { header: header_for(&txs), transactions: txs, deets: vec![], signature: vec![] };
        assert!(check_block(&block, Fork::Genesis, &ChainParams::mainnet(), &StakerRegistry::new()).is_ok());
    }

    #[test]
    fn duplicate_transaction_in_block_is_rejected() {
        let txs = vec![coinbase(), coinbase()];
        let block = Block { header: header_for(&txs), transactions: txs, deets: vec![], signature: vec![] };
        let txid = block.transactions[0].txid();
        assert_eq!(
            check_block(&block, Fork::Genesis, &ChainParams::mainnet(), &StakerRegistry::new()),
            Err(Error::DuplicateTransaction(txid))
        );
    }

    #[test]
    fn duplicate_alias_in_block_is_rejected() {
        let txs = vec![coinbase()];
        let block = Block {
            header: header_for(&txs),
            transactions: txs,
            deets: vec![
                (1, 0, Deet::Purchase1 { price: Amount::from_atoms(1), owner_pubkey: vec![1], alias: "nick".into() }),
                (2, 0, Deet::Purchase1 { price: Amount::from_atoms(1), owner_pubkey: vec![2], alias: "NICK".into() }),
            ],
            signature: vec![],
        };
        assert_eq!(
            check_block(&block, Fork::ForkPurchase, &ChainParams::mainnet(), &StakerRegistry::new()),
            Err(Error::DuplicateAliasInBlock("nick".into()))
        );
    }
}
