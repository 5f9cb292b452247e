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

//! The pool itself: admission (`accept`), eviction (`remove`,
//! `remove_conflicts`), and the two periodic sweeps run once per connected
//! block (`remove_invalid_purchases`, `remove_old_feeless`).

use crate::entry::MempoolEntry;
use crate::error::{Error, Result};
use crate::signatory::derive_signatory;
use common::chain::{ChainParams, Deet, Fork, Network, OutPoint, Transaction};
use common::primitives::{Amount, Hash256, MAX_MONEY};
use crypto::{Argon2Buffer, Argon2d, Verifier};
use feework::{check_feework, ChainTip, RelayMode};
use registry::{apply_tx_deets, StakerRegistry, TxDeets};
use script::{check_transaction, extract_deet, extract_feework, is_standard_tx, Script};
use serialization::Encode;
use std::collections::{BTreeMap, HashMap, HashSet};
use storage::KvRead;
use utxo::{fetch_inputs, min_fee, validate_inputs, FeeMode, FetchedInput, Utxo};

fn extract_tx_deets(tx: &Transaction, fork: Fork) -> Vec<Deet> {
    let purchase4_with_manager = fork >= Fork::ForkPurchase2;
    tx.outputs
        .iter()
        .filter_map(|output| {
            let script = Script::new(output.script_pubkey.clone());
            extract_deet(&script, purchase4_with_manager).unwrap_or(None)
        })
        .collect()
}

fn purchase_value(deets: &[Deet]) -> Amount {
    deets.iter().fold(Amount::from_atoms(0), |acc, d| match d {
        Deet::Purchase1 { price, .. } | Deet::Purchase4 { price, .. } => {
            acc.checked_add(*price).unwrap_or(MAX_MONEY)
        }
        _ => acc,
    })
}

fn purchase_aliases(deets: &[Deet]) -> Vec<String> {
    deets
        .iter()
        .filter_map(|d| match d {
            Deet::Purchase1 { alias, .. } | Deet::Purchase4 { alias, .. } => Some(alias.to_lowercase()),
            _ => None,
        })
        .collect()
}

fn claim_of(deets: &[Deet]) -> Option<(Vec<u8>, Amount)> {
    deets.iter().find_map(|d| match d {
        Deet::Claim { pubkey, value } => Some((pubkey.clone(), *value)),
        _ => None,
    })
}

/// The unconfirmed-transaction pool. Parked orphans (transactions whose
/// inputs aren't yet visible anywhere) are a net-layer concern in the
/// original client and are not modeled here: [`Mempool::accept`] surfaces a
/// missing input as [`Error::MissingInput`] for the caller to park.
#[derive(Debug, Default)]
pub struct Mempool {
    entries: BTreeMap<Hash256, MempoolEntry>,
    /// Every outpoint currently spent by a pooled transaction, to the txid
    /// spending it. No replacement: a second spend of an already-claimed
    /// outpoint is rejected outright.
    next_tx: HashMap<OutPoint, Hash256>,
    /// txid -> the pubkey its single claim output pays, so at most one
    /// pooled transaction can claim a given pubkey's registry balance.
    claims: HashMap<Hash256, Vec<u8>>,
    /// txid -> the lowercased aliases its purchase outputs register, so two
    /// pooled transactions can't race for the same alias.
    registrations: HashMap<Hash256, Vec<String>>,
    /// Feework payload height -> txids relying on it, scanned once per
    /// connected block to evict feework that has aged past its depth limit.
    feeless: BTreeMap<i32, HashSet<Hash256>>,
}

impl Mempool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, txid: &Hash256) -> bool {
        self.entries.contains_key(txid)
    }

    pub fn get(&self, txid: &Hash256) -> Option<&MempoolEntry> {
        self.entries.get(txid)
    }

    pub fn query_hashes(&self) -> Vec<Hash256> {
        self.entries.keys().copied().collect()
    }

    /// `CTxMemPool::accept`: validates `tx` against standardness, the
    /// in-pool conflict/duplicate-claim/duplicate-alias indexes, the
    /// registry (via a disposable clone, so a rejected tx never mutates the
    /// real one), the confirmed-plus-pooled UTXO view, and finally its fee
    /// or feework. Leaves the pool unchanged on any error.
    #[allow(clippy::too_many_arguments)]
    pub fn accept<S: KvRead>(
        &mut self,
        tx: Transaction,
        utxo_store: &S,
        registry: &StakerRegistry,
        tip: &dyn ChainTip,
        params: &ChainParams,
        network: Network,
        money_supply: i64,
        adjusted_time: i64,
        is_testnet: bool,
        argon2: &dyn Argon2d,
        buffer: &mut Argon2Buffer,
        verifier: &dyn Verifier,
    ) -> Result<()> {
        let next_height = tip.tip_height() + 1;
        let fork = tip.fork_at(next_height);

        let input_scripts: Vec<Script> =
            tx.inputs.iter().map(|i| Script::new(i.script_sig.clone())).collect();
        let output_scripts: Vec<Script> =
            tx.outputs.iter().map(|o| Script::new(o.script_pubkey.clone())).collect();

        check_transaction(&tx, &output_scripts, fork, params.min_txout_amount)?;

        if tx.is_coinbase() {
            return Err(Error::Coinbase);
        }
        if tx.is_coinstake() {
            return Err(Error::Coinstake);
        }
        if !is_testnet {
            is_standard_tx(&tx, &input_scripts, &output_scripts, adjusted_time, params.future_drift)?;
        }

        let txid = tx.txid();
        if self.entries.contains_key(&txid) {
            return Err(Error::AlreadyInPool);
        }
        for input in &tx.inputs {
            if self.next_tx.contains_key(&input.prev_out) {
                return Err(Error::Conflict(input.prev_out));
            }
        }

        let deets = extract_tx_deets(&tx, fork);
        let value_purchases = purchase_value(&deets);
        let aliases = purchase_aliases(&deets);
        let claim = claim_of(&deets);

        if !deets.is_empty() {
            let has_feework = output_scripts
                .last()
                .map(|s| matches!(extract_feework(s), Ok(Some(_))))
                .unwrap_or(false);
            if has_feework {
                return Err(Error::DeetsWithFeework);
            }
        }

        for alias in &aliases {
            if self.registrations.values().any(|existing| existing.contains(alias)) {
                return Err(Error::DuplicateAlias(alias.clone()));
            }
        }
        if let Some((pubkey, _)) = &claim {
            if self.claims.values().any(|k| k == pubkey) {
                return Err(Error::DuplicateClaim(pubkey.clone()));
            }
        }

        let signatory = if tx.inputs.len() == 1 {
            derive_signatory(&tx.inputs[0].script_sig)
        } else {
            None
        };
        if !deets.is_empty() {
            let mut scratch = registry.clone();
            let tx_deets = TxDeets { deets: &deets, signatory: signatory.as_ref(), input_count: tx.inputs.len() };
            apply_tx_deets(&mut scratch, network, next_height, money_supply, &tx_deets)?;
        }

        let fetched = fetch_inputs(utxo_store, &tx)?;
        let mut inputs = Vec::with_capacity(fetched.len());
        for found in fetched {
            match found {
                FetchedInput::Found(utxo) => inputs.push(utxo),
                FetchedInput::Missing(outpoint) => match self.entries.get(&outpoint.tx_hash) {
                    Some(parent) if (outpoint.index as usize) < parent.tx.outputs.len() => {
                        let output = parent.tx.outputs[outpoint.index as usize].clone();
                        inputs.push(Utxo::new(output, i32::MAX, false, false, parent.tx.time));
                    }
                    _ => return Err(Error::MissingInput(outpoint)),
                },
            }
        }

        let claim_value = claim.map(|(_, v)| v).unwrap_or(Amount::from_atoms(0));
        let fee = validate_inputs(&tx, &inputs, next_height, fork, params, claim_value, verifier)?;
        let fee = fee - value_purchases;

        let tx_bytes = tx.encode().len();
        let required_fee = min_fee(params, 1000, FeeMode::Relay, tx_bytes);

        let feework = if fee < required_fee {
            let fw = check_feework(
                &tx, &output_scripts, true, is_testnet, 1000, RelayMode::Relay, true, tip, params, argon2, buffer,
            );
            if !fw.status.is_ok() {
                return Err(Error::FeeworkRejected(fw.status));
            }
            Some(fw)
        } else {
            let fw = check_feework(
                &tx, &output_scripts, false, is_testnet, 1000, RelayMode::Relay, true, tip, params, argon2, buffer,
            );
            if !fw.status.is_valid() {
                return Err(Error::FeeworkRejected(fw.status));
            }
            fw.status.is_ok().then_some(fw)
        };

        if let Some(fw) = &feework {
            let height = fw.height.expect("feework status Ok implies a height was extracted");
            self.feeless.entry(height).or_default().insert(txid);
        }
        if !aliases.is_empty() {
            self.registrations.insert(txid, aliases);
        }
        if let Some((pubkey, _)) = claim_of(&deets) {
            self.claims.insert(txid, pubkey);
        }
        for input in &tx.inputs {
            self.next_tx.insert(input.prev_out, txid);
        }
        self.entries.insert(txid, MempoolEntry::new(tx, txid, fee, next_height, feework));

        tracing::debug!(%txid, pool_size = self.entries.len(), "accepted transaction into mempool");
        Ok(())
    }

    /// `CTxMemPool::remove`. `recursive` also removes every pooled
    /// transaction that spends one of `txid`'s own outputs, and so on
    /// transitively -- used when `txid` is being removed because it was
    /// rejected or reorganized out, so its unconfirmed children can no
    /// longer be valid either.
    pub fn remove(&mut self, txid: &Hash256, recursive: bool) {
        if let Some(entry) = self.entries.get(txid) {
            if recursive {
                let children: Vec<Hash256> = (0..entry.tx.outputs.len() as u32)
                    .filter_map(|i| self.next_tx.get(&OutPoint::new(*txid, i)).copied())
                    .collect();
                for child in children {
                    self.remove(&child, true);
                }
            }
            let entry = self.entries.remove(txid).expect("just checked present");
            for input in &entry.tx.inputs {
                self.next_tx.remove(&input.prev_out);
            }
        }
        self.claims.remove(txid);
        self.registrations.remove(txid);
    }

    /// `CTxMemPool::removeConflicts`: removes every pooled transaction
    /// (other than `tx` itself) that spends one of `tx`'s inputs, recursively.
    /// Called once `tx` connects in a block, to drop anything that is now a
    /// double-spend.
    pub fn remove_conflicts(&mut self, tx: &Transaction) {
        let txid = tx.txid();
        for input in &tx.inputs {
            if let Some(conflicting) = self.next_tx.get(&input.prev_out).copied() {
                if conflicting != txid {
                    self.remove(&conflicting, true);
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.next_tx.clear();
        self.claims.clear();
        self.registrations.clear();
        self.feeless.clear();
    }

    /// `CTxMemPool::removeInvalidPurchases`: re-checks every pooled
    /// transaction's purchase deets against the live registry (not a
    /// clone -- this never mutates it) and the current qualified-staker
    /// count, evicting any whose price floor the count has since moved
    /// past. Returns the number removed.
    pub fn remove_invalid_purchases(
        &mut self,
        registry: &StakerRegistry,
        network: Network,
        height: i32,
        money_supply: i64,
        fork: Fork,
    ) -> usize {
        let mut stale = Vec::new();
        for (txid, entry) in &self.entries {
            let purchases: Vec<Deet> = extract_tx_deets(&entry.tx, fork)
                .into_iter()
                .filter(|d| matches!(d, Deet::Purchase1 { .. } | Deet::Purchase4 { .. }))
                .collect();
            if purchases.is_empty() {
                continue;
            }
            let mut scratch = registry.clone();
            let tx_deets = TxDeets { deets: &purchases, signatory: None, input_count: entry.tx.inputs.len() };
            if apply_tx_deets(&mut scratch, network, height, money_supply, &tx_deets).is_err() {
                stale.push(*txid);
            }
        }
        let removed = stale.len();
        for txid in stale {
            self.remove(&txid, false);
        }
        removed
    }

    /// `CTxMemPool::removeOldFeeless`: a feework is only valid while its
    /// referenced block is within `feeless_max_depth` of the tip; past that
    /// the transaction it funded is evicted. Returns the number removed.
    pub fn remove_old_feeless(&mut self, params: &ChainParams, tip_height: i32) -> usize {
        let stale_heights: Vec<i32> = self
            .feeless
            .keys()
            .copied()
            .take_while(|h| tip_height - h > params.feeless_max_depth)
            .collect();
        let mut removed = 0;
        for height in stale_heights {
            if let Some(txids) = self.feeless.remove(&height) {
                for txid in txids {
                    if self.entries.contains_key(&txid) {
                        self.remove(&txid, false);
                        removed += 1;
                    }
                }
            }
        }
        removed
    }
}
