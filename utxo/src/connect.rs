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

//! Resolving a transaction's inputs against the unspent-output set, and
//! connecting/disconnecting them as blocks are applied or rolled back.

use crate::entry::Utxo;
use crate::error::{Error, Result};
use crate::store::{delete_utxo, get_utxo, put_utxo};
use common::chain::{ChainParams, Fork, OutPoint, Transaction};
use common::primitives::{money_range, Amount};
use crypto::Verifier;
use script::{check_signature, transaction_signature_hash, Script};
use serialization::{Cursor, Decode, Encode, EncodeAsElement};
use storage::{KvRead, KvWrite};

/// The result of looking up one input's prevout in the unspent set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchedInput {
    Found(Utxo),
    /// Not present: either never existed or already spent. A caller doing
    /// mempool admission treats this as "park as orphan, retry later"; a
    /// caller validating a block treats it as a hard rejection.
    Missing(OutPoint),
}

/// Resolve every input of `tx` against the unspent set. Coinbase
/// transactions have no inputs and resolve to an empty vector.
pub fn fetch_inputs<S: KvRead>(store: &S, tx: &Transaction) -> Result<Vec<FetchedInput>> {
    if tx.is_coinbase() {
        return Ok(Vec::new());
    }
    tx.inputs
        .iter()
        .map(|input| {
            let prevout = input.prev_out;
            match get_utxo(store, &prevout)? {
                Some(utxo) => Ok(FetchedInput::Found(utxo)),
                None => Ok(FetchedInput::Missing(prevout)),
            }
        })
        .collect()
}

/// Extract the resolved [`Utxo`] for every input, failing on the first one
/// still missing. Used once a caller has decided a transaction's inputs
/// must all be present (block connection, final mempool acceptance).
pub fn require_all_found(inputs: Vec<FetchedInput>) -> Result<Vec<Utxo>> {
    inputs
        .into_iter()
        .map(|fetched| match fetched {
            FetchedInput::Found(utxo) => Ok(utxo),
            FetchedInput::Missing(prevout) => Err(Error::MissingInput(prevout)),
        })
        .collect()
}

/// Sum of resolved input values plus any out-of-band claim credit (a qPoS
/// claim mints value with no matching input). `MoneyRange` is enforced on
/// the running total, matching the legacy overflow guard.
pub fn value_in(inputs: &[Utxo], claim: Amount) -> Result<Amount> {
    let mut total = claim;
    for utxo in inputs {
        if !money_range(utxo.output.value) {
            return Err(Error::ValueOutOfRange);
        }
        total = total.checked_add(utxo.output.value).ok_or(Error::ValueInOverflow)?;
        if !money_range(total) {
            return Err(Error::ValueInOverflow);
        }
    }
    Ok(total)
}

/// A record of everything `connect_inputs` removed from the unspent set,
/// sufficient to restore it verbatim on [`disconnect_inputs`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectUndo {
    spent: Vec<(OutPoint, Utxo)>,
}

impl ConnectUndo {
    /// Whatever a block's worth of undo records need to persist for a later
    /// reorganization: every input a transaction's [`connect_inputs`] spent,
    /// in the order it spent them.
    pub fn spent(&self) -> &[(OutPoint, Utxo)] {
        &self.spent
    }

    pub fn from_spent(spent: Vec<(OutPoint, Utxo)>) -> Self {
        ConnectUndo { spent }
    }
}

impl Encode for ConnectUndo {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        (self.spent.len() as u64).encode_to(buf);
        for (outpoint, utxo) in &self.spent {
            outpoint.encode_to(buf);
            utxo.encode_to(buf);
        }
    }
}

impl EncodeAsElement for ConnectUndo {}

impl Decode for ConnectUndo {
    fn decode(cursor: &mut Cursor<'_>) -> serialization::Result<Self> {
        let count = u64::decode(cursor)?;
        let mut spent = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let outpoint = OutPoint::decode(cursor)?;
            let utxo = Utxo::decode(cursor)?;
            spent.push((outpoint, utxo));
        }
        Ok(ConnectUndo { spent })
    }
}

/// Validate `tx`'s inputs against already-resolved [`Utxo`] entries and
/// return its fee (`value_in - value_out`), without touching storage.
/// `inputs` must align 1:1 with `tx.inputs`. This is the whole of
/// `connect_inputs`'s checking; mempool admission calls it directly to
/// price and validate a transaction without spending anything, while
/// [`connect_inputs`] calls it and then performs the spend.
///
/// Checks, in order: per-input money range and running overflow, coinbase
/// /coinstake maturity, transaction timestamp ordering against each input's
/// source transaction, (from `Fork::Fork005`) that no input spends the
/// empty marker output, and that each input's scriptSig satisfies the
/// scriptPubKey it spends (spec §4.4 `ConnectInputs`'s signature check).
pub fn validate_inputs(
    tx: &Transaction,
    inputs: &[Utxo],
    height: i32,
    fork: Fork,
    params: &ChainParams,
    claim: Amount,
    verifier: &dyn Verifier,
) -> Result<Amount> {
    if tx.is_coinbase() {
        return Ok(Amount::from_atoms(0));
    }
    debug_assert_eq!(inputs.len(), tx.inputs.len());

    for (index, utxo) in inputs.iter().enumerate() {
        if utxo.is_coinbase || utxo.is_coinstake {
            let depth = height - utxo.height;
            if depth < params.coinbase_maturity {
                let kind = if utxo.is_coinbase { "coinbase" } else { "coinstake" };
                return Err(Error::ImmatureSpend { kind, depth });
            }
        }
        if let (Some(tx_time), Some(source_time)) = (tx.time, utxo.source_time) {
            if source_time > tx_time {
                return Err(Error::TimestampOutOfOrder);
            }
        }
        if utxo.output.is_empty() && fork >= Fork::Fork005 {
            return Err(Error::MarkerNotSpendable);
        }

        let script_pubkey = Script::new(utxo.output.script_pubkey.clone());
        let script_sig = Script::new(tx.inputs[index].script_sig.clone());
        let sighash = transaction_signature_hash(tx, index, &script_pubkey);
        check_signature(verifier, &script_pubkey, &script_sig, &sighash).map_err(Error::BadSignature)?;
    }

    let total_in = value_in(inputs, claim)?;
    let total_out =
        tx.outputs.iter().try_fold(Amount::from_atoms(0), |acc, o| acc.checked_add(o.value));
    let total_out = total_out.ok_or(Error::ValueInOverflow)?;
    // A coinstake is where proof-of-stake minting happens: its outputs may
    // exceed its inputs by the stake reward. The caller enforces that excess
    // against the coin-age-derived ceiling; this check only guards ordinary
    // spends from creating value out of nothing.
    if total_in < total_out && !tx.is_coinstake() {
        return Err(Error::ValueInLessThanOut {
            value_in: total_in.to_atoms(),
            value_out: total_out.to_atoms(),
        });
    }
    Ok(total_in - total_out)
}

/// [`validate_inputs`] followed by actually spending the inputs: all of
/// them are removed from the unspent set and an undo record is returned so
/// the spend can be reversed on reorganization. All checking happens before
/// any mutation, so a transaction with one bad input never partially spends
/// the good ones.
#[allow(clippy::too_many_arguments)]
pub fn connect_inputs<S: KvWrite>(
    store: &mut S,
    tx: &Transaction,
    inputs: &[Utxo],
    height: i32,
    fork: Fork,
    params: &ChainParams,
    claim: Amount,
    verifier: &dyn Verifier,
) -> Result<(Amount, ConnectUndo)> {
    let fee = validate_inputs(tx, inputs, height, fork, params, claim, verifier)?;
    if tx.is_coinbase() {
        return Ok((fee, ConnectUndo::default()));
    }

    let mut undo = ConnectUndo::default();
    for (input, utxo) in tx.inputs.iter().zip(inputs) {
        undo.spent.push((input.prev_out, utxo.clone()));
        delete_utxo(store, &input.prev_out)?;
    }

    Ok((fee, undo))
}

/// Reverse a prior [`connect_inputs`], restoring every spent output.
pub fn disconnect_inputs<S: KvWrite>(store: &mut S, undo: &ConnectUndo) -> Result<()> {
    for (outpoint, utxo) in &undo.spent {
        put_utxo(store, outpoint, utxo.clone())?;
    }
    Ok(())
}

/// Add `tx`'s own outputs to the unspent set at `height`. The distinguished
/// empty marker output (a coinstake's first slot) is never itself spendable
/// and is not inserted.
pub fn add_outputs<S: KvWrite>(store: &mut S, tx: &Transaction, height: i32) -> Result<()> {
    let is_coinbase = tx.is_coinbase();
    let is_coinstake = tx.is_coinstake();
    let txid = tx.txid();
    for (index, output) in tx.outputs.iter().enumerate() {
        if output.is_empty() {
            continue;
        }
        let outpoint = OutPoint::new(txid, index as u32);
        let utxo = Utxo::new(output.clone(), height, is_coinbase, is_coinstake, tx.time);
        put_utxo(store, &outpoint, utxo)?;
    }
    Ok(())
}

/// Reverse a prior [`add_outputs`], removing `tx`'s own outputs from the
/// unspent set. Used when disconnecting the block that created them.
pub fn remove_outputs<S: KvWrite>(store: &mut S, tx: &Transaction) -> Result<()> {
    let txid = tx.txid();
    for index in 0..tx.outputs.len() {
        delete_utxo(store, &OutPoint::new(txid, index as u32))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::chain::{TxInput, TxOutput};
    use common::primitives::Hash256;
    use crypto::{PubKey, Signature};
    use storage::MemoryStore;

    fn params() -> ChainParams {
        ChainParams::mainnet()
    }

    struct AlwaysValid;
    impl Verifier for AlwaysValid {
        fn verify(&self, _pubkey: &PubKey, _hash: &Hash256, _sig: &Signature) -> bool {
            true
        }
    }

    struct NeverValid;
    impl Verifier for NeverValid {
        fn verify(&self, _pubkey: &PubKey, _hash: &Hash256, _sig: &Signature) -> bool {
            false
        }
    }

    const PUBKEY: [u8; 33] = [2u8; 33];

    fn locking_script() -> Script {
        Script::new(vec![]).push_bytes(&PUBKEY).push_op(script::Opcode::CheckSig)
    }

    fn unlocking_script() -> Vec<u8> {
        Script::new(vec![]).push_bytes(&[0xaa; 3]).0
    }

    fn coin(atoms: i64) -> TxOutput {
        TxOutput { value: Amount::from_atoms(atoms), script_pubkey: locking_script().0 }
    }

    fn spending_tx(prevout: OutPoint, out_value: i64) -> Transaction {
        Transaction {
            version: common::chain::FEELESS_VERSION,
            time: None,
            inputs: vec![TxInput::new(prevout, unlocking_script())],
            outputs: vec![coin(out_value)],
        }
    }

    #[test]
    fn fetch_inputs_reports_missing_prevout() {
        let store = MemoryStore::new();
        let tx = spending_tx(OutPoint::new(Hash256::ZERO, 0), 100);
        let fetched = fetch_inputs(&store, &tx).unwrap();
        assert_eq!(fetched, vec![FetchedInput::Missing(tx.inputs[0].prev_out)]);
        assert!(require_all_found(fetched).is_err());
    }

    #[test]
    fn connect_then_disconnect_restores_the_utxo() {
        let mut store = MemoryStore::new();
        let prevout = OutPoint::new(Hash256::ZERO, 0);
        let source = Utxo::new(coin(1_000), 1, false, false, None);
        put_utxo(&mut store, &prevout, source.clone()).unwrap();

        let tx = spending_tx(prevout, 900);
        let fetched = fetch_inputs(&store, &tx).unwrap();
        let inputs = require_all_found(fetched).unwrap();
        let (fee, undo) = connect_inputs(
            &mut store,
            &tx,
            &inputs,
            50,
            Fork::ForkMissfix,
            &params(),
            Amount::from_atoms(0),
            &AlwaysValid,
        )
        .unwrap();
        assert_eq!(fee, Amount::from_atoms(100));
        assert_eq!(get_utxo(&store, &prevout).unwrap(), None);

        disconnect_inputs(&mut store, &undo).unwrap();
        assert_eq!(get_utxo(&store, &prevout).unwrap(), Some(source));
    }

    #[test]
    fn bad_signature_is_rejected() {
        let mut store = MemoryStore::new();
        let prevout = OutPoint::new(Hash256::ZERO, 0);
        put_utxo(&mut store, &prevout, Utxo::new(coin(1_000), 1, false, false, None)).unwrap();

        let tx = spending_tx(prevout, 900);
        let inputs = require_all_found(fetch_inputs(&store, &tx).unwrap()).unwrap();
        let result = connect_inputs(
            &mut store,
            &tx,
            &inputs,
            50,
            Fork::ForkMissfix,
            &params(),
            Amount::from_atoms(0),
            &NeverValid,
        );
        assert!(matches!(result, Err(Error::BadSignature(_))));
    }

    #[test]
    fn immature_coinbase_spend_is_rejected() {
        let mut store = MemoryStore::new();
        let prevout = OutPoint::new(Hash256::ZERO, 0);
        let source = Utxo::new(coin(1_000), 100, true, false, None);
        put_utxo(&mut store, &prevout, source).unwrap();

        let tx = spending_tx(prevout, 900);
        let inputs = require_all_found(fetch_inputs(&store, &tx).unwrap()).unwrap();
        let result = connect_inputs(
            &mut store,
            &tx,
            &inputs,
            100 + params().coinbase_maturity - 1,
            Fork::ForkMissfix,
            &params(),
            Amount::from_atoms(0),
            &AlwaysValid,
        );
        assert!(matches!(result, Err(Error::ImmatureSpend { kind: "coinbase", .. })));
    }

    #[test]
    fn value_in_less_than_out_is_rejected() {
        let mut store = MemoryStore::new();
        let prevout = OutPoint::new(Hash256::ZERO, 0);
        put_utxo(&mut store, &prevout, Utxo::new(coin(100), 1, false, false, None)).unwrap();

        let tx = spending_tx(prevout, 900);
        let inputs = require_all_found(fetch_inputs(&store, &tx).unwrap()).unwrap();
        let result = connect_inputs(
            &mut store,
            &tx,
            &inputs,
            50,
            Fork::ForkMissfix,
            &params(),
            Amount::from_atoms(0),
            &AlwaysValid,
        );
        assert!(matches!(result, Err(Error::ValueInLessThanOut { .. })));
    }

    #[test]
    fn spending_the_empty_marker_after_fork005_is_rejected() {
        let mut store = MemoryStore::new();
        let prevout = OutPoint::new(Hash256::ZERO, 0);
        let marker = Utxo::new(TxOutput { value: Amount::from_atoms(0), script_pubkey: vec![] }, 1, false, false, None);
        put_utxo(&mut store, &prevout, marker).unwrap();

        let tx = spending_tx(prevout, 0);
        let inputs = require_all_found(fetch_inputs(&store, &tx).unwrap()).unwrap();
        let result = connect_inputs(
            &mut store,
            &tx,
            &inputs,
            50,
            Fork::Fork005,
            &params(),
            Amount::from_atoms(0),
            &AlwaysValid,
        );
        assert!(matches!(result, Err(Error::MarkerNotSpendable)));
    }

    #[test]
    fn add_outputs_then_remove_outputs_round_trips() {
        let mut store = MemoryStore::new();
        let tx = Transaction {
            version: common::chain::FEELESS_VERSION,
            time: None,
            inputs: vec![TxInput::new(OutPoint::null(), vec![0; 4])],
            outputs: vec![coin(500), coin(250)],
        };
        add_outputs(&mut store, &tx, 10).unwrap();
        let txid = tx.txid();
        assert!(has_utxo_for_test(&store, &OutPoint::new(txid, 0)));
        assert!(has_utxo_for_test(&store, &OutPoint::new(txid, 1)));

        remove_outputs(&mut store, &tx).unwrap();
        assert!(!has_utxo_for_test(&store, &OutPoint::new(txid, 0)));
        assert!(!has_utxo_for_test(&store, &OutPoint::new(txid, 1)));
    }

    fn has_utxo_for_test<S: KvRead>(store: &S, outpoint: &OutPoint) -> bool {
        crate::store::has_utxo(store, outpoint).unwrap()
    }
}
