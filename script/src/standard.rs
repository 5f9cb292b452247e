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

//! Standardness and `CheckTransaction` (spec §4.2): the relay-policy rules
//! layered on top of consensus validity. A non-standard transaction is
//! still consensus-valid if mined; nodes simply decline to relay or mine it
//! themselves.

use crate::script::{Instruction, Script};
use crate::opcode::Opcode;
use crate::solver::{solve, TemplateType};
use common::chain::{Fork, Transaction, TxError, CURRENT_VERSION};
use common::primitives::{money_range, Amount, MAX_MONEY};
use serialization::Encode;

pub const MAX_STANDARD_TX_SIZE: usize = 100_000;
pub const MAX_SCRIPT_SIG_SIZE: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StandardError {
    #[error("transaction version {0} is newer than this node understands")]
    VersionTooNew(i32),
    #[error("transaction is not final at the next height")]
    NotFinal,
    #[error("transaction time is too far in the future")]
    TimeInFuture,
    #[error("standard transaction exceeds {MAX_STANDARD_TX_SIZE} bytes")]
    TooLarge,
    #[error("input scriptSig is not push-only")]
    NonPushOnlyInput,
    #[error("input scriptSig exceeds {MAX_SCRIPT_SIG_SIZE} bytes")]
    InputScriptTooLarge,
    #[error("output scriptPubKey template is non-standard")]
    NonStandardOutput,
    #[error("more NULL_DATA outputs than value-bearing outputs")]
    TooManyDataOutputs,
}

/// `IsFinalTx`: every input is final, or the transaction's own lock-time
/// (tracked via `time` pre-feeless; this chain has no nLockTime field
/// distinct from it) has already passed.
fn is_final(tx: &Transaction) -> bool {
    tx.inputs.iter().all(|i| i.is_final())
}

/// Spec §4.2: a tx is standard iff version <= CURRENT_VERSION, final for
/// h+1, time within FutureDrift of adjusted time, size < MAX_STANDARD_TX_SIZE,
/// every input scriptSig is push-only and <= 500 bytes, and
/// `dataOut <= txnOut`.
pub fn is_standard_tx(
    tx: &Transaction,
    input_scripts: &[Script],
    output_scripts: &[Script],
    adjusted_time: i64,
    future_drift: i64,
) -> Result<(), StandardError> {
    if tx.version > CURRENT_VERSION {
        return Err(StandardError::VersionTooNew(tx.version));
    }
    if !is_final(tx) {
        return Err(StandardError::NotFinal);
    }
    if let Some(t) = tx.time {
        if (t as i64) > adjusted_time + future_drift {
            return Err(StandardError::TimeInFuture);
        }
    }
    if tx.encode().len() > MAX_STANDARD_TX_SIZE {
        return Err(StandardError::TooLarge);
    }
    for script in input_scripts {
        if !script.is_push_only() {
            return Err(StandardError::NonPushOnlyInput);
        }
        if script.len() > MAX_SCRIPT_SIG_SIZE {
            return Err(StandardError::InputScriptTooLarge);
        }
    }
    let mut data_out = 0usize;
    let mut txn_out = 0usize;
    for script in output_scripts {
        let template = solve(script).template;
        if !template.is_standard() {
            return Err(StandardError::NonStandardOutput);
        }
        if template == TemplateType::NullData {
            data_out += 1;
        } else {
            txn_out += 1;
        }
    }
    if data_out > txn_out {
        return Err(StandardError::TooManyDataOutputs);
    }
    Ok(())
}

/// Per-output amount floor, fork-gated (spec §4.2):
/// - pre-`FORK004`: non-empty outputs need `>= MIN_TXOUT_AMOUNT`.
/// - `FORK004..FORKPURCHASE`: zero is allowed for any output.
/// - `FORKPURCHASE` onward: registry/`NULL_DATA`/`FEEWORK`/`SETMETA`
///   outputs may be zero; value-bearing outputs still need the floor.
pub fn check_output_amount(
    fork: Fork,
    template: TemplateType,
    value: Amount,
    min_txout_amount: Amount,
) -> Result<(), TxError> {
    if !money_range(value) {
        return Err(TxError::OutOfMoneyRange);
    }
    let is_empty = value.to_atoms() == 0;
    if !is_empty {
        return Ok(());
    }
    let allowed_empty = match fork {
        Fork::Genesis | Fork::Fork002 => false,
        Fork::Fork004 | Fork::Fork005 | Fork::Fork006 => true,
        _ => template.allows_zero_value(),
    };
    if allowed_empty {
        Ok(())
    } else if value < min_txout_amount {
        Err(TxError::OutOfMoneyRange)
    } else {
        Ok(())
    }
}

/// `GetSigOpCount(fAccurate=false)`: the legacy, non-accurate sigop weight
/// of a script -- every `CHECKSIG` counts 1, every `CHECKMULTISIG` counts
/// the maximum 20 regardless of how many keys it actually names, since
/// without a preceding `scriptSig` evaluation the real `n` isn't known to
/// the caller. Unparseable scripts count 0, matching the reference
/// client's "stop counting at the parse error" behavior.
pub fn legacy_sigop_count(script: &Script) -> usize {
    let mut count = 0;
    for ins in script.instructions() {
        match ins {
            Ok(Instruction::Op(Opcode::CheckSig)) => count += 1,
            Ok(Instruction::Op(Opcode::CheckMultisig)) => count += 20,
            Ok(_) => {}
            Err(_) => break,
        }
    }
    count
}

/// `CheckTransaction` (spec §4.2), the structural checks independent of
/// chain state plus the fork-gated per-output amount floor the caller
/// supplies. `common::chain::Transaction::check_structure` covers the parts
/// that don't need a [`Solver`] lookup; this layers the output-template-
/// aware floor on top.
pub fn check_transaction(
    tx: &Transaction,
    output_scripts: &[Script],
    fork: Fork,
    min_txout_amount: Amount,
) -> Result<(), TxError> {
    tx.check_structure()?;
    for (output, script) in tx.outputs.iter().zip(output_scripts) {
        let template = solve(script).template;
        check_output_amount(fork, template, output.value, min_txout_amount)?;
    }
    let mut total = Amount::from_atoms(0);
    for output in &tx.outputs {
        total = total.checked_add(output.value).filter(|t| *t <= MAX_MONEY).ok_or(TxError::OutputsOverflow)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::Opcode;
    use common::chain::{OutPoint, TxInput, TxOutput};
    use common::primitives::Hash256;

    fn p2pkh_script() -> Script {
        Script::new(vec![])
            .push_op(Opcode::Dup)
            .push_op(Opcode::Hash160)
            .push_bytes(&[1; 20])
            .push_op(Opcode::EqualVerify)
            .push_op(Opcode::CheckSig)
    }

    fn sample_tx() -> Transaction {
        Transaction {
            version: CURRENT_VERSION,
            time: None,
            inputs: vec![TxInput::new(OutPoint::new(Hash256::ZERO, 0), vec![1, 2, 3])],
            outputs: vec![TxOutput { value: Amount::from_atoms(1000), script_pubkey: vec![] }],
        }
    }

    #[test]
    fn standard_p2pkh_is_accepted() {
        let tx = sample_tx();
        let input_script = Script::new(vec![1, 2, 3]);
        let output_script = p2pkh_script();
        assert!(is_standard_tx(&tx, &[input_script], &[output_script], 1_700_000_000, 17).is_ok());
    }

    #[test]
    fn non_push_only_input_rejected() {
        let tx = sample_tx();
        let input_script = Script::new(vec![]).push_op(Opcode::CheckSig);
        let output_script = p2pkh_script();
        assert_eq!(
            is_standard_tx(&tx, &[input_script], &[output_script], 1_700_000_000, 17),
            Err(StandardError::NonPushOnlyInput)
        );
    }

    #[test]
    fn sigop_count_weighs_checkmultisig_as_twenty() {
        let pubkeyhash = p2pkh_script();
        assert_eq!(legacy_sigop_count(&pubkeyhash), 1);

        let multisig = Script::new(vec![])
            .push_int(2)
            .push_bytes(&[1; 33])
            .push_bytes(&[2; 33])
            .push_bytes(&[3; 33])
            .push_int(3)
            .push_op(Opcode::CheckMultisig);
        assert_eq!(legacy_sigop_count(&multisig), 20);
    }

    #[test]
    fn feework_output_may_be_zero_from_forkpurchase() {
        assert!(check_output_amount(
            Fork::ForkFeeless,
            TemplateType::Feework,
            Amount::from_atoms(0),
            Amount::from_atoms(10_000)
        )
        .is_ok());
        assert!(check_output_amount(
            Fork::ForkFeeless,
            TemplateType::PubKeyHash,
            Amount::from_atoms(0),
            Amount::from_atoms(10_000)
        )
        .is_err());
    }
}
