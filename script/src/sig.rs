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

//! `ConnectInputs`' signature-check step: given the recognized template of
//! the output being spent and the pushes from the spending input's
//! `scriptSig`, evaluates whether the unlock satisfies the lock. Signature
//! cryptography itself is a consumed primitive ([`crypto::Verifier`]); this
//! module only knows how to line pushes up against templates.

use crate::script::{Instruction, Script};
use crate::solver::{solve, Solution, TemplateType};
use common::chain::Transaction;
use crypto::{hash160, sha256d, Hash256, PubKey, Signature, Verifier};
use serialization::Encode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SigError {
    #[error("scriptSig does not carry the pushes its scriptPubKey template requires")]
    WrongShape,
    #[error("scriptSig key does not hash to the scriptPubKey's key hash")]
    KeyHashMismatch,
    #[error("signature does not verify against the supplied key")]
    BadSignature,
    #[error("multisig requires {required} valid signatures, found {found}")]
    NotEnoughSignatures { required: usize, found: usize },
    #[error("template is not spendable by a signature check (registry/feework/null-data)")]
    NotSignatureSpendable,
}

fn script_sig_pushes(script_sig: &Script) -> Result<Vec<Vec<u8>>, SigError> {
    let mut pushes = Vec::new();
    for ins in script_sig.instructions() {
        match ins.map_err(|_| SigError::WrongShape)? {
            Instruction::Push(bytes) => pushes.push(bytes.to_vec()),
            _ => return Err(SigError::WrongShape),
        }
    }
    Ok(pushes)
}

/// Evaluates a `scriptSig` against the already-solved `scriptPubKey`
/// template of the output it spends, using `message_hash` as the signed
/// digest (the caller computes the per-input sighash; this module treats it
/// as opaque).
pub fn check_signature(
    verifier: &dyn Verifier,
    script_pubkey: &Script,
    script_sig: &Script,
    message_hash: &Hash256,
) -> Result<(), SigError> {
    let Solution { template, pushes: locking_pushes } = solve(script_pubkey);
    let unlocking = script_sig_pushes(script_sig)?;

    match template {
        TemplateType::PubKey => {
            let [sig] = unlocking.as_slice() else { return Err(SigError::WrongShape) };
            let pubkey = PubKey(locking_pushes[0].clone());
            verify_one(verifier, &pubkey, message_hash, sig)
        }
        TemplateType::PubKeyHash => {
            let [sig, pubkey_bytes] = unlocking.as_slice() else { return Err(SigError::WrongShape) };
            if hash160(pubkey_bytes).as_bytes() != locking_pushes[0].as_slice() {
                return Err(SigError::KeyHashMismatch);
            }
            let pubkey = PubKey(pubkey_bytes.clone());
            verify_one(verifier, &pubkey, message_hash, sig)
        }
        TemplateType::Claim => {
            // locking_pushes = [claim payload, keyid]; unlocking = [sig, pubkey].
            let [sig, pubkey_bytes] = unlocking.as_slice() else { return Err(SigError::WrongShape) };
            if hash160(pubkey_bytes).as_bytes() != locking_pushes[1].as_slice() {
                return Err(SigError::KeyHashMismatch);
            }
            let pubkey = PubKey(pubkey_bytes.clone());
            verify_one(verifier, &pubkey, message_hash, sig)
        }
        TemplateType::Multisig => check_multisig(verifier, &locking_pushes, &unlocking, message_hash),
        TemplateType::ScriptHash => check_script_hash(verifier, &locking_pushes, &unlocking, message_hash),
        TemplateType::NullData
        | TemplateType::Feework
        | TemplateType::SetMeta
        | TemplateType::Purchase1
        | TemplateType::Purchase4
        | TemplateType::SetOwner
        | TemplateType::SetManager
        | TemplateType::SetDelegate
        | TemplateType::SetController
        | TemplateType::Enable
        | TemplateType::Disable
        | TemplateType::NonStandard => Err(SigError::NotSignatureSpendable),
    }
}

fn verify_one(
    verifier: &dyn Verifier,
    pubkey: &PubKey,
    message_hash: &Hash256,
    sig_bytes: &[u8],
) -> Result<(), SigError> {
    if !pubkey.is_valid_encoding() {
        return Err(SigError::BadSignature);
    }
    let signature = Signature(sig_bytes.to_vec());
    if verifier.verify(pubkey, message_hash, &signature) {
        Ok(())
    } else {
        Err(SigError::BadSignature)
    }
}

/// `CHECKMULTISIG`'s off-by-one dummy element (`OP_0` inserted for the
/// historic multisig evaluation bug) is not modeled here: unlocking pushes
/// are exactly the signature list, evaluated in the same order as the
/// locking script's public keys and permitted to skip keys but never to
/// reorder them.
fn check_multisig(
    verifier: &dyn Verifier,
    locking_pushes: &[Vec<u8>],
    unlocking: &[Vec<u8>],
    message_hash: &Hash256,
) -> Result<(), SigError> {
    let m = *locking_pushes.first().and_then(|v| v.first()).ok_or(SigError::WrongShape)? as usize;
    let n = *locking_pushes.last().and_then(|v| v.first()).ok_or(SigError::WrongShape)? as usize;
    let pubkeys = &locking_pushes[1..locking_pushes.len() - 1];
    if pubkeys.len() != n {
        return Err(SigError::WrongShape);
    }
    let mut key_iter = pubkeys.iter();
    let mut matched = 0;
    for sig in unlocking {
        for pubkey_bytes in key_iter.by_ref() {
            let pubkey = PubKey(pubkey_bytes.clone());
            if pubkey.is_valid_encoding()
                && verifier.verify(&pubkey, message_hash, &Signature(sig.clone()))
            {
                matched += 1;
                break;
            }
        }
    }
    if matched >= m {
        Ok(())
    } else {
        Err(SigError::NotEnoughSignatures { required: m, found: matched })
    }
}

/// P2SH (spec §4.2): the scriptSig's last push is the serialized redeem
/// script; it must hash to the locking script's hash, and is then
/// re-evaluated as if it were the scriptPubKey with the remaining pushes as
/// its scriptSig.
fn check_script_hash(
    verifier: &dyn Verifier,
    locking_pushes: &[Vec<u8>],
    unlocking: &[Vec<u8>],
    message_hash: &Hash256,
) -> Result<(), SigError> {
    let (redeem_bytes, rest) = unlocking.split_last().ok_or(SigError::WrongShape)?;
    if hash160(redeem_bytes).as_bytes() != locking_pushes[0].as_slice() {
        return Err(SigError::KeyHashMismatch);
    }
    let redeem_script = Script::new(redeem_bytes.clone());
    let mut inner_sig = Script::new(vec![]);
    for push in rest {
        inner_sig = inner_sig.push_bytes(push);
    }
    check_signature(verifier, &redeem_script, &inner_sig, message_hash)
}

/// Computes the legacy signature hash: `sha256d` of the transaction's
/// canonical encoding. Input-specific subscript substitution (blanking
/// other inputs' scriptSigs per `SIGHASH_ALL` semantics) is the caller's
/// responsibility before calling this; it operates on whatever bytes it is
/// given.
pub fn signature_hash(preimage: &[u8]) -> Hash256 {
    sha256d(preimage)
}

/// `SignatureHash` (`SIGHASH_ALL`, the only mode this chain implements):
/// `tx`'s own encoding with every scriptSig blanked except `input_index`'s,
/// which is replaced by the scriptPubKey of the output it spends. Every
/// input and output is covered, so a third party can't add, remove, or
/// reorder either without invalidating the signature.
pub fn transaction_signature_hash(
    tx: &Transaction,
    input_index: usize,
    script_pubkey: &Script,
) -> Hash256 {
    let mut subscripted = tx.clone();
    for (i, input) in subscripted.inputs.iter_mut().enumerate() {
        input.script_sig = if i == input_index { script_pubkey.0.clone() } else { Vec::new() };
    }
    signature_hash(&subscripted.encode())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::Opcode;
    use common::chain::{OutPoint, TxInput, TxOutput, FEELESS_VERSION};
    use common::primitives::Amount;

    fn sample_tx() -> Transaction {
        Transaction {
            version: FEELESS_VERSION,
            time: None,
            inputs: vec![
                TxInput::new(OutPoint::new(Hash256::ZERO, 0), vec![0xaa]),
                TxInput::new(OutPoint::new(Hash256::ZERO, 1), vec![0xbb]),
            ],
            outputs: vec![TxOutput { value: Amount::from_atoms(1), script_pubkey: vec![] }],
        }
    }

    #[test]
    fn signature_hash_ignores_other_inputs_scriptsig() {
        let tx = sample_tx();
        let spent = Script::new(vec![0xcc]);
        let mut other = tx.clone();
        other.inputs[1].script_sig = vec![0xff];
        assert_eq!(
            transaction_signature_hash(&tx, 0, &spent),
            transaction_signature_hash(&other, 0, &spent)
        );
    }

    #[test]
    fn signature_hash_is_sensitive_to_input_index() {
        let tx = sample_tx();
        let spent = Script::new(vec![0xcc]);
        assert_ne!(
            transaction_signature_hash(&tx, 0, &spent),
            transaction_signature_hash(&tx, 1, &spent)
        );
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

    fn pubkeyhash_script(pubkey: &[u8]) -> Script {
        Script::new(vec![])
            .push_op(Opcode::Dup)
            .push_op(Opcode::Hash160)
            .push_bytes(hash160(pubkey).as_bytes())
            .push_op(Opcode::EqualVerify)
            .push_op(Opcode::CheckSig)
    }

    #[test]
    fn pubkeyhash_accepts_matching_key() {
        let pubkey = [2u8; 33];
        let locking = pubkeyhash_script(&pubkey);
        let unlocking = Script::new(vec![]).push_bytes(&[1, 2, 3]).push_bytes(&pubkey);
        let hash = Hash256::ZERO;
        assert!(check_signature(&AlwaysValid, &locking, &unlocking, &hash).is_ok());
    }

    #[test]
    fn pubkeyhash_rejects_wrong_key() {
        let pubkey = [2u8; 33];
        let locking = pubkeyhash_script(&pubkey);
        let unlocking = Script::new(vec![]).push_bytes(&[1, 2, 3]).push_bytes(&[9u8; 33]);
        let hash = Hash256::ZERO;
        assert_eq!(
            check_signature(&AlwaysValid, &locking, &unlocking, &hash),
            Err(SigError::KeyHashMismatch)
        );
    }

    #[test]
    fn pubkeyhash_rejects_bad_signature() {
        let pubkey = [2u8; 33];
        let locking = pubkeyhash_script(&pubkey);
        let unlocking = Script::new(vec![]).push_bytes(&[1, 2, 3]).push_bytes(&pubkey);
        let hash = Hash256::ZERO;
        assert_eq!(check_signature(&NeverValid, &locking, &unlocking, &hash), Err(SigError::BadSignature));
    }

    #[test]
    fn multisig_requires_m_valid_signatures() {
        let locking = Script::new(vec![])
            .push_int(2)
            .push_bytes(&[1; 33])
            .push_bytes(&[2; 33])
            .push_bytes(&[3; 33])
            .push_int(3)
            .push_op(Opcode::CheckMultisig);
        let unlocking = Script::new(vec![]).push_bytes(&[0xaa]).push_bytes(&[0xbb]);
        let hash = Hash256::ZERO;
        assert!(check_signature(&AlwaysValid, &locking, &unlocking, &hash).is_ok());
        assert_eq!(
            check_signature(&NeverValid, &locking, &unlocking, &hash),
            Err(SigError::NotEnoughSignatures { required: 2, found: 0 })
        );
    }

    #[test]
    fn registry_template_is_not_signature_spendable() {
        let locking = Script::new(vec![]).push_bytes(&[0; 16]).push_op(Opcode::Feework);
        let unlocking = Script::new(vec![]).push_bytes(&[1]);
        let hash = Hash256::ZERO;
        assert_eq!(
            check_signature(&AlwaysValid, &locking, &unlocking, &hash),
            Err(SigError::NotSignatureSpendable)
        );
    }
}
