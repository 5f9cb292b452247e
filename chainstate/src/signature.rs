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

//! `CheckBlockSignature`: every block carries a signature over its header
//! hash, proving the entity that assembled it actually controls the key
//! entitled to produce it. Which key that is depends on the block's kind.

use crate::error::{Error, Result};
use common::chain::Block;
use crypto::{PubKey, Signature, Verifier};
use registry::StakerRegistry;
use script::{solve, Script, TemplateType};

/// A PoW block carries no signature at all; a PoS block is signed by the
/// key its coinstake's second output pays to; a qPoS block is signed by
/// its staker's controller key. The coinbase/coinstake-marker-output shape
/// mirrors the legacy `CBlock::CheckBlockSignature`.
pub fn check_block_signature(
    block: &Block,
    registry: &StakerRegistry,
    verifier: &dyn Verifier,
) -> Result<()> {
    let header_hash = block.header.hash();

    if block.header.is_qpos() {
        let staker_id = block.header.staker_id.ok_or(Error::BadBlockSignature)?;
        let staker = registry.stakers.get(&staker_id).ok_or(Error::BadBlockSignature)?;
        let pubkey = PubKey(staker.controller_key.clone());
        return verify_against(verifier, &pubkey, &header_hash, &block.signature);
    }

    if block.has_coinstake() {
        let coinstake = &block.transactions[1];
        let payout = coinstake.outputs.get(1).ok_or(Error::BadBlockSignature)?;
        let script = Script::new(payout.script_pubkey.clone());
        let solved = solve(&script);
        let TemplateType::PubKey = solved.template else { return Err(Error::BadBlockSignature) };
        let pubkey = PubKey(solved.pushes[0].clone());
        return verify_against(verifier, &pubkey, &header_hash, &block.signature);
    }

    // Proof of work: no signature is expected.
    if block.signature.is_empty() {
        Ok(())
    } else {
        Err(Error::BadBlockSignature)
    }
}

fn verify_against(
    verifier: &dyn Verifier,
    pubkey: &PubKey,
    header_hash: &crypto::Hash256,
    signature_bytes: &[u8],
) -> Result<()> {
    if !pubkey.is_valid_encoding() || signature_bytes.is_empty() {
        return Err(Error::BadBlockSignature);
    }
    let signature = Signature(signature_bytes.to_vec());
    if verifier.verify(pubkey, header_hash, &signature) {
        Ok(())
    } else {
        Err(Error::BadBlockSignature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::chain::{BlockHeader, TxOutput};
    use common::primitives::{Amount, Hash256};
    use registry::StakerRecord;

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

    fn header(height: Option<i32>, staker_id: Option<u32>) -> BlockHeader {
        BlockHeader {
            version: 1,
            prev_hash: Hash256::ZERO,
            merkle_root: Hash256::ZERO,
            time: 1,
            bits: 0x1d00ffff,
            nonce: 0,
            height,
            staker_id,
        }
    }

    #[test]
    fn pow_block_requires_empty_signature() {
        let block = Block {
            header: header(None, None),
            transactions: vec![],
            deets: vec![],
            signature: vec![],
        };
        let registry = StakerRegistry::new();
        assert!(check_block_signature(&block, &registry, &AlwaysValid).is_ok());
    }

    #[test]
    fn pow_block_rejects_nonempty_signature() {
        let block = Block {
            header: header(None, None),
            transactions: vec![],
            deets: vec![],
            signature: vec![1, 2, 3],
        };
        let registry = StakerRegistry::new();
        assert_eq!(check_block_signature(&block, &registry, &AlwaysValid), Err(Error::BadBlockSignature));
    }

    #[test]
    fn qpos_block_checks_controller_key() {
        let mut staker = StakerRecord::new_from_purchase(vec![9; 33]);
        staker.controller_key = vec![9; 33];
        let mut registry = StakerRegistry::new();
        registry.stakers.insert(1, staker);

        let block = Block {
            header: header(Some(100), Some(1)),
            transactions: vec![],
            deets: vec![],
            signature: vec![1, 2, 3],
        };
        assert!(check_block_signature(&block, &registry, &AlwaysValid).is_ok());
        assert_eq!(
            check_block_signature(&block, &registry, &NeverValid),
            Err(Error::BadBlockSignature)
        );
    }

    #[test]
    fn pos_block_checks_coinstake_payout_key() {
        use common::chain::{OutPoint, Transaction, TxInput};

        let pubkey = vec![7u8; 33];
        let script = script::Script::new(vec![]).push_bytes(&pubkey).push_op(script::Opcode::CheckSig);
        let coinbase = Transaction {
            version: 1,
            time: None,
            inputs: vec![TxInput::new(OutPoint::null(), vec![])],
            outputs: vec![],
        };
        let coinstake = Transaction {
            version: 1,
            time: None,
            inputs: vec![TxInput::new(OutPoint::new(Hash256::ZERO, 0), vec![])],
            outputs: vec![
                TxOutput { value: Amount::from_atoms(0), script_pubkey: vec![] },
                TxOutput { value: Amount::from_atoms(1), script_pubkey: script.0 },
            ],
        };
        let block = Block {
            header: header(None, None),
            transactions: vec![coinbase, coinstake],
            deets: vec![],
            signature: vec![1, 2, 3],
        };
        let registry = StakerRegistry::new();
        assert!(check_block_signature(&block, &registry, &AlwaysValid).is_ok());
    }
}
