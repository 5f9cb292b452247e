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

//! [`Feework`]: the per-transaction proof-of-work record, its extraction
//! from a transaction's last output, and [`check_feework`], the entry point
//! that ties extraction, hashing, and the dynamic schedules together.

use crate::schedule::{feework_hardness, feework_limit, RelayMode};
use crate::status::FeeworkStatus;
use common::chain::{ChainParams, Fork, Transaction, FEELESS_VERSION};
use crypto::{Argon2Buffer, Argon2d, Hash256};
use script::{extract_feework, Script};
use serialization::Encode;

/// A transaction's feework, either freshly extracted or fully checked.
/// `status` starts `Unchecked`; every non-`Unchecked` value is terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feework {
    pub height: Option<i32>,
    pub block_hash: Option<Hash256>,
    pub bytes: u64,
    pub mcost: u32,
    pub limit: u64,
    pub work: u64,
    pub hash: u64,
    pub status: FeeworkStatus,
}

impl Default for Feework {
    fn default() -> Self {
        Feework {
            height: None,
            block_hash: None,
            bytes: 0,
            mcost: 0,
            limit: 0,
            work: 0,
            hash: 0,
            status: FeeworkStatus::Unchecked,
        }
    }
}

impl Feework {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(status: FeeworkStatus) -> Self {
        Feework { status, ..Self::default() }
    }

    /// A sentinel hash large enough to always fail its limit, substituted
    /// for an actual digest when `mcost` already exceeds the protocol
    /// ceiling -- this avoids running an expensive hash purely to reject it,
    /// closing off a trivial DoS vector (memory-cost spam).
    const ABSOLUTE_LIMIT_ON_DOS: u64 = u64::MAX;

    /// Hashes `preimage` (the block-hash-prefixed, signature-stripped
    /// transaction) at this feework's memory cost, storing the result as
    /// the little-endian `u64` this chain compares against `limit`.
    pub fn compute_hash(&mut self, argon2: &dyn Argon2d, buffer: &mut Argon2Buffer, preimage: &[u8], params: &ChainParams) {
        if self.mcost > params.feework_max_mcost() {
            self.hash = Self::ABSOLUTE_LIMIT_ON_DOS;
            return;
        }
        let work_bytes = self.work.to_le_bytes();
        let digest = argon2.hash_raw(1, self.mcost, 1, preimage, &work_bytes, 8, buffer);
        let mut tag = [0u8; 8];
        tag.copy_from_slice(&digest[..8]);
        self.hash = u64::from_le_bytes(tag);
    }

    /// `Feework::Check`: advances `Unchecked` to a terminal status by
    /// running the completeness and sufficiency tests in order. A no-op
    /// once already checked. Returns whether the final status is `Ok`.
    pub fn check(&mut self, required_mcost: u32, max_mcost: u32) -> bool {
        if self.status == FeeworkStatus::Unchecked {
            self.status = if self.mcost < required_mcost {
                FeeworkStatus::LowMcost
            } else if self.mcost > max_mcost {
                FeeworkStatus::HighMcost
            } else if self.height.is_none() {
                FeeworkStatus::NoHeight
            } else if self.work == 0 {
                FeeworkStatus::NoWork
            } else if self.hash == 0 {
                FeeworkStatus::NoHash
            } else if self.limit == 0 {
                FeeworkStatus::NoLimit
            } else if self.mcost == 0 {
                FeeworkStatus::NoMcost
            } else if self.limit < self.hash {
                FeeworkStatus::Insufficient
            } else {
                FeeworkStatus::Ok
            };
        }
        self.status == FeeworkStatus::Ok
    }

    /// `Feework::GetDiff`: converts the feework's hardness into a money-
    /// comparable figure for mempool priority sorting, in 128-bit
    /// arithmetic (the intermediate product overflows 64 bits) and clamped
    /// to `i64::MAX`.
    pub fn get_diff(&self, params: &ChainParams) -> i64 {
        if self.mcost == 0 || self.limit == 0 || self.work == 0 || self.hash == 0 {
            return 0;
        }
        let limit = params.tx_feework_limit as i128;
        let min_fee = params.min_tx_fee.to_atoms() as i128;
        let mcost_min = params.feeless_mcost_min as i128;
        let diff = (limit * min_fee / self.hash as i128) * (self.mcost as i128 / mcost_min);
        diff.min(i64::MAX as i128) as i64
    }
}

/// Resolves the chain context a feework check needs: the tip height, the
/// hash of the block at a given height, and which fork was active there.
/// Implemented by whatever holds the block index (the `chainstate` crate);
/// kept as a trait here so `feework` never depends on it.
pub trait ChainTip {
    fn tip_height(&self) -> i32;
    fn block_hash_at(&self, height: i32) -> Option<Hash256>;
    fn fork_at(&self, height: i32) -> Fork;
}

/// `CheckFeework`: validates (or extracts the absence of) a transaction's
/// feework. `required` mirrors the caller's own `fRequired` -- whether the
/// tx's fee was already known to fall short of `MinFee`, making a feework
/// mandatory. `allow_pre_feeless_version` is testnet's relaxation of the
/// `FEELESS_VERSION` floor.
#[allow(clippy::too_many_arguments)]
pub fn check_feework(
    tx: &Transaction,
    output_scripts: &[Script],
    required: bool,
    allow_pre_feeless_version: bool,
    block_size: u64,
    mode: RelayMode,
    check_depth: bool,
    tip: &dyn ChainTip,
    params: &ChainParams,
    argon2: &dyn Argon2d,
    buffer: &mut Argon2Buffer,
) -> Feework {
    if output_scripts.is_empty() {
        return Feework::with_status(FeeworkStatus::Empty);
    }
    if tx.is_coinbase() {
        return Feework::with_status(FeeworkStatus::Coinbase);
    }
    if tx.is_coinstake() {
        return Feework::with_status(FeeworkStatus::Coinstake);
    }

    let last_index = output_scripts.len() - 1;
    for (i, out_script) in output_scripts.iter().enumerate() {
        if out_script.instructions().collect::<Result<Vec<_>, _>>().is_err() {
            return Feework::with_status(FeeworkStatus::Insoluble);
        }
        let has_feework = matches!(extract_feework(out_script), Ok(Some(_)));
        if has_feework && i != last_index {
            return Feework::with_status(FeeworkStatus::Misplaced);
        }
    }

    let payload = match extract_feework(&output_scripts[last_index]) {
        Ok(Some(p)) => p,
        Ok(None) => {
            return if required {
                Feework::with_status(FeeworkStatus::Missing)
            } else {
                Feework::with_status(FeeworkStatus::None)
            };
        }
        Err(_) => return Feework::with_status(FeeworkStatus::Insoluble),
    };

    if !allow_pre_feeless_version && tx.version < FEELESS_VERSION {
        return Feework::with_status(FeeworkStatus::BadVersion);
    }
    if !allow_pre_feeless_version && tip.fork_at(payload.height) < Fork::ForkFeeless {
        return Feework::with_status(FeeworkStatus::BadVersion);
    }

    let mut feework = Feework {
        height: Some(payload.height),
        bytes: tx.encode().len() as u64,
        mcost: payload.mcost,
        work: payload.work,
        ..Feework::new()
    };

    if payload.height > tip.tip_height() {
        feework.status = FeeworkStatus::BlockUnknown;
        return feework;
    }
    if check_depth && payload.height < tip.tip_height() - params.feeless_max_depth {
        feework.status = FeeworkStatus::BlockTooDeep;
        return feework;
    }
    let Some(block_hash) = tip.block_hash_at(payload.height) else {
        feework.status = FeeworkStatus::BlockUnknown;
        return feework;
    };
    feework.block_hash = Some(block_hash);

    let mut stripped = tx.clone();
    stripped.outputs.pop();
    for input in &mut stripped.inputs {
        input.script_sig.clear();
    }

    let mut preimage = block_hash.encode();
    preimage.extend_from_slice(&stripped.encode());

    feework.limit = feework_limit(params, block_size, mode, feework.bytes);
    feework.compute_hash(argon2, buffer, &preimage, params);

    let required_mcost = feework_hardness(params, block_size, mode, feework.bytes);
    feework.check(required_mcost, params.feework_max_mcost());
    feework
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::RelayMode;
    use common::chain::{OutPoint, TxInput, TxOutput};
    use common::primitives::Amount;
    use script::FeeworkPayload;

    struct FakeArgon2;
    impl Argon2d for FakeArgon2 {
        fn hash_raw(
            &self,
            _t_cost: u32,
            _m_cost: u32,
            _parallelism: u32,
            data: &[u8],
            work: &[u8],
            tag_len: usize,
            _buffer: &mut Argon2Buffer,
        ) -> Vec<u8> {
            let mut out = vec![0u8; tag_len];
            let seed = data.len() as u8 ^ work.iter().fold(0u8, |a, b| a ^ b);
            out[0] = seed;
            out
        }
    }

    struct FakeTip {
        height: i32,
    }
    impl ChainTip for FakeTip {
        fn tip_height(&self) -> i32 {
            self.height
        }
        fn block_hash_at(&self, height: i32) -> Option<Hash256> {
            (height <= self.height).then(|| Hash256::from_bytes([height as u8; 32]))
        }
        fn fork_at(&self, _height: i32) -> Fork {
            Fork::ForkFeeless
        }
    }

    fn feeless_tx(feework_script: Script) -> Transaction {
        Transaction {
            version: FEELESS_VERSION,
            time: None,
            inputs: vec![TxInput::new(OutPoint::new(Hash256::from_bytes([7; 32]), 0), vec![1])],
            outputs: vec![
                TxOutput { value: Amount::from_atoms(1000), script_pubkey: vec![] },
                TxOutput { value: Amount::from_atoms(0), script_pubkey: feework_script.0 },
            ],
        }
    }

    #[test]
    fn missing_feework_rejected_when_required() {
        let tx = Transaction {
            version: FEELESS_VERSION,
            time: None,
            inputs: vec![TxInput::new(OutPoint::new(Hash256::from_bytes([7; 32]), 0), vec![1])],
            outputs: vec![TxOutput { value: Amount::from_atoms(1000), script_pubkey: vec![] }],
        };
        let params = ChainParams::mainnet();
        let tip = FakeTip { height: 100 };
        let mut buffer = Argon2Buffer::with_capacity(params.feework_max_mcost());
        let result = check_feework(
            &tx,
            &[Script::new(vec![])],
            true,
            true,
            0,
            RelayMode::Block,
            false,
            &tip,
            &params,
            &FakeArgon2,
            &mut buffer,
        );
        assert_eq!(result.status, FeeworkStatus::Missing);
    }

    #[test]
    fn absent_feework_is_none_when_not_required() {
        let tx = Transaction {
            version: FEELESS_VERSION,
            time: None,
            inputs: vec![TxInput::new(OutPoint::new(Hash256::from_bytes([7; 32]), 0), vec![1])],
            outputs: vec![TxOutput { value: Amount::from_atoms(1000), script_pubkey: vec![] }],
        };
        let params = ChainParams::mainnet();
        let tip = FakeTip { height: 100 };
        let mut buffer = Argon2Buffer::with_capacity(params.feework_max_mcost());
        let result = check_feework(
            &tx,
            &[Script::new(vec![])],
            false,
            true,
            0,
            RelayMode::Block,
            false,
            &tip,
            &params,
            &FakeArgon2,
            &mut buffer,
        );
        assert_eq!(result.status, FeeworkStatus::None);
    }

    #[test]
    fn block_ahead_of_tip_is_unknown() {
        let payload = FeeworkPayload { work: 1, mcost: params_mcost(), height: 500 };
        let script = Script::new(vec![]).push_bytes(&payload.encode()).push_op(script::Opcode::Feework);
        let tx = feeless_tx(script);
        let params = ChainParams::mainnet();
        let tip = FakeTip { height: 100 };
        let scripts = [Script::new(vec![]), Script::new(tx.outputs[1].script_pubkey.clone())];
        let mut buffer = Argon2Buffer::with_capacity(params.feework_max_mcost());
        let result = check_feework(
            &tx, &scripts, false, true, 0, RelayMode::Block, false, &tip, &params, &FakeArgon2, &mut buffer,
        );
        assert_eq!(result.status, FeeworkStatus::BlockUnknown);
    }

    fn params_mcost() -> u32 {
        ChainParams::mainnet().feeless_mcost_min
    }

    #[test]
    fn get_diff_is_zero_without_a_computed_hash() {
        let feework = Feework::new();
        assert_eq!(feework.get_diff(&ChainParams::mainnet()), 0);
    }
}
