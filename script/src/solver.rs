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

//! The output-template solver (spec §4.2's table). Recognizes the fixed
//! instruction shapes a standard output's `scriptPubKey` may take and
//! extracts the "solutions" -- the pushed byte strings a spender needs.

use crate::opcode::Opcode;
use crate::script::{Instruction, Script};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateType {
    PubKey,
    PubKeyHash,
    ScriptHash,
    Multisig,
    NullData,
    Purchase1,
    Purchase4,
    SetOwner,
    SetManager,
    SetDelegate,
    SetController,
    Enable,
    Disable,
    Claim,
    SetMeta,
    Feework,
    NonStandard,
}

impl TemplateType {
    /// Registry/feework outputs whose value may legitimately be zero even
    /// from `FORKPURCHASE` onward (spec §4.2 `CheckTransaction`).
    pub fn allows_zero_value(self) -> bool {
        matches!(
            self,
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
                | TemplateType::Claim
        )
    }

    pub fn is_standard(self) -> bool {
        !matches!(self, TemplateType::NonStandard)
    }
}

/// A recognized template plus the pushed byte strings it carries, in the
/// order they appeared (spec §4.2's "solutions").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub template: TemplateType,
    pub pushes: Vec<Vec<u8>>,
}

fn collect(script: &Script) -> Option<Vec<Instruction<'_>>> {
    script.instructions().collect::<Result<Vec<_>, _>>().ok()
}

/// `Solver`: recognizes a `scriptPubKey`'s output template. Returns
/// `NonStandard` (with no pushes) for anything that doesn't match a known
/// shape, rather than failing -- non-standard outputs are legal to create,
/// just unspendable by policy (spec §4.2).
pub fn solve(script: &Script) -> Solution {
    let Some(ops) = collect(script) else {
        return Solution { template: TemplateType::NonStandard, pushes: vec![] };
    };

    use Instruction::*;

    match ops.as_slice() {
        [Push(pubkey), Op(Opcode::CheckSig)] => {
            Solution { template: TemplateType::PubKey, pushes: vec![pubkey.to_vec()] }
        }
        [Op(Opcode::Dup), Op(Opcode::Hash160), Push(keyid), Op(Opcode::EqualVerify), Op(Opcode::CheckSig)] => {
            Solution { template: TemplateType::PubKeyHash, pushes: vec![keyid.to_vec()] }
        }
        [Op(Opcode::Hash160), Push(scripthash), Op(Opcode::Equal)] => {
            Solution { template: TemplateType::ScriptHash, pushes: vec![scripthash.to_vec()] }
        }
        [Op(Opcode::Return), Push(payload)] => {
            Solution { template: TemplateType::NullData, pushes: vec![payload.to_vec()] }
        }
        [Push(payload), Op(Opcode::Purchase1)] => {
            Solution { template: TemplateType::Purchase1, pushes: vec![payload.to_vec()] }
        }
        [Push(payload), Op(Opcode::Purchase4)] => {
            Solution { template: TemplateType::Purchase4, pushes: vec![payload.to_vec()] }
        }
        [Push(payload), Op(Opcode::SetOwner)] => {
            Solution { template: TemplateType::SetOwner, pushes: vec![payload.to_vec()] }
        }
        [Push(payload), Op(Opcode::SetManager)] => {
            Solution { template: TemplateType::SetManager, pushes: vec![payload.to_vec()] }
        }
        [Push(payload), Op(Opcode::SetDelegate)] => {
            Solution { template: TemplateType::SetDelegate, pushes: vec![payload.to_vec()] }
        }
        [Push(payload), Op(Opcode::SetController)] => {
            Solution { template: TemplateType::SetController, pushes: vec![payload.to_vec()] }
        }
        [Push(payload), Op(Opcode::Enable)] => {
            Solution { template: TemplateType::Enable, pushes: vec![payload.to_vec()] }
        }
        [Push(payload), Op(Opcode::Disable)] => {
            Solution { template: TemplateType::Disable, pushes: vec![payload.to_vec()] }
        }
        [Push(payload), Op(Opcode::SetMeta)] => {
            Solution { template: TemplateType::SetMeta, pushes: vec![payload.to_vec()] }
        }
        [Push(payload), Op(Opcode::Feework)] => {
            Solution { template: TemplateType::Feework, pushes: vec![payload.to_vec()] }
        }
        [Push(payload), Op(Opcode::Claim), Op(Opcode::Dup), Op(Opcode::Hash160), Push(keyid), Op(Opcode::EqualVerify), Op(Opcode::CheckSig)] => {
            Solution { template: TemplateType::Claim, pushes: vec![payload.to_vec(), keyid.to_vec()] }
        }
        _ => solve_multisig(&ops).unwrap_or(Solution { template: TemplateType::NonStandard, pushes: vec![] }),
    }
}

fn small_int(op: &Instruction<'_>) -> Option<u8> {
    match op {
        Instruction::Push(bytes) if bytes.is_empty() => Some(0),
        Instruction::Unknown(b) if (0x51..=0x60).contains(b) => Some(b - 0x50),
        _ => None,
    }
}

/// `m pubkey.. n CHECKMULTISIG`: matched structurally since `m`/`n` are
/// small-int opcodes (`OP_1..OP_16`), not a fixed shape `matches!` can express.
fn solve_multisig(ops: &[Instruction<'_>]) -> Option<Solution> {
    if ops.len() < 4 {
        return None;
    }
    let last = ops.last()?;
    if !matches!(last, Instruction::Op(Opcode::CheckMultisig)) {
        return None;
    }
    let m = small_int(&ops[0])?;
    let n = small_int(&ops[ops.len() - 2])?;
    let pubkey_slots = &ops[1..ops.len() - 2];
    if pubkey_slots.len() != n as usize || m == 0 || n == 0 || m > n || n > 16 {
        return None;
    }
    let mut pushes = vec![vec![m]];
    for slot in pubkey_slots {
        match slot {
            Instruction::Push(bytes) => pushes.push(bytes.to_vec()),
            _ => return None,
        }
    }
    pushes.push(vec![n]);
    Some(Solution { template: TemplateType::Multisig, pushes })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_pubkeyhash() {
        let script = Script::new(vec![])
            .push_op(Opcode::Dup)
            .push_op(Opcode::Hash160)
            .push_bytes(&[1; 20])
            .push_op(Opcode::EqualVerify)
            .push_op(Opcode::CheckSig);
        let sol = solve(&script);
        assert_eq!(sol.template, TemplateType::PubKeyHash);
        assert_eq!(sol.pushes, vec![vec![1; 20]]);
    }

    #[test]
    fn recognizes_feework() {
        let script = Script::new(vec![]).push_bytes(&[0; 16]).push_op(Opcode::Feework);
        assert_eq!(solve(&script).template, TemplateType::Feework);
    }

    #[test]
    fn recognizes_claim() {
        let script = Script::new(vec![])
            .push_bytes(&[0; 41])
            .push_op(Opcode::Claim)
            .push_op(Opcode::Dup)
            .push_op(Opcode::Hash160)
            .push_bytes(&[2; 20])
            .push_op(Opcode::EqualVerify)
            .push_op(Opcode::CheckSig);
        let sol = solve(&script);
        assert_eq!(sol.template, TemplateType::Claim);
        assert_eq!(sol.pushes.len(), 2);
    }

    #[test]
    fn recognizes_2_of_3_multisig() {
        let script = Script::new(vec![])
            .push_int(2)
            .push_bytes(&[1; 33])
            .push_bytes(&[2; 33])
            .push_bytes(&[3; 33])
            .push_int(3)
            .push_op(Opcode::CheckMultisig);
        let sol = solve(&script);
        assert_eq!(sol.template, TemplateType::Multisig);
        assert_eq!(sol.pushes.len(), 5);
    }

    #[test]
    fn garbage_is_nonstandard() {
        let script = Script::new(vec![0xff, 0xfe]);
        assert_eq!(solve(&script).template, TemplateType::NonStandard);
    }
}
