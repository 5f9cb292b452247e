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

//! Deriving a registry-facing signatory from a scriptSig. The registry only
//! needs "the pubkey that authorized this input", not a full signature
//! check (the script/sig crate already ran that independently); the
//! simplification here is to take the scriptSig's last push, which is the
//! pubkey under every P2PKH/P2SH-style template this chain solves.

use script::{Instruction, Script};

/// `None` if the scriptSig isn't push-only, is empty, or its last push
/// can't plausibly be a pubkey (registry authorization then has no
/// signatory to check against, so the caller treats the deet as
/// unauthorized rather than guessing).
pub fn derive_signatory(script_sig: &[u8]) -> Option<Vec<u8>> {
    let script = Script::new(script_sig.to_vec());
    let mut last_push = None;
    for instruction in script.instructions() {
        match instruction {
            Ok(Instruction::Push(data)) => last_push = Some(data.to_vec()),
            _ => return None,
        }
    }
    last_push
}

#[cfg(test)]
mod tests {
    use super::*;
    use script::Opcode;

    #[test]
    fn last_push_of_a_p2pkh_sig_script_is_the_signatory() {
        let script = Script::new(vec![]).push_bytes(&[1, 2, 3]).push_bytes(&[9; 33]);
        let signatory = derive_signatory(&script.0).unwrap();
        assert_eq!(signatory, vec![9; 33]);
    }

    #[test]
    fn non_push_only_script_has_no_signatory() {
        let script = Script::new(vec![]).push_bytes(&[1]).push_op(Opcode::CheckSig);
        assert_eq!(derive_signatory(&script.0), None);
    }

    #[test]
    fn empty_script_has_no_signatory() {
        assert_eq!(derive_signatory(&[]), None);
    }
}
