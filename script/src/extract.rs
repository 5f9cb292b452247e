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

//! Turns a recognized output template into the registry-facing [`Deet`]
//! data shape (spec §3's `vDeets`), or a [`FeeworkPayload`] when the
//! template is the feework marker. This is the bridge between `script`
//! (which only knows about bytes and opcodes) and `registry`/`feework`
//! (which know nothing about scripts).

use crate::payload::{
    ClaimPayload, FeeworkPayload, Purchase1Payload, Purchase4Payload, PayloadError, SetKeyPayload,
    SetMetaPayload, SetStatePayload,
};
use crate::solver::{solve, Solution, TemplateType};
use crate::script::Script;
use common::chain::deets::{Deet, KeyRole, StakerState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    #[error("malformed payload: {0}")]
    Payload(PayloadError),
}

impl From<PayloadError> for ExtractError {
    fn from(e: PayloadError) -> Self {
        ExtractError::Payload(e)
    }
}

/// Extracts a [`Deet`] from a single output's `scriptPubKey`, if it carries
/// one. `purchase4_with_manager` selects the fork-gated payload width (spec
/// §9); it is ignored for every other template.
pub fn extract_deet(script: &Script, purchase4_with_manager: bool) -> Result<Option<Deet>, ExtractError> {
    let Solution { template, pushes } = solve(script);
    Ok(match template {
        TemplateType::Purchase1 => {
            let p = Purchase1Payload::decode(&pushes[0])?;
            Some(Deet::Purchase1 { price: p.price, owner_pubkey: p.owner_pubkey.to_vec(), alias: p.alias })
        }
        TemplateType::Purchase4 => {
            let bytes = &pushes[0];
            let p = if purchase4_with_manager || bytes.len() == Purchase4Payload::LEN_WITH_MANAGER {
                Purchase4Payload::decode(bytes)?
            } else {
                Purchase4Payload::decode(bytes)?
            };
            Some(Deet::Purchase4 {
                price: p.price,
                owner_pubkey: p.owner_pubkey.to_vec(),
                delegate_pubkey: p.delegate_pubkey.to_vec(),
                manager_pubkey: p.manager_pubkey.map(|m| m.to_vec()),
                controller_pubkey: p.controller_pubkey.to_vec(),
                payout_pcm: p.payout_pcm,
                alias: p.alias,
            })
        }
        TemplateType::SetOwner => Some(setkey_deet(&pushes[0], KeyRole::Owner)?),
        TemplateType::SetManager => Some(setkey_deet(&pushes[0], KeyRole::Manager)?),
        TemplateType::SetDelegate => Some(setkey_deet(&pushes[0], KeyRole::Delegate)?),
        TemplateType::SetController => Some(setkey_deet(&pushes[0], KeyRole::Controller)?),
        TemplateType::Enable => {
            let p = SetStatePayload::decode(&pushes[0])?;
            Some(Deet::SetState { staker_id: p.staker_id, state: StakerState::Enabled })
        }
        TemplateType::Disable => {
            let p = SetStatePayload::decode(&pushes[0])?;
            Some(Deet::SetState { staker_id: p.staker_id, state: StakerState::Disabled })
        }
        TemplateType::Claim => {
            let p = ClaimPayload::decode(&pushes[0])?;
            Some(Deet::Claim { pubkey: p.pubkey.to_vec(), value: p.value })
        }
        TemplateType::SetMeta => {
            let p = SetMetaPayload::decode(&pushes[0])?;
            Some(Deet::SetMeta { staker_id: p.staker_id, key: p.key, value: p.value })
        }
        _ => None,
    })
}

fn setkey_deet(bytes: &[u8], role: KeyRole) -> Result<Deet, ExtractError> {
    let p = SetKeyPayload::decode(bytes)?;
    Ok(Deet::SetKey { staker_id: p.staker_id, role, pubkey: p.pubkey.to_vec(), payout_pcm: p.payout_pcm })
}

/// Extracts the feework payload from the last output of a transaction, if
/// its template is `FEEWORK` (spec §4.3: "the feework output is always the
/// last output; exactly one per tx").
pub fn extract_feework(last_output_script: &Script) -> Result<Option<FeeworkPayload>, ExtractError> {
    let Solution { template, pushes } = solve(last_output_script);
    if template != TemplateType::Feework {
        return Ok(None);
    }
    Ok(Some(FeeworkPayload::decode(&pushes[0])?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::Opcode;
    use common::primitives::Amount;

    #[test]
    fn extracts_purchase1() {
        let payload = Purchase1Payload { price: Amount::from_atoms(5), owner_pubkey: [9; 33], alias: "x".into() };
        let script = Script::new(vec![]).push_bytes(&payload.encode()).push_op(Opcode::Purchase1);
        let deet = extract_deet(&script, true).unwrap().unwrap();
        assert!(matches!(deet, Deet::Purchase1 { .. }));
    }

    #[test]
    fn extracts_feework_from_last_output() {
        let payload = FeeworkPayload { work: 1, mcost: 2, height: 3 };
        let script = Script::new(vec![]).push_bytes(&payload.encode()).push_op(Opcode::Feework);
        let extracted = extract_feework(&script).unwrap().unwrap();
        assert_eq!(extracted, payload);
    }

    #[test]
    fn non_deet_script_extracts_nothing() {
        let script = Script::new(vec![]).push_bytes(&[1; 33]).push_op(Opcode::CheckSig);
        assert_eq!(extract_deet(&script, true).unwrap(), None);
    }
}
