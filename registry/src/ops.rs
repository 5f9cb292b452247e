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

//! Applying `vDeets` lifecycle operations (purchase/setkey/setstate/claim/
//! setmeta) against a [`StakerRegistry`]. One transaction may carry several
//! deets; [`apply_tx_deets`] enforces the per-tx shape rules from spec §4.5
//! before mutating anything, so a rejected transaction leaves the registry
//! untouched.

use crate::error::{Error, Result};
use crate::price;
use crate::types::{RegistryState, StakerRecord, StakerRegistry};
use common::chain::deets::{Deet, KeyRole, StakerState};
use common::chain::{Network, StakerId};
use common::primitives::{money_range, Amount};

/// The signatory authority presented by the single input of a setkey/
/// setstate/claim/setmeta transaction -- i.e. the pubkey whose signature
/// unlocked that input. `script` resolves this; `registry` only consumes it.
pub type Signatory = Vec<u8>;

/// One transaction's worth of registry-affecting outputs, in output order,
/// together with the signatory authorizing them (`None` for purchases,
/// which require no pre-existing authority).
pub struct TxDeets<'a> {
    pub deets: &'a [Deet],
    pub signatory: Option<&'a Signatory>,
    pub input_count: usize,
}

fn authorized_for_role(record: &StakerRecord, signatory: &[u8], role: KeyRole) -> bool {
    match role {
        KeyRole::Owner => record.owner_key == signatory,
        KeyRole::Manager | KeyRole::Delegate | KeyRole::Controller => {
            record.owner_key == signatory || record.manager_key == signatory
        }
    }
}

fn authorized_for_state_change(record: &StakerRecord, signatory: &[u8]) -> bool {
    record.owner_key == signatory
        || record.manager_key == signatory
        || record.controller_key == signatory
}

/// `CheckMetaKey`: which authority may write a given metadata key. The
/// "nick" key (the display alias) follows owner/manager rules like other
/// role-sensitive fields; all other keys are controller-writable, matching
/// the widest role a staker typically delegates to an operator.
fn meta_key_authority(record: &StakerRecord, signatory: &[u8], key: &str) -> bool {
    if key == "nick" {
        record.owner_key == signatory || record.manager_key == signatory
    } else {
        authorized_for_state_change(record, signatory)
    }
}

/// `CheckMetaValue`: length/charset gate. Printable ASCII, at most 40 bytes
/// (the wire payload's fixed field width).
fn meta_value_is_valid(value: &str) -> bool {
    value.len() <= 40 && value.bytes().all(|b| (0x20..=0x7e).contains(&b))
}

/// Applies every deet in a single transaction to `registry`, in output
/// order. On any rejection the registry is left exactly as it was: deets are
/// first validated against a read-only view, then applied.
pub fn apply_tx_deets(
    registry: &mut StakerRegistry,
    network: Network,
    height: i32,
    money_supply: i64,
    tx: &TxDeets<'_>,
) -> Result<()> {
    validate_tx_deets(registry, tx)?;
    for deet in tx.deets {
        apply_one(registry, network, height, money_supply, deet, tx.signatory)?;
    }
    Ok(())
}

fn validate_tx_deets(registry: &StakerRegistry, tx: &TxDeets<'_>) -> Result<()> {
    let setkey_roles: Vec<(StakerId, KeyRole)> = tx
        .deets
        .iter()
        .filter_map(|d| match d {
            Deet::SetKey { staker_id, role, .. } => Some((*staker_id, *role)),
            _ => None,
        })
        .collect();
    if !setkey_roles.is_empty() {
        if tx.input_count != 1 {
            return Err(Error::SetKeyMultipleStakers);
        }
        let target = setkey_roles[0].0;
        if setkey_roles.iter().any(|(id, _)| *id != target) {
            return Err(Error::SetKeyMultipleStakers);
        }
        let mut seen_roles = std::collections::HashSet::new();
        for (_, role) in &setkey_roles {
            if !seen_roles.insert(*role) {
                return Err(Error::DuplicateRoleInTx);
            }
        }
        // Owner change must be the last setkey output; manager change must
        // precede only an owner change.
        let owner_pos = setkey_roles.iter().position(|(_, r)| *r == KeyRole::Owner);
        if let Some(pos) = owner_pos {
            if pos != setkey_roles.len() - 1 {
                return Err(Error::OwnerChangeNotLast);
            }
        }
        let manager_pos = setkey_roles.iter().position(|(_, r)| *r == KeyRole::Manager);
        if let Some(pos) = manager_pos {
            let allowed_tail = setkey_roles.len() - if owner_pos.is_some() { 2 } else { 1 };
            if pos != allowed_tail {
                return Err(Error::ManagerChangeOrder);
            }
        }
    }

    let setstate_count = tx.deets.iter().filter(|d| matches!(d, Deet::SetState { .. })).count();
    if setstate_count > 1 {
        return Err(Error::InvariantViolation("multiple setstate in one tx"));
    }
    if setstate_count == 1 && tx.input_count != 1 {
        return Err(Error::SetStateNotSingleInput);
    }

    let claim_count = tx.deets.iter().filter(|d| matches!(d, Deet::Claim { .. })).count();
    if claim_count > 1 {
        return Err(Error::InvariantViolation("multiple claims in one tx"));
    }
    if claim_count == 1 && tx.input_count != 1 {
        return Err(Error::ClaimNotSingleInputOutput);
    }

    let setmeta_targets: Vec<StakerId> = tx
        .deets
        .iter()
        .filter_map(|d| match d {
            Deet::SetMeta { staker_id, .. } => Some(*staker_id),
            _ => None,
        })
        .collect();
    if !setmeta_targets.is_empty() {
        if tx.input_count != 1 {
            return Err(Error::SetMetaNotSingleInput);
        }
        if setmeta_targets.iter().any(|id| *id != setmeta_targets[0]) {
            return Err(Error::InvariantViolation("setmeta targets more than one staker"));
        }
        let mut seen_keys = std::collections::HashSet::new();
        for deet in tx.deets {
            if let Deet::SetMeta { key, .. } = deet {
                if !seen_keys.insert(key.clone()) {
                    return Err(Error::DuplicateMetaKey);
                }
            }
        }
    }

    let _ = registry;
    Ok(())
}

fn apply_one(
    registry: &mut StakerRegistry,
    network: Network,
    height: i32,
    money_supply: i64,
    deet: &Deet,
    signatory: Option<&Signatory>,
) -> Result<()> {
    match deet {
        Deet::Purchase1 { price: paid, owner_pubkey, alias } => {
            apply_purchase(registry, network, money_supply, *paid, owner_pubkey.clone(), alias, None, None, None, 0)
        }
        Deet::Purchase4 {
            price: paid,
            owner_pubkey,
            delegate_pubkey,
            manager_pubkey,
            controller_pubkey,
            payout_pcm,
            alias,
        } => apply_purchase(
            registry,
            network,
            money_supply,
            *paid,
            owner_pubkey.clone(),
            alias,
            Some(delegate_pubkey.clone()),
            manager_pubkey.clone(),
            Some(controller_pubkey.clone()),
            *payout_pcm,
        ),
        Deet::SetKey { staker_id, role, pubkey, payout_pcm } => {
            apply_setkey(registry, *staker_id, *role, pubkey, *payout_pcm, signatory)
        }
        Deet::SetState { staker_id, state } => {
            apply_setstate(registry, *staker_id, *state, height, signatory)
        }
        Deet::Claim { pubkey, value } => apply_claim(registry, pubkey, *value, signatory),
        Deet::SetMeta { staker_id, key, value } => {
            apply_setmeta(registry, *staker_id, key, value, signatory)
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn apply_purchase(
    registry: &mut StakerRegistry,
    network: Network,
    money_supply: i64,
    paid: Amount,
    owner_pubkey: Vec<u8>,
    alias: &str,
    delegate_pubkey: Option<Vec<u8>>,
    manager_pubkey: Option<Vec<u8>>,
    controller_pubkey: Option<Vec<u8>>,
    payout_pcm: u32,
) -> Result<()> {
    if alias.len() > 16 {
        return Err(Error::AliasTooLong);
    }
    let lowered = alias.to_lowercase();
    if registry.aliases.contains_key(&lowered) {
        return Err(Error::AliasAlreadyExists(lowered));
    }
    if payout_pcm > 100_000 {
        return Err(Error::PayoutPcmTooHigh(payout_pcm));
    }
    let n = registry.qualified_staker_count();
    let required = price::staker_price(network, n, money_supply, true);
    let paid_atoms = paid.to_atoms();
    if paid_atoms < required {
        return Err(Error::PurchasePriceTooLow { paid: paid_atoms, required });
    }
    if paid_atoms > required.saturating_mul(2) {
        return Err(Error::PurchasePriceTooHigh { paid: paid_atoms, required });
    }
    if let Some(nft_id) = lowered.parse::<u32>().ok().filter(|id| registry.nft_assignments.contains_key(id)) {
        registry.nft_assignments.remove(&nft_id);
    }

    let mut record = StakerRecord::new_from_purchase(owner_pubkey);
    if let Some(d) = delegate_pubkey {
        record.delegate_key = d;
    }
    if let Some(m) = manager_pubkey {
        record.manager_key = m;
    }
    if let Some(c) = controller_pubkey {
        record.controller_key = c;
    }
    record.delegate_payout_pcm = payout_pcm;

    let id = registry.next_staker_id;
    registry.next_staker_id += 1;
    registry.stakers.insert(id, record);
    registry.aliases.insert(lowered, id);
    Ok(())
}

fn apply_setkey(
    registry: &mut StakerRegistry,
    staker_id: StakerId,
    role: KeyRole,
    pubkey: &[u8],
    payout_pcm: Option<u32>,
    signatory: Option<&Signatory>,
) -> Result<()> {
    let signatory = signatory.ok_or(Error::UnauthorizedKeyRotation)?;
    let record = registry.stakers.get_mut(&staker_id).ok_or(Error::StakerNotFound(staker_id))?;
    if !authorized_for_role(record, signatory, role) {
        return Err(Error::UnauthorizedKeyRotation);
    }
    match role {
        KeyRole::Owner => record.owner_key = pubkey.to_vec(),
        KeyRole::Manager => record.manager_key = pubkey.to_vec(),
        KeyRole::Delegate => {
            record.delegate_key = pubkey.to_vec();
            if let Some(pcm) = payout_pcm {
                if pcm > 100_000 {
                    return Err(Error::PayoutPcmTooHigh(pcm));
                }
                record.delegate_payout_pcm = pcm;
            }
        }
        KeyRole::Controller => record.controller_key = pubkey.to_vec(),
    }
    Ok(())
}

fn apply_setstate(
    registry: &mut StakerRegistry,
    staker_id: StakerId,
    state: StakerState,
    height: i32,
    signatory: Option<&Signatory>,
) -> Result<()> {
    let signatory = signatory.ok_or_else(|| Error::UnauthorizedStateChange(staker_id))?;
    let record = registry.stakers.get_mut(&staker_id).ok_or(Error::StakerNotFound(staker_id))?;
    if !authorized_for_state_change(record, signatory) {
        return Err(Error::UnauthorizedStateChange(staker_id));
    }
    if !matches!(record.state, RegistryState::Enabled | RegistryState::Disabled | RegistryState::Pending) {
        return Err(Error::StakerNotQualified(staker_id));
    }
    match state {
        StakerState::Enabled => {
            if let Some(enabled_at) = record.enabled_at_height {
                // A staker re-enabling within a cooldown window of its last
                // enable is rejected (`CanEnableStaker`); one day of blocks
                // at 5-second qPoS slots is 17_280.
                if height - enabled_at < 17_280 && record.state == RegistryState::Disabled {
                    return Err(Error::EnableCooldown(staker_id));
                }
            }
            record.state = RegistryState::Enabled;
            record.enabled_at_height = Some(height);
        }
        StakerState::Disabled => record.state = RegistryState::Disabled,
    }
    Ok(())
}

fn apply_claim(
    registry: &mut StakerRegistry,
    pubkey: &[u8],
    value: Amount,
    signatory: Option<&Signatory>,
) -> Result<()> {
    if !money_range(value) || value.to_atoms() == 0 {
        return Err(Error::InvariantViolation("claim value out of range"));
    }
    let signatory = signatory.ok_or(Error::ClaimPubkeyMismatch)?;
    if signatory != pubkey {
        return Err(Error::ClaimPubkeyMismatch);
    }
    let balance = registry.ledgers.get(pubkey).copied().unwrap_or(Amount::from_atoms(0));
    if value > balance {
        return Err(Error::ClaimExceedsBalance { value: value.to_atoms(), balance: balance.to_atoms() });
    }
    let remaining = balance.checked_sub(value).ok_or(Error::InvariantViolation("claim underflow"))?;
    if remaining.to_atoms() == 0 {
        registry.ledgers.remove(pubkey);
    } else {
        registry.ledgers.insert(pubkey.to_vec(), remaining);
    }
    Ok(())
}

fn apply_setmeta(
    registry: &mut StakerRegistry,
    staker_id: StakerId,
    key: &str,
    value: &str,
    signatory: Option<&Signatory>,
) -> Result<()> {
    let signatory = signatory.ok_or_else(|| Error::UnauthorizedMetaKey(key.to_string()))?;
    if !meta_value_is_valid(value) {
        return Err(Error::InvalidMetaValue);
    }
    let record = registry.stakers.get_mut(&staker_id).ok_or(Error::StakerNotFound(staker_id))?;
    if !meta_key_authority(record, signatory, key) {
        return Err(Error::UnauthorizedMetaKey(key.to_string()));
    }
    record.meta.insert(key.to_string(), value.to_string());
    Ok(())
}

/// Credits a pubkey's unclaimed ledger balance (qPoS rewards, returned fees).
/// Saturates rather than erroring: the registry invariant `0 <= balance <=
/// MAX_MONEY` is enforced by the caller clamping `amount` before crediting.
pub fn credit_ledger(registry: &mut StakerRegistry, pubkey: &[u8], amount: Amount) {
    let entry = registry.ledgers.entry(pubkey.to_vec()).or_insert(Amount::from_atoms(0));
    *entry = entry.checked_add(amount).unwrap_or(common::primitives::MAX_MONEY);
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::primitives::COIN;

    fn reg_with_supply() -> (StakerRegistry, i64) {
        (StakerRegistry::new(), 10_000_000 * COIN.to_atoms())
    }

    #[test]
    fn purchase_registers_alias_and_staker() {
        let (mut reg, supply) = reg_with_supply();
        let price = price::staker_price(Network::Mainnet, 0, supply, true);
        let deet = Deet::Purchase1 {
            price: Amount::from_atoms(price),
            owner_pubkey: vec![1, 2, 3],
            alias: "alice".to_string(),
        };
        let tx = TxDeets { deets: std::slice::from_ref(&deet), signatory: None, input_count: 1 };
        apply_tx_deets(&mut reg, Network::Mainnet, 100, supply, &tx).unwrap();
        assert_eq!(reg.aliases.get("alice"), Some(&1));
        assert_eq!(reg.stakers.len(), 1);
    }

    #[test]
    fn duplicate_alias_rejected() {
        let (mut reg, supply) = reg_with_supply();
        let price = price::staker_price(Network::Mainnet, 0, supply, true);
        reg.aliases.insert("alice".to_string(), 1);
        let deet = Deet::Purchase1 {
            price: Amount::from_atoms(price),
            owner_pubkey: vec![9],
            alias: "ALICE".to_string(),
        };
        let tx = TxDeets { deets: std::slice::from_ref(&deet), signatory: None, input_count: 1 };
        assert_eq!(
            apply_tx_deets(&mut reg, Network::Mainnet, 100, supply, &tx),
            Err(Error::AliasAlreadyExists("alice".to_string()))
        );
    }

    #[test]
    fn owner_rotation_must_come_last() {
        let mut reg = StakerRegistry::new();
        reg.stakers.insert(1, StakerRecord::new_from_purchase(vec![1]));
        let deets = vec![
            Deet::SetKey { staker_id: 1, role: KeyRole::Owner, pubkey: vec![2], payout_pcm: None },
            Deet::SetKey { staker_id: 1, role: KeyRole::Delegate, pubkey: vec![3], payout_pcm: None },
        ];
        let signatory = vec![1u8];
        let tx = TxDeets { deets: &deets, signatory: Some(&signatory), input_count: 1 };
        assert_eq!(
            apply_tx_deets(&mut reg, Network::Mainnet, 100, 0, &tx),
            Err(Error::OwnerChangeNotLast)
        );
    }

    #[test]
    fn owner_rotation_last_is_accepted() {
        let mut reg = StakerRegistry::new();
        reg.stakers.insert(1, StakerRecord::new_from_purchase(vec![1]));
        let deets = vec![
            Deet::SetKey { staker_id: 1, role: KeyRole::Delegate, pubkey: vec![3], payout_pcm: None },
            Deet::SetKey { staker_id: 1, role: KeyRole::Owner, pubkey: vec![2], payout_pcm: None },
        ];
        let signatory = vec![1u8];
        let tx = TxDeets { deets: &deets, signatory: Some(&signatory), input_count: 1 };
        apply_tx_deets(&mut reg, Network::Mainnet, 100, 0, &tx).unwrap();
        assert_eq!(reg.stakers[&1].owner_key, vec![2]);
        assert_eq!(reg.stakers[&1].delegate_key, vec![3]);
    }

    #[test]
    fn claim_idempotence() {
        let mut reg = StakerRegistry::new();
        reg.ledgers.insert(vec![7], Amount::from_atoms(100));
        let deet = Deet::Claim { pubkey: vec![7], value: Amount::from_atoms(60) };
        let signatory = vec![7u8];
        let tx = TxDeets { deets: std::slice::from_ref(&deet), signatory: Some(&signatory), input_count: 1 };
        apply_tx_deets(&mut reg, Network::Mainnet, 1, 0, &tx).unwrap();
        assert_eq!(reg.ledgers.get(&vec![7u8]), Some(&Amount::from_atoms(40)));

        let deet2 = Deet::Claim { pubkey: vec![7], value: Amount::from_atoms(50) };
        let tx2 = TxDeets { deets: std::slice::from_ref(&deet2), signatory: Some(&signatory), input_count: 1 };
        assert!(matches!(
            apply_tx_deets(&mut reg, Network::Mainnet, 1, 0, &tx2),
            Err(Error::ClaimExceedsBalance { .. })
        ));
    }
}
