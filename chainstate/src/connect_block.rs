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

//! `ConnectBlock` (spec §4.6): applies a block's transactions against the
//! unspent set and the staker registry, crediting the block's reward and
//! folding the result into the running money supply. This is the one place
//! every other module's per-transaction rule gets exercised together.

use crate::error::{Error, Result};
use crate::reward;
use crate::signature::check_block_signature;
use common::chain::{Block, ChainParams, Fork, Network, Transaction};
use common::primitives::Amount;
use crypto::{Argon2Buffer, Argon2d, Verifier};
use feework::{check_feework, ChainTip, RelayMode};
use mempool::derive_signatory;
use registry::{apply_tx_deets, credit_ledger, StakerRegistry, TxDeets};
use script::{extract_feework, Script};
use serialization::Encode;
use storage::KvWrite;
use utxo::{add_outputs, connect_inputs, fetch_inputs, require_all_found, value_in, ConnectUndo, FeeMode};

fn output_scripts(tx: &Transaction) -> Vec<Script> {
    tx.outputs.iter().map(|o| Script::new(o.script_pubkey.clone())).collect()
}

/// Every deet `check_block`'s `vDeets` cache recorded against `tx_idx`, in
/// output order. Reused here rather than re-running `extract_deet`, since
/// `check_block` already validated the cache's ordering against the block.
fn deets_for(block: &Block, tx_idx: usize) -> Vec<common::chain::Deet> {
    block.deets.iter().filter(|(i, _, _)| *i == tx_idx).map(|(_, _, deet)| deet.clone()).collect()
}

fn purchase_value(deets: &[common::chain::Deet]) -> Amount {
    deets.iter().fold(Amount::from_atoms(0), |acc, d| match d {
        common::chain::Deet::Purchase1 { price, .. } | common::chain::Deet::Purchase4 { price, .. } => {
            acc.checked_add(*price).unwrap_or(common::primitives::MAX_MONEY)
        }
        _ => acc,
    })
}

fn claim_of(deets: &[common::chain::Deet]) -> Option<(Vec<u8>, Amount)> {
    deets.iter().find_map(|d| match d {
        common::chain::Deet::Claim { pubkey, value } => Some((pubkey.clone(), *value)),
        _ => None,
    })
}

/// Resources collaborating crates (`feework`) need but own no storage for.
pub struct ConnectContext<'a> {
    pub params: &'a ChainParams,
    pub network: Network,
    pub fork: Fork,
    pub height: i32,
    pub testnet: bool,
    pub prev_money_supply: i64,
    pub tip: &'a dyn ChainTip,
    pub verifier: &'a dyn Verifier,
    pub argon2: &'a dyn Argon2d,
}

/// Applies `block` at `height` against `store` and `registry`, both mutated
/// in place, returning the money supply following this block together with
/// one [`ConnectUndo`] per transaction (in block order, a default for the
/// coinbase) for [`crate::chain_selector`] to archive against a later
/// disconnection. Every check here assumes `check_block`/`accept_block`
/// already ran; this module only does the work that requires touching the
/// unspent set and the registry.
pub fn connect_block<S: KvWrite>(
    store: &mut S,
    block: &Block,
    registry: &mut StakerRegistry,
    ctx: &ConnectContext<'_>,
    buffer: &mut Argon2Buffer,
) -> Result<(i64, Vec<ConnectUndo>)> {
    check_block_signature(block, registry, ctx.verifier)?;

    let mut value_out_total = Amount::from_atoms(0);
    let mut value_in_raw_total = Amount::from_atoms(0);
    let mut value_claims_total = Amount::from_atoms(0);
    let mut value_purchases_total = Amount::from_atoms(0);
    let mut fees_total = Amount::from_atoms(0);
    let mut coin_ages: Vec<u64> = Vec::new();
    let mut coinstake_value_in = Amount::from_atoms(0);
    let mut undos: Vec<ConnectUndo> = Vec::with_capacity(block.transactions.len());

    for (tx_idx, tx) in block.transactions.iter().enumerate() {
        let tx_out_total = tx
            .outputs
            .iter()
            .try_fold(Amount::from_atoms(0), |acc, o| acc.checked_add(o.value))
            .ok_or(Error::BadAccounting("transaction output sum overflowed"))?;
        value_out_total = value_out_total
            .checked_add(tx_out_total)
            .ok_or(Error::BadAccounting("block value-out overflowed"))?;

        if tx.is_coinbase() {
            add_outputs(store, tx, ctx.height).map_err(Error::Utxo)?;
            undos.push(ConnectUndo::default());
            continue;
        }

        let fetched = fetch_inputs(store, tx).map_err(Error::Utxo)?;
        let inputs = require_all_found(fetched).map_err(Error::Utxo)?;

        let deets = deets_for(block, tx_idx);
        let is_coinstake = tx.is_coinstake();
        let claim = if is_coinstake { None } else { claim_of(&deets) };
        let claim_value = claim.as_ref().map(|(_, v)| *v).unwrap_or(Amount::from_atoms(0));
        if let Some((_, value)) = &claim {
            value_claims_total = value_claims_total
                .checked_add(*value)
                .ok_or(Error::BadAccounting("block claim total overflowed"))?;
        }

        let signatory = (tx.inputs.len() == 1).then(|| derive_signatory(&tx.inputs[0].script_sig)).flatten();
        if !deets.is_empty() {
            let tx_deets = TxDeets { deets: &deets, signatory: signatory.as_ref(), input_count: tx.inputs.len() };
            apply_tx_deets(registry, ctx.network, ctx.height, ctx.prev_money_supply, &tx_deets)
                .map_err(Error::Registry)?;
        }

        let raw_in = value_in(&inputs, claim_value).map_err(Error::Utxo)?;
        value_in_raw_total = value_in_raw_total
            .checked_add(raw_in)
            .ok_or(Error::BadAccounting("block value-in overflowed"))?;

        let purchases = if is_coinstake { Amount::from_atoms(0) } else { purchase_value(&deets) };

        let (raw_fee, undo) = connect_inputs(
            store,
            tx,
            &inputs,
            ctx.height,
            ctx.fork,
            ctx.params,
            claim_value,
            ctx.verifier,
        )
        .map_err(Error::Utxo)?;
        undos.push(undo);

        if !is_coinstake {
            let fee = raw_fee.checked_sub(purchases).ok_or(Error::BadAccounting("purchase price exceeds tx fee"))?;
            value_purchases_total = value_purchases_total
                .checked_add(purchases)
                .ok_or(Error::BadAccounting("block purchase total overflowed"))?;
            fees_total =
                fees_total.checked_add(fee).ok_or(Error::BadAccounting("block fee total overflowed"))?;

            let output_scripts = output_scripts(tx);
            let required_fee = utxo::min_fee(ctx.params, 0, FeeMode::Block, tx.encode().len());
            if fee < required_fee {
                let fw = check_feework(
                    tx,
                    &output_scripts,
                    true,
                    ctx.testnet,
                    0,
                    RelayMode::Block,
                    false,
                    ctx.tip,
                    ctx.params,
                    ctx.argon2,
                    buffer,
                );
                if !fw.status.is_ok() {
                    return Err(Error::Feework(fw.status));
                }
            } else {
                let has_feework =
                    output_scripts.last().map(|s| matches!(extract_feework(s), Ok(Some(_)))).unwrap_or(false);
                if has_feework {
                    let fw = check_feework(
                        tx,
                        &output_scripts,
                        false,
                        ctx.testnet,
                        0,
                        RelayMode::Block,
                        false,
                        ctx.tip,
                        ctx.params,
                        ctx.argon2,
                        buffer,
                    );
                    if !fw.status.is_valid() {
                        return Err(Error::Feework(fw.status));
                    }
                }
            }
        } else {
            coinstake_value_in = raw_in;
            let tx_time = tx.time.unwrap_or(block.header.time);
            coin_ages.push(reward::transaction_coin_age(&inputs, tx_time, ctx.params.stake_min_age as u32));
        }

        add_outputs(store, tx, ctx.height).map_err(Error::Utxo)?;
    }

    check_reward_ceiling(block, ctx, fees_total, coinstake_value_in, &coin_ages, registry)?;

    // claims are folded into value_in upstream and must be peeled back out;
    // purchases never show up in value_in and must be added back in.
    let net_in = value_in_raw_total
        .checked_sub(value_claims_total)
        .ok_or(Error::BadAccounting("claims exceed raw value-in"))?;
    let money_supply = ctx
        .prev_money_supply
        .checked_add(value_out_total.to_atoms())
        .and_then(|v| v.checked_sub(value_purchases_total.to_atoms()))
        .and_then(|v| v.checked_sub(net_in.to_atoms()))
        .ok_or(Error::BadAccounting("money supply update overflowed"))?;

    Ok((money_supply, undos))
}

/// Caps the reward a block's coinbase/coinstake/qPoS credit may take,
/// against the legacy subsidy schedules. The qPoS path mints via
/// [`registry::credit_ledger`] rather than an on-chain output, split
/// between a staker's delegate and its owner by `delegate_payout_pcm`.
fn check_reward_ceiling(
    block: &Block,
    ctx: &ConnectContext<'_>,
    fees_total: Amount,
    coinstake_value_in: Amount,
    coin_ages: &[u64],
    registry: &mut StakerRegistry,
) -> Result<()> {
    if block.header.is_qpos() {
        let staker_id = block.header.staker_id.expect("qPoS header carries a staker id");
        credit_qpos_reward(registry, staker_id, ctx.prev_money_supply)?;
        return Ok(());
    }

    if block.has_coinbase() {
        let coinbase = &block.transactions[0];
        let actual = coinbase
            .outputs
            .iter()
            .try_fold(Amount::from_atoms(0), |acc, o| acc.checked_add(o.value))
            .ok_or(Error::BadAccounting("coinbase output sum overflowed"))?;
        let allowed = reward::proof_of_work_reward(ctx.height, fees_total, ctx.testnet)
            .ok_or(Error::BadAccounting("proof-of-work reward overflowed"))?;
        if actual > allowed {
            return Err(Error::BadReward { actual: actual.to_atoms(), allowed: allowed.to_atoms() });
        }
    }

    if block.has_coinstake() {
        let coinstake = &block.transactions[1];
        let out_total = coinstake
            .outputs
            .iter()
            .try_fold(Amount::from_atoms(0), |acc, o| acc.checked_add(o.value))
            .ok_or(Error::BadAccounting("coinstake output sum overflowed"))?;
        let coin_age = reward::block_coin_age(coin_ages.iter().copied());
        let allowed_mint = reward::proof_of_stake_reward(coin_age, ctx.testnet);
        // Only the increase over the staked principal counts as minted;
        // ppcoin-style stake reward carries no fee component.
        let minted = out_total.checked_sub(coinstake_value_in).unwrap_or(Amount::from_atoms(0));
        if minted > allowed_mint {
            return Err(Error::BadReward { actual: minted.to_atoms(), allowed: allowed_mint.to_atoms() });
        }
    }

    Ok(())
}

/// Splits a qPoS block's mint between a staker's delegate and its owner by
/// `delegate_payout_pcm` (parts per hundred-thousand) and credits both in
/// the registry's ledger. Shared between [`check_reward_ceiling`] (live
/// connection) and [`apply_registry_effects`] (reorg rewind), since neither
/// path touches the unspent set for this credit -- it is registry-only.
fn credit_qpos_reward(registry: &mut StakerRegistry, staker_id: u32, prev_money_supply: i64) -> Result<()> {
    let reward = Amount::from_atoms(registry::price::qpos_reward(prev_money_supply));
    let staker = registry
        .stakers
        .get(&staker_id)
        .cloned()
        .ok_or(Error::Registry(registry::Error::StakerNotFound(staker_id)))?;
    let delegate_share = reward.to_atoms().saturating_mul(staker.delegate_payout_pcm as i64) / 100_000;
    let owner_share = reward.to_atoms() - delegate_share;
    if delegate_share > 0 {
        credit_ledger(registry, &staker.delegate_key, Amount::from_atoms(delegate_share));
    }
    if owner_share > 0 {
        credit_ledger(registry, &staker.owner_key, Amount::from_atoms(owner_share));
    }
    Ok(())
}

/// The subset of [`connect_block`]'s work that touches only the registry:
/// replaying a previously-connected block's deets and qPoS reward credit
/// while rewinding the registry to a fork point during a reorganization.
/// The unspent set itself is handled separately there by disconnecting and
/// reconnecting blocks directly against `utxo`, so this never calls it.
pub fn apply_registry_effects(
    block: &Block,
    registry: &mut StakerRegistry,
    network: Network,
    height: i32,
    prev_money_supply: i64,
) -> Result<()> {
    for (tx_idx, tx) in block.transactions.iter().enumerate() {
        if tx.is_coinbase() {
            continue;
        }
        let deets = deets_for(block, tx_idx);
        if deets.is_empty() {
            continue;
        }
        let signatory = (tx.inputs.len() == 1).then(|| derive_signatory(&tx.inputs[0].script_sig)).flatten();
        let tx_deets = TxDeets { deets: &deets, signatory: signatory.as_ref(), input_count: tx.inputs.len() };
        apply_tx_deets(registry, network, height, prev_money_supply, &tx_deets).map_err(Error::Registry)?;
    }

    if block.header.is_qpos() {
        let staker_id = block.header.staker_id.expect("qPoS header carries a staker id");
        credit_qpos_reward(registry, staker_id, prev_money_supply)?;
    }

    Ok(())
}
