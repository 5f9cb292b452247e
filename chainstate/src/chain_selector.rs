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

//! `Reorganize`/`SetBestChain` (spec §4.6): switching the active chain from
//! one tip to another. Disconnects the current tip back to the fork point,
//! rewinds the registry to that point from its nearest snapshot, then
//! reconnects the candidate branch block by block. Any failure partway
//! through reconnection leaves the candidate branch marked invalid and the
//! original tip untouched -- this never leaves `store` without a best chain.

use crate::block_index::{BlockTree, Handle};
use crate::block_store;
use crate::connect_block::{apply_registry_effects, connect_block, ConnectContext};
use crate::error::{Error, Result};
use crate::tip::TreeTip;
use crate::undo_store;
use common::chain::{Block, ChainParams, Network, Transaction};
use crypto::{Argon2Buffer, Argon2d, Verifier};
use mempool::Mempool;
use registry::StakerRegistry;
use storage::{KvRead, KvTransaction, KvWrite, Transactional};
use utxo::{disconnect_inputs, remove_outputs};

/// Resources a reorganization needs beyond the block tree and the stores.
pub struct ReorgContext<'a> {
    pub params: &'a ChainParams,
    pub network: Network,
    pub testnet: bool,
    pub verifier: &'a dyn Verifier,
    pub argon2: &'a dyn Argon2d,
}

/// Disconnects `tree`'s current best chain down to its fork with
/// `candidate`, rewinds the registry to that point, then reconnects
/// `candidate`'s branch. The whole attempt runs against one
/// [`storage::KvTransaction`]: every disconnect and reconnect is staged
/// there, `tree`/`registry` are mutated only through working copies, and
/// nothing is applied to the real `store`/`tree`/`registry`/`mempool` until
/// the candidate branch has connected in full and the transaction commits.
/// On failure `store`, `tree`, and `registry` are left exactly as they
/// were, `candidate`'s subtree is left `Valid` but not `Active`, and an
/// error describing the first reconnection failure is returned.
pub fn reorganize<S>(
    store: &mut S,
    tree: &mut BlockTree,
    mempool: &mut Mempool,
    registry: &mut StakerRegistry,
    candidate: Handle,
    ctx: &ReorgContext<'_>,
    buffer: &mut Argon2Buffer,
) -> Result<()>
where
    S: KvWrite + Transactional,
{
    let Some(current_tip) = tree.best() else {
        let mut txn = store.transaction();
        let mut work_tree = tree.clone();
        let mut work_registry = registry.clone();
        let confirmed =
            connect_branch(&mut txn, &mut work_tree, &mut work_registry, candidate, &[candidate], ctx, buffer)?;
        txn.commit()?;
        *tree = work_tree;
        *registry = work_registry;
        apply_confirmations(mempool, &confirmed);
        return Ok(());
    };
    if current_tip == candidate {
        return Ok(());
    }

    let fork = tree.find_fork(current_tip, candidate);
    let disconnect = {
        let mut path = tree.path_from_ancestor(current_tip, fork);
        path.reverse();
        path
    };
    let connect = tree.path_from_ancestor(candidate, fork);

    let mut txn = store.transaction();
    let mut resurrect: Vec<Transaction> = Vec::new();
    for &handle in &disconnect {
        let hash = tree.get(handle).hash();
        let fork_version = ctx.params.get_fork(tree.get(handle).height);
        let block = block_store::get_block(&txn, &hash, fork_version)?
            .ok_or(Error::InvariantViolation("disconnected block body missing from storage"))?;
        let undos = undo_store::get_undo(&txn, &hash)?;
        disconnect_block(&mut txn, &block, &undos)?;
        for tx in block.transactions.iter() {
            if !tx.is_coinbase() && !tx.is_coinstake() {
                resurrect.push(tx.clone());
            }
        }
    }

    let mut work_registry = rewind_registry(&txn, tree, fork, ctx.network, ctx.params)?;
    let mut work_tree = tree.clone();

    let confirmed =
        connect_branch(&mut txn, &mut work_tree, &mut work_registry, candidate, &connect, ctx, buffer)?;

    txn.commit()?;
    *tree = work_tree;
    *registry = work_registry;
    apply_confirmations(mempool, &confirmed);

    for tx in resurrect {
        let tip = TreeTip { tree: &*tree, at: candidate, params: ctx.params };
        let money_supply = tree.get(candidate).money_supply;
        let _ = mempool.accept(
            tx,
            &*store,
            &*registry,
            &tip,
            ctx.params,
            ctx.network,
            money_supply,
            tree.get(candidate).header.time as i64,
            ctx.testnet,
            ctx.argon2,
            buffer,
            ctx.verifier,
        );
    }

    Ok(())
}

/// Drops every block-confirmed transaction (and anything it conflicts
/// with) out of the mempool, mirroring what each connected block already
/// did to the real unspent set.
fn apply_confirmations(mempool: &mut Mempool, confirmed: &[Transaction]) {
    for tx in confirmed {
        mempool.remove_conflicts(tx);
        mempool.remove(&tx.txid(), false);
    }
}

/// Removes a disconnected block's effect on the unspent set: each
/// transaction's own outputs are dropped, then the inputs it spent are
/// restored from its undo record, mirroring `DisconnectBlock`'s reverse walk
/// over `vtx`.
fn disconnect_block<S: KvWrite>(store: &mut S, block: &Block, undos: &[utxo::ConnectUndo]) -> Result<()> {
    for (tx, undo) in block.transactions.iter().zip(undos.iter()).rev() {
        remove_outputs(store, tx)?;
        if !tx.is_coinbase() {
            disconnect_inputs(store, undo)?;
        }
    }
    Ok(())
}

/// Replays a block's registry-only effects onto a snapshot until it reaches
/// `fork`, so reconnecting the candidate branch starts from an accurate
/// registry state without replaying the whole chain from genesis.
fn rewind_registry<S: KvRead>(
    store: &S,
    tree: &BlockTree,
    fork: Handle,
    network: Network,
    params: &ChainParams,
) -> Result<StakerRegistry> {
    let fork_height = tree.get(fork).height;
    let mut registry = registry::get_snapshot(store, fork_height)?;
    let mut height = registry.last_block_height + 1;
    while height <= fork_height {
        let handle = tree
            .ancestor_at_height(fork, height)
            .ok_or(Error::InvariantViolation("fork ancestor missing at replay height"))?;
        let hash = tree.get(handle).hash();
        let block = block_store::get_block(store, &hash, params.get_fork(height))?
            .ok_or(Error::InvariantViolation("registry replay block body missing from storage"))?;
        let prev_money_supply = tree.get(handle).prev.map(|p| tree.get(p).money_supply).unwrap_or(0);
        apply_registry_effects(&block, &mut registry, network, height, prev_money_supply)?;
        registry.last_block_height = height;
        registry.last_block_hash = hash;
        height += 1;
    }
    Ok(registry)
}

/// Connects `path` (root-to-tip order) one block at a time against `store`
/// (a working transaction, not the live store) and `tree`/`registry`
/// (working copies), stopping at the first failure. Returns every
/// transaction from every successfully connected block, in connection
/// order, so the caller can drop them from the mempool once it decides to
/// keep this result; `connect_branch` itself never touches the mempool and
/// never rolls back what it has staged on `store`/`tree`/`registry` so
/// far -- the caller discards the whole attempt on error instead.
fn connect_branch<S: KvWrite>(
    store: &mut S,
    tree: &mut BlockTree,
    registry: &mut StakerRegistry,
    candidate: Handle,
    path: &[Handle],
    ctx: &ReorgContext<'_>,
    buffer: &mut Argon2Buffer,
) -> Result<Vec<Transaction>> {
    let mut confirmed = Vec::new();
    for &handle in path {
        let index = tree.get(handle).clone();
        let hash = index.hash();
        let fork = ctx.params.get_fork(index.height);
        let block = block_store::get_block(&*store, &hash, fork)?
            .ok_or(Error::InvariantViolation("candidate block body missing from storage"))?;
        let prev_money_supply = index.prev.map(|p| tree.get(p).money_supply).unwrap_or(0);

        let tip = TreeTip { tree: &*tree, at: index.prev.unwrap_or(handle), params: ctx.params };
        let connect_ctx = ConnectContext {
            params: ctx.params,
            network: ctx.network,
            fork,
            height: index.height,
            testnet: ctx.testnet,
            prev_money_supply,
            tip: &tip,
            verifier: ctx.verifier,
            argon2: ctx.argon2,
        };
        let (money_supply, undos) = connect_block(store, &block, registry, &connect_ctx, buffer)?;
        undo_store::put_undo(store, &hash, &undos)?;

        confirmed.extend(block.transactions.iter().cloned());

        tree.set_money_supply(handle, money_supply);
        tree.set_best(handle);
    }
    registry.last_block_hash = tree.get(candidate).hash();
    registry.last_block_height = tree.get(candidate).height;
    Ok(confirmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::primitives::{Amount, Hash256};
    use storage::MemoryStore;
    use test_utils::{BlockBuilder, FakeArgon2d, FakeVerifier, TxBuilder};

    fn coinbase_block(prev_hash: Hash256, height: i32) -> Block {
        let coinbase =
            TxBuilder::new().clear_outputs().coinbase(height).output(Amount::from_atoms(0), vec![]).build();
        BlockBuilder::new().prev_hash(prev_hash).time(height as u32 + 1).transaction(coinbase).build()
    }

    /// A PoW block whose coinbase pays far more than any height's subsidy
    /// schedule allows, so [`connect_block`] rejects it with `BadReward`.
    fn overpaid_coinbase_block(prev_hash: Hash256, height: i32) -> Block {
        let coinbase = TxBuilder::new()
            .clear_outputs()
            .coinbase(height)
            .output(Amount::from_atoms(1_000_000 * common::primitives::COIN.to_atoms()), vec![])
            .build();
        BlockBuilder::new().prev_hash(prev_hash).time(height as u32 + 1).transaction(coinbase).build()
    }

    struct Fixture {
        store: MemoryStore,
        tree: BlockTree,
        mempool: Mempool,
        registry: StakerRegistry,
        params: ChainParams,
    }

    impl Fixture {
        fn new() -> (Self, Handle) {
            let mut store = MemoryStore::new();
            let mut tree = BlockTree::new();
            let genesis_block = coinbase_block(Hash256::ZERO, 0);
            let genesis = tree.insert(genesis_block.header.clone(), None, 1, 0);
            tree.set_best(genesis);
            block_store::put_block(&mut store, &genesis_block).unwrap();
            (
                Self { store, tree, mempool: Mempool::new(), registry: StakerRegistry::new(), params: ChainParams::mainnet() },
                genesis,
            )
        }

        fn extend(&mut self, parent: Handle, parent_hash: Hash256) -> Handle {
            let height = self.tree.get(parent).height + 1;
            let block = coinbase_block(parent_hash, height);
            let handle = self.tree.insert(block.header.clone(), Some(parent), 1, 0);
            block_store::put_block(&mut self.store, &block).unwrap();
            handle
        }

        fn ctx(&self) -> ReorgContext<'_> {
            ReorgContext {
                params: &self.params,
                network: Network::Mainnet,
                testnet: false,
                verifier: &FakeVerifier,
                argon2: &FakeArgon2d,
            }
        }
    }

    #[test]
    fn reorganize_switches_the_best_chain_to_a_longer_candidate() {
        let (mut fx, genesis) = Fixture::new();
        let genesis_hash = fx.tree.get(genesis).hash();

        let a1 = fx.extend(genesis, genesis_hash);
        fx.tree.set_best(a1);
        assert_eq!(fx.tree.best(), Some(a1));

        let b1 = fx.extend(genesis, genesis_hash);
        let b1_hash = fx.tree.get(b1).hash();
        let b2 = fx.extend(b1, b1_hash);

        let mut buffer = Argon2Buffer::with_capacity(1);
        let ctx = fx.ctx();
        reorganize(&mut fx.store, &mut fx.tree, &mut fx.mempool, &mut fx.registry, b2, &ctx, &mut buffer).unwrap();

        assert_eq!(fx.tree.best(), Some(b2));
        assert_eq!(fx.tree.height(), 2);
        assert_eq!(fx.registry.last_block_height, 2);
        assert_eq!(fx.registry.last_block_hash, fx.tree.get(b2).hash());
    }

    #[test]
    fn reorganize_leaves_tree_and_registry_untouched_when_a_candidate_block_fails() {
        let (mut fx, genesis) = Fixture::new();
        let genesis_hash = fx.tree.get(genesis).hash();

        let a1 = fx.extend(genesis, genesis_hash);
        fx.tree.set_best(a1);

        let b1 = fx.extend(genesis, genesis_hash);
        let b1_hash = fx.tree.get(b1).hash();
        let bad_block = overpaid_coinbase_block(b1_hash, fx.tree.get(b1).height + 1);
        let b2 = fx.tree.insert(bad_block.header.clone(), Some(b1), 1, 0);
        block_store::put_block(&mut fx.store, &bad_block).unwrap();

        let registry_before = fx.registry.clone();
        let mut buffer = Argon2Buffer::with_capacity(1);
        let ctx = fx.ctx();
        let result = reorganize(&mut fx.store, &mut fx.tree, &mut fx.mempool, &mut fx.registry, b2, &ctx, &mut buffer);

        assert!(matches!(result, Err(Error::BadReward { .. })));
        assert_eq!(fx.tree.best(), Some(a1));
        assert_eq!(fx.registry, registry_before);
        assert_ne!(fx.tree.get(b2).status, crate::block_index::BlockStatus::Active);
    }

    #[test]
    fn reorganize_onto_the_current_tip_is_a_no_op() {
        let (mut fx, genesis) = Fixture::new();
        let genesis_hash = fx.tree.get(genesis).hash();
        let a1 = fx.extend(genesis, genesis_hash);
        fx.tree.set_best(a1);

        let mut buffer = Argon2Buffer::with_capacity(1);
        let ctx = fx.ctx();
        reorganize(&mut fx.store, &mut fx.tree, &mut fx.mempool, &mut fx.registry, a1, &ctx, &mut buffer).unwrap();

        assert_eq!(fx.tree.best(), Some(a1));
    }
}
