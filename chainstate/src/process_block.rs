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

//! `ProcessBlock` (spec §4.6/§5): the single entry point a node calls with
//! a block it has received, whether freshly mined, staked locally, or
//! relayed by a peer. Runs every context-free and context-dependent check
//! in order, buffers the block as an orphan if its parent is unknown, and
//! hands off to [`crate::chain_selector`] when the block's arrival makes a
//! different chain the best one.
//!
//! Holds the three locks the rest of the workspace assumes a strict order
//! for: `main` (block tree, block/undo stores, orphan pool), then
//! `mempool`, then `registry`. [`ChainState::submit_block`] acquires all
//! three up front and keeps them for the whole call, so nothing here can
//! deadlock against another caller going through the same entry point.

use crate::block_index::{BlockTree, Handle};
use crate::block_store;
use crate::chain_selector::{self, ReorgContext};
use crate::check_block::check_block;
use crate::accept_block::{accept_block, AcceptContext};
use crate::error::{Error, Result};
use crate::orphans::OrphanPool;
use crate::signature::check_block_signature;
use crate::trust;
use common::chain::{Block, ChainParams, Network};
use common::primitives::Hash256;
use crypto::{Argon2Buffer, Argon2d, Verifier};
use mempool::Mempool;
use parking_lot::Mutex;
use registry::StakerRegistry;
use storage::{KvRead, KvWrite, Transactional};

/// Number of ancestor timestamps `GetMedianTimePast` averages over.
const MEDIAN_TIME_SPAN: i32 = 11;

/// Everything guarded by the `main` lock: the arena of known headers, the
/// bodies and undo logs archived for them, and blocks still waiting on a
/// missing parent.
struct MainState<S> {
    store: S,
    tree: BlockTree,
    orphans: OrphanPool,
}

/// A node's consensus state: the three lock domains plus the
/// configuration and pluggable crypto every block is checked against.
pub struct ChainState<S> {
    params: ChainParams,
    network: Network,
    testnet: bool,
    verifier: Box<dyn Verifier>,
    argon2: Box<dyn Argon2d>,
    main: Mutex<MainState<S>>,
    mempool: Mutex<Mempool>,
    registry: Mutex<StakerRegistry>,
}

impl<S: KvWrite + Transactional> ChainState<S> {
    /// Builds a fresh chain state seeded with `params`'s genesis block.
    /// Genesis bypasses the usual `check_block`/`accept_block` pipeline --
    /// it has no coinbase, no signature, and no parent to compare a
    /// timestamp against -- and is inserted directly as the tree's root
    /// and best chain.
    pub fn new(
        mut store: S,
        params: ChainParams,
        network: Network,
        testnet: bool,
        verifier: Box<dyn Verifier>,
        argon2: Box<dyn Argon2d>,
    ) -> Result<Self> {
        let header = common::chain::BlockHeader {
            version: 1,
            prev_hash: Hash256::ZERO,
            merkle_root: params.genesis.merkle_root,
            time: params.genesis.time,
            bits: params.genesis.bits,
            nonce: params.genesis.nonce as u32,
            height: None,
            staker_id: None,
        };
        let genesis_block = Block { header: header.clone(), transactions: vec![], deets: vec![], signature: vec![] };
        let mut tree = BlockTree::new();
        let trust_delta = trust::block_trust(header.bits, false, false, None);
        let handle = tree.insert(header, None, trust_delta, 0);
        tree.set_best(handle);
        block_store::put_block(&mut store, &genesis_block)?;

        Ok(Self {
            params,
            network,
            testnet,
            verifier,
            argon2,
            main: Mutex::new(MainState { store, tree, orphans: OrphanPool::new() }),
            mempool: Mutex::new(Mempool::new()),
            registry: Mutex::new(StakerRegistry::new()),
        })
    }

    /// The current best chain's height, or `0` if only genesis is known.
    pub fn height(&self) -> i32 {
        self.main.lock().tree.height().max(0)
    }

    pub fn best_hash(&self) -> Option<Hash256> {
        self.main.lock().tree.best_hash()
    }

    /// Submits `block` for validation and, if it extends (or becomes) the
    /// best chain, connection. `adjusted_time` is the caller's current
    /// network-adjusted clock reading (spec §5's "GetAdjustedTime"); this
    /// module never reads a clock itself so that callers can supply a
    /// deterministic one in tests.
    ///
    /// Returns [`Error::Orphan`] if `block`'s parent is not yet known --
    /// the block is buffered and will be retried automatically once that
    /// parent is accepted.
    pub fn submit_block(&self, block: Block, adjusted_time: i64, buffer: &mut Argon2Buffer) -> Result<()> {
        let mut main = self.main.lock();
        let mut mempool = self.mempool.lock();
        let mut registry = self.registry.lock();
        self.accept_recursive(&mut *main, &mut *mempool, &mut *registry, block, adjusted_time, buffer)
    }

    /// Tries `block`, then replays any buffered orphans that were waiting
    /// on it. A child that fails is simply dropped; a child that is itself
    /// missing a (different) parent is re-buffered by
    /// [`accept_single`](Self::accept_single)'s orphan path.
    fn accept_recursive(
        &self,
        main: &mut MainState<S>,
        mempool: &mut Mempool,
        registry: &mut StakerRegistry,
        block: Block,
        adjusted_time: i64,
        buffer: &mut Argon2Buffer,
    ) -> Result<()> {
        let hash = block.header.hash();
        if main.tree.contains(&hash) {
            return Ok(());
        }

        let prev_hash = block.header.prev_hash;
        let prev_handle = if main.tree.best().is_none() {
            None
        } else {
            match main.tree.by_hash(&prev_hash) {
                Some(handle) => Some(handle),
                None => {
                    tracing::debug!(?hash, ?prev_hash, "buffering block as orphan");
                    main.orphans.insert(hash, block);
                    return Err(Error::Orphan(prev_hash));
                }
            }
        };

        self.accept_single(main, mempool, registry, &block, prev_handle, adjusted_time, buffer)?;

        for child in main.orphans.take_children_of(&hash) {
            let _ = self.accept_recursive(main, mempool, registry, child, adjusted_time, buffer);
        }
        Ok(())
    }

    /// Runs `CheckBlock`/`AcceptBlock`/`CheckBlockSignature` against
    /// `block`, inserts its header into the tree, and reorganizes onto it
    /// if it outweighs the current tip. A block that loses a fork is left
    /// in the tree (`Valid`, not `Active`) without ever being connected --
    /// it may still win a later reorganization if its branch is extended.
    fn accept_single(
        &self,
        main: &mut MainState<S>,
        mempool: &mut Mempool,
        registry: &mut StakerRegistry,
        block: &Block,
        prev_handle: Option<Handle>,
        adjusted_time: i64,
        buffer: &mut Argon2Buffer,
    ) -> Result<()> {
        let height = prev_handle.map(|h| main.tree.get(h).height + 1).unwrap_or(0);
        let fork = self.params.get_fork(height);

        check_block(block, fork, &self.params, registry)?;

        let prev_time = prev_handle.map(|h| main.tree.get(h).header.time).unwrap_or(0);
        let past_time_limit = prev_handle.map(|h| median_time_past(&main.tree, h)).unwrap_or(0);
        let accept_ctx =
            AcceptContext { height, fork, prev_time, past_time_limit, adjusted_time, params: &self.params };
        accept_block(block, &accept_ctx, registry)?;

        check_block_signature(block, registry, &*self.verifier)?;

        if !block.header.is_qpos() {
            let prev_bits = prev_handle.map(|h| main.tree.get(h).header.bits).unwrap_or(block.header.bits);
            let actual_spacing = prev_handle
                .map(|h| (block.header.time as i64) - (main.tree.get(h).header.time as i64))
                .unwrap_or(self.params.target_spacing);
            let expected_bits = trust::compute_next_bits(prev_bits, actual_spacing, &self.params);
            if block.header.bits != expected_bits {
                return Err(Error::BadBits { actual: block.header.bits, expected: expected_bits });
            }
        }

        let is_proof_of_stake = block.has_coinstake();
        let staker_weight = block.header.staker_id.and_then(|id| registry.stakers.get(&id)).map(|s| s.weight);
        let trust_delta = trust::block_trust(block.header.bits, block.header.is_qpos(), is_proof_of_stake, staker_weight);

        let prev_money_supply = prev_handle.map(|h| main.tree.get(h).money_supply).unwrap_or(0);
        let handle = main.tree.insert(block.header.clone(), prev_handle, trust_delta, prev_money_supply);
        block_store::put_block(&mut main.store, block)?;

        let is_new_best = match main.tree.best() {
            Some(best) => main.tree.get(handle).trust > main.tree.get(best).trust,
            None => true,
        };

        if is_new_best {
            let trust = main.tree.get(handle).trust;
            tracing::debug!(height, trust = %trust, "new best chain candidate, reorganizing");
            let ctx = ReorgContext {
                params: &self.params,
                network: self.network,
                testnet: self.testnet,
                verifier: &*self.verifier,
                argon2: &*self.argon2,
            };
            chain_selector::reorganize(&mut main.store, &mut main.tree, mempool, registry, handle, &ctx, buffer)?;
        }

        Ok(())
    }
}

impl<S: KvRead> ChainState<S> {
    /// Looks up a previously connected block's body by hash.
    pub fn get_block(&self, hash: &Hash256) -> Result<Option<Block>> {
        let main = self.main.lock();
        let Some(handle) = main.tree.by_hash(hash) else { return Ok(None) };
        let fork = self.params.get_fork(main.tree.get(handle).height);
        block_store::get_block(&main.store, hash, fork)
    }
}

/// `GetMedianTimePast`: the median timestamp of the last
/// [`MEDIAN_TIME_SPAN`] blocks ending at (and including) `from`.
fn median_time_past(tree: &BlockTree, from: Handle) -> u32 {
    let mut times = Vec::with_capacity(MEDIAN_TIME_SPAN as usize);
    let mut cursor = Some(from);
    for _ in 0..MEDIAN_TIME_SPAN {
        let Some(handle) = cursor else { break };
        times.push(tree.get(handle).header.time);
        cursor = tree.get(handle).prev;
    }
    times.sort_unstable();
    times[times.len() / 2]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crypto::{Argon2Buffer, Argon2d, PubKey, Signature, Verifier};
    use storage::MemoryStore;

    struct AcceptAllVerifier;
    impl Verifier for AcceptAllVerifier {
        fn verify(&self, _pubkey: &PubKey, _message_hash: &Hash256, _signature: &Signature) -> bool {
            true
        }
    }

    struct ZeroArgon2d;
    impl Argon2d for ZeroArgon2d {
        fn hash_raw(
            &self,
            _t_cost: u32,
            _m_cost: u32,
            _parallelism: u32,
            _data: &[u8],
            _work: &[u8],
            tag_len: usize,
            _buffer: &mut Argon2Buffer,
        ) -> Vec<u8> {
            vec![0u8; tag_len]
        }
    }

    fn new_state() -> ChainState<MemoryStore> {
        ChainState::new(
            MemoryStore::new(),
            ChainParams::mainnet(),
            Network::Mainnet,
            false,
            Box::new(AcceptAllVerifier),
            Box::new(ZeroArgon2d),
        )
        .unwrap()
    }

    #[test]
    fn fresh_state_starts_at_genesis() {
        let state = new_state();
        assert_eq!(state.height(), 0);
        assert!(state.best_hash().is_some());
    }

    #[test]
    fn resubmitting_genesis_is_a_no_op() {
        let state = new_state();
        let hash = state.best_hash().unwrap();
        let genesis = state.get_block(&hash).unwrap().unwrap();
        let mut buffer = Argon2Buffer::with_capacity(1);
        assert!(state.submit_block(genesis, 0, &mut buffer).is_ok());
        assert_eq!(state.height(), 0);
    }

    #[test]
    fn block_with_unknown_parent_is_buffered_as_an_orphan() {
        let state = new_state();
        let header = common::chain::BlockHeader {
            version: 1,
            prev_hash: Hash256::from_bytes([9u8; 32]),
            merkle_root: Hash256::ZERO,
            time: 1,
            bits: 0x1d00ffff,
            nonce: 0,
            height: None,
            staker_id: None,
        };
        let orphan = Block { header, transactions: vec![], deets: vec![], signature: vec![] };
        let mut buffer = Argon2Buffer::with_capacity(1);
        let err = state.submit_block(orphan, 0, &mut buffer).unwrap_err();
        assert!(matches!(err, Error::Orphan(_)));
        assert_eq!(state.main.lock().orphans.len(), 1);
    }
}
