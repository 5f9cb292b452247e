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

//! The block validator and chain selector: `CheckBlock`/`AcceptBlock`,
//! chain trust and retargeting, reorganization, and orphan handling (spec
//! §4.6). [`ChainState`] is the crate's single entry point; everything
//! else here is a piece of the pipeline it drives.

mod accept_block;
mod block_index;
mod block_store;
mod chain_selector;
mod check_block;
mod connect_block;
mod deets;
mod error;
mod orphans;
mod process_block;
mod reward;
mod signature;
mod tip;
mod trust;
mod undo_store;

pub use accept_block::{accept_block, AcceptContext};
pub use block_index::{BlockIndex, BlockStatus, BlockTree, Handle};
pub use block_store::{get_block, put_block};
pub use chain_selector::{reorganize, ReorgContext};
pub use check_block::check_block;
pub use connect_block::{apply_registry_effects, connect_block, ConnectContext};
pub use deets::build_vdeets;
pub use error::{DosScore, Error, Result};
pub use orphans::OrphanPool;
pub use process_block::ChainState;
pub use reward::{
    block_coin_age, proof_of_stake_reward, proof_of_work_reward, proof_of_work_subsidy,
    stake_min_age, transaction_coin_age,
};
pub use signature::check_block_signature;
pub use tip::TreeTip;
pub use trust::{bits_to_target, block_trust, compute_next_bits, target_to_bits, POW_LIMIT_BITS};
pub use undo_store::{get_undo, put_undo};
