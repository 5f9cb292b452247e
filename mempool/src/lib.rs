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

//! The unconfirmed-transaction pool sitting in front of the UTXO ledger and
//! staker registry: admission (standardness, conflict/duplicate-claim/
//! duplicate-alias checks, fee or feework), eviction, and the periodic
//! sweeps a newly connected block triggers.

mod entry;
mod error;
mod pool;
mod signatory;

pub use entry::MempoolEntry;
pub use error::{DosScore, Error, Result};
pub use pool::Mempool;
pub use signatory::derive_signatory;

/// Where a transaction ended up after being offered to the node. The pool
/// itself only ever produces `InMempool` (or an [`Error`]); `InOrphanPool`
/// is assigned by the caller that catches [`Error::MissingInput`] and
/// parks the transaction until its missing parent arrives.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[must_use = "check whether the tx was accepted to the mempool or the orphan pool"]
pub enum TxStatus {
    InMempool,
    InOrphanPool,
}

impl TxStatus {
    pub fn in_mempool(&self) -> bool {
        *self == TxStatus::InMempool
    }

    pub fn in_orphan_pool(&self) -> bool {
        *self == TxStatus::InOrphanPool
    }
}
