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

use common::chain::Transaction;
use common::primitives::{Amount, Hash256};
use feework::Feework;
use serialization::Encode;

/// One accepted transaction, together with everything computed about it at
/// admission time so it never needs recomputing while it sits in the pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MempoolEntry {
    pub tx: Transaction,
    pub txid: Hash256,
    /// Money fee actually paid, net of any purchase price the transaction's
    /// outputs don't carry visibly (a registry purchase leaves the coin
    /// in the registry rather than in a change output).
    pub fee: Amount,
    pub size: usize,
    /// Height the transaction was accepted at; `removeOldFeeless` compares
    /// a feework's own payload height against the *current* tip, not this
    /// one, but callers sorting or evicting by pool age use it.
    pub height: i32,
    /// `Some` once the transaction carried a checked, valid feework.
    pub feework: Option<Feework>,
}

impl MempoolEntry {
    pub fn new(tx: Transaction, txid: Hash256, fee: Amount, height: i32, feework: Option<Feework>) -> Self {
        let size = tx.encode().len();
        MempoolEntry { tx, txid, fee, size, height, feework }
    }
}
