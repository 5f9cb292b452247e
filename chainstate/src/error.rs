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

use common::chain::{BlockError, TxError};
use common::primitives::Hash256;

pub type DosScore = u32;

#[derive(thiserror::Error, Debug, PartialEq, Eq, Clone)]
pub enum Error {
    #[error("block exceeds the maximum size")]
    TooLarge,
    #[error("block carries no transactions")]
    Empty,
    #[error("qPoS block must not contain a coinbase transaction")]
    QPosCoinbasePresent,
    #[error("qPoS block must not contain a coinstake transaction")]
    QPosCoinstakePresent,
    #[error("qPoS block is missing its height or staker id")]
    QPosMissingHeader,
    #[error("pre-qPoS block's first transaction must be a coinbase")]
    MissingCoinbase,
    #[error("pre-qPoS proof-of-stake block's second transaction must be a coinstake")]
    MissingCoinstake,
    #[error("proof-of-work blocks are no longer accepted at this height")]
    PowNotAllowed,
    #[error("proof-of-stake blocks are no longer accepted at this height")]
    PosNotAllowed,
    #[error("block carries a bad signature")]
    BadBlockSignature,
    #[error("block's merkle root does not match its transactions")]
    BadMerkleRoot,
    #[error("block contains the same transaction {0:?} twice")]
    DuplicateTransaction(Hash256),
    #[error("block's legacy sigop count {actual} exceeds the maximum allowed {allowed}")]
    TooManySigops { actual: usize, allowed: usize },
    #[error("block's vDeets are malformed: {0}")]
    BadDeetsOrder(#[from] BlockError),
    #[error("two transactions in this block register the same alias {0:?}")]
    DuplicateAliasInBlock(String),
    #[error("two transactions in this block rotate a key on staker {0}")]
    DuplicateSetKeyInBlock(u32),
    #[error("block's claims against a pubkey exceed its registry ledger balance")]
    ClaimExceedsLedgerInBlock,
    #[error("block timestamp {time} exceeds the allowed drift past {limit}")]
    TimestampTooFarInFuture { time: u32, limit: u32 },
    #[error("block timestamp {time} does not advance past the required floor {floor}")]
    TimestampNotAdvancing { time: u32, floor: u32 },
    #[error("pre-qPoS coinbase scriptSig does not begin with its own height")]
    BadCoinbaseHeight,
    #[error("block predates a hardened checkpoint for its height")]
    CheckpointMismatch,
    #[error("transaction is structurally invalid: {0}")]
    Transaction(#[from] TxError),
    #[error("transaction's registry deets were rejected: {0}")]
    Registry(#[from] registry::Error),
    #[error("transaction's inputs were rejected: {0}")]
    Utxo(#[from] utxo::Error),
    #[error("block connects to an unknown previous block {0:?}")]
    Orphan(Hash256),
    #[error("block does not extend any chain known to this node")]
    UnconnectedBlock,
    #[error("reorganization would replace the best chain with an inferior one")]
    InvalidChainFound,
    #[error("storage failure: {0}")]
    Storage(#[from] storage::Error),
    #[error("registry snapshot is corrupt: {0}")]
    InvariantViolation(&'static str),
    #[error("coinbase/coinstake reward {actual} exceeds the maximum allowed {allowed}")]
    BadReward { actual: i64, allowed: i64 },
    #[error("transaction's feework was rejected: {0}")]
    Feework(feework::FeeworkStatus),
    #[error("money-supply accounting invariant violated while connecting a block: {0}")]
    BadAccounting(&'static str),
    #[error("block does not extend the chain it claims to (prev hash mismatch)")]
    PrevBlockMismatch,
    #[error("block height {claimed} does not match its parent's height plus one ({expected})")]
    BadHeight { claimed: i32, expected: i32 },
    #[error("block's bits {actual:#x} do not match the retarget's required {expected:#x}")]
    BadBits { actual: u32, expected: u32 },
}

impl Error {
    /// Ban-weight for the peer that relayed a block rejected for this
    /// reason (spec §7's error classes). Orphan/unconnected blocks carry
    /// none: an honest peer can relay a block before its parent arrives.
    /// Storage failures are a local resource problem, not evidence of
    /// misbehavior.
    pub fn dos_score(&self) -> DosScore {
        match self {
            Error::Orphan(_) | Error::UnconnectedBlock | Error::Storage(_) => 0,
            Error::TimestampTooFarInFuture { .. } | Error::TimestampNotAdvancing { .. } => 10,
            Error::Registry(e) => e.dos_score(),
            Error::Utxo(e) => e.dos_score(),
            Error::InvalidChainFound => 0,
            Error::InvariantViolation(_) => 100,
            Error::TooLarge
            | Error::Empty
            | Error::QPosCoinbasePresent
            | Error::QPosCoinstakePresent
            | Error::QPosMissingHeader
            | Error::MissingCoinbase
            | Error::MissingCoinstake
            | Error::PowNotAllowed
            | Error::PosNotAllowed
            | Error::BadBlockSignature
            | Error::BadMerkleRoot
            | Error::DuplicateTransaction(_)
            | Error::TooManySigops { .. }
            | Error::BadDeetsOrder(_)
            | Error::DuplicateAliasInBlock(_)
            | Error::DuplicateSetKeyInBlock(_)
            | Error::ClaimExceedsLedgerInBlock
            | Error::BadCoinbaseHeight
            | Error::CheckpointMismatch
            | Error::Transaction(_)
            | Error::BadReward { .. }
            | Error::BadAccounting(_)
            | Error::PrevBlockMismatch
            | Error::BadHeight { .. }
            | Error::BadBits { .. } => 100,
            Error::Feework(_) => 50,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
