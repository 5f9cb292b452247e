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

use common::chain::{OutPoint, TxError};
use feework::FeeworkStatus;
use script::StandardError;

pub type DosScore = u32;

#[derive(thiserror::Error, Debug, PartialEq, Eq, Clone)]
pub enum Error {
    #[error("transaction structure is invalid: {0}")]
    Structure(#[from] TxError),
    #[error("a standalone coinbase transaction cannot enter the pool")]
    Coinbase,
    #[error("a standalone coinstake transaction cannot enter the pool")]
    Coinstake,
    #[error("transaction fails standardness: {0}")]
    NonStandard(#[from] StandardError),
    #[error("transaction is already in the pool")]
    AlreadyInPool,
    #[error("input {0:?} already spent by another pooled transaction")]
    Conflict(OutPoint),
    #[error("input {0:?} spends an output that does not exist")]
    MissingInput(OutPoint),
    #[error("registry rejects this transaction's deets: {0}")]
    Registry(#[from] registry::Error),
    #[error("utxo ledger rejects this transaction's inputs: {0}")]
    Utxo(#[from] utxo::Error),
    #[error("a transaction carrying registry deets cannot also carry feework")]
    DeetsWithFeework,
    #[error("claim pubkey {0:?} already claimed by another pooled transaction")]
    DuplicateClaim(Vec<u8>),
    #[error("alias {0:?} already registered by another pooled transaction")]
    DuplicateAlias(String),
    #[error("fee {fee} below the required minimum {required} and feework did not cover the gap")]
    InsufficientFee { fee: i64, required: i64 },
    #[error("feework check failed with status {0}")]
    FeeworkRejected(FeeworkStatus),
}

impl Error {
    /// Ban-weight for the peer that relayed a transaction rejected for this
    /// reason. Conflicts, missing inputs, and duplicate-in-pool rejections
    /// carry none: an honest peer can easily relay a transaction whose
    /// unconfirmed parent or sibling we simply haven't seen yet, or that lost
    /// a race with another one we already hold.
    pub fn dos_score(&self) -> DosScore {
        match self {
            Error::AlreadyInPool | Error::Conflict(_) | Error::MissingInput(_) => 0,
            Error::Registry(e) => e.dos_score(),
            Error::Utxo(e) => e.dos_score(),
            Error::InsufficientFee { .. } | Error::FeeworkRejected(_) => 10,
            Error::DuplicateClaim(_) | Error::DuplicateAlias(_) => 10,
            Error::Structure(_)
            | Error::Coinbase
            | Error::Coinstake
            | Error::NonStandard(_)
            | Error::DeetsWithFeework => 100,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
