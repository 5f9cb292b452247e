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

use common::chain::StakerId;

/// Ban-weight attached to a rejection at the validation boundary (spec §7).
/// Leaf errors stay plain; the boundary pairs an [`Error`] with a
/// [`DosScore`] rather than threading a score field through every variant.
pub type DosScore = u32;

#[derive(thiserror::Error, Debug, PartialEq, Eq, Clone)]
pub enum Error {
    #[error("registry operations are not legal before FORKPURCHASE")]
    RegistryNotActive,
    #[error("alias {0:?} is already registered")]
    AliasAlreadyExists(String),
    #[error("alias must be at most 16 bytes")]
    AliasTooLong,
    #[error("purchase price {paid} below required price {required}")]
    PurchasePriceTooLow { paid: i64, required: i64 },
    #[error("purchase price {paid} exceeds twice the required price {required}")]
    PurchasePriceTooHigh { paid: i64, required: i64 },
    #[error("payout percentage-per-mille {0} exceeds 100_000")]
    PayoutPcmTooHigh(u32),
    #[error("staker {0} not found")]
    StakerNotFound(StakerId),
    #[error("staker {0} is not a qualified staker")]
    StakerNotQualified(StakerId),
    #[error("setkey operation targets role already set in this transaction")]
    DuplicateRoleInTx,
    #[error("setkey transaction targets more than one staker")]
    SetKeyMultipleStakers,
    #[error("owner-key change must be the last setkey output in the transaction")]
    OwnerChangeNotLast,
    #[error("manager-key change must precede only an owner-key change")]
    ManagerChangeOrder,
    #[error("signatory is not authorized to rotate this role")]
    UnauthorizedKeyRotation,
    #[error("setstate transaction must have exactly one input")]
    SetStateNotSingleInput,
    #[error("signatory does not own, manage, or control staker {0}")]
    UnauthorizedStateChange(StakerId),
    #[error("staker {0} cannot be enabled while in cooldown")]
    EnableCooldown(StakerId),
    #[error("claim transaction must have exactly one input and one output")]
    ClaimNotSingleInputOutput,
    #[error("claim output pubkey does not match the input signatory")]
    ClaimPubkeyMismatch,
    #[error("claim value {value} exceeds ledger balance {balance}")]
    ClaimExceedsBalance { value: i64, balance: i64 },
    #[error("claims are not active until one day of blocks after FORKQPOS")]
    ClaimNotYetActive,
    #[error("setmeta transaction must have exactly one input")]
    SetMetaNotSingleInput,
    #[error("setmeta sets the same key twice in one transaction")]
    DuplicateMetaKey,
    #[error("meta key {0:?} is not writable by this signatory")]
    UnauthorizedMetaKey(String),
    #[error("meta value fails length/charset validation")]
    InvalidMetaValue,
    #[error("nft {0} is not assigned and cannot be consumed by this alias")]
    NftNotAssigned(u32),
    #[error("round queue is empty")]
    EmptyQueue,
    #[error("timestamp is not within the staker's slot")]
    TimestampOutOfSlot,
    #[error("an internal registry invariant was violated: {0}")]
    InvariantViolation(&'static str),
    #[error("storage error")]
    Storage(#[from] storage::Error),
}

impl Error {
    /// The ban-weight a caller should apply when rejecting a tx/block for
    /// this reason (spec §7). Structural and resource-bound violations carry
    /// the maximum weight; soft/economic rejections carry none since they
    /// may be a stale view of chain state rather than malice.
    pub fn dos_score(&self) -> DosScore {
        match self {
            Error::InvariantViolation(_) => 100,
            Error::PurchasePriceTooHigh { .. } => 20,
            Error::ClaimExceedsBalance { .. }
            | Error::ClaimPubkeyMismatch
            | Error::UnauthorizedKeyRotation
            | Error::UnauthorizedStateChange(_)
            | Error::UnauthorizedMetaKey(_) => 20,
            Error::Storage(_) => 0,
            _ => 10,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
