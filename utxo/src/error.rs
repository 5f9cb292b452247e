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

use common::chain::OutPoint;

/// Ban-weight attached to a rejection at the validation boundary. Leaf
/// errors stay plain; the boundary pairs an [`Error`] with a [`DosScore`]
/// rather than threading a score field through every variant.
pub type DosScore = u32;

#[derive(thiserror::Error, Debug, PartialEq, Eq, Clone)]
pub enum Error {
    #[error("input {0:?} spends an output that does not exist or is already spent")]
    MissingInput(OutPoint),
    #[error("input value out of money range")]
    ValueOutOfRange,
    #[error("sum of input values out of money range")]
    ValueInOverflow,
    #[error("tried to spend {kind} at depth {depth}")]
    ImmatureSpend { kind: &'static str, depth: i32 },
    #[error("transaction timestamp earlier than an input's source transaction")]
    TimestampOutOfOrder,
    #[error("special marker output is not spendable")]
    MarkerNotSpendable,
    #[error("sum of input values {value_in} is less than sum of output values {value_out}")]
    ValueInLessThanOut { value_in: i64, value_out: i64 },
    #[error("input signature check failed: {0}")]
    BadSignature(script::SigError),
    #[error("storage error")]
    Storage(#[from] storage::Error),
}

impl Error {
    /// The ban-weight a caller should apply when rejecting a tx/block for
    /// this reason. Missing inputs carry none: the spender may simply be
    /// looking at a stale view, or the prevout may still arrive as an
    /// orphan's parent.
    pub fn dos_score(&self) -> DosScore {
        match self {
            Error::MissingInput(_) | Error::Storage(_) => 0,
            Error::ImmatureSpend { .. } | Error::TimestampOutOfOrder => 10,
            Error::ValueOutOfRange
            | Error::ValueInOverflow
            | Error::MarkerNotSpendable
            | Error::ValueInLessThanOut { .. }
            | Error::BadSignature(_) => 100,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
