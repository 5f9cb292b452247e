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

//! The exhaustive status taxonomy a [`crate::Feework`] check can land on.

/// Outcome of evaluating a transaction's feework against a block context.
/// `Unchecked` is the only status [`crate::Feework::check`] will advance out
/// of; every other status is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeeworkStatus {
    /// Feework has yet to be checked.
    Unchecked,
    /// Valid: the work meets the limit at the required memory cost.
    Ok,
    /// Valid: the tx has no feework output and none was required.
    None,
    /// The tx has no outputs at all.
    Empty,
    /// The tx is a coinbase; coinbases never carry feework.
    Coinbase,
    /// The tx is a coinstake; coinstakes never carry feework.
    Coinstake,
    /// An output's scriptPubKey does not solve to a known template.
    Insoluble,
    /// A feework-templated output exists but isn't the last output.
    Misplaced,
    /// The enclosing transaction's version predates feeless support.
    BadVersion,
    /// No feework output is present, but one was required.
    Missing,
    /// The referenced block height is ahead of the chain tip.
    BlockUnknown,
    /// The referenced block is further back than `FEELESS_MAX_DEPTH`.
    BlockTooDeep,
    /// The supplied memory cost is below the schedule's floor for this block.
    LowMcost,
    /// The supplied memory cost exceeds `FEEWORK_MAX_MCOST`.
    HighMcost,
    /// Incomplete feework object: no height was extracted.
    NoHeight,
    /// Incomplete feework object: no hash limit was assigned.
    NoLimit,
    /// Incomplete feework object: no memory cost was extracted.
    NoMcost,
    /// Incomplete feework object: no hash was computed.
    NoHash,
    /// Incomplete feework object: no work nonce was extracted.
    NoWork,
    /// The computed hash exceeds the assigned limit.
    Insufficient,
}

impl FeeworkStatus {
    pub fn is_unchecked(self) -> bool {
        matches!(self, FeeworkStatus::Unchecked)
    }

    pub fn is_checked(self) -> bool {
        !self.is_unchecked()
    }

    pub fn is_ok(self) -> bool {
        matches!(self, FeeworkStatus::Ok)
    }

    pub fn has_none(self) -> bool {
        matches!(self, FeeworkStatus::None)
    }

    pub fn is_missing(self) -> bool {
        matches!(self, FeeworkStatus::Missing)
    }

    /// `OK` or legitimately absent -- the two statuses that let a
    /// transaction through feework evaluation without penalty.
    pub fn is_valid(self) -> bool {
        matches!(self, FeeworkStatus::Ok | FeeworkStatus::None)
    }

    pub fn is_bad_version(self) -> bool {
        matches!(self, FeeworkStatus::BadVersion)
    }

    pub fn is_insufficient(self) -> bool {
        matches!(self, FeeworkStatus::Insufficient)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FeeworkStatus::Unchecked => "unchecked",
            FeeworkStatus::Ok => "ok",
            FeeworkStatus::None => "tx_has_no_feework",
            FeeworkStatus::Empty => "tx_has_empty_vout",
            FeeworkStatus::Coinbase => "tx_is_coinbase",
            FeeworkStatus::Coinstake => "tx_is_coinstake",
            FeeworkStatus::Insoluble => "tx_has_insoluble_script",
            FeeworkStatus::Misplaced => "tx_has_misplaced_feework",
            FeeworkStatus::BadVersion => "tx_has_bad_version",
            FeeworkStatus::Missing => "tx_missing_feework",
            FeeworkStatus::BlockUnknown => "unknown_block",
            FeeworkStatus::BlockTooDeep => "block_too_deep",
            FeeworkStatus::LowMcost => "low_memory_cost",
            FeeworkStatus::HighMcost => "high_memory_cost",
            FeeworkStatus::NoHeight => "no_height",
            FeeworkStatus::NoLimit => "no_limit",
            FeeworkStatus::NoMcost => "no_memory_cost",
            FeeworkStatus::NoHash => "no_hash",
            FeeworkStatus::NoWork => "no_work",
            FeeworkStatus::Insufficient => "insufficient_work",
        }
    }
}

impl std::fmt::Display for FeeworkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
