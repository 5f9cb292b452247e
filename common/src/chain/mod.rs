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

pub mod block;
pub mod deets;
pub mod fork;
pub mod genesis;
pub mod outpoint;
pub mod params;
pub mod transaction;

pub use block::{build_merkle_root, Block, BlockError, BlockHeader};
pub use deets::{Deet, KeyRole, StakerId, StakerState};
pub use fork::{Fork, ForkSchedule, ProtocolVersionSchedule};
pub use outpoint::OutPoint;
pub use params::{ChainParams, Network};
pub use transaction::{
    TxError, TxInput, TxOutput, Transaction, CURRENT_BLOCK_VERSION, CURRENT_VERSION,
    FEELESS_VERSION, SEQUENCE_FINAL,
};
