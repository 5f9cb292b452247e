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

//! The staker registry: a state machine bolted onto the UTXO ledger that
//! tracks staker identities, their four role keys, a deterministic qPoS
//! round queue, and ledger balances owed to stakers on claim. Activation
//! boundary is `FORKPURCHASE` (spec §4.5) -- no registry operation is legal
//! before it.
//!
//! A temporary clone of the main registry backs speculative block
//! validation (spec §4.6's `ProcessBlock`); [`StakerRegistry`] is kept cheap
//! to clone by using sparse `BTreeMap`s rather than anything backed by the
//! full staker population's history.

pub mod error;
pub mod ops;
pub mod price;
pub mod queue;
pub mod snapshot;
pub mod types;

pub use error::{DosScore, Error, Result};
pub use ops::{apply_tx_deets, credit_ledger, Signatory, TxDeets};
pub use queue::build_round_queue;
pub use snapshot::{get_snapshot, write_snapshot};
pub use types::{QueueSlot, RegistryState, StakerRecord, StakerRegistry};
