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

//! The unspent transaction output ledger. An output is a row in the store
//! keyed by its outpoint; a spend is the row's deletion, so there is no
//! separate spent-ness bit to keep consistent with presence.

mod connect;
mod entry;
mod error;
mod fee;
mod store;

pub use connect::{
    add_outputs, connect_inputs, disconnect_inputs, fetch_inputs, remove_outputs, require_all_found,
    validate_inputs, value_in, ConnectUndo, FetchedInput,
};
pub use entry::Utxo;
pub use error::{DosScore, Error, Result};
pub use fee::{min_fee, FeeMode};
pub use store::{delete_utxo, get_utxo, has_utxo, put_utxo};
