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

//! Block/transaction builders and fake crypto primitives shared by the
//! workspace's test suites. None of this is wired into the production
//! crates: `script`, `crypto`, and `common` only ever see real collaborators
//! there, supplied by the node binary. Tests reach for these instead of
//! repeating the same hand-rolled fixtures in every crate.

mod block_builder;
mod fake_crypto;
mod random;
mod tx_builder;

pub use block_builder::BlockBuilder;
pub use fake_crypto::{fake_sign, FakeArgon2d, FakeVerifier};
pub use random::{random_hash, random_pubkey};
pub use tx_builder::TxBuilder;
