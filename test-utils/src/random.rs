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

use common::primitives::Hash256;
use rand::RngCore;

/// A hash drawn from the thread-local RNG, for tests that need a distinct
/// txid/block hash/outpoint but don't care which one.
pub fn random_hash() -> Hash256 {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    Hash256::from_bytes(bytes)
}

/// A compressed-looking 33-byte public key with a valid prefix byte, drawn
/// from the thread-local RNG. Not a point on the curve; only
/// [`crate::FakeVerifier`] ever looks at it.
pub fn random_pubkey() -> crypto::PubKey {
    let mut bytes = [0u8; 33];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes[0] = 0x02;
    crypto::PubKey(bytes.to_vec())
}
