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

//! The fixed genesis block header constants. These are data, not derived
//! from anything: every node must agree on them bit for bit.

use crypto::Hash256;

/// The hand-picked parameters of a network's block 0.
#[derive(Debug, Clone, Copy)]
pub struct GenesisParams {
    pub hash: Hash256,
    pub merkle_root: Hash256,
    pub time: u32,
    pub nonce: u64,
    pub bits: u32,
}

fn hash_from_hex(hex: &str) -> Hash256 {
    let bytes = hex::decode(hex).expect("hard-coded genesis hash must be valid hex");
    assert_eq!(bytes.len(), 32, "genesis hash must be 32 bytes");
    let mut arr = [0u8; 32];
    // The reference client prints hashes byte-reversed; stored hex literals
    // here are already in that display order, so reverse back to storage order.
    for (i, b) in bytes.iter().rev().enumerate() {
        arr[i] = *b;
    }
    Hash256::from_bytes(arr)
}

pub fn mainnet() -> GenesisParams {
    GenesisParams {
        hash: hash_from_hex("1aaa07c5805c4ea8aee33c9f16a057215bc06d59f94fc12132c6135ed2d9712a"),
        merkle_root: hash_from_hex(
            "e3de7c386d5b82f62ff24c6d2351539c22b17c6ffab0e267b3cdd72fda82bd83",
        ),
        time: 1_403_668_979,
        nonce: 4_204_204_204,
        bits: 0x1d00ffff,
    }
}

pub fn testnet() -> GenesisParams {
    GenesisParams {
        hash: hash_from_hex("3dd6302f58a524d7c0bf7a8ee945cab05e2367bed482193eddecbb2a4c3bc634"),
        merkle_root: hash_from_hex(
            "e3de7c386d5b82f62ff24c6d2351539c22b17c6ffab0e267b3cdd72fda82bd83",
        ),
        time: 1_403_668_979,
        nonce: 4_204_204_204,
        bits: 0x1d00ffff,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mainnet_and_testnet_genesis_differ() {
        assert_ne!(mainnet().hash, testnet().hash);
    }
}
