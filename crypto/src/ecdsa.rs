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

//! ECDSA/secp256k1 signing and verification are consumed as primitives
//! (spec §1). `script` needs only byte-string key/signature types and a
//! verifier it can call during `OP_CHECKSIG`/`OP_CHECKMULTISIG` evaluation.

use std::fmt;

/// A serialized secp256k1 public key (33 bytes compressed, 65 uncompressed).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PubKey(pub Vec<u8>);

impl PubKey {
    pub fn is_compressed(&self) -> bool {
        self.0.len() == 33 && (self.0[0] == 0x02 || self.0[0] == 0x03)
    }

    pub fn is_valid_encoding(&self) -> bool {
        match self.0.len() {
            33 => self.0[0] == 0x02 || self.0[0] == 0x03,
            65 => self.0[0] == 0x04,
            _ => false,
        }
    }
}

impl fmt::Debug for PubKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PubKey({})", hex_string(&self.0))
    }
}

/// A DER-encoded ECDSA signature, with the sighash-type byte appended as the
/// script layer expects.
#[derive(Clone, PartialEq, Eq)]
pub struct Signature(pub Vec<u8>);

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", hex_string(&self.0))
    }
}

fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Verifies that `signature` over `message_hash` was produced by `pubkey`.
/// Implemented outside this core; consumed as a primitive by `script`.
pub trait Verifier {
    fn verify(&self, pubkey: &PubKey, message_hash: &crate::Hash256, signature: &Signature)
        -> bool;
}
