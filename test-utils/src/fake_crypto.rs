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
use crypto::{Argon2Buffer, Argon2d, PubKey, Signature, Verifier};

/// Accepts every signature. `script`/`chainstate` tests that exercise the
/// shape of a check rather than real secp256k1 math wire this in place of
/// a production [`Verifier`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FakeVerifier;

impl Verifier for FakeVerifier {
    fn verify(&self, _pubkey: &PubKey, _message_hash: &Hash256, signature: &Signature) -> bool {
        signature.0 != REJECT_MARKER
    }
}

/// A signature that [`FakeVerifier`] always rejects, for tests that need to
/// exercise the bad-signature path without a real signer.
const REJECT_MARKER: &[u8] = b"rejected";

/// Builds a fake "signature" over `message_hash` that [`FakeVerifier`]
/// accepts. Not cryptography: just a fixed marker distinct from the reject
/// marker, so callers don't need a real secp256k1 key to exercise code paths
/// gated on `Verifier::verify`.
pub fn fake_sign(_message_hash: &Hash256) -> Signature {
    Signature(b"accepted".to_vec())
}

/// Deterministic stand-in for Argon2d: returns the first `tag_len` bytes of
/// `sha256d(data || work)`, repeated to fill the tag if needed. Feework
/// tests that need a hash cheaper to compute than real Argon2d, but still a
/// function of its inputs, wire this in.
#[derive(Debug, Default, Clone, Copy)]
pub struct FakeArgon2d;

impl Argon2d for FakeArgon2d {
    fn hash_raw(
        &self,
        _t_cost: u32,
        _m_cost: u32,
        _parallelism: u32,
        data: &[u8],
        work: &[u8],
        tag_len: usize,
        _buffer: &mut Argon2Buffer,
    ) -> Vec<u8> {
        let mut seed = Vec::with_capacity(data.len() + work.len());
        seed.extend_from_slice(data);
        seed.extend_from_slice(work);
        let mut out = Vec::with_capacity(tag_len);
        let mut block = crypto::sha256d(&seed);
        while out.len() < tag_len {
            out.extend_from_slice(block.as_bytes());
            block = crypto::sha256d(block.as_bytes());
        }
        out.truncate(tag_len);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fake_verifier_accepts_fake_sign_output() {
        let hash = Hash256::from_bytes([1u8; 32]);
        let sig = fake_sign(&hash);
        assert!(FakeVerifier.verify(&PubKey(vec![]), &hash, &sig));
    }

    #[test]
    fn fake_verifier_rejects_marker() {
        let hash = Hash256::from_bytes([1u8; 32]);
        let sig = Signature(b"rejected".to_vec());
        assert!(!FakeVerifier.verify(&PubKey(vec![]), &hash, &sig));
    }

    #[test]
    fn fake_argon2d_is_deterministic_and_sensitive_to_work() {
        let mut buffer = Argon2Buffer::with_capacity(1);
        let a = FakeArgon2d.hash_raw(1, 1, 1, b"data", b"work-a", 32, &mut buffer);
        let b = FakeArgon2d.hash_raw(1, 1, 1, b"data", b"work-a", 32, &mut buffer);
        let c = FakeArgon2d.hash_raw(1, 1, 1, b"data", b"work-b", 32, &mut buffer);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 32);
    }
}
