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

//! Hashing owned by the core, plus the interfaces to primitives the core only
//! *consumes*: Argon2d (feework) and ECDSA/secp256k1 (script signature
//! checks). Neither primitive is implemented here — per spec §1 they are
//! external collaborators — but the core needs a stable trait to code
//! against, and a buffer-reuse type to satisfy the resource policy in §5.

pub mod argon2d;
pub mod ecdsa;
mod hash;

pub use argon2d::{Argon2Buffer, Argon2d};
pub use ecdsa::{PubKey, Signature, Verifier};
pub use hash::{hash160, sha256d, Hash256};
