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

//! Argon2d is consumed as a primitive (spec §1): `argon2d(t_cost, m_cost,
//! parallelism, data, salt) -> hash`. This module defines the interface the
//! feework engine hashes through, plus [`Argon2Buffer`], the reusable memory
//! block the resource policy in spec §5 requires ("the two Argon2 buffers...
//! are acquired once at startup, reused across all hashing, and released on
//! shutdown; they must not be freed while any thread is mid-hash").

/// A scratch buffer sized for the largest memory cost the caller will ever
/// request, reused across hash calls to avoid a malloc per feework check.
pub struct Argon2Buffer {
    capacity_kib: u32,
    memory: Vec<u8>,
}

impl Argon2Buffer {
    /// Allocate a buffer able to serve any call with `m_cost <= capacity_kib`.
    pub fn with_capacity(capacity_kib: u32) -> Self {
        Self {
            capacity_kib,
            memory: vec![0u8; capacity_kib as usize * 1024],
        }
    }

    pub fn capacity_kib(&self) -> u32 {
        self.capacity_kib
    }

    pub fn scratch_mut(&mut self) -> &mut [u8] {
        &mut self.memory
    }
}

/// The Argon2d hashing primitive, consumed by [`feework`](../../feework) to
/// turn a transaction's work payload into a comparable digest. Implementors
/// live outside this core (spec §1); this crate only fixes the call shape.
pub trait Argon2d {
    /// Hash `data` with the Argon2d function, using `work` as the salt, and
    /// truncate the raw output to `tag_len` bytes. `buffer` is reused scratch
    /// memory sized by the caller per [`Argon2Buffer::with_capacity`].
    fn hash_raw(
        &self,
        t_cost: u32,
        m_cost: u32,
        parallelism: u32,
        data: &[u8],
        work: &[u8],
        tag_len: usize,
        buffer: &mut Argon2Buffer,
    ) -> Vec<u8>;
}
