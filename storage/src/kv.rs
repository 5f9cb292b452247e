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

//! The read/write split every collaborator-facing storage trait in this
//! workspace follows (registry snapshots, tx index, block index, block
//! bodies): a `*Read` trait usable through a shared reference, and a
//! `*Write` trait, which requires `*Read`, usable through a unique one.
//! `map` is a logical column name; a single backend may multiplex many maps.

use crate::error::Result;

pub trait KvRead {
    fn get(&self, map: &str, key: &[u8]) -> Result<Option<Vec<u8>>>;
    fn iter_prefix(&self, map: &str, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>>;
}

pub trait KvWrite: KvRead {
    fn put(&mut self, map: &str, key: &[u8], value: Vec<u8>) -> Result<()>;
    fn delete(&mut self, map: &str, key: &[u8]) -> Result<()>;
}

/// A staged batch of writes, opened against a snapshot of its parent and
/// invisible to readers of that parent until [`commit`](KvTransaction::commit)
/// consumes it. Dropping a `KvTransaction` without committing discards the
/// whole batch, which is how a multi-step caller gets all-or-nothing
/// semantics: stage every write through the transaction, and only call
/// `commit` once every step has succeeded.
pub trait KvTransaction: KvWrite {
    fn commit(self) -> Result<()>;
}

/// Backends that can hand out a [`KvTransaction`] over themselves. A single
/// `put`/`delete` on the backend directly is already atomic; this trait is
/// for callers that need several writes (possibly spanning several logical
/// maps, possibly with reads of the in-progress state in between) to succeed
/// or fail as one unit.
pub trait Transactional: KvWrite {
    type Txn: KvTransaction;

    fn transaction(&self) -> Self::Txn;
}
