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

//! The key-value store abstraction every on-disk-facing crate (registry
//! snapshots, the tx index, the block index, block bodies) is written
//! against. A real backend is a collaborator's concern; this crate supplies
//! the trait split and an in-memory implementation for tests.

pub mod error;
pub mod kv;
pub mod memory;

pub use error::{Error, Result};
pub use kv::{KvRead, KvTransaction, KvWrite, Transactional};
pub use memory::{MemoryStore, MemoryTransaction};
