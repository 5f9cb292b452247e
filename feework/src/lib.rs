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

//! Feeless transactions pay an Argon2d proof of work instead of a money
//! fee. This crate holds the work record, its extraction and evaluation,
//! and the dynamic memory-cost/hash-limit schedules that make the proof
//! harder to satisfy as a block fills up.

mod feework;
mod schedule;
mod status;

pub use feework::{check_feework, ChainTip, Feework};
pub use schedule::{feework_hardness, feework_limit, RelayMode};
pub use status::FeeworkStatus;
