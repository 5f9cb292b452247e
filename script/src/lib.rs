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

//! The locking-script layer: opcodes, the byte-level parser, the output
//! template solver, fixed-width domain payload codecs, the bridge from
//! recognized templates to registry/feework data, signature evaluation, and
//! standardness/`CheckTransaction`.

pub mod extract;
pub mod opcode;
pub mod payload;
pub mod script;
pub mod sig;
pub mod solver;
pub mod standard;

pub use extract::{extract_deet, extract_feework, ExtractError};
pub use opcode::Opcode;
pub use payload::{
    ClaimPayload, FeeworkPayload, PayloadError, Purchase1Payload, Purchase4Payload, SetKeyPayload,
    SetMetaPayload, SetStatePayload,
};
pub use script::{Instruction, Instructions, ParseError, Script};
pub use sig::{check_signature, signature_hash, transaction_signature_hash, SigError};
pub use solver::{solve, Solution, TemplateType};
pub use standard::{check_output_amount, check_transaction, is_standard_tx, legacy_sigop_count, StandardError};
