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

//! `CTxUndo`/`CBlockUndo`: one [`ConnectUndo`] per transaction a connected
//! block spent inputs for, archived so [`crate::chain_selector`] can
//! disconnect that block later without replaying every earlier block from
//! genesis.

use crate::error::Result;
use common::primitives::Hash256;
use serialization::{Decode, Encode};
use storage::{KvRead, KvWrite};
use utxo::ConnectUndo;

const MAP: &str = "undo";

pub fn put_undo<S: KvWrite>(store: &mut S, block_hash: &Hash256, undos: &[ConnectUndo]) -> Result<()> {
    store.put(MAP, block_hash.as_bytes(), undos.to_vec().encode())?;
    Ok(())
}

pub fn get_undo<S: KvRead>(store: &S, block_hash: &Hash256) -> Result<Vec<ConnectUndo>> {
    match store.get(MAP, block_hash.as_bytes())? {
        Some(bytes) => Vec::<ConnectUndo>::decode_all(&bytes)
            .map_err(|_| crate::error::Error::InvariantViolation("stored undo log is corrupt")),
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::primitives::{Amount, Hash256};
    use storage::MemoryStore;

    #[test]
    fn round_trips_an_undo_log() {
        let mut store = MemoryStore::new();
        let hash = Hash256::from_bytes([7u8; 32]);
        let outpoint = common::chain::OutPoint::new(Hash256::ZERO, 0);
        let utxo = utxo::Utxo::new(
            common::chain::TxOutput { value: Amount::from_atoms(500), script_pubkey: vec![] },
            10,
            false,
            false,
            None,
        );
        let undo = ConnectUndo::from_spent(vec![(outpoint, utxo)]);
        put_undo(&mut store, &hash, &[undo.clone()]).unwrap();
        let loaded = get_undo(&store, &hash).unwrap();
        assert_eq!(loaded, vec![undo]);
    }

    #[test]
    fn missing_hash_returns_empty() {
        let store = MemoryStore::new();
        assert_eq!(get_undo(&store, &Hash256::ZERO).unwrap(), Vec::new());
    }
}
