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

use crate::entry::Utxo;
use crate::error::{Error, Result};
use common::chain::OutPoint;
use serialization::{Decode, Encode};
use storage::{KvRead, KvWrite};

const UTXO_MAP: &str = "utxo";

fn key(outpoint: &OutPoint) -> Vec<u8> {
    outpoint.encode()
}

pub fn get_utxo<S: KvRead>(store: &S, outpoint: &OutPoint) -> Result<Option<Utxo>> {
    match store.get(UTXO_MAP, &key(outpoint)).map_err(Error::Storage)? {
        Some(bytes) => Utxo::decode_all(&bytes)
            .map(Some)
            .map_err(|_| Error::Storage(storage::Error::Backend("corrupt utxo entry".to_string()))),
        None => Ok(None),
    }
}

pub fn has_utxo<S: KvRead>(store: &S, outpoint: &OutPoint) -> Result<bool> {
    Ok(get_utxo(store, outpoint)?.is_some())
}

pub fn put_utxo<S: KvWrite>(store: &mut S, outpoint: &OutPoint, utxo: Utxo) -> Result<()> {
    store.put(UTXO_MAP, &key(outpoint), utxo.encode()).map_err(Error::Storage)
}

pub fn delete_utxo<S: KvWrite>(store: &mut S, outpoint: &OutPoint) -> Result<()> {
    store.delete(UTXO_MAP, &key(outpoint)).map_err(Error::Storage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::chain::TxOutput;
    use common::primitives::{Amount, Hash256};
    use storage::MemoryStore;

    #[test]
    fn put_then_get_round_trips() {
        let mut store = MemoryStore::new();
        let outpoint = OutPoint::new(Hash256::ZERO, 0);
        let utxo = Utxo::new(
            TxOutput { value: Amount::from_atoms(1), script_pubkey: vec![] },
            1,
            false,
            false,
            None,
        );
        put_utxo(&mut store, &outpoint, utxo.clone()).unwrap();
        assert_eq!(get_utxo(&store, &outpoint).unwrap(), Some(utxo));
        assert!(has_utxo(&store, &outpoint).unwrap());
    }

    #[test]
    fn delete_removes_the_entry() {
        let mut store = MemoryStore::new();
        let outpoint = OutPoint::new(Hash256::ZERO, 1);
        let utxo = Utxo::new(
            TxOutput { value: Amount::from_atoms(1), script_pubkey: vec![] },
            1,
            false,
            false,
            None,
        );
        put_utxo(&mut store, &outpoint, utxo).unwrap();
        delete_utxo(&mut store, &outpoint).unwrap();
        assert_eq!(get_utxo(&store, &outpoint).unwrap(), None);
    }

    #[test]
    fn missing_entry_is_none() {
        let store = MemoryStore::new();
        let outpoint = OutPoint::new(Hash256::ZERO, 9);
        assert_eq!(get_utxo(&store, &outpoint).unwrap(), None);
        assert!(!has_utxo(&store, &outpoint).unwrap());
    }
}
