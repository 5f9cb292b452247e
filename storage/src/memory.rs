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

use crate::error::Result;
use crate::kv::{KvRead, KvTransaction, KvWrite, Transactional};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

type Map = BTreeMap<Vec<u8>, Vec<u8>>;

/// An in-memory backend for tests and for collaborator-less development.
/// Cloning is cheap: it shares the underlying maps via `Arc`, so a clone
/// observes the same data (used to hand a second handle to a test without
/// threading `&mut` through call sites that don't need mutation).
#[derive(Default, Clone)]
pub struct MemoryStore {
    maps: Arc<RwLock<std::collections::HashMap<String, Map>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

}

impl Transactional for MemoryStore {
    type Txn = MemoryTransaction;

    /// Begin a staged transaction: reads see the current committed state
    /// through a snapshot taken at open time, writes accumulate in an
    /// overlay invisible until [`MemoryTransaction::commit`] is called.
    fn transaction(&self) -> MemoryTransaction {
        let snapshot = self.maps.read().clone();
        MemoryTransaction { base: snapshot, overlay: std::collections::HashMap::new(), store: self.clone() }
    }
}

impl KvRead for MemoryStore {
    fn get(&self, map: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.maps.read().get(map).and_then(|m| m.get(key).cloned()))
    }

    fn iter_prefix(&self, map: &str, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let guard = self.maps.read();
        let Some(m) = guard.get(map) else { return Ok(Vec::new()) };
        Ok(m.range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

impl KvWrite for MemoryStore {
    fn put(&mut self, map: &str, key: &[u8], value: Vec<u8>) -> Result<()> {
        self.maps.write().entry(map.to_string()).or_default().insert(key.to_vec(), value);
        Ok(())
    }

    fn delete(&mut self, map: &str, key: &[u8]) -> Result<()> {
        if let Some(m) = self.maps.write().get_mut(map) {
            m.remove(key);
        }
        Ok(())
    }
}

/// An all-or-nothing batch of mutations against a [`MemoryStore`] snapshot.
/// Reads fall through to the overlay first, then the snapshot taken when the
/// transaction opened -- concurrent commits by others are invisible to an
/// in-flight transaction, matching the "coarse lock held across the whole
/// operation" model this collaborator is meant to stand in for.
pub struct MemoryTransaction {
    base: std::collections::HashMap<String, Map>,
    overlay: std::collections::HashMap<String, BTreeMap<Vec<u8>, Option<Vec<u8>>>>,
    store: MemoryStore,
}

impl KvTransaction for MemoryTransaction {
    fn commit(self) -> Result<()> {
        let mut guard = self.store.maps.write();
        for (map, changes) in self.overlay {
            let entry = guard.entry(map).or_default();
            for (key, value) in changes {
                match value {
                    Some(v) => {
                        entry.insert(key, v);
                    }
                    None => {
                        entry.remove(&key);
                    }
                }
            }
        }
        Ok(())
    }
}

impl KvRead for MemoryTransaction {
    fn get(&self, map: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        if let Some(overlay_map) = self.overlay.get(map) {
            if let Some(v) = overlay_map.get(key) {
                return Ok(v.clone());
            }
        }
        Ok(self.base.get(map).and_then(|m| m.get(key).cloned()))
    }

    fn iter_prefix(&self, map: &str, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let mut merged: BTreeMap<Vec<u8>, Option<Vec<u8>>> = BTreeMap::new();
        if let Some(base_map) = self.base.get(map) {
            for (k, v) in base_map.range(prefix.to_vec()..) {
                if !k.starts_with(prefix) {
                    break;
                }
                merged.insert(k.clone(), Some(v.clone()));
            }
        }
        if let Some(overlay_map) = self.overlay.get(map) {
            for (k, v) in overlay_map {
                if k.starts_with(prefix) {
                    merged.insert(k.clone(), v.clone());
                }
            }
        }
        Ok(merged.into_iter().filter_map(|(k, v)| v.map(|v| (k, v))).collect())
    }
}

impl KvWrite for MemoryTransaction {
    fn put(&mut self, map: &str, key: &[u8], value: Vec<u8>) -> Result<()> {
        self.overlay.entry(map.to_string()).or_default().insert(key.to_vec(), Some(value));
        Ok(())
    }

    fn delete(&mut self, map: &str, key: &[u8]) -> Result<()> {
        self.overlay.entry(map.to_string()).or_default().insert(key.to_vec(), None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_round_trips() {
        let mut store = MemoryStore::new();
        store.put("blocks", b"k", vec![1, 2, 3]).unwrap();
        assert_eq!(store.get("blocks", b"k").unwrap(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn uncommitted_transaction_is_invisible() {
        let store = MemoryStore::new();
        let mut txn = store.transaction();
        txn.put("blocks", b"k", vec![9]).unwrap();
        assert_eq!(store.get("blocks", b"k").unwrap(), None);
    }

    #[test]
    fn committed_transaction_is_visible() {
        let store = MemoryStore::new();
        let mut txn = store.transaction();
        txn.put("blocks", b"k", vec![9]).unwrap();
        txn.commit().unwrap();
        assert_eq!(store.get("blocks", b"k").unwrap(), Some(vec![9]));
    }

    #[test]
    fn delete_inside_transaction_hides_base_value() {
        let mut store = MemoryStore::new();
        store.put("idx", b"a", vec![1]).unwrap();
        let mut txn = store.transaction();
        txn.delete("idx", b"a").unwrap();
        assert_eq!(txn.get("idx", b"a").unwrap(), None);
        txn.commit().unwrap();
        assert_eq!(store.get("idx", b"a").unwrap(), None);
    }

    #[test]
    fn iter_prefix_merges_overlay_and_base() {
        let mut store = MemoryStore::new();
        store.put("idx", b"aa", vec![1]).unwrap();
        store.put("idx", b"ab", vec![2]).unwrap();
        let mut txn = store.transaction();
        txn.put("idx", b"ac", vec![3]).unwrap();
        txn.delete("idx", b"aa").unwrap();
        let mut results = txn.iter_prefix("idx", b"a").unwrap();
        results.sort();
        assert_eq!(results, vec![(b"ab".to_vec(), vec![2]), (b"ac".to_vec(), vec![3])]);
    }
}
