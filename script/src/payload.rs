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

//! Fixed-width payload layouts pushed ahead of each domain opcode (spec §6).
//! These are plain byte-offset structures, not the general [`serialization`]
//! compact-size codec: their widths are part of chain consensus and must
//! not grow a length prefix.
//!
//! `Purchase4` alone has a fork-gated width: 160 bytes from `FORKMISSFIX`
//! onward (mainnet always uses this width), 127 bytes before it on testnet
//! (spec §9's documented testnet divergence -- the manager pubkey field is
//! simply absent pre-`FORKMISSFIX`).

use common::primitives::Amount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("payload is {actual} bytes, expected {expected}")]
    WrongLength { expected: usize, actual: usize },
    #[error("alias is not valid UTF-8")]
    InvalidAlias,
}

fn trim_trailing_zeros(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().rposition(|b| *b != 0).map(|i| i + 1).unwrap_or(0);
    &bytes[..end]
}

fn pack_fixed(s: &str, width: usize) -> Vec<u8> {
    let mut buf = vec![0u8; width];
    let bytes = s.as_bytes();
    buf[..bytes.len().min(width)].copy_from_slice(&bytes[..bytes.len().min(width)]);
    buf
}

fn unpack_fixed(bytes: &[u8]) -> Result<String, PayloadError> {
    String::from_utf8(trim_trailing_zeros(bytes).to_vec()).map_err(|_| PayloadError::InvalidAlias)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Purchase1Payload {
    pub price: Amount,
    pub owner_pubkey: [u8; 33],
    pub alias: String,
}

impl Purchase1Payload {
    pub const LEN: usize = 8 + 33 + 16;

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::LEN);
        buf.extend_from_slice(&self.price.to_atoms().to_le_bytes());
        buf.extend_from_slice(&self.owner_pubkey);
        buf.extend_from_slice(&pack_fixed(&self.alias, 16));
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, PayloadError> {
        if bytes.len() != Self::LEN {
            return Err(PayloadError::WrongLength { expected: Self::LEN, actual: bytes.len() });
        }
        let price = i64::from_le_bytes(bytes[0..8].try_into().unwrap());
        let mut owner_pubkey = [0u8; 33];
        owner_pubkey.copy_from_slice(&bytes[8..41]);
        let alias = unpack_fixed(&bytes[41..57])?;
        Ok(Purchase1Payload { price: Amount::from_atoms(price), owner_pubkey, alias })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Purchase4Payload {
    pub price: Amount,
    pub owner_pubkey: [u8; 33],
    pub delegate_pubkey: [u8; 33],
    pub manager_pubkey: Option<[u8; 33]>,
    pub controller_pubkey: [u8; 33],
    pub payout_pcm: u32,
    pub alias: String,
}

impl Purchase4Payload {
    pub const LEN_WITH_MANAGER: usize = 8 + 33 + 33 + 33 + 33 + 4 + 16;
    pub const LEN_WITHOUT_MANAGER: usize = 8 + 33 + 33 + 33 + 4 + 16;

    pub fn encode(&self, with_manager: bool) -> Vec<u8> {
        let len = if with_manager { Self::LEN_WITH_MANAGER } else { Self::LEN_WITHOUT_MANAGER };
        let mut buf = Vec::with_capacity(len);
        buf.extend_from_slice(&self.price.to_atoms().to_le_bytes());
        buf.extend_from_slice(&self.owner_pubkey);
        buf.extend_from_slice(&self.delegate_pubkey);
        if with_manager {
            buf.extend_from_slice(&self.manager_pubkey.unwrap_or([0u8; 33]));
        }
        buf.extend_from_slice(&self.controller_pubkey);
        buf.extend_from_slice(&self.payout_pcm.to_le_bytes());
        buf.extend_from_slice(&pack_fixed(&self.alias, 16));
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, PayloadError> {
        let with_manager = match bytes.len() {
            n if n == Self::LEN_WITH_MANAGER => true,
            n if n == Self::LEN_WITHOUT_MANAGER => false,
            n => return Err(PayloadError::WrongLength { expected: Self::LEN_WITH_MANAGER, actual: n }),
        };
        let mut pos = 0;
        let take = |pos: &mut usize, n: usize| -> &[u8] {
            let s = &bytes[*pos..*pos + n];
            *pos += n;
            s
        };
        let price = i64::from_le_bytes(take(&mut pos, 8).try_into().unwrap());
        let mut owner_pubkey = [0u8; 33];
        owner_pubkey.copy_from_slice(take(&mut pos, 33));
        let mut delegate_pubkey = [0u8; 33];
        delegate_pubkey.copy_from_slice(take(&mut pos, 33));
        let manager_pubkey = if with_manager {
            let mut m = [0u8; 33];
            m.copy_from_slice(take(&mut pos, 33));
            Some(m)
        } else {
            None
        };
        let mut controller_pubkey = [0u8; 33];
        controller_pubkey.copy_from_slice(take(&mut pos, 33));
        let payout_pcm = u32::from_le_bytes(take(&mut pos, 4).try_into().unwrap());
        let alias = unpack_fixed(take(&mut pos, 16))?;
        Ok(Purchase4Payload {
            price: Amount::from_atoms(price),
            owner_pubkey,
            delegate_pubkey,
            manager_pubkey,
            controller_pubkey,
            payout_pcm,
            alias,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetKeyPayload {
    pub staker_id: u32,
    pub pubkey: [u8; 33],
    pub payout_pcm: Option<u32>,
}

impl SetKeyPayload {
    pub const LEN_PLAIN: usize = 4 + 33;
    pub const LEN_WITH_PCM: usize = 4 + 33 + 4;

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::LEN_WITH_PCM);
        buf.extend_from_slice(&self.staker_id.to_le_bytes());
        buf.extend_from_slice(&self.pubkey);
        if let Some(pcm) = self.payout_pcm {
            buf.extend_from_slice(&pcm.to_le_bytes());
        }
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, PayloadError> {
        let has_pcm = match bytes.len() {
            n if n == Self::LEN_PLAIN => false,
            n if n == Self::LEN_WITH_PCM => true,
            n => return Err(PayloadError::WrongLength { expected: Self::LEN_PLAIN, actual: n }),
        };
        let staker_id = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
        let mut pubkey = [0u8; 33];
        pubkey.copy_from_slice(&bytes[4..37]);
        let payout_pcm = has_pcm.then(|| u32::from_le_bytes(bytes[37..41].try_into().unwrap()));
        Ok(SetKeyPayload { staker_id, pubkey, payout_pcm })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetStatePayload {
    pub staker_id: u32,
}

impl SetStatePayload {
    pub const LEN: usize = 4;

    pub fn encode(&self) -> Vec<u8> {
        self.staker_id.to_le_bytes().to_vec()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, PayloadError> {
        if bytes.len() != Self::LEN {
            return Err(PayloadError::WrongLength { expected: Self::LEN, actual: bytes.len() });
        }
        Ok(SetStatePayload { staker_id: u32::from_le_bytes(bytes.try_into().unwrap()) })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimPayload {
    pub pubkey: [u8; 33],
    pub value: Amount,
}

impl ClaimPayload {
    pub const LEN: usize = 33 + 8;

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::LEN);
        buf.extend_from_slice(&self.pubkey);
        buf.extend_from_slice(&self.value.to_atoms().to_le_bytes());
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, PayloadError> {
        if bytes.len() != Self::LEN {
            return Err(PayloadError::WrongLength { expected: Self::LEN, actual: bytes.len() });
        }
        let mut pubkey = [0u8; 33];
        pubkey.copy_from_slice(&bytes[0..33]);
        let value = i64::from_le_bytes(bytes[33..41].try_into().unwrap());
        Ok(ClaimPayload { pubkey, value: Amount::from_atoms(value) })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetMetaPayload {
    pub staker_id: u32,
    pub key: String,
    pub value: String,
}

impl SetMetaPayload {
    pub const LEN: usize = 4 + 16 + 40;

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::LEN);
        buf.extend_from_slice(&self.staker_id.to_le_bytes());
        buf.extend_from_slice(&pack_fixed(&self.key, 16));
        buf.extend_from_slice(&pack_fixed(&self.value, 40));
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, PayloadError> {
        if bytes.len() != Self::LEN {
            return Err(PayloadError::WrongLength { expected: Self::LEN, actual: bytes.len() });
        }
        let staker_id = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
        let key = unpack_fixed(&bytes[4..20])?;
        let value = unpack_fixed(&bytes[20..60])?;
        Ok(SetMetaPayload { staker_id, key, value })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeworkPayload {
    pub work: u64,
    pub mcost: u32,
    pub height: i32,
}

impl FeeworkPayload {
    pub const LEN: usize = 8 + 4 + 4;

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::LEN);
        buf.extend_from_slice(&self.work.to_le_bytes());
        buf.extend_from_slice(&self.mcost.to_le_bytes());
        buf.extend_from_slice(&self.height.to_le_bytes());
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, PayloadError> {
        if bytes.len() != Self::LEN {
            return Err(PayloadError::WrongLength { expected: Self::LEN, actual: bytes.len() });
        }
        let work = u64::from_le_bytes(bytes[0..8].try_into().unwrap());
        let mcost = u32::from_le_bytes(bytes[8..12].try_into().unwrap());
        let height = i32::from_le_bytes(bytes[12..16].try_into().unwrap());
        Ok(FeeworkPayload { work, mcost, height })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purchase1_roundtrips() {
        let p = Purchase1Payload { price: Amount::from_atoms(1_000_000), owner_pubkey: [7; 33], alias: "alice".into() };
        let bytes = p.encode();
        assert_eq!(bytes.len(), Purchase1Payload::LEN);
        assert_eq!(Purchase1Payload::decode(&bytes).unwrap(), p);
    }

    #[test]
    fn purchase4_roundtrips_with_and_without_manager() {
        let p = Purchase4Payload {
            price: Amount::from_atoms(1),
            owner_pubkey: [1; 33],
            delegate_pubkey: [2; 33],
            manager_pubkey: Some([3; 33]),
            controller_pubkey: [4; 33],
            payout_pcm: 5_000,
            alias: "bob".into(),
        };
        let with = p.encode(true);
        assert_eq!(with.len(), Purchase4Payload::LEN_WITH_MANAGER);
        assert_eq!(Purchase4Payload::decode(&with).unwrap(), p);

        let without = p.encode(false);
        assert_eq!(without.len(), Purchase4Payload::LEN_WITHOUT_MANAGER);
        let decoded = Purchase4Payload::decode(&without).unwrap();
        assert_eq!(decoded.manager_pubkey, None);
        assert_eq!(decoded.owner_pubkey, p.owner_pubkey);
    }

    #[test]
    fn setkey_with_and_without_payout() {
        let p = SetKeyPayload { staker_id: 7, pubkey: [1; 33], payout_pcm: Some(2_500) };
        assert_eq!(p.encode().len(), SetKeyPayload::LEN_WITH_PCM);
        assert_eq!(SetKeyPayload::decode(&p.encode()).unwrap(), p);

        let plain = SetKeyPayload { staker_id: 7, pubkey: [1; 33], payout_pcm: None };
        assert_eq!(plain.encode().len(), SetKeyPayload::LEN_PLAIN);
        assert_eq!(SetKeyPayload::decode(&plain.encode()).unwrap(), plain);
    }

    #[test]
    fn setmeta_roundtrips() {
        let p = SetMetaPayload { staker_id: 1, key: "nick".into(), value: "satoshi".into() };
        let bytes = p.encode();
        assert_eq!(bytes.len(), SetMetaPayload::LEN);
        assert_eq!(SetMetaPayload::decode(&bytes).unwrap(), p);
    }

    #[test]
    fn feework_roundtrips() {
        let p = FeeworkPayload { work: 42, mcost: 256, height: 100 };
        let bytes = p.encode();
        assert_eq!(bytes.len(), 16);
        assert_eq!(FeeworkPayload::decode(&bytes).unwrap(), p);
    }

    #[test]
    fn wrong_length_is_rejected() {
        assert!(matches!(FeeworkPayload::decode(&[0; 10]), Err(PayloadError::WrongLength { .. })));
    }
}
