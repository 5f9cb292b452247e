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

use crate::{Cursor, Decode, Encode, Error, Result};

/// Bitcoin-style "compact size" variable-length integer:
///   - `< 0xfd`       -> one byte
///   - `<= 0xffff`    -> 0xfd followed by a little-endian u16
///   - `<= 0xffff_ffff` -> 0xfe followed by a little-endian u32
///   - otherwise      -> 0xff followed by a little-endian u64
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CompactSize(pub u64);

impl Encode for CompactSize {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        match self.0 {
            n if n < 0xfd => buf.push(n as u8),
            n if n <= 0xffff => {
                buf.push(0xfd);
                buf.extend_from_slice(&(n as u16).to_le_bytes());
            }
            n if n <= 0xffff_ffff => {
                buf.push(0xfe);
                buf.extend_from_slice(&(n as u32).to_le_bytes());
            }
            n => {
                buf.push(0xff);
                buf.extend_from_slice(&n.to_le_bytes());
            }
        }
    }
}

impl Decode for CompactSize {
    fn decode(cursor: &mut Cursor<'_>) -> Result<Self> {
        let tag = cursor.take(1)?[0];
        let value = match tag {
            0xfd => {
                let n = u16::decode(cursor)? as u64;
                if n < 0xfd {
                    return Err(Error::NonCanonicalCompactSize(n));
                }
                n
            }
            0xfe => {
                let n = u32::decode(cursor)? as u64;
                if n <= 0xffff {
                    return Err(Error::NonCanonicalCompactSize(n));
                }
                n
            }
            0xff => {
                let n = u64::decode(cursor)?;
                if n <= 0xffff_ffff {
                    return Err(Error::NonCanonicalCompactSize(n));
                }
                n
            }
            n => n as u64,
        };
        Ok(CompactSize(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_values_are_one_byte() {
        assert_eq!(CompactSize(0xfc).encode(), vec![0xfc]);
    }

    #[test]
    fn boundary_values_switch_tag() {
        assert_eq!(CompactSize(0xfd).encode(), vec![0xfd, 0xfd, 0x00]);
        assert_eq!(
            CompactSize(0x1_0000).encode(),
            vec![0xfe, 0x00, 0x00, 0x01, 0x00]
        );
    }

    #[test]
    fn roundtrip() {
        for v in [0u64, 1, 0xfc, 0xfd, 0xffff, 0x1_0000, u32::MAX as u64, u64::MAX] {
            let encoded = CompactSize(v).encode();
            let decoded = CompactSize::decode_all(&encoded).unwrap();
            assert_eq!(decoded.0, v);
        }
    }

    #[test]
    fn non_canonical_is_rejected() {
        // 0xfd followed by a u16 that fits in one byte.
        let bytes = [0xfd, 0x05, 0x00];
        assert_eq!(
            CompactSize::decode_all(&bytes),
            Err(Error::NonCanonicalCompactSize(5))
        );
    }
}
