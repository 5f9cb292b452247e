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

//! Wire-format encode/decode traits.
//!
//! Unlike a SCALE-style codec, the wire format here is fixed by spec §6: little
//! endian fixed-width integers and Bitcoin-style compact-size ("varint") length
//! prefixes for vectors and byte strings. This crate reproduces that format
//! exactly rather than reaching for a generic derive-based codec, because the
//! chain's wire format predates this implementation and must round-trip
//! byte-for-byte with it.

mod compact_size;
mod cursor;

pub use compact_size::CompactSize;
pub use cursor::Cursor;

#[derive(thiserror::Error, Debug, PartialEq, Eq, Clone)]
pub enum Error {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("compact-size value {0} is not in canonical encoding")]
    NonCanonicalCompactSize(u64),
    #[error("length {0} exceeds the configured maximum {1}")]
    TooLong(usize, usize),
}

pub type Result<T> = core::result::Result<T, Error>;

/// Serialize `self` into the wire format.
pub trait Encode {
    fn encode_to(&self, buf: &mut Vec<u8>);

    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode_to(&mut buf);
        buf
    }
}

/// Deserialize `Self` from the wire format.
pub trait Decode: Sized {
    fn decode(cursor: &mut Cursor<'_>) -> Result<Self>;

    fn decode_all(data: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(data);
        Self::decode(&mut cursor)
    }
}

macro_rules! impl_int {
    ($($t:ty),* $(,)?) => {
        $(
            impl Encode for $t {
                fn encode_to(&self, buf: &mut Vec<u8>) {
                    buf.extend_from_slice(&self.to_le_bytes());
                }
            }

            impl Decode for $t {
                fn decode(cursor: &mut Cursor<'_>) -> Result<Self> {
                    let bytes = cursor.take(core::mem::size_of::<$t>())?;
                    let mut arr = [0u8; core::mem::size_of::<$t>()];
                    arr.copy_from_slice(bytes);
                    Ok(<$t>::from_le_bytes(arr))
                }
            }
        )*
    };
}

impl_int!(u8, u16, u32, u64, i8, i16, i32, i64);

impl Encode for bool {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        buf.push(*self as u8);
    }
}

impl Decode for bool {
    fn decode(cursor: &mut Cursor<'_>) -> Result<Self> {
        Ok(u8::decode(cursor)? != 0)
    }
}

/// A raw byte string, compact-size length prefixed (used for scripts).
impl Encode for Vec<u8> {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        CompactSize(self.len() as u64).encode_to(buf);
        buf.extend_from_slice(self);
    }
}

impl Decode for Vec<u8> {
    fn decode(cursor: &mut Cursor<'_>) -> Result<Self> {
        let len = CompactSize::decode(cursor)?.0 as usize;
        Ok(cursor.take(len)?.to_vec())
    }
}

/// A compact-size-prefixed vector of encodable elements.
impl<T: Encode> Encode for Vec<T>
where
    T: EncodeAsElement,
{
    fn encode_to(&self, buf: &mut Vec<u8>) {
        CompactSize(self.len() as u64).encode_to(buf);
        for item in self {
            item.encode_to(buf);
        }
    }
}

/// Marker used to select the vector-of-elements [`Encode`] impl instead of the
/// raw-bytes impl for `Vec<u8>`. Every element type except `u8` opts in.
pub trait EncodeAsElement: Encode {}

impl<T: Decode + EncodeAsElement> Decode for Vec<T> {
    fn decode(cursor: &mut Cursor<'_>) -> Result<Self> {
        let len = CompactSize::decode(cursor)?.0 as usize;
        let mut out = Vec::with_capacity(len.min(1 << 20));
        for _ in 0..len {
            out.push(T::decode(cursor)?);
        }
        Ok(out)
    }
}

/// A fixed-size byte array, encoded/decoded with no length prefix.
pub struct FixedBytes<const N: usize>(pub [u8; N]);

impl<const N: usize> Encode for FixedBytes<N> {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.0);
    }
}

impl<const N: usize> Decode for FixedBytes<N> {
    fn decode(cursor: &mut Cursor<'_>) -> Result<Self> {
        let bytes = cursor.take(N)?;
        let mut arr = [0u8; N];
        arr.copy_from_slice(bytes);
        Ok(FixedBytes(arr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_ints() {
        let buf = 0x0102_0304_u32.encode();
        assert_eq!(buf, vec![0x04, 0x03, 0x02, 0x01]);
        let back = u32::decode_all(&buf).unwrap();
        assert_eq!(back, 0x0102_0304);
    }

    #[test]
    fn roundtrip_bytes() {
        let v: Vec<u8> = vec![1, 2, 3, 4, 5];
        let buf = v.encode();
        let back = Vec::<u8>::decode_all(&buf).unwrap();
        assert_eq!(v, back);
    }

    #[test]
    fn eof_is_reported() {
        let mut cursor = Cursor::new(&[0x01]);
        assert_eq!(u32::decode(&mut cursor), Err(Error::UnexpectedEof));
    }
}
