// Copyright 2026 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.

// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

//! # CBOR Codec
//!
//! A CBOR (RFC 8949) parser and encoder built around a dynamic [`Value`] tree.
//!
//! ## Features
//! - All major types 0-7, with both definite and indefinite lengths
//! - 64-bit integers in full, including negatives down to `-(2^64)`, and
//!   bignums (tags 2 and 3) beyond that
//! - Half, single and double floats kept at the width they were read, with
//!   NaN payloads (signaling or quiet) preserved across width conversions
//! - The RFC 8949 tag registry:
//!   - Date/time strings (tag 0) and epoch timestamps (tag 1)
//!   - Decimal fractions and bigfloats (tags 4 and 5)
//!   - Expected base64url/base64/base16 conversion (tags 21 to 23)
//!   - Embedded CBOR (tag 24)
//!   - URIs (tag 32), base64url and base64 text (tags 33 and 34)
//!   - Regular expressions and MIME messages (tags 35 and 36)
//!   - Self-described CBOR (tag 55799)
//! - A container/context write API with scoped indefinite-length control
//! - Keyed, indexed and scalar readers for mapping records onto values
//!
//! ## Example
//! ```rust
//! use cbor_codec::{Encoder, Map, Value, from_slice};
//!
//! let mut map = Map::new();
//! map.insert(Value::from(2u64), Value::from("b"));
//! map.insert(Value::from(1u64), Value::from("a"));
//!
//! let mut encoder = Encoder::new().with_key_order(|a, b| a.to_i128().cmp(&b.to_i128()));
//! let bytes = encoder.encode(&Value::Map(map.clone())).unwrap();
//! assert_eq!(bytes, [0xa2, 0x01, 0x61, b'a', 0x02, 0x61, b'b']);
//!
//! // Decoding keeps wire order, which is now sorted
//! let decoded = from_slice(&bytes).unwrap().unwrap();
//! assert_eq!(decoded.as_map().unwrap().get(1i64), Some(&Value::from("a")));
//! ```

pub mod access;
mod constants;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod float;
pub mod frames;
pub mod primitive;
pub mod tags;
pub mod value;

pub use access::{FromValue, IndexedReader, KeyedReader, ScalarReader};
pub use constants::{DEFAULT_MAX_ALLOCATION, DEFAULT_MAX_DEPTH};
pub use decoder::{Decoder, DecoderOptions, parse};
pub use encoder::{DateEncoding, Encoder, KeyOrder, encode};
pub use error::{CodingPath, Error, Kind, PathStep, Result};
pub use float::FloatWidth;
pub use tags::Tag;
pub use value::{Bignum, KeyRef, Map, NegativeUInt64, Value};

/// Decodes the single CBOR item in `slice`; `None` for empty input.
pub fn from_slice(slice: &[u8]) -> Result<Option<Value>> {
    parse(slice)
}

/// Encodes `value` with default settings.
pub fn to_vec(value: &Value) -> Result<Vec<u8>> {
    encode(value)
}
