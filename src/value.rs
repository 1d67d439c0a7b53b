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

use std::cmp::Ordering;
use std::fmt;

use half::f16;
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, Visitor},
    ser::{SerializeMap, SerializeStruct},
};
use time::OffsetDateTime;

use crate::error::{Error, Kind, PathStep, Result};
use crate::float;
use crate::tags::Tag;

/// Dynamic CBOR value type covering everything the wire format can carry.
///
/// Integers, floats and strings keep the distinctions the wire format makes:
/// the float width that was read, whether a string arrived in chunks, and
/// whether a negative integer needed the full 64-bit magnitude.
///
/// # Example
/// ```
/// use cbor_codec::{Map, Value, from_slice, to_vec};
///
/// let mut map = Map::new();
/// map.insert(Value::from("name"), Value::from("Alice"));
/// map.insert(Value::from("age"), Value::from(30u64));
/// let value = Value::Map(map);
///
/// let bytes = to_vec(&value).unwrap();
/// let decoded = from_slice(&bytes).unwrap();
/// assert_eq!(decoded, Some(value));
/// ```
#[derive(Debug, Clone)]
pub enum Value {
    UnsignedInt(u64),
    SignedInt(i64),
    /// Negative integer that does not fit in an `i64`.
    NegativeBig(NegativeUInt64),
    /// Integer beyond 64 bits, carried by tag 2 or 3.
    Bignum(Bignum),
    Half(f16),
    Single(f32),
    Double(f64),
    Bool(bool),
    Null,
    Undefined,
    /// Unassigned major type 7 code (0..=19 or 32..=255).
    Simple(u8),
    ByteString(Vec<u8>),
    TextString(String),
    IndefiniteByteChunks(Vec<Vec<u8>>),
    /// Chunks stay raw because a code point may straddle a chunk boundary.
    IndefiniteTextChunks(Vec<Vec<u8>>),
    Array(Vec<Value>),
    Map(Map),
    Tagged(Tag, Box<Value>),
    Date(OffsetDateTime),
    Url(String),
}

/// A negative integer `-1 - raw`, covering `-1` down to `-(2^64)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NegativeUInt64(u64);

impl NegativeUInt64 {
    /// The smallest representable value, `-(2^64)`.
    pub const MIN: NegativeUInt64 = NegativeUInt64(u64::MAX);

    pub fn new(raw: u64) -> Self {
        NegativeUInt64(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }

    pub fn to_i128(self) -> i128 {
        -1 - i128::from(self.0)
    }

    pub fn from_i128(value: i128) -> Option<Self> {
        if value >= 0 {
            return None;
        }
        u64::try_from(-1 - value).ok().map(NegativeUInt64)
    }
}

impl TryFrom<NegativeUInt64> for i64 {
    type Error = Error;

    fn try_from(value: NegativeUInt64) -> Result<i64> {
        i64::try_from(value.to_i128())
            .map_err(|_| Error::corrupted(format!("number {value} does not fit in i64")))
    }
}

impl fmt::Display for NegativeUInt64 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_i128())
    }
}

/// Arbitrary-precision integer: big-endian magnitude with the sign kept apart.
///
/// A negative bignum with content `n` represents `-1 - n`, as tag 3 does.
#[derive(Debug, Clone, Eq)]
pub struct Bignum {
    pub is_positive: bool,
    pub content: Vec<u8>,
}

impl Bignum {
    pub fn new(is_positive: bool, content: Vec<u8>) -> Self {
        Bignum {
            is_positive,
            content,
        }
    }

    /// Content with leading zero bytes stripped.
    pub fn magnitude(&self) -> &[u8] {
        let start = self
            .content
            .iter()
            .position(|&b| b != 0)
            .unwrap_or(self.content.len());
        &self.content[start..]
    }

    pub fn from_u128(value: u128) -> Self {
        Bignum::new(true, minimal_be_bytes(value))
    }

    pub fn from_i128(value: i128) -> Self {
        if value >= 0 {
            Bignum::from_u128(value.unsigned_abs())
        } else {
            // -1 - value is non-negative for every negative i128
            Bignum::new(false, minimal_be_bytes((-1 - value).unsigned_abs()))
        }
    }

    pub fn to_i128(&self) -> Option<i128> {
        let magnitude = self.magnitude();
        if magnitude.len() > 16 {
            return None;
        }
        let n = magnitude
            .iter()
            .fold(0u128, |acc, &b| (acc << 8) | u128::from(b));
        let n = i128::try_from(n).ok()?;
        Some(if self.is_positive { n } else { -1 - n })
    }
}

impl PartialEq for Bignum {
    fn eq(&self, other: &Self) -> bool {
        self.is_positive == other.is_positive && self.magnitude() == other.magnitude()
    }
}

fn minimal_be_bytes(value: u128) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    bytes[start..].to_vec()
}

/// Key used to look up a map entry by text or by integer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRef<'a> {
    Text(&'a str),
    Int(i128),
}

impl KeyRef<'_> {
    pub fn matches(&self, key: &Value) -> bool {
        match self {
            KeyRef::Text(text) => key.as_str() == Some(*text),
            KeyRef::Int(n) => key.to_i128() == Some(*n),
        }
    }

    pub fn to_step(&self) -> PathStep {
        match self {
            KeyRef::Text(text) => PathStep::Key((*text).to_string()),
            KeyRef::Int(n) => PathStep::IntKey(*n),
        }
    }
}

impl<'a> From<&'a str> for KeyRef<'a> {
    fn from(key: &'a str) -> Self {
        KeyRef::Text(key)
    }
}

impl<'a> From<&'a String> for KeyRef<'a> {
    fn from(key: &'a String) -> Self {
        KeyRef::Text(key)
    }
}

macro_rules! int_key_ref {
    ($($t:ty)*) => {
        $(impl From<$t> for KeyRef<'_> {
            fn from(key: $t) -> Self {
                KeyRef::Int(i128::from(key))
            }
        })*
    };
}

int_key_ref!(i32 i64 u32 u64 i128);

/// Insertion-ordered CBOR map.
///
/// Inserting a key that is already present replaces its value in place, so
/// duplicate keys resolve last-write-wins while the first position is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Map {
    entries: Vec<(Value, Value)>,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Map {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts an entry, returning the value it replaced if the key existed.
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get<'k>(&self, key: impl Into<KeyRef<'k>>) -> Option<&Value> {
        let key = key.into();
        self.entries
            .iter()
            .find(|(k, _)| key.matches(k))
            .map(|(_, v)| v)
    }

    /// Looks up an entry whose key equals `key` exactly.
    pub fn get_value(&self, key: &Value) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key<'k>(&self, key: impl Into<KeyRef<'k>>) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn entries(&self) -> &[(Value, Value)] {
        &self.entries
    }

    /// Stable sort of the entries by key.
    pub fn sort_by_key_order<F>(&mut self, mut compare: F)
    where
        F: FnMut(&Value, &Value) -> Ordering,
    {
        self.entries.sort_by(|a, b| compare(&a.0, &b.0));
    }
}

impl FromIterator<(Value, Value)> for Map {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        let mut map = Map::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl IntoIterator for Map {
    type Item = (Value, Value);
    type IntoIter = std::vec::IntoIter<(Value, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::UnsignedInt(_) => Kind::UnsignedInt,
            Value::SignedInt(v) if *v >= 0 => Kind::UnsignedInt,
            Value::SignedInt(_) | Value::NegativeBig(_) => Kind::NegativeInt,
            Value::Bignum(_) => Kind::Bignum,
            Value::Half(_) => Kind::Half,
            Value::Single(_) => Kind::Single,
            Value::Double(_) => Kind::Double,
            Value::Bool(_) => Kind::Bool,
            Value::Null => Kind::Null,
            Value::Undefined => Kind::Undefined,
            Value::Simple(_) => Kind::Simple,
            Value::ByteString(_) | Value::IndefiniteByteChunks(_) => Kind::ByteString,
            Value::TextString(_) | Value::IndefiniteTextChunks(_) => Kind::TextString,
            Value::Array(_) => Kind::Array,
            Value::Map(_) => Kind::Map,
            Value::Tagged(..) => Kind::Tag,
            Value::Date(_) => Kind::Date,
            Value::Url(_) => Kind::Url,
        }
    }

    /// Returns true if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true for any of the three 64-bit integer forms
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Value::UnsignedInt(_) | Value::SignedInt(_) | Value::NegativeBig(_)
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Value::Half(_) | Value::Single(_) | Value::Double(_))
    }

    pub fn is_byte_string(&self) -> bool {
        matches!(self, Value::ByteString(_) | Value::IndefiniteByteChunks(_))
    }

    fn is_integral(&self) -> bool {
        self.is_integer() || matches!(self, Value::Bignum(_))
    }

    pub fn is_text_string(&self) -> bool {
        matches!(self, Value::TextString(_) | Value::IndefiniteTextChunks(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer value of any integer form, including bignums that fit.
    pub fn to_i128(&self) -> Option<i128> {
        match self {
            Value::UnsignedInt(v) => Some(i128::from(*v)),
            Value::SignedInt(v) => Some(i128::from(*v)),
            Value::NegativeBig(n) => Some(n.to_i128()),
            Value::Bignum(b) => b.to_i128(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.to_i128().and_then(|n| u64::try_from(n).ok())
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.to_i128().and_then(|n| i64::try_from(n).ok())
    }

    /// Float value of any width, widened without touching NaN payloads.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Half(h) => Some(float::f16_to_f64(*h)),
            Value::Single(f) => Some(float::f32_to_f64(*f)),
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::ByteString(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::TextString(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_tagged(&self) -> Option<(Tag, &Value)> {
        match self {
            Value::Tagged(tag, value) => Some((*tag, value)),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<OffsetDateTime> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_url(&self) -> Option<&str> {
        match self {
            Value::Url(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_bignum(&self) -> Option<&Bignum> {
        match self {
            Value::Bignum(b) => Some(b),
            _ => None,
        }
    }

    /// Bytes of a byte string, joining chunks of an indefinite-length one.
    pub fn to_byte_vec(&self) -> Result<Vec<u8>> {
        match self {
            Value::ByteString(b) => Ok(b.clone()),
            Value::IndefiniteByteChunks(chunks) => Ok(chunks.concat()),
            other => Err(Error::mismatch(&[Kind::ByteString], other.kind())),
        }
    }

    /// Text of a text string, joining and validating chunks of an
    /// indefinite-length one.
    pub fn to_text(&self) -> Result<String> {
        match self {
            Value::TextString(s) => Ok(s.clone()),
            Value::IndefiniteTextChunks(chunks) => {
                String::from_utf8(chunks.concat()).map_err(|_| Error::InvalidUtf8)
            }
            other => Err(Error::mismatch(&[Kind::TextString], other.kind())),
        }
    }

    /// Parses the CBOR item embedded in a tag 24 payload.
    pub fn decode_embedded(&self) -> Result<Value> {
        let bytes = match self {
            Value::Tagged(Tag::EncodedCborData, payload) => payload.to_byte_vec()?,
            Value::ByteString(_) | Value::IndefiniteByteChunks(_) => self.to_byte_vec()?,
            other => return Err(Error::mismatch(&[Kind::Tag, Kind::ByteString], other.kind())),
        };
        crate::decoder::parse(&bytes)?.ok_or(Error::truncated(None))
    }
}

impl PartialEq for Value {
    /// Integers compare by numeric value whatever form they take, bignums
    /// included; floats compare by bit pattern so NaN payloads and signed
    /// zeros are significant.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bignum(a), Value::Bignum(b)) => a == b,
            (a, b) if a.is_integral() && b.is_integral() => {
                a.to_i128().is_some() && a.to_i128() == b.to_i128()
            }
            (Value::Half(a), Value::Half(b)) => a.to_bits() == b.to_bits(),
            (Value::Single(a), Value::Single(b)) => a.to_bits() == b.to_bits(),
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Null, Value::Null) | (Value::Undefined, Value::Undefined) => true,
            (Value::Simple(a), Value::Simple(b)) => a == b,
            (Value::ByteString(a), Value::ByteString(b)) => a == b,
            (Value::TextString(a), Value::TextString(b)) => a == b,
            (Value::IndefiniteByteChunks(a), Value::IndefiniteByteChunks(b)) => a == b,
            (Value::IndefiniteTextChunks(a), Value::IndefiniteTextChunks(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Tagged(t, a), Value::Tagged(u, b)) => t == u && a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Url(a), Value::Url(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

macro_rules! from_unsigned {
    ($($t:ty)*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::UnsignedInt(u64::from(v))
            }
        })*
    };
}

macro_rules! from_signed {
    ($($t:ty)*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::SignedInt(i64::from(v))
            }
        })*
    };
}

from_unsigned!(u8 u16 u32 u64);
from_signed!(i8 i16 i32 i64);

impl From<u128> for Value {
    /// Picks `UnsignedInt` when the value fits in 64 bits, `Bignum` otherwise.
    fn from(v: u128) -> Self {
        match u64::try_from(v) {
            Ok(v) => Value::UnsignedInt(v),
            Err(_) => Value::Bignum(Bignum::from_u128(v)),
        }
    }
}

impl From<i128> for Value {
    /// Picks the narrowest of `UnsignedInt`, `SignedInt`, `NegativeBig` and
    /// `Bignum` that holds the value.
    fn from(v: i128) -> Self {
        if let Ok(v) = u64::try_from(v) {
            Value::UnsignedInt(v)
        } else if let Ok(v) = i64::try_from(v) {
            Value::SignedInt(v)
        } else if let Some(n) = NegativeUInt64::from_i128(v) {
            Value::NegativeBig(n)
        } else {
            Value::Bignum(Bignum::from_i128(v))
        }
    }
}

impl From<f16> for Value {
    fn from(v: f16) -> Self {
        Value::Half(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Single(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::TextString(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::TextString(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::ByteString(v.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::ByteString(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<Map> for Value {
    fn from(v: Map) -> Self {
        Value::Map(v)
    }
}

impl From<Bignum> for Value {
    fn from(v: Bignum) -> Self {
        Value::Bignum(v)
    }
}

impl From<NegativeUInt64> for Value {
    fn from(v: NegativeUInt64) -> Self {
        Value::NegativeBig(v)
    }
}

impl From<OffsetDateTime> for Value {
    fn from(v: OffsetDateTime) -> Self {
        Value::Date(v)
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::UnsignedInt(v) => serializer.serialize_u64(*v),
            Value::SignedInt(v) => serializer.serialize_i64(*v),
            Value::NegativeBig(n) => serializer.serialize_i128(n.to_i128()),
            Value::Bignum(b) => match b.to_i128() {
                Some(n) => serializer.serialize_i128(n),
                None => {
                    let mut state = serializer.serialize_struct("Bignum", 2)?;
                    state.serialize_field("is_positive", &b.is_positive)?;
                    state.serialize_field("content", serde_bytes::Bytes::new(b.magnitude()))?;
                    state.end()
                }
            },
            Value::Half(h) => serializer.serialize_f32(float::f16_to_f32(*h)),
            Value::Single(f) => serializer.serialize_f32(*f),
            Value::Double(d) => serializer.serialize_f64(*d),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Null => serializer.serialize_none(),
            Value::Undefined => serializer.serialize_unit(),
            Value::Simple(v) => serializer.serialize_u8(*v),
            Value::ByteString(b) => serde_bytes::Bytes::new(b).serialize(serializer),
            Value::TextString(s) | Value::Url(s) => serializer.serialize_str(s),
            Value::IndefiniteByteChunks(chunks) => {
                serde_bytes::ByteBuf::from(chunks.concat()).serialize(serializer)
            }
            Value::IndefiniteTextChunks(_) => {
                let text = self.to_text().map_err(serde::ser::Error::custom)?;
                serializer.serialize_str(&text)
            }
            Value::Array(items) => items.serialize(serializer),
            Value::Map(map) => {
                let mut state = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map.iter() {
                    state.serialize_entry(k, v)?;
                }
                state.end()
            }
            Value::Tagged(tag, payload) => match (tag.expected_text(payload), payload.as_ref()) {
                // Expected-conversion tags turn their byte string into text
                (Some(text), _) => serializer.serialize_str(&text),
                (None, inner) => inner.serialize(serializer),
            },
            Value::Date(d) => {
                let text = crate::primitive::format_rfc3339(*d).map_err(serde::ser::Error::custom)?;
                serializer.serialize_str(&text)
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any valid CBOR value")
            }

            fn visit_bool<E>(self, value: bool) -> std::result::Result<Value, E> {
                Ok(Value::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> std::result::Result<Value, E> {
                Ok(Value::from(i128::from(value)))
            }

            fn visit_i128<E>(self, value: i128) -> std::result::Result<Value, E> {
                Ok(Value::from(value))
            }

            fn visit_u64<E>(self, value: u64) -> std::result::Result<Value, E> {
                Ok(Value::UnsignedInt(value))
            }

            fn visit_u128<E>(self, value: u128) -> std::result::Result<Value, E> {
                Ok(Value::from(value))
            }

            fn visit_f32<E>(self, value: f32) -> std::result::Result<Value, E> {
                Ok(Value::Single(value))
            }

            fn visit_f64<E>(self, value: f64) -> std::result::Result<Value, E> {
                Ok(Value::Double(value))
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<Value, E>
            where
                E: de::Error,
            {
                Ok(Value::TextString(value.to_owned()))
            }

            fn visit_string<E>(self, value: String) -> std::result::Result<Value, E> {
                Ok(Value::TextString(value))
            }

            fn visit_bytes<E>(self, value: &[u8]) -> std::result::Result<Value, E>
            where
                E: de::Error,
            {
                Ok(Value::ByteString(value.to_vec()))
            }

            fn visit_byte_buf<E>(self, value: Vec<u8>) -> std::result::Result<Value, E> {
                Ok(Value::ByteString(value))
            }

            fn visit_none<E>(self) -> std::result::Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> std::result::Result<Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_unit<E>(self) -> std::result::Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_seq<V>(self, mut visitor: V) -> std::result::Result<Value, V::Error>
            where
                V: de::SeqAccess<'de>,
            {
                let mut vec = Vec::new();
                while let Some(elem) = visitor.next_element()? {
                    vec.push(elem);
                }
                Ok(Value::Array(vec))
            }

            fn visit_map<V>(self, mut visitor: V) -> std::result::Result<Value, V::Error>
            where
                V: de::MapAccess<'de>,
            {
                let mut map = Map::new();
                while let Some((key, value)) = visitor.next_entry()? {
                    map.insert(key, value);
                }
                Ok(Value::Map(map))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_forms_compare_by_value() {
        assert_eq!(Value::UnsignedInt(5), Value::SignedInt(5));
        assert_eq!(Value::SignedInt(-1), Value::NegativeBig(NegativeUInt64::new(0)));
        assert_ne!(Value::UnsignedInt(1), Value::Double(1.0));
    }

    #[test]
    fn test_small_bignums_equal_integers() {
        let one = Value::Bignum(Bignum::new(true, vec![1]));
        assert_eq!(one, Value::UnsignedInt(1));
        assert_eq!(Value::UnsignedInt(1), one);
        let minus_257 = Value::Bignum(Bignum::new(false, vec![1, 0]));
        assert_eq!(minus_257, Value::SignedInt(-257));
        assert_ne!(minus_257, Value::SignedInt(257));

        let huge = Value::Bignum(Bignum::new(true, vec![0xff; 17]));
        assert_ne!(huge, Value::UnsignedInt(u64::MAX));
        assert_eq!(huge, huge.clone());
    }

    #[test]
    fn test_floats_compare_by_bits() {
        let nan = Value::Half(f16::from_bits(0x7d00));
        assert_eq!(nan, nan.clone());
        assert_ne!(nan, Value::Half(f16::from_bits(0x7e00)));
        assert_ne!(Value::Double(0.0), Value::Double(-0.0));
    }

    #[test]
    fn test_negative_uint64_bounds() {
        let min = NegativeUInt64::MIN;
        assert_eq!(min.to_i128(), -(1i128 << 64));
        assert!(i64::try_from(min).is_err());

        let edge = NegativeUInt64::new(i64::MAX as u64);
        assert_eq!(i64::try_from(edge).unwrap(), i64::MIN);
        assert!(i64::try_from(NegativeUInt64::new(i64::MAX as u64 + 1)).is_err());

        assert_eq!(NegativeUInt64::from_i128(-1), Some(NegativeUInt64::new(0)));
        assert_eq!(NegativeUInt64::from_i128(-(1i128 << 64) - 1), None);
        assert_eq!(min.to_string(), "-18446744073709551616");
    }

    #[test]
    fn test_from_i128_picks_narrowest() {
        assert!(matches!(Value::from(7i128), Value::UnsignedInt(7)));
        assert!(matches!(Value::from(-7i128), Value::SignedInt(-7)));
        assert!(matches!(
            Value::from(-(1i128 << 64)),
            Value::NegativeBig(n) if n.raw() == u64::MAX
        ));
        match Value::from(-(1i128 << 64) - 1) {
            Value::Bignum(b) => {
                assert!(!b.is_positive);
                assert_eq!(b.content, vec![1, 0, 0, 0, 0, 0, 0, 0, 0]);
            }
            other => panic!("unexpected {other:?}"),
        }
        match Value::from(1u128 << 64) {
            Value::Bignum(b) => {
                assert!(b.is_positive);
                assert_eq!(b.content, vec![1, 0, 0, 0, 0, 0, 0, 0, 0]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_bignum_equality_ignores_leading_zeros() {
        let a = Bignum::new(true, vec![0, 0, 1, 0]);
        let b = Bignum::new(true, vec![1, 0]);
        assert_eq!(a, b);
        assert_eq!(a.to_i128(), Some(256));
        assert_ne!(a, Bignum::new(false, vec![1, 0]));
        assert_eq!(Bignum::new(false, vec![1, 0]).to_i128(), Some(-257));
        assert_eq!(Bignum::new(true, vec![0xff; 17]).to_i128(), None);
    }

    #[test]
    fn test_map_last_write_wins_keeps_position() {
        let mut map = Map::new();
        map.insert(Value::from("a"), Value::from(1u64));
        map.insert(Value::from(2u64), Value::from("two"));
        let old = map.insert(Value::from("a"), Value::from(3u64));

        assert_eq!(old, Some(Value::from(1u64)));
        assert_eq!(map.len(), 2);
        assert_eq!(map.entries()[0].1, Value::from(3u64));
        assert_eq!(map.get("a"), Some(&Value::from(3u64)));
        assert_eq!(map.get(2i64), Some(&Value::from("two")));
        assert!(map.get("b").is_none());
    }

    #[test]
    fn test_map_sort_is_stable() {
        let mut map: Map = vec![
            (Value::from(3u64), Value::from("c")),
            (Value::from(1u64), Value::from("a")),
            (Value::from(2u64), Value::from("b")),
        ]
        .into_iter()
        .collect();
        map.sort_by_key_order(|a, b| a.to_i128().cmp(&b.to_i128()));
        let keys: Vec<_> = map.keys().filter_map(Value::as_u64).collect();
        assert_eq!(keys, vec![1, 2, 3]);
    }

    #[test]
    fn test_text_chunks_join() {
        // "ü" split across two chunks
        let value = Value::IndefiniteTextChunks(vec![vec![0xc3], vec![0xbc]]);
        assert_eq!(value.to_text().unwrap(), "\u{00fc}");

        let bad = Value::IndefiniteTextChunks(vec![vec![0xc3]]);
        assert_eq!(bad.to_text(), Err(Error::InvalidUtf8));
    }

    #[test]
    fn test_value_to_json() {
        let mut map = Map::new();
        map.insert(Value::from("name"), Value::from("Alice"));
        map.insert(Value::from("tags"), Value::Array(vec![Value::from(1u64), Value::Null]));
        let json = serde_json::to_string(&Value::Map(map)).unwrap();
        assert_eq!(json, r#"{"name":"Alice","tags":[1,null]}"#);
    }

    #[test]
    fn test_huge_bignum_to_json_keeps_sign() {
        let negative = Value::Bignum(Bignum::new(
            false,
            vec![0, 0x80, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        ));
        let json = serde_json::to_value(&negative).unwrap();
        assert_eq!(json["is_positive"], serde_json::Value::Bool(false));
        assert_eq!(json["content"].as_array().unwrap().len(), 16);

        let positive = Value::Bignum(Bignum::new(true, vec![2; 17]));
        let json = serde_json::to_value(&positive).unwrap();
        assert_eq!(json["is_positive"], serde_json::Value::Bool(true));

        let small = Value::Bignum(Bignum::new(false, vec![1, 0]));
        assert_eq!(serde_json::to_string(&small).unwrap(), "-257");
    }

    #[test]
    fn test_expected_conversion_to_json() {
        let value = Value::Tagged(
            Tag::Base16Conversion,
            Box::new(Value::ByteString(vec![0x01, 0xab])),
        );
        assert_eq!(serde_json::to_string(&value).unwrap(), r#""01AB""#);
    }

    #[test]
    fn test_value_from_json() {
        let value: Value = serde_json::from_str(r#"{"b": [1, -2, 2.5], "a": null}"#).unwrap();
        let map = value.as_map().unwrap();
        let keys: Vec<_> = map.keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(
            map.get("b"),
            Some(&Value::Array(vec![
                Value::from(1u64),
                Value::from(-2i64),
                Value::Double(2.5)
            ]))
        );
    }
}
