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

//! Readers over a decoded [`Value`] for code that maps records onto CBOR.
//!
//! [`KeyedReader`] walks a map by key, [`IndexedReader`] walks an array in
//! order and [`ScalarReader`] reads a single value. Every error they return
//! carries the coding path of the field that failed.
//!
//! ```
//! use cbor_codec::{KeyedReader, from_slice};
//!
//! // {"name": "Alice", "scores": [90, 85]}
//! let bytes = [
//!     0xa2, 0x64, b'n', b'a', b'm', b'e', 0x65, b'A', b'l', b'i', b'c', b'e',
//!     0x66, b's', b'c', b'o', b'r', b'e', b's', 0x82, 0x18, 0x5a, 0x18, 0x55,
//! ];
//! let value = from_slice(&bytes).unwrap().unwrap();
//! let reader = KeyedReader::new(&value).unwrap();
//! let name: String = reader.read("name").unwrap();
//! let mut scores = reader.indexed("scores").unwrap();
//! let first: u8 = scores.read().unwrap();
//! assert_eq!((name.as_str(), first), ("Alice", 90));
//! ```

use half::f16;
use time::OffsetDateTime;

use crate::error::{CodingPath, Error, Kind, PathStep, Result};
use crate::float;
use crate::value::{Bignum, KeyRef, Map, Value};

static NULL: Value = Value::Null;

/// Conversion from a decoded value into a Rust type.
pub trait FromValue: Sized {
    /// What a missing or null value is reported as.
    const KIND: Kind;
    /// Whether null is a legitimate value rather than a missing one.
    const NULLABLE: bool = false;

    fn from_value(value: &Value) -> Result<Self>;
}

fn decode<T: FromValue>(value: &Value) -> Result<T> {
    if !T::NULLABLE && matches!(value, Value::Null | Value::Undefined) {
        return Err(Error::ValueNotFound { expected: T::KIND });
    }
    T::from_value(value)
}

impl<T: FromValue> FromValue for Option<T> {
    const KIND: Kind = T::KIND;
    const NULLABLE: bool = true;

    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Null | Value::Undefined => Ok(None),
            other => decode(other).map(Some),
        }
    }
}

impl FromValue for Value {
    const KIND: Kind = Kind::Null;
    const NULLABLE: bool = true;

    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

impl FromValue for bool {
    const KIND: Kind = Kind::Bool;

    fn from_value(value: &Value) -> Result<Self> {
        value
            .as_bool()
            .ok_or_else(|| Error::mismatch(&[Kind::Bool], value.kind()))
    }
}

fn integer(value: &Value) -> Result<i128> {
    match value {
        Value::Bignum(b) => b
            .to_i128()
            .ok_or_else(|| Error::corrupted("bignum does not fit in 128 bits")),
        other => other
            .to_i128()
            .ok_or_else(|| Error::mismatch(&[Kind::Integer], other.kind())),
    }
}

macro_rules! from_value_int {
    ($($t:ty)*) => {
        $(impl FromValue for $t {
            const KIND: Kind = Kind::Integer;

            fn from_value(value: &Value) -> Result<Self> {
                let n = integer(value)?;
                <$t>::try_from(n).map_err(|_| {
                    Error::corrupted(format!("number {n} does not fit in {}", stringify!($t)))
                })
            }
        })*
    };
}

from_value_int!(u8 u16 u32 u64 usize i8 i16 i32 i64 isize i128);

impl FromValue for f64 {
    const KIND: Kind = Kind::Float;

    fn from_value(value: &Value) -> Result<Self> {
        value
            .as_f64()
            .ok_or_else(|| Error::mismatch(&[Kind::Float], value.kind()))
    }
}

impl FromValue for f32 {
    const KIND: Kind = Kind::Float;

    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Half(h) => Ok(float::f16_to_f32(*h)),
            Value::Single(f) => Ok(*f),
            Value::Double(d) => float::f64_to_f32(*d),
            other => Err(Error::mismatch(&[Kind::Float], other.kind())),
        }
    }
}

impl FromValue for f16 {
    const KIND: Kind = Kind::Float;

    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Half(h) => Ok(*h),
            Value::Single(f) => float::f32_to_f16(*f),
            Value::Double(d) => float::f64_to_f16(*d),
            other => Err(Error::mismatch(&[Kind::Float], other.kind())),
        }
    }
}

impl FromValue for String {
    const KIND: Kind = Kind::TextString;

    fn from_value(value: &Value) -> Result<Self> {
        value.to_text()
    }
}

impl FromValue for Vec<u8> {
    const KIND: Kind = Kind::ByteString;

    fn from_value(value: &Value) -> Result<Self> {
        value.to_byte_vec()
    }
}

impl FromValue for OffsetDateTime {
    const KIND: Kind = Kind::Date;

    fn from_value(value: &Value) -> Result<Self> {
        value
            .as_date()
            .ok_or_else(|| Error::mismatch(&[Kind::Date], value.kind()))
    }
}

impl FromValue for Bignum {
    const KIND: Kind = Kind::Bignum;

    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Bignum(b) => Ok(b.clone()),
            other => other
                .to_i128()
                .map(Bignum::from_i128)
                .ok_or_else(|| Error::mismatch(&[Kind::Bignum, Kind::Integer], other.kind())),
        }
    }
}

/// Reads fields of a map by key.
#[derive(Debug, Clone)]
pub struct KeyedReader<'a> {
    map: &'a Map,
    path: CodingPath,
}

impl<'a> KeyedReader<'a> {
    pub fn new(value: &'a Value) -> Result<Self> {
        Self::at(value, CodingPath::new())
    }

    fn at(value: &'a Value, path: CodingPath) -> Result<Self> {
        match value {
            Value::Map(map) => Ok(KeyedReader { map, path }),
            Value::Null | Value::Undefined => Err(Error::ValueNotFound {
                expected: Kind::Map,
            }
            .at_path(&path)),
            other => Err(Error::mismatch(&[Kind::Map], other.kind()).at_path(&path)),
        }
    }

    pub fn path(&self) -> &CodingPath {
        &self.path
    }

    pub fn keys(&self) -> impl Iterator<Item = &'a Value> {
        self.map.keys()
    }

    pub fn contains<'k>(&self, key: impl Into<KeyRef<'k>>) -> bool {
        self.map.contains_key(key)
    }

    /// True when the key is missing or holds null.
    pub fn is_nil<'k>(&self, key: impl Into<KeyRef<'k>>) -> bool {
        matches!(
            self.map.get(key),
            None | Some(Value::Null) | Some(Value::Undefined)
        )
    }

    fn entry<'k>(&self, key: impl Into<KeyRef<'k>>) -> (Option<&'a Value>, CodingPath) {
        let key = key.into();
        (self.map.get(key), self.path.child(key.to_step()))
    }

    /// Reads a field. A missing key reads as null, so only optional types
    /// accept it.
    pub fn read<'k, T: FromValue>(&self, key: impl Into<KeyRef<'k>>) -> Result<T> {
        let (value, path) = self.entry(key);
        decode(value.unwrap_or(&NULL)).map_err(|e| e.at_path(&path))
    }

    pub fn read_optional<'k, T: FromValue>(&self, key: impl Into<KeyRef<'k>>) -> Result<Option<T>> {
        self.read::<Option<T>>(key)
    }

    pub fn keyed<'k>(&self, key: impl Into<KeyRef<'k>>) -> Result<KeyedReader<'a>> {
        let (value, path) = self.entry(key);
        KeyedReader::at(value.unwrap_or(&NULL), path)
    }

    pub fn indexed<'k>(&self, key: impl Into<KeyRef<'k>>) -> Result<IndexedReader<'a>> {
        let (value, path) = self.entry(key);
        IndexedReader::at(value.unwrap_or(&NULL), path)
    }

    pub fn scalar<'k>(&self, key: impl Into<KeyRef<'k>>) -> ScalarReader<'a> {
        let (value, path) = self.entry(key);
        ScalarReader {
            value: value.unwrap_or(&NULL),
            path,
        }
    }
}

/// Reads the elements of an array in order.
#[derive(Debug, Clone)]
pub struct IndexedReader<'a> {
    items: &'a [Value],
    index: usize,
    path: CodingPath,
}

impl<'a> IndexedReader<'a> {
    pub fn new(value: &'a Value) -> Result<Self> {
        Self::at(value, CodingPath::new())
    }

    fn at(value: &'a Value, path: CodingPath) -> Result<Self> {
        match value {
            Value::Array(items) => Ok(IndexedReader {
                items,
                index: 0,
                path,
            }),
            Value::Null | Value::Undefined => Err(Error::ValueNotFound {
                expected: Kind::Array,
            }
            .at_path(&path)),
            other => Err(Error::mismatch(&[Kind::Array], other.kind()).at_path(&path)),
        }
    }

    pub fn path(&self) -> &CodingPath {
        &self.path
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn is_at_end(&self) -> bool {
        self.index >= self.items.len()
    }

    fn next_item(&mut self, expected: Kind) -> Result<(&'a Value, CodingPath)> {
        let path = self.path.child(PathStep::Index(self.index));
        let item = self
            .items
            .get(self.index)
            .ok_or_else(|| Error::ValueNotFound { expected }.at_path(&path))?;
        self.index += 1;
        Ok((item, path))
    }

    /// Consumes the next element if it is null.
    pub fn is_nil(&mut self) -> bool {
        let nil = matches!(
            self.items.get(self.index),
            Some(Value::Null) | Some(Value::Undefined)
        );
        if nil {
            self.index += 1;
        }
        nil
    }

    pub fn read<T: FromValue>(&mut self) -> Result<T> {
        let (item, path) = self.next_item(T::KIND)?;
        decode(item).map_err(|e| e.at_path(&path))
    }

    pub fn keyed(&mut self) -> Result<KeyedReader<'a>> {
        let (item, path) = self.next_item(Kind::Map)?;
        KeyedReader::at(item, path)
    }

    pub fn indexed(&mut self) -> Result<IndexedReader<'a>> {
        let (item, path) = self.next_item(Kind::Array)?;
        IndexedReader::at(item, path)
    }
}

/// Reads a single value. Reading consumes the reader, so a slot is read at
/// most once.
#[derive(Debug, Clone)]
pub struct ScalarReader<'a> {
    value: &'a Value,
    path: CodingPath,
}

impl<'a> ScalarReader<'a> {
    pub fn new(value: &'a Value) -> Self {
        ScalarReader {
            value,
            path: CodingPath::new(),
        }
    }

    pub fn path(&self) -> &CodingPath {
        &self.path
    }

    pub fn value(&self) -> &'a Value {
        self.value
    }

    pub fn is_nil(&self) -> bool {
        matches!(self.value, Value::Null | Value::Undefined)
    }

    pub fn read<T: FromValue>(self) -> Result<T> {
        decode(self.value).map_err(|e| e.at_path(&self.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Value {
        let mut inner = Map::new();
        inner.insert(Value::from("ok"), Value::from(true));
        let mut map = Map::new();
        map.insert(Value::from("name"), Value::from("widget"));
        map.insert(Value::from(7u64), Value::from(300u64));
        map.insert(Value::from("missing"), Value::Null);
        map.insert(
            Value::from("list"),
            Value::Array(vec![Value::from(1u64), Value::Null, Value::Map(inner)]),
        );
        Value::Map(map)
    }

    #[test]
    fn test_keyed_reads() {
        let value = sample();
        let reader = KeyedReader::new(&value).unwrap();
        assert_eq!(reader.read::<String>("name").unwrap(), "widget");
        assert_eq!(reader.read::<u16>(7u64).unwrap(), 300);
        assert!(reader.contains("missing"));
        assert!(reader.is_nil("missing"));
        assert!(reader.is_nil("absent"));
        assert_eq!(reader.read_optional::<u32>("missing").unwrap(), None);
        assert_eq!(reader.read_optional::<u32>("absent").unwrap(), None);
    }

    #[test]
    fn test_null_for_required_field() {
        let value = sample();
        let reader = KeyedReader::new(&value).unwrap();
        let err = reader.read::<u32>("missing").unwrap_err();
        assert_eq!(
            err.root(),
            &Error::ValueNotFound {
                expected: Kind::Integer
            }
        );
        assert_eq!(err.path().steps(), &[PathStep::Key("missing".to_string())]);
    }

    #[test]
    fn test_narrowing_overflow() {
        let value = sample();
        let reader = KeyedReader::new(&value).unwrap();
        let err = reader.read::<u8>(7u64).unwrap_err();
        assert!(err.is_data_corrupted());
        assert_eq!(err.path().to_string(), "[7]");
    }

    #[test]
    fn test_nested_readers_extend_path() {
        let value = sample();
        let reader = KeyedReader::new(&value).unwrap();
        let mut list = reader.indexed("list").unwrap();
        assert_eq!(list.count(), 3);
        assert_eq!(list.read::<i32>().unwrap(), 1);
        assert!(list.is_nil());
        let inner = list.keyed().unwrap();
        let err = inner.read::<String>("ok").unwrap_err();
        assert!(err.is_type_mismatch());
        assert_eq!(err.path().to_string(), ".list[2].ok");
        assert!(list.is_at_end());

        let err = list.read::<bool>().unwrap_err();
        assert!(err.is_value_not_found());
        assert_eq!(err.path().to_string(), ".list[3]");
    }

    #[test]
    fn test_wrong_container_kind() {
        let value = sample();
        let reader = KeyedReader::new(&value).unwrap();
        let err = reader.keyed("name").unwrap_err();
        assert_eq!(err.root(), &Error::mismatch(&[Kind::Map], Kind::TextString));
        assert!(IndexedReader::new(&value).unwrap_err().is_type_mismatch());
    }

    #[test]
    fn test_scalar_reader() {
        let value = Value::Double(0.5);
        assert_eq!(ScalarReader::new(&value).read::<f32>().unwrap(), 0.5);
        assert_eq!(
            ScalarReader::new(&value).read::<f16>().unwrap(),
            f16::from_f32(0.5)
        );
        let value = Value::Double(0.1);
        assert!(ScalarReader::new(&value).read::<f32>().unwrap_err().is_data_corrupted());
        assert!(ScalarReader::new(&NULL).read::<f64>().unwrap_err().is_value_not_found());
        assert_eq!(ScalarReader::new(&NULL).read::<Option<f64>>().unwrap(), None);
    }
}
