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

//! Mapping a record onto CBOR by hand, the way a serialization layer would,
//! through the context write API and the keyed/indexed readers.

use cbor_codec::{
    Encoder, Error, IndexedReader, Kind, KeyedReader, PathStep, Result, ScalarReader, Value,
    from_slice,
};
use time::{OffsetDateTime, macros::datetime};

#[derive(Debug, PartialEq)]
struct Asset {
    title: String,
    size: u32,
    created: OffsetDateTime,
    thumbnail: Option<Vec<u8>>,
    ratings: Vec<f32>,
}

impl Asset {
    fn write(&self, enc: &mut Encoder) -> Result<()> {
        enc.begin_map(false);
        enc.write_str("title");
        enc.write_str(&self.title);
        enc.write_str("size");
        enc.write_u64(u64::from(self.size));
        enc.write_str("created");
        enc.write_date(self.created)?;
        enc.write_str("thumbnail");
        match &self.thumbnail {
            Some(bytes) => enc.write_bytes(bytes),
            None => enc.write_null(),
        }
        enc.write_str("ratings");
        enc.begin_array(false);
        for rating in &self.ratings {
            enc.write_f32(*rating);
        }
        enc.end_container();
        enc.end_container();
        Ok(())
    }

    fn read(value: &Value) -> Result<Self> {
        let fields = KeyedReader::new(value)?;
        let mut ratings = Vec::new();
        let mut list = fields.indexed("ratings")?;
        while !list.is_at_end() {
            ratings.push(list.read()?);
        }
        Ok(Asset {
            title: fields.read("title")?,
            size: fields.read("size")?,
            created: fields.read("created")?,
            thumbnail: fields.read_optional("thumbnail")?,
            ratings,
        })
    }
}

fn sample() -> Asset {
    Asset {
        title: "sunset.jpg".to_string(),
        size: 48213,
        created: datetime!(2024-06-01 18:30:00 UTC),
        thumbnail: None,
        ratings: vec![4.5, 3.0],
    }
}

fn encode(asset: &Asset) -> Vec<u8> {
    let mut encoder = Encoder::new();
    asset.write(&mut encoder).unwrap();
    encoder.finish()
}

#[test]
fn test_record_round_trip() {
    let asset = sample();
    let value = from_slice(&encode(&asset)).unwrap().unwrap();
    assert_eq!(Asset::read(&value).unwrap(), asset);

    let with_thumbnail = Asset {
        thumbnail: Some(vec![0xff, 0xd8]),
        ..sample()
    };
    let value = from_slice(&encode(&with_thumbnail)).unwrap().unwrap();
    assert_eq!(Asset::read(&value).unwrap(), with_thumbnail);
}

#[test]
fn test_record_in_indefinite_scope() {
    let asset = sample();
    let mut encoder = Encoder::new();
    encoder
        .with_indefinite_length(true, |enc| asset.write(enc))
        .unwrap();
    let bytes = encoder.finish();
    assert_eq!(bytes[0], 0xbf);
    assert_eq!(bytes.last(), Some(&0xff));

    let value = from_slice(&bytes).unwrap().unwrap();
    assert_eq!(Asset::read(&value).unwrap(), asset);
}

#[test]
fn test_missing_field_reports_path() {
    let mut encoder = Encoder::new();
    encoder.begin_map(false);
    encoder.write_str("title");
    encoder.write_str("x");
    encoder.end_container();
    let value = from_slice(&encoder.finish()).unwrap().unwrap();

    let err = Asset::read(&value).unwrap_err();
    assert!(err.is_value_not_found());
    assert_eq!(err.path().steps(), &[PathStep::Key("ratings".to_string())]);
}

#[test]
fn test_wrong_element_type_reports_path() {
    let mut encoder = Encoder::new();
    let mut asset_bytes = {
        sample().write(&mut encoder).unwrap();
        encoder.finish()
    };
    // last rating (single 3.0, "fa40400000") becomes the text "no"
    let tail = asset_bytes.len() - 5;
    asset_bytes.truncate(tail);
    asset_bytes.extend_from_slice(&[0x62, b'n', b'o']);
    let value = from_slice(&asset_bytes).unwrap().unwrap();

    let err = Asset::read(&value).unwrap_err();
    assert_eq!(
        err.root(),
        &Error::TypeMismatch {
            expected: vec![Kind::Float],
            actual: Kind::TextString
        }
    );
    assert_eq!(err.path().to_string(), ".ratings[1]");
}

#[test]
fn test_integer_keys_and_scalars() {
    // {1: [10, null], -2: "x"}
    let bytes = [0xa2, 0x01, 0x82, 0x0a, 0xf6, 0x21, 0x61, b'x'];
    let value = from_slice(&bytes).unwrap().unwrap();
    let fields = KeyedReader::new(&value).unwrap();

    let mut list = fields.indexed(1i64).unwrap();
    assert_eq!(list.count(), 2);
    assert_eq!(list.read::<u8>().unwrap(), 10);
    assert_eq!(list.read::<Option<u8>>().unwrap(), None);

    assert_eq!(fields.scalar(-2i64).read::<String>().unwrap(), "x");
    let err = fields.scalar(-2i64).read::<bool>().unwrap_err();
    assert_eq!(err.path().steps(), &[PathStep::IntKey(-2)]);

    let array = Value::Array(vec![Value::Null]);
    let mut reader = IndexedReader::new(&array).unwrap();
    let err = reader.read::<i64>().unwrap_err();
    assert_eq!(
        err.root(),
        &Error::ValueNotFound {
            expected: Kind::Integer
        }
    );
    assert!(ScalarReader::new(&array).read::<Vec<u8>>().unwrap_err().is_type_mismatch());
}
