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

//! Stateless encoding and decoding of single CBOR items.
//!
//! Decoders take the input starting at the item's initial byte and return
//! the value together with the number of bytes consumed. Encoders append to
//! a `Vec<u8>`.

use half::f16;
use time::{Duration, OffsetDateTime, PrimitiveDateTime, UtcOffset, macros::format_description};

use crate::constants::*;
use crate::error::{Error, Kind, Result};
use crate::tags::Tag;
use crate::value::{NegativeUInt64, Value};

/// A decoded initial byte and its argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub major: u8,
    pub info: u8,
    /// `None` for the indefinite-length marker.
    pub argument: Option<u64>,
    /// Bytes taken by the header, including the initial byte.
    pub len: usize,
}

fn take(data: &[u8], start: usize, count: usize, expected: Option<Kind>) -> Result<&[u8]> {
    start
        .checked_add(count)
        .and_then(|end| data.get(start..end))
        .ok_or(Error::truncated(expected))
}

/// The kind a header announces, used for mismatch reports.
pub fn kind_of(major: u8, info: u8) -> Kind {
    match (major, info) {
        (MAJOR_UNSIGNED, _) => Kind::UnsignedInt,
        (MAJOR_NEGATIVE, _) => Kind::NegativeInt,
        (MAJOR_BYTES, _) => Kind::ByteString,
        (MAJOR_TEXT, _) => Kind::TextString,
        (MAJOR_ARRAY, _) => Kind::Array,
        (MAJOR_MAP, _) => Kind::Map,
        (MAJOR_TAG, _) => Kind::Tag,
        (_, FALSE | TRUE) => Kind::Bool,
        (_, NULL) => Kind::Null,
        (_, UNDEFINED) => Kind::Undefined,
        (_, FLOAT16) => Kind::Half,
        (_, FLOAT32) => Kind::Single,
        (_, FLOAT64) => Kind::Double,
        (_, INDEFINITE) => Kind::Break,
        _ => Kind::Simple,
    }
}

/// Reads the initial byte and any argument bytes that follow it.
pub fn read_header(data: &[u8], expected: Option<Kind>) -> Result<Header> {
    let initial = *data.first().ok_or(Error::truncated(expected))?;
    let major = initial >> 5;
    let info = initial & 0x1f;
    let (argument, len) = match info {
        0..=23 => (Some(u64::from(info)), 1),
        ONE_BYTE => (Some(u64::from(take(data, 1, 1, expected)?[0])), 2),
        TWO_BYTES => {
            let b = take(data, 1, 2, expected)?;
            (Some(u64::from(u16::from_be_bytes([b[0], b[1]]))), 3)
        }
        FOUR_BYTES => {
            let b = take(data, 1, 4, expected)?;
            (Some(u64::from(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))), 5)
        }
        EIGHT_BYTES => {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(take(data, 1, 8, expected)?);
            (Some(u64::from_be_bytes(buf)), 9)
        }
        INDEFINITE => (None, 1),
        _ => {
            return Err(Error::corrupted(format!(
                "reserved additional info {info} in initial byte {initial:#04x}"
            )));
        }
    };
    Ok(Header {
        major,
        info,
        argument,
        len,
    })
}

fn expect_major(header: &Header, major: u8, expected: Kind) -> Result<()> {
    if header.major == major {
        Ok(())
    } else {
        Err(Error::mismatch(&[expected], kind_of(header.major, header.info)))
    }
}

fn definite(header: &Header, kind: Kind) -> Result<u64> {
    header
        .argument
        .ok_or_else(|| Error::corrupted(format!("indefinite length is not allowed for {kind}")))
}

/// Writes a header with the shortest argument encoding for `value`.
pub fn write_header(out: &mut Vec<u8>, major: u8, value: u64) {
    let major = major << 5;
    if value < 24 {
        out.push(major | value as u8);
    } else if value < 256 {
        out.push(major | ONE_BYTE);
        out.push(value as u8);
    } else if value < 65536 {
        out.push(major | TWO_BYTES);
        out.extend_from_slice(&(value as u16).to_be_bytes());
    } else if value < 4294967296 {
        out.push(major | FOUR_BYTES);
        out.extend_from_slice(&(value as u32).to_be_bytes());
    } else {
        out.push(major | EIGHT_BYTES);
        out.extend_from_slice(&value.to_be_bytes());
    }
}

pub fn write_indefinite_header(out: &mut Vec<u8>, major: u8) {
    out.push((major << 5) | INDEFINITE);
}

pub fn write_break(out: &mut Vec<u8>) {
    out.push(BREAK);
}

pub fn decode_unsigned(data: &[u8]) -> Result<(u64, usize)> {
    let header = read_header(data, Some(Kind::UnsignedInt))?;
    expect_major(&header, MAJOR_UNSIGNED, Kind::UnsignedInt)?;
    Ok((definite(&header, Kind::UnsignedInt)?, header.len))
}

/// Decodes a major type 1 integer, falling back to `NegativeBig` when the
/// value is below `i64::MIN`.
pub fn decode_negative(data: &[u8]) -> Result<(Value, usize)> {
    let header = read_header(data, Some(Kind::NegativeInt))?;
    expect_major(&header, MAJOR_NEGATIVE, Kind::NegativeInt)?;
    let raw = definite(&header, Kind::NegativeInt)?;
    let value = match i64::try_from(raw) {
        Ok(magnitude) => Value::SignedInt(-1 - magnitude),
        Err(_) => Value::NegativeBig(NegativeUInt64::new(raw)),
    };
    Ok((value, header.len))
}

/// Decodes either integer major type.
pub fn decode_integer(data: &[u8]) -> Result<(Value, usize)> {
    match data.first().map(|b| b >> 5) {
        Some(MAJOR_NEGATIVE) => decode_negative(data),
        Some(MAJOR_UNSIGNED) | None => {
            decode_unsigned(data).map(|(v, len)| (Value::UnsignedInt(v), len))
        }
        Some(major) => Err(Error::mismatch(
            &[Kind::Integer],
            kind_of(major, data[0] & 0x1f),
        )),
    }
}

pub fn encode_unsigned(out: &mut Vec<u8>, value: u64) {
    write_header(out, MAJOR_UNSIGNED, value);
}

pub fn encode_signed(out: &mut Vec<u8>, value: i64) {
    if value >= 0 {
        write_header(out, MAJOR_UNSIGNED, value as u64);
    } else {
        // -1 - value never overflows for a negative i64
        write_header(out, MAJOR_NEGATIVE, (-1 - value) as u64);
    }
}

pub fn encode_negative(out: &mut Vec<u8>, value: NegativeUInt64) {
    write_header(out, MAJOR_NEGATIVE, value.raw());
}

fn check_declared_len(len: u64, limit: usize, kind: Kind) -> Result<usize> {
    match usize::try_from(len) {
        Ok(len) if len <= limit => Ok(len),
        _ => Err(Error::corrupted(format!(
            "{kind} length {len} exceeds maximum allowed {limit}"
        ))),
    }
}

/// Reads the chunks of an indefinite-length string up to its break.
/// `start` is the offset just past the `0x5f`/`0x7f` header.
fn read_chunks(data: &[u8], start: usize, major: u8, kind: Kind, limit: usize) -> Result<(Vec<Vec<u8>>, usize)> {
    let mut chunks = Vec::new();
    let mut total = 0usize;
    let mut pos = start;
    loop {
        match data.get(pos) {
            None => return Err(Error::truncated(Some(kind))),
            Some(&BREAK) => return Ok((chunks, pos + 1)),
            Some(_) => {}
        }
        let header = read_header(&data[pos..], Some(kind))?;
        if header.major != major {
            return Err(Error::corrupted(format!("{kind} chunks must be {kind}s")));
        }
        let len = header.argument.ok_or_else(|| {
            Error::corrupted(format!("nested indefinite-length {kind} chunk"))
        })?;
        let len = check_declared_len(len, limit.saturating_sub(total), kind)?;
        let chunk = take(data, pos + header.len, len, Some(kind))?;
        total += len;
        chunks.push(chunk.to_vec());
        pos += header.len + len;
    }
}

/// Decodes a byte string of either length form. Declared lengths above
/// `limit` are rejected before anything is allocated.
pub fn decode_byte_string(data: &[u8], limit: usize) -> Result<(Value, usize)> {
    let header = read_header(data, Some(Kind::ByteString))?;
    expect_major(&header, MAJOR_BYTES, Kind::ByteString)?;
    match header.argument {
        Some(len) => {
            let len = check_declared_len(len, limit, Kind::ByteString)?;
            let bytes = take(data, header.len, len, Some(Kind::ByteString))?;
            Ok((Value::ByteString(bytes.to_vec()), header.len + len))
        }
        None => {
            let (chunks, consumed) =
                read_chunks(data, header.len, MAJOR_BYTES, Kind::ByteString, limit)?;
            Ok((Value::IndefiniteByteChunks(chunks), consumed))
        }
    }
}

/// Decodes a text string of either length form. Chunked text is validated
/// as a whole since a code point may span chunks.
pub fn decode_text_string(data: &[u8], limit: usize) -> Result<(Value, usize)> {
    let header = read_header(data, Some(Kind::TextString))?;
    expect_major(&header, MAJOR_TEXT, Kind::TextString)?;
    match header.argument {
        Some(len) => {
            let len = check_declared_len(len, limit, Kind::TextString)?;
            let bytes = take(data, header.len, len, Some(Kind::TextString))?;
            let text = std::str::from_utf8(bytes).map_err(|_| Error::InvalidUtf8)?;
            Ok((Value::TextString(text.to_string()), header.len + len))
        }
        None => {
            let (chunks, consumed) =
                read_chunks(data, header.len, MAJOR_TEXT, Kind::TextString, limit)?;
            std::str::from_utf8(&chunks.concat()).map_err(|_| Error::InvalidUtf8)?;
            Ok((Value::IndefiniteTextChunks(chunks), consumed))
        }
    }
}

pub fn encode_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    write_header(out, MAJOR_BYTES, bytes.len() as u64);
    out.extend_from_slice(bytes);
}

pub fn encode_text(out: &mut Vec<u8>, text: &str) {
    write_header(out, MAJOR_TEXT, text.len() as u64);
    out.extend_from_slice(text.as_bytes());
}

pub fn encode_chunks(out: &mut Vec<u8>, major: u8, chunks: &[Vec<u8>]) {
    write_indefinite_header(out, major);
    for chunk in chunks {
        write_header(out, major, chunk.len() as u64);
        out.extend_from_slice(chunk);
    }
    write_break(out);
}

/// Decodes a major type 7 item other than break: simple values, booleans,
/// null, undefined and floats.
pub fn decode_simple(data: &[u8]) -> Result<(Value, usize)> {
    let initial = *data.first().ok_or(Error::truncated(None))?;
    if initial >> 5 != MAJOR_SIMPLE {
        return Err(Error::mismatch(
            &[Kind::Simple],
            kind_of(initial >> 5, initial & 0x1f),
        ));
    }
    let info = initial & 0x1f;
    let value = match info {
        0..=MAX_INLINE_SIMPLE => Value::Simple(info),
        FALSE => Value::Bool(false),
        TRUE => Value::Bool(true),
        NULL => Value::Null,
        UNDEFINED => Value::Undefined,
        SIMPLE_VALUE => {
            let code = take(data, 1, 1, Some(Kind::Simple))?[0];
            if code < MIN_EXTENDED_SIMPLE {
                return Err(Error::corrupted(format!(
                    "invalid extended simple value {code}"
                )));
            }
            return Ok((Value::Simple(code), 2));
        }
        FLOAT16 => {
            let b = take(data, 1, 2, Some(Kind::Half))?;
            return Ok((Value::Half(f16::from_be_bytes([b[0], b[1]])), 3));
        }
        FLOAT32 => {
            let b = take(data, 1, 4, Some(Kind::Single))?;
            return Ok((Value::Single(f32::from_be_bytes([b[0], b[1], b[2], b[3]])), 5));
        }
        FLOAT64 => {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(take(data, 1, 8, Some(Kind::Double))?);
            return Ok((Value::Double(f64::from_be_bytes(buf)), 9));
        }
        INDEFINITE => return Err(Error::corrupted("unexpected break")),
        _ => {
            return Err(Error::corrupted(format!(
                "reserved additional info {info} in initial byte {initial:#04x}"
            )));
        }
    };
    Ok((value, 1))
}

pub fn encode_f16(out: &mut Vec<u8>, value: f16) {
    out.push((MAJOR_SIMPLE << 5) | FLOAT16);
    out.extend_from_slice(&value.to_be_bytes());
}

pub fn encode_f32(out: &mut Vec<u8>, value: f32) {
    out.push((MAJOR_SIMPLE << 5) | FLOAT32);
    out.extend_from_slice(&value.to_be_bytes());
}

pub fn encode_f64(out: &mut Vec<u8>, value: f64) {
    out.push((MAJOR_SIMPLE << 5) | FLOAT64);
    out.extend_from_slice(&value.to_be_bytes());
}

pub fn encode_bool(out: &mut Vec<u8>, value: bool) {
    out.push((MAJOR_SIMPLE << 5) | if value { TRUE } else { FALSE });
}

pub fn encode_null(out: &mut Vec<u8>) {
    out.push((MAJOR_SIMPLE << 5) | NULL);
}

pub fn encode_undefined(out: &mut Vec<u8>) {
    out.push((MAJOR_SIMPLE << 5) | UNDEFINED);
}

/// Whether `value` may be written as a plain simple value.
pub fn is_unassigned_simple(value: u8) -> bool {
    value <= MAX_INLINE_SIMPLE || value >= MIN_EXTENDED_SIMPLE
}

/// Writes an unassigned simple value.
///
/// # Panics
///
/// Panics for 20..=31, which are booleans, null, undefined, floats or reserved.
pub fn encode_simple(out: &mut Vec<u8>, value: u8) {
    assert!(
        is_unassigned_simple(value),
        "simple value {value} is reserved"
    );
    if value <= MAX_INLINE_SIMPLE {
        out.push((MAJOR_SIMPLE << 5) | value);
    } else {
        out.push((MAJOR_SIMPLE << 5) | SIMPLE_VALUE);
        out.push(value);
    }
}

pub fn encode_tag(out: &mut Vec<u8>, tag: Tag) {
    out.extend_from_slice(tag.preamble());
}

/// Formats a date as `yyyy-MM-ddTHH:mm:ssZ` in UTC. Fractional seconds are
/// dropped.
pub fn format_rfc3339(date: OffsetDateTime) -> Result<String> {
    date.to_offset(UtcOffset::UTC)
        .format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second]Z"
        ))
        .map_err(|e| Error::corrupted(format!("cannot format date: {e}")))
}

pub fn parse_rfc3339(text: &str) -> Result<OffsetDateTime> {
    PrimitiveDateTime::parse(
        text,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z"),
    )
    .map(PrimitiveDateTime::assume_utc)
    .map_err(|e| Error::corrupted(format!("invalid date string {text:?}: {e}")))
}

fn epoch_out_of_range(seconds: impl std::fmt::Display) -> Error {
    Error::corrupted(format!("epoch time {seconds} is out of range"))
}

/// Converts a tag 1 payload (integer or float seconds) to a date.
pub fn date_from_epoch(payload: &Value) -> Result<OffsetDateTime> {
    if let Some(seconds) = payload.to_i128() {
        let seconds = i64::try_from(seconds).map_err(|_| epoch_out_of_range(seconds))?;
        return OffsetDateTime::from_unix_timestamp(seconds)
            .map_err(|_| epoch_out_of_range(seconds));
    }
    let Some(seconds) = payload.as_f64() else {
        return Err(Error::mismatch(&[Kind::Integer, Kind::Float], payload.kind()));
    };
    if !seconds.is_finite() || seconds.abs() >= i64::MAX as f64 {
        return Err(epoch_out_of_range(seconds));
    }
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9).round() as i64;
    OffsetDateTime::from_unix_timestamp(whole as i64)
        .ok()
        .and_then(|date| date.checked_add(Duration::nanoseconds(nanos)))
        .ok_or_else(|| epoch_out_of_range(seconds))
}

/// The tag 1 payload for a date: integer seconds when there is no fractional
/// part, a double otherwise.
pub fn epoch_payload(date: OffsetDateTime) -> Value {
    let seconds = date.unix_timestamp();
    match date.nanosecond() {
        0 => Value::from(i128::from(seconds)),
        nanos => Value::Double(seconds as f64 + f64::from(nanos) / 1e9),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use time::macros::datetime;

    fn encoded(f: impl FnOnce(&mut Vec<u8>)) -> Vec<u8> {
        let mut out = Vec::new();
        f(&mut out);
        out
    }

    #[test]
    fn test_header_widths() {
        assert_eq!(encoded(|o| encode_unsigned(o, 0)), hex!("00"));
        assert_eq!(encoded(|o| encode_unsigned(o, 23)), hex!("17"));
        assert_eq!(encoded(|o| encode_unsigned(o, 24)), hex!("1818"));
        assert_eq!(encoded(|o| encode_unsigned(o, 255)), hex!("18ff"));
        assert_eq!(encoded(|o| encode_unsigned(o, 65535)), hex!("19ffff"));
        assert_eq!(encoded(|o| encode_unsigned(o, u32::MAX as u64)), hex!("1affffffff"));
        assert_eq!(encoded(|o| encode_unsigned(o, u64::MAX)), hex!("1bffffffffffffffff"));
        assert_eq!(encoded(|o| encode_signed(o, -1)), hex!("20"));
        assert_eq!(encoded(|o| encode_signed(o, -24)), hex!("37"));
        assert_eq!(encoded(|o| encode_signed(o, -25)), hex!("3818"));
        assert_eq!(encoded(|o| encode_signed(o, i64::MIN)), hex!("3b7fffffffffffffff"));
    }

    #[test]
    fn test_reserved_info_rejected() {
        for initial in [0x1cu8, 0x1d, 0x1e, 0x3c, 0x5d, 0xfc] {
            let err = read_header(&[initial], None).unwrap_err();
            assert!(err.is_data_corrupted(), "{initial:#x}");
        }
    }

    #[test]
    fn test_truncated_argument() {
        let err = decode_unsigned(&hex!("1a000f")).unwrap_err();
        assert_eq!(err, Error::truncated(Some(Kind::UnsignedInt)));
        assert!(decode_simple(&hex!("fa0000")).unwrap_err().is_insufficient_bytes());
        assert!(decode_byte_string(&hex!("4401"), usize::MAX).unwrap_err().is_insufficient_bytes());
    }

    #[test]
    fn test_negative_overflow_falls_back() {
        let (value, len) = decode_negative(&hex!("3b7fffffffffffffff")).unwrap();
        assert_eq!(len, 9);
        assert!(matches!(value, Value::SignedInt(i64::MIN)));

        let (value, _) = decode_negative(&hex!("3b8000000000000000")).unwrap();
        assert!(matches!(value, Value::NegativeBig(n) if n.raw() == 1 << 63));

        let (value, _) = decode_negative(&hex!("3bffffffffffffffff")).unwrap();
        assert_eq!(value.to_i128(), Some(-(1i128 << 64)));
    }

    #[test]
    fn test_major_type_mismatch() {
        let err = decode_unsigned(&hex!("20")).unwrap_err();
        assert_eq!(err, Error::mismatch(&[Kind::UnsignedInt], Kind::NegativeInt));
        let err = decode_text_string(&hex!("4161"), usize::MAX).unwrap_err();
        assert!(err.is_type_mismatch());
    }

    #[test]
    fn test_indefinite_strings() {
        let (value, len) = decode_byte_string(&hex!("5f42010243030405ff"), usize::MAX).unwrap();
        assert_eq!(len, 9);
        assert_eq!(value, Value::IndefiniteByteChunks(vec![vec![1, 2], vec![3, 4, 5]]));

        let (value, _) = decode_text_string(&hex!("7f657374726561646d696e67ff"), usize::MAX).unwrap();
        assert_eq!(value.to_text().unwrap(), "streaming");

        let err = decode_text_string(&hex!("7f4161ff"), usize::MAX).unwrap_err();
        assert_eq!(
            err,
            Error::DataCorrupted("text string chunks must be text strings".to_string())
        );
        let err = decode_byte_string(&hex!("5f5f4101ffff"), usize::MAX).unwrap_err();
        assert!(err.is_data_corrupted());
        let err = decode_byte_string(&hex!("5f4101"), usize::MAX).unwrap_err();
        assert!(err.is_insufficient_bytes());
    }

    #[test]
    fn test_utf8_checked_across_chunks() {
        // U+00FC split between chunks is fine
        let (value, _) = decode_text_string(&hex!("7f61c361bcff"), usize::MAX).unwrap();
        assert_eq!(value.to_text().unwrap(), "\u{00fc}");
        let err = decode_text_string(&hex!("7f61c3ff"), usize::MAX).unwrap_err();
        assert_eq!(err, Error::InvalidUtf8);
        assert_eq!(decode_text_string(&hex!("62c328"), usize::MAX).unwrap_err(), Error::InvalidUtf8);
    }

    #[test]
    fn test_allocation_limit() {
        let err = decode_byte_string(&hex!("5a7fffffff"), 1024).unwrap_err();
        assert!(err.is_data_corrupted());
        let err = decode_text_string(&hex!("7f6361616163616161ff"), 5).unwrap_err();
        assert!(err.is_data_corrupted());
    }

    #[test]
    fn test_simple_values() {
        assert_eq!(decode_simple(&hex!("f0")).unwrap(), (Value::Simple(16), 1));
        assert_eq!(decode_simple(&hex!("f8ff")).unwrap(), (Value::Simple(255), 2));
        assert!(decode_simple(&hex!("f818")).unwrap_err().is_data_corrupted());
        assert!(decode_simple(&hex!("fc")).unwrap_err().is_data_corrupted());
        assert_eq!(encoded(|o| encode_simple(o, 16)), hex!("f0"));
        assert_eq!(encoded(|o| encode_simple(o, 255)), hex!("f8ff"));
    }

    #[test]
    #[should_panic(expected = "simple value 24 is reserved")]
    fn test_reserved_simple_panics() {
        encode_simple(&mut Vec::new(), 24);
    }

    #[test]
    fn test_floats() {
        let (value, _) = decode_simple(&hex!("f97d00")).unwrap();
        let Value::Half(h) = value else { panic!("expected half") };
        assert_eq!(h.to_bits(), 0x7d00);
        assert_eq!(encoded(|o| encode_f16(o, h)), hex!("f97d00"));

        assert_eq!(encoded(|o| encode_f32(o, 100000.0)), hex!("fa47c35000"));
        assert_eq!(encoded(|o| encode_f64(o, 1.1)), hex!("fb3ff199999999999a"));
    }

    #[test]
    fn test_rfc3339_dates() {
        let date = parse_rfc3339("2013-03-21T20:04:00Z").unwrap();
        assert_eq!(date, datetime!(2013-03-21 20:04:00 UTC));
        assert_eq!(format_rfc3339(date).unwrap(), "2013-03-21T20:04:00Z");

        let offset = datetime!(2013-03-21 22:04:00 +2);
        assert_eq!(format_rfc3339(offset).unwrap(), "2013-03-21T20:04:00Z");

        assert!(parse_rfc3339("2013-03-21 20:04:00").unwrap_err().is_data_corrupted());
    }

    #[test]
    fn test_epoch_dates() {
        let date = date_from_epoch(&Value::from(1363896240u64)).unwrap();
        assert_eq!(date, datetime!(2013-03-21 20:04:00 UTC));
        assert_eq!(epoch_payload(date), Value::from(1363896240u64));

        let date = date_from_epoch(&Value::Double(1363896240.5)).unwrap();
        assert_eq!(date, datetime!(2013-03-21 20:04:00.5 UTC));
        assert_eq!(epoch_payload(date), Value::Double(1363896240.5));

        assert!(date_from_epoch(&Value::Double(f64::NAN)).unwrap_err().is_data_corrupted());
        assert!(date_from_epoch(&Value::from("x")).unwrap_err().is_type_mismatch());
    }
}
