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

//! Encoding of values and streams of writes.
//!
//! Every open container buffers its own body and remembers where each item
//! starts. `end_container` commits the finished container into its parent,
//! choosing the definite or indefinite form and applying the key order.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use half::f16;
use time::OffsetDateTime;
use tracing::trace;

use crate::constants::{MAJOR_ARRAY, MAJOR_BYTES, MAJOR_MAP, MAJOR_TEXT};
use crate::decoder::{Decoder, DecoderOptions};
use crate::error::{Error, Result};
use crate::float::{self, FloatWidth};
use crate::primitive;
use crate::tags::Tag;
use crate::value::{Bignum, Map, NegativeUInt64, Value};

/// How dates are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateEncoding {
    /// Tag 1 with integer seconds, or a double when there are fractional seconds.
    #[default]
    EpochSeconds,
    /// Tag 0 with a `yyyy-MM-ddTHH:mm:ssZ` string.
    Rfc3339,
}

/// Comparator applied to map keys before a map is written.
pub type KeyOrder = Arc<dyn Fn(&Value, &Value) -> Ordering + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LengthMode {
    Definite,
    Indefinite,
}

#[derive(Debug, Clone, Copy)]
struct LengthScope {
    mode: LengthMode,
    include_nested: bool,
    /// Open containers when the scope was entered.
    depth: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContainerKind {
    Array,
    Map,
}

#[derive(Debug)]
struct OpenContainer {
    kind: ContainerKind,
    indefinite: bool,
    /// Entries were already written in key order.
    presorted: bool,
    body: Vec<u8>,
    starts: Vec<usize>,
}

/// CBOR encoder with a container/context write API.
///
/// # Example
/// ```
/// use cbor_codec::Encoder;
///
/// let mut encoder = Encoder::new();
/// encoder.with_indefinite_length(false, |enc| {
///     enc.begin_array(false);
///     enc.write_u64(1);
///     enc.write_str("two");
///     enc.end_container();
///     Ok(())
/// }).unwrap();
/// assert_eq!(encoder.finish(), [0x9f, 0x01, 0x63, b't', b'w', b'o', 0xff]);
/// ```
#[derive(Default)]
pub struct Encoder {
    out: Vec<u8>,
    open: Vec<OpenContainer>,
    scopes: Vec<LengthScope>,
    /// The next item is the payload of a tag that was just written.
    in_tag: bool,
    date_encoding: DateEncoding,
    key_order: Option<KeyOrder>,
    self_described: bool,
}

impl fmt::Debug for Encoder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Encoder")
            .field("buffered", &self.out.len())
            .field("open", &self.open.len())
            .field("date_encoding", &self.date_encoding)
            .field("key_order", &self.key_order.is_some())
            .field("self_described", &self.self_described)
            .finish()
    }
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_date_encoding(mut self, date_encoding: DateEncoding) -> Self {
        self.date_encoding = date_encoding;
        self
    }

    /// Sorts map entries with `compare` (a stable sort) before they are written.
    pub fn with_key_order<F>(self, compare: F) -> Self
    where
        F: Fn(&Value, &Value) -> Ordering + Send + Sync + 'static,
    {
        self.with_shared_key_order(Arc::new(compare))
    }

    pub fn with_shared_key_order(mut self, compare: KeyOrder) -> Self {
        self.key_order = Some(compare);
        self
    }

    /// Prefixes finished output with the self-described CBOR tag.
    pub fn self_described(mut self, enabled: bool) -> Self {
        self.self_described = enabled;
        self
    }

    /// Encodes one value into a fresh buffer. The encoder can be reused.
    pub fn encode(&mut self, value: &Value) -> Result<Vec<u8>> {
        if let Err(err) = self.write(value) {
            self.reset();
            return Err(err);
        }
        Ok(self.finish())
    }

    /// Takes the bytes written so far.
    ///
    /// # Panics
    ///
    /// Panics if a container is still open.
    pub fn finish(&mut self) -> Vec<u8> {
        assert!(
            self.open.is_empty(),
            "finish called with {} container(s) still open",
            self.open.len()
        );
        let body = std::mem::take(&mut self.out);
        self.in_tag = false;
        if !self.self_described {
            return body;
        }
        let preamble = Tag::SelfDescribedCbor.preamble();
        let mut out = Vec::with_capacity(preamble.len() + body.len());
        out.extend_from_slice(preamble);
        out.extend_from_slice(&body);
        out
    }

    fn reset(&mut self) {
        self.out.clear();
        self.open.clear();
        self.scopes.clear();
        self.in_tag = false;
    }

    /// Runs `body` with every container opened directly inside it (and, if
    /// `include_nested`, every container below those) written with an
    /// indefinite length. The previous mode is restored afterwards.
    pub fn with_indefinite_length<T>(
        &mut self,
        include_nested: bool,
        body: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.with_length_scope(LengthMode::Indefinite, include_nested, body)
    }

    /// Counterpart of [`Encoder::with_indefinite_length`] forcing definite lengths.
    pub fn with_definite_length<T>(
        &mut self,
        include_nested: bool,
        body: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.with_length_scope(LengthMode::Definite, include_nested, body)
    }

    fn with_length_scope<T>(
        &mut self,
        mode: LengthMode,
        include_nested: bool,
        body: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let saved = self.scopes.len();
        self.scopes.push(LengthScope {
            mode,
            include_nested,
            depth: self.open.len(),
        });
        let result = body(self);
        self.scopes.truncate(saved);
        result
    }

    fn resolve_indefinite(&self, requested: bool) -> bool {
        let depth = self.open.len();
        self.scopes
            .iter()
            .rev()
            .find(|scope| depth == scope.depth || (scope.include_nested && depth > scope.depth))
            .map_or(requested, |scope| scope.mode == LengthMode::Indefinite)
    }

    fn sink(&mut self) -> &mut Vec<u8> {
        match self.open.last_mut() {
            Some(container) => &mut container.body,
            None => &mut self.out,
        }
    }

    /// Records the start of a new item in the innermost container. A tag
    /// payload belongs to the item the tag started.
    fn begin_item(&mut self) {
        if std::mem::take(&mut self.in_tag) {
            return;
        }
        if let Some(container) = self.open.last_mut() {
            container.starts.push(container.body.len());
        }
    }

    fn emit(&mut self, write: impl FnOnce(&mut Vec<u8>)) {
        self.begin_item();
        write(self.sink());
    }

    fn open_container(&mut self, kind: ContainerKind, indefinite: bool, presorted: bool) {
        let indefinite = self.resolve_indefinite(indefinite);
        if indefinite {
            trace!(depth = self.open.len(), ?kind, "opening indefinite-length container");
        }
        self.begin_item();
        self.open.push(OpenContainer {
            kind,
            indefinite,
            presorted,
            body: Vec::new(),
            starts: Vec::new(),
        });
    }

    /// Opens an array. `indefinite` applies unless a length scope overrides it.
    pub fn begin_array(&mut self, indefinite: bool) {
        self.open_container(ContainerKind::Array, indefinite, false);
    }

    /// Opens a map; write keys and values alternately.
    pub fn begin_map(&mut self, indefinite: bool) {
        self.open_container(ContainerKind::Map, indefinite, false);
    }

    /// Closes the innermost container and commits it to its parent.
    ///
    /// # Panics
    ///
    /// Panics if no container is open, or if a map has a key without a value.
    pub fn end_container(&mut self) {
        let Some(container) = self.open.pop() else {
            panic!("end_container called with no open container");
        };
        let items = container.starts.len();
        let (major, count) = match container.kind {
            ContainerKind::Array => (MAJOR_ARRAY, items),
            ContainerKind::Map => {
                assert!(items % 2 == 0, "map closed with a key but no value");
                (MAJOR_MAP, items / 2)
            }
        };
        let body = match (&self.key_order, container.kind) {
            (Some(order), ContainerKind::Map) if !container.presorted => {
                sort_encoded_entries(&container, order.as_ref())
            }
            _ => container.body,
        };
        let sink = self.sink();
        if container.indefinite {
            primitive::write_indefinite_header(sink, major);
            sink.extend_from_slice(&body);
            primitive::write_break(sink);
        } else {
            primitive::write_header(sink, major, count as u64);
            sink.extend_from_slice(&body);
        }
    }

    pub fn write_u64(&mut self, value: u64) {
        self.emit(|out| primitive::encode_unsigned(out, value));
    }

    pub fn write_i64(&mut self, value: i64) {
        self.emit(|out| primitive::encode_signed(out, value));
    }

    pub fn write_negative(&mut self, value: NegativeUInt64) {
        self.emit(|out| primitive::encode_negative(out, value));
    }

    /// Writes an integer in the narrowest form, falling back to a bignum
    /// beyond the 64-bit range.
    pub fn write_i128(&mut self, value: i128) {
        match Value::from(value) {
            Value::UnsignedInt(v) => self.write_u64(v),
            Value::SignedInt(v) => self.write_i64(v),
            Value::NegativeBig(n) => self.write_negative(n),
            Value::Bignum(b) => self.write_bignum(&b),
            _ => unreachable!("integer conversion produced a non-integer"),
        }
    }

    pub fn write_bignum(&mut self, value: &Bignum) {
        let tag = if value.is_positive {
            Tag::PositiveBignum
        } else {
            Tag::NegativeBignum
        };
        self.write_tag_preamble(tag);
        self.write_bytes(&value.content);
    }

    pub fn write_f16(&mut self, value: f16) {
        self.emit(|out| primitive::encode_f16(out, value));
    }

    pub fn write_f32(&mut self, value: f32) {
        self.emit(|out| primitive::encode_f32(out, value));
    }

    pub fn write_f64(&mut self, value: f64) {
        self.emit(|out| primitive::encode_f64(out, value));
    }

    /// Writes `value` at the requested width, failing unless it is exact there.
    pub fn write_float(&mut self, value: f64, width: FloatWidth) -> Result<()> {
        match width {
            FloatWidth::Half => self.write_f16(float::f64_to_f16(value)?),
            FloatWidth::Single => self.write_f32(float::f64_to_f32(value)?),
            FloatWidth::Double => self.write_f64(value),
        }
        Ok(())
    }

    /// Writes `value` at the narrowest width that holds it exactly.
    pub fn write_float_shortest(&mut self, value: f64) {
        if let Ok(h) = float::f64_to_f16(value) {
            self.write_f16(h);
        } else if let Ok(f) = float::f64_to_f32(value) {
            self.write_f32(f);
        } else {
            self.write_f64(value);
        }
    }

    pub fn write_bool(&mut self, value: bool) {
        self.emit(|out| primitive::encode_bool(out, value));
    }

    pub fn write_null(&mut self) {
        self.emit(primitive::encode_null);
    }

    pub fn write_undefined(&mut self) {
        self.emit(primitive::encode_undefined);
    }

    /// # Panics
    ///
    /// Panics for the assigned and reserved codes 20..=31.
    pub fn write_simple(&mut self, value: u8) {
        self.emit(|out| primitive::encode_simple(out, value));
    }

    pub fn write_bytes(&mut self, value: &[u8]) {
        self.emit(|out| primitive::encode_bytes(out, value));
    }

    pub fn write_str(&mut self, value: &str) {
        self.emit(|out| primitive::encode_text(out, value));
    }

    pub fn write_byte_chunks(&mut self, chunks: &[Vec<u8>]) {
        self.emit(|out| primitive::encode_chunks(out, MAJOR_BYTES, chunks));
    }

    /// Writes text chunks as an indefinite-length text string. A code point
    /// may straddle chunks, but the joined text must be UTF-8.
    pub fn write_text_chunks(&mut self, chunks: &[Vec<u8>]) -> Result<()> {
        if std::str::from_utf8(&chunks.concat()).is_err() {
            return Err(Error::InvalidUtf8);
        }
        self.emit(|out| primitive::encode_chunks(out, MAJOR_TEXT, chunks));
        Ok(())
    }

    /// Writes a date with the configured [`DateEncoding`].
    pub fn write_date(&mut self, date: OffsetDateTime) -> Result<()> {
        match self.date_encoding {
            DateEncoding::Rfc3339 => {
                let text = primitive::format_rfc3339(date)?;
                self.write_tag_preamble(Tag::StandardDateTime);
                self.write_str(&text);
            }
            DateEncoding::EpochSeconds => {
                let payload = primitive::epoch_payload(date);
                self.write_tag_preamble(Tag::EpochDateTime);
                self.write(&payload)?;
            }
        }
        Ok(())
    }

    pub fn write_url(&mut self, url: &str) {
        self.write_tag_preamble(Tag::Uri);
        self.write_str(url);
    }

    fn write_tag_preamble(&mut self, tag: Tag) {
        self.emit(|out| primitive::encode_tag(out, tag));
        self.in_tag = true;
    }

    /// Writes `tag` followed by `payload`.
    ///
    /// Dates, bignums, URIs and the self-described tag are first resolved to
    /// the value a decoder would produce and written as that value, so a
    /// payload that would not decode (a malformed date string, say) is an
    /// error here rather than in the reader.
    ///
    /// # Panics
    ///
    /// Panics if `payload` does not have the shape `tag` requires.
    pub fn write_tagged(&mut self, tag: Tag, payload: &Value) -> Result<()> {
        assert!(
            tag.accepts(payload),
            "{tag} cannot carry a {} payload",
            payload.kind()
        );
        if tag.has_dedicated_variant() {
            let resolved = tag.resolve(payload.clone())?;
            return self.write(&resolved);
        }
        self.write_tag_preamble(tag);
        self.write(payload)
    }

    fn write_map(&mut self, map: &Map) -> Result<()> {
        let mut entries: Vec<&(Value, Value)> = map.entries().iter().collect();
        let presorted = match &self.key_order {
            Some(order) => {
                let compare = order.as_ref();
                entries.sort_by(|a, b| compare(&a.0, &b.0));
                true
            }
            None => false,
        };
        self.open_container(ContainerKind::Map, false, presorted);
        for (key, value) in entries {
            self.write(key)?;
            self.write(value)?;
        }
        self.end_container();
        Ok(())
    }

    /// Writes a complete value.
    pub fn write(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::UnsignedInt(v) => self.write_u64(*v),
            Value::SignedInt(v) => self.write_i64(*v),
            Value::NegativeBig(n) => self.write_negative(*n),
            Value::Bignum(b) => self.write_bignum(b),
            Value::Half(v) => self.write_f16(*v),
            Value::Single(v) => self.write_f32(*v),
            Value::Double(v) => self.write_f64(*v),
            Value::Bool(v) => self.write_bool(*v),
            Value::Null => self.write_null(),
            Value::Undefined => self.write_undefined(),
            Value::Simple(v) => self.write_simple(*v),
            Value::ByteString(b) => self.write_bytes(b),
            Value::TextString(s) => self.write_str(s),
            Value::IndefiniteByteChunks(chunks) => self.write_byte_chunks(chunks),
            Value::IndefiniteTextChunks(chunks) => self.write_text_chunks(chunks)?,
            Value::Array(items) => {
                self.begin_array(false);
                for item in items {
                    self.write(item)?;
                }
                self.end_container();
            }
            Value::Map(map) => self.write_map(map)?,
            Value::Tagged(tag, payload) => self.write_tagged(*tag, payload)?,
            Value::Date(date) => self.write_date(*date)?,
            Value::Url(url) => self.write_url(url),
        }
        Ok(())
    }
}

/// Keys are re-read from bytes this encoder wrote, so no input limits apply.
const UNLIMITED: DecoderOptions = DecoderOptions {
    max_depth: usize::MAX,
    max_allocation: usize::MAX,
};

/// Reorders the encoded entries of a streamed map. Keys are parsed back so
/// the comparator sees values, not bytes.
fn sort_encoded_entries(
    container: &OpenContainer,
    order: &(dyn Fn(&Value, &Value) -> Ordering + Send + Sync),
) -> Vec<u8> {
    let body = &container.body;
    let bounds: Vec<(usize, usize)> = container
        .starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = container.starts.get(i + 1).copied().unwrap_or(body.len());
            (start, end)
        })
        .collect();

    let mut entries: Vec<(Value, &[u8])> = bounds
        .chunks_exact(2)
        .map(|pair| {
            let (key_start, key_end) = pair[0];
            let (_, value_end) = pair[1];
            let key = match Decoder::with_options(&body[key_start..key_end], UNLIMITED).parse() {
                Ok(Some(key)) => key,
                Ok(None) => panic!("streamed map key at offset {key_start} is empty"),
                Err(err) => panic!("streamed map key at offset {key_start} does not decode: {err}"),
            };
            (key, &body[key_start..value_end])
        })
        .collect();
    entries.sort_by(|a, b| order(&a.0, &b.0));

    let mut sorted = Vec::with_capacity(body.len());
    for (_, bytes) in entries {
        sorted.extend_from_slice(bytes);
    }
    sorted
}

/// Encodes `value` with default settings.
pub fn encode(value: &Value) -> Result<Vec<u8>> {
    Encoder::new().encode(value)
}
