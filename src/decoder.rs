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

use tracing::{debug, trace};

use crate::constants::*;
use crate::error::{Error, Kind, Result};
use crate::frames::ContainerStack;
use crate::primitive;
use crate::tags::Tag;
use crate::value::Value;

/// Limits applied while decoding untrusted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderOptions {
    /// Deepest allowed container nesting (tags count as a level).
    pub max_depth: usize,
    /// Largest declared length accepted for one byte or text string.
    pub max_allocation: usize,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        DecoderOptions {
            max_depth: DEFAULT_MAX_DEPTH,
            max_allocation: DEFAULT_MAX_ALLOCATION,
        }
    }
}

impl DecoderOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_allocation(mut self, max_allocation: usize) -> Self {
        self.max_allocation = max_allocation;
        self
    }
}

/// Single-pass CBOR parser over a complete buffer.
///
/// # Example
/// ```
/// use cbor_codec::{Decoder, DecoderOptions, Value};
///
/// let options = DecoderOptions::default().with_max_depth(16);
/// let value = Decoder::with_options(&[0x83, 0x01, 0x02, 0x03], options).parse().unwrap();
/// assert_eq!(
///     value,
///     Some(Value::Array(vec![1u64.into(), 2u64.into(), 3u64.into()]))
/// );
/// ```
pub struct Decoder<'a> {
    data: &'a [u8],
    pos: usize,
    options: DecoderOptions,
    stack: ContainerStack,
}

impl<'a> Decoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_options(data, DecoderOptions::default())
    }

    pub fn with_options(data: &'a [u8], options: DecoderOptions) -> Self {
        Decoder {
            data,
            pos: 0,
            options,
            stack: ContainerStack::new(options.max_depth),
        }
    }

    /// Parses the single top-level item in the buffer.
    ///
    /// Returns `Ok(None)` for empty input. Errors raised inside a container
    /// carry the path to the item being read.
    pub fn parse(mut self) -> Result<Option<Value>> {
        while self.pos < self.data.len() {
            if let Err(err) = self.step() {
                let err = if err.path().is_empty() {
                    err.at_path(&self.stack.path())
                } else {
                    err
                };
                debug!(offset = self.pos, %err, "abandoning CBOR parse");
                return Err(err);
            }
        }
        self.stack.finalize().inspect_err(|err| {
            debug!(offset = self.data.len(), %err, "CBOR input ended early");
        })
    }

    fn step(&mut self) -> Result<()> {
        let data = self.data;
        let rest = &data[self.pos..];
        let initial = rest[0];
        let major = initial >> 5;
        let info = initial & 0x1f;

        match major {
            MAJOR_UNSIGNED | MAJOR_NEGATIVE => {
                let (value, len) = primitive::decode_integer(rest)?;
                self.pos += len;
                self.stack.append(value)
            }
            MAJOR_BYTES => {
                if info == INDEFINITE {
                    trace!(offset = self.pos, "indefinite-length byte string");
                }
                let (value, len) = primitive::decode_byte_string(rest, self.options.max_allocation)?;
                self.pos += len;
                self.stack.append(value)
            }
            MAJOR_TEXT => {
                if info == INDEFINITE {
                    trace!(offset = self.pos, "indefinite-length text string");
                }
                let (value, len) = primitive::decode_text_string(rest, self.options.max_allocation)?;
                self.pos += len;
                self.stack.append(value)
            }
            MAJOR_ARRAY => {
                let header = primitive::read_header(rest, Some(Kind::Array))?;
                self.pos += header.len;
                if header.argument.is_none() {
                    trace!(offset = self.pos, "indefinite-length array");
                }
                self.stack.start_array(header.argument)
            }
            MAJOR_MAP => {
                let header = primitive::read_header(rest, Some(Kind::Map))?;
                self.pos += header.len;
                if header.argument.is_none() {
                    trace!(offset = self.pos, "indefinite-length map");
                }
                self.stack.start_map(header.argument)
            }
            MAJOR_TAG => self.tag(rest),
            _ if info == INDEFINITE => {
                self.pos += 1;
                self.stack.end_current()
            }
            _ => {
                let (value, len) = primitive::decode_simple(rest)?;
                self.pos += len;
                self.stack.append(value)
            }
        }
    }

    fn tag(&mut self, rest: &[u8]) -> Result<()> {
        let header = primitive::read_header(rest, Some(Kind::Tag))?;
        let Some(code) = header.argument else {
            return Err(Error::corrupted("invalid CBOR tag: indefinite length"));
        };
        let tag = Tag::from_code(code)
            .ok_or_else(|| Error::corrupted(format!("invalid CBOR tag {code}")))?;
        self.pos += header.len;
        if tag == Tag::SelfDescribedCbor {
            // still needs a payload; resolving the frame unwraps it
            trace!(offset = self.pos, "self-described CBOR tag");
        }
        self.stack.start_tag(tag)
    }
}

/// Parses `data` with default limits.
pub fn parse(data: &[u8]) -> Result<Option<Value>> {
    Decoder::new(data).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PathStep;
    use hex_literal::hex;

    #[test]
    fn test_empty_input() {
        assert_eq!(parse(&[]).unwrap(), None);
    }

    #[test]
    fn test_indefinite_array_matches_definite() {
        let indefinite = parse(&hex!("9f010203ff")).unwrap();
        let definite = parse(&hex!("83010203")).unwrap();
        assert_eq!(indefinite, definite);
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let err = parse(&hex!("c601")).unwrap_err();
        assert_eq!(err, Error::DataCorrupted("invalid CBOR tag 6".to_string()));
        assert!(parse(&hex!("df01")).unwrap_err().is_data_corrupted());
    }

    #[test]
    fn test_self_described_tag_skipped() {
        let value = parse(&hex!("d9d9f7820102")).unwrap();
        assert_eq!(
            value,
            Some(Value::Array(vec![Value::from(1u64), Value::from(2u64)]))
        );
    }

    #[test]
    fn test_self_described_tag_needs_payload() {
        // after a complete item
        let err = parse(&hex!("01d9d9f7")).unwrap_err();
        assert_eq!(
            err,
            Error::DataCorrupted("unexpected data after top-level item".to_string())
        );
        // with nothing after it
        assert!(parse(&hex!("d9d9f7")).unwrap_err().is_insufficient_bytes());
        // directly before a break
        assert!(parse(&hex!("9fd9d9f7ff")).unwrap_err().is_data_corrupted());
        // wrapping an element is still transparent
        assert_eq!(
            parse(&hex!("9fd9d9f701ff")).unwrap(),
            Some(Value::Array(vec![Value::from(1u64)]))
        );
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let err = parse(&hex!("0102")).unwrap_err();
        assert!(err.is_data_corrupted());
        assert!(parse(&hex!("8101ff")).unwrap_err().is_data_corrupted());
    }

    #[test]
    fn test_error_path_inside_containers() {
        // {"a": [1, "\xff"]}
        let err = parse(&hex!("a1616182016180")).unwrap_err();
        assert_eq!(err.root(), &Error::InvalidUtf8);
        assert_eq!(
            err.path().steps(),
            &[PathStep::Key("a".to_string()), PathStep::Index(1)]
        );
    }

    #[test]
    fn test_tag_payload_error_path() {
        // [0, 1(h'00')]
        let err = parse(&hex!("8200c14100")).unwrap_err();
        assert!(err.is_type_mismatch());
        assert_eq!(err.path().steps(), &[PathStep::Index(1)]);
    }

    #[test]
    fn test_depth_and_allocation_limits() {
        let nested = [0x81u8; 10];
        let options = DecoderOptions::default().with_max_depth(4);
        let err = Decoder::with_options(&nested, options).parse().unwrap_err();
        assert!(err.is_data_corrupted());

        let options = DecoderOptions::default().with_max_allocation(2);
        let err = Decoder::with_options(&hex!("43010203"), options).parse().unwrap_err();
        assert!(err.is_data_corrupted());
    }

    #[test]
    fn test_truncated_inputs() {
        assert!(parse(&hex!("1a000f")).unwrap_err().is_insufficient_bytes());
        assert!(parse(&hex!("c2")).unwrap_err().is_insufficient_bytes());
        let err = parse(&hex!("830102")).unwrap_err();
        assert_eq!(
            err.root(),
            &Error::DataCorrupted("expected 3 elements, found 2".to_string())
        );
        assert!(parse(&hex!("9f01")).unwrap_err().is_data_corrupted());
    }
}
