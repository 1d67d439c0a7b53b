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

//! Registry of the well-known RFC 8949 tags.

use std::fmt;

use base64::{
    Engine as _, alphabet,
    engine::{
        DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig,
        general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    },
};

use crate::error::{Error, Kind, Result};
use crate::primitive;
use crate::value::{Bignum, Value};

// Tags 33 and 34 may or may not carry padding
const BASE64_URL_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);
const BASE64_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A known CBOR tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Tag 0: RFC 3339 date/time string.
    StandardDateTime,
    /// Tag 1: seconds since the epoch, integer or float.
    EpochDateTime,
    /// Tag 2
    PositiveBignum,
    /// Tag 3
    NegativeBignum,
    /// Tag 4: `[exponent, mantissa]` with base 10.
    DecimalFraction,
    /// Tag 5: `[exponent, mantissa]` with base 2.
    Bigfloat,
    Base64UrlConversion,
    Base64Conversion,
    Base16Conversion,
    /// Tag 24: byte string holding an encoded CBOR item.
    EncodedCborData,
    Uri,
    Base64Url,
    Base64,
    RegularExpression,
    MimeMessage,
    /// Tag 55799: marks a document as CBOR and carries no meaning.
    SelfDescribedCbor,
}

impl Tag {
    pub const ALL: [Tag; 16] = [
        Tag::StandardDateTime,
        Tag::EpochDateTime,
        Tag::PositiveBignum,
        Tag::NegativeBignum,
        Tag::DecimalFraction,
        Tag::Bigfloat,
        Tag::Base64UrlConversion,
        Tag::Base64Conversion,
        Tag::Base16Conversion,
        Tag::EncodedCborData,
        Tag::Uri,
        Tag::Base64Url,
        Tag::Base64,
        Tag::RegularExpression,
        Tag::MimeMessage,
        Tag::SelfDescribedCbor,
    ];

    pub fn code(self) -> u64 {
        match self {
            Tag::StandardDateTime => 0,
            Tag::EpochDateTime => 1,
            Tag::PositiveBignum => 2,
            Tag::NegativeBignum => 3,
            Tag::DecimalFraction => 4,
            Tag::Bigfloat => 5,
            Tag::Base64UrlConversion => 21,
            Tag::Base64Conversion => 22,
            Tag::Base16Conversion => 23,
            Tag::EncodedCborData => 24,
            Tag::Uri => 32,
            Tag::Base64Url => 33,
            Tag::Base64 => 34,
            Tag::RegularExpression => 35,
            Tag::MimeMessage => 36,
            Tag::SelfDescribedCbor => 55799,
        }
    }

    pub fn from_code(code: u64) -> Option<Tag> {
        Tag::ALL.into_iter().find(|tag| tag.code() == code)
    }

    /// The shortest encoding of the tag header.
    pub fn preamble(self) -> &'static [u8] {
        match self {
            Tag::StandardDateTime => &[0xc0],
            Tag::EpochDateTime => &[0xc1],
            Tag::PositiveBignum => &[0xc2],
            Tag::NegativeBignum => &[0xc3],
            Tag::DecimalFraction => &[0xc4],
            Tag::Bigfloat => &[0xc5],
            Tag::Base64UrlConversion => &[0xd5],
            Tag::Base64Conversion => &[0xd6],
            Tag::Base16Conversion => &[0xd7],
            Tag::EncodedCborData => &[0xd8, 0x18],
            Tag::Uri => &[0xd8, 0x20],
            Tag::Base64Url => &[0xd8, 0x21],
            Tag::Base64 => &[0xd8, 0x22],
            Tag::RegularExpression => &[0xd8, 0x23],
            Tag::MimeMessage => &[0xd8, 0x24],
            Tag::SelfDescribedCbor => &[0xd9, 0xd9, 0xf7],
        }
    }

    fn payload_kinds(self) -> &'static [Kind] {
        match self {
            Tag::StandardDateTime
            | Tag::Uri
            | Tag::Base64Url
            | Tag::Base64
            | Tag::RegularExpression => &[Kind::TextString],
            Tag::EpochDateTime => &[Kind::Integer, Kind::Float],
            Tag::PositiveBignum | Tag::NegativeBignum | Tag::EncodedCborData => &[Kind::ByteString],
            Tag::DecimalFraction | Tag::Bigfloat => &[Kind::Array],
            Tag::MimeMessage => &[Kind::TextString, Kind::ByteString],
            Tag::Base64UrlConversion
            | Tag::Base64Conversion
            | Tag::Base16Conversion
            | Tag::SelfDescribedCbor => &[],
        }
    }

    /// Whether `payload` has the shape this tag requires.
    pub fn accepts(self, payload: &Value) -> bool {
        match self {
            Tag::StandardDateTime
            | Tag::Uri
            | Tag::Base64Url
            | Tag::Base64
            | Tag::RegularExpression => payload.is_text_string(),
            Tag::EpochDateTime => payload.is_integer() || payload.is_float(),
            Tag::PositiveBignum | Tag::NegativeBignum | Tag::EncodedCborData => {
                payload.is_byte_string()
            }
            Tag::DecimalFraction | Tag::Bigfloat => check_fraction(payload).is_ok(),
            Tag::MimeMessage => payload.is_text_string() || payload.is_byte_string(),
            Tag::Base64UrlConversion
            | Tag::Base64Conversion
            | Tag::Base16Conversion
            | Tag::SelfDescribedCbor => true,
        }
    }

    /// Tags that never survive decoding as `Value::Tagged`: they become
    /// `Date`, `Bignum` or `Url`, or in the self-described case the payload.
    pub fn has_dedicated_variant(self) -> bool {
        matches!(
            self,
            Tag::StandardDateTime
                | Tag::EpochDateTime
                | Tag::PositiveBignum
                | Tag::NegativeBignum
                | Tag::Uri
                | Tag::SelfDescribedCbor
        )
    }

    /// Turns a decoded tag payload into its value.
    ///
    /// Dates, bignums and URIs become their dedicated variants; the other
    /// tags are shape-checked and kept as `Value::Tagged`.
    pub(crate) fn resolve(self, payload: Value) -> Result<Value> {
        match self {
            Tag::StandardDateTime => {
                let text = payload.to_text()?;
                primitive::parse_rfc3339(&text).map(Value::Date)
            }
            Tag::EpochDateTime => primitive::date_from_epoch(&payload).map(Value::Date),
            Tag::PositiveBignum | Tag::NegativeBignum => {
                let content = payload.to_byte_vec()?;
                Ok(Value::Bignum(Bignum::new(
                    self == Tag::PositiveBignum,
                    content,
                )))
            }
            Tag::Uri => payload.to_text().map(Value::Url),
            Tag::DecimalFraction | Tag::Bigfloat => {
                check_fraction(&payload)?;
                Ok(Value::Tagged(self, Box::new(payload)))
            }
            Tag::SelfDescribedCbor => Ok(payload),
            _ if self.accepts(&payload) => Ok(Value::Tagged(self, Box::new(payload))),
            _ => Err(Error::mismatch(self.payload_kinds(), payload.kind())),
        }
    }

    /// Text form of an expected-conversion payload (tags 21 to 23).
    pub fn expected_text(self, payload: &Value) -> Option<String> {
        let bytes = match payload {
            Value::ByteString(b) => b.clone(),
            Value::IndefiniteByteChunks(chunks) => chunks.concat(),
            _ => return None,
        };
        match self {
            Tag::Base64UrlConversion => Some(URL_SAFE_NO_PAD.encode(bytes)),
            Tag::Base64Conversion => Some(STANDARD.encode(bytes)),
            Tag::Base16Conversion => Some(encode_base16(&bytes)),
            _ => None,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "tag {}", self.code())
    }
}

fn check_fraction(payload: &Value) -> Result<()> {
    let Value::Array(items) = payload else {
        return Err(Error::mismatch(&[Kind::Array], payload.kind()));
    };
    let [exponent, mantissa] = items.as_slice() else {
        return Err(Error::corrupted(format!(
            "expected [exponent, mantissa], found {} elements",
            items.len()
        )));
    };
    if !exponent.is_integer() {
        return Err(Error::mismatch(&[Kind::Integer], exponent.kind()));
    }
    if !mantissa.is_integer() && !matches!(mantissa, Value::Bignum(_)) {
        return Err(Error::mismatch(
            &[Kind::Integer, Kind::Bignum],
            mantissa.kind(),
        ));
    }
    Ok(())
}

/// Decodes the text carried by a base64 or base64url tag (33 or 34), or
/// the text form of an expected-conversion tag (21 or 22).
pub fn decode_base64_text(tag: Tag, text: &str) -> Result<Vec<u8>> {
    let decoded = match tag {
        Tag::Base64Url | Tag::Base64UrlConversion => BASE64_URL_LENIENT.decode(text),
        Tag::Base64 | Tag::Base64Conversion => BASE64_LENIENT.decode(text),
        other => {
            return Err(Error::corrupted(format!(
                "{other} does not carry base64 text"
            )));
        }
    };
    decoded.map_err(|e| Error::corrupted(format!("invalid base64 in {tag}: {e}")))
}

/// Uppercase base16 as RFC 4648 defines it.
pub fn encode_base16(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}

/// Decodes base16 text of either case, the text form of tag 23.
pub fn decode_base16(text: &str) -> Result<Vec<u8>> {
    hex::decode(text).map_err(|e| Error::corrupted(format!("invalid base16 text: {e}")))
}
