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

//! Exact conversions between the three CBOR float widths.
//!
//! Widening never loses information. Narrowing succeeds only when the value
//! survives unchanged, otherwise it fails with `DataCorrupted`. NaN payloads
//! are moved bit for bit so a signaling NaN stays signaling; neither `as`
//! casts nor `half`'s own conversions make that promise.

use std::fmt;

use half::f16;

use crate::error::{Error, Result};

/// Width of an encoded float.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatWidth {
    Half,
    Single,
    Double,
}

impl fmt::Display for FloatWidth {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            FloatWidth::Half => "half-precision",
            FloatWidth::Single => "single-precision",
            FloatWidth::Double => "double-precision",
        })
    }
}

const F16_SIGN: u16 = 0x8000;
const F16_MANTISSA: u16 = 0x03ff;
const F16_QUIET: u16 = 0x0200;

const F32_SIGN: u32 = 0x8000_0000;
const F32_EXPONENT: u32 = 0x7f80_0000;
const F32_MANTISSA: u32 = 0x007f_ffff;
const F32_QUIET: u32 = 0x0040_0000;

const F64_EXPONENT: u64 = 0x7ff0_0000_0000_0000;
const F64_MANTISSA: u64 = 0x000f_ffff_ffff_ffff;
const F64_QUIET: u64 = 0x0008_0000_0000_0000;

// Mantissa bits dropped when narrowing
const F32_TO_F16_SHIFT: u32 = 13;
const F64_TO_F32_SHIFT: u32 = 29;

pub fn is_signaling_nan_f16(value: f16) -> bool {
    value.is_nan() && value.to_bits() & F16_QUIET == 0
}

pub fn is_signaling_nan_f32(value: f32) -> bool {
    value.is_nan() && value.to_bits() & F32_QUIET == 0
}

pub fn is_signaling_nan_f64(value: f64) -> bool {
    value.is_nan() && value.to_bits() & F64_QUIET == 0
}

pub fn f16_to_f32(value: f16) -> f32 {
    if !value.is_nan() {
        return value.to_f32();
    }
    let bits = value.to_bits();
    let sign = u32::from(bits & F16_SIGN) << 16;
    let mantissa = u32::from(bits & F16_MANTISSA) << F32_TO_F16_SHIFT;
    f32::from_bits(sign | F32_EXPONENT | mantissa)
}

pub fn f32_to_f64(value: f32) -> f64 {
    if !value.is_nan() {
        return f64::from(value);
    }
    let bits = value.to_bits();
    let sign = u64::from(bits & F32_SIGN) << 32;
    let mantissa = u64::from(bits & F32_MANTISSA) << F64_TO_F32_SHIFT;
    f64::from_bits(sign | F64_EXPONENT | mantissa)
}

pub fn f16_to_f64(value: f16) -> f64 {
    f32_to_f64(f16_to_f32(value))
}

fn not_exact(value: f64, width: FloatWidth) -> Error {
    Error::corrupted(format!(
        "{value} is not exactly representable as a {width} float"
    ))
}

/// Narrows to `f32`, failing unless the value is preserved exactly.
pub fn f64_to_f32(value: f64) -> Result<f32> {
    if value.is_nan() {
        let bits = value.to_bits();
        let mantissa = bits & F64_MANTISSA;
        if mantissa & ((1 << F64_TO_F32_SHIFT) - 1) != 0 {
            return Err(not_exact(value, FloatWidth::Single));
        }
        let sign = ((bits >> 32) as u32) & F32_SIGN;
        let mantissa = (mantissa >> F64_TO_F32_SHIFT) as u32;
        return Ok(f32::from_bits(sign | F32_EXPONENT | mantissa));
    }
    let narrowed = value as f32;
    if f64::from(narrowed) == value {
        Ok(narrowed)
    } else {
        Err(not_exact(value, FloatWidth::Single))
    }
}

/// Narrows to `f16`, failing unless the value is preserved exactly.
pub fn f32_to_f16(value: f32) -> Result<f16> {
    if value.is_nan() {
        let bits = value.to_bits();
        let mantissa = bits & F32_MANTISSA;
        if mantissa & ((1 << F32_TO_F16_SHIFT) - 1) != 0 {
            return Err(not_exact(f64::from(value), FloatWidth::Half));
        }
        let sign = ((bits >> 16) as u16) & F16_SIGN;
        let mantissa = (mantissa >> F32_TO_F16_SHIFT) as u16;
        return Ok(f16::from_bits(sign | 0x7c00 | mantissa));
    }
    let narrowed = f16::from_f32(value);
    if narrowed.to_f32() == value {
        Ok(narrowed)
    } else {
        Err(not_exact(f64::from(value), FloatWidth::Half))
    }
}

/// Narrows to `f16` by way of `f32`; anything exact in half precision is
/// exact in single precision too.
pub fn f64_to_f16(value: f64) -> Result<f16> {
    f64_to_f32(value)
        .and_then(f32_to_f16)
        .map_err(|_| not_exact(value, FloatWidth::Half))
}

/// The narrowest width that holds `value` exactly.
pub fn shortest_exact(value: f64) -> FloatWidth {
    if f64_to_f16(value).is_ok() {
        FloatWidth::Half
    } else if f64_to_f32(value).is_ok() {
        FloatWidth::Single
    } else {
        FloatWidth::Double
    }
}
