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

// Internal CBOR constants shared across modules

// CBOR major types
pub(crate) const MAJOR_UNSIGNED: u8 = 0;
pub(crate) const MAJOR_NEGATIVE: u8 = 1;
pub(crate) const MAJOR_BYTES: u8 = 2;
pub(crate) const MAJOR_TEXT: u8 = 3;
pub(crate) const MAJOR_ARRAY: u8 = 4;
pub(crate) const MAJOR_MAP: u8 = 5;
pub(crate) const MAJOR_TAG: u8 = 6;
pub(crate) const MAJOR_SIMPLE: u8 = 7;

// Additional info values selecting a trailing argument
pub(crate) const ONE_BYTE: u8 = 24;
pub(crate) const TWO_BYTES: u8 = 25;
pub(crate) const FOUR_BYTES: u8 = 26;
pub(crate) const EIGHT_BYTES: u8 = 27;
pub(crate) const INDEFINITE: u8 = 31;

// Major type 7 additional info values
pub(crate) const FALSE: u8 = 20;
pub(crate) const TRUE: u8 = 21;
pub(crate) const NULL: u8 = 22;
pub(crate) const UNDEFINED: u8 = 23;
pub(crate) const SIMPLE_VALUE: u8 = 24;
pub(crate) const FLOAT16: u8 = 25;
pub(crate) const FLOAT32: u8 = 26;
pub(crate) const FLOAT64: u8 = 27;

pub(crate) const BREAK: u8 = 0xff;

/// Largest simple value that fits inline; 24..=31 are reserved or assigned.
pub(crate) const MAX_INLINE_SIMPLE: u8 = 19;
/// Smallest simple value that may use the one-byte extended form.
pub(crate) const MIN_EXTENDED_SIMPLE: u8 = 32;

// DOS protection limits
/// Default maximum declared length (100MB) of a single byte or text string.
///
/// This can be overridden with `DecoderOptions::with_max_allocation`.
pub const DEFAULT_MAX_ALLOCATION: usize = 100 * 1024 * 1024; // 100 MB

/// Default maximum container nesting depth.
///
/// This can be overridden with `DecoderOptions::with_max_depth`.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Upper bound on capacity reserved up front for a definite-length container.
pub(crate) const MAX_PREALLOCATED_ITEMS: usize = 1024;
