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

//! Error types for decoding and encoding.
//!
//! Every failure is local to one `parse` or `encode` call. Errors raised below
//! a container carry a [`CodingPath`] naming the map keys and array indices
//! that lead to the offending item.

use std::fmt;

use thiserror::Error;

/// The broad category of a CBOR item, used to describe what was expected and
/// what was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    UnsignedInt,
    NegativeInt,
    /// Any integer (unsigned, negative or bignum).
    Integer,
    Bignum,
    Half,
    Single,
    Double,
    /// Any floating point width.
    Float,
    Bool,
    Null,
    Undefined,
    Simple,
    ByteString,
    TextString,
    Array,
    Map,
    Tag,
    Date,
    Url,
    Break,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Kind::UnsignedInt => "unsigned integer",
            Kind::NegativeInt => "negative integer",
            Kind::Integer => "integer",
            Kind::Bignum => "bignum",
            Kind::Half => "half-precision float",
            Kind::Single => "single-precision float",
            Kind::Double => "double-precision float",
            Kind::Float => "float",
            Kind::Bool => "bool",
            Kind::Null => "null",
            Kind::Undefined => "undefined",
            Kind::Simple => "simple value",
            Kind::ByteString => "byte string",
            Kind::TextString => "text string",
            Kind::Array => "array",
            Kind::Map => "map",
            Kind::Tag => "tag",
            Kind::Date => "date",
            Kind::Url => "URL",
            Kind::Break => "break",
        };
        f.write_str(name)
    }
}

/// One step of a [`CodingPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    Key(String),
    IntKey(i128),
    Index(usize),
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PathStep::Key(key) => write!(f, ".{key}"),
            PathStep::IntKey(key) => write!(f, "[{key}]"),
            PathStep::Index(index) => write!(f, "[{index}]"),
        }
    }
}

/// Path of map keys and array indices from the root to an item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodingPath(Vec<PathStep>);

impl CodingPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a new path with `step` appended.
    pub fn child(&self, step: PathStep) -> Self {
        let mut steps = self.0.clone();
        steps.push(step);
        CodingPath(steps)
    }

    pub fn push(&mut self, step: PathStep) {
        self.0.push(step);
    }
}

impl From<Vec<PathStep>> for CodingPath {
    fn from(steps: Vec<PathStep>) -> Self {
        CodingPath(steps)
    }
}

impl fmt::Display for CodingPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for step in &self.0 {
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

/// Formats a list of expected kinds as "a, b or c".
struct KindList<'a>(&'a [Kind]);

impl fmt::Display for KindList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, kind) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(if i + 1 == self.0.len() { " or " } else { ", " })?;
            }
            write!(f, "{kind}")?;
        }
        Ok(())
    }
}

fn describe_expected(expected: &Option<Kind>) -> String {
    match expected {
        Some(kind) => format!(" while reading {kind}"),
        None => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("type mismatch: expected {}, found {actual}", KindList(expected))]
    TypeMismatch { expected: Vec<Kind>, actual: Kind },

    #[error("data corrupted: {0}")]
    DataCorrupted(String),

    #[error("insufficient encoded bytes{}", describe_expected(expected))]
    InsufficientEncodedBytes { expected: Option<Kind> },

    #[error("value not found: expected {expected}, found null")]
    ValueNotFound { expected: Kind },

    #[error("invalid UTF-8 in text string")]
    InvalidUtf8,

    #[error("{source} (at {path})")]
    AtPath {
        path: CodingPath,
        source: Box<Error>,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn corrupted(description: impl Into<String>) -> Self {
        Error::DataCorrupted(description.into())
    }

    pub(crate) fn mismatch(expected: &[Kind], actual: Kind) -> Self {
        Error::TypeMismatch {
            expected: expected.to_vec(),
            actual,
        }
    }

    pub(crate) fn truncated(expected: Option<Kind>) -> Self {
        Error::InsufficientEncodedBytes { expected }
    }

    /// Prepends `step` to this error's coding path.
    pub fn at(self, step: PathStep) -> Self {
        match self {
            Error::AtPath { path, source } => {
                let mut steps = Vec::with_capacity(path.0.len() + 1);
                steps.push(step);
                steps.extend(path.0);
                Error::AtPath {
                    path: CodingPath(steps),
                    source,
                }
            }
            other => Error::AtPath {
                path: CodingPath(vec![step]),
                source: Box::new(other),
            },
        }
    }

    /// Prefixes this error's coding path with `prefix`.
    pub fn at_path(self, prefix: &CodingPath) -> Self {
        prefix
            .0
            .iter()
            .rev()
            .fold(self, |err, step| err.at(step.clone()))
    }

    /// The coding path attached to this error, empty when raised at the root.
    pub fn path(&self) -> CodingPath {
        match self {
            Error::AtPath { path, .. } => path.clone(),
            _ => CodingPath::default(),
        }
    }

    /// The underlying error with any path context removed.
    pub fn root(&self) -> &Error {
        match self {
            Error::AtPath { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn is_data_corrupted(&self) -> bool {
        matches!(self.root(), Error::DataCorrupted(_) | Error::InvalidUtf8)
    }

    pub fn is_insufficient_bytes(&self) -> bool {
        matches!(self.root(), Error::InsufficientEncodedBytes { .. })
    }

    pub fn is_type_mismatch(&self) -> bool {
        matches!(self.root(), Error::TypeMismatch { .. })
    }

    pub fn is_value_not_found(&self) -> bool {
        matches!(self.root(), Error::ValueNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_accumulates_outermost_first() {
        let err = Error::corrupted("bad")
            .at(PathStep::Index(2))
            .at(PathStep::Key("items".to_string()));
        assert_eq!(
            err.path().steps(),
            &[PathStep::Key("items".to_string()), PathStep::Index(2)]
        );
        assert_eq!(err.to_string(), "data corrupted: bad (at .items[2])");
        assert!(err.is_data_corrupted());
    }

    #[test]
    fn test_at_path_prefix() {
        let prefix = CodingPath::from(vec![PathStep::IntKey(-3), PathStep::Index(0)]);
        let err = Error::truncated(Some(Kind::TextString))
            .at(PathStep::Key("name".to_string()))
            .at_path(&prefix);
        assert_eq!(err.path().to_string(), "[-3][0].name");
        assert!(err.is_insufficient_bytes());
    }

    #[test]
    fn test_type_mismatch_message() {
        let err = Error::mismatch(&[Kind::UnsignedInt, Kind::NegativeInt, Kind::Bignum], Kind::Map);
        assert_eq!(
            err.to_string(),
            "type mismatch: expected unsigned integer, negative integer or bignum, found map"
        );
        assert!(Error::mismatch(&[Kind::Map], Kind::Null).is_type_mismatch());
    }

    #[test]
    fn test_root_path_is_empty() {
        let err = Error::ValueNotFound {
            expected: Kind::Bool,
        };
        assert!(err.path().is_empty());
        assert_eq!(err.path().to_string(), "<root>");
        assert!(err.is_value_not_found());
    }
}
