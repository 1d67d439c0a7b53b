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

//! Stack of partially built containers used while parsing.
//!
//! Values are built bottom-up: a frame owns the items read so far and is
//! turned into a finished `Value` when it is popped, then handed to the
//! frame below it. Nothing is shared or mutated after it has been placed.

use tracing::trace;

use crate::constants::{DEFAULT_MAX_DEPTH, MAX_PREALLOCATED_ITEMS};
use crate::error::{CodingPath, Error, PathStep, Result};
use crate::tags::Tag;
use crate::value::{Map, Value};

#[derive(Debug)]
enum Partial {
    Array(Vec<Value>),
    /// `key` holds a key whose value has not been read yet.
    Map { map: Map, key: Option<Value>, pairs: u64 },
    Tag { tag: Tag, payload: Option<Value> },
}

#[derive(Debug)]
struct Frame {
    partial: Partial,
    /// Items still expected; `None` until a break for indefinite containers.
    /// Counts pairs for maps.
    remaining: Option<u64>,
    declared: Option<u64>,
}

impl Frame {
    fn received(&self) -> u64 {
        match &self.partial {
            Partial::Array(items) => items.len() as u64,
            Partial::Map { pairs, .. } => *pairs,
            Partial::Tag { payload, .. } => u64::from(payload.is_some()),
        }
    }

    fn slot(&self) -> Option<PathStep> {
        match &self.partial {
            Partial::Array(items) => Some(PathStep::Index(items.len())),
            Partial::Map { key: Some(key), .. } => Some(key_step(key)),
            Partial::Map { pairs, .. } => Some(PathStep::Index(*pairs as usize)),
            Partial::Tag { .. } => None,
        }
    }
}

fn key_step(key: &Value) -> PathStep {
    match (key.as_str(), key.to_i128()) {
        (Some(text), _) => PathStep::Key(text.to_string()),
        (None, Some(n)) => PathStep::IntKey(n),
        _ => PathStep::Key(format!("{key:?}")),
    }
}

fn preallocate(len: Option<u64>) -> usize {
    len.map_or(0, |n| n.min(MAX_PREALLOCATED_ITEMS as u64) as usize)
}

/// The container nesting state of one parse.
#[derive(Debug)]
pub struct ContainerStack {
    frames: Vec<Frame>,
    root: Option<Value>,
    max_depth: usize,
}

impl Default for ContainerStack {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl ContainerStack {
    pub fn new(max_depth: usize) -> Self {
        ContainerStack {
            frames: Vec::new(),
            root: None,
            max_depth,
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Path from the root to the slot the next item will fill.
    pub fn path(&self) -> CodingPath {
        let mut path = CodingPath::new();
        for frame in &self.frames {
            if let Some(step) = frame.slot() {
                path.push(step);
            }
        }
        path
    }

    fn push(&mut self, partial: Partial, len: Option<u64>) -> Result<()> {
        if self.frames.is_empty() && self.root.is_some() {
            return Err(Error::corrupted("unexpected data after top-level item"));
        }
        if self.frames.len() >= self.max_depth {
            return Err(Error::corrupted(format!(
                "nesting depth exceeds maximum of {}",
                self.max_depth
            )));
        }
        self.frames.push(Frame {
            partial,
            remaining: len,
            declared: len,
        });
        self.collapse()
    }

    pub fn start_array(&mut self, len: Option<u64>) -> Result<()> {
        self.push(Partial::Array(Vec::with_capacity(preallocate(len))), len)
    }

    pub fn start_map(&mut self, len: Option<u64>) -> Result<()> {
        let map = Map::with_capacity(preallocate(len));
        self.push(
            Partial::Map {
                map,
                key: None,
                pairs: 0,
            },
            len,
        )
    }

    /// Opens a tag whose payload is the next complete item.
    pub fn start_tag(&mut self, tag: Tag) -> Result<()> {
        self.push(Partial::Tag { tag, payload: None }, Some(1))
    }

    /// Places a complete item, closing every container it completes.
    pub fn append(&mut self, value: Value) -> Result<()> {
        self.deliver(value)?;
        self.collapse()
    }

    /// Closes the innermost container on a break byte.
    pub fn end_current(&mut self) -> Result<()> {
        let Some(frame) = self.frames.last() else {
            return Err(Error::corrupted(
                "unexpected break outside of an indefinite-length container",
            ));
        };
        if let Partial::Tag { tag, .. } = &frame.partial {
            return Err(Error::corrupted(format!(
                "unexpected break in place of the {tag} payload"
            )));
        }
        if frame.remaining.is_some() {
            return Err(Error::corrupted(
                "unexpected break inside a definite-length container",
            ));
        }
        if let Some(frame) = self.frames.pop() {
            let value = close(frame)?;
            self.deliver(value)?;
        }
        self.collapse()
    }

    /// Returns the root once input is exhausted. Any container still open
    /// means the input was cut short.
    pub fn finalize(self) -> Result<Option<Value>> {
        let path = self.path();
        let Some(frame) = self.frames.last() else {
            return Ok(self.root);
        };
        let err = match (&frame.partial, frame.declared) {
            (Partial::Tag { tag, .. }, _) => {
                trace!(%tag, "input ended before tag payload");
                Error::truncated(None)
            }
            (_, Some(declared)) => Error::corrupted(format!(
                "expected {declared} elements, found {}",
                frame.received()
            )),
            (_, None) => Error::corrupted("indefinite-length container is missing its break"),
        };
        Err(err.at_path(&path))
    }

    fn deliver(&mut self, value: Value) -> Result<()> {
        let Some(frame) = self.frames.last_mut() else {
            if self.root.is_some() {
                return Err(Error::corrupted("unexpected data after top-level item"));
            }
            self.root = Some(value);
            return Ok(());
        };
        match &mut frame.partial {
            Partial::Array(items) => {
                items.push(value);
                count_down(&mut frame.remaining);
            }
            Partial::Map { map, key, pairs } => match key.take() {
                None => *key = Some(value),
                Some(k) => {
                    if map.insert(k, value).is_some() {
                        trace!(pair = *pairs, "duplicate map key, keeping last value");
                    }
                    *pairs += 1;
                    count_down(&mut frame.remaining);
                }
            },
            Partial::Tag { payload, .. } => {
                *payload = Some(value);
                frame.remaining = Some(0);
            }
        }
        Ok(())
    }

    fn collapse(&mut self) -> Result<()> {
        while self.frames.last().is_some_and(|f| f.remaining == Some(0)) {
            if let Some(frame) = self.frames.pop() {
                let value = close(frame)?;
                self.deliver(value)?;
            }
        }
        Ok(())
    }
}

fn count_down(remaining: &mut Option<u64>) {
    if let Some(n) = remaining {
        *n = n.saturating_sub(1);
    }
}

fn close(frame: Frame) -> Result<Value> {
    match frame.partial {
        Partial::Array(items) => Ok(Value::Array(items)),
        Partial::Map { key: Some(_), .. } => Err(Error::corrupted("map key has no value")),
        Partial::Map { map, .. } => Ok(Value::Map(map)),
        Partial::Tag {
            tag,
            payload: Some(payload),
        } => tag.resolve(payload),
        Partial::Tag { payload: None, .. } => Err(Error::truncated(None)),
    }
}
