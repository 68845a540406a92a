// Copyright (c) 2026 Amunchain
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Store abstraction used by the distribution keeper.
//!
//! Every keeper operation takes a store view explicitly. Reads go through
//! [`KvRead`], writes through [`KvWrite`]. A state transition runs against a
//! [`CacheStore`] overlay; its buffered writes are turned into [`KvOp`]s and
//! committed in one step, or dropped to discard the transition.

use crate::core::state::persistent_state::{KvOp, StateError};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::iter::Peekable;
use std::ops::ControlFlow;

/// A key/value pair.
pub type KvPair = (Vec<u8>, Vec<u8>);

/// Lazy ascending iterator over key/value pairs.
pub type KvIter<'a> = Box<dyn Iterator<Item = Result<KvPair, StateError>> + 'a>;

/// Read access to ordered key/value state.
pub trait KvRead {
    /// Get value.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError>;

    /// Iterate keys starting with `prefix` in ascending order.
    /// When `start` is given, iteration begins at the first key `>= start`.
    fn iter_prefix<'a>(&'a self, prefix: &[u8], start: Option<&[u8]>) -> KvIter<'a>;

    /// True if the key exists.
    fn has(&self, key: &[u8]) -> Result<bool, StateError> {
        Ok(self.get(key)?.is_some())
    }
}

/// Write access to ordered key/value state.
pub trait KvWrite: KvRead {
    /// Put value.
    fn set(&mut self, key: &[u8], value: Vec<u8>) -> Result<(), StateError>;
    /// Delete key.
    fn delete(&mut self, key: &[u8]) -> Result<(), StateError>;
}

fn lower_bound(prefix: &[u8], start: Option<&[u8]>) -> Vec<u8> {
    match start {
        Some(s) if s > prefix => s.to_vec(),
        _ => prefix.to_vec(),
    }
}

/// Drive an iteration over `prefix` with an explicit continue/stop decision per element.
///
/// Returns the key of the element that stopped the walk, which can be passed back as
/// `start` to resume from that element, or `None` when the sequence was exhausted.
pub fn walk_prefix<S, E, F>(
    store: &S,
    prefix: &[u8],
    start: Option<&[u8]>,
    mut visit: F,
) -> Result<Option<Vec<u8>>, E>
where
    S: KvRead + ?Sized,
    E: From<StateError>,
    F: FnMut(&[u8], &[u8]) -> Result<ControlFlow<()>, E>,
{
    for item in store.iter_prefix(prefix, start) {
        let (key, value) = item?;
        if let ControlFlow::Break(()) = visit(&key, &value)? {
            return Ok(Some(key));
        }
    }
    Ok(None)
}

/// In-memory ordered store.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemStore {
    map: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a committed batch.
    pub fn apply(&mut self, ops: Vec<KvOp>) {
        for op in ops {
            match op {
                KvOp::Put { key, value } => {
                    self.map.insert(key, value);
                }
                KvOp::Del { key } => {
                    self.map.remove(&key);
                }
            }
        }
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True when no keys are stored.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl KvRead for MemStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        Ok(self.map.get(key).cloned())
    }

    fn iter_prefix<'a>(&'a self, prefix: &[u8], start: Option<&[u8]>) -> KvIter<'a> {
        let prefix = prefix.to_vec();
        let lower = lower_bound(&prefix, start);
        Box::new(
            self.map
                .range(lower..)
                .take_while(move |(k, _)| k.starts_with(&prefix))
                .map(|(k, v)| Ok((k.clone(), v.clone()))),
        )
    }
}

impl KvWrite for MemStore {
    fn set(&mut self, key: &[u8], value: Vec<u8>) -> Result<(), StateError> {
        self.map.insert(key.to_vec(), value);
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StateError> {
        self.map.remove(key);
        Ok(())
    }
}

/// Write-buffering overlay over a read-only parent view.
///
/// `None` in the buffer marks a deletion that shadows the parent value.
pub struct CacheStore<'p, P: KvRead + ?Sized> {
    parent: &'p P,
    writes: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl<'p, P: KvRead + ?Sized> CacheStore<'p, P> {
    /// Start an empty overlay.
    pub fn new(parent: &'p P) -> Self {
        Self {
            parent,
            writes: BTreeMap::new(),
        }
    }

    /// True if nothing was written.
    pub fn is_clean(&self) -> bool {
        self.writes.is_empty()
    }

    /// Consume the overlay into an ordered commit batch.
    pub fn into_ops(self) -> Vec<KvOp> {
        self.writes
            .into_iter()
            .map(|(key, value)| match value {
                Some(value) => KvOp::Put { key, value },
                None => KvOp::Del { key },
            })
            .collect()
    }
}

impl<'p, P: KvRead + ?Sized> KvRead for CacheStore<'p, P> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        match self.writes.get(key) {
            Some(v) => Ok(v.clone()),
            None => self.parent.get(key),
        }
    }

    fn iter_prefix<'a>(&'a self, prefix: &[u8], start: Option<&[u8]>) -> KvIter<'a> {
        let owned = prefix.to_vec();
        let lower = lower_bound(prefix, start);
        let cached: CachedIter<'a> = Box::new(
            self.writes
                .range(lower.clone()..)
                .take_while(move |(k, _)| k.starts_with(&owned)),
        );
        Box::new(MergeIter {
            parent: self.parent.iter_prefix(prefix, Some(lower.as_slice())).peekable(),
            cached: cached.peekable(),
        })
    }
}

impl<'p, P: KvRead + ?Sized> KvWrite for CacheStore<'p, P> {
    fn set(&mut self, key: &[u8], value: Vec<u8>) -> Result<(), StateError> {
        self.writes.insert(key.to_vec(), Some(value));
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StateError> {
        self.writes.insert(key.to_vec(), None);
        Ok(())
    }
}

type CachedIter<'a> = Box<dyn Iterator<Item = (&'a Vec<u8>, &'a Option<Vec<u8>>)> + 'a>;

enum Pick {
    Parent,
    Cached,
    Shadowed,
}

/// Ordered merge of parent pairs with buffered writes; buffered entries win on equal keys.
struct MergeIter<'a> {
    parent: Peekable<KvIter<'a>>,
    cached: Peekable<CachedIter<'a>>,
}

impl<'a> Iterator for MergeIter<'a> {
    type Item = Result<KvPair, StateError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let pick = match (self.parent.peek(), self.cached.peek()) {
                (None, None) => return None,
                (Some(Err(_)), _) | (Some(Ok(_)), None) => Pick::Parent,
                (None, Some(_)) => Pick::Cached,
                (Some(Ok((pk, _))), Some((ck, _))) => match pk.as_slice().cmp(ck.as_slice()) {
                    Ordering::Less => Pick::Parent,
                    Ordering::Equal => Pick::Shadowed,
                    Ordering::Greater => Pick::Cached,
                },
            };
            match pick {
                Pick::Parent => return self.parent.next(),
                Pick::Shadowed => {
                    self.parent.next();
                }
                Pick::Cached => {}
            }
            let (key, value) = self.cached.next()?;
            if let Some(value) = value {
                return Some(Ok((key.clone(), value.clone())));
            }
        }
    }
}
