// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Concurrent store of mapping entries keyed by the type pair.
//!
//! The registry is the only shared mutable state of the engine. Lookups are
//! lock-free reads; registration with overwrite negotiation runs under the
//! map's entry lock, so a replacement is a single compare-and-swap and
//! concurrent readers never observe a transiently missing pair.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::BoxFuture;

use crate::engine::Engine;
use crate::error::{ConvertError, Result};
use crate::reflect::{TypeToken, Value};

/// Type-erased conversion function: one input value, one output value, may
/// suspend before yielding. The engine handle is passed in so a converter
/// can recursively convert nested values.
pub type ConverterFn =
    Arc<dyn Fn(&Engine, Value) -> BoxFuture<'static, Result<Value>> + Send + Sync>;

/// Callback deciding whether a new registration may replace an existing one
/// for the same type pair.
///
/// Invoked under the registry's entry lock: the callback must not call back
/// into the registry it is guarding.
pub type OverwritePolicy = Arc<dyn Fn(TypeToken, TypeToken) -> bool + Send + Sync>;

/// A registered (source type, target type, converter) triple.
#[derive(Clone)]
pub struct MappingEntry {
    pub from: TypeToken,
    pub to: TypeToken,
    pub converter: ConverterFn,
}

impl MappingEntry {
    /// Pair equality, ignoring the converter.
    #[must_use]
    pub fn matches(&self, from: TypeId, to: TypeId) -> bool {
        self.from.id == from && self.to.id == to
    }

    fn key(&self) -> (TypeId, TypeId) {
        (self.from.id, self.to.id)
    }
}

impl fmt::Debug for MappingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MappingEntry({} -> {})", self.from.name, self.to.name)
    }
}

/// Concurrent map of live mapping entries.
///
/// At most one entry exists per (from, to) pair at any instant; entries are
/// replaced only through [`Registry::register`] with a permitting policy,
/// removed individually, or dropped en masse by [`Registry::reset`].
#[derive(Default)]
pub struct Registry {
    entries: DashMap<(TypeId, TypeId), Arc<MappingEntry>>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the entry for a type pair. Presence or absence is the only
    /// meaningful signal.
    #[must_use]
    pub fn find(&self, from: TypeId, to: TypeId) -> Option<Arc<MappingEntry>> {
        self.entries
            .get(&(from, to))
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Whether an entry exists for the pair.
    #[must_use]
    pub fn has(&self, from: TypeId, to: TypeId) -> bool {
        self.entries.contains_key(&(from, to))
    }

    /// Unconditionally add an entry, replacing any existing one. Callers
    /// wanting overwrite negotiation go through [`Registry::register`].
    pub fn insert(&self, entry: MappingEntry) {
        self.entries.insert(entry.key(), Arc::new(entry));
    }

    /// Add an entry with overwrite negotiation.
    ///
    /// A vacant pair inserts directly. An occupied pair consults `policy`:
    /// no policy or a denying policy fails with `AlreadyDefined`, a
    /// permitting policy swaps the entry in place.
    pub fn register(&self, entry: MappingEntry, policy: Option<&OverwritePolicy>) -> Result<()> {
        let (from, to) = (entry.from, entry.to);
        match self.entries.entry(entry.key()) {
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(entry));
                log::debug!("registry: {} -> {} registered", from.name, to.name);
                Ok(())
            }
            Entry::Occupied(mut slot) => match policy {
                Some(decide) if decide(from, to) => {
                    slot.insert(Arc::new(entry));
                    log::debug!("registry: {} -> {} overwritten", from.name, to.name);
                    Ok(())
                }
                _ => Err(ConvertError::already_defined(from.name, to.name)),
            },
        }
    }

    /// Remove the entry for a pair. Returns whether one existed.
    pub fn remove(&self, from: TypeId, to: TypeId) -> bool {
        let removed = self.entries.remove(&(from, to)).is_some();
        if removed {
            log::debug!("registry: entry removed");
        }
        removed
    }

    /// Drop every entry, returning to a clean state between independent
    /// usage sessions.
    pub fn reset(&self) {
        self.entries.clear();
        log::debug!("registry: reset");
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no entries are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("entries", &self.entries.len())
            .finish()
    }
}
