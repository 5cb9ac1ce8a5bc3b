// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Conversion engine: the public entrypoint resolving and executing
//! registered converters.
//!
//! An [`Engine`] is a cheap-clone handle over shared state (the mapping
//! registry and the overwrite policy slot). Clones observe the same
//! registrations, so a converter can carry a handle into a `'static`
//! future and recurse through the engine that invoked it.

mod convert;
mod structural;

pub use structural::{AutoMapping, PropertySource};

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::try_join_all;
use parking_lot::RwLock;

use crate::error::{ConvertError, Result};
use crate::mapping_set::Mapping;
use crate::reflect::{Convertible, TypeShape, TypeToken, Value};
use crate::registry::{ConverterFn, MappingEntry, OverwritePolicy, Registry};

/// Runtime type-pair-keyed conversion engine.
///
/// # Example
///
/// ```ignore
/// let engine = Engine::new();
/// engine.add_mapping::<u32, bool>(|n| n > 0)?;
///
/// let flag = engine.convert::<bool>(1u32).await?;
/// assert_eq!(flag, Some(true));
/// ```
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    registry: Registry,
    overwrite: RwLock<Option<OverwritePolicy>>,
    default_source: PropertySource,
}

/// Builder for [`Engine`] construction.
#[derive(Default)]
pub struct EngineBuilder {
    default_source: PropertySource,
    overwrite: Option<OverwritePolicy>,
}

impl EngineBuilder {
    /// Default driving side for auto-mappings registered through
    /// [`Engine::add_auto_mapping`].
    #[must_use]
    pub fn property_source(mut self, mode: PropertySource) -> Self {
        self.default_source = mode;
        self
    }

    /// Install an overwrite policy at construction time.
    #[must_use]
    pub fn overwrite_policy<P>(mut self, policy: P) -> Self
    where
        P: Fn(TypeToken, TypeToken) -> bool + Send + Sync + 'static,
    {
        self.overwrite = Some(Arc::new(policy));
        self
    }

    /// Build the engine.
    #[must_use]
    pub fn build(self) -> Engine {
        Engine {
            inner: Arc::new(EngineInner {
                registry: Registry::new(),
                overwrite: RwLock::new(self.overwrite),
                default_source: self.default_source,
            }),
        }
    }
}

impl Engine {
    /// Create an engine with default settings and no registrations.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start building an engine.
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// The engine's mapping registry.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Register a synchronous conversion function for the `F -> T` pair,
    /// subject to the overwrite protocol.
    pub fn add_mapping<F, T>(
        &self,
        converter: impl Fn(F) -> T + Send + Sync + 'static,
    ) -> Result<()>
    where
        F: Convertible,
        T: Convertible,
    {
        let converter = Arc::new(converter);
        self.install::<F, T>(Arc::new(move |_engine, value| {
            let converter = converter.clone();
            Box::pin(async move {
                Ok(match value.take::<F>() {
                    Some(input) => Value::of(converter(input)),
                    None => Value::null(),
                })
            })
        }))
    }

    /// Register an asynchronous conversion function for the `F -> T` pair,
    /// subject to the overwrite protocol. The function may suspend before
    /// yielding its result.
    pub fn add_mapping_async<F, T, Fut>(
        &self,
        converter: impl Fn(F) -> Fut + Send + Sync + 'static,
    ) -> Result<()>
    where
        F: Convertible,
        T: Convertible,
        Fut: Future<Output = T> + Send + 'static,
    {
        let converter = Arc::new(converter);
        self.install::<F, T>(Arc::new(move |_engine, value| {
            let converter = converter.clone();
            Box::pin(async move {
                Ok(match value.take::<F>() {
                    Some(input) => Value::of(converter(input).await),
                    None => Value::null(),
                })
            })
        }))
    }

    /// Register a converter held in a typed [`Mapping`], subject to the
    /// overwrite protocol. Converter sets forward their scanned entries
    /// through this entrypoint.
    pub fn add_mapping_entry<F, T>(&self, mapping: &Mapping<F, T>) -> Result<()>
    where
        F: Convertible,
        T: Convertible,
    {
        self.install::<F, T>(mapping.as_converter())
    }

    /// Register a structural auto-mapping for the `F -> T` pair with the
    /// engine's default driving side and required properties. Use
    /// [`AutoMapping`] directly for other settings.
    pub fn add_auto_mapping<F, T>(&self) -> Result<()>
    where
        F: Convertible,
        T: Convertible + Default,
    {
        AutoMapping::<F, T>::new()
            .driven_by(self.inner.default_source)
            .register(self)
    }

    /// Whether a mapping is registered for the `F -> T` pair.
    #[must_use]
    pub fn has_mapping<F, T>(&self) -> bool
    where
        F: Convertible,
        T: Convertible,
    {
        let (from, to) = (F::info(), T::info());
        self.inner.registry.has(from.id, to.id)
    }

    /// Remove the mapping for the `F -> T` pair. Returns whether one
    /// existed.
    pub fn remove_mapping<F, T>(&self) -> bool
    where
        F: Convertible,
        T: Convertible,
    {
        let (from, to) = (F::info(), T::info());
        self.inner.registry.remove(from.id, to.id)
    }

    /// Drop every registration, returning to a clean state between
    /// independent usage sessions (test isolation, not hot-reload).
    pub fn reset(&self) {
        self.inner.registry.reset();
    }

    /// Install the overwrite policy consulted when a registration collides
    /// with an existing pair. Without a policy, collisions fail with
    /// `AlreadyDefined`.
    pub fn set_overwrite_policy<P>(&self, policy: P)
    where
        P: Fn(TypeToken, TypeToken) -> bool + Send + Sync + 'static,
    {
        *self.inner.overwrite.write() = Some(Arc::new(policy));
    }

    /// Remove the overwrite policy, restoring the no-silent-overwrite
    /// default.
    pub fn clear_overwrite_policy(&self) {
        *self.inner.overwrite.write() = None;
    }

    /// Shared registration path: wrap the pair in an entry and negotiate
    /// with the registry under the current overwrite policy.
    pub(crate) fn install<F, T>(&self, converter: ConverterFn) -> Result<()>
    where
        F: Convertible,
        T: Convertible,
    {
        let entry = MappingEntry {
            from: F::info().token(),
            to: T::info().token(),
            converter,
        };
        let policy = self.inner.overwrite.read().clone();
        self.inner.registry.register(entry, policy.as_ref())
    }

    // -----------------------------------------------------------------------
    // Conversion
    // -----------------------------------------------------------------------

    /// Convert a value to `T` through the recursive rule chain.
    ///
    /// Returns `None` for an absent input or an absent conversion result;
    /// no converter runs on absent input.
    pub async fn convert<T: Convertible>(&self, value: impl Into<Value>) -> Result<Option<T>> {
        let result = self.convert_value(value.into(), T::info()).await?;
        Ok(result.take::<T>())
    }

    /// Convert a value to `T`, then run a post-processing step on the
    /// top-level result only (nested values are untouched). The step is
    /// skipped when the result is absent; it may suspend.
    pub async fn convert_with<T, Fut>(
        &self,
        value: impl Into<Value>,
        after: impl FnOnce(T) -> Fut,
    ) -> Result<Option<T>>
    where
        T: Convertible,
        Fut: Future<Output = T>,
    {
        match self.convert::<T>(value).await? {
            Some(converted) => Ok(Some(after(converted).await)),
            None => Ok(None),
        }
    }

    /// Convert every element of a source sequence to `T`, concurrently,
    /// preserving source order. Absent elements stay absent.
    ///
    /// A non-sequence input is a decisive `MapperNotFound`; an absent
    /// input yields an empty result.
    pub async fn convert_sequence<T: Convertible>(
        &self,
        value: impl Into<Value>,
    ) -> Result<Vec<Option<T>>> {
        let mut value = value.into();

        // Flatten Option wrappers so Option<Vec<_>> sources behave like
        // their contents.
        loop {
            if value.is_null() {
                return Ok(Vec::new());
            }
            let Some(info) = value.type_info() else {
                return Ok(Vec::new());
            };
            match &info.shape {
                TypeShape::Nullable(shape) => {
                    value = match value.as_dyn() {
                        Some(held) => (shape.unwrap)(held),
                        None => Value::null(),
                    };
                }
                TypeShape::Sequence(shape) => {
                    let items = match value.as_dyn() {
                        Some(held) => (shape.elements)(held),
                        None => Vec::new(),
                    };
                    return try_join_all(items.into_iter().map(|item| self.convert::<T>(item)))
                        .await;
                }
                _ => {
                    return Err(ConvertError::not_found(info.name, T::info().name));
                }
            }
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("registry", &self.inner.registry)
            .finish()
    }
}
