// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Structural auto-converter: a conversion function synthesized from
//! property-by-property copying instead of hand-written logic.
//!
//! Bindings are resolved against the live shape tables on every run; no
//! schema is cached between conversions.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::engine::Engine;
use crate::error::{ConvertError, Result};
use crate::reflect::{Convertible, FieldShape, StructShape, Value};
use crate::registry::ConverterFn;

/// Which side's declared properties drive the copy loop.
///
/// The driving side is the one that must be fully satisfied when
/// "require all" is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PropertySource {
    /// Iterate the source type's properties and push to target matches.
    Source,
    /// Iterate the target type's properties and pull from source matches.
    #[default]
    Target,
}

/// Manual finishing step: receives the original source and the structurally
/// built target, and yields the final result. May suspend.
type FinishFn<F, T> = Arc<dyn Fn(F, T) -> BoxFuture<'static, T> + Send + Sync>;

/// Resolve a driving field against the other side's field table: the
/// field's declared name, or its rename override, looked up exactly
/// (case-sensitive, no type check).
pub(crate) fn resolve<'a>(field: &FieldShape, other: &'a StructShape) -> Option<&'a FieldShape> {
    let name = field.binding_name();
    other.fields.iter().find(|candidate| candidate.name == name)
}

/// Builder for an auto-generated structural mapping between two types.
///
/// Defaults: driven by the target type's properties, every driving
/// property required. Attaching a finishing step relaxes the default to
/// lenient copying, matching the two registration forms.
///
/// # Example
///
/// ```ignore
/// AutoMapping::<Order, OrderView>::new()
///     .driven_by(PropertySource::Target)
///     .require_all(true)
///     .register(&engine)?;
/// ```
pub struct AutoMapping<F, T> {
    driven_by: PropertySource,
    require_all: Option<bool>,
    finish: Option<FinishFn<F, T>>,
}

impl<F, T> AutoMapping<F, T>
where
    F: Convertible,
    T: Convertible + Default,
{
    /// Start a builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            driven_by: PropertySource::default(),
            require_all: None,
            finish: None,
        }
    }

    /// Choose which side's properties drive the copy loop.
    #[must_use]
    pub fn driven_by(mut self, mode: PropertySource) -> Self {
        self.driven_by = mode;
        self
    }

    /// Whether every driving property must resolve to a counterpart.
    /// Unresolved properties fail with `PropertyMappingMissing` when set,
    /// and are skipped silently otherwise.
    #[must_use]
    pub fn require_all(mut self, required: bool) -> Self {
        self.require_all = Some(required);
        self
    }

    /// Attach a manual finishing step, run after the structural copy with
    /// the original source and the built target.
    #[must_use]
    pub fn finish_with<C, Fut>(mut self, step: C) -> Self
    where
        C: Fn(F, T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        self.finish = Some(Arc::new(move |source, target| {
            Box::pin(step(source, target))
        }));
        self
    }

    /// Register the generated converter on the engine, subject to the
    /// overwrite protocol.
    pub fn register(self, engine: &Engine) -> Result<()> {
        engine.install::<F, T>(self.into_converter())
    }

    /// Build the type-erased converter.
    ///
    /// The generated function, given a source value:
    /// - null produces null without constructing a target;
    /// - otherwise a fresh default-initialized target receives every
    ///   resolvable property, each value recursively converted to the
    ///   bound field's declared type;
    /// - the finishing step, when present, produces the final result.
    pub(crate) fn into_converter(self) -> ConverterFn {
        let mode = self.driven_by;
        let require_all = self.require_all.unwrap_or(self.finish.is_none());
        let finish = self.finish;

        Arc::new(move |engine: &Engine, source: Value| {
            let engine = engine.clone();
            let finish = finish.clone();
            Box::pin(async move {
                if source.is_null() {
                    return Ok(Value::null());
                }

                let mut target = T::default();
                copy_properties(&engine, &source, &mut target, mode, require_all).await?;

                let result = match finish {
                    Some(step) => match source.take::<F>() {
                        Some(original) => step(original, target).await,
                        None => return Ok(Value::null()),
                    },
                    None => target,
                };
                Ok(Value::of(result))
            })
        })
    }
}

impl<F, T> Default for AutoMapping<F, T>
where
    F: Convertible,
    T: Convertible + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Copy every resolvable property from `source` into `target`, converting
/// each value through the engine.
async fn copy_properties<T: Convertible>(
    engine: &Engine,
    source: &Value,
    target: &mut T,
    mode: PropertySource,
    require_all: bool,
) -> Result<()> {
    let Some(source_dyn) = source.as_dyn() else {
        return Ok(());
    };
    let source_info = source_dyn.type_info();
    let target_info = T::info();

    // Non-struct shapes declare no properties; the copy loop is empty.
    let (Some(source_shape), Some(target_shape)) =
        (source_info.struct_shape(), target_info.struct_shape())
    else {
        return Ok(());
    };

    match mode {
        PropertySource::Target => {
            for field in target_shape.fields {
                match resolve(field, source_shape) {
                    Some(bound) => {
                        let raw = (bound.get)(source_dyn);
                        let converted = engine.convert_value(raw, (field.ty)()).await?;
                        (field.set)(target, converted);
                    }
                    None if require_all => {
                        return Err(ConvertError::PropertyMappingMissing {
                            property: field.name,
                        })
                    }
                    None => {}
                }
            }
        }
        PropertySource::Source => {
            for field in source_shape.fields {
                match resolve(field, target_shape) {
                    Some(bound) => {
                        let raw = (field.get)(source_dyn);
                        let converted = engine.convert_value(raw, (bound.ty)()).await?;
                        (bound.set)(target, converted);
                    }
                    None if require_all => {
                        return Err(ConvertError::PropertyMappingMissing {
                            property: field.name,
                        })
                    }
                    None => {}
                }
            }
        }
    }
    Ok(())
}
