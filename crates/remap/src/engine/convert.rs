// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Recursive value conversion: the rule chain behind every property copy
//! and every top-level `convert` call.

use futures::future::BoxFuture;

use crate::engine::Engine;
use crate::error::{ConvertError, Result};
use crate::reflect::{MapShape, SequenceShape, TypeInfo, TypeShape, Value};

impl Engine {
    /// Convert a dynamic value to the target type.
    ///
    /// Rules apply in strict priority order; the first match wins:
    ///
    /// 1. null converts to null, no converter runs
    /// 2. a value already of the target type passes through unchanged
    /// 3. a registered mapping for the runtime pair executes
    /// 4. keyed mappings convert entry-wise into a keyed-mapping target
    /// 5. enum coercion (text to variant, variant to text)
    /// 6. sequence coercion element-wise
    /// 7. `MapperNotFound`
    ///
    /// `Option` sources flatten and `Option` targets re-wrap between rules
    /// 3 and 4, so a registered `F -> T` mapping also serves
    /// `Option<F> -> Option<T>` without a dedicated entry.
    pub fn convert_value(&self, value: Value, target: TypeInfo) -> BoxFuture<'_, Result<Value>> {
        Box::pin(async move {
            // Rule 1: absent propagates without consulting any converter.
            if value.is_null() {
                return Ok(match &target.shape {
                    TypeShape::Nullable(shape) => (shape.wrap)(Value::null()),
                    _ => Value::null(),
                });
            }
            let Some(info) = value.type_info() else {
                return Ok(Value::null());
            };

            // Rule 2: identity is the whole assignability relation here.
            if info.id == target.id {
                return Ok(value);
            }

            // Rule 3: registered converter for the runtime pair.
            if let Some(entry) = self.registry().find(info.id, target.id) {
                log::trace!(
                    "convert: {} -> {} via registered mapping",
                    info.name,
                    target.name
                );
                return (entry.converter)(self, value).await;
            }

            // Nullable normalization: flatten an Option source, re-wrap
            // into an Option target.
            if let TypeShape::Nullable(shape) = &info.shape {
                let inner = match value.as_dyn() {
                    Some(held) => (shape.unwrap)(held),
                    None => Value::null(),
                };
                return self.convert_value(inner, target).await;
            }
            if let TypeShape::Nullable(shape) = &target.shape {
                let converted = self.convert_value(value, (shape.inner)()).await?;
                return Ok((shape.wrap)(converted));
            }

            // Rule 4: keyed mappings convert entry-wise.
            if let TypeShape::Map(source_shape) = &info.shape {
                return match &target.shape {
                    TypeShape::Map(target_shape) => {
                        self.coerce_map(&value, source_shape, target_shape).await
                    }
                    _ => Err(ConvertError::not_found(info.name, target.name)),
                };
            }

            // Rule 5: enum coercion.
            if matches!(info.shape, TypeShape::Enum(_))
                || matches!(target.shape, TypeShape::Enum(_))
            {
                return coerce_enum(value, &info, &target);
            }

            // Rule 6: sequence coercion.
            if let TypeShape::Sequence(source_shape) = &info.shape {
                return self.coerce_sequence(&value, source_shape, &target).await;
            }

            // Rule 7: no conversion path.
            Err(ConvertError::not_found(info.name, target.name))
        })
    }

    /// Entry-wise map conversion: keys to the target key type, values to
    /// the target value type. Source key order is not preserved.
    async fn coerce_map(
        &self,
        value: &Value,
        source: &MapShape,
        target: &MapShape,
    ) -> Result<Value> {
        let entries = match value.as_dyn() {
            Some(held) => (source.entries)(held),
            None => Vec::new(),
        };
        let key_ty = (target.key)();
        let value_ty = (target.value)();

        let mut converted = Vec::with_capacity(entries.len());
        for (key, entry_value) in entries {
            let key = self.convert_value(key, key_ty.clone()).await?;
            let entry_value = self.convert_value(entry_value, value_ty.clone()).await?;
            converted.push((key, entry_value));
        }
        Ok((target.assemble)(converted))
    }

    /// Element-wise sequence conversion.
    ///
    /// The element type is the target's when the target is itself a
    /// sequence; otherwise the whole target type serves as the element type
    /// and assembly necessarily fails with `ListConverterMissing` after the
    /// elements convert.
    async fn coerce_sequence(
        &self,
        value: &Value,
        source: &SequenceShape,
        target: &TypeInfo,
    ) -> Result<Value> {
        let assemble = match &target.shape {
            TypeShape::Sequence(shape) => Some(shape.assemble),
            _ => None,
        };
        let element_ty = match &target.shape {
            TypeShape::Sequence(shape) => (shape.element)(),
            _ => target.clone(),
        };

        let items = match value.as_dyn() {
            Some(held) => (source.elements)(held),
            None => Vec::new(),
        };
        // Sibling elements have no ordering dependency; convert them
        // concurrently and join in source order.
        let converted = futures::future::try_join_all(
            items
                .into_iter()
                .map(|item| self.convert_value(item, element_ty.clone())),
        )
        .await?;

        match assemble {
            Some(assemble) => assemble(converted),
            None => Err(ConvertError::ListConverterMissing {
                target: target.name,
            }),
        }
    }
}

/// Enum coercion. Two directions only: textual value to enum variant
/// (case-insensitive parse) and enum variant to its declared name. Anything
/// else that reaches this rule, notably a pair of distinct enum types, has
/// no conversion path.
fn coerce_enum(value: Value, info: &TypeInfo, target: &TypeInfo) -> Result<Value> {
    match (&info.shape, &target.shape) {
        (TypeShape::Text, TypeShape::Enum(shape)) => {
            let Some(text) = value.downcast_ref::<String>() else {
                return Err(ConvertError::not_found(info.name, target.name));
            };
            match shape
                .variants
                .iter()
                .position(|variant| variant.eq_ignore_ascii_case(text))
            {
                Some(index) => Ok((shape.construct)(index)),
                None => Err(ConvertError::InvalidEnumValue {
                    value: text.clone(),
                    target: target.name,
                }),
            }
        }
        (TypeShape::Enum(shape), TypeShape::Text) => match value.as_dyn() {
            Some(held) => Ok(Value::of((shape.variant_name)(held).to_string())),
            None => Ok(Value::null()),
        },
        _ => Err(ConvertError::not_found(info.name, target.name)),
    }
}
