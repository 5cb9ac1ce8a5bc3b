// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type shape metadata for runtime conversion dispatch.
//!
//! Every convertible type describes itself through a [`TypeInfo`]: a stable
//! identity plus a [`TypeShape`] telling the engine how to take the value
//! apart and how to build a fresh one. Struct and enum tables are generated
//! at compile time by `#[derive(Remap)]`; container shapes are filled in by
//! the blanket impls in `reflect::impls`.

use std::any::TypeId;

use crate::error::Result;
use crate::reflect::value::{Convertible, Value};

/// Stable runtime identity of a type: `TypeId` plus a display name.
///
/// This is the unit the registry keys on and the overwrite policy sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeToken {
    pub id: TypeId,
    pub name: &'static str,
}

/// Runtime type description: identity + shape.
#[derive(Debug, Clone)]
pub struct TypeInfo {
    pub id: TypeId,
    pub name: &'static str,
    pub shape: TypeShape,
}

impl TypeInfo {
    /// Identity token for registry keys and error reporting.
    #[must_use]
    pub fn token(&self) -> TypeToken {
        TypeToken {
            id: self.id,
            name: self.name,
        }
    }

    /// Field table, if this is a struct shape. Non-struct types copy as an
    /// empty field set during structural conversion.
    pub(crate) fn struct_shape(&self) -> Option<&StructShape> {
        match &self.shape {
            TypeShape::Struct(s) => Some(s),
            _ => None,
        }
    }
}

/// How the engine may take a value of this type apart.
#[derive(Debug, Clone)]
pub enum TypeShape {
    /// Atomic value with no convertible structure (numbers, bool, char).
    Opaque,
    /// Textual value (`String`). Participates in enum coercion.
    Text,
    /// Named fields with a compile-time binding table.
    Struct(StructShape),
    /// Fieldless enumeration with named variants.
    Enum(EnumShape),
    /// Ordered, finite collection of one element type.
    Sequence(SequenceShape),
    /// Keyed mapping with key and value element types.
    Map(MapShape),
    /// `Option<T>`: the inner type plus unwrap/wrap thunks. Absence flows
    /// through conversion as [`Value::null`] and is re-wrapped on the way
    /// into a nullable target.
    Nullable(NullableShape),
}

/// Unwrap/wrap vtable for `Option<T>`.
#[derive(Debug, Clone)]
pub struct NullableShape {
    /// Inner type shape.
    pub inner: fn() -> TypeInfo,
    /// `Some(inner)` → present inner value, `None` → null.
    pub unwrap: fn(&dyn Convertible) -> Value,
    /// Present value → `Some`, null → `None`, boxed as the option type.
    pub wrap: fn(Value) -> Value,
}

/// Compile-time property-binding table for a struct type.
///
/// `fields` is a static table emitted by the derive: one entry per named
/// field, each carrying the declared name, the optional rename override,
/// and monomorphic getter/setter thunks operating through `dyn Convertible`.
#[derive(Debug, Clone)]
pub struct StructShape {
    /// Construct a fresh default-initialized instance.
    pub new_instance: fn() -> Value,
    pub fields: &'static [FieldShape],
}

/// One entry of a property-binding table.
#[derive(Debug)]
pub struct FieldShape {
    /// Declared field name.
    pub name: &'static str,
    /// Rename override from `#[remap(rename = "...")]`, if any.
    pub rename: Option<&'static str>,
    /// Shape of the field's declared value type.
    pub ty: fn() -> TypeInfo,
    /// Read the field out of a value of the owning type (clones).
    pub get: fn(&dyn Convertible) -> Value,
    /// Write a converted value into the field. A null value leaves the
    /// field at its default-initialized state.
    pub set: fn(&mut dyn Convertible, Value),
}

impl FieldShape {
    /// The name this field resolves under on the other side: the rename
    /// override when declared, the field's own name otherwise.
    #[must_use]
    pub fn binding_name(&self) -> &'static str {
        self.rename.unwrap_or(self.name)
    }
}

/// Variant table for a fieldless enumeration.
#[derive(Debug, Clone)]
pub struct EnumShape {
    /// Declared variant names, in declaration order.
    pub variants: &'static [&'static str],
    /// Construct the variant at the given index of `variants`.
    pub construct: fn(usize) -> Value,
    /// Declared name of the given value's variant.
    pub variant_name: fn(&dyn Convertible) -> &'static str,
}

/// Decompose/assemble vtable for a sequence type.
#[derive(Debug, Clone)]
pub struct SequenceShape {
    /// Element type shape.
    pub element: fn() -> TypeInfo,
    /// Fixed length for array types, `None` for growable sequences.
    pub fixed_len: Option<usize>,
    /// Clone the elements out, in order. Null entries represent `None`
    /// elements of `Vec<Option<T>>` sources.
    pub elements: fn(&dyn Convertible) -> Vec<Value>,
    /// Build a new instance from converted elements, preserving order.
    pub assemble: fn(Vec<Value>) -> Result<Value>,
}

/// Decompose/assemble vtable for a keyed-mapping type.
#[derive(Debug, Clone)]
pub struct MapShape {
    /// Key type shape.
    pub key: fn() -> TypeInfo,
    /// Value type shape.
    pub value: fn() -> TypeInfo,
    /// Clone the entries out. Iteration order is whatever the container
    /// yields; the engine makes no ordering promise.
    pub entries: fn(&dyn Convertible) -> Vec<(Value, Value)>,
    /// Build a new instance from converted entries.
    pub assemble: fn(Vec<(Value, Value)>) -> Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::value::Convertible;

    #[test]
    fn token_carries_id_and_name() {
        let info = <u32 as Convertible>::info();
        let token = info.token();
        assert_eq!(token.id, TypeId::of::<u32>());
        assert_eq!(token.name, "u32");
    }

    #[test]
    fn string_is_text_shaped() {
        let info = <String as Convertible>::info();
        assert!(matches!(info.shape, TypeShape::Text));
    }

    #[test]
    fn vec_is_sequence_shaped() {
        let info = <Vec<u8> as Convertible>::info();
        match info.shape {
            TypeShape::Sequence(seq) => {
                assert_eq!((seq.element)().id, TypeId::of::<u8>());
                assert_eq!(seq.fixed_len, None);
            }
            other => panic!("expected sequence shape, got {:?}", other),
        }
    }

    #[test]
    fn array_reports_fixed_len() {
        let info = <[i32; 4] as Convertible>::info();
        match info.shape {
            TypeShape::Sequence(seq) => assert_eq!(seq.fixed_len, Some(4)),
            other => panic!("expected sequence shape, got {:?}", other),
        }
    }
}
