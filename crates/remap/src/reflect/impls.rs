// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `Convertible` impls for primitives and the standard containers.
//!
//! Container shapes are filled with monomorphized free functions so the
//! vtables stay plain `fn` pointers.

use std::any::{type_name, Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use crate::error::{ConvertError, Result};
use crate::reflect::info::{MapShape, NullableShape, SequenceShape, TypeInfo, TypeShape};
use crate::reflect::value::{Convertible, Value};

/// Common object-safe plumbing shared by every impl in this module.
macro_rules! convertible_common {
    () => {
        fn type_info(&self) -> TypeInfo {
            <Self as Convertible>::info()
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }

        fn into_any(self: Box<Self>) -> Box<dyn Any> {
            self
        }

        fn clone_boxed(&self) -> Box<dyn Convertible> {
            Box::new(self.clone())
        }
    };
}

// ---------------------------------------------------------------------------
// Opaque primitives
// ---------------------------------------------------------------------------

macro_rules! impl_opaque {
    ($($ty:ty),* $(,)?) => {$(
        impl Convertible for $ty {
            fn info() -> TypeInfo {
                TypeInfo {
                    id: TypeId::of::<$ty>(),
                    name: type_name::<$ty>(),
                    shape: TypeShape::Opaque,
                }
            }

            convertible_common!();
        }
    )*};
}

impl_opaque!(
    bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64,
);

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

impl Convertible for String {
    fn info() -> TypeInfo {
        TypeInfo {
            id: TypeId::of::<String>(),
            name: "String",
            shape: TypeShape::Text,
        }
    }

    convertible_common!();
}

// ---------------------------------------------------------------------------
// Option<T>
// ---------------------------------------------------------------------------

fn option_unwrap<T: Convertible + Clone>(obj: &dyn Convertible) -> Value {
    match obj.as_any().downcast_ref::<Option<T>>() {
        Some(Some(inner)) => Value::of(inner.clone()),
        _ => Value::null(),
    }
}

fn option_wrap<T: Convertible + Clone>(value: Value) -> Value {
    Value::of(value.take::<T>())
}

impl<T: Convertible + Clone> Convertible for Option<T> {
    fn info() -> TypeInfo {
        TypeInfo {
            id: TypeId::of::<Option<T>>(),
            name: type_name::<Option<T>>(),
            shape: TypeShape::Nullable(NullableShape {
                inner: T::info,
                unwrap: option_unwrap::<T>,
                wrap: option_wrap::<T>,
            }),
        }
    }

    convertible_common!();
}

// ---------------------------------------------------------------------------
// Sequences
// ---------------------------------------------------------------------------

fn vec_elements<T: Convertible + Clone>(obj: &dyn Convertible) -> Vec<Value> {
    match obj.as_any().downcast_ref::<Vec<T>>() {
        Some(items) => items.iter().map(|item| Value::of(item.clone())).collect(),
        None => Vec::new(),
    }
}

fn vec_assemble<T: Convertible + Clone>(items: Vec<Value>) -> Result<Value> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match item.take::<T>() {
            Some(element) => out.push(element),
            None => {
                return Err(ConvertError::ListConverterMissing {
                    target: type_name::<Vec<T>>(),
                })
            }
        }
    }
    Ok(Value::of(out))
}

impl<T: Convertible + Clone> Convertible for Vec<T> {
    fn info() -> TypeInfo {
        TypeInfo {
            id: TypeId::of::<Vec<T>>(),
            name: type_name::<Vec<T>>(),
            shape: TypeShape::Sequence(SequenceShape {
                element: T::info,
                fixed_len: None,
                elements: vec_elements::<T>,
                assemble: vec_assemble::<T>,
            }),
        }
    }

    convertible_common!();
}

fn array_elements<T: Convertible + Clone, const N: usize>(obj: &dyn Convertible) -> Vec<Value> {
    match obj.as_any().downcast_ref::<[T; N]>() {
        Some(items) => items.iter().map(|item| Value::of(item.clone())).collect(),
        None => Vec::new(),
    }
}

fn array_assemble<T: Convertible + Clone, const N: usize>(items: Vec<Value>) -> Result<Value> {
    if items.len() != N {
        return Err(ConvertError::ListConverterMissing {
            target: type_name::<[T; N]>(),
        });
    }
    let mut out = Vec::with_capacity(N);
    for item in items {
        match item.take::<T>() {
            Some(element) => out.push(element),
            None => {
                return Err(ConvertError::ListConverterMissing {
                    target: type_name::<[T; N]>(),
                })
            }
        }
    }
    match <[T; N]>::try_from(out) {
        Ok(array) => Ok(Value::of(array)),
        Err(_) => Err(ConvertError::ListConverterMissing {
            target: type_name::<[T; N]>(),
        }),
    }
}

impl<T: Convertible + Clone, const N: usize> Convertible for [T; N] {
    fn info() -> TypeInfo {
        TypeInfo {
            id: TypeId::of::<[T; N]>(),
            name: type_name::<[T; N]>(),
            shape: TypeShape::Sequence(SequenceShape {
                element: T::info,
                fixed_len: Some(N),
                elements: array_elements::<T, N>,
                assemble: array_assemble::<T, N>,
            }),
        }
    }

    convertible_common!();
}

// ---------------------------------------------------------------------------
// Keyed mappings
// ---------------------------------------------------------------------------

fn hash_map_entries<K, V>(obj: &dyn Convertible) -> Vec<(Value, Value)>
where
    K: Convertible + Clone + Eq + Hash,
    V: Convertible + Clone,
{
    match obj.as_any().downcast_ref::<HashMap<K, V>>() {
        Some(map) => map
            .iter()
            .map(|(k, v)| (Value::of(k.clone()), Value::of(v.clone())))
            .collect(),
        None => Vec::new(),
    }
}

fn hash_map_assemble<K, V>(entries: Vec<(Value, Value)>) -> Value
where
    K: Convertible + Clone + Eq + Hash,
    V: Convertible + Clone,
{
    let mut out = HashMap::with_capacity(entries.len());
    for (key, value) in entries {
        match (key.take::<K>(), value.take::<V>()) {
            (Some(k), Some(v)) => {
                out.insert(k, v);
            }
            _ => log::debug!(
                "map assembly: dropped entry with null component for {}",
                type_name::<HashMap<K, V>>()
            ),
        }
    }
    Value::of(out)
}

impl<K, V> Convertible for HashMap<K, V>
where
    K: Convertible + Clone + Eq + Hash,
    V: Convertible + Clone,
{
    fn info() -> TypeInfo {
        TypeInfo {
            id: TypeId::of::<HashMap<K, V>>(),
            name: type_name::<HashMap<K, V>>(),
            shape: TypeShape::Map(MapShape {
                key: K::info,
                value: V::info,
                entries: hash_map_entries::<K, V>,
                assemble: hash_map_assemble::<K, V>,
            }),
        }
    }

    convertible_common!();
}

fn btree_map_entries<K, V>(obj: &dyn Convertible) -> Vec<(Value, Value)>
where
    K: Convertible + Clone + Ord,
    V: Convertible + Clone,
{
    match obj.as_any().downcast_ref::<BTreeMap<K, V>>() {
        Some(map) => map
            .iter()
            .map(|(k, v)| (Value::of(k.clone()), Value::of(v.clone())))
            .collect(),
        None => Vec::new(),
    }
}

fn btree_map_assemble<K, V>(entries: Vec<(Value, Value)>) -> Value
where
    K: Convertible + Clone + Ord,
    V: Convertible + Clone,
{
    let mut out = BTreeMap::new();
    for (key, value) in entries {
        match (key.take::<K>(), value.take::<V>()) {
            (Some(k), Some(v)) => {
                out.insert(k, v);
            }
            _ => log::debug!(
                "map assembly: dropped entry with null component for {}",
                type_name::<BTreeMap<K, V>>()
            ),
        }
    }
    Value::of(out)
}

impl<K, V> Convertible for BTreeMap<K, V>
where
    K: Convertible + Clone + Ord,
    V: Convertible + Clone,
{
    fn info() -> TypeInfo {
        TypeInfo {
            id: TypeId::of::<BTreeMap<K, V>>(),
            name: type_name::<BTreeMap<K, V>>(),
            shape: TypeShape::Map(MapShape {
                key: K::info,
                value: V::info,
                entries: btree_map_entries::<K, V>,
                assemble: btree_map_assemble::<K, V>,
            }),
        }
    }

    convertible_common!();
}
