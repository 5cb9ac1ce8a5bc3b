// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic value container and the `Convertible` trait.

use std::any::Any;
use std::fmt;

use crate::reflect::info::{TypeInfo, TypeToken};

/// A type that can participate in conversion.
///
/// Implemented for primitives, `String` and the standard containers by this
/// crate, and for user structs and fieldless enums by `#[derive(Remap)]`.
/// Implementations are mechanical: every method forwards to the type itself
/// or to its [`TypeInfo`] table.
///
/// `Send + Sync` are supertraits because values are shared with conversion
/// futures that may run element conversions concurrently.
pub trait Convertible: Any + Send + Sync {
    /// Shape of this type.
    fn info() -> TypeInfo
    where
        Self: Sized;

    /// Shape of this value's runtime type (object-safe accessor).
    fn type_info(&self) -> TypeInfo;

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// Clone behind the trait object. Getters and sequence decomposition
    /// copy values out rather than moving them.
    fn clone_boxed(&self) -> Box<dyn Convertible>;
}

/// Nullable dynamic value: the currency of the conversion engine.
///
/// `Value::null()` is the absent sentinel of the conversion rules; a null
/// input converts to a null output before any converter runs.
pub struct Value {
    inner: Option<Box<dyn Convertible>>,
}

impl Value {
    /// The absent sentinel.
    #[must_use]
    pub fn null() -> Self {
        Self { inner: None }
    }

    /// Wrap a present value.
    #[must_use]
    pub fn of<T: Convertible>(value: T) -> Self {
        Self {
            inner: Some(Box::new(value)),
        }
    }

    /// Wrap an optional value, mapping `None` to the absent sentinel.
    #[must_use]
    pub fn opt<T: Convertible>(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::of(v),
            None => Self::null(),
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        self.inner.is_none()
    }

    /// Runtime shape of the held value, if present.
    #[must_use]
    pub fn type_info(&self) -> Option<TypeInfo> {
        self.inner.as_deref().map(Convertible::type_info)
    }

    /// Runtime identity of the held value, if present.
    #[must_use]
    pub fn token(&self) -> Option<TypeToken> {
        self.type_info().map(|info| info.token())
    }

    /// Borrow the held value as a trait object.
    #[must_use]
    pub fn as_dyn(&self) -> Option<&dyn Convertible> {
        self.inner.as_deref()
    }

    /// Take the held value out as `T`. Returns `None` for the absent
    /// sentinel or a runtime type other than `T`.
    #[must_use]
    pub fn take<T: Convertible>(self) -> Option<T> {
        self.inner
            .and_then(|boxed| boxed.into_any().downcast::<T>().ok())
            .map(|boxed| *boxed)
    }

    /// Borrow the held value as `&T`, if present and of that type.
    #[must_use]
    pub fn downcast_ref<T: Convertible>(&self) -> Option<&T> {
        self.inner
            .as_deref()
            .and_then(|boxed| boxed.as_any().downcast_ref::<T>())
    }
}

impl Clone for Value {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.as_deref().map(Convertible::clone_boxed),
        }
    }
}

// Manual Debug: the boxed value itself is not Debug, so print its type name.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.type_info() {
            Some(info) => write!(f, "Value({})", info.name),
            None => write!(f, "Value(null)"),
        }
    }
}

impl<T: Convertible> From<T> for Value {
    fn from(value: T) -> Self {
        Self::of(value)
    }
}
