// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Compile-time reflection model for conversion.
//!
//! Rust has no runtime property introspection, so every convertible type
//! carries an explicit shape table instead: [`TypeInfo`] (identity + shape),
//! generated by `#[derive(Remap)]` for user types and provided here for
//! primitives and the standard containers. [`Value`] is the nullable dynamic
//! box the engine passes between converters.

mod impls;
mod info;
mod value;

pub use info::{
    EnumShape, FieldShape, MapShape, NullableShape, SequenceShape, StructShape, TypeInfo,
    TypeShape, TypeToken,
};
pub use value::{Convertible, Value};
