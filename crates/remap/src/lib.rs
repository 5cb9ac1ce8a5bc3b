// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # REMAP - Runtime type-pair-keyed object conversion
//!
//! A conversion engine for Rust: register conversion functions between two
//! type identities, then ask the engine to produce a value of a target type
//! from an arbitrary source value. Converters may suspend, nested values
//! convert recursively, and structural mappings between similar types are
//! synthesized from compile-time property-binding tables.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use remap::{Engine, Remap, Result};
//!
//! #[derive(Remap, Default, Clone)]
//! struct Order {
//!     id: u64,
//!     customer: String,
//! }
//!
//! #[derive(Remap, Default, Clone)]
//! struct OrderView {
//!     id: u64,
//!     customer: String,
//! }
//!
//! # async fn example() -> Result<()> {
//! let engine = Engine::new();
//! engine.add_auto_mapping::<Order, OrderView>()?;
//!
//! let view = engine
//!     .convert::<OrderView>(Order { id: 7, customer: "acme".into() })
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +------------------------------------------------------------+
//! |                      Application Layer                     |
//! |   Engine::convert / convert_with / convert_sequence        |
//! +------------------------------------------------------------+
//! |                     Conversion Engine                      |
//! |   rule chain: null | identity | registry | map | enum |    |
//! |   sequence  -  structural auto-converter                   |
//! +------------------------------------------------------------+
//! |                     Mapping Registry                       |
//! |   concurrent (from, to) -> converter store, overwrite      |
//! |   negotiation                                              |
//! +------------------------------------------------------------+
//! |                     Reflection Model                       |
//! |   TypeInfo shape tables, #[derive(Remap)] bindings         |
//! +------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Engine`] | Entry point: registration and conversion |
//! | [`AutoMapping`] | Builder for structural auto-converters |
//! | [`Mapping`] | Typed converter holder for converter sets |
//! | [`Value`] | Nullable dynamic value passed between converters |
//! | [`ConvertError`] | Conversion and registration error taxonomy |

// Allow the derive macros to work inside this crate's tests
extern crate self as remap;

/// Conversion engine, structural auto-converter and property resolution.
pub mod engine;
/// Error taxonomy for registration and conversion.
pub mod error;
/// Typed converter holders and declarative converter sets.
pub mod mapping_set;
/// Compile-time reflection model (type shapes, dynamic values).
pub mod reflect;
/// Concurrent mapping registry keyed by the type pair.
pub mod registry;

pub use engine::{AutoMapping, Engine, EngineBuilder, PropertySource};
pub use error::{ConvertError, Result};
pub use mapping_set::{ConverterSet, Mapping};
pub use reflect::{Convertible, TypeInfo, TypeShape, TypeToken, Value};
pub use registry::{MappingEntry, OverwritePolicy, Registry};

pub use remap_codegen::{ConverterSet, Remap};
