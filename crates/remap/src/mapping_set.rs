// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed converter holders and declarative registration sets.
//!
//! A [`Mapping`] stores one conversion function with its type pair intact,
//! so a struct can carry a bundle of converters as plain fields. The
//! `#[derive(ConverterSet)]` macro scans such fields (marked
//! `#[remap(converter)]`) and generates [`ConverterSet::register_into`],
//! forwarding each held converter to the engine's registration entrypoint.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::engine::Engine;
use crate::error::Result;
use crate::reflect::{Convertible, Value};
use crate::registry::ConverterFn;

/// A conversion function between `F` and `T`, stored with its types.
///
/// Both registration shapes are accepted: a plain function via
/// [`Mapping::new`] and an asynchronous continuation via
/// [`Mapping::new_async`].
pub struct Mapping<F, T> {
    convert: Arc<dyn Fn(F) -> BoxFuture<'static, T> + Send + Sync>,
}

impl<F, T> Mapping<F, T>
where
    F: Convertible,
    T: Convertible,
{
    /// Wrap a synchronous conversion function.
    pub fn new<C>(converter: C) -> Self
    where
        C: Fn(F) -> T + Send + Sync + 'static,
    {
        Self {
            convert: Arc::new(move |input| {
                let output = converter(input);
                Box::pin(async move { output })
            }),
        }
    }

    /// Wrap an asynchronous conversion function.
    pub fn new_async<C, Fut>(converter: C) -> Self
    where
        C: Fn(F) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        Self {
            convert: Arc::new(move |input| Box::pin(converter(input))),
        }
    }

    /// Run the held conversion function directly.
    pub async fn apply(&self, input: F) -> T {
        (self.convert)(input).await
    }

    /// Type-erase the held function for registry storage.
    pub(crate) fn as_converter(&self) -> ConverterFn {
        let convert = self.convert.clone();
        Arc::new(move |_engine, value| {
            let convert = convert.clone();
            Box::pin(async move {
                Ok(match value.take::<F>() {
                    Some(input) => Value::of(convert(input).await),
                    None => Value::null(),
                })
            })
        })
    }
}

impl<F, T> Clone for Mapping<F, T> {
    fn clone(&self) -> Self {
        Self {
            convert: self.convert.clone(),
        }
    }
}

impl<F, T> fmt::Debug for Mapping<F, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Mapping({} -> {})",
            std::any::type_name::<F>(),
            std::any::type_name::<T>()
        )
    }
}

/// A bundle of converters registrable as a unit.
///
/// Derive with `#[derive(ConverterSet)]`; every field of type
/// [`Mapping<F, T>`] marked `#[remap(converter)]` is forwarded to
/// [`Engine::add_mapping_entry`], each registration subject to the
/// overwrite protocol.
pub trait ConverterSet {
    /// Register every held converter on the engine.
    fn register_into(&self, engine: &Engine) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_mapping_applies() {
        let mapping = Mapping::<u32, String>::new(|n| n.to_string());
        let out = futures::executor::block_on(mapping.apply(7));
        assert_eq!(out, "7");
    }

    #[test]
    fn async_mapping_applies() {
        let mapping = Mapping::<u32, u64>::new_async(|n| async move { u64::from(n) * 2 });
        let out = futures::executor::block_on(mapping.apply(21));
        assert_eq!(out, 42);
    }

    #[test]
    fn debug_names_the_pair() {
        let mapping = Mapping::<u32, bool>::new(|n| n > 0);
        assert_eq!(format!("{:?}", mapping), "Mapping(u32 -> bool)");
    }
}
