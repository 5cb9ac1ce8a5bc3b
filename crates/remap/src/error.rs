// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for conversion and registration operations.

use std::fmt;

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Errors that can occur during registration or conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// Registration collided with an existing mapping for the same type
    /// pair, and either no overwrite policy is set or the policy denied
    /// the replacement.
    AlreadyDefined {
        from: &'static str,
        to: &'static str,
    },

    /// No registered or derivable conversion path exists for the pair.
    MapperNotFound {
        from: &'static str,
        to: &'static str,
    },

    /// Structural copy required every driving property to resolve and one
    /// did not.
    PropertyMappingMissing { property: &'static str },

    /// A sequence value was encountered but the target type cannot hold the
    /// converted elements.
    ListConverterMissing { target: &'static str },

    /// Textual value does not match any variant of the target enumeration.
    InvalidEnumValue {
        value: String,
        target: &'static str,
    },
}

impl ConvertError {
    /// Create a `MapperNotFound` error for a type pair.
    pub(crate) fn not_found(from: &'static str, to: &'static str) -> Self {
        Self::MapperNotFound { from, to }
    }

    /// Create an `AlreadyDefined` error for a type pair.
    pub(crate) fn already_defined(from: &'static str, to: &'static str) -> Self {
        Self::AlreadyDefined { from, to }
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyDefined { from, to } => {
                write!(f, "mapping between {} and {} already exists", from, to)
            }
            Self::MapperNotFound { from, to } => {
                write!(f, "converter between {} and {} not found", from, to)
            }
            Self::PropertyMappingMissing { property } => {
                write!(f, "property mapping for {} not found", property)
            }
            Self::ListConverterMissing { target } => {
                write!(f, "converting sequence to {} could not be done", target)
            }
            Self::InvalidEnumValue { value, target } => {
                write!(f, "no variant of {} matches '{}'", target, value)
            }
        }
    }
}

impl std::error::Error for ConvertError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_both_types() {
        let err = ConvertError::not_found("String", "bool");
        assert_eq!(err.to_string(), "converter between String and bool not found");
    }

    #[test]
    fn display_names_missing_property() {
        let err = ConvertError::PropertyMappingMissing { property: "age" };
        assert_eq!(err.to_string(), "property mapping for age not found");
    }

    #[test]
    fn display_names_enum_target() {
        let err = ConvertError::InvalidEnumValue {
            value: "Maybe".into(),
            target: "Answer",
        };
        assert_eq!(err.to_string(), "no variant of Answer matches 'Maybe'");
    }
}
