//! Newtype IDs for type-safe entity references.
//!
//! The commerce API hands out identifiers as opaque strings (document ids)
//! but older fixtures use plain integers. Use the `define_id!` macro to
//! create wrappers that accept either on the wire and always compare as
//! strings.

use serde::Deserialize;

/// Errors that can occur when parsing an identifier.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The input is empty or whitespace only.
    #[error("id cannot be empty")]
    Empty,
}

/// Wire representation of an identifier before normalisation.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Number(i64),
}

impl RawId {
    /// Render the raw value as a string.
    #[must_use]
    pub fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => n.to_string(),
        }
    }
}

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize` as a plain string, `Deserialize` from a string or integer
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - `parse()`, `as_str()`, `into_inner()`
/// - `Display` and `FromStr`
///
/// # Example
///
/// ```rust
/// # use classic_carry_core::define_id;
/// define_id!(ShelfId);
///
/// let id = ShelfId::parse("  shelf-7 ").unwrap();
/// assert_eq!(id.as_str(), "shelf-7");
/// assert!(ShelfId::parse("   ").is_err());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Parse an ID, trimming surrounding whitespace.
            ///
            /// # Errors
            ///
            /// Returns an error if the trimmed input is empty.
            pub fn parse(raw: &str) -> ::core::result::Result<Self, $crate::types::id::IdError> {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err($crate::types::id::IdError::Empty);
                }
                Ok(Self(trimmed.to_owned()))
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::types::id::IdError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                let raw = <$crate::types::id::RawId as ::serde::Deserialize>::deserialize(
                    deserializer,
                )?;
                Self::parse(&raw.into_string()).map_err(::serde::de::Error::custom)
            }
        }
    };
}

// Define standard entity IDs
define_id!(ProductId);
define_id!(CategoryId);
define_id!(UserId);
define_id!(OrderNumber);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_whitespace() {
        let id = ProductId::parse("  abc123 ").unwrap();
        assert_eq!(id.as_str(), "abc123");
        assert_eq!(id.to_string(), "abc123");
    }

    #[test]
    fn test_parse_rejects_blank() {
        assert_eq!(ProductId::parse(""), Err(IdError::Empty));
        assert_eq!(ProductId::parse(" \t"), Err(IdError::Empty));
    }

    #[test]
    fn test_deserialize_from_string_and_number() {
        let from_text: ProductId = serde_json::from_str("\"65f1c0ffee\"").unwrap();
        assert_eq!(from_text.as_str(), "65f1c0ffee");

        let from_number: ProductId = serde_json::from_str("42").unwrap();
        assert_eq!(from_number.as_str(), "42");
    }

    #[test]
    fn test_deserialize_rejects_empty_string() {
        let result: Result<ProductId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = OrderNumber::parse("CC-1001").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"CC-1001\"");
    }

    #[test]
    fn test_numeric_and_text_ids_compare_equal() {
        let a: ProductId = serde_json::from_str("7").unwrap();
        let b = ProductId::parse("7").unwrap();
        assert_eq!(a, b);
    }
}
