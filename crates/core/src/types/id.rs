//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.

/// Errors that can occur when parsing an ID from user input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IdParseError {
    /// The input string is empty (after trimming).
    #[error("id cannot be empty")]
    Empty,
    /// The input contains something other than ASCII digits.
    #[error("id must contain only digits: {0}")]
    NotNumeric(String),
    /// The input is numeric but does not fit the id range.
    #[error("id is out of range: {0}")]
    OutOfRange(String),
}

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i64` (the backend uses 64-bit keys) with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`, so the ID also
///   works as a JSON object key
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_i64()`
/// - `From<i64>` and `Into<i64>` implementations
/// - `FromStr` accepting trimmed, digits-only input
///
/// # Example
///
/// ```rust
/// # use shopline_core::define_id;
/// define_id!(WidgetId);
/// define_id!(GadgetId);
///
/// let widget_id = WidgetId::new(1);
/// let gadget_id: GadgetId = " 42 ".parse().unwrap();
///
/// assert_eq!(gadget_id.as_i64(), 42);
/// // These are different types, so this won't compile:
/// // let _: WidgetId = gadget_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new ID from an i64 value.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying i64 value.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::types::id::IdParseError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err($crate::types::id::IdParseError::Empty);
                }
                if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
                    return Err($crate::types::id::IdParseError::NotNumeric(
                        trimmed.to_owned(),
                    ));
                }
                trimmed
                    .parse::<i64>()
                    .map(Self)
                    .map_err(|_| $crate::types::id::IdParseError::OutOfRange(trimmed.to_owned()))
            }
        }
    };
}

// Define standard entity IDs
define_id!(ProductId);
define_id!(OrderId);
define_id!(OrderItemId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn test_parse_trims_whitespace() {
        let id: OrderId = "  1024\n".parse().unwrap();
        assert_eq!(id, OrderId::new(1024));
    }

    #[test]
    fn test_parse_rejects_non_digits() {
        assert_eq!("".parse::<OrderId>(), Err(IdParseError::Empty));
        assert_eq!("   ".parse::<OrderId>(), Err(IdParseError::Empty));
        assert!(matches!(
            "-5".parse::<OrderId>(),
            Err(IdParseError::NotNumeric(_))
        ));
        assert!(matches!(
            "12a".parse::<ProductId>(),
            Err(IdParseError::NotNumeric(_))
        ));
    }

    #[test]
    fn test_parse_out_of_range() {
        assert!(matches!(
            "99999999999999999999".parse::<ProductId>(),
            Err(IdParseError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_ids_work_as_json_object_keys() {
        let mut map = BTreeMap::new();
        map.insert(ProductId::new(7), 2_u32);
        map.insert(ProductId::new(3), 1_u32);

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"3":1,"7":2}"#);

        let parsed: BTreeMap<ProductId, u32> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, map);
    }

    #[test]
    fn test_ordering_follows_numeric_value() {
        assert!(ProductId::new(2) < ProductId::new(10));
    }
}
