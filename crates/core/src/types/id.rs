//! Newtype IDs for type-safe entity references.
//!
//! Every identifier in the storefront is an opaque string: user ids are
//! server-generated hex tokens, order and payment ids come from the payment
//! gateway, and product ids come from the catalog file. Use the `define_id!`
//! macro to create wrappers that prevent mixing them up.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use bazaar_core::define_id;
/// define_id!(UserId);
/// define_id!(OrderId);
///
/// let user_id = UserId::new("u-1");
/// let order_id = OrderId::new("u-1");
///
/// // These are different types, so this won't compile:
/// // let _: UserId = order_id;
/// assert_eq!(user_id.as_str(), order_id.as_str());
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
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }

            /// Whether the ID is empty or only whitespace.
            #[must_use]
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Storefront user (32 hex chars, generated at signup).
define_id!(UserId);
// Catalog product.
define_id!(ProductId);
// Payment gateway order; doubles as the durable order id.
define_id!(OrderId);
// Payment gateway payment.
define_id!(PaymentId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_plain_string() {
        let id = OrderId::new("order_Nf3kz");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"order_Nf3kz\"");

        let parsed: OrderId = serde_json::from_str("\"order_Nf3kz\"").unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_is_blank() {
        assert!(ProductId::new("").is_blank());
        assert!(ProductId::new("   ").is_blank());
        assert!(!ProductId::new("P1").is_blank());
    }

    #[test]
    fn test_display_matches_inner() {
        let id = UserId::from("4f2a");
        assert_eq!(id.to_string(), "4f2a");
        assert_eq!(id.into_inner(), "4f2a");
    }
}
