use serde::{Deserialize, Serialize};

/// Declares a surrogate-key newtype backed by a database row id.
///
/// Wrapping the raw `i64` prevents mixing up customer, product and order ids
/// at call sites that take several of them.
macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates an id from a raw row id.
            pub fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw row id.
            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

row_id!(
    /// Identifier of a customer row.
    CustomerId
);

row_id!(
    /// Identifier of a catalog product row.
    ProductId
);

row_id!(
    /// Identifier of a saved order header.
    OrderId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_preserves_raw_value() {
        let id = OrderId::new(42);
        assert_eq!(id.as_i64(), 42);
        assert_eq!(i64::from(id), 42);
    }

    #[test]
    fn ids_order_by_raw_value() {
        assert!(OrderId::new(1) < OrderId::new(2));
    }

    #[test]
    fn id_serializes_transparently() {
        let json = serde_json::to_string(&ProductId::new(7)).unwrap();
        assert_eq!(json, "7");
        let back: ProductId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ProductId::new(7));
    }

    #[test]
    fn id_display() {
        assert_eq!(CustomerId::new(3).to_string(), "3");
    }
}
