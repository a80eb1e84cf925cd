use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Defines a UUID-backed identifier type.
///
/// Each entity gets its own wrapper to prevent mixing up, say, an
/// order id with a payment id at a call site.
macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }

            /// Parses an identifier from its canonical string form.
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

entity_id! {
    /// Unique identifier for a user record.
    UserId
}

entity_id! {
    /// Unique identifier for an order.
    OrderId
}

entity_id! {
    /// Unique identifier for a payment record.
    PaymentId
}

entity_id! {
    /// Unique identifier for a role-elevation request.
    RequestId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_unique() {
        assert_ne!(OrderId::new(), OrderId::new());
        assert_ne!(UserId::new(), UserId::new());
    }

    #[test]
    fn from_uuid_preserves_value() {
        let uuid = Uuid::new_v4();
        let id = PaymentId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), uuid);
    }

    #[test]
    fn parse_roundtrips_display() {
        let id = RequestId::new();
        let parsed = RequestId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(OrderId::parse("not-a-uuid").is_err());
    }

    #[test]
    fn serialization_is_transparent() {
        let id = OrderId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let back: OrderId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
