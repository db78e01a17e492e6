use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a scheduled showing (one movie, one hall, one time).
///
/// Wraps a UUID to provide type safety and prevent mixing up showing ids
/// with other UUID-based identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShowingId(Uuid);

impl ShowingId {
    /// Creates a new random showing ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a showing ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ShowingId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ShowingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for ShowingId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<ShowingId> for Uuid {
    fn from(id: ShowingId) -> Self {
        id.0
    }
}

/// Unique identifier for a ticket order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Creates a new random order ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an order ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for OrderId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<OrderId> for Uuid {
    fn from(id: OrderId) -> Self {
        id.0
    }
}

/// Unique identifier for a user, supplied by the authentication boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random user ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a user ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for UserId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<UserId> for Uuid {
    fn from(id: UserId) -> Self {
        id.0
    }
}

/// A seat label within a hall layout, e.g. `"1A"` or `"12F"`.
///
/// Labels are opaque to the booking core; the catalog defines which labels
/// exist for a showing. `Ord` so conflict lists and availability views have
/// a stable order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeatLabel(String);

impl SeatLabel {
    /// Creates a new seat label from a string.
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Returns the label as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SeatLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SeatLabel {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SeatLabel {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for SeatLabel {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn showing_id_new_creates_unique_ids() {
        let id1 = ShowingId::new();
        let id2 = ShowingId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn order_id_from_uuid_preserves_value() {
        let uuid = Uuid::new_v4();
        let id = OrderId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), uuid);
    }

    #[test]
    fn user_id_serialization_roundtrip() {
        let id = UserId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn seat_label_string_conversion() {
        let label = SeatLabel::new("1A");
        assert_eq!(label.as_str(), "1A");

        let label2: SeatLabel = "12F".into();
        assert_eq!(label2.as_str(), "12F");
    }

    #[test]
    fn seat_label_ordering_is_lexicographic() {
        let mut labels = vec![
            SeatLabel::new("2B"),
            SeatLabel::new("1A"),
            SeatLabel::new("1B"),
        ];
        labels.sort();
        assert_eq!(labels[0].as_str(), "1A");
        assert_eq!(labels[1].as_str(), "1B");
        assert_eq!(labels[2].as_str(), "2B");
    }

    #[test]
    fn seat_label_serializes_as_plain_string() {
        let label = SeatLabel::new("5C");
        let json = serde_json::to_string(&label).unwrap();
        assert_eq!(json, "\"5C\"");
    }
}
