//! Identifier factories.

use uuid::Uuid;

use super::value_object::RoomId;

/// Generates fresh room identifiers
pub struct RoomIdFactory;

impl RoomIdFactory {
    /// Generate a new random (v4) room id
    pub fn generate() -> RoomId {
        RoomId::from_uuid(Uuid::new_v4())
    }
}
