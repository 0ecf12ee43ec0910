use crate::types::ObjectType;

/// Largest value the 22-bit instance field can carry. The value itself is
/// reserved: a create request naming it asks for "next available instance",
/// so assignable instances are `0..WILDCARD_INSTANCE`.
pub const WILDCARD_INSTANCE: u32 = 0x3F_FFFF;

/// A packed BACnet object identifier combining an [`ObjectType`] and a 22-bit
/// instance number into a single `u32`.
///
/// The upper 10 bits encode the object type and the lower 22 bits encode the
/// instance number, matching the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ObjectId(u32);

impl ObjectId {
    /// Creates an `ObjectId` from a type and instance number.
    pub const fn new(object_type: ObjectType, instance: u32) -> Self {
        Self((((object_type.to_u16() as u32) & 0x03FF) << 22) | (instance & WILDCARD_INSTANCE))
    }

    /// Returns the raw packed `u32` representation.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Constructs an `ObjectId` from a pre-packed `u32`.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Extracts the [`ObjectType`] from the upper 10 bits.
    pub const fn object_type(self) -> ObjectType {
        let t = ((self.0 >> 22) & 0x03FF) as u16;
        ObjectType::from_u16(t)
    }

    /// Extracts the 22-bit instance number.
    pub const fn instance(self) -> u32 {
        self.0 & WILDCARD_INSTANCE
    }
}

#[cfg(test)]
mod tests {
    use super::{ObjectId, WILDCARD_INSTANCE};
    use crate::types::ObjectType;

    #[test]
    fn packs_type_and_instance() {
        let id = ObjectId::new(ObjectType::ColorTemperature, 1);
        assert_eq!(id.object_type(), ObjectType::ColorTemperature);
        assert_eq!(id.instance(), 1);
        assert_eq!(id.raw(), (64 << 22) | 1);
    }

    #[test]
    fn instance_field_saturates_at_22_bits() {
        let id = ObjectId::new(ObjectType::AnalogValue, WILDCARD_INSTANCE);
        assert_eq!(id.instance(), WILDCARD_INSTANCE);
    }

    #[test]
    #[cfg(feature = "serde")]
    fn serde_roundtrip_preserves_packing() {
        let id = ObjectId::new(ObjectType::ColorTemperature, 77);
        let json = serde_json::to_string(&id).unwrap();
        let back: ObjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
