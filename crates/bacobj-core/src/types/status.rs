/// BACnet error class, the first half of every reported error pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ErrorClass {
    Device = 0,
    Object = 1,
    Property = 2,
    Resources = 3,
    Security = 4,
    Services = 5,
    Vt = 6,
    Communication = 7,
}

/// BACnet error code, the second half of every reported error pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum ErrorCode {
    Other = 0,
    ConfigurationInProgress = 2,
    DeviceBusy = 3,
    InvalidDataType = 9,
    NoSpaceForObject = 18,
    NoSpaceToWriteProperty = 20,
    UnknownObject = 31,
    UnknownProperty = 32,
    UnsupportedObjectType = 36,
    ValueOutOfRange = 37,
    WriteAccessDenied = 40,
    InvalidArrayIndex = 42,
    DuplicateName = 48,
    PropertyIsNotAnArray = 50,
}

impl ErrorClass {
    pub const fn to_u32(self) -> u32 {
        self as u32
    }

    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Device),
            1 => Some(Self::Object),
            2 => Some(Self::Property),
            3 => Some(Self::Resources),
            4 => Some(Self::Security),
            5 => Some(Self::Services),
            6 => Some(Self::Vt),
            7 => Some(Self::Communication),
            _ => None,
        }
    }
}

impl ErrorCode {
    pub const fn to_u32(self) -> u32 {
        self as u32
    }

    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Other),
            2 => Some(Self::ConfigurationInProgress),
            3 => Some(Self::DeviceBusy),
            9 => Some(Self::InvalidDataType),
            18 => Some(Self::NoSpaceForObject),
            20 => Some(Self::NoSpaceToWriteProperty),
            31 => Some(Self::UnknownObject),
            32 => Some(Self::UnknownProperty),
            36 => Some(Self::UnsupportedObjectType),
            37 => Some(Self::ValueOutOfRange),
            40 => Some(Self::WriteAccessDenied),
            42 => Some(Self::InvalidArrayIndex),
            48 => Some(Self::DuplicateName),
            50 => Some(Self::PropertyIsNotAnArray),
            _ => None,
        }
    }
}

/// The four standard status flags carried by most object types, encoded on
/// the wire as a 4-bit bit string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusFlags {
    pub in_alarm: bool,
    pub fault: bool,
    pub overridden: bool,
    pub out_of_service: bool,
}

impl StatusFlags {
    /// Packs the flags into the single payload octet of the standard
    /// bit-string encoding (in-alarm in the most significant bit,
    /// four unused trailing bits).
    pub const fn to_octet(self) -> u8 {
        (self.in_alarm as u8) << 7
            | (self.fault as u8) << 6
            | (self.overridden as u8) << 5
            | (self.out_of_service as u8) << 4
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorClass, ErrorCode, StatusFlags};

    #[test]
    fn error_pair_numeric_mapping() {
        assert_eq!(ErrorClass::Property.to_u32(), 2);
        assert_eq!(ErrorCode::WriteAccessDenied.to_u32(), 40);
        assert_eq!(ErrorCode::from_u32(50), Some(ErrorCode::PropertyIsNotAnArray));
        assert_eq!(ErrorCode::from_u32(999), None);
    }

    #[test]
    fn status_flags_pack_msb_first() {
        let flags = StatusFlags {
            fault: true,
            out_of_service: true,
            ..StatusFlags::default()
        };
        assert_eq!(flags.to_octet(), 0b0101_0000);
    }
}
