/// BACnet property identifiers.
///
/// Standard properties used by the bundled object types are named variants;
/// vendor-specific identifiers (512 and above) and unrecognised standard ones
/// use [`Proprietary`](Self::Proprietary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PropertyId {
    Description,
    EventState,
    MaxPresValue,
    MinPresValue,
    ObjectIdentifier,
    ObjectName,
    ObjectType,
    OutOfService,
    PresentValue,
    PriorityArray,
    Reliability,
    RelinquishDefault,
    StatusFlags,
    Units,
    VendorName,
    EventTimeStamps,
    DatabaseRevision,
    TrackingValue,
    DefaultFadeTime,
    DefaultRampRate,
    DefaultStepIncrement,
    InProgress,
    Transition,
    DefaultColorTemperature,
    ColorCommand,
    Proprietary(u32),
}

impl PropertyId {
    pub const fn to_u32(self) -> u32 {
        match self {
            Self::Description => 28,
            Self::EventState => 36,
            Self::MaxPresValue => 65,
            Self::MinPresValue => 69,
            Self::ObjectIdentifier => 75,
            Self::ObjectName => 77,
            Self::ObjectType => 79,
            Self::OutOfService => 81,
            Self::PresentValue => 85,
            Self::PriorityArray => 87,
            Self::Reliability => 103,
            Self::RelinquishDefault => 104,
            Self::StatusFlags => 111,
            Self::Units => 117,
            Self::VendorName => 121,
            Self::EventTimeStamps => 130,
            Self::DatabaseRevision => 155,
            Self::TrackingValue => 164,
            Self::DefaultFadeTime => 374,
            Self::DefaultRampRate => 375,
            Self::DefaultStepIncrement => 376,
            Self::InProgress => 378,
            Self::Transition => 385,
            Self::DefaultColorTemperature => 427,
            Self::ColorCommand => 430,
            Self::Proprietary(v) => v,
        }
    }

    pub const fn from_u32(value: u32) -> Self {
        match value {
            28 => Self::Description,
            36 => Self::EventState,
            65 => Self::MaxPresValue,
            69 => Self::MinPresValue,
            75 => Self::ObjectIdentifier,
            77 => Self::ObjectName,
            79 => Self::ObjectType,
            81 => Self::OutOfService,
            85 => Self::PresentValue,
            87 => Self::PriorityArray,
            103 => Self::Reliability,
            104 => Self::RelinquishDefault,
            111 => Self::StatusFlags,
            117 => Self::Units,
            121 => Self::VendorName,
            130 => Self::EventTimeStamps,
            155 => Self::DatabaseRevision,
            164 => Self::TrackingValue,
            374 => Self::DefaultFadeTime,
            375 => Self::DefaultRampRate,
            376 => Self::DefaultStepIncrement,
            378 => Self::InProgress,
            385 => Self::Transition,
            427 => Self::DefaultColorTemperature,
            430 => Self::ColorCommand,
            v => Self::Proprietary(v),
        }
    }

    /// Whether this identifier lies in the vendor-proprietary range.
    pub const fn is_proprietary(self) -> bool {
        self.to_u32() >= 512
    }
}
