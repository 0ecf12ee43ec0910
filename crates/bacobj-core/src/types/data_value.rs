use crate::encoding::tag::AppTag;
use crate::types::{BitString, Date, ObjectId, Time};

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

/// A decoded application data value borrowing payload bytes from the wire
/// buffer it was decoded from.
///
/// The `Constructed` variant (under `alloc`) wraps a context-bracketed group
/// of values whose meaning is defined by the enclosing structure.
#[derive(Debug, Clone, PartialEq)]
pub enum DataValue<'a> {
    Null,
    Boolean(bool),
    Unsigned(u32),
    Signed(i32),
    Real(f32),
    Double(f64),
    OctetString(&'a [u8]),
    CharacterString(&'a str),
    BitString(BitString<'a>),
    Enumerated(u32),
    Date(Date),
    Time(Time),
    ObjectId(ObjectId),
    #[cfg(feature = "alloc")]
    Constructed {
        tag_num: u8,
        values: Vec<DataValue<'a>>,
    },
}

impl DataValue<'_> {
    /// The application tag this value encodes with, or `None` for a
    /// constructed value (which has no single application tag).
    pub const fn app_tag(&self) -> Option<AppTag> {
        match self {
            Self::Null => Some(AppTag::Null),
            Self::Boolean(_) => Some(AppTag::Boolean),
            Self::Unsigned(_) => Some(AppTag::UnsignedInt),
            Self::Signed(_) => Some(AppTag::SignedInt),
            Self::Real(_) => Some(AppTag::Real),
            Self::Double(_) => Some(AppTag::Double),
            Self::OctetString(_) => Some(AppTag::OctetString),
            Self::CharacterString(_) => Some(AppTag::CharacterString),
            Self::BitString(_) => Some(AppTag::BitString),
            Self::Enumerated(_) => Some(AppTag::Enumerated),
            Self::Date(_) => Some(AppTag::Date),
            Self::Time(_) => Some(AppTag::Time),
            Self::ObjectId(_) => Some(AppTag::ObjectId),
            #[cfg(feature = "alloc")]
            Self::Constructed { .. } => None,
        }
    }
}
