pub mod bit_string;
pub mod data_value;
pub mod date_time;
pub mod object_id;
pub mod object_type;
pub mod property_id;
pub mod status;

pub use bit_string::BitString;
pub use data_value::DataValue;
pub use date_time::{Date, Time};
pub use object_id::{ObjectId, WILDCARD_INSTANCE};
pub use object_type::ObjectType;
pub use property_id::PropertyId;
pub use status::{ErrorClass, ErrorCode, StatusFlags};
