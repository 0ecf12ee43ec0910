/// Encode/decode functions for BACnet primitive payloads and tagged values.
pub mod primitives;
/// Zero-copy byte reader for decoding application data.
pub mod reader;
/// BACnet tag system (application, context, opening/closing).
pub mod tag;
/// Application data value codec over [`crate::types::DataValue`].
pub mod value;
/// Byte writer for encoding into a caller-owned buffer.
pub mod writer;
