//! BACnet application-layer tag codec and core data model in pure Rust.
//!
//! `bacobj-core` provides zero-copy, `no_std`-compatible encoding and decoding
//! of BACnet application-tagged values together with the object, property, and
//! error vocabulary shared by every object implementation. It is the
//! foundation the `bacobj-device` object store and dispatch engine build on,
//! and can be used standalone in embedded or constrained environments.
//!
//! # Feature flags
//!
//! - **`std`** (default) — enables `std::error::Error` implementations.
//! - **`alloc`** (default) — enables constructed (context-bracketed) values.
//! - **`serde`** — derives `Serialize`/`Deserialize` on core types.
//! - **`defmt`** — derives `defmt::Format` for embedded logging.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

/// Binary encoding primitives, the tag system, and the zero-copy reader/writer.
pub mod encoding;
/// Error types for encoding and decoding operations.
pub mod error;
/// Core BACnet data types: object identifiers, property identifiers, and data values.
pub mod types;

pub use error::{DecodeError, EncodeError};

/// Largest application message a conforming peer can carry; callers size
/// read-response buffers to this.
pub const MAX_APDU: usize = 1476;
