//! Generic BACnet object database: ordered instance stores, a property
//! dispatch engine, and the reference object types that plug into it.
//!
//! A [`Device`] owns one [`ObjectHandler`] per object type. The network
//! service layer hands it parsed read/write requests; the device resolves the
//! store, routes to the per-property accessor, and runs values through the
//! `bacobj-core` tag codec. All failures come back as typed
//! [`PropertyError`] pairs, never as panics or partial state.
//!
//! The device surface is synchronous and unsynchronized by design: a device
//! and its stores form one shared-mutable resource, and callers must
//! serialize access to it (one inbound request at a time, or an external
//! lock). No operation blocks, suspends, or retains caller buffers.

pub mod device;
pub mod engine;
pub mod keylist;
pub mod object;

pub use device::{Device, RegistryError};
pub use engine::{
    CreateError, CreateOutcome, ObjectHandler, PropertyError, PropertyLists, ReadRequest,
    WriteRequest,
};
pub use keylist::KeyList;
pub use object::analog_value::AnalogValueStore;
pub use object::color_temperature::ColorTemperatureStore;
pub use object::diagnostic::DiagnosticStore;
