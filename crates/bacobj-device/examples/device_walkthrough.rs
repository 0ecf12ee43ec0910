//! Walks the device surface end to end: register stores, create objects,
//! read and write properties through the dispatch engine, and watch the
//! database revision move.
//!
//! Run with `RUST_LOG=debug cargo run --example device_walkthrough` to see
//! the structural-change log lines.

use bacobj_core::encoding::primitives::{decode_app_object_id, decode_app_unsigned};
use bacobj_core::encoding::reader::Reader;
use bacobj_core::encoding::value::encode_application_data_value;
use bacobj_core::encoding::writer::Writer;
use bacobj_core::types::{DataValue, ObjectType, PropertyId, WILDCARD_INSTANCE};
use bacobj_core::MAX_APDU;
use bacobj_device::{
    AnalogValueStore, ColorTemperatureStore, Device, DiagnosticStore, ReadRequest, WriteRequest,
};

fn main() {
    env_logger::init();

    let mut device = Device::new();
    device
        .register(Box::new(ColorTemperatureStore::new()))
        .expect("fresh registry");
    device
        .register(Box::new(AnalogValueStore::new()))
        .expect("fresh registry");
    device
        .register(Box::new(DiagnosticStore::new()))
        .expect("fresh registry");

    let cct = device
        .create_object(ObjectType::ColorTemperature, 1)
        .expect("create color temperature 1");
    device
        .create_object(ObjectType::AnalogValue, WILDCARD_INSTANCE)
        .expect("allocate an analog value");
    println!("created {cct:?}, revision {}", device.database_revision());

    // Read the object identifier back through the dispatch engine.
    let mut buf = [0u8; MAX_APDU];
    let len = device
        .read_property(
            &ReadRequest {
                object_type: ObjectType::ColorTemperature,
                instance: 1,
                property: PropertyId::ObjectIdentifier,
                array_index: None,
            },
            &mut buf,
        )
        .expect("read object identifier");
    let mut r = Reader::new(&buf[..len]);
    let id = decode_app_object_id(&mut r).expect("well-formed response");
    println!("object identifier reads back as {:?}/{}", id.object_type(), id.instance());

    // Present-value writes are gated until the application enables them.
    let mut payload = [0u8; 8];
    let mut w = Writer::new(&mut payload);
    encode_application_data_value(&mut w, &DataValue::Unsigned(4000)).expect("encode 4000");
    let write = WriteRequest {
        object_type: ObjectType::ColorTemperature,
        instance: 1,
        property: PropertyId::PresentValue,
        array_index: None,
        priority: None,
        value: w.as_written(),
    };
    println!("write while disabled: {:?}", device.write_property(&write));

    device
        .store_mut::<ColorTemperatureStore>(ObjectType::ColorTemperature)
        .expect("registered above")
        .write_enable(1);
    device.write_property(&write).expect("write 4000 K");

    let len = device
        .read_property(
            &ReadRequest {
                object_type: ObjectType::ColorTemperature,
                instance: 1,
                property: PropertyId::PresentValue,
                array_index: None,
            },
            &mut buf,
        )
        .expect("read present value");
    let mut r = Reader::new(&buf[..len]);
    println!(
        "present value now {} K, revision {}",
        decode_app_unsigned(&mut r).expect("unsigned response"),
        device.database_revision()
    );

    device.cleanup();
    println!("after cleanup: revision {}", device.database_revision());
}
