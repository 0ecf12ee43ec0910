//! End-to-end dispatch scenarios through the full device surface: stores
//! registered, requests resolved, values run through the tag codec.

use bacobj_core::encoding::primitives::{
    decode_app_object_id, decode_app_real, decode_app_unsigned,
};
use bacobj_core::encoding::reader::Reader;
use bacobj_core::encoding::value::encode_application_data_value;
use bacobj_core::encoding::writer::Writer;
use bacobj_core::types::{
    DataValue, ErrorClass, ErrorCode, ObjectType, PropertyId, WILDCARD_INSTANCE,
};
use bacobj_core::MAX_APDU;
use bacobj_device::object::diagnostic::DIAGNOSTIC_TYPE;
use bacobj_device::{
    AnalogValueStore, ColorTemperatureStore, Device, DiagnosticStore, PropertyError,
    ReadRequest, WriteRequest,
};

fn test_device() -> Device {
    let mut device = Device::new();
    device
        .register(Box::new(ColorTemperatureStore::new()))
        .unwrap();
    device.register(Box::new(AnalogValueStore::new())).unwrap();
    device.register(Box::new(DiagnosticStore::new())).unwrap();
    device
}

fn encoded(value: &DataValue<'_>) -> Vec<u8> {
    let mut buf = [0u8; 64];
    let mut w = Writer::new(&mut buf);
    encode_application_data_value(&mut w, value).unwrap();
    w.as_written().to_vec()
}

fn read(device: &Device, req: &ReadRequest) -> Result<Vec<u8>, PropertyError> {
    let mut buf = [0u8; MAX_APDU];
    let len = device.read_property(req, &mut buf)?;
    Ok(buf[..len].to_vec())
}

#[test]
fn color_temperature_walkthrough() {
    let mut device = test_device();
    let id = device
        .create_object(ObjectType::ColorTemperature, 1)
        .unwrap();
    assert_eq!(id.instance(), 1);

    // Object identifier reads back as an object-id tag carrying (type, 1).
    let bytes = read(
        &device,
        &ReadRequest {
            object_type: ObjectType::ColorTemperature,
            instance: 1,
            property: PropertyId::ObjectIdentifier,
            array_index: None,
        },
    )
    .unwrap();
    let mut r = Reader::new(&bytes);
    let decoded = decode_app_object_id(&mut r).unwrap();
    assert_eq!(decoded.object_type(), ObjectType::ColorTemperature);
    assert_eq!(decoded.instance(), 1);

    // Write with writes disabled: denied.
    let payload = encoded(&DataValue::Unsigned(4000));
    let write = WriteRequest {
        object_type: ObjectType::ColorTemperature,
        instance: 1,
        property: PropertyId::PresentValue,
        array_index: None,
        priority: None,
        value: &payload,
    };
    assert_eq!(
        device.write_property(&write),
        Err(PropertyError::new(
            ErrorClass::Property,
            ErrorCode::WriteAccessDenied
        ))
    );

    // Enable writes, write 4000 at no priority, read it back.
    device
        .store_mut::<ColorTemperatureStore>(ObjectType::ColorTemperature)
        .unwrap()
        .write_enable(1);
    device.write_property(&write).unwrap();

    let bytes = read(
        &device,
        &ReadRequest {
            object_type: ObjectType::ColorTemperature,
            instance: 1,
            property: PropertyId::PresentValue,
            array_index: None,
        },
    )
    .unwrap();
    let mut r = Reader::new(&bytes);
    assert_eq!(decode_app_unsigned(&mut r).unwrap(), 4000);
}

#[test]
fn unknown_object_and_property_errors() {
    let mut device = test_device();
    device
        .create_object(ObjectType::ColorTemperature, 1)
        .unwrap();

    let req = ReadRequest {
        object_type: ObjectType::ColorTemperature,
        instance: 2,
        property: PropertyId::PresentValue,
        array_index: None,
    };
    assert_eq!(
        read(&device, &req).unwrap_err(),
        PropertyError::new(ErrorClass::Object, ErrorCode::UnknownObject)
    );

    // A type with no registered store is an unknown object too.
    assert_eq!(
        read(
            &device,
            &ReadRequest {
                object_type: ObjectType::BinaryInput,
                ..req
            }
        )
        .unwrap_err(),
        PropertyError::new(ErrorClass::Object, ErrorCode::UnknownObject)
    );

    // A property outside all three lists.
    assert_eq!(
        read(
            &device,
            &ReadRequest {
                instance: 1,
                property: PropertyId::Reliability,
                ..req
            }
        )
        .unwrap_err(),
        PropertyError::new(ErrorClass::Property, ErrorCode::UnknownProperty)
    );
}

#[test]
fn array_index_on_non_array_property_is_rejected() {
    let mut device = test_device();
    device
        .create_object(ObjectType::ColorTemperature, 1)
        .unwrap();

    assert_eq!(
        read(
            &device,
            &ReadRequest {
                object_type: ObjectType::ColorTemperature,
                instance: 1,
                property: PropertyId::PresentValue,
                array_index: Some(1),
            }
        )
        .unwrap_err(),
        PropertyError::new(ErrorClass::Property, ErrorCode::PropertyIsNotAnArray)
    );

    // Same rule on the write path.
    let payload = encoded(&DataValue::Unsigned(3000));
    assert_eq!(
        device.write_property(&WriteRequest {
            object_type: ObjectType::ColorTemperature,
            instance: 1,
            property: PropertyId::PresentValue,
            array_index: Some(0),
            priority: None,
            value: &payload,
        }),
        Err(PropertyError::new(
            ErrorClass::Property,
            ErrorCode::PropertyIsNotAnArray
        ))
    );
}

#[test]
fn priority_array_commands_resolve_by_priority() {
    let mut device = test_device();
    device.create_object(ObjectType::AnalogValue, 7).unwrap();

    let write = |device: &mut Device, value: &DataValue<'_>, priority: Option<u8>| {
        let payload = encoded(value);
        device.write_property(&WriteRequest {
            object_type: ObjectType::AnalogValue,
            instance: 7,
            property: PropertyId::PresentValue,
            array_index: None,
            priority,
            value: &payload,
        })
    };

    write(&mut device, &DataValue::Real(72.5), Some(8)).unwrap();
    write(&mut device, &DataValue::Real(40.0), Some(12)).unwrap();

    let bytes = read(
        &device,
        &ReadRequest {
            object_type: ObjectType::AnalogValue,
            instance: 7,
            property: PropertyId::PresentValue,
            array_index: None,
        },
    )
    .unwrap();
    let mut r = Reader::new(&bytes);
    assert_eq!(decode_app_real(&mut r).unwrap(), 72.5);

    // Reading the array size through the dispatch surface.
    let bytes = read(
        &device,
        &ReadRequest {
            object_type: ObjectType::AnalogValue,
            instance: 7,
            property: PropertyId::PriorityArray,
            array_index: Some(0),
        },
    )
    .unwrap();
    let mut r = Reader::new(&bytes);
    assert_eq!(decode_app_unsigned(&mut r).unwrap(), 16);

    // Relinquish the winning slot; the lower-priority command shows through.
    write(&mut device, &DataValue::Null, Some(8)).unwrap();
    let bytes = read(
        &device,
        &ReadRequest {
            object_type: ObjectType::AnalogValue,
            instance: 7,
            property: PropertyId::PresentValue,
            array_index: None,
        },
    )
    .unwrap();
    let mut r = Reader::new(&bytes);
    assert_eq!(decode_app_real(&mut r).unwrap(), 40.0);

    // Priority 0 and 17 are outside the command range.
    assert_eq!(
        write(&mut device, &DataValue::Real(1.0), Some(0)),
        Err(PropertyError::new(
            ErrorClass::Property,
            ErrorCode::ValueOutOfRange
        ))
    );
    assert_eq!(
        write(&mut device, &DataValue::Real(1.0), Some(17)),
        Err(PropertyError::new(
            ErrorClass::Property,
            ErrorCode::ValueOutOfRange
        ))
    );
}

#[test]
fn malformed_write_payload_is_value_out_of_range() {
    let mut device = test_device();
    device
        .create_object(ObjectType::ColorTemperature, 1)
        .unwrap();
    device
        .store_mut::<ColorTemperatureStore>(ObjectType::ColorTemperature)
        .unwrap()
        .write_enable(1);

    // Truncated unsigned: claims two payload bytes, carries one.
    assert_eq!(
        device.write_property(&WriteRequest {
            object_type: ObjectType::ColorTemperature,
            instance: 1,
            property: PropertyId::PresentValue,
            array_index: None,
            priority: None,
            value: &[0x22, 0x0F],
        }),
        Err(PropertyError::new(
            ErrorClass::Property,
            ErrorCode::ValueOutOfRange
        ))
    );
}

#[test]
fn type_mismatch_on_write_is_invalid_data_type() {
    let mut device = test_device();
    device
        .create_object(ObjectType::ColorTemperature, 1)
        .unwrap();
    device
        .store_mut::<ColorTemperatureStore>(ObjectType::ColorTemperature)
        .unwrap()
        .write_enable(1);

    let payload = encoded(&DataValue::Real(4000.0));
    assert_eq!(
        device.write_property(&WriteRequest {
            object_type: ObjectType::ColorTemperature,
            instance: 1,
            property: PropertyId::PresentValue,
            array_index: None,
            priority: None,
            value: &payload,
        }),
        Err(PropertyError::new(
            ErrorClass::Property,
            ErrorCode::InvalidDataType
        ))
    );
}

#[test]
fn name_uniqueness_spans_object_types() {
    let mut device = test_device();
    device
        .create_object(ObjectType::ColorTemperature, 1)
        .unwrap();
    device.create_object(ObjectType::AnalogValue, 1).unwrap();
    let revision_after_creates = device.database_revision();

    let write_name = |device: &mut Device, object_type, name: &str| {
        let payload = encoded(&DataValue::CharacterString(name));
        device.write_property(&WriteRequest {
            object_type,
            instance: 1,
            property: PropertyId::ObjectName,
            array_index: None,
            priority: None,
            value: &payload,
        })
    };

    // Fresh unique name: succeeds and bumps the revision exactly once.
    write_name(&mut device, ObjectType::ColorTemperature, "Lobby CCT").unwrap();
    assert_eq!(device.database_revision(), revision_after_creates + 1);
    assert_eq!(
        device.find_object_by_name("Lobby CCT").map(|id| id.object_type()),
        Some(ObjectType::ColorTemperature)
    );

    // Same name onto a different object: duplicate.
    assert_eq!(
        write_name(&mut device, ObjectType::AnalogValue, "Lobby CCT"),
        Err(PropertyError::new(
            ErrorClass::Property,
            ErrorCode::DuplicateName
        ))
    );

    // An object writing its own current name back: no-op success, no bump.
    write_name(&mut device, ObjectType::ColorTemperature, "Lobby CCT").unwrap();
    assert_eq!(device.database_revision(), revision_after_creates + 1);

    // Default generated names collide too.
    device.create_object(ObjectType::AnalogValue, 2).unwrap();
    assert_eq!(
        write_name(&mut device, ObjectType::AnalogValue, "ANALOG-VALUE-2"),
        Err(PropertyError::new(
            ErrorClass::Property,
            ErrorCode::DuplicateName
        ))
    );
}

#[test]
fn wildcard_create_fills_deletion_gaps() {
    let mut device = test_device();
    for instance in [1, 2, 3] {
        device
            .create_object(ObjectType::ColorTemperature, instance)
            .unwrap();
    }
    assert!(device.delete_object(ObjectType::ColorTemperature, 2));

    let id = device
        .create_object(ObjectType::ColorTemperature, WILDCARD_INSTANCE)
        .unwrap();
    assert_eq!(id.instance(), 2);
}

#[test]
fn lifecycle_counts_and_revision() {
    let mut device = test_device();
    assert_eq!(device.database_revision(), 0);

    device
        .create_object(ObjectType::ColorTemperature, 5)
        .unwrap();
    device
        .create_object(ObjectType::ColorTemperature, 2)
        .unwrap();
    device.create_object(DIAGNOSTIC_TYPE, 1).unwrap();
    assert_eq!(device.database_revision(), 3);

    // Idempotent create leaves the revision alone.
    device
        .create_object(ObjectType::ColorTemperature, 5)
        .unwrap();
    assert_eq!(device.database_revision(), 3);

    assert_eq!(device.object_count(ObjectType::ColorTemperature), 2);
    assert_eq!(
        device.index_to_instance(ObjectType::ColorTemperature, 0),
        Some(2)
    );
    assert_eq!(
        device.instance_to_index(ObjectType::ColorTemperature, 5),
        Some(1)
    );
    assert!(device.valid_instance(DIAGNOSTIC_TYPE, 1));

    // Deleting something absent is a no-op.
    assert!(!device.delete_object(ObjectType::ColorTemperature, 9));
    assert_eq!(device.database_revision(), 3);

    device.cleanup();
    assert_eq!(device.object_count(ObjectType::ColorTemperature), 0);
    assert_eq!(device.object_count(DIAGNOSTIC_TYPE), 0);
    assert_eq!(device.database_revision(), 6);
}

#[test]
fn failed_requests_leave_sibling_state_untouched() {
    let mut device = test_device();
    device
        .create_object(ObjectType::ColorTemperature, 1)
        .unwrap();
    device
        .create_object(ObjectType::ColorTemperature, 2)
        .unwrap();
    {
        let store = device
            .store_mut::<ColorTemperatureStore>(ObjectType::ColorTemperature)
            .unwrap();
        store.write_enable(1);
        store.write_enable(2);
        store.set_present_value(2, 6500);
    }

    // Garbage payload against instance 1 fails cleanly...
    let _ = device.write_property(&WriteRequest {
        object_type: ObjectType::ColorTemperature,
        instance: 1,
        property: PropertyId::PresentValue,
        array_index: None,
        priority: None,
        value: &[0xFF, 0xFF, 0xFF],
    });

    // ...and instance 2 is untouched and still readable.
    let bytes = read(
        &device,
        &ReadRequest {
            object_type: ObjectType::ColorTemperature,
            instance: 2,
            property: PropertyId::PresentValue,
            array_index: None,
        },
    )
    .unwrap();
    let mut r = Reader::new(&bytes);
    assert_eq!(decode_app_unsigned(&mut r).unwrap(), 6500);
}

#[test]
fn property_lists_expose_all_three_sections() {
    let device = test_device();
    let lists = device.property_lists(DIAGNOSTIC_TYPE).unwrap();
    assert!(lists.required.contains(&PropertyId::Reliability));
    assert!(lists.optional.contains(&PropertyId::Description));
    assert_eq!(lists.proprietary.len(), 7);
    assert!(lists
        .proprietary
        .iter()
        .all(|p| p.is_proprietary()));
}
