//! Analog Value object: a commandable floating point with the standard
//! 16-slot priority array. Writers command a slot at priority 1..=16 and
//! relinquish it by writing Null; present-value is the highest-priority
//! commanded slot, falling back to relinquish-default.

use crate::engine::{
    expect_boolean, expect_real, CreateError, CreateOutcome, ObjectHandler, PropertyError,
    PropertyLists,
};
use crate::keylist::KeyList;
use bacobj_core::encoding::primitives::{
    encode_app_bit_string, encode_app_boolean, encode_app_character_string,
    encode_app_enumerated, encode_app_null, encode_app_object_id, encode_app_real,
    encode_app_unsigned,
};
use bacobj_core::encoding::writer::Writer;
use bacobj_core::types::{
    BitString, DataValue, ObjectId, ObjectType, PropertyId, StatusFlags, WILDCARD_INSTANCE,
};
use std::any::Any;

/// Engineering-units codes used by this object's defaults.
pub const UNITS_NO_UNITS: u32 = 95;
pub const UNITS_DEGREES_CELSIUS: u32 = 62;
pub const UNITS_PERCENT: u32 = 98;

const EVENT_STATE_NORMAL: u32 = 0;
const PRIORITY_SLOTS: usize = 16;
/// A write with no explicit priority lands at the lowest priority.
const DEFAULT_PRIORITY: u8 = 16;

#[derive(Debug)]
struct Record {
    priority_array: [Option<f32>; PRIORITY_SLOTS],
    relinquish_default: f32,
    units: u32,
    out_of_service: bool,
    object_name: Option<String>,
    description: Option<String>,
}

impl Default for Record {
    fn default() -> Self {
        Self {
            priority_array: [None; PRIORITY_SLOTS],
            relinquish_default: 0.0,
            units: UNITS_NO_UNITS,
            out_of_service: false,
            object_name: None,
            description: None,
        }
    }
}

impl Record {
    fn present_value(&self) -> f32 {
        self.priority_array
            .iter()
            .flatten()
            .next()
            .copied()
            .unwrap_or(self.relinquish_default)
    }

    fn status_flags(&self) -> StatusFlags {
        StatusFlags {
            out_of_service: self.out_of_service,
            ..StatusFlags::default()
        }
    }
}

static PROPERTIES: PropertyLists = PropertyLists {
    required: &[
        PropertyId::ObjectIdentifier,
        PropertyId::ObjectName,
        PropertyId::ObjectType,
        PropertyId::PresentValue,
        PropertyId::StatusFlags,
        PropertyId::EventState,
        PropertyId::OutOfService,
        PropertyId::Units,
    ],
    optional: &[
        PropertyId::Description,
        PropertyId::PriorityArray,
        PropertyId::RelinquishDefault,
    ],
    proprietary: &[],
};

/// Store of every Analog Value instance on the device.
#[derive(Default)]
pub struct AnalogValueStore {
    objects: KeyList<Record>,
}

impl AnalogValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn present_value(&self, instance: u32) -> Option<f32> {
        self.objects.get(instance).map(Record::present_value)
    }

    pub fn relinquish_default(&self, instance: u32) -> Option<f32> {
        self.objects.get(instance).map(|o| o.relinquish_default)
    }

    pub fn set_relinquish_default(&mut self, instance: u32, value: f32) -> bool {
        match self.objects.get_mut(instance) {
            Some(o) => {
                o.relinquish_default = value;
                true
            }
            None => false,
        }
    }

    /// The commanded value at `priority` (1..=16), if any.
    pub fn priority_slot(&self, instance: u32, priority: u8) -> Option<f32> {
        let record = self.objects.get(instance)?;
        record.priority_array.get(priority.checked_sub(1)? as usize)?.as_ref().copied()
    }

    pub fn units(&self, instance: u32) -> Option<u32> {
        self.objects.get(instance).map(|o| o.units)
    }

    pub fn set_units(&mut self, instance: u32, units: u32) -> bool {
        match self.objects.get_mut(instance) {
            Some(o) => {
                o.units = units;
                true
            }
            None => false,
        }
    }

    pub fn out_of_service(&self, instance: u32) -> Option<bool> {
        self.objects.get(instance).map(|o| o.out_of_service)
    }

    pub fn set_description(&mut self, instance: u32, text: &str) -> bool {
        match self.objects.get_mut(instance) {
            Some(o) => {
                o.description = Some(text.to_owned());
                true
            }
            None => false,
        }
    }

    /// Commands or relinquishes one priority slot.
    fn command(
        &mut self,
        instance: u32,
        value: &DataValue<'_>,
        priority: Option<u8>,
    ) -> Result<(), PropertyError> {
        let record = self
            .objects
            .get_mut(instance)
            .ok_or(PropertyError::unknown_object())?;
        let slot = usize::from(priority.unwrap_or(DEFAULT_PRIORITY) - 1);
        match value {
            DataValue::Real(v) => {
                record.priority_array[slot] = Some(*v);
                Ok(())
            }
            DataValue::Null => {
                record.priority_array[slot] = None;
                Ok(())
            }
            _ => Err(PropertyError::invalid_data_type()),
        }
    }

    fn read_priority_array(
        &self,
        record: &Record,
        array_index: Option<u32>,
        w: &mut Writer<'_>,
    ) -> Result<(), PropertyError> {
        let encode_slot = |w: &mut Writer<'_>, slot: Option<f32>| match slot {
            Some(v) => encode_app_real(w, v),
            None => encode_app_null(w),
        };
        match array_index {
            // Whole array: all sixteen slots in priority order.
            None => {
                for slot in record.priority_array {
                    encode_slot(w, slot)?;
                }
                Ok(())
            }
            // Index 0 reads the array size.
            Some(0) => Ok(encode_app_unsigned(w, PRIORITY_SLOTS as u32)?),
            Some(index) if (index as usize) <= PRIORITY_SLOTS => {
                Ok(encode_slot(w, record.priority_array[index as usize - 1])?)
            }
            Some(_) => Err(PropertyError::invalid_array_index()),
        }
    }
}

impl ObjectHandler for AnalogValueStore {
    fn object_type(&self) -> ObjectType {
        ObjectType::AnalogValue
    }

    fn property_lists(&self) -> &'static PropertyLists {
        &PROPERTIES
    }

    fn count(&self) -> usize {
        self.objects.len()
    }

    fn valid_instance(&self, instance: u32) -> bool {
        self.objects.contains(instance)
    }

    fn instance_at(&self, index: usize) -> Option<u32> {
        self.objects.key_at(index)
    }

    fn index_of(&self, instance: u32) -> Option<usize> {
        self.objects.index_of(instance)
    }

    fn create(&mut self, instance: u32) -> Result<CreateOutcome, CreateError> {
        let instance = match instance {
            i if i > WILDCARD_INSTANCE => return Err(CreateError::InstanceOutOfRange(i)),
            WILDCARD_INSTANCE => self.objects.next_empty_key(1),
            i => i,
        };
        if instance >= WILDCARD_INSTANCE {
            return Err(CreateError::NoSpace);
        }
        if self.objects.contains(instance) {
            return Ok(CreateOutcome::Existing(instance));
        }
        self.objects
            .insert(instance, Record::default())
            .map_err(|_| CreateError::NoSpace)?;
        Ok(CreateOutcome::Created(instance))
    }

    fn delete(&mut self, instance: u32) -> bool {
        self.objects.remove(instance).is_some()
    }

    fn clear(&mut self) -> usize {
        self.objects.clear()
    }

    fn object_name(&self, instance: u32) -> Option<String> {
        let record = self.objects.get(instance)?;
        Some(match &record.object_name {
            Some(name) => name.clone(),
            None => format!("ANALOG-VALUE-{instance}"),
        })
    }

    fn commit_object_name(&mut self, instance: u32, name: &str) -> bool {
        match self.objects.get_mut(instance) {
            Some(o) => {
                o.object_name = Some(name.to_owned());
                true
            }
            None => false,
        }
    }

    fn read_property(
        &self,
        instance: u32,
        property: PropertyId,
        array_index: Option<u32>,
        w: &mut Writer<'_>,
    ) -> Result<(), PropertyError> {
        let record = self
            .objects
            .get(instance)
            .ok_or(PropertyError::unknown_object())?;
        match property {
            PropertyId::ObjectIdentifier => {
                encode_app_object_id(w, ObjectId::new(ObjectType::AnalogValue, instance))?
            }
            PropertyId::ObjectName => {
                let name = self
                    .object_name(instance)
                    .ok_or(PropertyError::unknown_object())?;
                encode_app_character_string(w, &name)?;
            }
            PropertyId::ObjectType => {
                encode_app_enumerated(w, ObjectType::AnalogValue.to_u16() as u32)?
            }
            PropertyId::PresentValue => encode_app_real(w, record.present_value())?,
            PropertyId::StatusFlags => {
                let octet = [record.status_flags().to_octet()];
                encode_app_bit_string(w, BitString::new(4, &octet))?;
            }
            PropertyId::EventState => encode_app_enumerated(w, EVENT_STATE_NORMAL)?,
            PropertyId::OutOfService => encode_app_boolean(w, record.out_of_service)?,
            PropertyId::Units => encode_app_enumerated(w, record.units)?,
            PropertyId::PriorityArray => {
                return self.read_priority_array(record, array_index, w)
            }
            PropertyId::RelinquishDefault => encode_app_real(w, record.relinquish_default)?,
            PropertyId::Description => {
                encode_app_character_string(
                    w,
                    record.description.as_deref().unwrap_or_default(),
                )?;
            }
            _ => return Err(PropertyError::unknown_property()),
        }
        Ok(())
    }

    fn write_property(
        &mut self,
        instance: u32,
        property: PropertyId,
        value: &DataValue<'_>,
        priority: Option<u8>,
    ) -> Result<(), PropertyError> {
        match property {
            PropertyId::PresentValue => self.command(instance, value, priority),
            PropertyId::RelinquishDefault => {
                let value = expect_real(value)?;
                let record = self
                    .objects
                    .get_mut(instance)
                    .ok_or(PropertyError::unknown_object())?;
                record.relinquish_default = value;
                Ok(())
            }
            PropertyId::OutOfService => {
                let value = expect_boolean(value)?;
                let record = self
                    .objects
                    .get_mut(instance)
                    .ok_or(PropertyError::unknown_object())?;
                record.out_of_service = value;
                Ok(())
            }
            PropertyId::ObjectIdentifier
            | PropertyId::ObjectType
            | PropertyId::StatusFlags
            | PropertyId::EventState
            | PropertyId::Units
            | PropertyId::PriorityArray
            | PropertyId::Description => Err(PropertyError::write_access_denied()),
            _ => Err(PropertyError::unknown_property()),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ObjectHandler;
    use bacobj_core::encoding::primitives::{decode_app_real, decode_app_unsigned};
    use bacobj_core::encoding::reader::Reader;

    fn store_with_instance(instance: u32) -> AnalogValueStore {
        let mut store = AnalogValueStore::new();
        store.create(instance).unwrap();
        store
    }

    #[test]
    fn present_value_tracks_highest_priority() {
        let mut store = store_with_instance(1);
        store.set_relinquish_default(1, 20.0);
        assert_eq!(store.present_value(1), Some(20.0));

        store
            .write_property(1, PropertyId::PresentValue, &DataValue::Real(25.0), Some(8))
            .unwrap();
        store
            .write_property(1, PropertyId::PresentValue, &DataValue::Real(30.0), Some(3))
            .unwrap();
        assert_eq!(store.present_value(1), Some(30.0));

        // Relinquish the higher priority; the lower one shows through.
        store
            .write_property(1, PropertyId::PresentValue, &DataValue::Null, Some(3))
            .unwrap();
        assert_eq!(store.present_value(1), Some(25.0));

        store
            .write_property(1, PropertyId::PresentValue, &DataValue::Null, Some(8))
            .unwrap();
        assert_eq!(store.present_value(1), Some(20.0));
    }

    #[test]
    fn command_without_priority_uses_lowest() {
        let mut store = store_with_instance(1);
        store
            .write_property(1, PropertyId::PresentValue, &DataValue::Real(1.5), None)
            .unwrap();
        assert_eq!(store.priority_slot(1, 16), Some(1.5));
    }

    #[test]
    fn command_rejects_wrong_tag() {
        let mut store = store_with_instance(1);
        assert_eq!(
            store.write_property(1, PropertyId::PresentValue, &DataValue::Unsigned(4), None),
            Err(PropertyError::invalid_data_type())
        );
    }

    #[test]
    fn priority_array_reads_by_index() {
        let mut store = store_with_instance(1);
        store
            .write_property(1, PropertyId::PresentValue, &DataValue::Real(7.0), Some(5))
            .unwrap();

        let mut buf = [0u8; 16];
        let mut w = Writer::new(&mut buf);
        store
            .read_property(1, PropertyId::PriorityArray, Some(0), &mut w)
            .unwrap();
        let mut r = Reader::new(w.as_written());
        assert_eq!(decode_app_unsigned(&mut r).unwrap(), 16);

        let mut buf = [0u8; 16];
        let mut w = Writer::new(&mut buf);
        store
            .read_property(1, PropertyId::PriorityArray, Some(5), &mut w)
            .unwrap();
        let mut r = Reader::new(w.as_written());
        assert_eq!(decode_app_real(&mut r).unwrap(), 7.0);

        let mut buf = [0u8; 16];
        let mut w = Writer::new(&mut buf);
        assert_eq!(
            store.read_property(1, PropertyId::PriorityArray, Some(17), &mut w),
            Err(PropertyError::invalid_array_index())
        );
    }

    #[test]
    fn whole_priority_array_is_sixteen_values() {
        let store = store_with_instance(1);
        let mut buf = [0u8; 64];
        let mut w = Writer::new(&mut buf);
        store
            .read_property(1, PropertyId::PriorityArray, None, &mut w)
            .unwrap();
        // Sixteen empty slots encode as sixteen Null tags.
        assert_eq!(w.as_written(), &[0u8; 16]);
    }
}
