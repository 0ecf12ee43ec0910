//! Diagnostic object: a vendor object surfacing one datalink port's health
//! (reliability, addressing, link speed) through standard and proprietary
//! properties. Configuration writes latch a changes-pending flag until the
//! port layer applies them.

use crate::engine::{
    expect_boolean, expect_unsigned, CreateError, CreateOutcome, ObjectHandler, PropertyError,
    PropertyLists,
};
use crate::keylist::KeyList;
use bacobj_core::encoding::primitives::{
    encode_app_bit_string, encode_app_boolean, encode_app_character_string,
    encode_app_enumerated, encode_app_object_id, encode_app_octet_string, encode_app_real,
    encode_app_unsigned,
};
use bacobj_core::encoding::writer::Writer;
use bacobj_core::types::{
    BitString, DataValue, ObjectId, ObjectType, PropertyId, StatusFlags, WILDCARD_INSTANCE,
};
use std::any::Any;

/// Vendor type tag this object registers under (128 is the first
/// vendor-reserved object type).
pub const DIAGNOSTIC_TYPE: ObjectType = ObjectType::Proprietary(128);

/// Proprietary property identifiers (the vendor range starts at 512).
pub const PROP_DIAGNOSTIC_KIND: PropertyId = PropertyId::Proprietary(512);
pub const PROP_NETWORK_NUMBER: PropertyId = PropertyId::Proprietary(513);
pub const PROP_PORT_QUALITY: PropertyId = PropertyId::Proprietary(514);
pub const PROP_MAC_ADDRESS: PropertyId = PropertyId::Proprietary(515);
pub const PROP_APDU_LENGTH: PropertyId = PropertyId::Proprietary(516);
pub const PROP_LINK_SPEED: PropertyId = PropertyId::Proprietary(517);
pub const PROP_CHANGES_PENDING: PropertyId = PropertyId::Proprietary(518);

const MAC_ADDRESS_MAX: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Reliability {
    NoFaultDetected = 0,
    NoSensor = 1,
    OverRange = 2,
    UnderRange = 3,
    OpenLoop = 4,
    ShortedLoop = 5,
    NoOutput = 6,
    UnreliableOther = 7,
    CommunicationFailure = 12,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum PortQuality {
    Unknown = 0,
    Active = 1,
    Degraded = 2,
    Failed = 3,
}

#[derive(Debug)]
struct Record {
    reliability: Reliability,
    out_of_service: bool,
    diagnostic_kind: u8,
    network_number: u16,
    quality: PortQuality,
    mac_address: Vec<u8>,
    apdu_length: u16,
    link_speed: f32,
    changes_pending: bool,
    object_name: Option<String>,
    description: Option<String>,
}

impl Default for Record {
    fn default() -> Self {
        Self {
            reliability: Reliability::NoFaultDetected,
            out_of_service: false,
            diagnostic_kind: 0,
            network_number: 0,
            quality: PortQuality::Unknown,
            mac_address: Vec::new(),
            apdu_length: bacobj_core::MAX_APDU as u16,
            link_speed: 0.0,
            changes_pending: false,
            object_name: None,
            description: None,
        }
    }
}

impl Record {
    fn status_flags(&self) -> StatusFlags {
        StatusFlags {
            fault: self.reliability != Reliability::NoFaultDetected,
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
        PropertyId::StatusFlags,
        PropertyId::Reliability,
        PropertyId::OutOfService,
    ],
    optional: &[PropertyId::Description],
    proprietary: &[
        PROP_DIAGNOSTIC_KIND,
        PROP_NETWORK_NUMBER,
        PROP_PORT_QUALITY,
        PROP_MAC_ADDRESS,
        PROP_APDU_LENGTH,
        PROP_LINK_SPEED,
        PROP_CHANGES_PENDING,
    ],
};

/// Store of every Diagnostic instance on the device.
#[derive(Default)]
pub struct DiagnosticStore {
    objects: KeyList<Record>,
}

impl DiagnosticStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reliability(&self, instance: u32) -> Option<Reliability> {
        self.objects.get(instance).map(|o| o.reliability)
    }

    pub fn set_reliability(&mut self, instance: u32, value: Reliability) -> bool {
        match self.objects.get_mut(instance) {
            Some(o) => {
                o.reliability = value;
                true
            }
            None => false,
        }
    }

    pub fn out_of_service(&self, instance: u32) -> Option<bool> {
        self.objects.get(instance).map(|o| o.out_of_service)
    }

    pub fn network_number(&self, instance: u32) -> Option<u16> {
        self.objects.get(instance).map(|o| o.network_number)
    }

    pub fn quality(&self, instance: u32) -> Option<PortQuality> {
        self.objects.get(instance).map(|o| o.quality)
    }

    pub fn set_quality(&mut self, instance: u32, value: PortQuality) -> bool {
        match self.objects.get_mut(instance) {
            Some(o) => {
                o.quality = value;
                true
            }
            None => false,
        }
    }

    pub fn mac_address(&self, instance: u32) -> Option<Vec<u8>> {
        self.objects.get(instance).map(|o| o.mac_address.clone())
    }

    pub fn set_mac_address(&mut self, instance: u32, mac: &[u8]) -> bool {
        if mac.len() > MAC_ADDRESS_MAX {
            return false;
        }
        match self.objects.get_mut(instance) {
            Some(o) => {
                o.mac_address = mac.to_vec();
                true
            }
            None => false,
        }
    }

    pub fn link_speed(&self, instance: u32) -> Option<f32> {
        self.objects.get(instance).map(|o| o.link_speed)
    }

    pub fn set_link_speed(&mut self, instance: u32, value: f32) -> bool {
        match self.objects.get_mut(instance) {
            Some(o) => {
                o.link_speed = value;
                true
            }
            None => false,
        }
    }

    pub fn changes_pending(&self, instance: u32) -> Option<bool> {
        self.objects.get(instance).map(|o| o.changes_pending)
    }

    /// Clears the latch once the port layer has applied pending settings.
    pub fn acknowledge_changes(&mut self, instance: u32) -> bool {
        match self.objects.get_mut(instance) {
            Some(o) => {
                o.changes_pending = false;
                true
            }
            None => false,
        }
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
}

impl ObjectHandler for DiagnosticStore {
    fn object_type(&self) -> ObjectType {
        DIAGNOSTIC_TYPE
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
            None => format!("DIAGNOSTIC-{instance}"),
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
        _array_index: Option<u32>,
        w: &mut Writer<'_>,
    ) -> Result<(), PropertyError> {
        let record = self
            .objects
            .get(instance)
            .ok_or(PropertyError::unknown_object())?;
        match property {
            PropertyId::ObjectIdentifier => {
                encode_app_object_id(w, ObjectId::new(DIAGNOSTIC_TYPE, instance))?
            }
            PropertyId::ObjectName => {
                let name = self
                    .object_name(instance)
                    .ok_or(PropertyError::unknown_object())?;
                encode_app_character_string(w, &name)?;
            }
            PropertyId::ObjectType => {
                encode_app_enumerated(w, DIAGNOSTIC_TYPE.to_u16() as u32)?
            }
            PropertyId::StatusFlags => {
                let octet = [record.status_flags().to_octet()];
                encode_app_bit_string(w, BitString::new(4, &octet))?;
            }
            PropertyId::Reliability => encode_app_enumerated(w, record.reliability as u32)?,
            PropertyId::OutOfService => encode_app_boolean(w, record.out_of_service)?,
            PropertyId::Description => {
                encode_app_character_string(
                    w,
                    record.description.as_deref().unwrap_or_default(),
                )?;
            }
            p if p == PROP_DIAGNOSTIC_KIND => {
                encode_app_unsigned(w, record.diagnostic_kind as u32)?
            }
            p if p == PROP_NETWORK_NUMBER => {
                encode_app_unsigned(w, record.network_number as u32)?
            }
            p if p == PROP_PORT_QUALITY => encode_app_enumerated(w, record.quality as u32)?,
            p if p == PROP_MAC_ADDRESS => encode_app_octet_string(w, &record.mac_address)?,
            p if p == PROP_APDU_LENGTH => encode_app_unsigned(w, record.apdu_length as u32)?,
            p if p == PROP_LINK_SPEED => encode_app_real(w, record.link_speed)?,
            p if p == PROP_CHANGES_PENDING => encode_app_boolean(w, record.changes_pending)?,
            _ => return Err(PropertyError::unknown_property()),
        }
        Ok(())
    }

    fn write_property(
        &mut self,
        instance: u32,
        property: PropertyId,
        value: &DataValue<'_>,
        _priority: Option<u8>,
    ) -> Result<(), PropertyError> {
        match property {
            PropertyId::OutOfService => {
                let value = expect_boolean(value)?;
                let record = self
                    .objects
                    .get_mut(instance)
                    .ok_or(PropertyError::unknown_object())?;
                record.out_of_service = value;
                Ok(())
            }
            p if p == PROP_NETWORK_NUMBER => {
                let value = expect_unsigned(value)?;
                let network_number =
                    u16::try_from(value).map_err(|_| PropertyError::value_out_of_range())?;
                let record = self
                    .objects
                    .get_mut(instance)
                    .ok_or(PropertyError::unknown_object())?;
                record.network_number = network_number;
                record.changes_pending = true;
                Ok(())
            }
            PropertyId::ObjectIdentifier
            | PropertyId::ObjectType
            | PropertyId::StatusFlags
            | PropertyId::Reliability
            | PropertyId::Description => Err(PropertyError::write_access_denied()),
            p if p == PROP_DIAGNOSTIC_KIND
                || p == PROP_PORT_QUALITY
                || p == PROP_MAC_ADDRESS
                || p == PROP_APDU_LENGTH
                || p == PROP_LINK_SPEED
                || p == PROP_CHANGES_PENDING =>
            {
                Err(PropertyError::write_access_denied())
            }
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
    use bacobj_core::encoding::reader::Reader;
    use bacobj_core::encoding::tag::{AppTag, Tag};

    fn store_with_instance(instance: u32) -> DiagnosticStore {
        let mut store = DiagnosticStore::new();
        store.create(instance).unwrap();
        store
    }

    #[test]
    fn network_number_write_latches_changes_pending() {
        let mut store = store_with_instance(1);
        assert_eq!(store.changes_pending(1), Some(false));
        store
            .write_property(1, PROP_NETWORK_NUMBER, &DataValue::Unsigned(1234), None)
            .unwrap();
        assert_eq!(store.network_number(1), Some(1234));
        assert_eq!(store.changes_pending(1), Some(true));
        assert!(store.acknowledge_changes(1));
        assert_eq!(store.changes_pending(1), Some(false));
    }

    #[test]
    fn network_number_wider_than_u16_is_out_of_range() {
        let mut store = store_with_instance(1);
        assert_eq!(
            store.write_property(1, PROP_NETWORK_NUMBER, &DataValue::Unsigned(70_000), None),
            Err(PropertyError::value_out_of_range())
        );
        assert_eq!(store.network_number(1), Some(0));
        assert_eq!(store.changes_pending(1), Some(false));
    }

    #[test]
    fn fault_reliability_sets_the_fault_flag() {
        let mut store = store_with_instance(1);
        store.set_reliability(1, Reliability::CommunicationFailure);

        let mut buf = [0u8; 8];
        let mut w = Writer::new(&mut buf);
        store
            .read_property(1, PropertyId::StatusFlags, None, &mut w)
            .unwrap();
        let mut r = Reader::new(w.as_written());
        let len = Tag::expect_application(&mut r, AppTag::BitString).unwrap();
        assert_eq!(len, 2);
        assert_eq!(r.read_exact(2).unwrap(), &[4, 0b0100_0000]);
    }

    #[test]
    fn proprietary_properties_are_readable() {
        let mut store = store_with_instance(1);
        store.set_mac_address(1, &[0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F]);

        let mut buf = [0u8; 16];
        let mut w = Writer::new(&mut buf);
        store
            .read_property(1, PROP_MAC_ADDRESS, None, &mut w)
            .unwrap();
        assert_eq!(
            w.as_written(),
            &[0x65, 0x06, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F]
        );
    }

    #[test]
    fn read_only_port_properties_reject_writes() {
        let mut store = store_with_instance(1);
        assert_eq!(
            store.write_property(1, PROP_LINK_SPEED, &DataValue::Real(100.0), None),
            Err(PropertyError::write_access_denied())
        );
    }
}
