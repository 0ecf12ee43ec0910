//! Color Temperature object: an unsigned present-value in Kelvin with the
//! default fade/ramp/step parameters the color control loop consumes.
//!
//! Present-value writes are gated per record by a write-enabled flag and
//! reported to an optional observer hook so the application can drive the
//! actual fixture.

use crate::engine::{
    expect_unsigned, CreateError, CreateOutcome, ObjectHandler, PropertyError, PropertyLists,
};
use crate::keylist::KeyList;
use bacobj_core::encoding::primitives::{
    encode_app_character_string, encode_app_enumerated, encode_app_object_id,
    encode_app_unsigned, encode_ctx_unsigned,
};
use bacobj_core::encoding::writer::Writer;
use bacobj_core::types::{DataValue, ObjectId, ObjectType, PropertyId, WILDCARD_INSTANCE};
use std::any::Any;

/// Shortest and longest fade the transition engine accepts, in milliseconds.
pub const FADE_TIME_MIN: u32 = 100;
pub const FADE_TIME_MAX: u32 = 86_400_000;

/// Observer invoked after a successful BACnet present-value write with
/// `(instance, old_kelvin, new_kelvin)`.
pub type WritePresentValueHook = Box<dyn FnMut(u32, u32, u32) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum OperationInProgress {
    Idle = 0,
    FadeActive = 1,
    RampActive = 2,
    NotControlled = 3,
    Other = 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Transition {
    None = 0,
    Fade = 1,
    Ramp = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ColorOperation {
    None = 0,
    FadeToColor = 1,
    FadeToCct = 2,
    RampToCct = 3,
    StepUpCct = 4,
    StepDownCct = 5,
    Stop = 6,
}

/// The last color command received, reported through the read path as a
/// context-tagged sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorCommand {
    pub operation: ColorOperation,
    pub target_color_temperature: Option<u32>,
    pub fade_time: Option<u32>,
    pub ramp_rate: Option<u32>,
    pub step_increment: Option<u32>,
}

impl Default for ColorCommand {
    fn default() -> Self {
        Self {
            operation: ColorOperation::None,
            target_color_temperature: None,
            fade_time: None,
            ramp_rate: None,
            step_increment: None,
        }
    }
}

impl ColorCommand {
    fn encode(&self, w: &mut Writer<'_>) -> Result<(), PropertyError> {
        encode_ctx_unsigned(w, 0, self.operation as u32)?;
        if let Some(target) = self.target_color_temperature {
            encode_ctx_unsigned(w, 2, target)?;
        }
        if let Some(fade_time) = self.fade_time {
            encode_ctx_unsigned(w, 3, fade_time)?;
        }
        if let Some(ramp_rate) = self.ramp_rate {
            encode_ctx_unsigned(w, 4, ramp_rate)?;
        }
        if let Some(step) = self.step_increment {
            encode_ctx_unsigned(w, 5, step)?;
        }
        Ok(())
    }
}

#[derive(Debug)]
struct Record {
    present_value: u32,
    tracking_value: u32,
    color_command: ColorCommand,
    in_progress: OperationInProgress,
    default_color_temperature: u32,
    default_fade_time: u32,
    default_ramp_rate: u32,
    default_step_increment: u32,
    transition: Transition,
    min_pres_value: u32,
    max_pres_value: u32,
    object_name: Option<String>,
    description: Option<String>,
    write_enabled: bool,
}

impl Default for Record {
    fn default() -> Self {
        Self {
            present_value: 0,
            tracking_value: 0,
            color_command: ColorCommand::default(),
            in_progress: OperationInProgress::Idle,
            default_color_temperature: 5000,
            default_fade_time: 0,
            default_ramp_rate: 0,
            default_step_increment: 0,
            transition: Transition::None,
            min_pres_value: 0,
            max_pres_value: 0,
            object_name: None,
            description: None,
            write_enabled: false,
        }
    }
}

static PROPERTIES: PropertyLists = PropertyLists {
    required: &[
        PropertyId::ObjectIdentifier,
        PropertyId::ObjectName,
        PropertyId::ObjectType,
        PropertyId::PresentValue,
        PropertyId::TrackingValue,
        PropertyId::ColorCommand,
        PropertyId::InProgress,
        PropertyId::DefaultColorTemperature,
        PropertyId::DefaultFadeTime,
        PropertyId::DefaultRampRate,
        PropertyId::DefaultStepIncrement,
    ],
    optional: &[
        PropertyId::Description,
        PropertyId::Transition,
        PropertyId::MinPresValue,
        PropertyId::MaxPresValue,
    ],
    proprietary: &[],
};

/// Store of every Color Temperature instance on the device.
#[derive(Default)]
pub struct ColorTemperatureStore {
    objects: KeyList<Record>,
    write_hook: Option<WritePresentValueHook>,
}

impl ColorTemperatureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the observer called when present-value is written over BACnet.
    pub fn set_write_hook(&mut self, hook: WritePresentValueHook) {
        self.write_hook = Some(hook);
    }

    pub fn present_value(&self, instance: u32) -> Option<u32> {
        self.objects.get(instance).map(|o| o.present_value)
    }

    /// Sets present-value directly, bypassing the BACnet write gate.
    pub fn set_present_value(&mut self, instance: u32, value: u32) -> bool {
        match self.objects.get_mut(instance) {
            Some(o) => {
                o.present_value = value;
                true
            }
            None => false,
        }
    }

    pub fn tracking_value(&self, instance: u32) -> Option<u32> {
        self.objects.get(instance).map(|o| o.tracking_value)
    }

    pub fn set_tracking_value(&mut self, instance: u32, value: u32) -> bool {
        match self.objects.get_mut(instance) {
            Some(o) => {
                o.tracking_value = value;
                true
            }
            None => false,
        }
    }

    pub fn min_pres_value(&self, instance: u32) -> Option<u32> {
        self.objects.get(instance).map(|o| o.min_pres_value)
    }

    pub fn set_min_pres_value(&mut self, instance: u32, value: u32) -> bool {
        match self.objects.get_mut(instance) {
            Some(o) => {
                o.min_pres_value = value;
                true
            }
            None => false,
        }
    }

    pub fn max_pres_value(&self, instance: u32) -> Option<u32> {
        self.objects.get(instance).map(|o| o.max_pres_value)
    }

    pub fn set_max_pres_value(&mut self, instance: u32, value: u32) -> bool {
        match self.objects.get_mut(instance) {
            Some(o) => {
                o.max_pres_value = value;
                true
            }
            None => false,
        }
    }

    pub fn color_command(&self, instance: u32) -> Option<ColorCommand> {
        self.objects.get(instance).map(|o| o.color_command)
    }

    pub fn set_color_command(&mut self, instance: u32, value: ColorCommand) -> bool {
        match self.objects.get_mut(instance) {
            Some(o) => {
                o.color_command = value;
                true
            }
            None => false,
        }
    }

    pub fn in_progress(&self, instance: u32) -> Option<OperationInProgress> {
        self.objects.get(instance).map(|o| o.in_progress)
    }

    pub fn set_in_progress(&mut self, instance: u32, value: OperationInProgress) -> bool {
        match self.objects.get_mut(instance) {
            Some(o) => {
                o.in_progress = value;
                true
            }
            None => false,
        }
    }

    pub fn default_color_temperature(&self, instance: u32) -> Option<u32> {
        self.objects
            .get(instance)
            .map(|o| o.default_color_temperature)
    }

    pub fn set_default_color_temperature(&mut self, instance: u32, value: u32) -> bool {
        match self.objects.get_mut(instance) {
            Some(o) => {
                o.default_color_temperature = value;
                true
            }
            None => false,
        }
    }

    pub fn default_fade_time(&self, instance: u32) -> Option<u32> {
        self.objects.get(instance).map(|o| o.default_fade_time)
    }

    /// Sets the default fade time. Values outside 0 or
    /// `FADE_TIME_MIN..=FADE_TIME_MAX` leave the stored value unchanged.
    pub fn set_default_fade_time(&mut self, instance: u32, value: u32) -> bool {
        match self.objects.get_mut(instance) {
            Some(o) => {
                if value == 0 || (FADE_TIME_MIN..=FADE_TIME_MAX).contains(&value) {
                    o.default_fade_time = value;
                }
                true
            }
            None => false,
        }
    }

    pub fn default_ramp_rate(&self, instance: u32) -> Option<u32> {
        self.objects.get(instance).map(|o| o.default_ramp_rate)
    }

    pub fn set_default_ramp_rate(&mut self, instance: u32, value: u32) -> bool {
        match self.objects.get_mut(instance) {
            Some(o) => {
                o.default_ramp_rate = value;
                true
            }
            None => false,
        }
    }

    pub fn default_step_increment(&self, instance: u32) -> Option<u32> {
        self.objects.get(instance).map(|o| o.default_step_increment)
    }

    pub fn set_default_step_increment(&mut self, instance: u32, value: u32) -> bool {
        match self.objects.get_mut(instance) {
            Some(o) => {
                o.default_step_increment = value;
                true
            }
            None => false,
        }
    }

    pub fn transition(&self, instance: u32) -> Option<Transition> {
        self.objects.get(instance).map(|o| o.transition)
    }

    pub fn set_transition(&mut self, instance: u32, value: Transition) -> bool {
        match self.objects.get_mut(instance) {
            Some(o) => {
                o.transition = value;
                true
            }
            None => false,
        }
    }

    pub fn description(&self, instance: u32) -> Option<String> {
        self.objects
            .get(instance)
            .map(|o| o.description.clone().unwrap_or_default())
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

    pub fn write_enabled(&self, instance: u32) -> bool {
        self.objects
            .get(instance)
            .is_some_and(|o| o.write_enabled)
    }

    pub fn write_enable(&mut self, instance: u32) {
        if let Some(o) = self.objects.get_mut(instance) {
            o.write_enabled = true;
        }
    }

    pub fn write_disable(&mut self, instance: u32) {
        if let Some(o) = self.objects.get_mut(instance) {
            o.write_enabled = false;
        }
    }

    /// The BACnet write path for present-value: gated by the record's
    /// write-enabled flag, observer notified on success. Priority is
    /// accepted but not arbitrated; this object has no priority array.
    fn write_present_value(
        &mut self,
        instance: u32,
        value: u32,
        _priority: Option<u8>,
    ) -> Result<(), PropertyError> {
        let record = self
            .objects
            .get_mut(instance)
            .ok_or(PropertyError::unknown_object())?;
        if !record.write_enabled {
            return Err(PropertyError::write_access_denied());
        }
        let old_value = record.present_value;
        record.present_value = value;
        if let Some(hook) = self.write_hook.as_mut() {
            hook(instance, old_value, value);
        }
        Ok(())
    }
}

impl ObjectHandler for ColorTemperatureStore {
    fn object_type(&self) -> ObjectType {
        ObjectType::ColorTemperature
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
            None => format!("COLOR-TEMPERATURE-{instance}"),
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
            PropertyId::ObjectIdentifier => encode_app_object_id(
                w,
                ObjectId::new(ObjectType::ColorTemperature, instance),
            )?,
            PropertyId::ObjectName => {
                let name = self
                    .object_name(instance)
                    .ok_or(PropertyError::unknown_object())?;
                encode_app_character_string(w, &name)?;
            }
            PropertyId::ObjectType => {
                encode_app_enumerated(w, ObjectType::ColorTemperature.to_u16() as u32)?
            }
            PropertyId::PresentValue => encode_app_unsigned(w, record.present_value)?,
            PropertyId::TrackingValue => encode_app_unsigned(w, record.tracking_value)?,
            PropertyId::ColorCommand => record.color_command.encode(w)?,
            PropertyId::InProgress => encode_app_enumerated(w, record.in_progress as u32)?,
            PropertyId::DefaultColorTemperature => {
                encode_app_unsigned(w, record.default_color_temperature)?
            }
            PropertyId::DefaultFadeTime => encode_app_unsigned(w, record.default_fade_time)?,
            PropertyId::DefaultRampRate => encode_app_unsigned(w, record.default_ramp_rate)?,
            PropertyId::DefaultStepIncrement => {
                encode_app_unsigned(w, record.default_step_increment)?
            }
            PropertyId::Transition => encode_app_enumerated(w, record.transition as u32)?,
            PropertyId::MinPresValue => encode_app_unsigned(w, record.min_pres_value)?,
            PropertyId::MaxPresValue => encode_app_unsigned(w, record.max_pres_value)?,
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
            PropertyId::PresentValue => {
                let value = expect_unsigned(value)?;
                self.write_present_value(instance, value, priority)
            }
            PropertyId::ObjectIdentifier
            | PropertyId::ObjectType
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
