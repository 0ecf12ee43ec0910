//! Device-wide object database: the handler registry, the dispatch entry
//! points, and the cross-type services (name uniqueness, database revision)
//! individual object stores call back into through the device.

use crate::engine::{
    expect_character_string, CreateError, CreateOutcome, ObjectHandler, PropertyError,
    PropertyLists, ReadRequest, WriteRequest,
};
use bacobj_core::encoding::reader::Reader;
use bacobj_core::encoding::value::decode_application_data_value;
use bacobj_core::encoding::writer::Writer;
use bacobj_core::types::{ObjectId, ObjectType, PropertyId};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("a store for object type {0:?} is already registered")]
    DuplicateType(ObjectType),
}

/// One device's object population: a capability table per object type plus
/// the device-wide database revision counter.
///
/// Not internally synchronized — callers serialize access (see the crate
/// docs). Every dispatch call runs to completion without blocking.
#[derive(Default)]
pub struct Device {
    handlers: Vec<Box<dyn ObjectHandler>>,
    database_revision: u32,
}

impl Device {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            database_revision: 0,
        }
    }

    /// Registers an object type's store. Each type may be registered once.
    pub fn register(&mut self, handler: Box<dyn ObjectHandler>) -> Result<(), RegistryError> {
        let object_type = handler.object_type();
        if self.handler(object_type).is_some() {
            return Err(RegistryError::DuplicateType(object_type));
        }
        self.handlers.push(handler);
        Ok(())
    }

    pub fn handler(&self, object_type: ObjectType) -> Option<&dyn ObjectHandler> {
        self.handlers
            .iter()
            .find(|h| h.object_type() == object_type)
            .map(|h| h.as_ref())
    }

    pub fn handler_mut(&mut self, object_type: ObjectType) -> Option<&mut (dyn ObjectHandler + 'static)> {
        self.handlers
            .iter_mut()
            .find(|h| h.object_type() == object_type)
            .map(|h| h.as_mut())
    }

    /// Typed access to a registered store.
    pub fn store<T: ObjectHandler + 'static>(&self, object_type: ObjectType) -> Option<&T> {
        self.handler(object_type)?.as_any().downcast_ref::<T>()
    }

    /// Typed mutable access to a registered store.
    pub fn store_mut<T: ObjectHandler + 'static>(
        &mut self,
        object_type: ObjectType,
    ) -> Option<&mut T> {
        self.handler_mut(object_type)?
            .as_any_mut()
            .downcast_mut::<T>()
    }

    /// Monotonic counter bumped on every structural change; subscribers use
    /// it to detect a stale view of the object population.
    pub fn database_revision(&self) -> u32 {
        self.database_revision
    }

    pub fn property_lists(&self, object_type: ObjectType) -> Option<&'static PropertyLists> {
        Some(self.handler(object_type)?.property_lists())
    }

    pub fn object_count(&self, object_type: ObjectType) -> usize {
        self.handler(object_type).map_or(0, |h| h.count())
    }

    pub fn valid_instance(&self, object_type: ObjectType, instance: u32) -> bool {
        self.handler(object_type)
            .is_some_and(|h| h.valid_instance(instance))
    }

    pub fn index_to_instance(&self, object_type: ObjectType, index: usize) -> Option<u32> {
        self.handler(object_type)?.instance_at(index)
    }

    pub fn instance_to_index(&self, object_type: ObjectType, instance: u32) -> Option<usize> {
        self.handler(object_type)?.index_of(instance)
    }

    /// Creates an object, allocating an instance when the wildcard sentinel
    /// is passed. Creating an already-live instance returns its id without
    /// touching the revision.
    pub fn create_object(
        &mut self,
        object_type: ObjectType,
        instance: u32,
    ) -> Result<ObjectId, CreateError> {
        let handler = self
            .handler_mut(object_type)
            .ok_or(CreateError::UnsupportedType(object_type))?;
        let outcome = handler.create(instance)?;
        if let CreateOutcome::Created(created) = outcome {
            log::debug!("created {object_type:?} instance {created}");
            self.bump_revision(1);
        }
        Ok(ObjectId::new(object_type, outcome.instance()))
    }

    /// Deletes an object. Returns false (and leaves the revision alone)
    /// when the type or instance is not live.
    pub fn delete_object(&mut self, object_type: ObjectType, instance: u32) -> bool {
        let Some(handler) = self.handler_mut(object_type) else {
            return false;
        };
        if handler.delete(instance) {
            log::debug!("deleted {object_type:?} instance {instance}");
            self.bump_revision(1);
            true
        } else {
            false
        }
    }

    /// Deletes every object of every registered type.
    pub fn cleanup(&mut self) {
        let mut removed = 0usize;
        for handler in &mut self.handlers {
            removed += handler.clear();
        }
        if removed > 0 {
            log::debug!("cleanup removed {removed} objects");
            self.bump_revision(removed as u32);
        }
    }

    /// Scans the whole object population for a name. Object names are
    /// unique device-wide across all types.
    pub fn find_object_by_name(&self, name: &str) -> Option<ObjectId> {
        for handler in &self.handlers {
            for index in 0..handler.count() {
                let Some(instance) = handler.instance_at(index) else {
                    continue;
                };
                if handler.object_name(instance).as_deref() == Some(name) {
                    return Some(ObjectId::new(handler.object_type(), instance));
                }
            }
        }
        None
    }

    /// Renames an object after the device-wide uniqueness check. Writing an
    /// object's current name back to itself is a no-op success; a name held
    /// by any other live object is `(Property, DuplicateName)`; a fresh name
    /// commits and bumps the revision once.
    pub fn set_object_name(
        &mut self,
        object_type: ObjectType,
        instance: u32,
        name: &str,
    ) -> Result<(), PropertyError> {
        if !self.valid_instance(object_type, instance) {
            return Err(PropertyError::unknown_object());
        }
        if let Some(existing) = self.find_object_by_name(name) {
            if existing.object_type() == object_type && existing.instance() == instance {
                return Ok(());
            }
            return Err(PropertyError::duplicate_name());
        }
        let handler = self
            .handler_mut(object_type)
            .ok_or(PropertyError::unknown_object())?;
        if !handler.commit_object_name(instance, name) {
            return Err(PropertyError::unknown_object());
        }
        log::debug!("renamed {object_type:?} instance {instance} to {name:?}");
        self.bump_revision(1);
        Ok(())
    }

    /// Resolves a read request and encodes the property value into `buf`,
    /// returning the byte count. `buf` should be sized to
    /// [`bacobj_core::MAX_APDU`].
    pub fn read_property(
        &self,
        req: &ReadRequest,
        buf: &mut [u8],
    ) -> Result<usize, PropertyError> {
        let handler = self
            .handler(req.object_type)
            .ok_or(PropertyError::unknown_object())?;
        if !handler.valid_instance(req.instance) {
            return Err(PropertyError::unknown_object());
        }
        if !handler.property_lists().contains(req.property) {
            return Err(PropertyError::unknown_property());
        }
        // Only array properties can have array options.
        if req.array_index.is_some() && !handler.is_array_property(req.property) {
            return Err(PropertyError::not_an_array());
        }

        let mut w = Writer::new(buf);
        handler.read_property(req.instance, req.property, req.array_index, &mut w)?;
        Ok(w.position())
    }

    /// Resolves a write request: validates object, property, array index,
    /// and priority, decodes the value once, then routes to the accessor.
    /// All validation precedes any mutation; a failed write changes nothing.
    pub fn write_property(&mut self, req: &WriteRequest<'_>) -> Result<(), PropertyError> {
        let handler = self
            .handler(req.object_type)
            .ok_or(PropertyError::unknown_object())?;
        if !handler.valid_instance(req.instance) {
            return Err(PropertyError::unknown_object());
        }
        if !handler.property_lists().contains(req.property) {
            return Err(PropertyError::unknown_property());
        }
        if req.array_index.is_some() && !handler.is_array_property(req.property) {
            return Err(PropertyError::not_an_array());
        }
        if let Some(priority) = req.priority {
            if !(1..=16).contains(&priority) {
                return Err(PropertyError::value_out_of_range());
            }
        }

        let mut r = Reader::new(req.value);
        let value = decode_application_data_value(&mut r)
            .map_err(|_| PropertyError::value_out_of_range())?;

        if req.property == PropertyId::ObjectName {
            let name = expect_character_string(&value)?;
            return self.set_object_name(req.object_type, req.instance, name);
        }

        let handler = self
            .handler_mut(req.object_type)
            .ok_or(PropertyError::unknown_object())?;
        let result = handler.write_property(req.instance, req.property, &value, req.priority);
        if let Err(e) = result {
            log::trace!(
                "write to {:?}/{}/{:?} rejected: {e}",
                req.object_type,
                req.instance,
                req.property
            );
        }
        result
    }

    fn bump_revision(&mut self, count: u32) {
        self.database_revision = self.database_revision.wrapping_add(count);
    }
}
