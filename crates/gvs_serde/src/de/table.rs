use alloc::vec;
use alloc::vec::Vec;

use gvs_object::{ConstructParams, ObjectRef, TypeRegistry};

use super::{entity_index, transform_error};
use crate::transform::EntityDecoder;
use crate::{DeserializeError, Diagnostic, DiagnosticKind, EntityRecord, Phase};
use crate::{TransformError, TransformRegistry};

#[derive(Clone)]
enum Slot {
    Pending,
    Building,
    Built(ObjectRef),
}

/// Result of one construction attempt.
enum Step {
    Built(ObjectRef),
    /// A construct-only property references an entity not built yet.
    Needs(usize),
}

/// Pass 1: constructs one object per record, supplying only the
/// construct-only properties.
///
/// A construct-only reference to a record that is not built yet builds
/// that record first. Pending records wait on an explicit work stack, so
/// the depth of such chains is bounded by memory only.
pub(crate) struct TableBuilder<'a> {
    types: &'a TypeRegistry,
    transforms: &'a TransformRegistry,
    records: &'a [EntityRecord],
    slots: Vec<Slot>,
    diagnostics: &'a mut Vec<Diagnostic>,
    // Set by `entity` for an unbuilt target, cleared before each decode.
    needs: Option<usize>,
    // A construct-only cycle found by `entity`, reported instead of the
    // transform error that carried it out.
    failure: Option<DeserializeError>,
}

impl<'a> TableBuilder<'a> {
    pub(crate) fn new(
        types: &'a TypeRegistry,
        transforms: &'a TransformRegistry,
        records: &'a [EntityRecord],
        diagnostics: &'a mut Vec<Diagnostic>,
    ) -> Self {
        Self {
            types,
            transforms,
            records,
            slots: vec![Slot::Pending; records.len()],
            diagnostics,
            needs: None,
            failure: None,
        }
    }

    pub(crate) fn build(mut self) -> Result<Vec<ObjectRef>, DeserializeError> {
        for index in 0..self.records.len() {
            self.ensure(index)?;
        }
        Ok(self
            .slots
            .into_iter()
            .filter_map(|slot| match slot {
                Slot::Built(object) => Some(object),
                _ => None,
            })
            .collect())
    }

    /// Builds `index` and, first, every record its construct-only
    /// properties reference.
    ///
    /// Records on the stack are `Building`; a reference back to one of
    /// them is a construction cycle.
    fn ensure(&mut self, index: usize) -> Result<(), DeserializeError> {
        let mut stack = vec![index];
        while let Some(&top) = stack.last() {
            if let Slot::Built(_) = self.slots[top] {
                stack.pop();
                continue;
            }
            self.slots[top] = Slot::Building;
            match self.try_construct(top)? {
                Step::Built(object) => {
                    self.slots[top] = Slot::Built(object);
                    stack.pop();
                }
                Step::Needs(dependency) => stack.push(dependency),
            }
        }
        Ok(())
    }

    fn try_construct(&mut self, index: usize) -> Result<Step, DeserializeError> {
        let id = index as u64;
        let (types, records) = (self.types, self.records);
        let record = &records[index];
        let class = types
            .get(&record.type_name)
            .ok_or_else(|| DeserializeError::UnknownType {
                id,
                type_name: record.type_name.clone(),
            })?;

        let mut params = ConstructParams::new();
        let mut skipped = Vec::new();
        for property in class.properties().iter().filter(|p| p.is_construct_only()) {
            let Some(encoded) = record.get(property.name()) else {
                continue;
            };
            let Some(deserialize) = self.transforms.resolve_deserialize(property, types) else {
                skipped.push(Diagnostic {
                    id,
                    type_name: class.type_name(),
                    property: property.name(),
                    kind: DiagnosticKind::NoTransform(property.kind()),
                });
                continue;
            };

            self.needs = None;
            let decoded = deserialize(self, property, encoded);
            if let Some(failure) = self.failure.take() {
                return Err(failure);
            }
            if let Some(dependency) = self.needs.take() {
                return Ok(Step::Needs(dependency));
            }
            let value = decoded.map_err(|err| {
                transform_error(id, property.name(), err, records.len(), Phase::HeaderValidated)
            })?;
            params.push(property.name(), value);
        }

        for diagnostic in skipped {
            log::warn!("{diagnostic}");
            self.diagnostics.push(diagnostic);
        }

        log::trace!("construct entity {} `{}`", id, class.type_name());
        let object = types
            .construct(class.type_name(), params)
            .map_err(|source| DeserializeError::Construct { id, source })?;
        Ok(Step::Built(object))
    }
}

impl EntityDecoder for TableBuilder<'_> {
    fn entity(&mut self, id: u64) -> Result<ObjectRef, TransformError> {
        let index = entity_index(id, self.records.len()).ok_or(TransformError::Reference(id))?;
        match &self.slots[index] {
            Slot::Built(object) => Ok(object.clone()),
            Slot::Building => {
                self.failure = Some(DeserializeError::ConstructionCycle { id });
                Err(TransformError::Entity(id))
            }
            Slot::Pending => {
                self.needs = Some(index);
                Err(TransformError::Entity(id))
            }
        }
    }

    #[inline]
    fn types(&self) -> &TypeRegistry {
        self.types
    }
}
