use alloc::vec::Vec;

use gvs_object::{ObjectRef, TypeRegistry};

use super::{entity_index, transform_error};
use crate::transform::EntityDecoder;
use crate::{DeserializeError, Diagnostic, DiagnosticKind, EntityRecord, Phase};
use crate::{TransformError, TransformRegistry};

/// Pass 2: sets every property that was not supplied at construction,
/// resolving references by id into the table.
pub(crate) struct Resolver<'a> {
    types: &'a TypeRegistry,
    transforms: &'a TransformRegistry,
    records: &'a [EntityRecord],
    table: &'a [ObjectRef],
    diagnostics: &'a mut Vec<Diagnostic>,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(
        types: &'a TypeRegistry,
        transforms: &'a TransformRegistry,
        records: &'a [EntityRecord],
        table: &'a [ObjectRef],
        diagnostics: &'a mut Vec<Diagnostic>,
    ) -> Self {
        Self {
            types,
            transforms,
            records,
            table,
            diagnostics,
        }
    }

    pub(crate) fn resolve(mut self) -> Result<(), DeserializeError> {
        let (records, table) = (self.records, self.table);
        for (index, (record, object)) in records.iter().zip(table).enumerate() {
            self.resolve_entity(index as u64, record, object)?;
        }
        Ok(())
    }

    fn resolve_entity(
        &mut self,
        id: u64,
        record: &EntityRecord,
        object: &ObjectRef,
    ) -> Result<(), DeserializeError> {
        let types = self.types;
        let Some(class) = types.get(object.type_name()) else {
            return Err(DeserializeError::UnknownType {
                id,
                type_name: record.type_name.clone(),
            });
        };

        if let Some(name) = record.properties.keys().find(|name| class.property(name).is_none()) {
            return Err(DeserializeError::UnknownProperty {
                id,
                type_name: record.type_name.clone(),
                property: name.clone(),
            });
        }

        for property in class.properties() {
            if property.is_construct_only() {
                continue;
            }
            let Some(encoded) = record.get(property.name()) else {
                continue;
            };
            let Some(deserialize) = self.transforms.resolve_deserialize(property, types) else {
                let diagnostic = Diagnostic {
                    id,
                    type_name: class.type_name(),
                    property: property.name(),
                    kind: DiagnosticKind::NoTransform(property.kind()),
                };
                log::warn!("{diagnostic}");
                self.diagnostics.push(diagnostic);
                continue;
            };

            let value = deserialize(self, property, encoded).map_err(|err| {
                transform_error(
                    id,
                    property.name(),
                    err,
                    self.table.len(),
                    Phase::EntitiesAllocated,
                )
            })?;
            types
                .set_property(object, property.name(), value)
                .map_err(|source| DeserializeError::Property { id, source })?;
        }
        Ok(())
    }
}

impl EntityDecoder for Resolver<'_> {
    fn entity(&mut self, id: u64) -> Result<ObjectRef, TransformError> {
        entity_index(id, self.table.len())
            .map(|index| self.table[index].clone())
            .ok_or(TransformError::Reference(id))
    }

    #[inline]
    fn types(&self) -> &TypeRegistry {
        self.types
    }
}
