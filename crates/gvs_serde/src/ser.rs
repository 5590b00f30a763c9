use alloc::string::ToString;
use alloc::vec::Vec;

use gvs_object::{ObjectRef, PropertyInfo, TypeRegistry};
use gvs_utils::hash::HashMap;

use crate::transform::EntityEncoder;
use crate::{Diagnostic, DiagnosticKind, Document, EntityRecord, SerializeError};
use crate::{TransformError, TransformRegistry};

// -----------------------------------------------------------------------------
// Serializer

/// Walks an object graph and flattens it into a [`Document`].
///
/// Entities are discovered breadth first. Each distinct object (by
/// identity) gets the next id on first encounter and is emitted exactly
/// once, in discovery order, so the root is always entity `0` and cycles
/// terminate.
///
/// Only properties that are both readable and writable are written.
/// Properties that cannot be encoded are skipped and reported through
/// [`diagnostics`](Self::diagnostics).
pub struct Serializer<'a> {
    types: &'a TypeRegistry,
    transforms: &'a TransformRegistry,
    ids: HashMap<usize, u64>,
    // Indexed by id; keeps every discovered object alive, so addresses
    // stay unique for the whole walk.
    entities: Vec<ObjectRef>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Serializer<'a> {
    pub fn new(types: &'a TypeRegistry, transforms: &'a TransformRegistry) -> Self {
        Self {
            types,
            transforms,
            ids: gvs_utils::hash::new_map(),
            entities: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Serializes the graph reachable from `root`.
    pub fn serialize(&mut self, root: &ObjectRef) -> Result<Document, SerializeError> {
        self.ids.clear();
        self.entities.clear();
        self.diagnostics.clear();

        if !self.types.contains(root.type_name()) {
            return Err(SerializeError::UnregisteredType {
                type_name: root.type_name(),
            });
        }
        self.mint(root);

        let mut records = Vec::new();
        let mut next = 0;
        while let Some(entity) = self.entities.get(next).cloned() {
            records.push(self.record(next as u64, &entity));
            next += 1;
        }

        // Release the graph before handing out the document.
        self.ids.clear();
        self.entities.clear();

        log::debug!(
            "serialized {} entities, {} properties skipped",
            records.len(),
            self.diagnostics.len()
        );
        Ok(Document::new(records))
    }

    /// Properties skipped by the last [`serialize`](Self::serialize) call.
    #[inline]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn mint(&mut self, entity: &ObjectRef) -> u64 {
        let id = self.entities.len() as u64;
        self.ids.insert(entity.addr(), id);
        self.entities.push(entity.clone());
        id
    }

    fn record(&mut self, id: u64, entity: &ObjectRef) -> EntityRecord {
        let types = self.types;
        let mut record = EntityRecord::new(entity.type_name());

        let Some(class) = types.get(entity.type_name()) else {
            return record;
        };
        log::trace!("entity {} `{}`", id, entity.type_name());

        for property in class.properties() {
            if !property.flags().is_readwrite() {
                continue;
            }
            match self.encode(entity, property) {
                Ok(encoded) => {
                    record.properties.insert(property.name().to_string(), encoded);
                }
                Err(kind) => self.skip(id, entity, property, kind),
            }
        }
        record
    }

    fn encode(
        &mut self,
        entity: &ObjectRef,
        property: &PropertyInfo,
    ) -> Result<gvs_variant::Variant, DiagnosticKind> {
        let value = property
            .get(entity.as_object())
            .map_err(DiagnosticKind::Property)?;
        let serialize = self
            .transforms
            .resolve_serialize(property, self.types)
            .ok_or(DiagnosticKind::NoTransform(property.kind()))?;
        serialize(self, property, &value).map_err(DiagnosticKind::Transform)
    }

    fn skip(&mut self, id: u64, entity: &ObjectRef, property: &PropertyInfo, kind: DiagnosticKind) {
        let diagnostic = Diagnostic {
            id,
            type_name: entity.type_name(),
            property: property.name(),
            kind,
        };
        log::warn!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }
}

impl EntityEncoder for Serializer<'_> {
    fn entity_ref(&mut self, entity: &ObjectRef) -> Result<u64, TransformError> {
        if let Some(id) = self.ids.get(&entity.addr()) {
            return Ok(*id);
        }
        if !self.types.contains(entity.type_name()) {
            return Err(TransformError::UnregisteredType(entity.type_name().to_string()));
        }
        Ok(self.mint(entity))
    }

    #[inline]
    fn types(&self) -> &TypeRegistry {
        self.types
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use gvs_object::{ObjectRef, TypeRegistry, Value};
    use gvs_variant::Variant;

    use super::Serializer;
    use crate::fixtures::{Scalars, TestItem, Unregistered, registry};
    use crate::{DiagnosticKind, SerializeError, TransformError, TransformRegistry};

    #[test]
    fn ids_follow_discovery_order() {
        let types = registry();
        let transforms = TransformRegistry::new();

        let a = TestItem::new("a");
        let b = TestItem::new("b");
        let c = TestItem::new("c");
        TestItem::link(&a, &b);
        TestItem::link(&b, &c);

        let doc = Serializer::new(&types, &transforms).serialize(&a).unwrap();
        let names: alloc::vec::Vec<_> = doc
            .entities
            .iter()
            .map(|r| r.get("name").and_then(Variant::as_maybe_str).flatten())
            .collect();

        assert_eq!(names, [Some("a"), Some("b"), Some("c")]);
        assert_eq!(doc.entities[0].reference("child"), Some(Some(1)));
        assert_eq!(doc.entities[1].reference("child"), Some(Some(2)));
        assert_eq!(doc.entities[1].reference("parent"), Some(Some(0)));
        assert_eq!(doc.entities[2].reference("child"), Some(None));
    }

    #[test]
    fn shared_referent_is_emitted_once() {
        let types = registry();
        let transforms = TransformRegistry::new();

        let root = TestItem::new("root");
        let shared = TestItem::new("shared");
        root.downcast_ref::<TestItem>().unwrap().set_child(Some(shared.clone()));
        root.downcast_ref::<TestItem>().unwrap().set_parent(Some(&shared));

        let doc = Serializer::new(&types, &transforms).serialize(&root).unwrap();

        assert_eq!(doc.len(), 2);
        assert_eq!(doc.entities[0].reference("child"), Some(Some(1)));
        assert_eq!(doc.entities[0].reference("parent"), Some(Some(1)));
    }

    #[test]
    fn self_cycle() {
        let types = registry();
        let transforms = TransformRegistry::new();

        let item = TestItem::new("self");
        TestItem::link(&item, &item);

        let doc = Serializer::new(&types, &transforms).serialize(&item).unwrap();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.entities[0].reference("child"), Some(Some(0)));
        assert_eq!(doc.entities[0].reference("parent"), Some(Some(0)));
    }

    #[test]
    fn only_readwrite_properties() {
        let types = registry();
        let transforms = TransformRegistry::new();

        let root = ObjectRef::new(Scalars::default());
        let doc = Serializer::new(&types, &transforms).serialize(&root).unwrap();
        let record = &doc.entities[0];

        assert!(record.get("read-only").is_none());
        assert!(record.get("write-only").is_none());
        assert!(record.get("int").is_some());
    }

    #[test]
    fn unregistered_root() {
        let types = TypeRegistry::new();
        let transforms = TransformRegistry::new();

        let root = TestItem::new("lost");
        assert_eq!(
            Serializer::new(&types, &transforms).serialize(&root),
            Err(SerializeError::UnregisteredType { type_name: "TestItem" })
        );
    }

    #[test]
    fn unregistered_referent_drops_property() {
        let types = registry();
        let transforms = TransformRegistry::new();

        let root = TestItem::new("root");
        let stranger = ObjectRef::new(Unregistered);
        root.downcast_ref::<TestItem>().unwrap().set_child(Some(stranger));

        let mut serializer = Serializer::new(&types, &transforms);
        let doc = serializer.serialize(&root).unwrap();

        assert_eq!(doc.len(), 1);
        assert!(doc.entities[0].get("child").is_none());
        assert!(doc.entities[0].get("name").is_some());

        let diagnostics = serializer.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].property, "child");
        assert!(matches!(
            &diagnostics[0].kind,
            DiagnosticKind::Transform(TransformError::UnregisteredType(name)) if name == "Unregistered"
        ));
    }

    #[test]
    fn getter_values() {
        let types = registry();
        let transforms = TransformRegistry::new();

        let root = ObjectRef::new(Scalars::default());
        types.set_property(&root, "int", Value::Int(-4)).unwrap();

        let doc = Serializer::new(&types, &transforms).serialize(&root).unwrap();
        assert_eq!(doc.entities[0].get("int"), Some(&Variant::Int32(-4)));
    }
}
