use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use gvs_variant::Variant;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::DeserializeError;

/// Identifies a serialized graph, `"gvso"` read as a big endian integer.
pub const MAGIC: u32 = 0x6776_736F;

/// The only protocol version this crate reads and writes.
pub const PROTOCOL_VERSION: u16 = 1;

// -----------------------------------------------------------------------------
// EntityRecord

/// One entity: its registered type name and its encoded properties.
///
/// Serialized as the pair `(type_name, properties)`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntityRecord {
    pub type_name: String,
    pub properties: BTreeMap<String, Variant>,
}

impl EntityRecord {
    #[inline]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            properties: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn get(&self, property: &str) -> Option<&Variant> {
        self.properties.get(property)
    }

    /// Reads a reference property, `Some(None)` for a null reference.
    pub fn reference(&self, property: &str) -> Option<Option<u64>> {
        match self.get(property)?.as_maybe()? {
            Some(inner) => inner.as_u64().map(Some),
            None => Some(None),
        }
    }
}

impl Serialize for EntityRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.type_name, &self.properties).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for EntityRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (type_name, properties) = Deserialize::deserialize(deserializer)?;
        Ok(Self {
            type_name,
            properties,
        })
    }
}

// -----------------------------------------------------------------------------
// Document

/// A serialized graph.
///
/// `entities[0]` is the root, references between entities are indices
/// into `entities`. Serialized as the triple
/// `(magic, protocol_version, entities)`.
///
/// The header is not checked when a document is read through serde,
/// that happens in [`validate`](Self::validate) so that a foreign
/// document can still be inspected.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub magic: u32,
    pub protocol_version: u16,
    pub entities: Vec<EntityRecord>,
}

impl Document {
    /// Stamps the current magic and protocol version.
    #[inline]
    pub const fn new(entities: Vec<EntityRecord>) -> Self {
        Self {
            magic: MAGIC,
            protocol_version: PROTOCOL_VERSION,
            entities,
        }
    }

    /// Checks the header and returns the records.
    pub fn validate(&self) -> Result<&[EntityRecord], DeserializeError> {
        if self.magic != MAGIC {
            return Err(DeserializeError::BadMagic { found: self.magic });
        }
        if self.protocol_version != PROTOCOL_VERSION {
            return Err(DeserializeError::UnsupportedVersion(self.protocol_version));
        }
        Ok(&self.entities)
    }

    #[inline]
    pub fn root(&self) -> Option<&EntityRecord> {
        self.entities.first()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.magic, self.protocol_version, &self.entities).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (magic, protocol_version, entities) = Deserialize::deserialize(deserializer)?;
        Ok(Self {
            magic,
            protocol_version,
            entities,
        })
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::vec;

    use gvs_variant::Variant;

    use super::{Document, EntityRecord, MAGIC, PROTOCOL_VERSION};
    use crate::DeserializeError;

    #[test]
    fn header() {
        assert_eq!(MAGIC, 1_735_816_047);
        assert_eq!(&MAGIC.to_be_bytes(), b"gvso");

        let doc = Document::new(vec![EntityRecord::new("A")]);
        assert_eq!(doc.validate().map(<[_]>::len), Ok(1));

        let bad = Document { magic: 0, ..doc.clone() };
        assert_eq!(bad.validate(), Err(DeserializeError::BadMagic { found: 0 }));

        let newer = Document {
            protocol_version: PROTOCOL_VERSION + 1,
            ..doc
        };
        assert_eq!(newer.validate(), Err(DeserializeError::UnsupportedVersion(2)));
    }

    #[test]
    fn ron_layout() {
        let mut record = EntityRecord::new("TestItem");
        record
            .properties
            .insert("child".into(), Variant::maybe(Some(Variant::UInt64(1))));
        record.properties.insert("parent".into(), Variant::nothing());

        let doc = Document::new(vec![record]);
        let text = ron::to_string(&doc).unwrap();
        assert!(text.starts_with("(1735816047,1,["));
        assert!(text.contains("\"TestItem\""));

        let back: Document = ron::from_str(&text).unwrap();
        assert_eq!(back, doc);
        assert_eq!(back.root().unwrap().reference("child"), Some(Some(1)));
        assert_eq!(back.root().unwrap().reference("parent"), Some(None));
        assert_eq!(back.root().unwrap().reference("name"), None);
    }
}
