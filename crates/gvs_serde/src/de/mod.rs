//! Rebuilds an object graph from a [`Document`] in two passes.
//!
//! 1. [`table`]: every record is constructed, in id order, with only its
//!    construct-only properties.
//! 2. [`resolve`]: every other property is decoded and set; references are
//!    plain lookups into the table built by pass 1, so cycles need no
//!    special handling.

mod resolve;
mod table;

use alloc::vec::Vec;

use gvs_object::{ObjectRef, TypeRegistry};

use crate::{DeserializeError, Diagnostic, Document, Phase, TransformError, TransformRegistry};

use self::resolve::Resolver;
use self::table::TableBuilder;

// -----------------------------------------------------------------------------
// Deserializer

/// Reconstructs the object graph of a [`Document`].
///
/// Returns the root, entity `0`. Entities not reachable from the root are
/// constructed too and dropped with the table unless something holds them.
pub struct Deserializer<'a> {
    types: &'a TypeRegistry,
    transforms: &'a TransformRegistry,
    phase: Phase,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Deserializer<'a> {
    pub fn new(types: &'a TypeRegistry, transforms: &'a TransformRegistry) -> Self {
        Self {
            types,
            transforms,
            phase: Phase::Unstarted,
            diagnostics: Vec::new(),
        }
    }

    pub fn deserialize(&mut self, document: &Document) -> Result<ObjectRef, DeserializeError> {
        self.phase = Phase::Unstarted;
        self.diagnostics.clear();

        let records = document.validate()?;
        self.advance(Phase::HeaderValidated);
        if records.is_empty() {
            return Err(DeserializeError::Empty);
        }

        let table = TableBuilder::new(self.types, self.transforms, records, &mut self.diagnostics)
            .build()?;
        self.advance(Phase::EntitiesAllocated);

        Resolver::new(self.types, self.transforms, records, &table, &mut self.diagnostics)
            .resolve()?;
        self.advance(Phase::PropertiesResolved);

        let root = table.into_iter().next().ok_or(DeserializeError::Empty)?;
        self.advance(Phase::Done);
        Ok(root)
    }

    /// The phase reached by the last call; the phase of the failure if it
    /// returned an error.
    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Properties skipped by the last call.
    #[inline]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn advance(&mut self, phase: Phase) {
        log::debug!("deserialize: {} -> {}", self.phase, phase);
        self.phase = phase;
    }
}

// -----------------------------------------------------------------------------
// Helpers

/// Converts an id into a table index, `None` when out of range.
fn entity_index(id: u64, len: usize) -> Option<usize> {
    usize::try_from(id).ok().filter(|&index| index < len)
}

fn transform_error(
    id: u64,
    property: &'static str,
    err: TransformError,
    len: usize,
    phase: Phase,
) -> DeserializeError {
    match err {
        TransformError::Reference(target) => DeserializeError::DanglingReference {
            id,
            target,
            len,
            phase,
        },
        source => DeserializeError::Transform {
            id,
            property,
            phase,
            source,
        },
    }
}
