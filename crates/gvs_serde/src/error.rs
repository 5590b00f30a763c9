use alloc::string::String;
use core::fmt;

use gvs_object::{ConstructError, PropertyError, ValueKind};
use gvs_variant::VariantKind;
use thiserror::Error;

// -----------------------------------------------------------------------------
// Phase

/// Progress of a deserialization.
///
/// The two passes are linear, a phase is never revisited.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    #[default]
    Unstarted,
    /// Magic and protocol version accepted.
    HeaderValidated,
    /// Every record has a constructed object.
    EntitiesAllocated,
    /// Every remaining property has been set.
    PropertiesResolved,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Unstarted => "unstarted",
            Phase::HeaderValidated => "header validated",
            Phase::EntitiesAllocated => "entities allocated",
            Phase::PropertiesResolved => "properties resolved",
            Phase::Done => "done",
        })
    }
}

// -----------------------------------------------------------------------------
// Error

/// Failure of a single transform.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum TransformError {
    /// The encoded value has the wrong form for the property category.
    #[error("expected a {expected} value, found {found}")]
    KindMismatch {
        expected: VariantKind,
        found: VariantKind,
    },

    /// The property value has the wrong form for its declared category.
    #[error("property declared as {expected} holds a {found} value")]
    ValueMismatch {
        expected: ValueKind,
        found: &'static str,
    },

    #[error("no transform for {0}")]
    Unsupported(ValueKind),

    #[error("referenced type `{0}` is not registered")]
    UnregisteredType(String),

    /// A reference to an id outside the document.
    #[error("reference to missing entity {0}")]
    Reference(u64),

    /// A referenced entity is not constructed yet. Pass 1 builds it and
    /// retries, or reports the cycle it closes.
    #[error("referenced entity {0} is not constructed yet")]
    Entity(u64),

    #[error("{0}")]
    Custom(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum SerializeError {
    #[error("type `{type_name}` of the root object is not registered")]
    UnregisteredType { type_name: &'static str },
}

/// A fatal deserialization error.
///
/// No partially built graph is ever returned, see [`phase`](Self::phase)
/// for how far the input got.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum DeserializeError {
    #[error("bad magic {found:#010x}")]
    BadMagic { found: u32 },

    #[error("unsupported protocol version {0}")]
    UnsupportedVersion(u16),

    #[error("document has no entities")]
    Empty,

    #[error("entity {id}: type `{type_name}` is not registered")]
    UnknownType { id: u64, type_name: String },

    #[error("entity {id}: construction failed: {source}")]
    Construct {
        id: u64,
        #[source]
        source: ConstructError,
    },

    #[error("entity {id}: construction-only references form a cycle")]
    ConstructionCycle { id: u64 },

    #[error("entity {id}: reference to entity {target} outside of {len} entities")]
    DanglingReference {
        id: u64,
        target: u64,
        len: usize,
        phase: Phase,
    },

    #[error("entity {id}: type `{type_name}` has no property `{property}`")]
    UnknownProperty {
        id: u64,
        type_name: String,
        property: String,
    },

    #[error("entity {id}: property `{property}`: {source}")]
    Transform {
        id: u64,
        property: &'static str,
        phase: Phase,
        #[source]
        source: TransformError,
    },

    #[error("entity {id}: {source}")]
    Property {
        id: u64,
        #[source]
        source: PropertyError,
    },
}

impl DeserializeError {
    /// The phase in which the error occurred.
    pub const fn phase(&self) -> Phase {
        match self {
            DeserializeError::BadMagic { .. } | DeserializeError::UnsupportedVersion(_) => {
                Phase::Unstarted
            }
            DeserializeError::Empty
            | DeserializeError::UnknownType { .. }
            | DeserializeError::Construct { .. }
            | DeserializeError::ConstructionCycle { .. } => Phase::HeaderValidated,
            DeserializeError::DanglingReference { phase, .. }
            | DeserializeError::Transform { phase, .. } => *phase,
            DeserializeError::UnknownProperty { .. } | DeserializeError::Property { .. } => {
                Phase::EntitiesAllocated
            }
        }
    }
}

// -----------------------------------------------------------------------------
// Diagnostic

/// Why a property was left out.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum DiagnosticKind {
    /// No transform is known for the category.
    NoTransform(ValueKind),
    /// The transform refused the value.
    Transform(TransformError),
    /// The getter failed.
    Property(PropertyError),
}

/// A property skipped by a serialize or deserialize call that otherwise
/// succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub id: u64,
    pub type_name: &'static str,
    pub property: &'static str,
    pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity {} `{}::{}` skipped: ", self.id, self.type_name, self.property)?;
        match &self.kind {
            DiagnosticKind::NoTransform(kind) => write!(f, "no transform for {kind}"),
            DiagnosticKind::Transform(err) => write!(f, "{err}"),
            DiagnosticKind::Property(err) => write!(f, "{err}"),
        }
    }
}
