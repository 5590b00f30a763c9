//! Entity-graph serialization.
//!
//! Flattens an arbitrary graph of [`gvs_object`] objects, shared references
//! and cycles included, into a [`Document`]: a header followed by one
//! `(type_name, properties)` record per distinct object. References between
//! objects become entity ids. [`Deserializer`] rebuilds an equivalent graph
//! in two passes, constructing every entity first and linking them after.
//!
//! ```
//! use core::cell::RefCell;
//! use gvs_object::{ClassBuilder, ClassInfo, ObjectRef, ObjectType, ParamFlags};
//! use gvs_object::{Property, TypeRegistry, Value, ValueKind};
//!
//! #[derive(Default)]
//! struct Node {
//!     next: RefCell<Option<ObjectRef>>,
//! }
//!
//! impl ObjectType for Node {
//!     const TYPE_NAME: &'static str = "Node";
//!
//!     fn class_info() -> ClassInfo {
//!         ClassBuilder::<Self>::new()
//!             .property(
//!                 Property::new("next", ValueKind::Object("Node"), ParamFlags::READWRITE)
//!                     .getter(|this: &Self| Value::Object(this.next.borrow().clone()))
//!                     .setter(|this: &Self, v: Option<ObjectRef>| *this.next.borrow_mut() = v),
//!             )
//!             .default_constructor()
//!             .build()
//!     }
//! }
//!
//! let mut types = TypeRegistry::new();
//! types.register::<Node>();
//!
//! // a -> b -> a
//! let a = ObjectRef::new(Node::default());
//! let b = ObjectRef::new(Node::default());
//! *a.downcast_ref::<Node>().unwrap().next.borrow_mut() = Some(b.clone());
//! *b.downcast_ref::<Node>().unwrap().next.borrow_mut() = Some(a.clone());
//!
//! let document = gvs_serde::serialize(&a, &types).unwrap();
//! assert_eq!(document.len(), 2);
//!
//! let root = gvs_serde::deserialize(&document, &types).unwrap();
//! let next = root.downcast_ref::<Node>().unwrap().next.borrow().clone().unwrap();
//! let back = next.downcast_ref::<Node>().unwrap().next.borrow().clone().unwrap();
//! assert_eq!(back, root);
//! # *a.downcast_ref::<Node>().unwrap().next.borrow_mut() = None;
//! # *root.downcast_ref::<Node>().unwrap().next.borrow_mut() = None;
//! ```
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod de;
mod error;
mod ser;
mod wire;

pub mod transform;

#[cfg(test)]
mod fixtures;

// -----------------------------------------------------------------------------
// Exports

pub use de::Deserializer;
pub use error::{DeserializeError, Diagnostic, DiagnosticKind, Phase, SerializeError, TransformError};
pub use ser::Serializer;
pub use transform::{PropertyTransform, Transform, TransformRegistry};
pub use wire::{Document, EntityRecord, MAGIC, PROTOCOL_VERSION};

use gvs_object::{ObjectRef, TypeRegistry};

/// Serializes the graph reachable from `root` with the default transforms.
///
/// Skipped properties are logged, use a [`Serializer`] to inspect them.
pub fn serialize(root: &ObjectRef, types: &TypeRegistry) -> Result<Document, SerializeError> {
    let transforms = TransformRegistry::new();
    Serializer::new(types, &transforms).serialize(root)
}

/// Rebuilds a graph with the default transforms and returns its root.
pub fn deserialize(document: &Document, types: &TypeRegistry) -> Result<ObjectRef, DeserializeError> {
    let transforms = TransformRegistry::new();
    Deserializer::new(types, &transforms).deserialize(document)
}
