//! Statically registered reflection for property-bearing objects.
//!
//! A class describes itself once through [`ClassBuilder`]: its name,
//! parent, typed properties with access [`ParamFlags`], and constructor.
//! The [`TypeRegistry`] then resolves classes by name and reads, writes and
//! constructs objects through the erased [`ObjectRef`] handle.
//!
//! Property values are exchanged as [`Value`], tagged by the declared
//! [`ValueKind`] of the property.
//!
//! ## Features
//!
//! - `std` (default): enables [`TypeRegistryArc`].
//! - `auto_register` (default): [`auto_register!`] and
//!   [`TypeRegistry::auto_register`], based on the `inventory` crate.
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod class;
mod error;
mod flags;
mod object;
mod property;
mod registry;
mod value;

#[doc(hidden)]
pub mod __macro_exports;

// -----------------------------------------------------------------------------
// Exports

pub use class::{ClassBuilder, ClassInfo, ClassKind, ConstructParams};
pub use error::{ConstructError, PropertyError};
pub use flags::ParamFlags;
pub use object::{Object, ObjectRef, ObjectType, WeakObjectRef};
pub use property::{Property, PropertyInfo};
pub use registry::TypeRegistry;
pub use value::{FromValue, Value, ValueKind};

#[cfg(feature = "std")]
pub use registry::TypeRegistryArc;
