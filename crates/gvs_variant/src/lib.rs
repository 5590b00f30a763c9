//! A self-describing value container.
//!
//! [`Variant`] is a tagged value tree: scalars, nullable wrappers,
//! homogeneous arrays, heterogeneous tuples, string-keyed dictionaries
//! and raw byte strings. Every value carries its own [`VariantKind`],
//! equality is structural, and the whole tree round-trips through any
//! `serde` format. RON is used as the textual literal form in tests and
//! fixtures.
//!
//! ```
//! use gvs_variant::{Variant, VariantKind};
//!
//! let name = Variant::maybe_string(Some("root"));
//! assert_eq!(name.kind(), VariantKind::Maybe);
//! assert_eq!(name.as_maybe_str(), Some(Some("root")));
//!
//! let nothing = Variant::maybe_string(None);
//! assert_eq!(nothing.as_maybe_str(), Some(None));
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod kind;
mod variant;

// -----------------------------------------------------------------------------
// Exports

pub use kind::VariantKind;
pub use variant::Variant;
