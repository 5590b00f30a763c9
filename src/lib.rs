#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use gvs_object as object;
pub use gvs_serde as serde;
pub use gvs_utils as utils;
pub use gvs_variant as variant;

pub use gvs_object::{ObjectRef, ObjectType, TypeRegistry};
pub use gvs_serde::{Document, deserialize, serialize};
