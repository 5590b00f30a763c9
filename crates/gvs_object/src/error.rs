use alloc::string::String;

use thiserror::Error;

use crate::ValueKind;

// -----------------------------------------------------------------------------
// Error

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum PropertyError {
    #[error("type `{type_name}` has no property `{property}`")]
    NotFound { type_name: String, property: String },

    #[error("property `{type_name}::{property}` is not readable")]
    NotReadable {
        type_name: &'static str,
        property: &'static str,
    },

    #[error("property `{type_name}::{property}` is not writable")]
    NotWritable {
        type_name: &'static str,
        property: &'static str,
    },

    #[error("property `{type_name}::{property}` can only be set at construction")]
    ConstructOnly {
        type_name: &'static str,
        property: &'static str,
    },

    #[error("property `{property}` expects {expected}, found {found}")]
    TypeMismatch {
        property: &'static str,
        expected: ValueKind,
        found: &'static str,
    },

    #[error("property `{property}` expects an instance of `{expected}`, found `{found}`")]
    NotA {
        property: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("accessor of `{expected}` called on `{found}`")]
    WrongObject {
        expected: &'static str,
        found: &'static str,
    },

    #[error("type `{0}` is not registered")]
    UnregisteredType(String),

    #[error("{0}")]
    Custom(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ConstructError {
    #[error("type `{0}` is not registered")]
    UnregisteredType(String),

    #[error("type `{0}` has no constructor")]
    NotConstructible(&'static str),

    #[error("missing construction property `{0}`")]
    MissingProperty(&'static str),

    #[error("type `{type_name}` has no property `{property}`")]
    UnknownProperty {
        type_name: &'static str,
        property: &'static str,
    },

    #[error("construction property `{property}` got an unexpected {found} value")]
    InvalidValue {
        property: &'static str,
        found: &'static str,
    },

    #[error(transparent)]
    Property(#[from] PropertyError),

    #[error("{0}")]
    Custom(String),
}
