use alloc::borrow::ToOwned;
use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::VariantKind;

// -----------------------------------------------------------------------------
// Variant

/// A self-describing value.
///
/// Exactly one form is active per value. The form is chosen by whoever
/// builds the value, a reader never has to guess it from the payload.
///
/// - `Maybe` is a nullable wrapper: `Maybe(None)` is "no value", which is
///   different from any present value (an empty string included).
/// - `Boxed` wraps an arbitrary value, it is used to pass opaque values
///   through unchanged.
/// - `Dict` keys are ordered, so two dictionaries with the same entries
///   compare equal regardless of insertion order.
///
/// # Examples
///
/// ```
/// use gvs_variant::Variant;
///
/// let reference = Variant::maybe(Some(Variant::UInt64(1)));
/// let inner = reference.as_maybe().unwrap().unwrap();
///
/// assert_eq!(inner.as_u64(), Some(1));
/// assert_eq!(Variant::nothing().as_maybe(), Some(None));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Variant {
    Bool(bool),
    Byte(u8),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Double(f64),
    String(String),
    Maybe(Option<Box<Variant>>),
    Boxed(Box<Variant>),
    Array(Vec<Variant>),
    Tuple(Vec<Variant>),
    Dict(BTreeMap<String, Variant>),
    ByteString(Vec<u8>),
}

impl Default for Variant {
    /// The unit value, an empty tuple.
    #[inline]
    fn default() -> Self {
        Self::unit()
    }
}

impl Variant {
    /// The empty tuple.
    #[inline]
    pub const fn unit() -> Self {
        Variant::Tuple(Vec::new())
    }

    /// An absent nullable value.
    #[inline]
    pub const fn nothing() -> Self {
        Variant::Maybe(None)
    }

    /// Wraps an optional value into `Maybe`.
    #[inline]
    pub fn maybe(value: Option<Variant>) -> Self {
        Variant::Maybe(value.map(Box::new))
    }

    /// A nullable string.
    #[inline]
    pub fn maybe_string(value: Option<&str>) -> Self {
        Self::maybe(value.map(|s| Variant::String(s.to_owned())))
    }

    /// Wraps a value into `Boxed`.
    #[inline]
    pub fn boxed(value: Variant) -> Self {
        Variant::Boxed(Box::new(value))
    }

    /// An array of strings.
    pub fn strv<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Variant::Array(items.into_iter().map(|s| Variant::String(s.into())).collect())
    }

    /// Returns the tag of the active form.
    pub const fn kind(&self) -> VariantKind {
        match self {
            Variant::Bool(_) => VariantKind::Bool,
            Variant::Byte(_) => VariantKind::Byte,
            Variant::Int32(_) => VariantKind::Int32,
            Variant::UInt32(_) => VariantKind::UInt32,
            Variant::Int64(_) => VariantKind::Int64,
            Variant::UInt64(_) => VariantKind::UInt64,
            Variant::Double(_) => VariantKind::Double,
            Variant::String(_) => VariantKind::String,
            Variant::Maybe(_) => VariantKind::Maybe,
            Variant::Boxed(_) => VariantKind::Boxed,
            Variant::Array(_) => VariantKind::Array,
            Variant::Tuple(_) => VariantKind::Tuple,
            Variant::Dict(_) => VariantKind::Dict,
            Variant::ByteString(_) => VariantKind::ByteString,
        }
    }

    #[inline]
    pub const fn is_kind(&self, kind: VariantKind) -> bool {
        self.kind() as u8 == kind as u8
    }

    #[inline]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Variant::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_byte(&self) -> Option<u8> {
        match self {
            Variant::Byte(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_i32(&self) -> Option<i32> {
        match self {
            Variant::Int32(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_u32(&self) -> Option<u32> {
        match self {
            Variant::UInt32(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Variant::Int64(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_u64(&self) -> Option<u64> {
        match self {
            Variant::UInt64(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Variant::Double(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Variant::String(v) => Some(v),
            _ => None,
        }
    }

    /// Returns `Some(inner)` for a `Maybe`, where `inner` is `None` for "no value".
    #[inline]
    pub fn as_maybe(&self) -> Option<Option<&Variant>> {
        match self {
            Variant::Maybe(v) => Some(v.as_deref()),
            _ => None,
        }
    }

    /// Reads a nullable string, the form produced by [`Variant::maybe_string`].
    pub fn as_maybe_str(&self) -> Option<Option<&str>> {
        match self.as_maybe()? {
            Some(inner) => inner.as_str().map(Some),
            None => Some(None),
        }
    }

    #[inline]
    pub fn as_boxed(&self) -> Option<&Variant> {
        match self {
            Variant::Boxed(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_array(&self) -> Option<&[Variant]> {
        match self {
            Variant::Array(v) => Some(v),
            _ => None,
        }
    }

    /// Reads an array of strings, the form produced by [`Variant::strv`].
    pub fn as_strv(&self) -> Option<Vec<String>> {
        self.as_array()?
            .iter()
            .map(|item| item.as_str().map(ToOwned::to_owned))
            .collect()
    }

    #[inline]
    pub fn as_tuple(&self) -> Option<&[Variant]> {
        match self {
            Variant::Tuple(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_dict(&self) -> Option<&BTreeMap<String, Variant>> {
        match self {
            Variant::Dict(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Variant::ByteString(v) => Some(v),
            _ => None,
        }
    }

    /// Looks up `key` in a `Dict`.
    ///
    /// Returns `None` if the key is missing or `self` is not a dictionary.
    pub fn lookup(&self, key: &str) -> Option<&Variant> {
        self.as_dict()?.get(key)
    }

    /// Number of children of a container value, `0` for scalars.
    ///
    /// A `Maybe` has one child when present, a `Boxed` always has one.
    pub fn n_children(&self) -> usize {
        match self {
            Variant::Maybe(v) => v.is_some() as usize,
            Variant::Boxed(_) => 1,
            Variant::Array(v) | Variant::Tuple(v) => v.len(),
            Variant::Dict(v) => v.len(),
            Variant::ByteString(v) => v.len(),
            _ => 0,
        }
    }
}

// -----------------------------------------------------------------------------
// From impls

macro_rules! impl_from {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for Variant {
            #[inline]
            fn from(value: $ty) -> Self {
                Variant::$variant(value)
            }
        }
    };
}

impl_from!(bool, Bool);
impl_from!(u8, Byte);
impl_from!(i32, Int32);
impl_from!(u32, UInt32);
impl_from!(i64, Int64);
impl_from!(u64, UInt64);
impl_from!(f64, Double);
impl_from!(String, String);
impl_from!(Vec<u8>, ByteString);

impl From<&str> for Variant {
    #[inline]
    fn from(value: &str) -> Self {
        Variant::String(value.to_owned())
    }
}

impl From<BTreeMap<String, Variant>> for Variant {
    #[inline]
    fn from(value: BTreeMap<String, Variant>) -> Self {
        Variant::Dict(value)
    }
}

// -----------------------------------------------------------------------------
// Tests
