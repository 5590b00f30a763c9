use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use gvs_variant::Variant;

use crate::ObjectRef;

// -----------------------------------------------------------------------------
// ValueKind

/// The declared value category of a property.
///
/// The category, never the runtime content, decides how a property is
/// encoded. The named categories carry the name of the enum, flags,
/// class, interface or boxed type they refer to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    /// A signed byte.
    Char,
    /// An unsigned byte.
    UChar,
    Int,
    UInt,
    Long,
    ULong,
    Int64,
    UInt64,
    Float,
    Double,
    /// A nullable string.
    String,
    /// An opaque [`Variant`], passed through unchanged.
    Variant,
    /// A raw address. There is no portable encoding for it.
    Pointer,
    Enum(&'static str),
    Flags(&'static str),
    Object(&'static str),
    Interface(&'static str),
    Boxed(&'static str),
}

impl ValueKind {
    /// The root of all object classes, accepted by [`ValueKind::Object`]
    /// as "any object".
    pub const ANY_OBJECT: &'static str = "Object";

    /// Returns `true` for the scalar categories that are not named types.
    pub const fn is_fundamental(&self) -> bool {
        !matches!(
            self,
            ValueKind::Enum(_)
                | ValueKind::Flags(_)
                | ValueKind::Object(_)
                | ValueKind::Interface(_)
                | ValueKind::Boxed(_)
        )
    }

    /// Returns the referenced type name of a named category.
    pub const fn type_name(&self) -> Option<&'static str> {
        match self {
            ValueKind::Enum(name)
            | ValueKind::Flags(name)
            | ValueKind::Object(name)
            | ValueKind::Interface(name)
            | ValueKind::Boxed(name) => Some(name),
            _ => None,
        }
    }

    /// A short lowercase name of the category.
    pub const fn name(&self) -> &'static str {
        match self {
            ValueKind::Bool => "bool",
            ValueKind::Char => "char",
            ValueKind::UChar => "uchar",
            ValueKind::Int => "int",
            ValueKind::UInt => "uint",
            ValueKind::Long => "long",
            ValueKind::ULong => "ulong",
            ValueKind::Int64 => "int64",
            ValueKind::UInt64 => "uint64",
            ValueKind::Float => "float",
            ValueKind::Double => "double",
            ValueKind::String => "string",
            ValueKind::Variant => "variant",
            ValueKind::Pointer => "pointer",
            ValueKind::Enum(_) => "enum",
            ValueKind::Flags(_) => "flags",
            ValueKind::Object(_) => "object",
            ValueKind::Interface(_) => "interface",
            ValueKind::Boxed(_) => "boxed",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.type_name() {
            Some(name) => write!(f, "{} `{}`", self.name(), name),
            None => f.write_str(self.name()),
        }
    }
}

// -----------------------------------------------------------------------------
// Value

/// A property value, tagged with its category.
///
/// Objects and boxed entities are held by [`ObjectRef`]; equality on them
/// is identity.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    Char(i8),
    UChar(u8),
    Int(i32),
    UInt(u32),
    Long(i64),
    ULong(u64),
    Int64(i64),
    UInt64(u64),
    Float(f32),
    Double(f64),
    String(Option<String>),
    Variant(Variant),
    Pointer(usize),
    Enum(i32),
    Flags(u32),
    Object(Option<ObjectRef>),
    Boxed(Option<ObjectRef>),
    Strv(Vec<String>),
    Bytes(Vec<u8>),
}

impl Value {
    /// A short name of the active form, for error messages.
    pub const fn name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::UChar(_) => "uchar",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Long(_) => "long",
            Value::ULong(_) => "ulong",
            Value::Int64(_) => "int64",
            Value::UInt64(_) => "uint64",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Variant(_) => "variant",
            Value::Pointer(_) => "pointer",
            Value::Enum(_) => "enum",
            Value::Flags(_) => "flags",
            Value::Object(_) => "object",
            Value::Boxed(_) => "boxed",
            Value::Strv(_) => "strv",
            Value::Bytes(_) => "bytes",
        }
    }

    /// Whether this value may be stored in a property of category `kind`.
    ///
    /// Named categories only check the form here, class membership of
    /// object references is checked by the registry.
    pub fn conforms_to(&self, kind: &ValueKind) -> bool {
        matches!(
            (self, kind),
            (Value::Bool(_), ValueKind::Bool)
                | (Value::Char(_), ValueKind::Char)
                | (Value::UChar(_), ValueKind::UChar)
                | (Value::Int(_), ValueKind::Int)
                | (Value::UInt(_), ValueKind::UInt)
                | (Value::Long(_), ValueKind::Long)
                | (Value::ULong(_), ValueKind::ULong)
                | (Value::Int64(_), ValueKind::Int64)
                | (Value::UInt64(_), ValueKind::UInt64)
                | (Value::Float(_), ValueKind::Float)
                | (Value::Double(_), ValueKind::Double)
                | (Value::String(_), ValueKind::String)
                | (Value::Variant(_), ValueKind::Variant)
                | (Value::Pointer(_), ValueKind::Pointer)
                | (Value::Enum(_), ValueKind::Enum(_))
                | (Value::Flags(_), ValueKind::Flags(_))
                | (Value::Object(_), ValueKind::Object(_) | ValueKind::Interface(_))
                | (Value::Boxed(_) | Value::Strv(_) | Value::Bytes(_), ValueKind::Boxed(_))
        )
    }

    /// The referenced entity of an object or boxed value, if any.
    #[inline]
    pub fn as_entity(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(v) | Value::Boxed(v) => v.as_ref(),
            _ => None,
        }
    }

    /// Converts into a typed value, see [`FromValue`].
    #[inline]
    pub fn get<T: FromValue>(self) -> Option<T> {
        T::from_value(self)
    }
}

// -----------------------------------------------------------------------------
// FromValue

/// Conversion from a [`Value`] into a plain Rust type.
///
/// Integer types accept every form of matching width and signedness,
/// e.g. `i64` accepts both `Long` and `Int64`, `i32` accepts `Enum`.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! impl_from_value {
    ($ty:ty => $($variant:ident)|+) => {
        impl FromValue for $ty {
            #[inline]
            fn from_value(value: Value) -> Option<Self> {
                match value {
                    $(Value::$variant(v) => Some(v),)+
                    _ => None,
                }
            }
        }
    };
}

impl_from_value!(bool => Bool);
impl_from_value!(i8 => Char);
impl_from_value!(u8 => UChar);
impl_from_value!(i32 => Int | Enum);
impl_from_value!(u32 => UInt | Flags);
impl_from_value!(i64 => Long | Int64);
impl_from_value!(u64 => ULong | UInt64);
impl_from_value!(f32 => Float);
impl_from_value!(f64 => Double);
impl_from_value!(usize => Pointer);
impl_from_value!(Option<String> => String);
impl_from_value!(Variant => Variant);
impl_from_value!(Option<ObjectRef> => Object | Boxed);
impl_from_value!(Vec<String> => Strv);
impl_from_value!(Vec<u8> => Bytes);

impl FromValue for Value {
    #[inline]
    fn from_value(value: Value) -> Option<Self> {
        Some(value)
    }
}

// -----------------------------------------------------------------------------
// Tests
