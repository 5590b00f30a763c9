use core::fmt;

/// The tag of a [`Variant`](crate::Variant).
///
/// Used to describe what a value *is* without carrying its payload,
/// mostly for error messages when a decoded value does not have the
/// shape a property expects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VariantKind {
    Bool,
    Byte,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Double,
    String,
    Maybe,
    Boxed,
    Array,
    Tuple,
    Dict,
    ByteString,
}

impl VariantKind {
    /// Returns a short lowercase name, e.g. `"uint64"`.
    pub const fn name(self) -> &'static str {
        match self {
            VariantKind::Bool => "bool",
            VariantKind::Byte => "byte",
            VariantKind::Int32 => "int32",
            VariantKind::UInt32 => "uint32",
            VariantKind::Int64 => "int64",
            VariantKind::UInt64 => "uint64",
            VariantKind::Double => "double",
            VariantKind::String => "string",
            VariantKind::Maybe => "maybe",
            VariantKind::Boxed => "variant",
            VariantKind::Array => "array",
            VariantKind::Tuple => "tuple",
            VariantKind::Dict => "dict",
            VariantKind::ByteString => "bytestring",
        }
    }

    /// Returns `true` for the fixed-size scalar kinds.
    pub const fn is_basic(self) -> bool {
        matches!(
            self,
            VariantKind::Bool
                | VariantKind::Byte
                | VariantKind::Int32
                | VariantKind::UInt32
                | VariantKind::Int64
                | VariantKind::UInt64
                | VariantKind::Double
        )
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
