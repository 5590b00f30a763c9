//! Property transforms: how one property value is encoded into a
//! [`Variant`] and decoded back.
//!
//! Resolution for a property, first match wins, independently for each
//! direction:
//!
//! 1. an override registered for the exact `(owner, property)` pair;
//! 2. the built-in transform of the declared [`ValueKind`];
//! 3. the named table of known boxed types (`GStrv`, `GBytes`, plus
//!    anything added with [`TransformRegistry::register_boxed`]);
//! 4. nothing, the caller skips the property.

use alloc::borrow::ToOwned;
use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use core::fmt;

use gvs_object::{ObjectRef, PropertyInfo, TypeRegistry, Value, ValueKind};
use gvs_utils::hash::HashMap;
use gvs_variant::{Variant, VariantKind};

use crate::TransformError;

// -----------------------------------------------------------------------------
// Entity callbacks

/// Gives serialize transforms access to the entity walker.
pub trait EntityEncoder {
    /// Returns the id of `entity`, assigning the next free one and
    /// scheduling the entity on first encounter.
    fn entity_ref(&mut self, entity: &ObjectRef) -> Result<u64, TransformError>;

    fn types(&self) -> &TypeRegistry;
}

/// Gives deserialize transforms access to the entity table.
pub trait EntityDecoder {
    /// Returns the object allocated for `id`.
    fn entity(&mut self, id: u64) -> Result<ObjectRef, TransformError>;

    fn types(&self) -> &TypeRegistry;
}

pub type SerializeFn = Arc<
    dyn Fn(&mut dyn EntityEncoder, &PropertyInfo, &Value) -> Result<Variant, TransformError>
        + Send
        + Sync,
>;

pub type DeserializeFn = Arc<
    dyn Fn(&mut dyn EntityDecoder, &PropertyInfo, &Variant) -> Result<Value, TransformError>
        + Send
        + Sync,
>;

type ReleaseFn = Box<dyn FnOnce() + Send + Sync>;

// -----------------------------------------------------------------------------
// Transform

/// A resolved serialize/deserialize pair.
#[derive(Clone)]
pub struct Transform {
    pub serialize: SerializeFn,
    pub deserialize: DeserializeFn,
}

impl Transform {
    fn new<S, D>(serialize: S, deserialize: D) -> Self
    where
        S: Fn(&mut dyn EntityEncoder, &PropertyInfo, &Value) -> Result<Variant, TransformError>
            + Send
            + Sync
            + 'static,
        D: Fn(&mut dyn EntityDecoder, &PropertyInfo, &Variant) -> Result<Value, TransformError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            serialize: Arc::new(serialize),
            deserialize: Arc::new(deserialize),
        }
    }

    /// Returns `true` if both functions are the same allocations.
    pub fn ptr_eq(&self, other: &Transform) -> bool {
        Arc::ptr_eq(&self.serialize, &other.serialize)
            && Arc::ptr_eq(&self.deserialize, &other.deserialize)
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform").finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// PropertyTransform

/// A user supplied transform, either direction optional.
///
/// Closures may capture context. The release hook runs exactly once, when
/// the transform is replaced, removed, or its registry is dropped.
///
/// ```
/// use gvs_serde::{PropertyTransform, TransformError};
/// use gvs_object::Value;
/// use gvs_variant::Variant;
///
/// let upper = PropertyTransform::new()
///     .serialize(|_, _, value| match value {
///         Value::String(s) => Ok(Variant::maybe_string(s.as_deref().map(str::to_uppercase).as_deref())),
///         _ => Err(TransformError::Custom("not a string".into())),
///     })
///     .on_release(|| println!("released"));
/// # drop(upper);
/// ```
#[derive(Default)]
pub struct PropertyTransform {
    serialize: Option<SerializeFn>,
    deserialize: Option<DeserializeFn>,
    on_release: Option<ReleaseFn>,
}

impl PropertyTransform {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serialize<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut dyn EntityEncoder, &PropertyInfo, &Value) -> Result<Variant, TransformError>
            + Send
            + Sync
            + 'static,
    {
        self.serialize = Some(Arc::new(f));
        self
    }

    pub fn deserialize<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut dyn EntityDecoder, &PropertyInfo, &Variant) -> Result<Value, TransformError>
            + Send
            + Sync
            + 'static,
    {
        self.deserialize = Some(Arc::new(f));
        self
    }

    /// Sets the hook that releases the captured context.
    pub fn on_release<F>(mut self, f: F) -> Self
    where
        F: FnOnce() + Send + Sync + 'static,
    {
        self.on_release = Some(Box::new(f));
        self
    }
}

impl Drop for PropertyTransform {
    fn drop(&mut self) {
        if let Some(release) = self.on_release.take() {
            release();
        }
    }
}

impl fmt::Debug for PropertyTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyTransform")
            .field("serialize", &self.serialize.is_some())
            .field("deserialize", &self.deserialize.is_some())
            .field("on_release", &self.on_release.is_some())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// TransformRegistry

/// Maps properties to their transforms.
pub struct TransformRegistry {
    overrides: HashMap<(&'static str, &'static str), PropertyTransform>,
    boxed: HashMap<String, PropertyTransform>,
    scalar: Transform,
    enumeration: Transform,
    flags: Transform,
    object: Transform,
    boxed_ref: Transform,
}

impl Default for TransformRegistry {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TransformRegistry {
    /// Built-in transforms plus the named boxed table.
    pub fn new() -> Self {
        let mut registry = Self {
            overrides: gvs_utils::hash::new_map(),
            boxed: gvs_utils::hash::new_map(),
            scalar: Transform::new(|_, p, v| serialize_scalar(p.kind(), v), |_, p, v| {
                deserialize_scalar(p.kind(), v)
            }),
            enumeration: Transform::new(serialize_enum, deserialize_enum),
            flags: Transform::new(serialize_flags, deserialize_flags),
            object: Transform::new(serialize_ref, |dec, _, v| {
                deserialize_ref(dec, v).map(Value::Object)
            }),
            boxed_ref: Transform::new(serialize_ref, |dec, _, v| {
                deserialize_ref(dec, v).map(Value::Boxed)
            }),
        };
        registry.register_boxed(
            "GStrv",
            PropertyTransform::new()
                .serialize(serialize_strv)
                .deserialize(deserialize_strv),
        );
        registry.register_boxed(
            "GBytes",
            PropertyTransform::new()
                .serialize(serialize_bytes)
                .deserialize(deserialize_bytes),
        );
        registry
    }

    /// Registers an override for the property `property` declared by
    /// `owner`. A replaced override is released.
    pub fn register_override(
        &mut self,
        owner: &'static str,
        property: &'static str,
        transform: PropertyTransform,
    ) {
        self.overrides.insert((owner, property), transform);
    }

    /// Removes and releases an override. Returns `false` if none existed.
    pub fn remove_override(&mut self, owner: &'static str, property: &'static str) -> bool {
        self.overrides.remove(&(owner, property)).is_some()
    }

    /// Registers the transform for a boxed type by name, replacing (and
    /// releasing) a previous entry.
    pub fn register_boxed(&mut self, name: &str, transform: PropertyTransform) {
        self.boxed.insert(name.to_owned(), transform);
    }

    /// The built-in transform of a category.
    ///
    /// A boxed category only has one when `name` is a registered boxed
    /// class; its instances are then referenced as entities.
    fn builtin(&self, kind: ValueKind, types: &TypeRegistry) -> Option<&Transform> {
        match kind {
            ValueKind::Pointer => None,
            ValueKind::Enum(_) => Some(&self.enumeration),
            ValueKind::Flags(_) => Some(&self.flags),
            ValueKind::Object(_) | ValueKind::Interface(_) => Some(&self.object),
            ValueKind::Boxed(name) => match types.get(name) {
                Some(class) if class.is_boxed() => Some(&self.boxed_ref),
                _ => None,
            },
            _ => Some(&self.scalar),
        }
    }

    fn fallback(&self, kind: ValueKind) -> Option<&PropertyTransform> {
        match kind {
            ValueKind::Boxed(name) => self.boxed.get(name),
            _ => None,
        }
    }

    fn explicit(&self, property: &PropertyInfo) -> Option<&PropertyTransform> {
        self.overrides.get(&(property.owner(), property.name()))
    }

    pub fn resolve_serialize(&self, property: &PropertyInfo, types: &TypeRegistry) -> Option<SerializeFn> {
        let kind = property.kind();
        self.explicit(property)
            .and_then(|t| t.serialize.clone())
            .or_else(|| self.builtin(kind, types).map(|t| t.serialize.clone()))
            .or_else(|| self.fallback(kind).and_then(|t| t.serialize.clone()))
    }

    pub fn resolve_deserialize(
        &self,
        property: &PropertyInfo,
        types: &TypeRegistry,
    ) -> Option<DeserializeFn> {
        let kind = property.kind();
        self.explicit(property)
            .and_then(|t| t.deserialize.clone())
            .or_else(|| self.builtin(kind, types).map(|t| t.deserialize.clone()))
            .or_else(|| self.fallback(kind).and_then(|t| t.deserialize.clone()))
    }

    /// Resolves both directions. `None` if either one is missing.
    ///
    /// Repeated calls return the same functions.
    pub fn resolve(&self, property: &PropertyInfo, types: &TypeRegistry) -> Option<Transform> {
        Some(Transform {
            serialize: self.resolve_serialize(property, types)?,
            deserialize: self.resolve_deserialize(property, types)?,
        })
    }
}

impl fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformRegistry")
            .field("overrides", &self.overrides.keys())
            .field("boxed", &self.boxed.keys())
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Built-in transforms

fn value_mismatch(kind: ValueKind, value: &Value) -> TransformError {
    TransformError::ValueMismatch {
        expected: kind,
        found: value.name(),
    }
}

fn kind_mismatch(expected: VariantKind, found: &Variant) -> TransformError {
    TransformError::KindMismatch {
        expected,
        found: found.kind(),
    }
}

fn serialize_scalar(kind: ValueKind, value: &Value) -> Result<Variant, TransformError> {
    Ok(match (kind, value) {
        (ValueKind::Bool, Value::Bool(v)) => Variant::Bool(*v),
        (ValueKind::Char, Value::Char(v)) => Variant::Byte(v.cast_unsigned()),
        (ValueKind::UChar, Value::UChar(v)) => Variant::Byte(*v),
        (ValueKind::Int, Value::Int(v)) => Variant::Int32(*v),
        (ValueKind::UInt, Value::UInt(v)) => Variant::UInt32(*v),
        (ValueKind::Long, Value::Long(v)) | (ValueKind::Int64, Value::Int64(v)) => Variant::Int64(*v),
        (ValueKind::ULong, Value::ULong(v)) | (ValueKind::UInt64, Value::UInt64(v)) => {
            Variant::UInt64(*v)
        }
        (ValueKind::Float, Value::Float(v)) => Variant::Double(f64::from(*v)),
        (ValueKind::Double, Value::Double(v)) => Variant::Double(*v),
        (ValueKind::String, Value::String(v)) => Variant::maybe_string(v.as_deref()),
        (ValueKind::Variant, Value::Variant(v)) => Variant::boxed(v.clone()),
        _ => return Err(value_mismatch(kind, value)),
    })
}

fn deserialize_scalar(kind: ValueKind, variant: &Variant) -> Result<Value, TransformError> {
    let value = match kind {
        ValueKind::Bool => variant.as_bool().map(Value::Bool),
        ValueKind::Char => variant.as_byte().map(|b| Value::Char(b.cast_signed())),
        ValueKind::UChar => variant.as_byte().map(Value::UChar),
        ValueKind::Int => variant.as_i32().map(Value::Int),
        ValueKind::UInt => variant.as_u32().map(Value::UInt),
        ValueKind::Long => variant.as_i64().map(Value::Long),
        ValueKind::Int64 => variant.as_i64().map(Value::Int64),
        ValueKind::ULong => variant.as_u64().map(Value::ULong),
        ValueKind::UInt64 => variant.as_u64().map(Value::UInt64),
        ValueKind::Float => variant.as_f64().map(|v| Value::Float(v as f32)),
        ValueKind::Double => variant.as_f64().map(Value::Double),
        ValueKind::String => variant
            .as_maybe_str()
            .map(|s| Value::String(s.map(ToOwned::to_owned))),
        ValueKind::Variant => variant.as_boxed().map(|v| Value::Variant(v.clone())),
        _ => return Err(TransformError::Unsupported(kind)),
    };
    value.ok_or_else(|| kind_mismatch(wire_kind(kind), variant))
}

/// The form a scalar category takes on the wire.
fn wire_kind(kind: ValueKind) -> VariantKind {
    match kind {
        ValueKind::Bool => VariantKind::Bool,
        ValueKind::Char | ValueKind::UChar => VariantKind::Byte,
        ValueKind::Int | ValueKind::Enum(_) => VariantKind::Int32,
        ValueKind::UInt | ValueKind::Flags(_) => VariantKind::UInt32,
        ValueKind::Long | ValueKind::Int64 => VariantKind::Int64,
        ValueKind::ULong | ValueKind::UInt64 => VariantKind::UInt64,
        ValueKind::Float | ValueKind::Double => VariantKind::Double,
        ValueKind::Variant => VariantKind::Boxed,
        _ => VariantKind::Maybe,
    }
}

fn serialize_enum(
    _: &mut dyn EntityEncoder,
    property: &PropertyInfo,
    value: &Value,
) -> Result<Variant, TransformError> {
    match value {
        Value::Enum(v) => Ok(Variant::Int32(*v)),
        _ => Err(value_mismatch(property.kind(), value)),
    }
}

fn deserialize_enum(
    _: &mut dyn EntityDecoder,
    _: &PropertyInfo,
    variant: &Variant,
) -> Result<Value, TransformError> {
    variant
        .as_i32()
        .map(Value::Enum)
        .ok_or_else(|| kind_mismatch(VariantKind::Int32, variant))
}

fn serialize_flags(
    _: &mut dyn EntityEncoder,
    property: &PropertyInfo,
    value: &Value,
) -> Result<Variant, TransformError> {
    match value {
        Value::Flags(v) => Ok(Variant::UInt32(*v)),
        _ => Err(value_mismatch(property.kind(), value)),
    }
}

fn deserialize_flags(
    _: &mut dyn EntityDecoder,
    _: &PropertyInfo,
    variant: &Variant,
) -> Result<Value, TransformError> {
    variant
        .as_u32()
        .map(Value::Flags)
        .ok_or_else(|| kind_mismatch(VariantKind::UInt32, variant))
}

/// Object and boxed references travel as a nullable entity id.
fn serialize_ref(
    encoder: &mut dyn EntityEncoder,
    property: &PropertyInfo,
    value: &Value,
) -> Result<Variant, TransformError> {
    match value {
        Value::Object(entity) | Value::Boxed(entity) => match entity {
            Some(entity) => {
                let id = encoder.entity_ref(entity)?;
                Ok(Variant::maybe(Some(Variant::UInt64(id))))
            }
            None => Ok(Variant::nothing()),
        },
        _ => Err(value_mismatch(property.kind(), value)),
    }
}

fn deserialize_ref(
    decoder: &mut dyn EntityDecoder,
    variant: &Variant,
) -> Result<Option<ObjectRef>, TransformError> {
    match variant.as_maybe() {
        Some(Some(inner)) => {
            let id = inner
                .as_u64()
                .ok_or_else(|| kind_mismatch(VariantKind::UInt64, inner))?;
            decoder.entity(id).map(Some)
        }
        Some(None) => Ok(None),
        None => Err(kind_mismatch(VariantKind::Maybe, variant)),
    }
}

fn serialize_strv(
    _: &mut dyn EntityEncoder,
    property: &PropertyInfo,
    value: &Value,
) -> Result<Variant, TransformError> {
    match value {
        Value::Strv(v) => Ok(Variant::strv(v.iter().map(String::as_str))),
        _ => Err(value_mismatch(property.kind(), value)),
    }
}

fn deserialize_strv(
    _: &mut dyn EntityDecoder,
    _: &PropertyInfo,
    variant: &Variant,
) -> Result<Value, TransformError> {
    variant
        .as_strv()
        .map(Value::Strv)
        .ok_or_else(|| kind_mismatch(VariantKind::Array, variant))
}

fn serialize_bytes(
    _: &mut dyn EntityEncoder,
    property: &PropertyInfo,
    value: &Value,
) -> Result<Variant, TransformError> {
    match value {
        Value::Bytes(v) => Ok(Variant::ByteString(v.clone())),
        _ => Err(value_mismatch(property.kind(), value)),
    }
}

fn deserialize_bytes(
    _: &mut dyn EntityDecoder,
    _: &PropertyInfo,
    variant: &Variant,
) -> Result<Value, TransformError> {
    variant
        .as_bytes()
        .map(|b| Value::Bytes(b.to_vec()))
        .ok_or_else(|| kind_mismatch(VariantKind::ByteString, variant))
}

// -----------------------------------------------------------------------------
// Tests
