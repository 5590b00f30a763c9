use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::marker::PhantomData;

use crate::property::PropertyInfo;
use crate::{ConstructError, FromValue, ObjectRef, ObjectType, Property, Value, ValueKind};

pub(crate) type Constructor =
    Arc<dyn Fn(&mut ConstructParams) -> Result<ObjectRef, ConstructError> + Send + Sync>;

// -----------------------------------------------------------------------------
// ClassKind

/// Whether instances are plain objects or boxed values.
///
/// Both are entities of a graph; the distinction decides which
/// properties may reference them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Object,
    Boxed,
}

// -----------------------------------------------------------------------------
// ConstructParams

/// Property values supplied when an object is created.
///
/// A constructor takes the values it needs; whatever is left is applied
/// through the property setters right after construction.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConstructParams {
    values: Vec<(&'static str, Value)>,
}

impl ConstructParams {
    #[inline]
    pub const fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Adds a value, replacing a previous one with the same name.
    pub fn push(&mut self, name: &'static str, value: Value) {
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name, value)),
        }
    }

    #[inline]
    pub fn with(mut self, name: &'static str, value: Value) -> Self {
        self.push(name, value);
        self
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.values.iter().any(|(n, _)| *n == name)
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    /// Removes and returns the value of `name`.
    pub fn take(&mut self, name: &str) -> Option<Value> {
        let index = self.values.iter().position(|(n, _)| *n == name)?;
        Some(self.values.remove(index).1)
    }

    /// Removes the value of `name` and converts it.
    ///
    /// Returns `Ok(None)` when the value is absent.
    pub fn take_as<V: FromValue>(&mut self, name: &'static str) -> Result<Option<V>, ConstructError> {
        match self.take(name) {
            Some(value) => {
                let found = value.name();
                V::from_value(value)
                    .map(Some)
                    .ok_or(ConstructError::InvalidValue { property: name, found })
            }
            None => Ok(None),
        }
    }

    /// Like [`take_as`](Self::take_as), but a missing value is an error.
    pub fn require<V: FromValue>(&mut self, name: &'static str) -> Result<V, ConstructError> {
        self.take_as(name)?.ok_or(ConstructError::MissingProperty(name))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&'static str, &Value)> {
        self.values.iter().map(|(n, v)| (*n, v))
    }
}

impl FromIterator<(&'static str, Value)> for ConstructParams {
    fn from_iter<I: IntoIterator<Item = (&'static str, Value)>>(iter: I) -> Self {
        let mut params = Self::new();
        iter.into_iter().for_each(|(n, v)| params.push(n, v));
        params
    }
}

impl IntoIterator for ConstructParams {
    type Item = (&'static str, Value);
    type IntoIter = alloc::vec::IntoIter<(&'static str, Value)>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

// -----------------------------------------------------------------------------
// ClassInfo

/// The registered description of a class: its name, ancestry, property
/// table and constructor.
///
/// Properties are kept in registration order with inherited ones first.
#[derive(Clone)]
pub struct ClassInfo {
    type_name: &'static str,
    kind: ClassKind,
    ancestors: Vec<&'static str>,
    interfaces: Vec<&'static str>,
    properties: Vec<PropertyInfo>,
    constructor: Option<Constructor>,
}

impl ClassInfo {
    #[inline]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[inline]
    pub const fn kind(&self) -> ClassKind {
        self.kind
    }

    #[inline]
    pub fn is_boxed(&self) -> bool {
        self.kind == ClassKind::Boxed
    }

    /// The direct parent class.
    #[inline]
    pub fn parent(&self) -> Option<&'static str> {
        self.ancestors.first().copied()
    }

    /// All ancestors, nearest first.
    #[inline]
    pub fn ancestors(&self) -> &[&'static str] {
        &self.ancestors
    }

    #[inline]
    pub fn interfaces(&self) -> &[&'static str] {
        &self.interfaces
    }

    /// Returns `true` if this class is `name`, derives from it or
    /// implements it. Every object class is an [`ValueKind::ANY_OBJECT`].
    pub fn is_a(&self, name: &str) -> bool {
        self.type_name == name
            || (name == ValueKind::ANY_OBJECT && self.kind == ClassKind::Object)
            || self.ancestors.contains(&name)
            || self.interfaces.contains(&name)
    }

    #[inline]
    pub fn properties(&self) -> &[PropertyInfo] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties.iter().find(|p| p.name() == name)
    }

    #[inline]
    pub fn is_constructible(&self) -> bool {
        self.constructor.is_some()
    }

    /// Creates an instance.
    ///
    /// The constructor consumes the parameters it understands, the rest is
    /// applied through the setters, construct-only properties included.
    /// Values are not checked against the declared category here, see
    /// [`TypeRegistry::construct`](crate::TypeRegistry::construct).
    pub fn construct(&self, mut params: ConstructParams) -> Result<ObjectRef, ConstructError> {
        let constructor = self
            .constructor
            .as_ref()
            .ok_or(ConstructError::NotConstructible(self.type_name))?;

        let object = constructor(&mut params)?;

        for (name, value) in params {
            let property = self.property(name).ok_or(ConstructError::UnknownProperty {
                type_name: self.type_name,
                property: name,
            })?;
            property.set_unchecked(object.as_object(), value)?;
        }

        Ok(object)
    }
}

impl fmt::Debug for ClassInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassInfo")
            .field("type_name", &self.type_name)
            .field("kind", &self.kind)
            .field("ancestors", &self.ancestors)
            .field("properties", &self.properties)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// ClassBuilder

/// Builds the [`ClassInfo`] of `T`.
///
/// See [`ObjectType`] for a complete example.
pub struct ClassBuilder<T> {
    kind: ClassKind,
    ancestors: Vec<&'static str>,
    interfaces: Vec<&'static str>,
    properties: Vec<PropertyInfo>,
    constructor: Option<Constructor>,
    _marker: PhantomData<fn(&T)>,
}

impl<T: ObjectType> Default for ClassBuilder<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ObjectType> ClassBuilder<T> {
    /// Starts an object class.
    pub fn new() -> Self {
        Self {
            kind: ClassKind::Object,
            ancestors: Vec::new(),
            interfaces: Vec::new(),
            properties: Vec::new(),
            constructor: None,
            _marker: PhantomData,
        }
    }

    /// Starts a boxed class.
    pub fn boxed() -> Self {
        Self {
            kind: ClassKind::Boxed,
            ..Self::new()
        }
    }

    /// Inherits the properties, ancestors and interfaces of `P`.
    ///
    /// `upcast` projects `T` onto its embedded parent; inherited accessors
    /// go through it. Inherited properties come first, a property added
    /// with [`property`](Self::property) under an inherited name overrides
    /// it in place.
    pub fn extends<P: ObjectType>(mut self, upcast: fn(&T) -> &P) -> Self {
        let parent = P::class_info();

        let own = core::mem::replace(
            &mut self.properties,
            parent.properties.iter().map(|p| p.inherit(upcast)).collect(),
        );
        own.into_iter().for_each(|p| self.insert(p));

        self.ancestors = core::iter::once(P::TYPE_NAME)
            .chain(parent.ancestors.iter().copied())
            .collect();
        for name in parent.interfaces {
            if !self.interfaces.contains(&name) {
                self.interfaces.push(name);
            }
        }
        self
    }

    /// Declares that `T` implements the interface `name`.
    pub fn implements(mut self, name: &'static str) -> Self {
        if !self.interfaces.contains(&name) {
            self.interfaces.push(name);
        }
        self
    }

    /// Adds a property, or overrides an inherited one with the same name.
    pub fn property(mut self, property: Property<T>) -> Self {
        self.insert(property.into_info());
        self
    }

    fn insert(&mut self, info: PropertyInfo) {
        match self.properties.iter_mut().find(|p| p.name() == info.name()) {
            Some(slot) => *slot = info,
            None => self.properties.push(info),
        }
    }

    /// Constructs instances with `T::default()`.
    pub fn default_constructor(self) -> Self
    where
        T: Default,
    {
        self.constructor(|_| Ok(T::default()))
    }

    /// Constructs instances with `f`, which may take values out of the
    /// parameters.
    pub fn constructor<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut ConstructParams) -> Result<T, ConstructError> + Send + Sync + 'static,
    {
        self.constructor = Some(Arc::new(move |params: &mut ConstructParams| {
            f(params).map(ObjectRef::new)
        }));
        self
    }

    pub fn build(self) -> ClassInfo {
        ClassInfo {
            type_name: T::TYPE_NAME,
            kind: self.kind,
            ancestors: self.ancestors,
            interfaces: self.interfaces,
            properties: self.properties,
            constructor: self.constructor,
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
