use alloc::sync::Arc;
use core::fmt;
use core::marker::PhantomData;

use crate::object::downcast_object;
use crate::{FromValue, Object, ObjectType, ParamFlags, PropertyError, Value, ValueKind};

pub(crate) type Getter = Arc<dyn Fn(&dyn Object) -> Result<Value, PropertyError> + Send + Sync>;
pub(crate) type Setter = Arc<dyn Fn(&dyn Object, Value) -> Result<(), PropertyError> + Send + Sync>;

fn wrong_object<T: ObjectType>(object: &dyn Object) -> PropertyError {
    PropertyError::WrongObject {
        expected: T::TYPE_NAME,
        found: object.type_name(),
    }
}

// -----------------------------------------------------------------------------
// PropertyInfo

/// A registered property: its name, declared category, access flags and
/// type-erased accessors.
///
/// Cloning is cheap, accessors are shared.
#[derive(Clone)]
pub struct PropertyInfo {
    name: &'static str,
    kind: ValueKind,
    flags: ParamFlags,
    owner: &'static str,
    getter: Option<Getter>,
    setter: Option<Setter>,
}

impl PropertyInfo {
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub const fn kind(&self) -> ValueKind {
        self.kind
    }

    #[inline]
    pub const fn flags(&self) -> ParamFlags {
        self.flags
    }

    /// The class that declared (or last overrode) this property.
    #[inline]
    pub const fn owner(&self) -> &'static str {
        self.owner
    }

    /// Readable, and a getter is present.
    #[inline]
    pub fn is_readable(&self) -> bool {
        self.flags.contains(ParamFlags::READABLE) && self.getter.is_some()
    }

    /// Writable, and a setter is present.
    #[inline]
    pub fn is_writable(&self) -> bool {
        self.flags.contains(ParamFlags::WRITABLE) && self.setter.is_some()
    }

    #[inline]
    pub fn is_construct_only(&self) -> bool {
        self.flags.is_construct_only()
    }

    /// Calls the getter. Ignores the flags.
    pub fn get(&self, object: &dyn Object) -> Result<Value, PropertyError> {
        match &self.getter {
            Some(getter) => getter(object),
            None => Err(PropertyError::NotReadable {
                type_name: object.type_name(),
                property: self.name,
            }),
        }
    }

    /// Calls the setter. Ignores the construct-only flag, the caller
    /// decides whether the object is still under construction.
    pub(crate) fn set_unchecked(&self, object: &dyn Object, value: Value) -> Result<(), PropertyError> {
        match &self.setter {
            Some(setter) => setter(object, value),
            None => Err(PropertyError::NotWritable {
                type_name: object.type_name(),
                property: self.name,
            }),
        }
    }

    /// Re-targets the accessors of a parent class property to `T`.
    pub(crate) fn inherit<T: ObjectType, P: ObjectType>(
        &self,
        upcast: fn(&T) -> &P,
    ) -> PropertyInfo {
        let getter = self.getter.clone().map(|parent| -> Getter {
            Arc::new(move |object: &dyn Object| {
                let this = downcast_object::<T>(object).ok_or_else(|| wrong_object::<T>(object))?;
                let base: &dyn Object = upcast(this);
                parent(base)
            })
        });
        let setter = self.setter.clone().map(|parent| -> Setter {
            Arc::new(move |object: &dyn Object, value: Value| {
                let this = downcast_object::<T>(object).ok_or_else(|| wrong_object::<T>(object))?;
                let base: &dyn Object = upcast(this);
                parent(base, value)
            })
        });

        PropertyInfo {
            getter,
            setter,
            ..self.clone()
        }
    }
}

impl fmt::Debug for PropertyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyInfo")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("flags", &self.flags)
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Property

/// Typed builder of a [`PropertyInfo`] for class `T`.
///
/// Accessors take `&T`; objects are shared, so setters mutate through
/// interior mutability.
///
/// ```
/// # use core::cell::RefCell;
/// # use gvs_object::{ClassBuilder, ClassInfo, ObjectType, ParamFlags, Property, Value, ValueKind};
/// #[derive(Default)]
/// struct Label {
///     text: RefCell<Option<String>>,
/// }
///
/// impl ObjectType for Label {
///     const TYPE_NAME: &'static str = "Label";
///
///     fn class_info() -> ClassInfo {
///         ClassBuilder::<Self>::new()
///             .property(
///                 Property::new("text", ValueKind::String, ParamFlags::READWRITE)
///                     .getter(|this: &Self| Value::String(this.text.borrow().clone()))
///                     .setter(|this: &Self, v: Option<String>| *this.text.borrow_mut() = v),
///             )
///             .default_constructor()
///             .build()
///     }
/// }
///
/// assert!(Label::class_info().property("text").unwrap().is_writable());
/// ```
pub struct Property<T> {
    name: &'static str,
    kind: ValueKind,
    flags: ParamFlags,
    getter: Option<Getter>,
    setter: Option<Setter>,
    _marker: PhantomData<fn(&T)>,
}

impl<T: ObjectType> Property<T> {
    pub fn new(name: &'static str, kind: ValueKind, flags: ParamFlags) -> Self {
        Self {
            name,
            kind,
            flags,
            getter: None,
            setter: None,
            _marker: PhantomData,
        }
    }

    /// Sets an infallible getter.
    pub fn getter<F>(self, f: F) -> Self
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        self.try_getter(move |this: &T| Ok(f(this)))
    }

    pub fn try_getter<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> Result<Value, PropertyError> + Send + Sync + 'static,
    {
        self.getter = Some(Arc::new(move |object: &dyn Object| {
            let this = downcast_object::<T>(object).ok_or_else(|| wrong_object::<T>(object))?;
            f(this)
        }));
        self
    }

    /// Sets a setter receiving the value converted by [`FromValue`].
    ///
    /// A value of the wrong form is rejected with
    /// [`PropertyError::TypeMismatch`] before `f` is called.
    pub fn setter<V, F>(self, f: F) -> Self
    where
        V: FromValue,
        F: Fn(&T, V) + Send + Sync + 'static,
    {
        self.try_setter(move |this: &T, v: V| {
            f(this, v);
            Ok(())
        })
    }

    pub fn try_setter<V, F>(mut self, f: F) -> Self
    where
        V: FromValue,
        F: Fn(&T, V) -> Result<(), PropertyError> + Send + Sync + 'static,
    {
        let (name, kind) = (self.name, self.kind);
        self.setter = Some(Arc::new(move |object: &dyn Object, value: Value| {
            let this = downcast_object::<T>(object).ok_or_else(|| wrong_object::<T>(object))?;
            let found = value.name();
            let value = V::from_value(value).ok_or(PropertyError::TypeMismatch {
                property: name,
                expected: kind,
                found,
            })?;
            f(this, value)
        }));
        self
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn into_info(self) -> PropertyInfo {
        PropertyInfo {
            name: self.name,
            kind: self.kind,
            flags: self.flags,
            owner: T::TYPE_NAME,
            getter: self.getter,
            setter: self.setter,
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
