use alloc::rc::{Rc, Weak};
use core::any::Any;
use core::fmt;

use crate::{ClassInfo, TypeRegistry};

// -----------------------------------------------------------------------------
// Object

/// A property-bearing object.
///
/// Implemented for every [`ObjectType`]; there is no need to implement it
/// by hand. Objects are shared through [`ObjectRef`] and mutate their own
/// state through interior mutability, the same object may be referenced
/// from many places of a graph (cycles included).
pub trait Object: Any {
    /// The registered class name of the concrete type.
    fn type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;
}

/// A type that can be registered into a [`TypeRegistry`].
///
/// # Example
///
/// ```
/// use core::cell::Cell;
/// use gvs_object::{ClassBuilder, ClassInfo, ObjectType, ParamFlags, Property};
/// use gvs_object::{TypeRegistry, Value, ValueKind};
///
/// #[derive(Default)]
/// struct Counter {
///     count: Cell<i32>,
/// }
///
/// impl ObjectType for Counter {
///     const TYPE_NAME: &'static str = "Counter";
///
///     fn class_info() -> ClassInfo {
///         ClassBuilder::<Self>::new()
///             .property(
///                 Property::new("count", ValueKind::Int, ParamFlags::READWRITE)
///                     .getter(|this: &Self| Value::Int(this.count.get()))
///                     .setter(|this: &Self, v: i32| this.count.set(v)),
///             )
///             .default_constructor()
///             .build()
///     }
/// }
///
/// let mut registry = TypeRegistry::new();
/// registry.register::<Counter>();
///
/// let counter = registry.construct("Counter", Default::default()).unwrap();
/// registry.set_property(&counter, "count", Value::Int(3)).unwrap();
///
/// assert_eq!(counter.downcast_ref::<Counter>().unwrap().count.get(), 3);
/// ```
pub trait ObjectType: Any + Sized {
    /// The name written into serialized documents.
    const TYPE_NAME: &'static str;

    /// Builds the property table and constructor of this type.
    fn class_info() -> ClassInfo;

    /// Registers other types needed by this type.
    /// **Allow** not to register oneself.
    fn register_dependencies(_registry: &mut TypeRegistry) {}
}

impl<T: ObjectType> Object for T {
    #[inline]
    fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }

    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Downcasts an erased object, used by property accessors.
#[inline]
pub(crate) fn downcast_object<T: ObjectType>(object: &dyn Object) -> Option<&T> {
    object.as_any().downcast_ref::<T>()
}

// -----------------------------------------------------------------------------
// ObjectRef

/// A shared, type-erased handle to an [`Object`].
///
/// Equality is identity: two handles are equal when they point at the
/// same allocation.
#[derive(Clone)]
pub struct ObjectRef(Rc<dyn Object>);

impl ObjectRef {
    /// Moves `value` into a new shared allocation.
    #[inline]
    pub fn new<T: ObjectType>(value: T) -> Self {
        Self(Rc::new(value))
    }

    /// Wraps an existing `Rc`, keeping its identity.
    #[inline]
    pub fn from_rc<T: ObjectType>(value: Rc<T>) -> Self {
        Self(value)
    }

    /// Returns the registered class name of the referenced object.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.0.type_name()
    }

    #[inline]
    pub fn as_object(&self) -> &dyn Object {
        &*self.0
    }

    /// Returns `true` if both handles reference the same object.
    #[inline]
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// The address of the referenced allocation.
    ///
    /// Stable while any handle is alive, used as the identity key.
    #[inline]
    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.0).cast::<()>() as usize
    }

    #[inline]
    pub fn is<T: ObjectType>(&self) -> bool {
        downcast_object::<T>(self.as_object()).is_some()
    }

    #[inline]
    pub fn downcast_ref<T: ObjectType>(&self) -> Option<&T> {
        downcast_object::<T>(self.as_object())
    }

    /// Returns a typed `Rc` sharing this handle's allocation.
    pub fn downcast<T: ObjectType>(&self) -> Option<Rc<T>> {
        let any: Rc<dyn Any> = self.0.clone();
        any.downcast::<T>().ok()
    }

    #[inline]
    pub fn downgrade(&self) -> WeakObjectRef {
        WeakObjectRef(Some(Rc::downgrade(&self.0)))
    }

    /// Number of strong handles, mostly useful in tests.
    #[inline]
    pub fn strong_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }
}

impl PartialEq for ObjectRef {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ObjectRef {}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({} @ {:#x})", self.type_name(), self.addr())
    }
}

impl<T: ObjectType> From<Rc<T>> for ObjectRef {
    #[inline]
    fn from(value: Rc<T>) -> Self {
        Self::from_rc(value)
    }
}

// -----------------------------------------------------------------------------
// WeakObjectRef

/// A non-owning [`ObjectRef`], for back references such as `parent`.
#[derive(Clone, Default)]
pub struct WeakObjectRef(Option<Weak<dyn Object>>);

impl WeakObjectRef {
    /// A weak handle that never upgrades.
    #[inline]
    pub const fn new() -> Self {
        Self(None)
    }

    #[inline]
    pub fn upgrade(&self) -> Option<ObjectRef> {
        self.0.as_ref()?.upgrade().map(ObjectRef)
    }
}

impl From<Option<&ObjectRef>> for WeakObjectRef {
    #[inline]
    fn from(value: Option<&ObjectRef>) -> Self {
        value.map(ObjectRef::downgrade).unwrap_or_default()
    }
}

impl fmt::Debug for WeakObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(object) => write!(f, "Weak({object:?})"),
            None => f.write_str("Weak(<dangling>)"),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;

    use super::{ObjectRef, ObjectType, WeakObjectRef};
    use crate::{ClassBuilder, ClassInfo};

    struct Plain;

    impl ObjectType for Plain {
        const TYPE_NAME: &'static str = "Plain";

        fn class_info() -> ClassInfo {
            ClassBuilder::<Self>::new().build()
        }
    }

    struct Other;

    impl ObjectType for Other {
        const TYPE_NAME: &'static str = "Other";

        fn class_info() -> ClassInfo {
            ClassBuilder::<Self>::new().build()
        }
    }

    #[test]
    fn identity() {
        let a = ObjectRef::new(Plain);
        let b = a.clone();
        let c = ObjectRef::new(Plain);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.addr(), b.addr());
        assert_eq!(a.type_name(), "Plain");
    }

    #[test]
    fn downcast() {
        let rc = Rc::new(Plain);
        let a = ObjectRef::from_rc(rc.clone());

        assert!(a.is::<Plain>());
        assert!(!a.is::<Other>());
        assert!(a.downcast_ref::<Other>().is_none());
        assert!(Rc::ptr_eq(&a.downcast::<Plain>().unwrap(), &rc));
    }

    #[test]
    fn weak() {
        let a = ObjectRef::new(Plain);
        let weak = a.downgrade();

        assert_eq!(weak.upgrade(), Some(a.clone()));
        drop(a);
        assert!(weak.upgrade().is_none());
        assert!(WeakObjectRef::new().upgrade().is_none());
    }
}
