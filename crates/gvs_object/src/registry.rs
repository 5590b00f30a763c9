use alloc::string::ToString;

use gvs_utils::hash::HashMap;

use crate::property::PropertyInfo;
use crate::{ClassInfo, ConstructError, ConstructParams, ObjectRef, ObjectType};
use crate::{ParamFlags, PropertyError, Value};

// -----------------------------------------------------------------------------
// TypeRegistry

/// A registry of object classes, keyed by type name.
///
/// This is the reflection collaborator of the serializer: it resolves the
/// type names written in documents back to classes, enumerates their
/// properties, and reads, writes and constructs objects.
///
/// Every stored callback is `Send + Sync`, so a registry can be shared
/// across threads even though the objects themselves cannot.
pub struct TypeRegistry {
    classes: HashMap<&'static str, ClassInfo>,
    auto_registered: bool,
}

impl Default for TypeRegistry {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[inline]
    pub const fn new() -> Self {
        Self {
            classes: gvs_utils::hash::new_map(),
            auto_registered: false,
        }
    }

    /// Registers `T` if it is not registered yet, then its dependencies.
    ///
    /// If `T` is already present, neither it nor its dependencies are
    /// registered again. Use [`insert_class`](Self::insert_class) to
    /// overwrite an entry.
    pub fn register<T: ObjectType>(&mut self) {
        if self.try_insert_class(T::class_info()) {
            T::register_dependencies(self);
        }
    }

    /// Inserts `info` unless its type name is taken.
    ///
    /// Returns `true` if inserted. Dependencies are not registered.
    pub fn try_insert_class(&mut self, info: ClassInfo) -> bool {
        if self.classes.contains_key(info.type_name()) {
            return false;
        }
        self.classes.insert(info.type_name(), info);
        true
    }

    /// Inserts or **overwrites** the class of `info.type_name()`.
    pub fn insert_class(&mut self, info: ClassInfo) -> Option<ClassInfo> {
        self.classes.insert(info.type_name(), info)
    }

    /// Registers every type submitted through [`auto_register!`](crate::auto_register).
    ///
    /// Repeated calls do nothing. Returns `false` when the `auto_register`
    /// feature is disabled.
    pub fn auto_register(&mut self) -> bool {
        #[cfg(feature = "auto_register")]
        {
            if !self.auto_registered {
                crate::__macro_exports::auto_register::register_types(self);
                self.auto_registered = true;
            }
        }
        self.auto_registered
    }

    #[inline]
    pub fn contains(&self, type_name: &str) -> bool {
        self.classes.contains_key(type_name)
    }

    #[inline]
    pub fn get(&self, type_name: &str) -> Option<&ClassInfo> {
        self.classes.get(type_name)
    }

    /// The properties of a registered class, inherited first.
    #[inline]
    pub fn properties_of(&self, type_name: &str) -> Option<&[PropertyInfo]> {
        self.get(type_name).map(ClassInfo::properties)
    }

    /// Looks up the property `name` of a registered class.
    pub fn property(&self, type_name: &str, name: &str) -> Result<&PropertyInfo, PropertyError> {
        let class = self
            .get(type_name)
            .ok_or_else(|| PropertyError::UnregisteredType(type_name.to_string()))?;
        class.property(name).ok_or_else(|| PropertyError::NotFound {
            type_name: type_name.to_string(),
            property: name.to_string(),
        })
    }

    /// Returns `true` if `type_name` is registered and is, derives from or
    /// implements `target`.
    pub fn is_a(&self, type_name: &str, target: &str) -> bool {
        self.get(type_name).is_some_and(|class| class.is_a(target))
    }

    /// Checks that `value` may be stored in `property`.
    ///
    /// Beyond the form, referenced objects must be instances of the class
    /// named by the property category.
    pub fn check_value(&self, property: &PropertyInfo, value: &Value) -> Result<(), PropertyError> {
        let kind = property.kind();
        if !value.conforms_to(&kind) {
            return Err(PropertyError::TypeMismatch {
                property: property.name(),
                expected: kind,
                found: value.name(),
            });
        }
        if let (Some(entity), Some(expected)) = (value.as_entity(), kind.type_name()) {
            if !self.is_a(entity.type_name(), expected) {
                return Err(PropertyError::NotA {
                    property: property.name(),
                    expected,
                    found: entity.type_name(),
                });
            }
        }
        Ok(())
    }

    /// Reads a readable property of `object`.
    pub fn get_property(&self, object: &ObjectRef, name: &str) -> Result<Value, PropertyError> {
        let property = self.property(object.type_name(), name)?;
        if !property.is_readable() {
            return Err(PropertyError::NotReadable {
                type_name: object.type_name(),
                property: property.name(),
            });
        }
        property.get(object.as_object())
    }

    /// Writes a writable property of a constructed `object`.
    ///
    /// Construct-only properties are rejected, they can only be supplied
    /// through [`construct`](Self::construct).
    pub fn set_property(
        &self,
        object: &ObjectRef,
        name: &str,
        value: Value,
    ) -> Result<(), PropertyError> {
        let property = self.property(object.type_name(), name)?;
        if property.is_construct_only() {
            return Err(PropertyError::ConstructOnly {
                type_name: object.type_name(),
                property: property.name(),
            });
        }
        if !property.is_writable() {
            return Err(PropertyError::NotWritable {
                type_name: object.type_name(),
                property: property.name(),
            });
        }
        self.check_value(property, &value)?;
        property.set_unchecked(object.as_object(), value)
    }

    /// Creates an instance of `type_name` from construction parameters.
    ///
    /// Every parameter must name a writable property of the class and hold
    /// a conforming value. The constructor may consume a parameter whose
    /// property has no setter.
    pub fn construct(
        &self,
        type_name: &str,
        params: ConstructParams,
    ) -> Result<ObjectRef, ConstructError> {
        let class = self
            .get(type_name)
            .ok_or_else(|| ConstructError::UnregisteredType(type_name.to_string()))?;

        for (name, value) in params.iter() {
            let property = class.property(name).ok_or(ConstructError::UnknownProperty {
                type_name: class.type_name(),
                property: name,
            })?;
            if !property.flags().contains(ParamFlags::WRITABLE) {
                return Err(PropertyError::NotWritable {
                    type_name: class.type_name(),
                    property: property.name(),
                }
                .into());
            }
            self.check_value(property, value)?;
        }

        log::trace!("construct `{}` with {} parameter(s)", type_name, params.len());
        class.construct(params)
    }

    /// Returns an iterator over the registered classes.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &ClassInfo> {
        self.classes.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.classes.len()
    }
}

impl core::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.classes.keys()).finish()
    }
}

// -----------------------------------------------------------------------------
// TypeRegistryArc

#[cfg(feature = "std")]
pub use arc::TypeRegistryArc;

#[cfg(feature = "std")]
mod arc {
    use alloc::sync::Arc;
    use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

    use super::TypeRegistry;

    /// A [`TypeRegistry`] shared behind a lock.
    #[derive(Clone, Default)]
    pub struct TypeRegistryArc {
        /// The wrapped [`TypeRegistry`].
        pub internal: Arc<RwLock<TypeRegistry>>,
    }

    impl TypeRegistryArc {
        #[inline]
        pub fn new(registry: TypeRegistry) -> Self {
            Self {
                internal: Arc::new(RwLock::new(registry)),
            }
        }

        /// Takes a read lock on the underlying [`TypeRegistry`].
        pub fn read(&self) -> RwLockReadGuard<'_, TypeRegistry> {
            self.internal.read().unwrap_or_else(PoisonError::into_inner)
        }

        /// Takes a write lock on the underlying [`TypeRegistry`].
        pub fn write(&self) -> RwLockWriteGuard<'_, TypeRegistry> {
            self.internal
                .write()
                .unwrap_or_else(PoisonError::into_inner)
        }
    }

    impl core::fmt::Debug for TypeRegistryArc {
        fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            self.read().fmt(f)
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::string::String;
    use core::cell::{Cell, RefCell};

    use super::TypeRegistry;
    use crate::{ClassBuilder, ClassInfo, ConstructError, ConstructParams, ObjectRef, ObjectType};
    use crate::{ParamFlags, Property, PropertyError, Value, ValueKind};

    #[derive(Default)]
    struct Node {
        id: Cell<u32>,
        next: RefCell<Option<ObjectRef>>,
        secret: Cell<i32>,
    }

    impl ObjectType for Node {
        const TYPE_NAME: &'static str = "Node";

        fn class_info() -> ClassInfo {
            ClassBuilder::<Self>::new()
                .property(
                    Property::new("id", ValueKind::UInt, ParamFlags::READWRITE | ParamFlags::CONSTRUCT_ONLY)
                        .getter(|this: &Self| Value::UInt(this.id.get()))
                        .setter(|this: &Self, v: u32| this.id.set(v)),
                )
                .property(
                    Property::new("next", ValueKind::Object("Node"), ParamFlags::READWRITE)
                        .getter(|this: &Self| Value::Object(this.next.borrow().clone()))
                        .setter(|this: &Self, v: Option<ObjectRef>| *this.next.borrow_mut() = v),
                )
                .property(
                    Property::new("secret", ValueKind::Int, ParamFlags::WRITABLE)
                        .setter(|this: &Self, v: i32| this.secret.set(v)),
                )
                .default_constructor()
                .build()
        }

        fn register_dependencies(registry: &mut TypeRegistry) {
            registry.register::<Leaf>();
        }
    }

    #[derive(Default)]
    struct Leaf;

    impl ObjectType for Leaf {
        const TYPE_NAME: &'static str = "Leaf";

        fn class_info() -> ClassInfo {
            ClassBuilder::<Self>::new().default_constructor().build()
        }
    }

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.register::<Node>();
        registry
    }

    #[test]
    fn register_with_dependencies() {
        let registry = registry();
        assert!(registry.contains("Node"));
        assert!(registry.contains("Leaf"));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.properties_of("Node").map(<[_]>::len), Some(3));
    }

    #[test]
    fn construct_and_access() {
        let registry = registry();
        let a = registry
            .construct("Node", ConstructParams::new().with("id", Value::UInt(1)))
            .unwrap();
        let b = registry.construct("Node", ConstructParams::new()).unwrap();

        registry.set_property(&a, "next", Value::Object(Some(b.clone()))).unwrap();

        assert_eq!(registry.get_property(&a, "id").unwrap(), Value::UInt(1));
        assert_eq!(registry.get_property(&a, "next").unwrap(), Value::Object(Some(b)));
    }

    #[test]
    fn access_rules() {
        let registry = registry();
        let node = registry.construct("Node", ConstructParams::new()).unwrap();

        assert!(matches!(
            registry.set_property(&node, "id", Value::UInt(2)),
            Err(PropertyError::ConstructOnly { property: "id", .. })
        ));
        assert!(matches!(
            registry.get_property(&node, "secret"),
            Err(PropertyError::NotReadable { property: "secret", .. })
        ));
        assert!(matches!(
            registry.set_property(&node, "missing", Value::Int(0)),
            Err(PropertyError::NotFound { .. })
        ));
        assert!(matches!(
            registry.set_property(&node, "next", Value::Int(0)),
            Err(PropertyError::TypeMismatch { property: "next", .. })
        ));

        let leaf = ObjectRef::from_rc(Rc::new(Leaf));
        assert!(matches!(
            registry.set_property(&node, "next", Value::Object(Some(leaf))),
            Err(PropertyError::NotA { expected: "Node", found: "Leaf", .. })
        ));
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn registry_is_send_sync() {
        assert_send_sync::<TypeRegistry>();
        #[cfg(feature = "std")]
        assert_send_sync::<super::TypeRegistryArc>();
    }

    #[cfg(feature = "std")]
    #[test]
    fn shared_across_threads() {
        use super::TypeRegistryArc;

        let shared = TypeRegistryArc::new(TypeRegistry::new());
        let writer = shared.clone();
        std::thread::spawn(move || writer.write().register::<Node>())
            .join()
            .unwrap();

        assert!(shared.read().contains("Node"));
        assert!(shared.read().contains("Leaf"));

        let reader = shared.clone();
        let len = std::thread::spawn(move || reader.read().len()).join().unwrap();
        assert_eq!(len, 2);
    }

    #[test]
    fn construct_errors() {
        let registry = registry();

        assert_eq!(
            registry.construct("Ghost", ConstructParams::new()).unwrap_err(),
            ConstructError::UnregisteredType(String::from("Ghost"))
        );
        assert!(matches!(
            registry.construct("Node", ConstructParams::new().with("id", Value::Int(3))),
            Err(ConstructError::Property(PropertyError::TypeMismatch { property: "id", .. }))
        ));
    }
}
