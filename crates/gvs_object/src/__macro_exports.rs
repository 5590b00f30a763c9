//! Items used by the exported macros. Not public API.

#[cfg(feature = "auto_register")]
pub mod auto_register {
    use crate::TypeRegistry;

    pub use inventory;

    /// A registration function submitted by [`auto_register!`](crate::auto_register).
    pub struct AutoRegisterFn(pub fn(&mut TypeRegistry));

    inventory::collect!(AutoRegisterFn);

    pub fn register_type<T: crate::ObjectType>(registry: &mut TypeRegistry) {
        registry.register::<T>();
    }

    pub(crate) fn register_types(registry: &mut TypeRegistry) {
        for func in inventory::iter::<AutoRegisterFn> {
            (func.0)(registry);
        }
    }
}

/// Submits types for [`TypeRegistry::auto_register`](crate::TypeRegistry::auto_register).
///
/// Only non-generic types can be submitted. Without the `auto_register`
/// feature the macro expands to nothing.
///
/// ```
/// # use gvs_object::{ClassBuilder, ClassInfo, ObjectType, TypeRegistry};
/// #[derive(Default)]
/// struct Marker;
///
/// impl ObjectType for Marker {
///     const TYPE_NAME: &'static str = "Marker";
///
///     fn class_info() -> ClassInfo {
///         ClassBuilder::<Self>::new().default_constructor().build()
///     }
/// }
///
/// gvs_object::auto_register!(Marker);
///
/// let mut registry = TypeRegistry::new();
/// if registry.auto_register() {
///     assert!(registry.contains("Marker"));
/// }
/// ```
#[cfg(feature = "auto_register")]
#[macro_export]
macro_rules! auto_register {
    ($($ty:ty),+ $(,)?) => {
        $(
            $crate::__macro_exports::auto_register::inventory::submit! {
                $crate::__macro_exports::auto_register::AutoRegisterFn(
                    $crate::__macro_exports::auto_register::register_type::<$ty>
                )
            }
        )+
    };
}

#[cfg(not(feature = "auto_register"))]
#[macro_export]
macro_rules! auto_register {
    ($($ty:ty),+ $(,)?) => {};
}
