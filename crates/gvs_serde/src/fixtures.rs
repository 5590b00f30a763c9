//! Object types shared by the tests of this crate.

extern crate std;

use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use gvs_object::{ClassBuilder, ClassInfo, ObjectRef, ObjectType, ParamFlags, Property};
use gvs_object::{TypeRegistry, Value, ValueKind, WeakObjectRef};
use gvs_utils::hash::HashMap;
use gvs_variant::Variant;

const CONSTRUCT_ONLY: ParamFlags = ParamFlags::READWRITE.union(ParamFlags::CONSTRUCT_ONLY);

pub(crate) fn registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry.register::<TestItem>();
    registry.register::<Scalars>();
    registry.register::<TestBase>();
    registry.register::<TestDerived>();
    registry.register::<Pair>();
    registry
}

// -----------------------------------------------------------------------------
// TestItem

/// A node with an owning `child` link and a weak `parent` back link.
#[derive(Default)]
pub(crate) struct TestItem {
    child: RefCell<Option<ObjectRef>>,
    parent: RefCell<WeakObjectRef>,
    name: RefCell<Option<String>>,
}

impl TestItem {
    pub(crate) fn new(name: &str) -> ObjectRef {
        let item = TestItem::default();
        *item.name.borrow_mut() = Some(String::from(name));
        ObjectRef::new(item)
    }

    /// Makes `child` the child of `parent`.
    pub(crate) fn link(parent: &ObjectRef, child: &ObjectRef) {
        if let Some(p) = parent.downcast_ref::<TestItem>() {
            p.set_child(Some(child.clone()));
        }
        if let Some(c) = child.downcast_ref::<TestItem>() {
            c.set_parent(Some(parent));
        }
    }

    pub(crate) fn set_child(&self, child: Option<ObjectRef>) {
        *self.child.borrow_mut() = child;
    }

    pub(crate) fn set_parent(&self, parent: Option<&ObjectRef>) {
        *self.parent.borrow_mut() = WeakObjectRef::from(parent);
    }

    pub(crate) fn child(&self) -> Option<ObjectRef> {
        self.child.borrow().clone()
    }

    pub(crate) fn parent(&self) -> Option<ObjectRef> {
        self.parent.borrow().upgrade()
    }

    pub(crate) fn name(&self) -> Option<String> {
        self.name.borrow().clone()
    }
}

impl ObjectType for TestItem {
    const TYPE_NAME: &'static str = "TestItem";

    fn class_info() -> ClassInfo {
        ClassBuilder::<Self>::new()
            .property(
                Property::new("child", ValueKind::Object("TestItem"), ParamFlags::READWRITE)
                    .getter(|this: &Self| Value::Object(this.child()))
                    .setter(|this: &Self, v: Option<ObjectRef>| this.set_child(v)),
            )
            .property(
                Property::new("parent", ValueKind::Object("TestItem"), ParamFlags::READWRITE)
                    .getter(|this: &Self| Value::Object(this.parent()))
                    .setter(|this: &Self, v: Option<ObjectRef>| this.set_parent(v.as_ref())),
            )
            .property(
                Property::new("name", ValueKind::String, CONSTRUCT_ONLY)
                    .getter(|this: &Self| Value::String(this.name()))
                    .setter(|this: &Self, v: Option<String>| *this.name.borrow_mut() = v),
            )
            .default_constructor()
            .build()
    }
}

/// Never registered.
pub(crate) struct Unregistered;

impl ObjectType for Unregistered {
    const TYPE_NAME: &'static str = "Unregistered";

    fn class_info() -> ClassInfo {
        ClassBuilder::<Self>::new().build()
    }
}

// -----------------------------------------------------------------------------
// Scalars

/// One property per value category, stored by name.
#[derive(Default)]
pub(crate) struct Scalars {
    values: RefCell<HashMap<&'static str, Value>>,
}

pub(crate) const SCALAR_FIELDS: &[(&str, ValueKind)] = &[
    ("bool", ValueKind::Bool),
    ("char", ValueKind::Char),
    ("uchar", ValueKind::UChar),
    ("int", ValueKind::Int),
    ("uint", ValueKind::UInt),
    ("long", ValueKind::Long),
    ("ulong", ValueKind::ULong),
    ("int64", ValueKind::Int64),
    ("uint64", ValueKind::UInt64),
    ("float", ValueKind::Float),
    ("double", ValueKind::Double),
    ("string", ValueKind::String),
    ("variant", ValueKind::Variant),
    ("mode", ValueKind::Enum("TestMode")),
    ("access", ValueKind::Flags("TestAccess")),
    ("tags", ValueKind::Boxed("GStrv")),
    ("blob", ValueKind::Boxed("GBytes")),
    ("bounds", ValueKind::Boxed("TestRect")),
    ("pointer", ValueKind::Pointer),
];

fn default_value(kind: ValueKind) -> Value {
    match kind {
        ValueKind::Bool => Value::Bool(false),
        ValueKind::Char => Value::Char(0),
        ValueKind::UChar => Value::UChar(0),
        ValueKind::Int => Value::Int(0),
        ValueKind::UInt => Value::UInt(0),
        ValueKind::Long => Value::Long(0),
        ValueKind::ULong => Value::ULong(0),
        ValueKind::Int64 => Value::Int64(0),
        ValueKind::UInt64 => Value::UInt64(0),
        ValueKind::Float => Value::Float(0.0),
        ValueKind::Double => Value::Double(0.0),
        ValueKind::String => Value::String(None),
        ValueKind::Variant => Value::Variant(Variant::unit()),
        ValueKind::Pointer => Value::Pointer(0),
        ValueKind::Enum(_) => Value::Enum(0),
        ValueKind::Flags(_) => Value::Flags(0),
        ValueKind::Boxed("GStrv") => Value::Strv(Vec::new()),
        ValueKind::Boxed("GBytes") => Value::Bytes(Vec::new()),
        ValueKind::Boxed(_) => Value::Boxed(None),
        ValueKind::Object(_) | ValueKind::Interface(_) => Value::Object(None),
    }
}

impl Scalars {
    pub(crate) fn load(&self, name: &str) -> Value {
        let kind = SCALAR_FIELDS
            .iter()
            .find(|(n, _)| *n == name)
            .map_or(ValueKind::Int, |(_, k)| *k);
        self.values
            .borrow()
            .get(name)
            .cloned()
            .unwrap_or_else(|| default_value(kind))
    }

    fn store(&self, name: &'static str, value: Value) {
        self.values.borrow_mut().insert(name, value);
    }
}

impl ObjectType for Scalars {
    const TYPE_NAME: &'static str = "Scalars";

    fn class_info() -> ClassInfo {
        let mut builder = ClassBuilder::<Self>::new();
        for &(name, kind) in SCALAR_FIELDS {
            builder = builder.property(
                Property::new(name, kind, ParamFlags::READWRITE)
                    .getter(move |this: &Self| this.load(name))
                    .setter(move |this: &Self, v: Value| this.store(name, v)),
            );
        }
        builder
            .property(
                Property::new("read-only", ValueKind::Int, ParamFlags::READABLE)
                    .getter(|_: &Self| Value::Int(1)),
            )
            .property(
                Property::new("write-only", ValueKind::Int, ParamFlags::WRITABLE)
                    .setter(|this: &Self, v: Value| this.store("write-only", v)),
            )
            .default_constructor()
            .build()
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<TestRect>();
    }
}

/// A boxed value type, referenced as an entity.
#[derive(Default)]
pub(crate) struct TestRect {
    pub(crate) width: Cell<i32>,
    pub(crate) height: Cell<i32>,
}

impl ObjectType for TestRect {
    const TYPE_NAME: &'static str = "TestRect";

    fn class_info() -> ClassInfo {
        ClassBuilder::<Self>::boxed()
            .property(
                Property::new("width", ValueKind::Int, ParamFlags::READWRITE)
                    .getter(|this: &Self| Value::Int(this.width.get()))
                    .setter(|this: &Self, v: i32| this.width.set(v)),
            )
            .property(
                Property::new("height", ValueKind::Int, ParamFlags::READWRITE)
                    .getter(|this: &Self| Value::Int(this.height.get()))
                    .setter(|this: &Self, v: i32| this.height.set(v)),
            )
            .default_constructor()
            .build()
    }
}

// -----------------------------------------------------------------------------
// TestBase / TestDerived

pub(crate) struct TestBase {
    pub(crate) int_prop: Cell<i32>,
    pub(crate) dbl_prop: Cell<f64>,
    pub(crate) float_prop: Cell<f32>,
    pub(crate) str_prop: RefCell<Option<String>>,
}

impl Default for TestBase {
    fn default() -> Self {
        Self {
            int_prop: Cell::new(0),
            dbl_prop: Cell::new(0.0),
            float_prop: Cell::new(0.0),
            str_prop: RefCell::new(Some(String::from("Test"))),
        }
    }
}

impl ObjectType for TestBase {
    const TYPE_NAME: &'static str = "TestBase";

    fn class_info() -> ClassInfo {
        ClassBuilder::<Self>::new()
            .property(
                Property::new("int-prop", ValueKind::Int, ParamFlags::READWRITE)
                    .getter(|this: &Self| Value::Int(this.int_prop.get()))
                    .setter(|this: &Self, v: i32| this.int_prop.set(v)),
            )
            .property(
                Property::new("dbl-prop", ValueKind::Double, ParamFlags::READWRITE)
                    .getter(|this: &Self| Value::Double(this.dbl_prop.get()))
                    .setter(|this: &Self, v: f64| this.dbl_prop.set(v)),
            )
            .property(
                Property::new("float-prop", ValueKind::Float, ParamFlags::READWRITE)
                    .getter(|this: &Self| Value::Float(this.float_prop.get()))
                    .setter(|this: &Self, v: f32| this.float_prop.set(v)),
            )
            .property(
                Property::new("str-prop", ValueKind::String, ParamFlags::READWRITE)
                    .getter(|this: &Self| Value::String(this.str_prop.borrow().clone()))
                    .setter(|this: &Self, v: Option<String>| *this.str_prop.borrow_mut() = v),
            )
            .default_constructor()
            .build()
    }
}

std::thread_local! {
    static DERIVED_CONSTRUCTIONS: Cell<usize> = const { Cell::new(0) };
}

/// Number of `TestDerived` constructions on the current thread.
pub(crate) fn derived_constructions() -> usize {
    DERIVED_CONSTRUCTIONS.with(Cell::get)
}

/// Overrides `str-prop` and adds the construct-only `uint64-prop`.
pub(crate) struct TestDerived {
    pub(crate) base: TestBase,
    pub(crate) uint64_prop: u64,
    pub(crate) str_prop: RefCell<Option<String>>,
}

impl TestDerived {
    pub(crate) fn new(uint64_prop: u64) -> Self {
        DERIVED_CONSTRUCTIONS.with(|n| n.set(n.get() + 1));
        Self {
            base: TestBase::default(),
            uint64_prop,
            str_prop: RefCell::new(None),
        }
    }
}

impl ObjectType for TestDerived {
    const TYPE_NAME: &'static str = "TestDerived";

    fn class_info() -> ClassInfo {
        ClassBuilder::<Self>::new()
            .extends(|this: &Self| &this.base)
            .property(
                Property::new("uint64-prop", ValueKind::UInt64, CONSTRUCT_ONLY)
                    .getter(|this: &Self| Value::UInt64(this.uint64_prop)),
            )
            .property(
                Property::new("str-prop", ValueKind::String, ParamFlags::READWRITE)
                    .getter(|this: &Self| Value::String(this.str_prop.borrow().clone()))
                    .setter(|this: &Self, v: Option<String>| *this.str_prop.borrow_mut() = v),
            )
            .constructor(|params| {
                let uint64_prop = params.take_as::<u64>("uint64-prop")?.unwrap_or(4);
                Ok(TestDerived::new(uint64_prop))
            })
            .build()
    }
}

// -----------------------------------------------------------------------------
// Pair

/// Holds a construct-only reference to another pair.
#[derive(Default)]
pub(crate) struct Pair {
    peer: RefCell<Option<ObjectRef>>,
}

impl Pair {
    pub(crate) fn peer(&self) -> Option<ObjectRef> {
        self.peer.borrow().clone()
    }

    /// Unlinks a chain one pair at a time, so dropping it does not recurse.
    pub(crate) fn unlink_chain(head: ObjectRef) -> usize {
        let mut len = 0;
        let mut next = Some(head);
        while let Some(pair) = next {
            len += 1;
            next = pair.downcast_ref::<Pair>().and_then(|p| p.peer.borrow_mut().take());
        }
        len
    }
}

impl ObjectType for Pair {
    const TYPE_NAME: &'static str = "Pair";

    fn class_info() -> ClassInfo {
        ClassBuilder::<Self>::new()
            .property(
                Property::new("peer", ValueKind::Object("Pair"), CONSTRUCT_ONLY)
                    .getter(|this: &Self| Value::Object(this.peer()))
                    .setter(|this: &Self, v: Option<ObjectRef>| *this.peer.borrow_mut() = v),
            )
            .default_constructor()
            .build()
    }
}
