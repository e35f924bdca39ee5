//! Cross-implementation object registry.
//!
//! Every logical type whose instances matter by *identity* (not value) is
//! registered once, producing a [`TestClass`] handle. Each registered type
//! owns a dual arena: parallel lists of reference-side and SUT-side
//! objects, addressed by a stable integer index. Generated code names
//! instances `prefix + index`, so bookkeeping and emitted tests agree
//! without ever inspecting memory addresses.
//!
//! The registry is touched only by the single driver thread; it needs no
//! locking.

use std::any::Any;
use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;

/// A mutable object shared between the engine and harness closures.
pub type Shared<T> = Rc<RefCell<T>>;

/// A type-erased handle to a registered object.
pub type SharedAny = Rc<dyn Any>;

/// Wrap a freshly constructed domain object for registration.
#[must_use]
pub fn share<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

/// Erase a shared object handle.
#[must_use]
pub fn erase<T: 'static>(handle: Shared<T>) -> SharedAny {
    handle as SharedAny
}

/// Identity comparison of two erased handles.
#[must_use]
pub fn same_object(a: &SharedAny, b: &SharedAny) -> bool {
    std::ptr::eq(Rc::as_ptr(a).cast::<u8>(), Rc::as_ptr(b).cast::<u8>())
}

/// Index of a registered class within the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId(usize);

impl ClassId {
    /// The raw index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Typed facade over one registered class.
///
/// `R` is the reference-side element type, `S` the SUT-side element type.
/// The handle is `Copy` and is captured freely by command-generator
/// closures.
#[derive(Debug)]
pub struct TestClass<R, S> {
    id: ClassId,
    _marker: PhantomData<fn() -> (R, S)>,
}

impl<R, S> Clone for TestClass<R, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R, S> Copy for TestClass<R, S> {}

impl<R, S> TestClass<R, S> {
    /// The erased class id.
    #[must_use]
    pub const fn id(&self) -> ClassId {
        self.id
    }
}

struct Arena {
    type_name: String,
    prefix: String,
    refs: Vec<SharedAny>,
    suts: Vec<SharedAny>,
}

/// The registry of all classes and their instance arenas.
#[derive(Default)]
pub struct Registry {
    arenas: Vec<Arena>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a logical type.
    ///
    /// `type_name` is the text used for constructor calls in generated code
    /// (e.g. `"Counter"` renders `Counter::new(..)`); `prefix` names
    /// instances (e.g. `"c"` yields `c0`, `c1`, ...).
    pub fn register_class<R: 'static, S: 'static>(
        &mut self,
        type_name: impl Into<String>,
        prefix: impl Into<String>,
    ) -> TestClass<R, S> {
        let id = ClassId(self.arenas.len());
        self.arenas.push(Arena {
            type_name: type_name.into(),
            prefix: prefix.into(),
            refs: Vec::new(),
            suts: Vec::new(),
        });
        TestClass {
            id,
            _marker: PhantomData,
        }
    }

    /// Number of registered classes.
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.arenas.len()
    }

    /// Number of instances registered for a class.
    #[must_use]
    pub fn instance_count(&self, class: ClassId) -> usize {
        self.arena(class).refs.len()
    }

    /// Identity lookup of a reference-side object. `None` if the object was
    /// never registered.
    #[must_use]
    pub fn index_of(&self, class: ClassId, handle: &SharedAny) -> Option<usize> {
        self.arena(class)
            .refs
            .iter()
            .position(|r| same_object(r, handle))
    }

    /// Append a (reference, SUT) pair, returning its stable index.
    pub fn register_pair(&mut self, class: ClassId, refv: SharedAny, sutv: SharedAny) -> usize {
        let arena = self.arena_mut(class);
        let index = arena.refs.len();
        arena.refs.push(refv);
        arena.suts.push(sutv);
        index
    }

    /// The erased reference-side handle at an index.
    #[must_use]
    pub fn ref_handle(&self, class: ClassId, index: usize) -> SharedAny {
        Rc::clone(self.slot(&self.arena(class).refs, class, index))
    }

    /// The erased SUT-side handle at an index.
    #[must_use]
    pub fn sut_handle(&self, class: ClassId, index: usize) -> SharedAny {
        Rc::clone(self.slot(&self.arena(class).suts, class, index))
    }

    /// The typed reference-side object at an index.
    #[must_use]
    pub fn shared_ref<R: 'static, S: 'static>(
        &self,
        class: TestClass<R, S>,
        index: usize,
    ) -> Shared<R> {
        downcast::<R>(self.ref_handle(class.id, index), self.type_name(class.id))
    }

    /// The typed SUT-side object at an index.
    #[must_use]
    pub fn shared_sut<R: 'static, S: 'static>(
        &self,
        class: TestClass<R, S>,
        index: usize,
    ) -> Shared<S> {
        downcast::<S>(self.sut_handle(class.id, index), self.type_name(class.id))
    }

    /// The constructor/type text for a class.
    #[must_use]
    pub fn type_name(&self, class: ClassId) -> &str {
        &self.arena(class).type_name
    }

    /// The variable-name prefix for a class.
    #[must_use]
    pub fn class_prefix(&self, class: ClassId) -> &str {
        &self.arena(class).prefix
    }

    /// The generated-code identifier of the instance at an index.
    #[must_use]
    pub fn instance_identifier(&self, class: ClassId, index: usize) -> String {
        let arena = self.arena(class);
        format!("{}{}", arena.prefix, index)
    }

    /// Drop every registered instance of every class, keeping the classes.
    /// Called between generated sequences.
    pub fn clear(&mut self) {
        for arena in &mut self.arenas {
            arena.refs.clear();
            arena.suts.clear();
        }
    }

    fn arena(&self, class: ClassId) -> &Arena {
        self.arenas
            .get(class.0)
            .unwrap_or_else(|| panic!("unknown registered class id {}", class.0))
    }

    fn arena_mut(&mut self, class: ClassId) -> &mut Arena {
        self.arenas
            .get_mut(class.0)
            .unwrap_or_else(|| panic!("unknown registered class id {}", class.0))
    }

    fn slot<'a>(&self, list: &'a [SharedAny], class: ClassId, index: usize) -> &'a SharedAny {
        list.get(index).unwrap_or_else(|| {
            panic!(
                "no instance {} registered for class {} ({} registered)",
                index,
                self.type_name(class),
                list.len()
            )
        })
    }
}

fn downcast<T: 'static>(handle: SharedAny, type_name: &str) -> Shared<T> {
    handle.downcast::<RefCell<T>>().unwrap_or_else(|_| {
        panic!(
            "registered class {type_name} does not hold objects of the requested Rust type"
        )
    })
}
