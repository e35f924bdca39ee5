//! Outcomes of a differential step and the `includes` comparison protocol.
//!
//! The reference side of every step produces an *expected* [`Outcome`]; the
//! SUT side produces an *actual* one. `expected.includes(actual)` decides
//! whether the SUT behavior is acceptable, and as a side effect resolves
//! the expected outcome so it can render the assertion statement for the
//! generated test. Resolution happens exactly once per comparison;
//! re-resolving a choice outcome is a harness programming error and panics.
//!
//! The set of outcome kinds is closed: the comparison rules are exhaustive
//! and must stay that way.

use crate::fault::{Fault, FaultClass};
use crate::literal::LiteralBuilder;
use crate::registry::{same_object, ClassId, Registry, SharedAny};
use crate::scalar::{Scalar, ToScalar};
use std::rc::Rc;

/// Callback invoked when a scalar choice fixes on an answer.
pub type ChoiceNotifier = Box<dyn Fn(&Scalar)>;

/// Callback invoked when an object choice fixes on an answer
/// (`None` = the null possibility was chosen).
pub type ObjectChoiceNotifier = Box<dyn Fn(Option<&SharedAny>)>;

/// The outcome of executing one side of a command.
pub enum Outcome {
    /// Normal termination with a plain value.
    Normal(NormalOutcome),
    /// Abrupt termination with a fault.
    Abrupt(AbruptOutcome),
    /// Normal termination with a registered mutable object.
    Object(ObjectOutcome),
    /// Reference side cannot predict the value uniquely; any member of a
    /// non-empty scalar set is acceptable.
    Choice(ChoiceOutcome),
    /// As `Choice`, over already-registered objects.
    ObjectChoice(ObjectChoiceOutcome),
}

impl std::fmt::Debug for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal(n) => write!(f, "Normal({:?})", n.value),
            Self::Abrupt(a) => write!(f, "Abrupt({:?})", a.fault),
            Self::Object(o) => write!(
                f,
                "Object(class={}, ref={}, sut={})",
                o.class.index(),
                o.refv.is_some(),
                o.sutv.is_some()
            ),
            Self::Choice(c) => write!(f, "Choice({:?})", c.possibilities),
            Self::ObjectChoice(c) => {
                write!(f, "ObjectChoice(class={}, n={})", c.class.index(), c.possibilities.len())
            }
        }
    }
}

impl Outcome {
    /// Normal termination with a value.
    #[must_use]
    pub fn normal(value: impl ToScalar) -> Self {
        Self::from_scalar(value.to_scalar())
    }

    /// Normal termination with an already-converted scalar.
    #[must_use]
    pub fn from_scalar(value: Scalar) -> Self {
        Self::Normal(NormalOutcome { value })
    }

    /// Normal termination of a void operation.
    #[must_use]
    pub fn unit() -> Self {
        Self::from_scalar(Scalar::Unit)
    }

    /// Abrupt termination with a captured fault.
    #[must_use]
    pub fn abrupt(fault: Fault) -> Self {
        Self::Abrupt(AbruptOutcome { fault: Some(fault) })
    }

    /// Expected abrupt termination of any class.
    #[must_use]
    pub fn any_fault() -> Self {
        Self::Abrupt(AbruptOutcome { fault: None })
    }

    /// Expected abrupt termination of a class (or a descendant of it).
    #[must_use]
    pub fn fault_of(class: impl Into<FaultClass>) -> Self {
        Self::Abrupt(AbruptOutcome {
            fault: Some(Fault {
                class: class.into(),
                message: None,
            }),
        })
    }

    /// An object produced by the reference side.
    #[must_use]
    pub fn object_ref(class: ClassId, handle: Option<SharedAny>, nullable: bool) -> Self {
        Self::Object(ObjectOutcome {
            class,
            refv: handle,
            sutv: None,
            nullable,
            state: ObjectState::Unresolved,
        })
    }

    /// An object produced by the SUT side.
    #[must_use]
    pub fn object_sut(class: ClassId, handle: Option<SharedAny>, nullable: bool) -> Self {
        Self::Object(ObjectOutcome {
            class,
            refv: None,
            sutv: handle,
            nullable,
            state: ObjectState::Unresolved,
        })
    }

    /// A scalar choice. Panics if `possibilities` is empty.
    #[must_use]
    pub fn choice(possibilities: Vec<Scalar>) -> Self {
        Self::choice_with(possibilities, None)
    }

    /// A scalar choice with a notifier called when the answer is fixed.
    /// Panics if `possibilities` is empty.
    #[must_use]
    pub fn choice_with(possibilities: Vec<Scalar>, notifier: Option<ChoiceNotifier>) -> Self {
        assert!(
            !possibilities.is_empty(),
            "choice outcome needs at least one possibility"
        );
        Self::Choice(ChoiceOutcome {
            possibilities,
            notifier,
            delegate: None,
        })
    }

    /// An object choice over already-registered instances (`None` entries
    /// stand for the null possibility). Panics if `possibilities` is empty.
    #[must_use]
    pub fn object_choice(class: ClassId, possibilities: Vec<Option<SharedAny>>) -> Self {
        Self::object_choice_with(class, possibilities, None)
    }

    /// An object choice with a notifier. Panics if `possibilities` is empty.
    #[must_use]
    pub fn object_choice_with(
        class: ClassId,
        possibilities: Vec<Option<SharedAny>>,
        notifier: Option<ObjectChoiceNotifier>,
    ) -> Self {
        assert!(
            !possibilities.is_empty(),
            "object choice outcome needs at least one possibility"
        );
        Self::ObjectChoice(ObjectChoiceOutcome {
            class,
            possibilities,
            notifier,
            delegate: None,
        })
    }

    /// Whether this outcome is abrupt.
    #[must_use]
    pub fn is_abrupt(&self) -> bool {
        matches!(self, Self::Abrupt(_))
    }

    /// Whether the SUT outcome is acceptable where this (reference)
    /// outcome was expected. Resolves `self` for later rendering.
    ///
    /// Exactly one side of a comparison may be a choice kind; a choice
    /// compared against a choice panics. Re-resolving a choice panics.
    pub fn includes(&mut self, actual: &Outcome, registry: &mut Registry) -> bool {
        match self {
            Self::Normal(n) => n.includes(actual),
            Self::Abrupt(a) => a.includes(actual),
            Self::Object(o) => o.includes(actual, registry),
            Self::Choice(c) => c.includes(actual),
            Self::ObjectChoice(c) => c.includes(actual, registry),
        }
    }

    /// Render the assertion statement for this (resolved) outcome, given
    /// the expression text of the step.
    #[must_use]
    pub fn gen_assert(&self, lb: &dyn LiteralBuilder, code: &str) -> String {
        match self {
            Self::Normal(n) => n.gen_assert(lb, code),
            Self::Abrupt(a) => a.gen_assert(code),
            Self::Object(o) => o.gen_assert(lb, code),
            Self::Choice(c) => c.delegate().gen_assert(lb, code),
            Self::ObjectChoice(c) => c.delegate().gen_assert(lb, code),
        }
    }

    /// The plain value carried by this outcome, if any. For choice kinds
    /// this is the fixed answer; querying before resolution panics.
    #[must_use]
    pub fn value(&self) -> Option<Scalar> {
        match self {
            Self::Normal(n) => Some(n.value.clone()),
            Self::Abrupt(_) | Self::Object(_) => None,
            Self::Choice(c) => c.delegate().value(),
            Self::ObjectChoice(c) => c.delegate().value(),
        }
    }
}

/// Normal termination with a plain value.
pub struct NormalOutcome {
    value: Scalar,
}

impl NormalOutcome {
    fn includes(&self, actual: &Outcome) -> bool {
        match actual {
            Outcome::Normal(other) => self.value == other.value,
            _ => false,
        }
    }

    fn gen_assert(&self, lb: &dyn LiteralBuilder, code: &str) -> String {
        match &self.value {
            Scalar::Unit => format!("{code}; // should terminate normally"),
            v if v.is_none() => format!("assert_eq!(None, {code});"),
            v => format!("assert_eq!({}, {code});", lb.render_scalar(v)),
        }
    }
}

/// Abrupt termination with a fault.
pub struct AbruptOutcome {
    fault: Option<Fault>,
}

impl AbruptOutcome {
    fn includes(&self, actual: &Outcome) -> bool {
        let Outcome::Abrupt(other) = actual else {
            return false;
        };
        match (&self.fault, &other.fault) {
            (None, _) => true,
            (Some(mine), Some(theirs)) => mine.class.includes(&theirs.class),
            (Some(_), None) => false,
        }
    }

    fn gen_assert(&self, code: &str) -> String {
        match &self.fault {
            None => format!("assert_fault(None, || {{ {code}; }});"),
            Some(f) => format!("assert_fault(Some(\"{}\"), || {{ {code}; }});", f.class),
        }
    }
}

#[derive(Debug)]
enum ObjectState {
    Unresolved,
    /// The expected object is null; the assertion checks absence.
    NullExpected,
    /// First sighting; the pair was registered under this name.
    New(String),
    /// The object was sighted before under this name; identity assertion.
    Existing(String),
    /// Divergent shape (the SUT did not produce a comparable object); the
    /// bare expression reproduces the failure on replay.
    Mismatched,
}

/// Normal termination with a registered mutable object.
pub struct ObjectOutcome {
    class: ClassId,
    refv: Option<SharedAny>,
    sutv: Option<SharedAny>,
    nullable: bool,
    state: ObjectState,
}

impl ObjectOutcome {
    fn includes(&mut self, actual: &Outcome, registry: &mut Registry) -> bool {
        let Outcome::Object(other) = actual else {
            self.state = ObjectState::Mismatched;
            return false;
        };
        assert!(
            other.class == self.class,
            "object outcome compared across different registered classes ({} vs {})",
            registry.type_name(self.class),
            registry.type_name(other.class)
        );
        match (&self.refv, &other.sutv) {
            (None, None) => {
                self.state = ObjectState::NullExpected;
                true
            }
            (None, Some(_)) => {
                self.state = ObjectState::NullExpected;
                false
            }
            (Some(_), None) => {
                self.state = ObjectState::Mismatched;
                false
            }
            (Some(refv), Some(sutv)) => match registry.index_of(self.class, refv) {
                None => {
                    let name =
                        registry.register_object(self.class, Rc::clone(refv), Rc::clone(sutv));
                    self.sutv = Some(Rc::clone(sutv));
                    self.state = ObjectState::New(name);
                    true
                }
                Some(index) => {
                    let expected_sut = registry.sut_handle(self.class, index);
                    let name = registry.instance_identifier(self.class, index);
                    self.state = ObjectState::Existing(name);
                    same_object(sutv, &expected_sut)
                }
            },
        }
    }

    fn gen_assert(&self, lb: &dyn LiteralBuilder, code: &str) -> String {
        match &self.state {
            ObjectState::Unresolved => {
                panic!("object outcome queried before its comparison was evaluated")
            }
            ObjectState::NullExpected => format!("assert!({code}.is_none());"),
            ObjectState::New(name) => {
                if self.nullable {
                    format!("let mut {name} = {code}.unwrap();")
                } else {
                    format!("let mut {name} = {code};")
                }
            }
            ObjectState::Existing(name) => format!("assert_same!({name}, {code});"),
            ObjectState::Mismatched => {
                format!(
                    "{code}; // expected a {} instance",
                    lb.class_type_name(self.class)
                )
            }
        }
    }
}

/// A nondeterministic scalar outcome on the reference side.
pub struct ChoiceOutcome {
    possibilities: Vec<Scalar>,
    notifier: Option<ChoiceNotifier>,
    delegate: Option<Box<Outcome>>,
}

impl ChoiceOutcome {
    fn includes(&mut self, actual: &Outcome) -> bool {
        assert!(
            self.delegate.is_none(),
            "choice outcome already resolved; comparisons are one-shot"
        );
        match actual {
            Outcome::Choice(_) | Outcome::ObjectChoice(_) => {
                panic!("cannot have choice outcomes on both sides of a comparison")
            }
            Outcome::Normal(other) => {
                let observed = other.value.clone();
                if self.possibilities.contains(&observed) {
                    if let Some(notify) = &self.notifier {
                        notify(&observed);
                    }
                    self.delegate = Some(Box::new(Outcome::from_scalar(observed)));
                    true
                } else {
                    self.fix_on_fallback();
                    false
                }
            }
            _ => {
                self.fix_on_fallback();
                false
            }
        }
    }

    fn fix_on_fallback(&mut self) {
        let fallback = self.possibilities[0].clone();
        self.delegate = Some(Box::new(Outcome::from_scalar(fallback)));
    }

    fn delegate(&self) -> &Outcome {
        self.delegate
            .as_deref()
            .expect("choice outcome queried before its comparison was evaluated")
    }
}

/// A nondeterministic object outcome on the reference side. Possibilities
/// must already be registered (plus an optional null entry).
pub struct ObjectChoiceOutcome {
    class: ClassId,
    possibilities: Vec<Option<SharedAny>>,
    notifier: Option<ObjectChoiceNotifier>,
    delegate: Option<Box<Outcome>>,
}

impl ObjectChoiceOutcome {
    fn includes(&mut self, actual: &Outcome, registry: &mut Registry) -> bool {
        assert!(
            self.delegate.is_none(),
            "object choice outcome already resolved; comparisons are one-shot"
        );
        if matches!(actual, Outcome::Choice(_) | Outcome::ObjectChoice(_)) {
            panic!("cannot have choice outcomes on both sides of a comparison");
        }
        if self.possibilities.len() == 1 {
            let only = self.possibilities[0].clone();
            self.notify(only.as_ref());
            return self.fix_on(only, actual, registry);
        }
        if let Outcome::Object(other) = actual {
            match &other.sutv {
                None => {
                    if self.possibilities.iter().any(Option::is_none) {
                        self.notify(None);
                        return self.fix_on(None, actual, registry);
                    }
                }
                Some(sut) => {
                    let chosen = self.possibilities.iter().flatten().find(|refv| {
                        registry
                            .index_of(self.class, refv)
                            .is_some_and(|i| same_object(sut, &registry.sut_handle(self.class, i)))
                    });
                    if let Some(refv) = chosen {
                        let refv = Rc::clone(refv);
                        self.notify(Some(&refv));
                        return self.fix_on(Some(refv), actual, registry);
                    }
                }
            }
        }
        let fallback = self.possibilities[0].clone();
        self.fix_on(fallback, actual, registry);
        false
    }

    fn notify(&self, chosen: Option<&SharedAny>) {
        if let Some(notify) = &self.notifier {
            notify(chosen);
        }
    }

    /// Resolve to one possibility and compare the actual outcome against it.
    fn fix_on(
        &mut self,
        chosen: Option<SharedAny>,
        actual: &Outcome,
        registry: &mut Registry,
    ) -> bool {
        let mut delegate = Outcome::object_ref(self.class, chosen, true);
        let matched = delegate.includes(actual, registry);
        self.delegate = Some(Box::new(delegate));
        matched
    }

    fn delegate(&self) -> &Outcome {
        self.delegate
            .as_deref()
            .expect("object choice outcome queried before its comparison was evaluated")
    }
}
