//! Builders that lift plain reference/SUT call pairs into [`Command`]s.
//!
//! Every builder captures the typed closures a harness supplies, wraps
//! them in panic capture, and packages them with a rendering recipe. The
//! receiver and any object argument are fetched from the registry at
//! execution time, so the SUT side always sees the SUT counterpart of
//! whatever instance the reference side saw — that translation is the
//! whole point of the registry.
//!
//! Scalar-result builders hand the closure a `&mut` borrow of the domain
//! object; object-result and raw builders hand it the shared handle so it
//! can return an existing instance when the operation does.

use crate::command::{Argument, CallRecipe, Command, ExecFn};
use crate::fault::Fault;
use crate::outcome::Outcome;
use crate::registry::{erase, share, Shared, TestClass};
use crate::scalar::ToScalar;
use std::borrow::Cow;
use std::panic::{catch_unwind, AssertUnwindSafe};

fn guard<T: ToScalar>(f: impl FnOnce() -> T) -> Outcome {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(v) => Outcome::normal(v),
        Err(payload) => Outcome::abrupt(Fault::from_panic(payload)),
    }
}

fn guard_try<T: ToScalar, E: Into<Fault>>(f: impl FnOnce() -> Result<T, E>) -> Outcome {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(v)) => Outcome::normal(v),
        Ok(Err(e)) => Outcome::abrupt(e.into()),
        Err(payload) => Outcome::abrupt(Fault::from_panic(payload)),
    }
}

/// A zero-argument constructor command for a registered class.
pub fn construct0<R, S>(
    tc: TestClass<R, S>,
    make_ref: impl Fn() -> R + 'static,
    make_sut: impl Fn() -> S + 'static,
) -> Command
where
    R: 'static,
    S: 'static,
{
    let recipe = CallRecipe::Construct {
        class: tc.id(),
        args: vec![],
    };
    let on_ref: ExecFn = Box::new(move |_| match catch_unwind(AssertUnwindSafe(|| make_ref())) {
        Ok(v) => Outcome::object_ref(tc.id(), Some(erase(share(v))), false),
        Err(payload) => Outcome::abrupt(Fault::from_panic(payload)),
    });
    let on_sut: ExecFn = Box::new(move |_| match catch_unwind(AssertUnwindSafe(|| make_sut())) {
        Ok(v) => Outcome::object_sut(tc.id(), Some(erase(share(v))), false),
        Err(payload) => Outcome::abrupt(Fault::from_panic(payload)),
    });
    Command::new(recipe, on_ref, on_sut)
}

/// A one-argument constructor command for a registered class.
pub fn construct1<R, S, A>(
    tc: TestClass<R, S>,
    arg: A,
    make_ref: impl Fn(&A) -> R + 'static,
    make_sut: impl Fn(&A) -> S + 'static,
) -> Command
where
    R: 'static,
    S: 'static,
    A: ToScalar + Clone + 'static,
{
    let recipe = CallRecipe::Construct {
        class: tc.id(),
        args: vec![arg.to_scalar()],
    };
    let a_ref = arg.clone();
    let on_ref: ExecFn = Box::new(move |_| {
        match catch_unwind(AssertUnwindSafe(|| make_ref(&a_ref))) {
            Ok(v) => Outcome::object_ref(tc.id(), Some(erase(share(v))), false),
            Err(payload) => Outcome::abrupt(Fault::from_panic(payload)),
        }
    });
    let on_sut: ExecFn = Box::new(move |_| {
        match catch_unwind(AssertUnwindSafe(|| make_sut(&arg))) {
            Ok(v) => Outcome::object_sut(tc.id(), Some(erase(share(v))), false),
            Err(payload) => Outcome::abrupt(Fault::from_panic(payload)),
        }
    });
    Command::new(recipe, on_ref, on_sut)
}

/// A two-argument constructor command for a registered class.
pub fn construct2<R, S, A, B>(
    tc: TestClass<R, S>,
    arg1: A,
    arg2: B,
    make_ref: impl Fn(&A, &B) -> R + 'static,
    make_sut: impl Fn(&A, &B) -> S + 'static,
) -> Command
where
    R: 'static,
    S: 'static,
    A: ToScalar + Clone + 'static,
    B: ToScalar + Clone + 'static,
{
    let recipe = CallRecipe::Construct {
        class: tc.id(),
        args: vec![arg1.to_scalar(), arg2.to_scalar()],
    };
    let (a_ref, b_ref) = (arg1.clone(), arg2.clone());
    let on_ref: ExecFn = Box::new(move |_| {
        match catch_unwind(AssertUnwindSafe(|| make_ref(&a_ref, &b_ref))) {
            Ok(v) => Outcome::object_ref(tc.id(), Some(erase(share(v))), false),
            Err(payload) => Outcome::abrupt(Fault::from_panic(payload)),
        }
    });
    let on_sut: ExecFn = Box::new(move |_| {
        match catch_unwind(AssertUnwindSafe(|| make_sut(&arg1, &arg2))) {
            Ok(v) => Outcome::object_sut(tc.id(), Some(erase(share(v))), false),
            Err(payload) => Outcome::abrupt(Fault::from_panic(payload)),
        }
    });
    Command::new(recipe, on_ref, on_sut)
}

/// A no-argument method call with a plain result.
pub fn call0<R, S, T>(
    tc: TestClass<R, S>,
    receiver: usize,
    method: impl Into<Cow<'static, str>>,
    rf: impl Fn(&mut R) -> T + 'static,
    sf: impl Fn(&mut S) -> T + 'static,
) -> Command
where
    R: 'static,
    S: 'static,
    T: ToScalar,
{
    let recipe = CallRecipe::Method {
        class: tc.id(),
        receiver,
        method: method.into(),
        args: vec![],
    };
    let on_ref: ExecFn = Box::new(move |reg| {
        let h = reg.shared_ref(tc, receiver);
        guard(|| rf(&mut h.borrow_mut()))
    });
    let on_sut: ExecFn = Box::new(move |reg| {
        let h = reg.shared_sut(tc, receiver);
        guard(|| sf(&mut h.borrow_mut()))
    });
    Command::new(recipe, on_ref, on_sut)
}

/// A one-scalar-argument method call with a plain result.
pub fn call1<R, S, A, T>(
    tc: TestClass<R, S>,
    receiver: usize,
    method: impl Into<Cow<'static, str>>,
    arg: A,
    rf: impl Fn(&mut R, &A) -> T + 'static,
    sf: impl Fn(&mut S, &A) -> T + 'static,
) -> Command
where
    R: 'static,
    S: 'static,
    A: ToScalar + Clone + 'static,
    T: ToScalar,
{
    let recipe = CallRecipe::Method {
        class: tc.id(),
        receiver,
        method: method.into(),
        args: vec![Argument::Scalar(arg.to_scalar())],
    };
    let a_ref = arg.clone();
    let on_ref: ExecFn = Box::new(move |reg| {
        let h = reg.shared_ref(tc, receiver);
        guard(|| rf(&mut h.borrow_mut(), &a_ref))
    });
    let on_sut: ExecFn = Box::new(move |reg| {
        let h = reg.shared_sut(tc, receiver);
        guard(|| sf(&mut h.borrow_mut(), &arg))
    });
    Command::new(recipe, on_ref, on_sut)
}

/// A two-scalar-argument method call with a plain result.
pub fn call2<R, S, A, B, T>(
    tc: TestClass<R, S>,
    receiver: usize,
    method: impl Into<Cow<'static, str>>,
    arg1: A,
    arg2: B,
    rf: impl Fn(&mut R, &A, &B) -> T + 'static,
    sf: impl Fn(&mut S, &A, &B) -> T + 'static,
) -> Command
where
    R: 'static,
    S: 'static,
    A: ToScalar + Clone + 'static,
    B: ToScalar + Clone + 'static,
    T: ToScalar,
{
    let recipe = CallRecipe::Method {
        class: tc.id(),
        receiver,
        method: method.into(),
        args: vec![
            Argument::Scalar(arg1.to_scalar()),
            Argument::Scalar(arg2.to_scalar()),
        ],
    };
    let (a_ref, b_ref) = (arg1.clone(), arg2.clone());
    let on_ref: ExecFn = Box::new(move |reg| {
        let h = reg.shared_ref(tc, receiver);
        guard(|| rf(&mut h.borrow_mut(), &a_ref, &b_ref))
    });
    let on_sut: ExecFn = Box::new(move |reg| {
        let h = reg.shared_sut(tc, receiver);
        guard(|| sf(&mut h.borrow_mut(), &arg1, &arg2))
    });
    Command::new(recipe, on_ref, on_sut)
}

/// A three-scalar-argument method call with a plain result.
#[allow(clippy::too_many_arguments)]
pub fn call3<R, S, A, B, C, T>(
    tc: TestClass<R, S>,
    receiver: usize,
    method: impl Into<Cow<'static, str>>,
    arg1: A,
    arg2: B,
    arg3: C,
    rf: impl Fn(&mut R, &A, &B, &C) -> T + 'static,
    sf: impl Fn(&mut S, &A, &B, &C) -> T + 'static,
) -> Command
where
    R: 'static,
    S: 'static,
    A: ToScalar + Clone + 'static,
    B: ToScalar + Clone + 'static,
    C: ToScalar + Clone + 'static,
    T: ToScalar,
{
    let recipe = CallRecipe::Method {
        class: tc.id(),
        receiver,
        method: method.into(),
        args: vec![
            Argument::Scalar(arg1.to_scalar()),
            Argument::Scalar(arg2.to_scalar()),
            Argument::Scalar(arg3.to_scalar()),
        ],
    };
    let (a_ref, b_ref, c_ref) = (arg1.clone(), arg2.clone(), arg3.clone());
    let on_ref: ExecFn = Box::new(move |reg| {
        let h = reg.shared_ref(tc, receiver);
        guard(|| rf(&mut h.borrow_mut(), &a_ref, &b_ref, &c_ref))
    });
    let on_sut: ExecFn = Box::new(move |reg| {
        let h = reg.shared_sut(tc, receiver);
        guard(|| sf(&mut h.borrow_mut(), &arg1, &arg2, &arg3))
    });
    Command::new(recipe, on_ref, on_sut)
}

/// A no-argument fallible method call; `Err` becomes an abrupt outcome.
pub fn try_call0<R, S, T, E, F>(
    tc: TestClass<R, S>,
    receiver: usize,
    method: impl Into<Cow<'static, str>>,
    rf: impl Fn(&mut R) -> Result<T, E> + 'static,
    sf: impl Fn(&mut S) -> Result<T, F> + 'static,
) -> Command
where
    R: 'static,
    S: 'static,
    T: ToScalar,
    E: Into<Fault>,
    F: Into<Fault>,
{
    let recipe = CallRecipe::Method {
        class: tc.id(),
        receiver,
        method: method.into(),
        args: vec![],
    };
    let on_ref: ExecFn = Box::new(move |reg| {
        let h = reg.shared_ref(tc, receiver);
        guard_try(|| rf(&mut h.borrow_mut()))
    });
    let on_sut: ExecFn = Box::new(move |reg| {
        let h = reg.shared_sut(tc, receiver);
        guard_try(|| sf(&mut h.borrow_mut()))
    });
    Command::new(recipe, on_ref, on_sut)
}

/// A one-scalar-argument fallible method call.
pub fn try_call1<R, S, A, T, E, F>(
    tc: TestClass<R, S>,
    receiver: usize,
    method: impl Into<Cow<'static, str>>,
    arg: A,
    rf: impl Fn(&mut R, &A) -> Result<T, E> + 'static,
    sf: impl Fn(&mut S, &A) -> Result<T, F> + 'static,
) -> Command
where
    R: 'static,
    S: 'static,
    A: ToScalar + Clone + 'static,
    T: ToScalar,
    E: Into<Fault>,
    F: Into<Fault>,
{
    let recipe = CallRecipe::Method {
        class: tc.id(),
        receiver,
        method: method.into(),
        args: vec![Argument::Scalar(arg.to_scalar())],
    };
    let a_ref = arg.clone();
    let on_ref: ExecFn = Box::new(move |reg| {
        let h = reg.shared_ref(tc, receiver);
        guard_try(|| rf(&mut h.borrow_mut(), &a_ref))
    });
    let on_sut: ExecFn = Box::new(move |reg| {
        let h = reg.shared_sut(tc, receiver);
        guard_try(|| sf(&mut h.borrow_mut(), &arg))
    });
    Command::new(recipe, on_ref, on_sut)
}

/// A method call whose single argument is itself a registered object.
///
/// The argument index is translated per side: the reference closure
/// receives the reference counterpart, the SUT closure the SUT one.
pub fn call_obj<R, S, AR, AS, T>(
    tc: TestClass<R, S>,
    receiver: usize,
    arg_class: TestClass<AR, AS>,
    arg_index: usize,
    method: impl Into<Cow<'static, str>>,
    rf: impl Fn(&mut R, &Shared<AR>) -> T + 'static,
    sf: impl Fn(&mut S, &Shared<AS>) -> T + 'static,
) -> Command
where
    R: 'static,
    S: 'static,
    AR: 'static,
    AS: 'static,
    T: ToScalar,
{
    let recipe = CallRecipe::Method {
        class: tc.id(),
        receiver,
        method: method.into(),
        args: vec![Argument::Object {
            class: arg_class.id(),
            index: arg_index,
        }],
    };
    let on_ref: ExecFn = Box::new(move |reg| {
        let h = reg.shared_ref(tc, receiver);
        let arg = reg.shared_ref(arg_class, arg_index);
        guard(|| rf(&mut h.borrow_mut(), &arg))
    });
    let on_sut: ExecFn = Box::new(move |reg| {
        let h = reg.shared_sut(tc, receiver);
        let arg = reg.shared_sut(arg_class, arg_index);
        guard(|| sf(&mut h.borrow_mut(), &arg))
    });
    Command::new(recipe, on_ref, on_sut)
}

/// A method call taking a registered object plus one scalar.
#[allow(clippy::too_many_arguments)]
pub fn call_obj_scalar<R, S, AR, AS, C, T>(
    tc: TestClass<R, S>,
    receiver: usize,
    arg_class: TestClass<AR, AS>,
    arg_index: usize,
    extra: C,
    method: impl Into<Cow<'static, str>>,
    rf: impl Fn(&mut R, &Shared<AR>, &C) -> T + 'static,
    sf: impl Fn(&mut S, &Shared<AS>, &C) -> T + 'static,
) -> Command
where
    R: 'static,
    S: 'static,
    AR: 'static,
    AS: 'static,
    C: ToScalar + Clone + 'static,
    T: ToScalar,
{
    let recipe = CallRecipe::Method {
        class: tc.id(),
        receiver,
        method: method.into(),
        args: vec![
            Argument::Object {
                class: arg_class.id(),
                index: arg_index,
            },
            Argument::Scalar(extra.to_scalar()),
        ],
    };
    let c_ref = extra.clone();
    let on_ref: ExecFn = Box::new(move |reg| {
        let h = reg.shared_ref(tc, receiver);
        let arg = reg.shared_ref(arg_class, arg_index);
        guard(|| rf(&mut h.borrow_mut(), &arg, &c_ref))
    });
    let on_sut: ExecFn = Box::new(move |reg| {
        let h = reg.shared_sut(tc, receiver);
        let arg = reg.shared_sut(arg_class, arg_index);
        guard(|| sf(&mut h.borrow_mut(), &arg, &extra))
    });
    Command::new(recipe, on_ref, on_sut)
}

/// A no-argument method call whose result is a registered object
/// (e.g. obtaining an iterator). The closures receive the shared receiver
/// handle so they can return an existing instance when the operation does.
pub fn call0_obj<R, S, RO, SO>(
    tc: TestClass<R, S>,
    receiver: usize,
    out: TestClass<RO, SO>,
    method: impl Into<Cow<'static, str>>,
    rf: impl Fn(&Shared<R>) -> Shared<RO> + 'static,
    sf: impl Fn(&Shared<S>) -> Shared<SO> + 'static,
) -> Command
where
    R: 'static,
    S: 'static,
    RO: 'static,
    SO: 'static,
{
    let recipe = CallRecipe::Method {
        class: tc.id(),
        receiver,
        method: method.into(),
        args: vec![],
    };
    let on_ref: ExecFn = Box::new(move |reg| {
        let h = reg.shared_ref(tc, receiver);
        match catch_unwind(AssertUnwindSafe(|| rf(&h))) {
            Ok(v) => Outcome::object_ref(out.id(), Some(erase(v)), false),
            Err(payload) => Outcome::abrupt(Fault::from_panic(payload)),
        }
    });
    let on_sut: ExecFn = Box::new(move |reg| {
        let h = reg.shared_sut(tc, receiver);
        match catch_unwind(AssertUnwindSafe(|| sf(&h))) {
            Ok(v) => Outcome::object_sut(out.id(), Some(erase(v)), false),
            Err(payload) => Outcome::abrupt(Fault::from_panic(payload)),
        }
    });
    Command::new(recipe, on_ref, on_sut)
}

/// As [`call0_obj`] for operations returning an optional object.
pub fn call0_obj_opt<R, S, RO, SO>(
    tc: TestClass<R, S>,
    receiver: usize,
    out: TestClass<RO, SO>,
    method: impl Into<Cow<'static, str>>,
    rf: impl Fn(&Shared<R>) -> Option<Shared<RO>> + 'static,
    sf: impl Fn(&Shared<S>) -> Option<Shared<SO>> + 'static,
) -> Command
where
    R: 'static,
    S: 'static,
    RO: 'static,
    SO: 'static,
{
    let recipe = CallRecipe::Method {
        class: tc.id(),
        receiver,
        method: method.into(),
        args: vec![],
    };
    let on_ref: ExecFn = Box::new(move |reg| {
        let h = reg.shared_ref(tc, receiver);
        match catch_unwind(AssertUnwindSafe(|| rf(&h))) {
            Ok(v) => Outcome::object_ref(out.id(), v.map(erase), true),
            Err(payload) => Outcome::abrupt(Fault::from_panic(payload)),
        }
    });
    let on_sut: ExecFn = Box::new(move |reg| {
        let h = reg.shared_sut(tc, receiver);
        match catch_unwind(AssertUnwindSafe(|| sf(&h))) {
            Ok(v) => Outcome::object_sut(out.id(), v.map(erase), true),
            Err(payload) => Outcome::abrupt(Fault::from_panic(payload)),
        }
    });
    Command::new(recipe, on_ref, on_sut)
}

/// A no-argument call whose closures are already lifted to [`Outcome`].
///
/// This is the escape hatch for reference models that cannot predict the
/// SUT uniquely: the reference closure returns a choice outcome built with
/// [`Outcome::choice_with`] or [`Outcome::object_choice_with`]. Panics are
/// still captured on both sides.
pub fn call0_raw<R, S>(
    tc: TestClass<R, S>,
    receiver: usize,
    method: impl Into<Cow<'static, str>>,
    rf: impl Fn(&Shared<R>) -> Outcome + 'static,
    sf: impl Fn(&Shared<S>) -> Outcome + 'static,
) -> Command
where
    R: 'static,
    S: 'static,
{
    let recipe = CallRecipe::Method {
        class: tc.id(),
        receiver,
        method: method.into(),
        args: vec![],
    };
    let on_ref: ExecFn = Box::new(move |reg| {
        let h = reg.shared_ref(tc, receiver);
        match catch_unwind(AssertUnwindSafe(|| rf(&h))) {
            Ok(outcome) => outcome,
            Err(payload) => Outcome::abrupt(Fault::from_panic(payload)),
        }
    });
    let on_sut: ExecFn = Box::new(move |reg| {
        let h = reg.shared_sut(tc, receiver);
        match catch_unwind(AssertUnwindSafe(|| sf(&h))) {
            Ok(outcome) => outcome,
            Err(payload) => Outcome::abrupt(Fault::from_panic(payload)),
        }
    });
    Command::new(recipe, on_ref, on_sut)
}
