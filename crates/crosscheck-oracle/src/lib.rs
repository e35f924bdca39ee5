//! Crosscheck Oracle
//!
//! Test-oracle machinery for differential random testing: a command is
//! executed against a trusted reference implementation and a candidate
//! implementation (SUT), and the reference-side outcome decides whether
//! the SUT-side outcome is acceptable.
//!
//! The machinery handles the parts that make this hard in practice:
//! value equality versus reference identity (via per-type dual arenas),
//! implementation-chosen nondeterminism (choice outcomes), abrupt
//! termination (fault capture and class matching), hang detection (the
//! deferrable watchdog), and rendering every step back into compilable
//! test source.
//!
//! The orchestrating loop lives in the `crosscheck-runner` crate; this
//! crate is loop-free and single-threaded apart from the watchdog.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
// Allow common patterns
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::needless_pass_by_value)]
// Allow common patterns in test code
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::redundant_clone))]

pub mod command;
pub mod fault;
pub mod lift;
pub mod literal;
pub mod outcome;
pub mod registry;
pub mod scalar;
pub mod strategies;
pub mod timeout;
pub mod util;

pub use command::{Argument, CallRecipe, Command, ExecFn, Side};
pub use fault::{Fault, FaultClass, PANIC_CLASS};
pub use lift::{
    call0, call0_obj, call0_obj_opt, call0_raw, call1, call2, call3, call_obj, call_obj_scalar,
    construct0, construct1, construct2, try_call0, try_call1,
};
pub use literal::LiteralBuilder;
pub use outcome::{ChoiceNotifier, ObjectChoiceNotifier, Outcome};
pub use registry::{erase, same_object, share, ClassId, Registry, Shared, SharedAny, TestClass};
pub use scalar::{Scalar, ToScalar};
pub use timeout::TimeoutExecutor;
pub use util::permutations;
