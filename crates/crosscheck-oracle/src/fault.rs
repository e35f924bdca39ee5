//! Abrupt-termination model.
//!
//! When either side of a differential step panics or returns an error, the
//! lifters capture it as a [`Fault`]. Faults are matched by class: a
//! reference-side expectation may name a class (possibly a broad one) or
//! accept any fault at all.
//!
//! Fault classes are hierarchical path names: `"arith"` includes
//! `"arith::overflow"` but not `"arithmetic"`. This gives the
//! "same or narrower class" matching rule a reflection-free encoding.

use std::borrow::Cow;
use thiserror::Error;

/// Class name reserved for faults captured from panics.
pub const PANIC_CLASS: &str = "panic";

/// A hierarchical fault-class name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultClass(Cow<'static, str>);

impl FaultClass {
    /// Create a fault class from its path name.
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// The path name of this class.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Whether a fault of class `other` is acceptable where this class is
    /// expected: `other` must be this class or a descendant of it.
    #[must_use]
    pub fn includes(&self, other: &FaultClass) -> bool {
        other.0 == self.0
            || (other.0.starts_with(self.0.as_ref())
                && other.0[self.0.len()..].starts_with("::"))
    }
}

impl std::fmt::Display for FaultClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for FaultClass {
    fn from(name: &'static str) -> Self {
        Self::new(name)
    }
}

impl From<String> for FaultClass {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// An abrupt termination captured from one side of a differential step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("fault[{class}]{}", message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
pub struct Fault {
    /// The class of the fault.
    pub class: FaultClass,
    /// Free-form detail, when one was available.
    pub message: Option<String>,
}

impl Fault {
    /// Create a fault with a class and message.
    #[must_use]
    pub fn new(class: impl Into<FaultClass>, message: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            message: Some(message.into()),
        }
    }

    /// Create a fault with a class and no message.
    #[must_use]
    pub fn of(class: impl Into<FaultClass>) -> Self {
        Self {
            class: class.into(),
            message: None,
        }
    }

    /// Capture a panic payload as a fault of class [`PANIC_CLASS`].
    #[must_use]
    pub fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned());
        Self {
            class: FaultClass::new(PANIC_CLASS),
            message,
        }
    }
}

impl From<String> for Fault {
    fn from(message: String) -> Self {
        Self::new("error", message)
    }
}

impl From<&str> for Fault {
    fn from(message: &str) -> Self {
        Self::new("error", message)
    }
}
