//! Value-to-source-text contract.
//!
//! The code generator needs two services: turn plain values into literal
//! expression text, and turn registered mutable objects into the stable
//! variable names assigned when they were first sighted. [`Registry`]
//! provides both; the trait exists so outcome rendering depends only on
//! this seam.

use crate::registry::{ClassId, Registry, SharedAny};
use crate::scalar::Scalar;

/// Converts runtime values into source text and manages names for
/// registered mutable objects.
pub trait LiteralBuilder {
    /// Literal text for a plain value.
    fn render_scalar(&self, value: &Scalar) -> String {
        value.literal()
    }

    /// The registered name of a reference-side object, or `None` if it has
    /// not been sighted yet.
    fn object_identifier(&self, class: ClassId, handle: &SharedAny) -> Option<String>;

    /// Register a fresh (reference, SUT) pair and return its new name.
    fn register_object(&mut self, class: ClassId, refv: SharedAny, sutv: SharedAny) -> String;

    /// The SUT counterpart of a previously named object.
    fn sut_counterpart(&self, class: ClassId, identifier: &str) -> Option<SharedAny>;

    /// The type text of a registered class.
    fn class_type_name(&self, class: ClassId) -> String;

    /// The name of the instance at an index of a class.
    fn identifier_at(&self, class: ClassId, index: usize) -> String;
}

impl LiteralBuilder for Registry {
    fn object_identifier(&self, class: ClassId, handle: &SharedAny) -> Option<String> {
        self.index_of(class, handle)
            .map(|i| self.instance_identifier(class, i))
    }

    fn register_object(&mut self, class: ClassId, refv: SharedAny, sutv: SharedAny) -> String {
        let index = self.register_pair(class, refv, sutv);
        self.instance_identifier(class, index)
    }

    fn sut_counterpart(&self, class: ClassId, identifier: &str) -> Option<SharedAny> {
        let index: usize = identifier
            .strip_prefix(self.class_prefix(class))?
            .parse()
            .ok()?;
        if index < self.instance_count(class) {
            Some(self.sut_handle(class, index))
        } else {
            None
        }
    }

    fn class_type_name(&self, class: ClassId) -> String {
        self.type_name(class).to_string()
    }

    fn identifier_at(&self, class: ClassId, index: usize) -> String {
        self.instance_identifier(class, index)
    }
}
