//! One invocable differential operation.
//!
//! A [`Command`] pairs a *recipe* (how the step renders as source text:
//! constructor or method call, receiver, arguments) with two erased
//! executors, one per side. Commands are immutable once built; the
//! [`crate::lift`] builders are the only intended way to make them.

use crate::literal::LiteralBuilder;
use crate::outcome::Outcome;
use crate::registry::{ClassId, Registry};
use crate::scalar::Scalar;
use std::borrow::Cow;

/// Which implementation a command is executed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The trusted reference implementation.
    Reference,
    /// The candidate implementation under test.
    Sut,
}

/// An argument position of a rendered call.
#[derive(Debug, Clone)]
pub enum Argument {
    /// A plain value, rendered as a literal.
    Scalar(Scalar),
    /// A registered object, rendered as its instance identifier.
    Object {
        /// The argument's registered class.
        class: ClassId,
        /// The instance index within that class.
        index: usize,
    },
}

/// How a command renders as generated-test source text.
#[derive(Debug, Clone)]
pub enum CallRecipe {
    /// `Type::new(args…)` — a constructor of a registered class.
    Construct {
        /// The class being constructed.
        class: ClassId,
        /// Constructor arguments.
        args: Vec<Scalar>,
    },
    /// `recvN.method(args…)` — a method call on a registered instance.
    Method {
        /// The receiver's registered class.
        class: ClassId,
        /// The receiver's instance index.
        receiver: usize,
        /// Method name as it appears in generated code.
        method: Cow<'static, str>,
        /// Call arguments.
        args: Vec<Argument>,
    },
}

impl CallRecipe {
    /// Render the call expression (no trailing semicolon).
    #[must_use]
    pub fn render(&self, lb: &dyn LiteralBuilder) -> String {
        match self {
            Self::Construct { class, args } => {
                let rendered: Vec<String> = args.iter().map(|a| lb.render_scalar(a)).collect();
                format!("{}::new({})", lb.class_type_name(*class), rendered.join(", "))
            }
            Self::Method {
                class,
                receiver,
                method,
                args,
            } => {
                let rendered: Vec<String> = args
                    .iter()
                    .map(|a| match a {
                        Argument::Scalar(s) => lb.render_scalar(s),
                        Argument::Object { class, index } => lb.identifier_at(*class, *index),
                    })
                    .collect();
                format!(
                    "{}.{}({})",
                    lb.identifier_at(*class, *receiver),
                    method,
                    rendered.join(", ")
                )
            }
        }
    }
}

/// Executor for one side of a command.
pub type ExecFn = Box<dyn Fn(&Registry) -> Outcome>;

/// One invocable operation with a reference-side and a SUT-side execution
/// path and a source rendering.
pub struct Command {
    recipe: CallRecipe,
    on_ref: ExecFn,
    on_sut: ExecFn,
}

impl Command {
    /// Assemble a command from a recipe and its two executors.
    #[must_use]
    pub fn new(recipe: CallRecipe, on_ref: ExecFn, on_sut: ExecFn) -> Self {
        Self {
            recipe,
            on_ref,
            on_sut,
        }
    }

    /// Execute against one side, producing that side's outcome.
    #[must_use]
    pub fn execute(&self, side: Side, registry: &Registry) -> Outcome {
        match side {
            Side::Reference => (self.on_ref)(registry),
            Side::Sut => (self.on_sut)(registry),
        }
    }

    /// Render the step as source text.
    #[must_use]
    pub fn code(&self, lb: &dyn LiteralBuilder) -> String {
        self.recipe.render(lb)
    }

    /// The rendering recipe.
    #[must_use]
    pub fn recipe(&self) -> &CallRecipe {
        &self.recipe
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command").field("recipe", &self.recipe).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{erase, share, TestClass};

    fn setup() -> (Registry, TestClass<i64, i64>) {
        let mut reg = Registry::new();
        let tc = reg.register_class::<i64, i64>("Counter", "c");
        reg.register_pair(tc.id(), erase(share(0i64)), erase(share(0i64)));
        reg.register_pair(tc.id(), erase(share(0i64)), erase(share(0i64)));
        (reg, tc)
    }

    #[test]
    fn test_render_construct_no_args() {
        let (reg, tc) = setup();
        let recipe = CallRecipe::Construct {
            class: tc.id(),
            args: vec![],
        };
        assert_eq!(recipe.render(&reg), "Counter::new()");
    }

    #[test]
    fn test_render_construct_with_args() {
        let (reg, tc) = setup();
        let recipe = CallRecipe::Construct {
            class: tc.id(),
            args: vec![Scalar::Int(3), Scalar::Text("x".into())],
        };
        assert_eq!(recipe.render(&reg), "Counter::new(3, \"x\")");
    }

    #[test]
    fn test_render_method_scalar_args() {
        let (reg, tc) = setup();
        let recipe = CallRecipe::Method {
            class: tc.id(),
            receiver: 1,
            method: "add".into(),
            args: vec![Argument::Scalar(Scalar::Int(5))],
        };
        assert_eq!(recipe.render(&reg), "c1.add(5)");
    }

    #[test]
    fn test_render_method_object_arg() {
        let (reg, tc) = setup();
        let recipe = CallRecipe::Method {
            class: tc.id(),
            receiver: 0,
            method: "merge".into(),
            args: vec![Argument::Object {
                class: tc.id(),
                index: 1,
            }],
        };
        assert_eq!(recipe.render(&reg), "c0.merge(c1)");
    }

    #[test]
    fn test_render_method_no_args() {
        let (reg, tc) = setup();
        let recipe = CallRecipe::Method {
            class: tc.id(),
            receiver: 0,
            method: "increment".into(),
            args: vec![],
        };
        assert_eq!(recipe.render(&reg), "c0.increment()");
    }

    #[test]
    fn test_execute_dispatches_by_side() {
        let (reg, tc) = setup();
        let recipe = CallRecipe::Method {
            class: tc.id(),
            receiver: 0,
            method: "probe".into(),
            args: vec![],
        };
        let cmd = Command::new(
            recipe,
            Box::new(|_| Outcome::normal(1i64)),
            Box::new(|_| Outcome::normal(2i64)),
        );
        assert_eq!(
            cmd.execute(Side::Reference, &reg).value(),
            Some(Scalar::Int(1))
        );
        assert_eq!(cmd.execute(Side::Sut, &reg).value(), Some(Scalar::Int(2)));
    }

    #[test]
    fn test_command_debug_shows_recipe() {
        let (_, tc) = setup();
        let cmd = Command::new(
            CallRecipe::Construct {
                class: tc.id(),
                args: vec![],
            },
            Box::new(|_| Outcome::unit()),
            Box::new(|_| Outcome::unit()),
        );
        assert!(format!("{cmd:?}").contains("Construct"));
    }
}
