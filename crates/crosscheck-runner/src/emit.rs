//! Generated-test assembly.
//!
//! A run's recorded statements become a complete Rust test file: import
//! lines supplied by the harness, a helper prelude (identity and fault
//! assertions the statements refer to), and the test function itself.
//! Every section can be overridden, so the output drops into whatever
//! test framework the harness uses.

/// Default helper prelude emitted ahead of the test function.
///
/// `assert_same!` compares object identity through `Deref`, which covers
/// plain references, `Box`, and `Rc`. `assert_fault` accepts any panic
/// when no class is given; with a class it checks the panic message
/// mentions it, which is as precise as a standalone test can be. Harnesses
/// with richer fault surfaces substitute their own prelude via
/// [`EmitConfig`].
pub const DEFAULT_HELPERS: &str = r#"#[allow(unused_macros)]
macro_rules! assert_same {
    ($expected:expr, $actual:expr) => {{
        let same = std::ptr::eq(
            (&*$expected) as *const _ as *const u8,
            (&*$actual) as *const _ as *const u8,
        );
        assert!(same, "expected the same object as {}", stringify!($expected));
    }};
}

#[allow(dead_code)]
fn assert_fault<T>(class: Option<&str>, body: impl FnOnce() -> T) {
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _ = body();
    }));
    let Err(payload) = result else {
        panic!("should have faulted");
    };
    if let Some(class) = class {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_default();
        assert!(
            message.contains(class),
            "faulted with the wrong class: {message:?} (expected {class})"
        );
    }
}
"#;

/// How generated tests are rendered.
#[derive(Debug, Clone)]
pub struct EmitConfig {
    /// Name of the emitted test function.
    pub test_name: String,
    /// Import lines placed at the top of the file (e.g. `use sut::Counter;`).
    pub imports: Vec<String>,
    /// Helper prelude placed between the imports and the test function.
    pub helpers: String,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            test_name: "crosscheck_generated".to_string(),
            imports: Vec::new(),
            helpers: DEFAULT_HELPERS.to_string(),
        }
    }
}

impl EmitConfig {
    /// Render a full test file around the recorded statements.
    #[must_use]
    pub fn render(&self, statements: &[String]) -> String {
        let mut out = String::new();
        for import in &self.imports {
            out.push_str(import);
            out.push('\n');
        }
        if !self.imports.is_empty() {
            out.push('\n');
        }
        if !self.helpers.is_empty() {
            out.push_str(self.helpers.trim_end());
            out.push_str("\n\n");
        }
        out.push_str("#[test]\n");
        out.push_str(&format!("fn {}() {{\n", self.test_name));
        for statement in statements {
            out.push_str("    ");
            out.push_str(statement);
            out.push('\n');
        }
        out.push_str("}\n");
        out
    }

    /// Render the trivially-passing test used when no divergence was found.
    #[must_use]
    pub fn render_passing(&self) -> String {
        let mut out = String::new();
        for import in &self.imports {
            out.push_str(import);
            out.push('\n');
        }
        if !self.imports.is_empty() {
            out.push('\n');
        }
        out.push_str("#[test]\n");
        out.push_str(&format!("fn {}() {{\n", self.test_name));
        out.push_str("    // no divergence found within the command budget\n");
        out.push_str("}\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_wraps_statements_in_test_fn() {
        let emit = EmitConfig::default();
        let text = emit.render(&[
            "let mut c0 = Counter::new();".to_string(),
            "assert_eq!(1, c0.increment());".to_string(),
        ]);
        assert!(text.contains("#[test]"));
        assert!(text.contains("fn crosscheck_generated() {"));
        assert!(text.contains("    let mut c0 = Counter::new();"));
        assert!(text.contains("    assert_eq!(1, c0.increment());"));
        assert!(text.trim_end().ends_with('}'));
    }

    #[test]
    fn test_render_includes_helpers() {
        let emit = EmitConfig::default();
        let text = emit.render(&[]);
        assert!(text.contains("macro_rules! assert_same"));
        assert!(text.contains("fn assert_fault"));
    }

    #[test]
    fn test_render_with_imports() {
        let emit = EmitConfig {
            imports: vec!["use sut::Counter;".to_string()],
            ..Default::default()
        };
        let text = emit.render(&["c0.reset();".to_string()]);
        assert!(text.starts_with("use sut::Counter;\n"));
    }

    #[test]
    fn test_render_with_custom_helpers_and_name() {
        let emit = EmitConfig {
            test_name: "regression_417".to_string(),
            helpers: "// project prelude".to_string(),
            ..Default::default()
        };
        let text = emit.render(&[]);
        assert!(text.contains("fn regression_417() {"));
        assert!(text.contains("// project prelude"));
        assert!(!text.contains("assert_fault"));
    }

    #[test]
    fn test_render_empty_helpers_skipped() {
        let emit = EmitConfig {
            helpers: String::new(),
            ..Default::default()
        };
        let text = emit.render(&["c0.reset();".to_string()]);
        assert!(text.starts_with("#[test]\n"));
    }

    #[test]
    fn test_render_passing_has_no_assertions() {
        let emit = EmitConfig::default();
        let text = emit.render_passing();
        assert!(text.contains("no divergence found"));
        assert!(!text.contains("assert_eq!"));
        assert!(!text.contains("assert_same"));
    }

    #[test]
    fn test_default_helpers_mention_both_assertions() {
        assert!(DEFAULT_HELPERS.contains("assert_same"));
        assert!(DEFAULT_HELPERS.contains("assert_fault"));
    }
}
