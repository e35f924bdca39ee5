//! The closed universe of plain values.
//!
//! Everything a command can take or return that is *not* a registered
//! mutable object lives in [`Scalar`]: unit, booleans, integers,
//! characters, strings, lists, optionals, and opaque harness value types.
//! Scalars compare structurally and render to Rust expression text that
//! reproduces the value when pasted into a generated test.

/// A plain value observed as a command argument or result.
///
/// Lists compare element-wise with fixed length. `Custom` values compare by
/// their canonical literal: two harness values are considered equal exactly
/// when they render to the same constructor expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    /// Normal termination of an operation with no interesting value.
    Unit,
    /// A boolean value.
    Bool(bool),
    /// Any integer value (all machine integer types normalize here).
    Int(i64),
    /// A character value.
    Char(char),
    /// A string value.
    Text(String),
    /// A fixed-length list of scalars.
    List(Vec<Scalar>),
    /// A nullable value; `None` is the null of the value universe.
    Opt(Option<Box<Scalar>>),
    /// An opaque harness value type, carried as its source literal.
    Custom {
        /// Rust expression text that evaluates to the value.
        literal: String,
    },
}

impl Scalar {
    /// Wrap a harness value type given its canonical constructor text.
    #[must_use]
    pub fn custom(literal: impl Into<String>) -> Self {
        Self::Custom {
            literal: literal.into(),
        }
    }

    /// The present form of an optional scalar.
    #[must_use]
    pub fn some(value: Scalar) -> Self {
        Self::Opt(Some(Box::new(value)))
    }

    /// The absent form of an optional scalar.
    #[must_use]
    pub const fn none() -> Self {
        Self::Opt(None)
    }

    /// Whether this scalar is the unit value.
    #[must_use]
    pub const fn is_unit(&self) -> bool {
        matches!(self, Self::Unit)
    }

    /// Whether this scalar is an absent optional.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::Opt(None))
    }

    /// Render this value as Rust expression text.
    #[must_use]
    pub fn literal(&self) -> String {
        match self {
            Self::Unit => "()".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Char(c) => format!("'{}'", escape_char(*c)),
            Self::Text(s) => {
                let mut out = String::with_capacity(s.len() + 2);
                out.push('"');
                for c in s.chars() {
                    out.push_str(&escape_in_string(c));
                }
                out.push('"');
                out
            }
            Self::List(items) => {
                let inner: Vec<String> = items.iter().map(Scalar::literal).collect();
                format!("vec![{}]", inner.join(", "))
            }
            Self::Opt(None) => "None".to_string(),
            Self::Opt(Some(inner)) => format!("Some({})", inner.literal()),
            Self::Custom { literal } => literal.clone(),
        }
    }
}

fn escape_char(c: char) -> String {
    match c {
        '\\' => "\\\\".to_string(),
        '\'' => "\\'".to_string(),
        '\n' => "\\n".to_string(),
        '\r' => "\\r".to_string(),
        '\t' => "\\t".to_string(),
        c if (' '..='~').contains(&c) => c.to_string(),
        c => format!("\\u{{{:x}}}", c as u32),
    }
}

fn escape_in_string(c: char) -> String {
    match c {
        '\\' => "\\\\".to_string(),
        '"' => "\\\"".to_string(),
        '\n' => "\\n".to_string(),
        '\r' => "\\r".to_string(),
        '\t' => "\\t".to_string(),
        c if (' '..='~').contains(&c) => c.to_string(),
        c => format!("\\u{{{:x}}}", c as u32),
    }
}

/// Conversion of domain values into the scalar universe.
///
/// Lifters apply this to every argument and every plain result, so a
/// harness only implements it for its own value types (usually via
/// [`Scalar::custom`]).
pub trait ToScalar {
    /// Convert the value.
    fn to_scalar(&self) -> Scalar;
}

impl ToScalar for Scalar {
    fn to_scalar(&self) -> Scalar {
        self.clone()
    }
}

impl ToScalar for () {
    fn to_scalar(&self) -> Scalar {
        Scalar::Unit
    }
}

impl ToScalar for bool {
    fn to_scalar(&self) -> Scalar {
        Scalar::Bool(*self)
    }
}

impl ToScalar for char {
    fn to_scalar(&self) -> Scalar {
        Scalar::Char(*self)
    }
}

impl ToScalar for String {
    fn to_scalar(&self) -> Scalar {
        Scalar::Text(self.clone())
    }
}

impl ToScalar for &str {
    fn to_scalar(&self) -> Scalar {
        Scalar::Text((*self).to_string())
    }
}

macro_rules! int_to_scalar {
    ($($t:ty),*) => {
        $(impl ToScalar for $t {
            fn to_scalar(&self) -> Scalar {
                Scalar::Int(*self as i64)
            }
        })*
    };
}

int_to_scalar!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);

impl<T: ToScalar> ToScalar for Option<T> {
    fn to_scalar(&self) -> Scalar {
        Scalar::Opt(self.as_ref().map(|v| Box::new(v.to_scalar())))
    }
}

impl<T: ToScalar> ToScalar for Vec<T> {
    fn to_scalar(&self) -> Scalar {
        Scalar::List(self.iter().map(ToScalar::to_scalar).collect())
    }
}

impl<T: ToScalar + ?Sized> ToScalar for &T {
    fn to_scalar(&self) -> Scalar {
        (*self).to_scalar()
    }
}
