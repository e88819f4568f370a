//! Typed parameter values and their textual form.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Scalar type tag carried by every declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScalarKind {
    String,
    Bool,
    Integer,
    Float,
    Path,
}

impl ScalarKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Path => "path",
        }
    }
}

/// Declared type of a parameter: a scalar kind, optionally repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ValueType {
    pub scalar: ScalarKind,
    pub array: bool,
}

impl ValueType {
    pub const fn scalar(scalar: ScalarKind) -> Self {
        Self {
            scalar,
            array: false,
        }
    }

    pub const fn array(scalar: ScalarKind) -> Self {
        Self {
            scalar,
            array: true,
        }
    }

    /// Booleans are flags: presence sets them, they never consume the next argument.
    pub fn is_flag(self) -> bool {
        self.scalar == ScalarKind::Bool && !self.array
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.array {
            write!(f, "{}[]", self.scalar.as_str())
        } else {
            f.write_str(self.scalar.as_str())
        }
    }
}

/// A type that can be the value of a parameter.
///
/// Coercion is explicit: `absorb` turns one raw token into a value (array
/// types append to what was already absorbed), `to_tokens` renders a value
/// back into the tokens that would produce it.
pub trait ParamValue: Clone + fmt::Debug + Send + Sync + 'static {
    fn value_type() -> ValueType;

    /// Coerce one token, merging with a previously absorbed value.
    ///
    /// Scalars replace `current`; arrays append to it. The error string names
    /// the problem, not the token.
    fn absorb(current: Option<Self>, raw: &str) -> Result<Self, String>;

    fn to_tokens(&self) -> Vec<String>;

    /// The value of an empty token sequence: `None` for scalars, an empty
    /// collection for arrays.
    fn empty() -> Option<Self> {
        None
    }

    /// Coerce a whole token sequence, as the resolver would.
    fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Option<Self>, String> {
        let mut current = Self::empty();
        for raw in tokens {
            current = Some(Self::absorb(current, raw.as_ref())?);
        }
        Ok(current)
    }
}

/// Scalar types that may also be collected into a `Vec` parameter.
///
/// `bool` is absent: an array of flags has no command-line form.
pub trait Scalar: Clone + fmt::Debug + Send + Sync + 'static {
    const KIND: ScalarKind;

    fn parse_scalar(raw: &str) -> Result<Self, String>;

    fn render_scalar(&self) -> String;
}

impl Scalar for String {
    const KIND: ScalarKind = ScalarKind::String;

    fn parse_scalar(raw: &str) -> Result<Self, String> {
        Ok(raw.to_string())
    }

    fn render_scalar(&self) -> String {
        self.clone()
    }
}

impl Scalar for PathBuf {
    const KIND: ScalarKind = ScalarKind::Path;

    fn parse_scalar(raw: &str) -> Result<Self, String> {
        if raw.is_empty() {
            return Err("empty path".to_string());
        }
        Ok(PathBuf::from(raw))
    }

    fn render_scalar(&self) -> String {
        self.display().to_string()
    }
}

impl Scalar for f64 {
    const KIND: ScalarKind = ScalarKind::Float;

    fn parse_scalar(raw: &str) -> Result<Self, String> {
        raw.trim().parse::<f64>().map_err(|e| e.to_string())
    }

    fn render_scalar(&self) -> String {
        self.to_string()
    }
}

macro_rules! integer_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Scalar for $ty {
                const KIND: ScalarKind = ScalarKind::Integer;

                fn parse_scalar(raw: &str) -> Result<Self, String> {
                    raw.trim().parse::<$ty>().map_err(|e| e.to_string())
                }

                fn render_scalar(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

integer_scalar!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);

macro_rules! scalar_values {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ParamValue for $ty {
                fn value_type() -> ValueType {
                    ValueType::scalar(<$ty as Scalar>::KIND)
                }

                fn absorb(_current: Option<Self>, raw: &str) -> Result<Self, String> {
                    <$ty as Scalar>::parse_scalar(raw)
                }

                fn to_tokens(&self) -> Vec<String> {
                    vec![self.render_scalar()]
                }
            }

            impl ParamValue for Vec<$ty> {
                fn value_type() -> ValueType {
                    ValueType::array(<$ty as Scalar>::KIND)
                }

                fn absorb(current: Option<Self>, raw: &str) -> Result<Self, String> {
                    let mut items = current.unwrap_or_default();
                    items.push(<$ty as Scalar>::parse_scalar(raw)?);
                    Ok(items)
                }

                fn to_tokens(&self) -> Vec<String> {
                    self.iter().map(Scalar::render_scalar).collect()
                }

                fn empty() -> Option<Self> {
                    Some(Vec::new())
                }
            }
        )*
    };
}

scalar_values!(String, PathBuf, f64, i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);

impl ParamValue for bool {
    fn value_type() -> ValueType {
        ValueType::scalar(ScalarKind::Bool)
    }

    fn absorb(_current: Option<Self>, raw: &str) -> Result<Self, String> {
        if raw.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if raw.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err("expected `true` or `false`".to_string())
        }
    }

    fn to_tokens(&self) -> Vec<String> {
        vec![self.to_string()]
    }
}
