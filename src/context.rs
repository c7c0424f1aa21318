//! Placeholder values supplied alongside a log message.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A single context value, tagged by how it may be rendered into a message.
#[derive(Clone)]
pub enum Value {
    /// Absent value; renders as an empty string.
    Null,
    /// Plain string.
    Str(String),
    /// Boolean; renders as `true` or `false`.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    /// Floating point number.
    Float(f64),
    /// Object with a string conversion.
    Display(Arc<dyn fmt::Display + Send + Sync>),
    /// Error object. The only kind accepted under the `exception` key.
    Error(Arc<dyn std::error::Error + Send + Sync>),
    /// Sequence container; never rendered.
    List(Vec<Value>),
    /// Keyed container; never rendered.
    Map(BTreeMap<String, Value>),
    /// Object without a string conversion; never rendered.
    Opaque,
}

impl Value {
    /// Wrap any displayable object.
    pub fn display<T>(value: T) -> Self
    where
        T: fmt::Display + Send + Sync + 'static,
    {
        Self::Display(Arc::new(value))
    }

    /// Wrap an error object.
    pub fn error<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Error(Arc::new(error))
    }

    /// Render the value as placeholder text, or `None` if it has no string form.
    pub fn render(&self) -> Option<String> {
        match self {
            Value::Null => Some(String::new()),
            Value::Str(s) => Some(s.clone()),
            Value::Bool(b) => Some(if *b { "true" } else { "false" }.to_string()),
            Value::Int(n) => Some(n.to_string()),
            Value::UInt(n) => Some(n.to_string()),
            Value::Float(n) => Some(n.to_string()),
            Value::Display(d) => Some(d.to_string()),
            Value::Error(e) => Some(e.to_string()),
            Value::List(_) | Value::Map(_) | Value::Opaque => None,
        }
    }

    /// Whether the value is an error object.
    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Value::UInt(n) => f.debug_tuple("UInt").field(n).finish(),
            Value::Float(n) => f.debug_tuple("Float").field(n).finish(),
            Value::Display(d) => f.debug_tuple("Display").field(&d.to_string()).finish(),
            Value::Error(e) => f.debug_tuple("Error").field(&e.to_string()).finish(),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
            Value::Map(map) => f.debug_tuple("Map").field(map).finish(),
            Value::Opaque => f.write_str("Opaque"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! impl_from_int {
    ($variant:ident, $as:ty: $($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::$variant(<$as>::from(n))
                }
            }
        )*
    };
}

impl_from_int!(Int, i64: i8, i16, i32, i64);
impl_from_int!(UInt, u64: u8, u16, u32, u64);
impl_from_int!(Float, f64: f32, f64);

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

/// Mapping from placeholder name to value.
#[derive(Debug, Clone, Default)]
pub struct Context {
    values: BTreeMap<String, Value>,
}

impl Context {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Add or replace a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    /// Look up a value by placeholder name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the context holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over values in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut context = Context::new();
        for (key, value) in iter {
            context.insert(key, value);
        }
        context
    }
}

/// Build a [`Context`] from `key => value` pairs.
///
/// ```rust
/// let ctx = filelog::context! { "user" => "alice", "retries" => 3 };
/// assert_eq!(ctx.len(), 2);
/// ```
#[macro_export]
macro_rules! context {
    () => {
        $crate::Context::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::Context::new()$(.with($key, $value))+
    };
}
