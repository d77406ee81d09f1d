//! Dynamically typed leaf values.
//!
//! Sampled data sources return a [`Value`]; typed readers go through
//! [`ValueType`] to pull a concrete Rust type back out.

use std::fmt;

use super::math::{DMat4, Vec3};
use super::{ScenePath, Token};

/// A typed value held by a sampled data source or attribute.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// No value.
    #[default]
    Empty,
    Bool(bool),
    Int(i32),
    Float(f32),
    Double(f64),
    Token(Token),
    String(String),
    Path(ScenePath),
    Vec3f(Vec3),
    Matrix4d(DMat4),
    IntArray(Vec<i32>),
    FloatArray(Vec<f32>),
    DoubleArray(Vec<f64>),
    Vec3fArray(Vec<Vec3>),
    TokenArray(Vec<Token>),
}

impl Value {
    /// Check if this holds no value.
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    /// Type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Empty => "empty",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Token(_) => "token",
            Value::String(_) => "string",
            Value::Path(_) => "path",
            Value::Vec3f(_) => "float3",
            Value::Matrix4d(_) => "matrix4d",
            Value::IntArray(_) => "int[]",
            Value::FloatArray(_) => "float[]",
            Value::DoubleArray(_) => "double[]",
            Value::Vec3fArray(_) => "float3[]",
            Value::TokenArray(_) => "token[]",
        }
    }

    /// Number of elements for array values, `None` for scalars.
    pub fn array_len(&self) -> Option<usize> {
        match self {
            Value::IntArray(v) => Some(v.len()),
            Value::FloatArray(v) => Some(v.len()),
            Value::DoubleArray(v) => Some(v.len()),
            Value::Vec3fArray(v) => Some(v.len()),
            Value::TokenArray(v) => Some(v.len()),
            _ => None,
        }
    }

    /// Extract a concrete type.
    #[inline]
    pub fn get<T: ValueType>(&self) -> Option<T> {
        T::from_value(self)
    }

    /// Check if this holds a `T`.
    #[inline]
    pub fn is<T: ValueType>(&self) -> bool {
        T::matches(self)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Value::Token(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&ScenePath> {
        match self {
            Value::Path(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_int_array(&self) -> Option<&[i32]> {
        match self {
            Value::IntArray(v) => Some(v),
            _ => None,
        }
    }

    /// Numeric scalar widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v as f64),
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => f.write_str("<empty>"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Token(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{:?}", v),
            Value::Path(v) => write!(f, "{}", v),
            Value::Vec3f(v) => write!(f, "({}, {}, {})", v.x, v.y, v.z),
            Value::Matrix4d(m) => write!(f, "{:?}", m.to_cols_array()),
            Value::IntArray(v) => write!(f, "{:?}", v),
            Value::FloatArray(v) => write!(f, "{:?}", v),
            Value::DoubleArray(v) => write!(f, "{:?}", v),
            Value::Vec3fArray(v) => {
                let parts: Vec<_> = v.iter().map(|p| format!("({}, {}, {})", p.x, p.y, p.z)).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Value::TokenArray(v) => {
                let parts: Vec<_> = v.iter().map(|t| t.as_str()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

/// Rust types that can be stored in a [`Value`].
pub trait ValueType: Sized + Clone {
    /// Name used in type-mismatch diagnostics.
    const TYPE_NAME: &'static str;

    fn from_value(value: &Value) -> Option<Self>;

    fn into_value(self) -> Value;

    fn matches(value: &Value) -> bool {
        Self::from_value(value).is_some()
    }
}

macro_rules! impl_value_type {
    ($ty:ty, $variant:ident, $name:expr) => {
        impl ValueType for $ty {
            const TYPE_NAME: &'static str = $name;

            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }

            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            fn matches(value: &Value) -> bool {
                matches!(value, Value::$variant(_))
            }
        }

        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v)
            }
        }
    };
}

impl_value_type!(bool, Bool, "bool");
impl_value_type!(i32, Int, "int");
impl_value_type!(f32, Float, "float");
impl_value_type!(f64, Double, "double");
impl_value_type!(Token, Token, "token");
impl_value_type!(String, String, "string");
impl_value_type!(ScenePath, Path, "path");
impl_value_type!(Vec3, Vec3f, "float3");
impl_value_type!(DMat4, Matrix4d, "matrix4d");
impl_value_type!(Vec<i32>, IntArray, "int[]");
impl_value_type!(Vec<f32>, FloatArray, "float[]");
impl_value_type!(Vec<f64>, DoubleArray, "double[]");
impl_value_type!(Vec<Vec3>, Vec3fArray, "float3[]");
impl_value_type!(Vec<Token>, TokenArray, "token[]");

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Token(Token::new(v))
    }
}
