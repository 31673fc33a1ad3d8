use serde::{Deserialize, Serialize};
use std::fmt;

/// A value bound to a query parameter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Value {
    Int(i64),

    /// Text whose type is decided by the server from the parameter's
    /// position in the query. The bytes are sent verbatim in text format and
    /// parsed with the input function of the inferred type, so a value read
    /// back from a previous result round-trips without client-side coercion.
    Untyped(String),
}

impl Value {
    pub fn as_untyped(&self) -> Option<&str> {
        match self {
            Value::Untyped(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Untyped(v) => write!(f, "'{v}'"),
        }
    }
}
