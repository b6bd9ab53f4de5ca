//! Key/value parameters for parameterized log events
//!
//! Parameters render as `key=value` pairs separated by single spaces, always
//! sorted by key. How a value renders depends on its variant:
//!
//! | variant     | rendering                 |
//! |-------------|---------------------------|
//! | `String`    | `'text'`                  |
//! | `Integer`   | `123`                     |
//! | `Float`     | `3.140000`                |
//! | `Bool`      | `'true'`                  |
//! | `Bytes`     | `48656c6c6f` (lower hex)  |
//! | `Timestamp` | `'2025-01-08T10:30:45Z'`  |
//! | `Other`     | `'<display text>'`        |

use chrono::{DateTime, FixedOffset, SecondsFormat, TimeZone};
use std::collections::BTreeMap;
use std::fmt::{self, Write as _};

#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    String(String),
    Integer(i128),
    Float(f64),
    Bool(bool),
    Bytes(Vec<u8>),
    Timestamp(DateTime<FixedOffset>),
    Other(String),
}

impl ParamValue {
    /// Wrap any displayable value; it renders quoted like a string
    pub fn other(value: impl fmt::Display) -> Self {
        ParamValue::Other(value.to_string())
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::String(s) | ParamValue::Other(s) => write!(f, "'{}'", s),
            ParamValue::Integer(i) => write!(f, "{}", i),
            ParamValue::Float(fl) => write!(f, "{:.6}", fl),
            ParamValue::Bool(b) => write!(f, "'{}'", b),
            ParamValue::Bytes(bytes) => {
                for byte in bytes {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
            ParamValue::Timestamp(ts) => {
                write!(f, "'{}'", ts.to_rfc3339_opts(SecondsFormat::Secs, true))
            }
        }
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::String(s)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::String(s.to_string())
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(i: $ty) -> Self {
                    ParamValue::Integer(i as i128)
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<f32> for ParamValue {
    fn from(f: f32) -> Self {
        ParamValue::Float(f64::from(f))
    }
}

impl From<f64> for ParamValue {
    fn from(f: f64) -> Self {
        ParamValue::Float(f)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Bool(b)
    }
}

impl From<Vec<u8>> for ParamValue {
    fn from(bytes: Vec<u8>) -> Self {
        ParamValue::Bytes(bytes)
    }
}

impl From<&[u8]> for ParamValue {
    fn from(bytes: &[u8]) -> Self {
        ParamValue::Bytes(bytes.to_vec())
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for ParamValue {
    fn from(ts: DateTime<Tz>) -> Self {
        ParamValue::Timestamp(ts.fixed_offset())
    }
}

/// An ordered set of event parameters
///
/// # Example
///
/// ```
/// use logtic::Params;
///
/// let params = Params::new()
///     .with("user", "alice")
///     .with("attempts", 3)
///     .with("token", vec![0xde_u8, 0xad]);
/// assert_eq!(params.to_string(), "attempts=3 token=dead user='alice'");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    fields: BTreeMap<String, ParamValue>,
}

impl Params {
    pub fn new() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }

    /// Add a parameter (builder version)
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<ParamValue>,
    {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Add a parameter, replacing any previous value for the key
    pub fn insert<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<ParamValue>,
    {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_char(' ')?;
            }
            write!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

/// Render parameters as a sorted `key=value` string
pub fn string_from_parameters(params: &Params) -> String {
    params.to_string()
}
