//! Hash method parameters given as `NAME=VALUE` on the command line.

use std::collections::BTreeMap;
use std::fmt;

use crate::err::Error;

/// A coerced parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Int(i64),
    Bool(bool),
    Str(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Str(s) => f.write_str(s),
        }
    }
}

type Coerce = fn(&str) -> Result<ParamValue, String>;

// Names not listed here are passed through unmodified.
const PARAMETERS: &[(&str, Coerce)] = &[
    ("algs", unmodified),
    ("block_size", integer),
    ("digest_size", integer),
    ("hash_len", integer),
    ("ident", unmodified),
    ("implicit_rounds", integer),
    ("marker", unmodified),
    ("memory_cost", integer),
    ("parallelism", integer),
    ("rounds", integer),
    ("salt", unmodified),
    ("salt_len", integer),
    ("salt_size", integer),
    ("time_cost", integer),
    ("truncate_error", boolean),
    ("variant", unmodified),
];

fn integer(value: &str) -> Result<ParamValue, String> {
    value
        .parse::<i64>()
        .map(ParamValue::Int)
        .map_err(|e| format!("invalid integer value {:?}: {}", value, e))
}

fn boolean(value: &str) -> Result<ParamValue, String> {
    parse_bool(value).map(ParamValue::Bool)
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "" | "0" | "n" | "no" | "false" => Ok(false),
        "1" | "y" | "yes" | "true" => Ok(true),
        _ => Err(format!("invalid boolean value: {:?}", value)),
    }
}

fn unmodified(value: &str) -> Result<ParamValue, String> {
    Ok(ParamValue::Str(value.to_owned()))
}

fn coercion(name: &str) -> Coerce {
    PARAMETERS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, c)| *c)
        .unwrap_or(unmodified)
}

/// Coerce a raw value according to the parameter name.
pub fn parse_parameter(name: &str, value: &str) -> Result<ParamValue, Error> {
    coercion(name)(value).map_err(|reason| Error::invalid_parameter(name, reason))
}

/// Parse a `NAME=VALUE` assignment. Used as the clap value parser for `-p`.
pub fn param_type(raw: &str) -> Result<(String, ParamValue), Error> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| Error::MalformedParameter(format!("invalid format ({})", raw)))?;
    if name.is_empty() {
        return Err(Error::MalformedParameter("empty parameter name".to_owned()));
    }

    let value = parse_parameter(name, value)?;
    Ok((name.to_owned(), value))
}

/// Parameters collapsed into a mapping. The last assignment for a name wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    #[cfg(test)]
    pub fn new() -> Params {
        Params::default()
    }

    #[cfg(test)]
    pub fn insert(&mut self, name: impl Into<String>, value: ParamValue) {
        self.0.insert(name.into(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn str(&self, name: &str) -> Result<Option<&str>, Error> {
        match self.0.get(name) {
            None => Ok(None),
            Some(ParamValue::Str(s)) => Ok(Some(s)),
            Some(v) => Err(Error::invalid_parameter(
                name,
                format!("expected a string, got {}", v),
            )),
        }
    }

    pub fn uint<T: TryFrom<i64>>(&self, name: &str) -> Result<Option<T>, Error> {
        let i = match self.0.get(name) {
            None => return Ok(None),
            Some(ParamValue::Int(i)) => *i,
            Some(ParamValue::Str(s)) => s
                .parse::<i64>()
                .map_err(|e| Error::invalid_parameter(name, e))?,
            Some(ParamValue::Bool(b)) => {
                return Err(Error::invalid_parameter(
                    name,
                    format!("expected an integer, got {}", b),
                ))
            }
        };
        T::try_from(i)
            .map(Some)
            .map_err(|_| Error::invalid_parameter(name, format!("{} is out of range", i)))
    }

    /// The first of `names` that is present, as an unsigned integer.
    #[cfg(any(test, feature = "argon2", feature = "scrypt", feature = "pbkdf2"))]
    pub fn first_uint<T: TryFrom<i64>>(&self, names: &[&str]) -> Result<Option<T>, Error> {
        for name in names {
            if let Some(v) = self.uint(name)? {
                return Ok(Some(v));
            }
        }
        Ok(None)
    }

    /// Booleans, and integers where non-zero means set.
    pub fn flag(&self, name: &str) -> Result<Option<bool>, Error> {
        match self.0.get(name) {
            None => Ok(None),
            Some(ParamValue::Bool(b)) => Ok(Some(*b)),
            Some(ParamValue::Int(i)) => Ok(Some(*i != 0)),
            Some(ParamValue::Str(s)) => parse_bool(s)
                .map(Some)
                .map_err(|reason| Error::invalid_parameter(name, reason)),
        }
    }
}

impl FromIterator<(String, ParamValue)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, ParamValue)>>(iter: I) -> Params {
        Params(iter.into_iter().collect())
    }
}
