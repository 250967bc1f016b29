/// Argument and invocation types.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Raw parameter values
// ---------------------------------------------------------------------------

/// A flag's value as written in the message, before any coercion.
///
/// A flag followed by exactly one token is a `Single`; zero or several
/// tokens stay a `Many` (so `-force` with nothing after it is
/// `Many(vec![])`, which still counts as present).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Single(String),
    Many(Vec<String>),
}

impl ParamValue {
    pub(crate) fn from_tokens(mut tokens: Vec<String>) -> Self {
        if tokens.len() == 1 {
            ParamValue::Single(tokens.remove(0))
        } else {
            ParamValue::Many(tokens)
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Single(s) => f.write_str(s),
            ParamValue::Many(v) => write!(f, "[{}]", v.join(", ")),
        }
    }
}

/// Insertion-ordered flag map. Re-supplying a flag replaces its value but
/// keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> FlagMap<V> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: V) {
        let name = name.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for FlagMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = FlagMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<V: fmt::Display> fmt::Display for FlagMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{k}: {v}")?;
        }
        f.write_str("}")
    }
}

// ---------------------------------------------------------------------------
// Parsed invocation
// ---------------------------------------------------------------------------

/// A command call extracted from a message, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub name: String,
    pub params: FlagMap<ParamValue>,
}

// ---------------------------------------------------------------------------
// Argument schema
// ---------------------------------------------------------------------------

/// Element type for scalar and list arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Int,
    Float,
    Bool,
    Str,
}

impl ScalarType {
    fn name(self) -> &'static str {
        match self {
            ScalarType::Int => "int",
            ScalarType::Float => "float",
            ScalarType::Bool => "bool",
            ScalarType::Str => "str",
        }
    }

    fn coerce(self, raw: &str) -> Option<ArgValue> {
        match self {
            ScalarType::Int => raw.parse::<i64>().ok().map(ArgValue::Int),
            ScalarType::Float => raw
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(ArgValue::Float),
            ScalarType::Bool => parse_bool(raw).map(ArgValue::Bool),
            ScalarType::Str => Some(ArgValue::Str(raw.to_string())),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// One accepted type of an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgType {
    Scalar(ScalarType),
    List(ScalarType),
}

impl ArgType {
    pub const INT: ArgType = ArgType::Scalar(ScalarType::Int);
    pub const FLOAT: ArgType = ArgType::Scalar(ScalarType::Float);
    pub const BOOL: ArgType = ArgType::Scalar(ScalarType::Bool);
    pub const STR: ArgType = ArgType::Scalar(ScalarType::Str);

    /// Try to coerce a raw flag value into this type.
    ///
    /// `str` is the only scalar type that accepts a sequence: its tokens are
    /// joined with single spaces. List types accept a scalar as a
    /// one-element list.
    pub fn coerce(&self, value: &ParamValue) -> Option<ArgValue> {
        match (self, value) {
            (ArgType::Scalar(t), ParamValue::Single(s)) => t.coerce(s),
            (ArgType::Scalar(ScalarType::Str), ParamValue::Many(v)) => {
                Some(ArgValue::Str(v.join(" ")))
            }
            (ArgType::Scalar(_), ParamValue::Many(_)) => None,
            (ArgType::List(t), ParamValue::Single(s)) => {
                t.coerce(s).map(|v| ArgValue::List(vec![v]))
            }
            (ArgType::List(t), ParamValue::Many(v)) => v
                .iter()
                .map(|s| t.coerce(s))
                .collect::<Option<Vec<_>>>()
                .map(ArgValue::List),
        }
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgType::Scalar(t) => f.write_str(t.name()),
            ArgType::List(t) => write!(f, "list[{}]", t.name()),
        }
    }
}

impl FromStr for ArgType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let scalar = |name: &str| match name {
            "int" => Some(ScalarType::Int),
            "float" => Some(ScalarType::Float),
            "bool" => Some(ScalarType::Bool),
            "str" => Some(ScalarType::Str),
            _ => None,
        };
        let s = s.trim();
        let parsed = match s.strip_prefix("list[").and_then(|r| r.strip_suffix(']')) {
            Some(inner) => scalar(inner.trim()).map(ArgType::List),
            None => scalar(s).map(ArgType::Scalar),
        };
        parsed.ok_or_else(|| format!("unknown argument type `{s}`"))
    }
}

impl Serialize for ArgType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ArgType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Render accepted types the way error messages show them: `[int, str]`.
pub fn format_types(types: &[ArgType]) -> String {
    let names: Vec<String> = types.iter().map(ToString::to_string).collect();
    format!("[{}]", names.join(", "))
}

/// Declared shape of one flag.
///
/// `types` are tried in order and the first successful coercion decides
/// the value the handler receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArgSpec {
    pub types: Vec<ArgType>,
    #[serde(default)]
    pub optional: bool,
}

impl ArgSpec {
    pub fn required(types: impl Into<Vec<ArgType>>) -> Self {
        Self { types: types.into(), optional: false }
    }

    pub fn optional(types: impl Into<Vec<ArgType>>) -> Self {
        Self { types: types.into(), optional: true }
    }

    pub fn coerce(&self, value: &ParamValue) -> Option<ArgValue> {
        self.types.iter().find_map(|t| t.coerce(value))
    }
}

// ---------------------------------------------------------------------------
// Coerced values
// ---------------------------------------------------------------------------

/// A validated, typed flag value handed to a handler.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    List(Vec<ArgValue>),
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Int(i) => write!(f, "{i}"),
            ArgValue::Float(x) => write!(f, "{x}"),
            ArgValue::Bool(b) => write!(f, "{b}"),
            ArgValue::Str(s) => f.write_str(s),
            ArgValue::List(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

/// Validated parameters, in the order the caller supplied them.
pub type Params = FlagMap<ArgValue>;

impl FlagMap<ArgValue> {
    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            ArgValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            ArgValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Float flags also accept a value that was coerced as `int`.
    pub fn get_float(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            ArgValue::Float(x) => Some(*x),
            ArgValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            ArgValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn get_list(&self, name: &str) -> Option<&[ArgValue]> {
        match self.get(name)? {
            ArgValue::List(items) => Some(items),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(s: &str) -> ParamValue {
        ParamValue::Single(s.to_string())
    }

    fn many(v: &[&str]) -> ParamValue {
        ParamValue::Many(v.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_one_token_collapses_to_single() {
        assert_eq!(ParamValue::from_tokens(vec!["a".into()]), single("a"));
        assert_eq!(ParamValue::from_tokens(vec![]), many(&[]));
        assert_eq!(ParamValue::from_tokens(vec!["a".into(), "b".into()]), many(&["a", "b"]));
    }

    #[test]
    fn test_flag_map_replaces_in_place() {
        let mut map = FlagMap::new();
        map.insert("a", 1);
        map.insert("b", 2);
        map.insert("a", 3);
        let entries: Vec<_> = map.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        assert_eq!(entries, vec![("a".to_string(), 3), ("b".to_string(), 2)]);
    }

    #[test]
    fn test_scalar_coercion() {
        assert_eq!(ArgType::INT.coerce(&single("42")), Some(ArgValue::Int(42)));
        assert_eq!(ArgType::INT.coerce(&single("4.2")), None);
        assert_eq!(ArgType::FLOAT.coerce(&single("4.5")), Some(ArgValue::Float(4.5)));
        assert_eq!(ArgType::FLOAT.coerce(&single("nan")), None);
        assert_eq!(ArgType::BOOL.coerce(&single("Yes")), Some(ArgValue::Bool(true)));
        assert_eq!(ArgType::BOOL.coerce(&single("maybe")), None);
    }

    #[test]
    fn test_str_joins_sequences_other_scalars_reject_them() {
        assert_eq!(
            ArgType::STR.coerce(&many(&["spam", "annoying"])),
            Some(ArgValue::Str("spam annoying".into()))
        );
        assert_eq!(ArgType::STR.coerce(&many(&[])), Some(ArgValue::Str(String::new())));
        assert_eq!(ArgType::INT.coerce(&many(&["1", "2"])), None);
    }

    #[test]
    fn test_list_coercion_is_elementwise() {
        let ints = ArgType::List(ScalarType::Int);
        assert_eq!(
            ints.coerce(&many(&["1", "2"])),
            Some(ArgValue::List(vec![ArgValue::Int(1), ArgValue::Int(2)]))
        );
        assert_eq!(ints.coerce(&single("7")), Some(ArgValue::List(vec![ArgValue::Int(7)])));
        assert_eq!(ints.coerce(&many(&["1", "x"])), None);
        assert_eq!(ints.coerce(&many(&[])), Some(ArgValue::List(vec![])));
    }

    #[test]
    fn test_first_declared_type_wins() {
        let spec = ArgSpec::required([ArgType::INT, ArgType::STR]);
        assert_eq!(spec.coerce(&single("5")), Some(ArgValue::Int(5)));

        let spec = ArgSpec::required([ArgType::STR, ArgType::INT]);
        assert_eq!(spec.coerce(&single("5")), Some(ArgValue::Str("5".into())));
    }

    #[test]
    fn test_type_names_round_trip_through_from_str() {
        for name in ["int", "float", "bool", "str", "list[int]", "list[str]"] {
            let parsed: ArgType = name.parse().unwrap();
            assert_eq!(parsed.to_string(), name);
        }
        assert!("list[char]".parse::<ArgType>().is_err());
        assert!("integer".parse::<ArgType>().is_err());
    }

    #[test]
    fn test_format_types() {
        assert_eq!(format_types(&[ArgType::INT, ArgType::FLOAT]), "[int, float]");
    }

    #[test]
    fn test_params_accessors() {
        let params: Params = [
            ("user", ArgValue::Str("alice".into())),
            ("days", ArgValue::Int(3)),
        ]
        .into_iter()
        .collect();
        assert_eq!(params.get_str("user"), Some("alice"));
        assert_eq!(params.get_int("days"), Some(3));
        assert_eq!(params.get_float("days"), Some(3.0));
        assert_eq!(params.get_int("user"), None);
        assert_eq!(params.get_str("missing"), None);
    }
}
