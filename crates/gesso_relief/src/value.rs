//! Parameter bags and the values they hold.

use std::sync::Arc;

use gesso_carton::{FxHashMap, String};

/// A value an expression can produce or a parameter can hold.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<Value>),
    Map(Params),
    /// One parameter bag per copy of a repeated element
    Range(RangeParams),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Range(_) => "range",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_range(&self) -> Option<&RangeParams> {
        match self {
            Self::Range(range) => Some(range),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.into())
    }
}

impl From<std::string::String> for Value {
    fn from(value: std::string::String) -> Self {
        Self::String(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Params> for Value {
    fn from(value: Params) -> Self {
        Self::Map(value)
    }
}

impl From<RangeParams> for Value {
    fn from(value: RangeParams) -> Self {
        Self::Range(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// JSON objects become maps; arrays made only of objects become range
/// parameter sequences, any other array a plain list.
impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match value {
            Json::Null => Self::Null,
            Json::Bool(b) => Self::Bool(b),
            Json::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            Json::String(s) => Self::String(s.into()),
            Json::Object(map) => Self::Map(map.into_iter().collect()),
            Json::Array(items) => {
                if !items.is_empty() && items.iter().all(Json::is_object) {
                    Self::Range(
                        items
                            .into_iter()
                            .filter_map(|item| match item {
                                Json::Object(map) => Some(map.into_iter().collect::<Params>()),
                                _ => None,
                            })
                            .collect(),
                    )
                } else {
                    Self::List(items.into_iter().map(Self::from).collect())
                }
            }
        }
    }
}

/// A named set of values an expression is evaluated against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    values: FxHashMap<String, Value>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Resolve a dotted path (`user.address.city`) through nested maps
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.get(segments.next()?)?;
        for segment in segments {
            match current {
                Value::Map(map) => current = map.get(segment)?,
                _ => return None,
            }
        }
        Some(current)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Params {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut params = Self::new();
        params.extend(iter);
        params
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Params {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

/// Error returned when a JSON document is not an object.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("parameters must be a JSON object, found {0}")]
pub struct NotAnObject(pub &'static str);

impl TryFrom<serde_json::Value> for Params {
    type Error = NotAnObject;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Object(map) => Ok(map.into_iter().collect()),
            other => Err(NotAnObject(Value::from(other).type_name())),
        }
    }
}

/// Ordered sequence of parameter bags driving a repetition directive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeParams(Vec<Arc<Params>>);

impl RangeParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, params: Params) {
        self.0.push(Arc::new(params));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<Params>> {
        self.0.iter()
    }
}

impl FromIterator<Params> for RangeParams {
    fn from_iter<T: IntoIterator<Item = Params>>(iter: T) -> Self {
        Self(iter.into_iter().map(Arc::new).collect())
    }
}

impl<'a> IntoIterator for &'a RangeParams {
    type Item = &'a Arc<Params>;
    type IntoIter = std::slice::Iter<'a, Arc<Params>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Build [`Params`] from `key => value` pairs.
///
/// ```
/// use gesso_relief::params;
///
/// let params = params! { "name" => "Ann", "isFood" => true };
/// assert_eq!(params.len(), 2);
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::Params::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut params = $crate::Params::new();
        $(params.insert($key, $value);)+
        params
    }};
}

/// Build a [`RangeParams`] from parameter bags.
pub fn range_params(bags: impl IntoIterator<Item = Params>) -> RangeParams {
    bags.into_iter().collect()
}
