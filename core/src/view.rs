use serde::Serialize;
use serde_json::{Map, Value};

/// Key/value data a handler assembles for its response.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ViewData {
    data: Map<String, Value>,
}

impl ViewData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, returning the value it replaced.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.data.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.data)
    }
}

impl From<ViewData> for Value {
    fn from(view: ViewData) -> Self {
        view.into_value()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ViewData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut view = ViewData::new();
        for (key, value) in iter {
            view.set(key, value);
        }
        view
    }
}
