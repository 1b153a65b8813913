use serde::Serialize;
use serde_json::{Map, Value};

/// One flattened output row: an ordered mapping from column key to value.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Event {
    fields: Map<String, Value>,
}

impl Event {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `value` under `key` unless the key is already taken.
    /// Returns `false` when the existing value was kept.
    pub fn insert_new(&mut self, key: impl Into<String>, value: Value) -> bool {
        let key = key.into();
        if self.fields.contains_key(&key) {
            return false;
        }
        self.fields.insert(key, value);
        true
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

/// All events of one run. Order carries no meaning.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSet {
    events: Vec<Event>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn merge(&mut self, other: ResultSet) {
        self.events.extend(other.events);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    /// Ordered union of every event's keys, in first-seen order.
    pub fn columns(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut columns = Vec::new();
        for key in self.events.iter().flat_map(Event::keys) {
            if seen.insert(key) {
                columns.push(key.to_string());
            }
        }
        columns
    }
}

impl FromIterator<Event> for ResultSet {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

impl Extend<Event> for ResultSet {
    fn extend<I: IntoIterator<Item = Event>>(&mut self, iter: I) {
        self.events.extend(iter);
    }
}
