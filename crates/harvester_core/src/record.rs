use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

/// One raw task-detail record as returned by the engine: a tree of scalar,
/// nested-map and sequence nodes rooted at an object.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRecord {
    fields: Map<String, Value>,
}

impl RawRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Wraps a JSON value, returning `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Removes a top-level field. Each field can be consumed at most once.
    pub fn take(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathQueryError {
    #[error("path is empty")]
    Empty,
    #[error("empty segment at position {position} in `{path}`")]
    EmptySegment { path: String, position: usize },
    #[error("invalid index `{index}` in `{path}`")]
    InvalidIndex { path: String, index: String },
    #[error("unterminated `[` in `{path}`")]
    UnterminatedBracket { path: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Field(String),
    Index(usize),
    AnyChild,
}

/// A parsed dotted path such as `variables.requisition.requester`,
/// `items[0].name` or `rows[*].id`.
///
/// Evaluation yields zero or one match: the first match in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathQuery {
    source: String,
    steps: Vec<Step>,
}

impl PathQuery {
    pub fn parse(path: &str) -> Result<Self, PathQueryError> {
        if path.trim().is_empty() {
            return Err(PathQueryError::Empty);
        }
        let mut steps = Vec::new();
        for (position, segment) in path.split('.').enumerate() {
            parse_segment(path, position, segment, &mut steps)?;
        }
        Ok(Self {
            source: path.to_string(),
            steps,
        })
    }

    /// Builds the query `prefix.<self>` without re-parsing.
    pub fn prefixed(&self, prefix: &str) -> Self {
        let mut steps = vec![Step::Field(prefix.to_string())];
        steps.extend(self.steps.iter().cloned());
        Self {
            source: format!("{prefix}.{}", self.source),
            steps,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn find_first<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        find_from(root, &self.steps)
    }
}

impl FromStr for PathQuery {
    type Err = PathQueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PathQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse_segment(
    path: &str,
    position: usize,
    segment: &str,
    steps: &mut Vec<Step>,
) -> Result<(), PathQueryError> {
    let segment = segment.trim();
    let (name, mut rest) = match segment.find('[') {
        Some(idx) => (&segment[..idx], &segment[idx..]),
        None => (segment, ""),
    };

    if name.is_empty() && rest.is_empty() {
        return Err(PathQueryError::EmptySegment {
            path: path.to_string(),
            position,
        });
    }
    match name {
        "" => {}
        "*" => steps.push(Step::AnyChild),
        field => steps.push(Step::Field(field.to_string())),
    }

    while !rest.is_empty() {
        let Some(close) = rest.find(']') else {
            return Err(PathQueryError::UnterminatedBracket {
                path: path.to_string(),
            });
        };
        let inner = rest[1..close].trim();
        if inner == "*" {
            steps.push(Step::AnyChild);
        } else {
            let index = inner.parse::<usize>().map_err(|_| PathQueryError::InvalidIndex {
                path: path.to_string(),
                index: inner.to_string(),
            })?;
            steps.push(Step::Index(index));
        }
        rest = &rest[close + 1..];
        if !rest.is_empty() && !rest.starts_with('[') {
            return Err(PathQueryError::UnterminatedBracket {
                path: path.to_string(),
            });
        }
    }
    Ok(())
}

fn find_from<'a>(node: &'a Value, steps: &[Step]) -> Option<&'a Value> {
    let Some((step, rest)) = steps.split_first() else {
        return Some(node);
    };
    match step {
        Step::Field(name) => node.as_object()?.get(name).and_then(|n| find_from(n, rest)),
        Step::Index(index) => node.as_array()?.get(*index).and_then(|n| find_from(n, rest)),
        Step::AnyChild => match node {
            Value::Object(map) => map.values().find_map(|n| find_from(n, rest)),
            Value::Array(items) => items.iter().find_map(|n| find_from(n, rest)),
            _ => None,
        },
    }
}
