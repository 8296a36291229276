//! Declarative projection of nested-array page data into flat records.
//!
//! The embedded data blobs on Play Store pages are positional JSON arrays
//! with no field names. A [`FieldTable`] is the only place that knows where
//! a value lives; when the upstream shape drifts, the fix is a path edit.

use serde_json::{Map, Value};

/// Post-processing applied to the value found at a path. Receives `None`
/// when the path did not resolve, so it can supply a default.
pub type Transform = fn(Option<&Value>) -> Value;

/// Where a field lives, and optionally how to massage it.
#[derive(Clone, Copy)]
pub enum FieldSpec {
    Path(&'static [usize]),
    Transformed {
        path: &'static [usize],
        transform: Transform,
    },
}

impl FieldSpec {
    #[must_use]
    pub fn path(&self) -> &'static [usize] {
        match self {
            Self::Path(path) | Self::Transformed { path, .. } => path,
        }
    }
}

impl std::fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Transformed { path, .. } => f
                .debug_struct("Transformed")
                .field("path", path)
                .finish_non_exhaustive(),
        }
    }
}

/// Ordered `(output field, spec)` pairs.
pub type FieldTable = [(&'static str, FieldSpec)];

/// A flat record produced by [`project`]. Every field of the table is
/// present; a path that did not resolve is stored as `Value::Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    fields: Vec<(&'static str, Value)>,
}

impl Record {
    /// Returns the value for `name`, or `None` when it is absent or unknown.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
            .filter(|value| !value.is_null())
    }

    /// `true` when the table declared `name`, regardless of its value.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(field, _)| *field == name)
    }

    #[must_use]
    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    #[must_use]
    pub fn f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    #[must_use]
    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// Field names in table order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(field, _)| *field)
    }

    /// Converts into a JSON object, keeping explicit nulls.
    #[must_use]
    pub fn into_json(self) -> Value {
        let map: Map<String, Value> = self
            .fields
            .into_iter()
            .map(|(field, value)| (field.to_owned(), value))
            .collect();
        Value::Object(map)
    }
}

/// Descends `doc` one array index at a time.
///
/// Returns `None` as soon as a step hits a non-array or an out-of-range
/// index; never panics on malformed input.
#[must_use]
pub fn resolve_path<'a>(doc: &'a Value, path: &[usize]) -> Option<&'a Value> {
    path.iter()
        .try_fold(doc, |node, &index| node.as_array()?.get(index))
}

/// Builds one [`Record`] from one document item.
#[must_use]
pub fn project(doc: &Value, table: &FieldTable) -> Record {
    let fields = table
        .iter()
        .map(|(name, spec)| {
            let found = resolve_path(doc, spec.path());
            let value = match spec {
                FieldSpec::Path(_) => found.cloned().unwrap_or(Value::Null),
                FieldSpec::Transformed { transform, .. } => transform(found),
            };
            (*name, value)
        })
        .collect();
    Record { fields }
}

/// Projects every item, preserving source order.
#[must_use]
pub fn project_all(items: &[Value], table: &FieldTable) -> Vec<Record> {
    items.iter().map(|item| project(item, table)).collect()
}
