//! Result rows.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::SessionError;
use crate::sql::Value;

/// One result row: column names with their values, in select order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column. Builder style, for tests and canned sessions.
    pub fn with(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.push(column, value);
        self
    }

    pub fn push(&mut self, column: &str, value: impl Into<Value>) {
        self.columns.push((column.into(), value.into()));
    }

    /// Value of the first column with this name.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, v)| v)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Decode into any `Deserialize` type by treating the row as an object.
    ///
    /// Later columns win when names repeat.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, SessionError> {
        let mut object = serde_json::Map::with_capacity(self.columns.len());
        for (name, value) in &self.columns {
            object.insert(name.clone(), serde_json::to_value(value)?);
        }
        Ok(serde_json::from_value(serde_json::Value::Object(object))?)
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}
