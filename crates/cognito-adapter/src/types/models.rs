/*
[INPUT]:  Identifiers issued by the task service
[OUTPUT]: TaskHandle newtype accepting numeric or string ids
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When the service changes its id representation
*/

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier issued by the service when a task is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TaskHandle(String);

impl TaskHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TaskHandle {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(i64),
            Text(String),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Number(id) => Ok(TaskHandle(id.to_string())),
            RawId::Text(id) => Ok(TaskHandle(id)),
        }
    }
}
