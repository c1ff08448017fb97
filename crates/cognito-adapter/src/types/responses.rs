/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust response structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use serde::{Deserialize, Serialize};

use super::enums::TaskStatus;
use super::models::TaskHandle;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityResponse {
    pub username: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub task_id: TaskHandle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatusResponse {
    #[serde(default)]
    pub id: Option<TaskHandle>,
    pub status: TaskStatus,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,
    #[serde(default)]
    pub episode_id: Option<i64>,
}

/// Error body returned by the service on non-success responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: serde_json::Value,
}

impl ErrorBody {
    /// Render `detail` as text; strings are used verbatim.
    pub fn detail_text(&self) -> String {
        match &self.detail {
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

fn default_token_type() -> String {
    "bearer".to_string()
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_response_with_null_message() {
        let body = r#"{"id": 7, "status": "downloading", "message": null, "episode_id": null}"#;
        let parsed: TaskStatusResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.id, Some(TaskHandle::new("7")));
        assert_eq!(parsed.status, TaskStatus::Downloading);
        assert_eq!(parsed.message, "");
        assert_eq!(parsed.episode_id, None);
    }

    #[test]
    fn test_error_body_detail_text() {
        let plain: ErrorBody = serde_json::from_str(r#"{"detail": "task not found"}"#).unwrap();
        assert_eq!(plain.detail_text(), "task not found");

        let structured: ErrorBody =
            serde_json::from_str(r#"{"detail": [{"loc": ["body", "url"], "msg": "invalid"}]}"#)
                .unwrap();
        assert_eq!(
            structured.detail_text(),
            r#"[{"loc":["body","url"],"msg":"invalid"}]"#
        );
    }
}
