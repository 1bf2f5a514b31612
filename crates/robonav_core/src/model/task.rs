use serde::{Deserialize, Serialize};

use super::string_or_number;

/// Timestamp sentinel the backend emits for "unknown".
pub const NULL_TIMESTAMP: &str = "null";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(
        rename = "robot",
        alias = "robot_id",
        default,
        deserialize_with = "string_or_number"
    )]
    pub robot_id: String,
    #[serde(default = "TaskState::missing")]
    pub state: TaskState,
    #[serde(rename = "dateCreated", alias = "start", default = "null_timestamp")]
    pub date_created: String,
    #[serde(default = "null_timestamp")]
    pub end: String,
}

fn null_timestamp() -> String {
    NULL_TIMESTAMP.to_string()
}

/// Wire state of a task. Encoded as the strings "-1", "0", "1" and "2".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawState", into = "String")]
pub enum TaskState {
    Error,
    Queued,
    Active,
    Complete,
    Unknown(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawState {
    Text(String),
    Integer(i64),
}

impl TaskState {
    fn missing() -> Self {
        Self::Unknown(String::new())
    }

    /// Exact match on the wire value; padded values are unknown.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "-1" => Self::Error,
            "0" => Self::Queued,
            "1" => Self::Active,
            "2" => Self::Complete,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Error => "-1",
            Self::Queued => "0",
            Self::Active => "1",
            Self::Complete => "2",
            Self::Unknown(raw) => raw,
        }
    }
}

impl From<RawState> for TaskState {
    fn from(raw: RawState) -> Self {
        match raw {
            RawState::Text(value) => Self::parse(&value),
            RawState::Integer(value) => Self::parse(&value.to_string()),
        }
    }
}

impl From<TaskState> for String {
    fn from(state: TaskState) -> Self {
        state.as_str().to_string()
    }
}

/// Display classification of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Active,
    Error,
    Queued,
    Complete,
    Unknown,
}

impl TaskStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Error => "Error",
            Self::Queued => "Queued",
            Self::Complete => "Complete",
            Self::Unknown => "Unknown",
        }
    }
}

pub fn display_timestamp(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == NULL_TIMESTAMP {
        "Unknown"
    } else {
        trimmed
    }
}
