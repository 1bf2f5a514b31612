mod location;
mod robot;
mod task;

pub use location::{Coordinates, Location, RemoteLocation};
pub use robot::{BatteryLevel, Robot};
pub use task::{NULL_TIMESTAMP, Task, TaskState, TaskStatus, display_timestamp};

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Integer(i64),
}

/// Backend rows carry integer ids while bundled assets use strings.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(value) => value,
        RawId::Integer(value) => value.to_string(),
    })
}

pub(crate) fn string_or_number_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<RawId>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|id| match id {
            RawId::Text(value) => value,
            RawId::Integer(value) => value.to_string(),
        })
        .collect())
}
