use serde::{Deserialize, Deserializer, Serialize};

use super::{string_or_number, string_or_number_list};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Robot {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(alias = "ping", default)]
    pub ip: String,
    #[serde(default, deserialize_with = "battery_percentage")]
    pub battery: u8,
    #[serde(alias = "location", default)]
    pub location_name: String,
    #[serde(default)]
    pub location_coordinates: String,
    #[serde(default, deserialize_with = "string_or_number_list")]
    pub tasks: Vec<String>,
}

impl Robot {
    pub fn has_location(&self) -> bool {
        !self.location_name.trim().is_empty()
    }

    pub fn battery_level(&self) -> BatteryLevel {
        BatteryLevel::from_percentage(self.battery)
    }

    pub fn clear_location(&mut self) {
        self.location_name.clear();
        self.location_coordinates.clear();
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBattery {
    Integer(i64),
    Float(f64),
}

/// Backend rows pass the stored value through, so it may be null or out of range.
fn battery_percentage<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let percentage = match Option::<RawBattery>::deserialize(deserializer)? {
        None => 0,
        Some(RawBattery::Integer(value)) => value.clamp(0, 100),
        Some(RawBattery::Float(value)) => value.round().clamp(0.0, 100.0) as i64,
    };
    Ok(u8::try_from(percentage).unwrap_or(0))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatteryLevel {
    Full,
    Half,
    Empty,
}

impl BatteryLevel {
    pub fn from_percentage(percentage: u8) -> Self {
        if percentage > 75 {
            Self::Full
        } else if percentage > 25 {
            Self::Half
        } else {
            Self::Empty
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Half => "half",
            Self::Empty => "empty",
        }
    }
}
