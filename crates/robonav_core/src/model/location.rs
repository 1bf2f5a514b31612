use serde::{Deserialize, Serialize};

use super::string_or_number_list;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub coordinates: String,
    #[serde(default, deserialize_with = "string_or_number_list")]
    pub robots: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteLocation {
    pub location_name: String,
    pub location_coordinates: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}
