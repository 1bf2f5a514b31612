use crate::api::RequestSlot;
use crate::error::AppError;
use crate::model::{Coordinates, Location, RemoteLocation, Robot};
use crate::screens::{RemoteSession, ScreenState};
use crate::storage::json_store::{LOCATIONS_FILE, ROBOTS_FILE};
use crate::storage::{CollectionSource, DataStore};
use crate::task_list::find_robot_by_name;
use crate::validation::parse_coordinates;
use serde::Serialize;
use tracing::{debug, info};

pub const MAP_FILES: [&str; 3] = ["map_file_1.json", "map_file_2.json", "map_file_3.json"];
pub const CURRENT_MAP_FILE: &str = "current_map.json";
pub const CURRENT_MAP_DETAILS: &str = "Map Size: 5MB, Updated: 2024-11-28";

/// Where an initial position comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionInput {
    /// Typed as `latitude, longitude`.
    Coordinates(String),
    /// Name of a bundled location whose coordinates are used.
    Location(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapAction {
    CheckPosition { robot: String },
    SetInitialPosition { robot: String, input: PositionInput },
    SaveCurrentLocation { robot: String },
    RemoveAllLocations,
    LocationByName { name: String },
    AllLocations,
    SavedLocations,
    CurrentMap,
    SwapMap { file: String },
    RobotLocations { robot_id: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum MapView {
    Position {
        robot: String,
        location_name: String,
        coordinates: String,
    },
    PositionSet {
        robot: String,
        input: String,
        position: Coordinates,
    },
    LocationSaved {
        robot: String,
        location: Location,
    },
    LocationsCleared {
        robots: usize,
    },
    LocationCoordinates {
        name: String,
        coordinates: Option<String>,
    },
    Locations {
        saved: bool,
        locations: Vec<Location>,
    },
    CurrentMap {
        file_name: String,
        details: String,
    },
    MapSwapped {
        file: String,
    },
    RobotLocations {
        robot_id: String,
        locations: Vec<RemoteLocation>,
    },
    /// A newer request for the same slot was issued before this one finished.
    Superseded,
}

impl MapView {
    pub fn message(&self) -> String {
        match self {
            Self::Position {
                robot,
                location_name,
                coordinates,
            } => format!(
                "Checked Position for {robot}\nLocation Name: {location_name}\nCoordinates: {coordinates}"
            ),
            Self::PositionSet { robot, input, .. } => {
                format!("Initial position set for {robot} at coordinates: {input}")
            }
            Self::LocationSaved { robot, location } => format!(
                "Saved location for {robot} at coordinates: {}",
                location.coordinates
            ),
            Self::LocationsCleared { .. } => "All robot locations have been cleared.".to_string(),
            Self::LocationCoordinates {
                coordinates: Some(coordinates),
                ..
            } => format!("Coordinates: {coordinates}"),
            Self::LocationCoordinates { coordinates: None, .. } => {
                "Coordinates not found for the selected location.".to_string()
            }
            Self::Locations { saved, locations } => {
                if locations.is_empty() {
                    return "No locations found.".to_string();
                }
                let mut out = String::from(if *saved {
                    "Saved Locations:"
                } else {
                    "All Locations:"
                });
                for location in locations {
                    out.push_str(&format!(
                        "\n{} (Coordinates: {})",
                        location.name, location.coordinates
                    ));
                }
                out
            }
            Self::CurrentMap { file_name, details } => {
                format!("Map file retrieved successfully:\nFile Name: {file_name}\n{details}")
            }
            Self::MapSwapped { file } => format!("Map file swapped successfully to: {file}"),
            Self::RobotLocations {
                robot_id,
                locations,
            } => {
                if locations.is_empty() {
                    return format!("No locations found for robot {robot_id}.");
                }
                let mut out = format!("Locations for robot {robot_id}:");
                for location in locations {
                    out.push_str(&format!(
                        "\n{} (Coordinates: {})",
                        location.location_name, location.location_coordinates
                    ));
                }
                out
            }
            Self::Superseded => String::new(),
        }
    }
}

/// Controller behind the map actions menu.
#[derive(Debug)]
pub struct MapScreen {
    pub state: ScreenState,
    store: DataStore,
    locations_slot: RequestSlot,
}

impl MapScreen {
    pub fn new(store: DataStore) -> Self {
        Self {
            state: ScreenState::new(),
            store,
            locations_slot: RequestSlot::new(),
        }
    }

    pub fn robot_names(&mut self) -> Vec<String> {
        self.robots().into_iter().map(|robot| robot.name).collect()
    }

    /// Robots that can have their position saved.
    pub fn robots_with_locations(&mut self) -> Vec<Robot> {
        self.robots()
            .into_iter()
            .filter(Robot::has_location)
            .collect()
    }

    pub fn location_names(&mut self) -> Vec<String> {
        self.bundled_locations()
            .into_iter()
            .map(|location| location.name)
            .collect()
    }

    /// Runs one action. Failures are also left as a notice on the screen.
    pub async fn render(
        &mut self,
        action: MapAction,
        remote: Option<&RemoteSession>,
    ) -> Result<MapView, AppError> {
        debug!(?action, "map action");
        let result = self.dispatch(action, remote).await;
        if let Err(err) = &result {
            self.state.notify(err.message());
        }
        result
    }

    async fn dispatch(
        &mut self,
        action: MapAction,
        remote: Option<&RemoteSession>,
    ) -> Result<MapView, AppError> {
        match action {
            MapAction::CheckPosition { robot } => self.check_position(&robot),
            MapAction::SetInitialPosition { robot, input } => {
                self.set_initial_position(&robot, input)
            }
            MapAction::SaveCurrentLocation { robot } => self.save_current_location(&robot),
            MapAction::RemoveAllLocations => self.remove_all_locations(),
            MapAction::LocationByName { name } => self.location_by_name(&name),
            MapAction::AllLocations => Ok(MapView::Locations {
                saved: false,
                locations: self.bundled_locations(),
            }),
            MapAction::SavedLocations => Ok(MapView::Locations {
                saved: true,
                locations: self.saved_locations()?,
            }),
            MapAction::CurrentMap => Ok(MapView::CurrentMap {
                file_name: CURRENT_MAP_FILE.to_string(),
                details: CURRENT_MAP_DETAILS.to_string(),
            }),
            MapAction::SwapMap { file } => swap_map(&file),
            MapAction::RobotLocations { robot_id } => {
                let remote = remote.ok_or_else(|| AppError::auth("Please log in first."))?;
                let view = match self.fetch_robot_locations(remote, &robot_id).await? {
                    Some(locations) => MapView::RobotLocations {
                        robot_id,
                        locations,
                    },
                    None => MapView::Superseded,
                };
                Ok(view)
            }
        }
    }

    /// Fetches a robot's remote locations through the screen's request slot.
    /// Returns `None` when a newer fetch was issued while this one was in flight.
    pub async fn fetch_robot_locations(
        &self,
        remote: &RemoteSession,
        robot_id: &str,
    ) -> Result<Option<Vec<RemoteLocation>>, AppError> {
        let ticket = self.locations_slot.issue();
        match remote
            .api
            .fetch_robot_locations(robot_id, &remote.token)
            .await
        {
            Ok(locations) => Ok(self.locations_slot.accept(ticket, locations)),
            Err(err) if self.locations_slot.is_current(ticket) => Err(err),
            Err(err) => {
                debug!(error = %err, "discarding superseded failure");
                Ok(None)
            }
        }
    }

    fn check_position(&mut self, name: &str) -> Result<MapView, AppError> {
        let robots = self.robots();
        let robot = find_robot_by_name(name, &robots)
            .ok_or_else(|| AppError::invalid_input("Please select a robot with a valid location."))?;

        let view = MapView::Position {
            robot: robot.name.clone(),
            location_name: robot.location_name.clone(),
            coordinates: robot.location_coordinates.clone(),
        };
        self.state.append_output(view.message());
        Ok(view)
    }

    fn set_initial_position(
        &mut self,
        robot: &str,
        input: PositionInput,
    ) -> Result<MapView, AppError> {
        let raw = match input {
            PositionInput::Coordinates(raw) => raw,
            PositionInput::Location(name) => self.coordinates_for(&name).unwrap_or_default(),
        };
        let robot = robot.trim();
        if robot.is_empty() || raw.trim().is_empty() {
            return Err(AppError::invalid_input(
                "Please select a robot and provide coordinates.",
            ));
        }

        let position = parse_coordinates(&raw)?;
        let view = MapView::PositionSet {
            robot: robot.to_string(),
            input: raw,
            position,
        };
        self.state.append_output(view.message());
        Ok(view)
    }

    fn save_current_location(&mut self, name: &str) -> Result<MapView, AppError> {
        if name.trim().is_empty() {
            return Err(AppError::invalid_input("Please select a robot."));
        }
        let robots = self.robots_with_locations();
        let robot = find_robot_by_name(name, &robots).ok_or_else(|| {
            AppError::invalid_input("No valid location found for the selected robot.")
        })?;

        let location = Location {
            name: format!("Checkpoint for {}", robot.name),
            coordinates: robot.location_coordinates.clone(),
            robots: vec![robot.id.clone()],
        };
        let mut saved = self.saved_locations()?;
        saved.push(location.clone());
        self.store
            .save_collection(LOCATIONS_FILE, &saved)
            .map_err(|err| AppError::io(format!("Error saving location: {}", err.message())))?;
        info!(robot = %robot.name, "saved checkpoint");

        let view = MapView::LocationSaved {
            robot: robot.name.clone(),
            location,
        };
        self.state.notify("Location saved successfully.");
        self.state.append_output(view.message());
        Ok(view)
    }

    fn remove_all_locations(&mut self) -> Result<MapView, AppError> {
        let mut robots = self
            .store
            .load_collection::<Robot>(self.store.robots_source(), ROBOTS_FILE)
            .map_err(|err| {
                AppError::invalid_data(format!("Error clearing locations: {}", err.message()))
            })?;
        robots.iter_mut().for_each(Robot::clear_location);
        self.store
            .save_collection(ROBOTS_FILE, &robots)
            .map_err(|err| AppError::io(format!("Error clearing locations: {}", err.message())))?;
        info!(count = robots.len(), "cleared robot locations");

        let view = MapView::LocationsCleared {
            robots: robots.len(),
        };
        self.state.notify(view.message());
        Ok(view)
    }

    fn location_by_name(&mut self, name: &str) -> Result<MapView, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::invalid_input("Please select a location."));
        }
        Ok(MapView::LocationCoordinates {
            name: name.to_string(),
            coordinates: self.coordinates_for(name),
        })
    }

    fn coordinates_for(&mut self, name: &str) -> Option<String> {
        self.bundled_locations()
            .into_iter()
            .find(|location| location.name == name)
            .map(|location| location.coordinates)
            .filter(|coordinates| !coordinates.is_empty())
    }

    fn robots(&mut self) -> Vec<Robot> {
        let load = self
            .store
            .load_collection_or_notice(self.store.robots_source(), ROBOTS_FILE);
        if let Some(err) = load.notice {
            self.state
                .notify(format!("Error loading robots: {}", err.message()));
        }
        load.records
    }

    fn bundled_locations(&mut self) -> Vec<Location> {
        let load = self
            .store
            .load_collection_or_notice(CollectionSource::Asset, LOCATIONS_FILE);
        if let Some(err) = load.notice {
            self.state
                .notify(format!("Error loading locations: {}", err.message()));
        }
        load.records
    }

    fn saved_locations(&self) -> Result<Vec<Location>, AppError> {
        self.store
            .load_collection(CollectionSource::Local, LOCATIONS_FILE)
    }
}

fn swap_map(file: &str) -> Result<MapView, AppError> {
    let file = file.trim();
    if file.is_empty() {
        return Err(AppError::invalid_input(
            "No map file selected. Please choose a map file.",
        ));
    }
    if !MAP_FILES.contains(&file) {
        return Err(AppError::invalid_input(format!(
            "Unknown map file: {file}. Choose one of {}",
            MAP_FILES.join(", ")
        )));
    }
    Ok(MapView::MapSwapped {
        file: file.to_string(),
    })
}
