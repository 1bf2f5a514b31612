use clap::{Parser, Subcommand};
use robonav_core::error::AppError;
use robonav_core::screens::{MapAction, PositionInput};

#[derive(Parser, Debug)]
#[command(author, version, about = "Robot fleet client", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and store the session token
    ///
    /// Example: robonav login robotuser1 secret123
    Login { username: String, password: String },
    /// Forget the stored session token
    Logout,
    /// Create an account
    ///
    /// Example: robonav signup robotuser10 me@example.com longpass1 longpass1
    Signup {
        username: String,
        email: String,
        password: String,
        confirm: String,
    },
    /// Show whether a valid session is stored
    Session,
    /// List robots with battery, location and active task
    ///
    /// Example: robonav robots --remote
    Robots {
        /// Fetch from the backend instead of the bundled files
        #[arg(long)]
        remote: bool,
    },
    /// List open tasks followed by the most recently completed ones
    ///
    /// Example: robonav tasks
    Tasks {
        /// Fetch from the backend instead of the bundled files
        #[arg(long)]
        remote: bool,
    },
    /// Show details of a task
    ///
    /// Example: robonav task 12
    Task {
        id: String,
        #[arg(long)]
        remote: bool,
    },
    /// Show details of a robot
    ///
    /// Example: robonav robot 3
    Robot {
        id: String,
        #[arg(long)]
        remote: bool,
    },
    /// Map and location actions
    ///
    /// Example: robonav map position Atlas
    Map {
        #[command(subcommand)]
        action: MapCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum MapCommand {
    /// Check a robot's current position
    Position { robot: String },
    /// Set a robot's initial position
    ///
    /// Example: robonav map set-position Atlas --coordinates "45.0, -93.5"
    /// Example: robonav map set-position Atlas --location "Dock A"
    SetPosition {
        robot: String,
        #[arg(
            long,
            allow_hyphen_values = true,
            conflicts_with = "location",
            required_unless_present = "location"
        )]
        coordinates: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },
    /// Save a robot's current location as a checkpoint
    Save { robot: String },
    /// Remove the location of every robot
    Clear,
    /// Look up the coordinates of a named location
    Location { name: String },
    /// List bundled locations, or saved checkpoints with --saved
    Locations {
        #[arg(long)]
        saved: bool,
    },
    /// Show the current map file
    Current,
    /// Swap to another map file
    ///
    /// Example: robonav map swap map_file_2.json
    Swap { file: String },
    /// Fetch a robot's locations from the backend
    Remote { robot_id: String },
}

impl MapCommand {
    pub fn into_action(self) -> MapAction {
        match self {
            Self::Position { robot } => MapAction::CheckPosition { robot },
            Self::SetPosition {
                robot,
                coordinates,
                location,
            } => {
                let input = match (coordinates, location) {
                    (Some(raw), _) => PositionInput::Coordinates(raw),
                    (None, Some(name)) => PositionInput::Location(name),
                    (None, None) => PositionInput::Coordinates(String::new()),
                };
                MapAction::SetInitialPosition { robot, input }
            }
            Self::Save { robot } => MapAction::SaveCurrentLocation { robot },
            Self::Clear => MapAction::RemoveAllLocations,
            Self::Location { name } => MapAction::LocationByName { name },
            Self::Locations { saved: false } => MapAction::AllLocations,
            Self::Locations { saved: true } => MapAction::SavedLocations,
            Self::Current => MapAction::CurrentMap,
            Self::Swap { file } => MapAction::SwapMap { file },
            Self::Remote { robot_id } => MapAction::RobotLocations { robot_id },
        }
    }
}

/// First line of a clap error, without its `error: ` prefix.
pub fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

/// Splits an interactive line into arguments. Double quotes group words;
/// inside them `\"` and `\\` are escapes and any other backslash is kept.
pub fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        match ch {
            '\\' if in_quotes => escape = true,
            '"' => {
                in_quotes = !in_quotes;
                quoted = true;
            }
            ch if ch.is_whitespace() && !in_quotes => {
                if !current.is_empty() || quoted {
                    args.push(std::mem::take(&mut current));
                }
                quoted = false;
            }
            ch => current.push(ch),
        }
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }
    if !current.is_empty() || quoted {
        args.push(current);
    }

    Ok(args)
}
