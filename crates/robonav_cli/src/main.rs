use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use robonav_cli::cli::{Cli, Command, normalize_parse_error, split_command_line};
use robonav_core::adapters::{RobotDetail, RobotRow, TaskDetail, TaskRow};
use robonav_core::api::ApiClient;
use robonav_core::config::{
    Config, ConfigOverrides, Palette, load_config_with_fallback, merge_overrides,
    palette_for_theme,
};
use robonav_core::error::AppError;
use robonav_core::screens::{
    FleetScreen, FleetSnapshot, LoginScreen, MapAction, MapScreen, RemoteSession, ScreenState,
    SignUpScreen,
};
use robonav_core::session::{TokenStatus, check_session, now_epoch_seconds};
use robonav_core::storage::{DataStore, FilePreferences};
use serde::Serialize;
use std::io::{self, BufRead};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "ROBONAV_LOG";

struct App {
    store: DataStore,
    prefs: FilePreferences,
    api: ApiClient,
    palette: Palette,
    json: bool,
}

impl App {
    fn load(json: bool, overrides: &[String]) -> Result<Self, AppError> {
        let loaded = load_config_with_fallback();
        if let Some(err) = loaded.error {
            warn!(error = %err, "using default configuration");
        }

        let mut merged = ConfigOverrides::from_env();
        for raw in overrides {
            merged.apply(raw)?;
        }
        let config: Config = merge_overrides(&loaded.config, &merged);
        debug!(?config, "configuration resolved");

        let data_dir = config.data_dir()?;
        Ok(Self {
            store: DataStore::new(config.assets_dir()?, &data_dir),
            prefs: FilePreferences::open(&data_dir),
            api: ApiClient::new(config.base_url()),
            palette: palette_for_theme(config.theme.as_deref()),
            json,
        })
    }

    fn remote_session(&mut self) -> Result<RemoteSession, AppError> {
        RemoteSession::from_store(self.api.clone(), &mut self.prefs)
    }

    async fn fleet(&mut self, remote: bool) -> Result<FleetSnapshot, AppError> {
        let mut screen = FleetScreen::new(self.store.clone());
        let snapshot = if remote {
            let session = self.remote_session()?;
            screen.load_remote(&session).await?.unwrap_or_default()
        } else {
            screen.load_local()
        };
        print_notices(&mut screen.state);
        Ok(snapshot)
    }
}

#[derive(Tabled)]
struct RobotLine {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Battery")]
    battery: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Task")]
    task: String,
}

impl From<RobotRow> for RobotLine {
    fn from(row: RobotRow) -> Self {
        Self {
            battery: format!("{}% ({})", row.battery, row.battery_level.label()),
            id: row.id,
            name: row.name,
            ip: row.ip,
            location: row.location,
            task: row.task,
        }
    }
}

#[derive(Tabled)]
struct TaskLine {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Robot")]
    robot: String,
    #[tabled(rename = "Started")]
    started: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), AppError> {
    let rendered =
        serde_json::to_string(value).map_err(|err| AppError::invalid_data(err.to_string()))?;
    println!("{rendered}");
    Ok(())
}

fn print_table<T: Tabled>(lines: Vec<T>, empty: &str) {
    if lines.is_empty() {
        println!("{empty}");
        return;
    }
    let mut table = Table::new(lines);
    table.with(Style::psql());
    println!("{table}");
}

fn print_notices(state: &mut ScreenState) {
    for notice in state.take_notices() {
        eprintln!("NOTICE: {notice}");
    }
}

fn print_robots(app: &App, rows: Vec<RobotRow>) -> Result<(), AppError> {
    if app.json {
        return print_json(&rows);
    }
    print_table(
        rows.into_iter().map(RobotLine::from).collect(),
        "No robots found.",
    );
    Ok(())
}

fn print_tasks(app: &App, rows: Vec<TaskRow>) -> Result<(), AppError> {
    if app.json {
        return print_json(&rows);
    }
    let lines: Vec<TaskLine> = rows
        .into_iter()
        .map(|row| TaskLine {
            status: app.palette.status(row.status),
            id: row.id,
            name: row.name,
            robot: row.robot,
            started: row.started,
        })
        .collect();
    print_table(lines, "No tasks found.");
    Ok(())
}

fn print_task_detail(app: &App, detail: &TaskDetail) -> Result<(), AppError> {
    if app.json {
        return print_json(detail);
    }
    println!("Task: {} ({})", detail.name, detail.id);
    println!("Robot: {}", detail.robot);
    println!("Status: {}", app.palette.status(detail.status));
    println!("Started: {}", detail.started);
    if let Some(completed) = detail.completed.as_deref() {
        println!("Completed: {completed}");
    }
    Ok(())
}

fn print_robot_detail(app: &App, detail: &RobotDetail) -> Result<(), AppError> {
    if app.json {
        return print_json(detail);
    }
    println!("Robot: {} ({})", detail.name, detail.id);
    println!("IP: {}", detail.ip);
    println!(
        "Battery: {}% ({})",
        detail.battery,
        detail.battery_level.label()
    );
    println!("Location: {}", detail.location);
    println!("Coordinates: {}", detail.coordinates);
    match detail.active_task.as_ref() {
        Some(task) => println!("Task: {} (started {})", task.name, task.started),
        None => println!("Task: None"),
    }
    Ok(())
}

fn print_session(app: &App, status: TokenStatus) -> Result<(), AppError> {
    if app.json {
        let (label, exp) = match status {
            TokenStatus::Missing => ("missing", None),
            TokenStatus::Malformed | TokenStatus::MalformedPayload => ("malformed", None),
            TokenStatus::Expired { exp } => ("expired", Some(exp)),
            TokenStatus::Valid { exp } => ("valid", Some(exp)),
        };
        return print_json(&serde_json::json!({
            "valid": status.is_valid(),
            "status": label,
            "exp": exp,
        }));
    }

    match status {
        TokenStatus::Valid { exp } => println!("Session valid (expires at {exp})"),
        TokenStatus::Expired { .. } => println!("Session expired. Please log in again."),
        TokenStatus::Missing => println!("Not logged in."),
        TokenStatus::Malformed | TokenStatus::MalformedPayload => {
            println!("Stored session is invalid. Please log in again.")
        }
    }
    Ok(())
}

fn is_display_request(err: &clap::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
    )
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

async fn run_command(cli: Cli) -> Result<(), AppError> {
    let mut app = App::load(cli.json, &cli.config_override)?;

    match cli.command {
        Command::Login { username, password } => {
            let mut screen = LoginScreen::new();
            screen
                .submit(&app.api, &mut app.prefs, &username, &password)
                .await?;
            let messages = screen.state.take_notices();
            if app.json {
                print_json(&serde_json::json!({
                    "username": username.trim(),
                    "logged_in": true,
                    "messages": messages,
                }))?;
            } else {
                for message in messages {
                    println!("{message}");
                }
                println!("Logged in as {}", username.trim());
            }
        }
        Command::Logout => {
            let mut screen = LoginScreen::new();
            screen.logout(&mut app.prefs)?;
            if app.json {
                print_json(&serde_json::json!({ "logged_in": false }))?;
            } else {
                for message in screen.state.take_notices() {
                    println!("{message}");
                }
            }
        }
        Command::Signup {
            username,
            email,
            password,
            confirm,
        } => {
            let mut screen = SignUpScreen::new();
            let outcome = screen
                .submit(&app.api, &username, &email, &password, &confirm)
                .await?;
            if app.json {
                print_json(&serde_json::json!({
                    "username": outcome.username,
                    "message": outcome.message,
                }))?;
            } else {
                println!("{}", outcome.message);
                println!("Log in with: robonav login {} <password>", outcome.username);
            }
        }
        Command::Session => {
            let status = check_session(&mut app.prefs, now_epoch_seconds());
            print_session(&app, status)?;
        }
        Command::Robots { remote } => {
            let snapshot = app.fleet(remote).await?;
            print_robots(&app, snapshot.robot_rows())?;
        }
        Command::Tasks { remote } => {
            let snapshot = app.fleet(remote).await?;
            print_tasks(&app, snapshot.task_rows())?;
        }
        Command::Task { id, remote } => {
            let snapshot = app.fleet(remote).await?;
            print_task_detail(&app, &snapshot.task_detail(&id)?)?;
        }
        Command::Robot { id, remote } => {
            let snapshot = app.fleet(remote).await?;
            print_robot_detail(&app, &snapshot.robot_detail(&id)?)?;
        }
        Command::Map { action } => {
            let action = action.into_action();
            let remote = match &action {
                MapAction::RobotLocations { .. } => Some(app.remote_session()?),
                _ => None,
            };

            let mut screen = MapScreen::new(app.store.clone());
            let result = screen.render(action, remote.as_ref()).await;
            let view = match result {
                Ok(view) => view,
                Err(err) => {
                    // The last notice repeats the failure, which the caller reports.
                    let mut notices = screen.state.take_notices();
                    notices.pop();
                    for notice in notices {
                        eprintln!("NOTICE: {notice}");
                    }
                    return Err(err);
                }
            };
            print_notices(&mut screen.state);
            if app.json {
                print_json(&view)?;
            } else {
                println!("{}", view.message());
            }
        }
    }

    Ok(())
}

async fn run_interactive() -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("robonav".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) if is_display_request(&err) => {
                print!("{err}");
                continue;
            }
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(err) = run_command(cli).await {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        if let Err(err) = run_interactive().await {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if is_display_request(&err) => err.exit(),
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(cli).await {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
