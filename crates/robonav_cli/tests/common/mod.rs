#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

const ASSET_FILES: [&str; 3] = ["robots.json", "locations.json", "tasks.json"];

/// Isolated data and asset directories seeded from the bundled sample files.
pub struct Sandbox {
    pub root: PathBuf,
}

impl Sandbox {
    pub fn new(label: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let root = std::env::temp_dir().join(format!("robonav-cli-{nanos}-{label}"));
        let assets = root.join("assets");
        std::fs::create_dir_all(&assets).unwrap();

        let bundled = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets");
        for name in ASSET_FILES {
            std::fs::copy(bundled.join(name), assets.join(name)).unwrap();
        }
        Self { root }
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.root.join("assets")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_robonav"));
        cmd.env("ROBONAV_CONFIG_PATH", self.root.join("config.json"))
            .env("ROBONAV_DATA_DIR", self.data_dir())
            .env("ROBONAV_ASSETS_DIR", self.assets_dir())
            .env_remove("ROBONAV_BASE_URL")
            .env_remove("ROBONAV_LOG");
        cmd
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.command()
            .args(args)
            .output()
            .expect("failed to run robonav")
    }

    pub fn run_interactive(&self, input: &str) -> Output {
        let mut child = self
            .command()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("failed to spawn interactive session");

        {
            let stdin = child.stdin.as_mut().expect("stdin");
            stdin
                .write_all(input.as_bytes())
                .expect("failed to write to stdin");
        }

        child
            .wait_with_output()
            .expect("failed to read interactive output")
    }

    /// Writes a session token straight into the preference file.
    pub fn store_token(&self, token: &str) {
        let prefs = self.data_dir().join("prefs");
        std::fs::create_dir_all(&prefs).unwrap();
        let content = serde_json::json!({ "JWT_TOKEN": token });
        std::fs::write(prefs.join("APP_PREFS.json"), content.to_string()).unwrap();
    }

    pub fn stored_token(&self) -> Option<String> {
        let path = self.data_dir().join("prefs").join("APP_PREFS.json");
        let content = std::fs::read_to_string(path).ok()?;
        let values: serde_json::Value = serde_json::from_str(&content).ok()?;
        values["JWT_TOKEN"].as_str().map(str::to_string)
    }
}

impl Drop for Sandbox {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.root).ok();
    }
}

pub fn token_expiring_at(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(serde_json::json!({ "exp": exp }).to_string());
    format!("{header}.{payload}.signature")
}

pub fn now_epoch_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
