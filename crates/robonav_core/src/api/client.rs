use crate::error::AppError;
use crate::model::{RemoteLocation, Robot, Task};
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

pub const DEFAULT_ERROR_MESSAGE: &str = "An error occurred. Please try again.";
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed. Try again.";
const REGISTERED_MESSAGE: &str = "Verification Email Sent";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResponse {
    pub token: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    token: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    message: Option<String>,
}

/// Thin wrapper over the backend's open and protected routes.
///
/// Each call issues exactly one request with the transport's default
/// timeout; failures are reported, never retried.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, AppError> {
        let url = format!("{}/api/open/users/login", self.base_url);
        debug!(%url, username, "login request");
        let body = serde_json::json!({
            "username": username,
            "password": password,
        });

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        if !resp.status().is_success() {
            let message = failure_message(resp).await;
            return Err(AppError::auth(message));
        }

        let parsed: LoginBody = resp
            .json()
            .await
            .map_err(|_| AppError::invalid_data("Error parsing response"))?;

        match parsed.token {
            Some(token) if !token.is_empty() => Ok(LoginResponse {
                token,
                message: parsed.message.unwrap_or_default(),
            }),
            _ => {
                warn!("login response did not carry a token");
                Err(AppError::auth(LOGIN_FAILED_MESSAGE))
            }
        }
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<String, AppError> {
        let url = format!("{}/api/open/users/register", self.base_url);
        debug!(%url, username, "register request");
        let body = serde_json::json!({
            "username": username,
            "email": email,
            "password": password,
        });

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        if !resp.status().is_success() {
            let message = failure_message(resp).await;
            return Err(AppError::invalid_input(message));
        }

        let text = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<MessageBody>(&text)
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| REGISTERED_MESSAGE.to_string());
        Ok(message)
    }

    pub async fn fetch_robots(&self, token: &str) -> Result<Vec<Robot>, AppError> {
        self.get_protected("/api/protected/robot/robots", token).await
    }

    pub async fn fetch_tasks(&self, token: &str) -> Result<Vec<Task>, AppError> {
        self.get_protected("/api/protected/robot/tasks", token).await
    }

    pub async fn fetch_robot_locations(
        &self,
        robot_id: &str,
        token: &str,
    ) -> Result<Vec<RemoteLocation>, AppError> {
        let path = format!("/api/protected/robot/{robot_id}/location");
        self.get_protected(&path, token).await
    }

    async fn get_protected<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
    ) -> Result<Vec<T>, AppError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "protected request");

        let resp = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            let message = failure_message(resp).await;
            warn!(%url, %status, %message, "request rejected");
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::auth(message),
                _ => AppError::network(message),
            });
        }

        resp.json().await.map_err(|err| {
            warn!(%url, error = %err, "unexpected response body");
            AppError::invalid_data(format!("unexpected response from {path}"))
        })
    }
}

fn transport_error(err: reqwest::Error) -> AppError {
    warn!(error = %err, "request failed");
    AppError::network(DEFAULT_ERROR_MESSAGE)
}

/// Server-supplied `message` when the body is JSON carrying one.
async fn failure_message(resp: reqwest::Response) -> String {
    let text = resp.text().await.unwrap_or_default();
    serde_json::from_str::<MessageBody>(&text)
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string())
}
