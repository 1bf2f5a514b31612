use crate::api::ApiClient;
use crate::error::AppError;
use crate::screens::ScreenState;
use crate::session::{clear_session, is_session_valid, store_token};
use crate::storage::KeyValueStore;
use crate::validation::validate_login;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
}

#[derive(Debug, Default)]
pub struct LoginScreen {
    pub state: ScreenState,
    prefill_username: Option<String>,
}

impl LoginScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opened after sign-up with the new username filled in.
    pub fn with_prefill(username: &str) -> Self {
        Self {
            state: ScreenState::new(),
            prefill_username: Some(username.to_string()).filter(|name| !name.is_empty()),
        }
    }

    pub fn prefill_username(&self) -> Option<&str> {
        self.prefill_username.as_deref()
    }

    /// Skips the login form when a live session is already stored.
    pub fn startup_route(store: &mut dyn KeyValueStore, now: i64) -> Route {
        if is_session_valid(store, now) {
            Route::Home
        } else {
            Route::Login
        }
    }

    pub async fn submit(
        &mut self,
        api: &ApiClient,
        store: &mut dyn KeyValueStore,
        username: &str,
        password: &str,
    ) -> Result<Route, AppError> {
        let username = username.trim();
        let password = password.trim();
        debug!(username, "login submitted");

        if let Err(err) = validate_login(username, password) {
            self.state.notify(err.message());
            return Err(err);
        }

        let response = match api.login(username, password).await {
            Ok(response) => response,
            Err(err) => {
                self.state.notify(err.message());
                return Err(err);
            }
        };

        store_token(store, &response.token)?;
        info!(username, "logged in");
        if !response.message.is_empty() {
            self.state.notify(response.message);
        }
        Ok(Route::Home)
    }

    pub fn logout(&mut self, store: &mut dyn KeyValueStore) -> Result<Route, AppError> {
        clear_session(store)?;
        self.state.notify("Logged out.");
        Ok(Route::Login)
    }
}
