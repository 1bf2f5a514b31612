//! Screen controllers. Each screen owns an explicit [`ScreenState`] that
//! lives as long as the screen is shown; nothing is kept in globals.

pub mod fleet;
pub mod login;
pub mod map;
pub mod signup;

pub use fleet::{FleetScreen, FleetSnapshot};
pub use login::{LoginScreen, Route};
pub use map::{MAP_FILES, MapAction, MapScreen, MapView, PositionInput};
pub use signup::{SignUpOutcome, SignUpScreen};

use crate::api::ApiClient;
use crate::error::AppError;
use crate::session::{TokenStatus, check_session, now_epoch_seconds, stored_token};
use crate::storage::KeyValueStore;

const OUTPUT_SEPARATOR: &str = "\n\n";

/// Transient notices plus the append-only output log of one screen.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScreenState {
    notices: Vec<String>,
    output: Vec<String>,
}

impl ScreenState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify<M: Into<String>>(&mut self, message: M) {
        self.notices.push(message.into());
    }

    /// Returns pending notices, leaving none behind.
    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    pub fn append_output<M: Into<String>>(&mut self, message: M) {
        self.output.push(message.into());
    }

    pub fn output(&self) -> String {
        self.output.join(OUTPUT_SEPARATOR)
    }

    pub fn clear_output(&mut self) {
        self.output.clear();
    }
}

/// Authenticated access to the protected backend routes.
#[derive(Debug, Clone)]
pub struct RemoteSession {
    pub api: ApiClient,
    pub token: String,
}

impl RemoteSession {
    /// Requires a stored, unexpired token.
    pub fn from_store(api: ApiClient, store: &mut dyn KeyValueStore) -> Result<Self, AppError> {
        match check_session(store, now_epoch_seconds()) {
            TokenStatus::Valid { .. } => {}
            TokenStatus::Expired { .. } => {
                return Err(AppError::auth("Session expired. Please log in again."));
            }
            _ => return Err(AppError::auth("Please log in first.")),
        }

        let token = stored_token(store)?.ok_or_else(|| AppError::auth("Please log in first."))?;
        Ok(Self { api, token })
    }
}

#[cfg(test)]
mod tests {
    use super::{RemoteSession, ScreenState};
    use crate::api::ApiClient;
    use crate::session::{TOKEN_KEY, now_epoch_seconds, token_with_payload};
    use crate::storage::{KeyValueStore, MemoryPreferences};

    #[test]
    fn output_entries_are_separated_by_blank_line() {
        let mut state = ScreenState::new();
        state.append_output("first");
        state.append_output("second");

        assert_eq!(state.output(), "first\n\nsecond");
    }

    #[test]
    fn notices_are_drained() {
        let mut state = ScreenState::new();
        state.notify("saved");

        assert_eq!(state.take_notices(), vec!["saved".to_string()]);
        assert!(state.take_notices().is_empty());
    }

    #[test]
    fn remote_session_requires_valid_token() {
        let api = ApiClient::new("http://localhost:8080");
        let mut empty = MemoryPreferences::new();
        let err = RemoteSession::from_store(api.clone(), &mut empty).unwrap_err();
        assert_eq!(err.code(), "auth_error");

        let mut expired = MemoryPreferences::new();
        let stale = token_with_payload(&serde_json::json!({ "exp": 1 }));
        expired.put(TOKEN_KEY, &stale).unwrap();
        let err = RemoteSession::from_store(api.clone(), &mut expired).unwrap_err();
        assert!(err.message().contains("expired"));
        assert_eq!(expired.get(TOKEN_KEY).unwrap(), None);

        let mut valid = MemoryPreferences::new();
        let fresh = token_with_payload(&serde_json::json!({ "exp": now_epoch_seconds() + 600 }));
        valid.put(TOKEN_KEY, &fresh).unwrap();
        let session = RemoteSession::from_store(api, &mut valid).unwrap();
        assert_eq!(session.token, fresh);
    }
}
