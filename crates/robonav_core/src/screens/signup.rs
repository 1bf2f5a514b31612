use crate::api::ApiClient;
use crate::error::AppError;
use crate::screens::ScreenState;
use crate::validation::validate_signup;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpOutcome {
    /// Username to prefill on the login screen.
    pub username: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct SignUpScreen {
    pub state: ScreenState,
}

impl SignUpScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn submit(
        &mut self,
        api: &ApiClient,
        username: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<SignUpOutcome, AppError> {
        let username = username.trim();
        let email = email.trim();
        let password = password.trim();
        let confirm_password = confirm_password.trim();

        let result = match validate_signup(username, email, password, confirm_password) {
            Ok(()) => api.register(username, email, password).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(message) => {
                self.state.notify(message.clone());
                Ok(SignUpOutcome {
                    username: username.to_string(),
                    message,
                })
            }
            Err(err) => {
                self.state.notify(err.message());
                Err(err)
            }
        }
    }
}
