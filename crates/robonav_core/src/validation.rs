use crate::error::AppError;
use crate::model::Coordinates;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static LOGIN_USERNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]{4,20}$").expect("valid regex"));
static SIGNUP_USERNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]{10,30}$").expect("valid regex"));
static LOGIN_PASSWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^[A-Za-z0-9@#!$%^&*()_+={}\[\]:;"'<>,.?/`~|-]{6,20}$"#).expect("valid regex")
});
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
        .expect("valid regex")
});

pub const SIGNUP_PASSWORD_MIN_LEN: usize = 8;

pub fn is_valid_login_username(username: &str) -> bool {
    LOGIN_USERNAME.is_match(username)
}

pub fn is_valid_signup_username(username: &str) -> bool {
    SIGNUP_USERNAME.is_match(username)
}

pub fn is_valid_login_password(password: &str) -> bool {
    LOGIN_PASSWORD.is_match(password)
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

pub fn validate_login(username: &str, password: &str) -> Result<(), AppError> {
    if username.is_empty() || password.is_empty() {
        return Err(AppError::invalid_input("Please fill in both fields"));
    }
    if !is_valid_login_username(username) {
        return Err(AppError::invalid_input(
            "Username must be between 4-20 alphanumeric characters.",
        ));
    }
    if !is_valid_login_password(password) {
        return Err(AppError::invalid_input("Invalid password format."));
    }
    Ok(())
}

pub fn validate_signup(
    username: &str,
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), AppError> {
    if [username, email, password, confirm_password]
        .iter()
        .any(|field| field.is_empty())
    {
        return Err(AppError::invalid_input("Please fill in all fields"));
    }
    if !is_valid_signup_username(username) {
        return Err(AppError::invalid_input(
            "Username must be 10-30 alphanumeric characters",
        ));
    }
    if !is_valid_email(email) {
        return Err(AppError::invalid_input("Please enter a valid email address"));
    }
    if password.chars().count() < SIGNUP_PASSWORD_MIN_LEN {
        return Err(AppError::invalid_input(
            "Password must be at least 8 characters long",
        ));
    }
    if password != confirm_password {
        return Err(AppError::invalid_input("Passwords do not match"));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateError {
    /// Not exactly two comma-separated parts.
    WrongShape,
    /// Two parts, but at least one is not a number.
    NonNumeric,
}

impl fmt::Display for CoordinateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongShape => {
                f.write_str("Invalid coordinates. Please enter in 'Latitude, Longitude' format.")
            }
            Self::NonNumeric => f.write_str(
                "Invalid coordinates. Please enter numeric values for Latitude and Longitude.",
            ),
        }
    }
}

impl std::error::Error for CoordinateError {}

impl From<CoordinateError> for AppError {
    fn from(err: CoordinateError) -> Self {
        AppError::invalid_input(err.to_string())
    }
}

pub fn parse_coordinates(raw: &str) -> Result<Coordinates, CoordinateError> {
    let parts: Vec<&str> = raw.split(',').collect();
    let [lat, lng] = parts.as_slice() else {
        return Err(CoordinateError::WrongShape);
    };

    let latitude = parse_component(lat)?;
    let longitude = parse_component(lng)?;
    Ok(Coordinates {
        latitude,
        longitude,
    })
}

fn parse_component(raw: &str) -> Result<f64, CoordinateError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or(CoordinateError::NonNumeric)
}

#[cfg(test)]
mod tests {
    use super::{
        CoordinateError, is_valid_login_password, is_valid_login_username,
        is_valid_signup_username, parse_coordinates, validate_login, validate_signup,
    };

    #[test]
    fn username_length_rules() {
        assert!(!is_valid_login_username("ab"));
        assert!(is_valid_login_username("robotuser1"));
        assert!(is_valid_signup_username("robotuser1"));
        assert!(!is_valid_signup_username("robot"));
        assert!(!is_valid_login_username("robot user"));
        assert!(!is_valid_login_username("a".repeat(21).as_str()));
    }

    #[test]
    fn login_password_charset() {
        assert!(is_valid_login_password("p@ss-w0rd!"));
        assert!(is_valid_login_password("[]{}|~`"));
        assert!(!is_valid_login_password("short"));
        assert!(!is_valid_login_password("has space1"));
        assert!(!is_valid_login_password("ümlaut123"));
        assert!(!is_valid_login_password(&"x".repeat(21)));
    }

    #[test]
    fn login_validation_checks_empty_first() {
        let err = validate_login("", "secret123").unwrap_err();
        assert_eq!(err.message(), "Please fill in both fields");

        let err = validate_login("ab", "secret123").unwrap_err();
        assert_eq!(err.code(), "invalid_input");

        assert!(validate_login("robotuser1", "secret123").is_ok());
    }

    #[test]
    fn signup_validation_rules() {
        assert!(validate_signup("robotuser10", "a@b.io", "longpass", "longpass").is_ok());

        let err = validate_signup("robotuser10", "a@b.io", "short", "short").unwrap_err();
        assert_eq!(err.message(), "Password must be at least 8 characters long");

        let err = validate_signup("robotuser10", "a@b.io", "longpass", "longpasz").unwrap_err();
        assert_eq!(err.message(), "Passwords do not match");

        let err = validate_signup("robotuser10", "not-an-email", "longpass", "longpass")
            .unwrap_err();
        assert_eq!(err.message(), "Please enter a valid email address");

        let err = validate_signup("robotuser10", "", "longpass", "longpass").unwrap_err();
        assert_eq!(err.message(), "Please fill in all fields");
    }

    #[test]
    fn coordinates_parse_with_whitespace() {
        let coords = parse_coordinates("45.0, -93.5").unwrap();
        assert_eq!(coords.latitude, 45.0);
        assert_eq!(coords.longitude, -93.5);
    }

    #[test]
    fn coordinates_errors_distinguish_shape_and_number() {
        assert_eq!(parse_coordinates("45.0"), Err(CoordinateError::WrongShape));
        assert_eq!(parse_coordinates("1,2,3"), Err(CoordinateError::WrongShape));
        assert_eq!(parse_coordinates("abc,def"), Err(CoordinateError::NonNumeric));
        assert_eq!(parse_coordinates("45.0,"), Err(CoordinateError::NonNumeric));
        assert_eq!(parse_coordinates("NaN,1"), Err(CoordinateError::NonNumeric));
    }
}
