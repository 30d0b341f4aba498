//! Authentication payloads: login credentials and registration requests.
//!
//! Constructors validate raw strings before a handler talks to a service.
//! Passwords are held in [`Zeroizing`] buffers.

use std::fmt;

use thiserror::Error;
use zeroize::Zeroizing;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Longest accepted username, in characters.
pub const MAX_USERNAME_LEN: usize = 64;

/// Longest accepted email address, in characters.
pub const MAX_EMAIL_LEN: usize = 255;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginValidationError {
    /// Email or password was blank.
    #[error("Email and password are required")]
    MissingFields,
}

/// Validated login credentials.
///
/// ## Invariants
/// - `email` is trimmed, lower-cased and non-empty.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use capacity_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" Asha@Example.com ", "secret").expect("valid");
/// assert_eq!(creds.email(), "asha@example.com");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let email = normalise_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(LoginValidationError::MissingFields);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email used for account lookups.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Domain error returned when registration payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationValidationError {
    /// A field was blank once trimmed.
    #[error("Username, email, and password are required")]
    MissingFields,
    /// Password is under [`MIN_PASSWORD_LEN`] characters.
    #[error("Password must be at least {min} characters long")]
    PasswordTooShort { min: usize },
    /// Username exceeds [`MAX_USERNAME_LEN`] characters.
    #[error("Username must be at most {max} characters long")]
    UsernameTooLong { max: usize },
    /// Email exceeds [`MAX_EMAIL_LEN`] characters.
    #[error("Email must be at most {max} characters long")]
    EmailTooLong { max: usize },
}

/// Validated registration request.
#[derive(Clone, PartialEq, Eq)]
pub struct Registration {
    username: String,
    email: String,
    password: Zeroizing<String>,
}

impl Registration {
    /// Construct a registration from raw inputs.
    pub fn try_from_parts(
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, RegistrationValidationError> {
        let username = username.trim();
        let email = normalise_email(email);
        if username.is_empty() || email.is_empty() || password.is_empty() {
            return Err(RegistrationValidationError::MissingFields);
        }
        if username.chars().count() > MAX_USERNAME_LEN {
            return Err(RegistrationValidationError::UsernameTooLong {
                max: MAX_USERNAME_LEN,
            });
        }
        if email.chars().count() > MAX_EMAIL_LEN {
            return Err(RegistrationValidationError::EmailTooLong { max: MAX_EMAIL_LEN });
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(RegistrationValidationError::PasswordTooShort {
                min: MIN_PASSWORD_LEN,
            });
        }
        Ok(Self {
            username: username.to_owned(),
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Trimmed username.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Normalised email.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Plaintext password, hashed before storage.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn normalise_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}
