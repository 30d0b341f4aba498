//! Session cookie configuration read from the environment.
//!
//! Debug builds fall back to defaults with a warning when a toggle is missing
//! or malformed. Release builds reject the same input so a misconfigured
//! deployment fails at startup.

use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use tracing::warn;
use zeroize::Zeroize;

/// Path to the session key file.
pub const KEY_FILE_ENV: &str = "SESSION_KEY_FILE";
/// Set to `0` or `false` to allow cookies over plain HTTP.
pub const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
/// `Strict`, `Lax` or `None`.
pub const SAMESITE_ENV: &str = "SESSION_SAMESITE";
/// Set to `1` to generate a key in debug builds.
pub const ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";

const SESSION_KEY_DEFAULT_PATH: &str = "/var/run/secrets/session_key";
/// Minimum accepted key file length in bytes.
pub const SESSION_KEY_MIN_LEN: usize = 64;
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Missing or invalid toggles warn and use defaults.
    Debug,
    /// Every toggle must be explicit and valid.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    /// ```
    /// use capacity_backend::inbound::http::session_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// assert_eq!(mode == BuildMode::Debug, cfg!(debug_assertions));
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// A required variable is unset.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    /// A variable holds an unrecognised value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// The key file could not be read.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The key file is shorter than the minimum.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    /// `SameSite=None` without `Secure`.
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    /// Release builds need a key file.
    #[error("SESSION_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Validated cookie settings.
pub struct SessionSettings {
    /// Signing and encryption key for cookie sessions.
    pub key: Key,
    /// Mark cookies `Secure`.
    pub cookie_secure: bool,
    /// `SameSite` policy for the session cookie.
    pub same_site: SameSite,
}

impl SessionSettings {
    /// Read and validate session settings.
    ///
    /// # Examples
    /// ```
    /// use capacity_backend::inbound::http::session_config::{BuildMode, SessionSettings};
    /// use mockable::MockEnv;
    ///
    /// let mut env = MockEnv::new();
    /// env.expect_string().returning(|name| match name {
    ///     "SESSION_ALLOW_EPHEMERAL" => Some("1".to_owned()),
    ///     "SESSION_KEY_FILE" => Some("/nonexistent/session_key".to_owned()),
    ///     _ => None,
    /// });
    ///
    /// let settings = SessionSettings::from_env(&env, BuildMode::Debug).expect("debug defaults");
    /// assert!(settings.cookie_secure);
    /// ```
    pub fn from_env<E: Env>(env: &E, mode: BuildMode) -> Result<Self, SessionConfigError> {
        let cookie_secure = resolve(env, mode, COOKIE_SECURE_ENV, true, BOOL_EXPECTED, parse_bool)?;
        let same_site = resolve(
            env,
            mode,
            SAMESITE_ENV,
            SameSite::Lax,
            SAMESITE_EXPECTED,
            parse_same_site,
        )?;
        if same_site == SameSite::None && !cookie_secure {
            if !mode.is_debug() {
                return Err(SessionConfigError::InsecureSameSiteNone);
            }
            warn!("SESSION_SAMESITE=None without a secure cookie; browsers may drop it");
        }
        let allow_ephemeral =
            resolve(env, mode, ALLOW_EPHEMERAL_ENV, true, BOOL_EXPECTED, parse_bool)?;
        if allow_ephemeral && !mode.is_debug() {
            return Err(SessionConfigError::EphemeralNotAllowed);
        }
        let key = load_key(env, allow_ephemeral)?;
        Ok(Self {
            key,
            cookie_secure,
            same_site,
        })
    }
}

fn resolve<E, T>(
    env: &E,
    mode: BuildMode,
    name: &'static str,
    fallback: T,
    expected: &'static str,
    parse: fn(&str) -> Option<T>,
) -> Result<T, SessionConfigError>
where
    E: Env,
    T: std::fmt::Debug,
{
    let Some(value) = env.string(name) else {
        if mode.is_debug() {
            warn!(name, default = ?fallback, "session toggle not set; using default");
            return Ok(fallback);
        }
        return Err(SessionConfigError::MissingEnv { name });
    };
    match parse(value.trim()) {
        Some(parsed) => Ok(parsed),
        None if mode.is_debug() => {
            warn!(name, %value, default = ?fallback, "invalid session toggle; using default");
            Ok(fallback)
        }
        None => Err(SessionConfigError::InvalidEnv {
            name,
            value,
            expected,
        }),
    }
}

fn load_key<E: Env>(env: &E, allow_ephemeral: bool) -> Result<Key, SessionConfigError> {
    let path = PathBuf::from(
        env.string(KEY_FILE_ENV)
            .unwrap_or_else(|| SESSION_KEY_DEFAULT_PATH.to_owned()),
    );
    match std::fs::read(&path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if length < SESSION_KEY_MIN_LEN {
                bytes.zeroize();
                return Err(SessionConfigError::KeyTooShort {
                    path,
                    length,
                    min_len: SESSION_KEY_MIN_LEN,
                });
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(error) if allow_ephemeral => {
            warn!(path = %path.display(), %error, "using temporary session key (dev only)");
            Ok(Key::generate())
        }
        Err(source) => Err(SessionConfigError::KeyRead { path, source }),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

fn parse_same_site(value: &str) -> Option<SameSite> {
    match value.to_ascii_lowercase().as_str() {
        "strict" => Some(SameSite::Strict),
        "lax" => Some(SameSite::Lax),
        "none" => Some(SameSite::None),
        _ => None,
    }
}
