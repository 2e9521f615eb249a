//! # Environment Variables
//!
//! Utilities for reading and parsing environment variables.

use std::env;
use std::str::FromStr;

/// Get an environment variable by name.
pub fn get_env(name: &'static str) -> Result<String, Error> {
    env::var(name).map_err(|_| Error::MissingEnv(name))
}

/// Get an environment variable, falling back to `default` when unset.
pub fn get_env_or(name: &'static str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Get and parse an environment variable, using `default` when unset.
///
/// A variable that is set but unparsable is still an error.
pub fn get_env_parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, Error> {
    match env::var(name) {
        Ok(val) => val.parse::<T>().map_err(|_| Error::WrongFormat(name)),
        Err(_) => Ok(default),
    }
}

// region:    --- Error
#[derive(Debug)]
pub enum Error {
    MissingEnv(&'static str),
    WrongFormat(&'static str),
}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::MissingEnv(name) => write!(fmt, "{name} must be set in environment"),
            Error::WrongFormat(name) => write!(fmt, "{name} has an invalid format"),
        }
    }
}

impl std::error::Error for Error {}
// endregion: --- Error

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_env() {
        let result = get_env("HEARTH_TEST_SURELY_UNSET_VAR");
        assert!(matches!(result, Err(Error::MissingEnv("HEARTH_TEST_SURELY_UNSET_VAR"))));
    }

    #[test]
    fn test_parse_or_default() {
        let value: i64 = get_env_parse_or("HEARTH_TEST_SURELY_UNSET_NUMBER", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_env_or_default() {
        assert_eq!(get_env_or("HEARTH_TEST_SURELY_UNSET_STR", "fallback"), "fallback");
    }
}
