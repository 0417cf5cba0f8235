//! Typed environment variable access
//!
//! Blank values are treated as unset. Values that are present but do not
//! parse are reported instead of silently falling back to a default.

use crate::error::{CommonError, Result};
use std::str::FromStr;

/// Read a variable, treating blank values as unset
pub fn var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Read and parse a variable
pub fn parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match var(key) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| CommonError::invalid_env(key, &raw, e)),
        None => Ok(None),
    }
}

/// Read and parse a variable, falling back to `default` when unset
pub fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    Ok(parse(key)?.unwrap_or(default))
}

/// Read a boolean flag (`true/false`, `1/0`, `yes/no`, `on/off`)
pub fn flag(key: &str) -> Result<Option<bool>> {
    let Some(raw) = var(key) else {
        return Ok(None);
    };

    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(Some(true)),
        "false" | "0" | "no" | "off" => Ok(Some(false)),
        _ => Err(CommonError::invalid_env(key, &raw, "expected a boolean")),
    }
}

/// Read a comma-separated list, dropping empty items
pub fn list(key: &str) -> Option<Vec<String>> {
    var(key).map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(String::from)
            .collect()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_is_unset() {
        std::env::set_var("SEDUMP_TEST_BLANK", "   ");
        assert_eq!(var("SEDUMP_TEST_BLANK"), None);
        std::env::remove_var("SEDUMP_TEST_BLANK");
    }

    #[test]
    fn test_parse_or_default_and_value() {
        std::env::remove_var("SEDUMP_TEST_PORT");
        assert_eq!(parse_or::<u16>("SEDUMP_TEST_PORT", 5432).unwrap(), 5432);

        std::env::set_var("SEDUMP_TEST_PORT", "6543");
        assert_eq!(parse_or::<u16>("SEDUMP_TEST_PORT", 5432).unwrap(), 6543);
        std::env::remove_var("SEDUMP_TEST_PORT");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        std::env::set_var("SEDUMP_TEST_BAD_NUMBER", "twelve");
        let err = parse::<u32>("SEDUMP_TEST_BAD_NUMBER").unwrap_err();
        assert!(err.to_string().contains("SEDUMP_TEST_BAD_NUMBER"));
        std::env::remove_var("SEDUMP_TEST_BAD_NUMBER");
    }

    #[test]
    fn test_flag_values() {
        std::env::set_var("SEDUMP_TEST_FLAG", "Yes");
        assert_eq!(flag("SEDUMP_TEST_FLAG").unwrap(), Some(true));
        std::env::set_var("SEDUMP_TEST_FLAG", "off");
        assert_eq!(flag("SEDUMP_TEST_FLAG").unwrap(), Some(false));
        std::env::set_var("SEDUMP_TEST_FLAG", "maybe");
        assert!(flag("SEDUMP_TEST_FLAG").is_err());
        std::env::remove_var("SEDUMP_TEST_FLAG");
    }

    #[test]
    fn test_list_splits_and_trims() {
        std::env::set_var("SEDUMP_TEST_LIST", " a.example.com, ,b.example.com ");
        assert_eq!(
            list("SEDUMP_TEST_LIST").unwrap(),
            vec!["a.example.com".to_string(), "b.example.com".to_string()]
        );
        std::env::remove_var("SEDUMP_TEST_LIST");
    }
}
