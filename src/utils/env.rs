/// Get environment variable with LEDGERDESK_ prefix, falling back to unprefixed version
///
/// Checks `LEDGERDESK_{key}` first, then `{key}`.
///
/// # Examples
///
/// ```rust
/// use ledgerdesk::utils::get_env_with_prefix;
///
/// // Checks LEDGERDESK_PORT first, then PORT
/// let port = get_env_with_prefix("PORT");
/// ```
pub fn get_env_with_prefix(key: &str) -> Option<String> {
    std::env::var(format!("LEDGERDESK_{}", key))
        .or_else(|_| std::env::var(key))
        .ok()
}

/// Parse an environment value, returning `None` (and logging) when it is malformed.
pub fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = get_env_with_prefix(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring malformed environment value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_env_with_prefix() {
        unsafe {
            std::env::set_var("LEDGERDESK_TEST_VAR", "prefixed_value");
        }
        assert_eq!(get_env_with_prefix("TEST_VAR"), Some("prefixed_value".to_string()));
        unsafe {
            std::env::remove_var("LEDGERDESK_TEST_VAR");
        }

        unsafe {
            std::env::set_var("FALLBACK_ONLY", "unprefixed_value");
        }
        assert_eq!(get_env_with_prefix("FALLBACK_ONLY"), Some("unprefixed_value".to_string()));
        unsafe {
            std::env::remove_var("FALLBACK_ONLY");
        }

        assert_eq!(get_env_with_prefix("NON_EXISTENT_VAR"), None);
    }

    #[test]
    fn test_parse_env_ignores_garbage() {
        unsafe {
            std::env::set_var("LEDGERDESK_PARSE_TEST", "not-a-number");
        }
        assert_eq!(parse_env::<u16>("PARSE_TEST"), None);
        unsafe {
            std::env::set_var("LEDGERDESK_PARSE_TEST", " 42 ");
        }
        assert_eq!(parse_env::<u16>("PARSE_TEST"), Some(42));
        unsafe {
            std::env::remove_var("LEDGERDESK_PARSE_TEST");
        }
    }
}
