//! Configuration utilities

/// Load a `.env` file into the process environment, if one exists.
///
/// Returns the path that was loaded. A missing file is not an error; a file
/// that exists but cannot be parsed is logged and skipped.
pub fn load_env() -> Option<std::path::PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => Some(path),
        Err(e) if e.not_found() => None,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load .env file");
            None
        }
    }
}

/// Value of `key` from `lookup`, or `default` when unset or empty.
pub fn env_or<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Boolean flag from `lookup`.
///
/// Accepts `true`/`false`, `1`/`0`, `yes`/`no` and `on`/`off` in any case.
/// Unset or unrecognised values fall back to `default`.
pub fn env_flag<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        Some("true" | "1" | "yes" | "on") => true,
        Some("false" | "0" | "no" | "off") => false,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        }
    }

    #[test]
    fn test_env_or() {
        let lookup = vars(&[("HTTP_PORT", "9000"), ("EMPTY", "  ")]);
        assert_eq!(env_or(&lookup, "HTTP_PORT", "3000"), "9000");
        assert_eq!(env_or(&lookup, "EMPTY", "3000"), "3000");
        assert_eq!(env_or(&lookup, "MISSING", "3000"), "3000");
    }

    #[test]
    fn test_env_flag() {
        let lookup = vars(&[("A", "TRUE"), ("B", "0"), ("C", "maybe"), ("D", " off ")]);
        assert!(env_flag(&lookup, "A", false));
        assert!(!env_flag(&lookup, "B", true));
        assert!(env_flag(&lookup, "C", true));
        assert!(!env_flag(&lookup, "D", true));
        assert!(!env_flag(&lookup, "MISSING", false));
    }
}
