use std::env;
use std::time::Duration;

/// Browser origins allowed to call the RPC endpoint.
///
/// `ALLOWED_ORIGINS` is a comma-separated list, or `*` to accept any origin
/// (the front end is then usually served from a static host). Preflight
/// answers are cached by the browser for `CORS_MAX_AGE_SECS`.
#[derive(Clone, Debug)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub any_origin: bool,
    pub max_age: Duration,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self::from_origins("http://localhost:5173")
    }
}

impl CorsConfig {
    pub fn from_env() -> Self {
        let mut config = env::var("ALLOWED_ORIGINS")
            .map(|raw| Self::from_origins(&raw))
            .unwrap_or_default();
        if let Some(secs) = env::var("CORS_MAX_AGE_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.max_age = Duration::from_secs(secs);
        }
        config
    }

    /// Parse a comma-separated origin list. Trailing slashes are dropped,
    /// since browsers never send them in the `Origin` header.
    pub fn from_origins(raw: &str) -> Self {
        let entries: Vec<&str> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            any_origin: entries.contains(&"*"),
            allowed_origins: entries
                .into_iter()
                .filter(|s| *s != "*")
                .map(|s| s.trim_end_matches('/').to_string())
                .collect(),
            max_age: Duration::from_secs(3600),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_list_is_trimmed() {
        let config = CorsConfig::from_origins(" https://sipkl.example/ , ,http://localhost:5173");
        assert!(!config.any_origin);
        assert_eq!(
            config.allowed_origins,
            vec!["https://sipkl.example", "http://localhost:5173"]
        );
    }

    #[test]
    fn test_wildcard_allows_any_origin() {
        let config = CorsConfig::from_origins("*");
        assert!(config.any_origin);
        assert!(config.allowed_origins.is_empty());
    }
}
