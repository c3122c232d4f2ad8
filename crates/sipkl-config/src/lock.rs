use std::env;
use std::time::Duration;

/// How long writers wait for the workbook lock before giving up.
#[derive(Clone, Debug)]
pub struct LockConfig {
    /// Registration, login, profile edits and row deletes
    pub write_timeout: Duration,
    /// Admin credential updates
    pub credential_timeout: Duration,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            write_timeout: Duration::from_millis(5000),
            credential_timeout: Duration::from_millis(10000),
        }
    }
}

impl LockConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            write_timeout: env::var("LOCK_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.write_timeout),
            credential_timeout: env::var("CREDENTIAL_LOCK_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.credential_timeout),
        }
    }
}
