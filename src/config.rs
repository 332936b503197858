use std::time::Duration;

/// Owner stamped on rows the core creates. There is no authentication, so a
/// single fixed user owns everything.
pub const DEFAULT_OWNER: &str = "demo-user";

pub const DEFAULT_ACTUAL_RESULT: &str = "Test executed successfully";

pub const DEFAULT_SYNC_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct Config {
    pub owner_id: String,
    /// Written to `actual_result` when an execution carries no error message
    pub default_actual_result: String,
    /// Upper bound for a single provider sync step
    pub sync_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            owner_id: DEFAULT_OWNER.to_string(),
            default_actual_result: DEFAULT_ACTUAL_RESULT.to_string(),
            sync_timeout: DEFAULT_SYNC_TIMEOUT,
        }
    }
}

impl Config {
    /// Defaults, with the owner taken from `TESTDECK_OWNER` when set.
    pub fn from_env() -> Self {
        let owner_id =
            std::env::var("TESTDECK_OWNER").unwrap_or_else(|_| DEFAULT_OWNER.to_string());
        Self {
            owner_id,
            ..Self::default()
        }
    }

    pub fn with_owner(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = owner_id.into();
        self
    }

    pub fn with_sync_timeout(mut self, timeout: Duration) -> Self {
        self.sync_timeout = timeout;
        self
    }
}
