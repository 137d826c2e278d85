use std::env;
use std::path::PathBuf;

/// File name of the configuration record.
pub const CONFIG_FILE_NAME: &str = "server_config.json";

/// Environment variable that overrides the configuration path.
pub const CONFIG_PATH_ENV_VAR: &str = "PFSERVER_CONFIG_PATH";

/// Default log filter expression used by the daemon.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Configuration path used when neither the flag nor the environment names
/// one: `server_config.json` beside the running executable, or in the current
/// directory when the executable location is unknown.
pub fn default_config_path() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(CONFIG_FILE_NAME)))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}
