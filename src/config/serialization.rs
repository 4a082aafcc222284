//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;

impl Config {
    /// Serialize config to TOML string (single source of truth for format)
    pub fn to_toml(&self) -> String {
        format!(
            r#"# unitrack configuration

# API root of the universities backend
api_url = "{api_url}"

# Universities per list page
page_size = {page_size}

# Per-request timeout in seconds
request_timeout_secs = {timeout}

# Where the auth token is kept between runs
token_path = {token_path:?}

# Pause after a successful save before returning to the list (milliseconds)
navigate_delay_ms = {delay}

# Logging (RUST_LOG overrides level)
[logging]
level = "{level}"
file_enabled = {file_enabled}
file_dir = {file_dir:?}
file_rotation = "{rotation}"   # hourly, daily, never
file_prefix = "{prefix}"
"#,
            api_url = self.api_url,
            page_size = self.page_size,
            timeout = self.request_timeout_secs,
            token_path = self.token_path.display().to_string(),
            delay = self.navigate_delay_ms,
            level = self.logging.level,
            file_enabled = self.logging.file_enabled,
            file_dir = self.logging.file_dir.display().to_string(),
            rotation = self.logging.file_rotation,
            prefix = self.logging.file_prefix,
        )
    }
}
