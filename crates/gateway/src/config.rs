use serde::{Deserialize, Serialize};

pub const ENV_URL: &str = "WAYPOINTS_URL";
pub const ENV_ANON_KEY: &str = "WAYPOINTS_ANON_KEY";
pub const ENV_WAYPOINTS_TABLE: &str = "WAYPOINTS_TABLE";
pub const ENV_PARAMETERS_TABLE: &str = "WAYPOINTS_PARAMETERS_TABLE";
pub const ENV_IMAGE_BUCKET: &str = "WAYPOINTS_IMAGE_BUCKET";

/// Where the hosted backend lives and which collections to use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub base_url: String,
    pub anon_key: String,
    #[serde(default = "default_waypoints_table")]
    pub waypoints_table: String,
    #[serde(default = "default_parameters_table")]
    pub parameters_table: String,
    #[serde(default = "default_image_bucket")]
    pub image_bucket: String,
}

fn default_waypoints_table() -> String {
    "waypoints".to_string()
}

fn default_parameters_table() -> String {
    "parameters".to_string()
}

fn default_image_bucket() -> String {
    "waypoint-images".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    InvalidUrl(String),
    Malformed(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(what) => write!(f, "missing configuration value: {what}"),
            ConfigError::InvalidUrl(url) => write!(f, "gateway url must be http(s): {url}"),
            ConfigError::Malformed(msg) => write!(f, "malformed configuration: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl GatewayConfig {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            anon_key: anon_key.into(),
            waypoints_table: default_waypoints_table(),
            parameters_table: default_parameters_table(),
            image_bucket: default_image_bucket(),
        }
    }

    /// Builds a config from any key/value source; unset names fall back to
    /// the default collection names.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup(ENV_URL).ok_or(ConfigError::Missing(ENV_URL))?;
        let anon_key = lookup(ENV_ANON_KEY).ok_or(ConfigError::Missing(ENV_ANON_KEY))?;
        let config = Self {
            base_url,
            anon_key,
            waypoints_table: lookup(ENV_WAYPOINTS_TABLE).unwrap_or_else(default_waypoints_table),
            parameters_table: lookup(ENV_PARAMETERS_TABLE)
                .unwrap_or_else(default_parameters_table),
            image_bucket: lookup(ENV_IMAGE_BUCKET).unwrap_or_else(default_image_bucket),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Missing(ENV_URL));
        }
        if self.anon_key.trim().is_empty() {
            return Err(ConfigError::Missing(ENV_ANON_KEY));
        }
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(ConfigError::InvalidUrl(self.base_url.clone()));
        }
        Ok(())
    }

    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
