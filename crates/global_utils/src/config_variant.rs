use serde::{Deserialize, Serialize};
use tracing::instrument;

pub const APP_CONFIGURATION_NAME: &str = "APP_ENVIRONMENT";

#[derive(Debug, Copy, Clone, PartialEq, Eq, strum::Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigVariant {
    #[strum(serialize = "production")]
    Production,
    #[strum(serialize = "local")]
    Local,
}

impl ConfigVariant {
    #[instrument(level = "trace", ret)]
    pub fn init() -> ConfigVariant {
        if let Ok(x) = std::env::var(APP_CONFIGURATION_NAME)
            && x == ConfigVariant::Production.to_string()
        {
            ConfigVariant::Production
        } else {
            ConfigVariant::Local
        }
    }
}
