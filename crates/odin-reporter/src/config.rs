use crate::error::ReporterError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

fn default_data_source_timeout_secs() -> u64 {
    10
}

/// Settings of a reporter process serving one validator.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ReporterConfig {
    /// Chain the verification messages are bound to.
    pub chain_id: String,
    /// Address of the validator this reporter reports for.
    pub validator: String,
    #[serde(default = "default_data_source_timeout_secs")]
    pub data_source_timeout_secs: u64,
}

impl ReporterConfig {
    pub fn from_json(json: &str) -> Result<Self, ReporterError> {
        let config: ReporterConfig = serde_json::from_str(json)
            .map_err(|err| ReporterError::config(format!("invalid config: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReporterError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|err| {
            ReporterError::config(format!("cannot read {}: {err}", path.display()))
        })?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), ReporterError> {
        if self.chain_id.is_empty() {
            return Err(ReporterError::config("chain_id must not be empty"));
        }
        if self.validator.is_empty() {
            return Err(ReporterError::config("validator must not be empty"));
        }
        if self.data_source_timeout_secs == 0 {
            return Err(ReporterError::config(
                "data_source_timeout_secs must be positive",
            ));
        }
        Ok(())
    }

    pub fn data_source_timeout(&self) -> Duration {
        Duration::from_secs(self.data_source_timeout_secs)
    }
}
