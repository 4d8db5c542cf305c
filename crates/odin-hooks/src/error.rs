use odin_oracle::ContractError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum HookError {
    #[error("{0}")]
    Contract(#[from] ContractError),

    #[error("Invalid connection string: {msg}")]
    InvalidConnection { msg: String },

    #[error("Unknown driver {driver}")]
    UnknownDriver { driver: String },

    #[error("Invalid query: {msg}")]
    InvalidQuery { msg: String },

    #[error("Backend error: {msg}")]
    Backend { msg: String },

    #[error("Serialization error: {msg}")]
    Serde { msg: String },
}

impl HookError {
    pub fn invalid_query(msg: impl Into<String>) -> Self {
        HookError::InvalidQuery { msg: msg.into() }
    }

    pub fn backend(err: impl std::fmt::Display) -> Self {
        HookError::Backend {
            msg: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for HookError {
    fn from(err: serde_json::Error) -> Self {
        HookError::Serde {
            msg: err.to_string(),
        }
    }
}
