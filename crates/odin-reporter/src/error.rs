use cosmwasm_std::StdError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ReporterError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("Parse error: {msg}")]
    Parse { msg: String },

    #[error("Cannot find event with type: {ty}, key: {key}")]
    EventNotFound { ty: String, key: String },

    #[error("Found more than one event with type: {ty}, key: {key}")]
    DuplicateEvent { ty: String, key: String },

    #[error("Signing error: {msg}")]
    Signing { msg: String },

    #[error("Config error: {msg}")]
    Config { msg: String },
}

impl ReporterError {
    pub fn parse(msg: impl Into<String>) -> Self {
        ReporterError::Parse { msg: msg.into() }
    }

    pub fn signing(msg: impl Into<String>) -> Self {
        ReporterError::Signing { msg: msg.into() }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        ReporterError::Config { msg: msg.into() }
    }
}
