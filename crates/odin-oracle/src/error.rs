use cosmwasm_std::StdError;
use cw_utils::PaymentError;
use thiserror::Error;

use crate::state::RequestId;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Admin(#[from] odin_library::admin::AdminError),

    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    #[error("Request not found: id {id}")]
    RequestNotFound { id: RequestId },

    #[error("Result not found: id {id}")]
    ResultNotFound { id: RequestId },

    #[error("Data source not found: id {id}")]
    DataSourceNotFound { id: u64 },

    #[error("Oracle script not found: id {id}")]
    OracleScriptNotFound { id: u64 },

    #[error("Validator not found")]
    ValidatorNotFound {},

    #[error("Invalid request: {msg}")]
    InvalidRequest { msg: String },

    #[error("Invalid report: {msg}")]
    InvalidReport { msg: String },

    #[error("Invalid params: {msg}")]
    InvalidParams { msg: String },

    #[error("Unauthorized: {msg}")]
    Unauthorized { msg: String },

    #[error("Insufficient active validators: required {required}, available {available}")]
    InsufficientValidators { required: u64, available: u64 },

    #[error("Validator is already active")]
    AlreadyActive {},

    #[error("Too soon to activate validator")]
    TooSoonToActivate {},

    #[error("Report already exists")]
    ReportAlreadyExists {},

    #[error("Request already expired")]
    RequestAlreadyExpired {},

    /// The store no longer satisfies an invariant the state machine relies on.
    /// Never recovered from: the block must abort.
    #[error("Store corruption: {msg}")]
    StoreCorruption { msg: String },
}

impl ContractError {
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        ContractError::InvalidRequest { msg: msg.into() }
    }

    pub fn invalid_report(msg: impl Into<String>) -> Self {
        ContractError::InvalidReport { msg: msg.into() }
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        ContractError::Unauthorized { msg: msg.into() }
    }

    pub fn store_corruption(msg: impl Into<String>) -> Self {
        ContractError::StoreCorruption { msg: msg.into() }
    }

    /// Fatal errors must halt the block instead of being reported to a caller.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ContractError::StoreCorruption { .. })
    }
}
