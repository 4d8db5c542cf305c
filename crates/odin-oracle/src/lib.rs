pub mod contract;
pub mod error;
pub mod expiration;
pub mod liveness;
pub mod msg;
pub mod oracle_script;
pub mod resolve;
pub mod state;
pub mod verification;

#[cfg(not(target_arch = "wasm32"))]
pub mod testing;

pub use crate::error::ContractError;
