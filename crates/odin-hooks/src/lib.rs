pub mod error;
pub mod request;

pub use crate::error::HookError;
pub use crate::request::{QueryRequestSearchParams, RequestHook};
