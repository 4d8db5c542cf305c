pub mod config;
pub mod error;
pub mod event;
pub mod reporter;
pub mod signer;

pub use crate::error::ReporterError;
pub use crate::reporter::{DataSourceExecutor, ExecutionOutput, ExecutionRequest, Reporter};
