use crate::config::ReporterConfig;
use crate::error::ReporterError;
use crate::event::{get_raw_requests, get_request_id, get_requested_validators};
use crate::signer::Signer;
use cosmwasm_std::{Addr, Binary, Event};
use odin_oracle::msg::ExecuteMsg;
use odin_oracle::state::{RawReport, RawRequest, RequestId};
use odin_oracle::verification::VerificationMessage;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Exit code reported for a raw request whose data source could not be run.
pub const EXECUTION_FAILED_EXIT_CODE: u32 = 255;

/// Everything a data source executor needs to serve one raw request.
///
/// `reporter_pubkey` and `signature` let the executor prove to the data source
/// provider, through the `RequestVerification` query, that this reporter is entitled
/// to the data.
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionRequest<'a> {
    pub raw_request: &'a RawRequest,
    pub verification: &'a VerificationMessage,
    pub reporter_pubkey: Binary,
    pub signature: Binary,
    pub timeout: Duration,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionOutput {
    pub exit_code: u32,
    pub data: Binary,
}

/// Runs data sources. How a data source executable is run is up to the implementation.
pub trait DataSourceExecutor {
    fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionOutput, ReporterError>;
}

/// Turns the events of a new request into the `ReportData` message of one validator.
pub struct Reporter<S, E> {
    config: ReporterConfig,
    signer: S,
    executor: E,
}

impl<S: Signer, E: DataSourceExecutor> Reporter<S, E> {
    pub fn new(config: ReporterConfig, signer: S, executor: E) -> Self {
        Self {
            config,
            signer,
            executor,
        }
    }

    pub fn config(&self) -> &ReporterConfig {
        &self.config
    }

    /// Returns `None` when the request was not assigned to the configured validator.
    ///
    /// Every raw request is answered: a failing data source yields a report with
    /// [EXECUTION_FAILED_EXIT_CODE] instead of aborting the whole report.
    pub fn handle_request(&self, events: &[Event]) -> Result<Option<ExecuteMsg>, ReporterError> {
        let request_id = get_request_id(events)?;
        if !get_requested_validators(events).contains(&self.config.validator) {
            debug!(request_id, validator = %self.config.validator, "request not assigned");
            return Ok(None);
        }

        let raw_requests = get_raw_requests(events)?;
        info!(
            request_id,
            raw_requests = raw_requests.len(),
            "handling request"
        );

        let validator = Addr::unchecked(&self.config.validator);
        let reporter_pubkey = self.signer.public_key();
        let mut raw_reports = Vec::with_capacity(raw_requests.len());

        for raw_request in &raw_requests {
            let verification = VerificationMessage::new(
                &self.config.chain_id,
                validator.clone(),
                request_id,
                raw_request.external_id,
            );
            let signature = self.sign(&verification, &reporter_pubkey)?;

            let execution = ExecutionRequest {
                raw_request,
                verification: &verification,
                reporter_pubkey: reporter_pubkey.clone(),
                signature,
                timeout: self.config.data_source_timeout(),
            };
            let output = self.executor.execute(&execution).unwrap_or_else(|err| {
                warn!(
                    request_id,
                    external_id = raw_request.external_id,
                    data_source_id = raw_request.data_source_id,
                    error = %err,
                    "data source execution failed"
                );
                ExecutionOutput {
                    exit_code: EXECUTION_FAILED_EXIT_CODE,
                    data: Binary::from(err.to_string().into_bytes()),
                }
            });
            debug!(
                request_id,
                external_id = raw_request.external_id,
                exit_code = output.exit_code,
                "raw request executed"
            );

            raw_reports.push(RawReport {
                external_id: raw_request.external_id,
                exit_code: output.exit_code,
                data: output.data,
            });
        }

        Ok(Some(ExecuteMsg::ReportData {
            request_id,
            validator: self.config.validator.clone(),
            raw_reports,
        }))
    }

    /// Signs `message`, checking the signature the same way the chain will.
    fn sign(
        &self,
        message: &VerificationMessage,
        reporter_pubkey: &[u8],
    ) -> Result<Binary, ReporterError> {
        let digest = message.sign_digest()?;
        let signature = self.signer.sign(&digest)?;
        let valid = cosmwasm_crypto::secp256k1_verify(&digest, &signature, reporter_pubkey)
            .map_err(|err| ReporterError::signing(err.to_string()))?;
        if !valid {
            return Err(ReporterError::signing(
                "signature does not match the reporter public key",
            ));
        }
        Ok(signature)
    }
}
