//! Query API every oracle script contract implements.
//!
//! The oracle script owns the opaque computation of a request:
//! `Prepare` fans the calldata out into raw requests and
//! `Execute` aggregates the validators' reports into the result blob.

use crate::error::ContractError;
use crate::state::{DataSourceId, ExternalId, Report};
use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Binary, QuerierWrapper, StdResult};

#[cw_serde]
#[derive(QueryResponses)]
pub enum OracleScriptQueryMsg {
    #[returns(PrepareResponse)]
    Prepare { calldata: Binary },

    #[returns(ExecuteResponse)]
    Execute {
        calldata: Binary,
        /// Reports received before resolution, ordered by validator address.
        reports: Vec<Report>,
    },
}

#[cw_serde]
pub struct RawRequestSpec {
    pub external_id: ExternalId,
    pub data_source_id: DataSourceId,
    pub calldata: Binary,
}

#[cw_serde]
pub struct PrepareResponse {
    pub raw_requests: Vec<RawRequestSpec>,
}

#[cw_serde]
pub struct ExecuteResponse {
    pub result: Binary,
}

/// Runs `Prepare` on the oracle script, any failure rejects the request.
pub fn prepare(
    querier: &QuerierWrapper,
    script: &Addr,
    calldata: &Binary,
) -> Result<Vec<RawRequestSpec>, ContractError> {
    let msg = OracleScriptQueryMsg::Prepare {
        calldata: calldata.clone(),
    };
    match querier.query_wasm_smart::<PrepareResponse>(script.to_string(), &msg) {
        Ok(response) => Ok(response.raw_requests),
        Err(err) => Err(ContractError::invalid_request(format!(
            "oracle script prepare failed: {err}"
        ))),
    }
}

/// Runs `Execute` on the oracle script.
/// The error is kept as is: the caller turns it into a failed resolution.
pub fn execute(
    querier: &QuerierWrapper,
    script: &Addr,
    calldata: &Binary,
    reports: Vec<Report>,
) -> StdResult<Binary> {
    let msg = OracleScriptQueryMsg::Execute {
        calldata: calldata.clone(),
        reports,
    };
    let response: ExecuteResponse = querier.query_wasm_smart(script.to_string(), &msg)?;
    Ok(response.result)
}
