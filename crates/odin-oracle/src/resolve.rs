use crate::error::ContractError;
use crate::oracle_script;
use crate::state::{
    get_oracle_script, get_pending_resolve_list, get_report_count, get_reports, must_get_request,
    save_result, set_pending_resolve_list, OracleResult, Request, ResolveStatus,
};
use cosmwasm_std::{Binary, BlockInfo, Event, QuerierWrapper, Storage, Timestamp};

fn new_result(
    request: &Request,
    ans_count: u64,
    resolve_time: Timestamp,
    resolve_status: ResolveStatus,
    result: Option<Binary>,
) -> OracleResult {
    OracleResult {
        client_id: request.client_id.clone(),
        oracle_script_id: request.oracle_script_id,
        calldata: request.calldata.clone(),
        ask_count: request.ask_count,
        min_count: request.min_count,
        request_id: request.id,
        ans_count,
        request_time: request.request_time,
        resolve_time,
        resolve_status,
        result,
    }
}

fn resolve_event(result: &OracleResult) -> Event {
    Event::new("resolve")
        .add_attribute("id", result.request_id.to_string())
        .add_attribute("resolve_status", result.resolve_status.to_string())
        .add_attribute("ans_count", result.ans_count.to_string())
}

/// Writes a [ResolveStatus::Success] result carrying the oracle script output.
pub fn resolve_success(
    storage: &mut dyn Storage,
    request: &Request,
    ans_count: u64,
    resolve_time: Timestamp,
    result: Binary,
) -> Result<Event, ContractError> {
    let encoded = result.to_base64();
    let result = new_result(
        request,
        ans_count,
        resolve_time,
        ResolveStatus::Success,
        Some(result),
    );
    save_result(storage, request.id, &result)?;
    Ok(resolve_event(&result).add_attribute("result", encoded))
}

/// Writes a [ResolveStatus::Failure] result; `reason` only goes to the event.
pub fn resolve_failure(
    storage: &mut dyn Storage,
    request: &Request,
    ans_count: u64,
    resolve_time: Timestamp,
    reason: &str,
) -> Result<Event, ContractError> {
    let result = new_result(
        request,
        ans_count,
        resolve_time,
        ResolveStatus::Failure,
        None,
    );
    save_result(storage, request.id, &result)?;
    Ok(resolve_event(&result).add_attribute("reason", reason))
}

/// Writes a [ResolveStatus::Expired] result, counting the reports that did arrive.
pub fn resolve_expired(
    storage: &mut dyn Storage,
    request: &Request,
    resolve_time: Timestamp,
) -> Result<Event, ContractError> {
    let ans_count = get_report_count(storage, request.id);
    let result = new_result(
        request,
        ans_count,
        resolve_time,
        ResolveStatus::Expired,
        None,
    );
    save_result(storage, request.id, &result)?;
    Ok(resolve_event(&result))
}

/// Resolves every request of the pending list in order, then clears the list.
///
/// A request is resolved with the reports received so far through the oracle script `Execute`.
/// A failing oracle script fails the request, never the block.
pub fn resolve_pending_requests(
    storage: &mut dyn Storage,
    querier: &QuerierWrapper,
    block: &BlockInfo,
) -> Result<Vec<Event>, ContractError> {
    let pending = get_pending_resolve_list(storage)?;
    let mut events = Vec::with_capacity(pending.len());

    for id in pending {
        let request = must_get_request(storage, id)?;
        let script = get_oracle_script(storage, request.oracle_script_id).map_err(|_| {
            ContractError::store_corruption(format!(
                "oracle script {} of request {id} is missing",
                request.oracle_script_id
            ))
        })?;

        let reports: Vec<_> = get_reports(storage, id)?
            .into_iter()
            .filter(|report| report.in_before_resolve)
            .collect();
        let ans_count = reports.len() as u64;

        let outcome = oracle_script::execute(querier, &script.address, &request.calldata, reports);
        let event = match outcome {
            Ok(result) => resolve_success(storage, &request, ans_count, block.time, result)?,
            Err(err) => {
                resolve_failure(storage, &request, ans_count, block.time, &err.to_string())?
            }
        };
        events.push(event);
    }

    set_pending_resolve_list(storage, &[])?;
    Ok(events)
}
