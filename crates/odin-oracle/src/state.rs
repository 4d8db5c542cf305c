use crate::error::ContractError;
use crate::msg::{
    OracleRequestPacketData, OracleResponsePacketData, PageResponse, RequestResult,
};
use cosmwasm_schema::cw_serde;
use cosmwasm_std::{
    Addr, Binary, Coin, HexBinary, Order, StdError, StdResult, Storage, Timestamp,
};
use cw_storage_plus::{Bound, Item, Map};

pub type RequestId = u64;
pub type DataSourceId = u64;
pub type OracleScriptId = u64;
pub type ExternalId = u64;

type Validator = Addr;
type Reporter = Addr;

/// Key = RequestId, allocated by [add_request]
/// Value = the request as submitted, only removed by [delete_request]
const REQUESTS: Map<RequestId, Request> = Map::new("requests");

/// Key = (RequestId, Validator)
/// At most one report per validator per request.
const REPORTS: Map<(RequestId, &Validator), Report> = Map::new("reports");

/// Key = RequestId
/// Written once when the request resolves, never overwritten.
const RESULTS: Map<RequestId, OracleResult> = Map::new("results");

const REQUEST_COUNT: Item<u64> = Item::new("request_count");

/// Highest request id the expiration sweep has settled.
const REQUEST_LAST_EXPIRED: Item<RequestId> = Item::new("request_last_expired");

/// Requests that reached `min_count` reports and wait for end block resolution.
/// Stored as a single record so every node decodes the same order.
const PENDING_RESOLVE_LIST: Item<Vec<RequestId>> = Item::new("pending_resolve_list");

const ORACLE_POOL: Item<OraclePool> = Item::new("oracle_pool");

const PARAMS: Item<Params> = Item::new("params");

pub(crate) const DATA_SOURCE_COUNT: Item<u64> = Item::new("data_source_count");
pub(crate) const DATA_SOURCES: Map<DataSourceId, DataSource> = Map::new("data_sources");

pub(crate) const ORACLE_SCRIPT_COUNT: Item<u64> = Item::new("oracle_script_count");
pub(crate) const ORACLE_SCRIPTS: Map<OracleScriptId, OracleScript> = Map::new("oracle_scripts");

/// Liveness status of every registered validator.
pub(crate) const VALIDATOR_STATUSES: Map<&Validator, ValidatorStatus> =
    Map::new("validator_statuses");

/// Key = (Validator, Reporter); reporters may submit reports on behalf of the validator.
pub(crate) const REPORTERS: Map<(&Validator, &Reporter), ()> = Map::new("reporters");

#[cw_serde]
pub struct Request {
    /// Assigned by [set_request]; whatever the caller puts here is overwritten.
    pub id: RequestId,
    pub oracle_script_id: OracleScriptId,
    pub calldata: Binary,
    /// Validators sampled for this request, `len() == ask_count`.
    pub requested_validators: Vec<Validator>,
    pub ask_count: u64,
    pub min_count: u64,
    pub request_height: u64,
    pub request_time: Timestamp,
    pub client_id: String,
    pub raw_requests: Vec<RawRequest>,
}

impl Request {
    pub fn is_requested(&self, validator: &Addr) -> bool {
        self.requested_validators.contains(validator)
    }

    pub fn raw_request(&self, external_id: ExternalId) -> Option<&RawRequest> {
        self.raw_requests
            .iter()
            .find(|raw| raw.external_id == external_id)
    }
}

#[cw_serde]
pub struct RawRequest {
    pub external_id: ExternalId,
    pub data_source_id: DataSourceId,
    /// Executable hash of the data source when the request was made.
    /// Later edits of the data source do not affect this request.
    pub data_source_hash: HexBinary,
    pub calldata: Binary,
}

#[cw_serde]
pub struct Report {
    pub validator: Validator,
    /// Whether the report arrived before the request was resolved.
    pub in_before_resolve: bool,
    pub raw_reports: Vec<RawReport>,
}

#[cw_serde]
pub struct RawReport {
    pub external_id: ExternalId,
    pub exit_code: u32,
    pub data: Binary,
}

#[cw_serde]
#[derive(Copy)]
pub enum ResolveStatus {
    Success,
    Failure,
    Expired,
}

impl std::fmt::Display for ResolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveStatus::Success => write!(f, "success"),
            ResolveStatus::Failure => write!(f, "failure"),
            ResolveStatus::Expired => write!(f, "expired"),
        }
    }
}

/// Terminal outcome of a request.
/// Carries the request fields so resolved requests stay readable after pruning.
#[cw_serde]
pub struct OracleResult {
    pub client_id: String,
    pub oracle_script_id: OracleScriptId,
    pub calldata: Binary,
    pub ask_count: u64,
    pub min_count: u64,
    pub request_id: RequestId,
    pub ans_count: u64,
    pub request_time: Timestamp,
    pub resolve_time: Timestamp,
    pub resolve_status: ResolveStatus,
    /// Only set when `resolve_status` is [ResolveStatus::Success].
    pub result: Option<Binary>,
}

impl From<OracleResult> for RequestResult {
    fn from(result: OracleResult) -> Self {
        RequestResult {
            request_packet_data: OracleRequestPacketData {
                client_id: result.client_id,
                oracle_script_id: result.oracle_script_id,
                calldata: result.calldata,
                ask_count: result.ask_count,
                min_count: result.min_count,
            },
            response_packet_data: OracleResponsePacketData {
                request_id: result.request_id,
                ans_count: result.ans_count,
                request_time: result.request_time,
                resolve_time: result.resolve_time,
                resolve_status: result.resolve_status,
                result: result.result,
            },
        }
    }
}

#[cw_serde]
#[derive(Default)]
pub struct OraclePool {
    /// Fees collected from data requesters, owed to data providers.
    pub data_providers_pool: Vec<Coin>,
}

impl OraclePool {
    pub fn add(&mut self, coin: Coin) {
        match self
            .data_providers_pool
            .iter_mut()
            .find(|c| c.denom == coin.denom)
        {
            Some(existing) => existing.amount += coin.amount,
            None => self.data_providers_pool.push(coin),
        }
    }
}

#[cw_serde]
pub struct DataSource {
    pub owner: Addr,
    pub name: String,
    pub description: String,
    /// sha256 of the data source executable.
    pub executable_hash: HexBinary,
}

#[cw_serde]
pub struct OracleScript {
    pub owner: Addr,
    pub name: String,
    pub description: String,
    /// Contract implementing the oracle script `Prepare`/`Execute` queries.
    pub address: Addr,
}

#[cw_serde]
pub struct ValidatorStatus {
    pub is_active: bool,
    /// Time of the last activation or deactivation.
    pub since: Timestamp,
}

#[cw_serde]
pub struct Params {
    pub max_raw_request_count: u64,
    pub max_ask_count: u64,
    /// Number of blocks a request stays open for reports.
    pub expiration_block_count: u64,
    /// Seconds a deactivated validator must wait before `Activate`.
    pub inactive_penalty_duration: u64,
    pub max_calldata_size: u64,
    pub max_report_data_size: u64,
    /// Fee charged per request, added to the [OraclePool].
    pub data_requester_fee: Option<Coin>,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            max_raw_request_count: 12,
            max_ask_count: 16,
            expiration_block_count: 100,
            inactive_penalty_duration: 10 * odin_library::time::MINUTES,
            max_calldata_size: 256,
            max_report_data_size: 512,
            data_requester_fee: None,
        }
    }
}

impl Params {
    pub fn validate(&self) -> Result<(), ContractError> {
        let positive = [
            ("max_raw_request_count", self.max_raw_request_count),
            ("max_ask_count", self.max_ask_count),
            ("expiration_block_count", self.expiration_block_count),
            ("max_calldata_size", self.max_calldata_size),
            ("max_report_data_size", self.max_report_data_size),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(ContractError::InvalidParams {
                    msg: format!("{name} must be positive"),
                });
            }
        }
        if let Some(fee) = &self.data_requester_fee {
            if fee.amount.is_zero() {
                return Err(ContractError::InvalidParams {
                    msg: "data_requester_fee must be positive".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Returns true if the request of this id exists in the storage.
pub fn has_request(storage: &dyn Storage, id: RequestId) -> bool {
    REQUESTS.has(storage, id)
}

/// Returns the request for the given id, [ContractError::RequestNotFound] if absent.
pub fn get_request(storage: &dyn Storage, id: RequestId) -> Result<Request, ContractError> {
    REQUESTS
        .may_load(storage, id)?
        .ok_or(ContractError::RequestNotFound { id })
}

/// Returns the request for an id known to have been allocated.
/// A missing record means the store is corrupted, which is fatal.
pub fn must_get_request(storage: &dyn Storage, id: RequestId) -> Result<Request, ContractError> {
    get_request(storage, id).map_err(|err| match err {
        ContractError::RequestNotFound { id } => {
            ContractError::store_corruption(format!("request {id} is allocated but missing"))
        }
        ContractError::Std(err) => ContractError::store_corruption(err.to_string()),
        err => err,
    })
}

/// Saves the request under `id` without any validation, stamping `request.id = id`.
pub fn set_request(
    storage: &mut dyn Storage,
    id: RequestId,
    mut request: Request,
) -> Result<(), ContractError> {
    request.id = id;
    REQUESTS.save(storage, id, &request)?;
    Ok(())
}

/// Removes the request record. Only used by pruning.
pub fn delete_request(storage: &mut dyn Storage, id: RequestId) {
    REQUESTS.remove(storage, id);
}

/// Allocates the next request id and saves the request under it.
pub fn add_request(storage: &mut dyn Storage, request: Request) -> Result<RequestId, ContractError> {
    let id = get_next_request_id(storage)?;
    set_request(storage, id, request)?;
    Ok(id)
}

pub fn get_request_count(storage: &dyn Storage) -> StdResult<u64> {
    Ok(REQUEST_COUNT.may_load(storage)?.unwrap_or_default())
}

pub fn set_request_count(storage: &mut dyn Storage, count: u64) -> StdResult<()> {
    REQUEST_COUNT.save(storage, &count)
}

/// Increments the request counter and returns the new value; the first id is 1.
pub fn get_next_request_id(storage: &mut dyn Storage) -> StdResult<RequestId> {
    let id = get_request_count(storage)? + 1;
    set_request_count(storage, id)?;
    Ok(id)
}

pub fn get_request_last_expired(storage: &dyn Storage) -> StdResult<RequestId> {
    Ok(REQUEST_LAST_EXPIRED.may_load(storage)?.unwrap_or_default())
}

pub fn set_request_last_expired(storage: &mut dyn Storage, id: RequestId) -> StdResult<()> {
    REQUEST_LAST_EXPIRED.save(storage, &id)
}

pub fn get_next_data_source_id(storage: &mut dyn Storage) -> StdResult<DataSourceId> {
    let id = DATA_SOURCE_COUNT.may_load(storage)?.unwrap_or_default() + 1;
    DATA_SOURCE_COUNT.save(storage, &id)?;
    Ok(id)
}

pub fn get_next_oracle_script_id(storage: &mut dyn Storage) -> StdResult<OracleScriptId> {
    let id = ORACLE_SCRIPT_COUNT.may_load(storage)?.unwrap_or_default() + 1;
    ORACLE_SCRIPT_COUNT.save(storage, &id)?;
    Ok(id)
}

pub fn get_data_source(storage: &dyn Storage, id: DataSourceId) -> Result<DataSource, ContractError> {
    DATA_SOURCES
        .may_load(storage, id)?
        .ok_or(ContractError::DataSourceNotFound { id })
}

pub fn get_oracle_script(
    storage: &dyn Storage,
    id: OracleScriptId,
) -> Result<OracleScript, ContractError> {
    ORACLE_SCRIPTS
        .may_load(storage, id)?
        .ok_or(ContractError::OracleScriptNotFound { id })
}

/// Appends the request to the pending list.
/// DO NOT add the same request more than once, the list is not deduplicated.
pub fn add_pending_request(storage: &mut dyn Storage, id: RequestId) -> StdResult<()> {
    let mut pending = get_pending_resolve_list(storage)?;
    pending.push(id);
    set_pending_resolve_list(storage, &pending)
}

/// Replaces the whole pending list.
pub fn set_pending_resolve_list(storage: &mut dyn Storage, ids: &[RequestId]) -> StdResult<()> {
    PENDING_RESOLVE_LIST.save(storage, &ids.to_vec())
}

/// Returns the pending list, empty if it was never written.
pub fn get_pending_resolve_list(storage: &dyn Storage) -> StdResult<Vec<RequestId>> {
    Ok(PENDING_RESOLVE_LIST.may_load(storage)?.unwrap_or_default())
}

pub fn has_report(storage: &dyn Storage, id: RequestId, validator: &Addr) -> bool {
    REPORTS.has(storage, (id, validator))
}

pub fn set_report(storage: &mut dyn Storage, id: RequestId, report: &Report) -> StdResult<()> {
    REPORTS.save(storage, (id, &report.validator), report)
}

/// All reports of the request, ordered by validator address.
pub fn get_reports(storage: &dyn Storage, id: RequestId) -> StdResult<Vec<Report>> {
    REPORTS
        .prefix(id)
        .range(storage, None, None, Order::Ascending)
        .map(|item| item.map(|(_, report)| report))
        .collect()
}

pub fn get_report_count(storage: &dyn Storage, id: RequestId) -> u64 {
    REPORTS
        .prefix(id)
        .keys_raw(storage, None, None, Order::Ascending)
        .count() as u64
}

pub fn delete_reports(storage: &mut dyn Storage, id: RequestId) -> StdResult<()> {
    let validators = REPORTS
        .prefix(id)
        .keys(storage, None, None, Order::Ascending)
        .collect::<StdResult<Vec<_>>>()?;
    for validator in validators {
        REPORTS.remove(storage, (id, &validator));
    }
    Ok(())
}

pub fn has_result(storage: &dyn Storage, id: RequestId) -> bool {
    RESULTS.has(storage, id)
}

pub fn get_result(storage: &dyn Storage, id: RequestId) -> Result<OracleResult, ContractError> {
    RESULTS
        .may_load(storage, id)?
        .ok_or(ContractError::ResultNotFound { id })
}

/// Saves the terminal result of a request.
/// A result is written once; a second write means resolution ran twice.
pub fn save_result(
    storage: &mut dyn Storage,
    id: RequestId,
    result: &OracleResult,
) -> Result<(), ContractError> {
    if has_result(storage, id) {
        return Err(ContractError::store_corruption(format!(
            "result of request {id} already exists"
        )));
    }
    RESULTS.save(storage, id, result)?;
    Ok(())
}

/// Pages through resolved requests in id order.
///
/// Iterates the result keyspace: unresolved requests are not part of the listing.
/// The page starts at `key` when given, which is the `next_key` of the previous page,
/// and skips `offset` entries otherwise; setting both is rejected.
/// A `limit` of `None` or `0` reads to the end, an `offset` past the end yields an empty page.
pub fn get_paginated_requests(
    storage: &dyn Storage,
    limit: Option<u64>,
    offset: u64,
    key: Option<RequestId>,
    reverse: bool,
) -> Result<(Vec<RequestResult>, PageResponse), ContractError> {
    if key.is_some() && offset > 0 {
        return Err(ContractError::invalid_request(
            "either offset or key can be set, not both",
        ));
    }
    let order = if reverse {
        Order::Descending
    } else {
        Order::Ascending
    };
    let limit = limit.filter(|l| *l > 0).unwrap_or(u64::MAX);
    let corruption = |err: StdError| {
        ContractError::store_corruption(format!("failed to paginate requests: {err}"))
    };

    let total = RESULTS
        .keys_raw(storage, None, None, Order::Ascending)
        .count() as u64;

    // skipped entries only decode their key
    let (min, max) = page_bounds(key, reverse);
    let mut keys = RESULTS.keys(storage, min, max, order);
    for _ in 0..offset {
        if keys.next().transpose().map_err(corruption)?.is_none() {
            return Ok((vec![], PageResponse { next_key: None, total }));
        }
    }
    let Some(start) = keys.next().transpose().map_err(corruption)? else {
        return Ok((vec![], PageResponse { next_key: None, total }));
    };

    let (min, max) = page_bounds(Some(start), reverse);
    let mut requests = Vec::new();
    let mut next_key = None;
    for item in RESULTS.range(storage, min, max, order) {
        let (id, result) = item.map_err(corruption)?;
        if requests.len() as u64 == limit {
            next_key = Some(id);
            break;
        }
        requests.push(RequestResult::from(result));
    }

    Ok((requests, PageResponse { next_key, total }))
}

/// Range bounds starting at `key` inclusive in the iteration direction.
fn page_bounds<'a>(
    key: Option<RequestId>,
    reverse: bool,
) -> (Option<Bound<'a, RequestId>>, Option<Bound<'a, RequestId>>) {
    match (key, reverse) {
        (None, _) => (None, None),
        (Some(key), false) => (Some(Bound::inclusive(key)), None),
        (Some(key), true) => (None, Some(Bound::inclusive(key))),
    }
}

/// Returns the oracle pool; it is written at instantiation so absence is corruption.
pub fn get_oracle_pool(storage: &dyn Storage) -> Result<OraclePool, ContractError> {
    ORACLE_POOL
        .may_load(storage)?
        .ok_or_else(|| ContractError::store_corruption("oracle pool should not have been empty"))
}

/// Replaces the whole oracle pool.
pub fn set_oracle_pool(storage: &mut dyn Storage, pool: &OraclePool) -> StdResult<()> {
    ORACLE_POOL.save(storage, pool)
}

pub fn get_params(storage: &dyn Storage) -> Result<Params, ContractError> {
    PARAMS
        .may_load(storage)?
        .ok_or_else(|| ContractError::store_corruption("params should not have been empty"))
}

pub fn set_params(storage: &mut dyn Storage, params: &Params) -> Result<(), ContractError> {
    params.validate()?;
    PARAMS.save(storage, params)?;
    Ok(())
}

pub fn get_validator_status(
    storage: &dyn Storage,
    validator: &Addr,
) -> Result<ValidatorStatus, ContractError> {
    VALIDATOR_STATUSES
        .may_load(storage, validator)?
        .ok_or(ContractError::ValidatorNotFound {})
}

pub fn set_validator_status(
    storage: &mut dyn Storage,
    validator: &Addr,
    status: &ValidatorStatus,
) -> StdResult<()> {
    VALIDATOR_STATUSES.save(storage, validator, status)
}

/// Active validators sorted by address.
pub fn get_active_validators(storage: &dyn Storage) -> StdResult<Vec<Addr>> {
    VALIDATOR_STATUSES
        .range(storage, None, None, Order::Ascending)
        .filter_map(|item| match item {
            Ok((validator, status)) if status.is_active => Some(Ok(validator)),
            Ok(_) => None,
            Err(err) => Some(Err(err)),
        })
        .collect()
}

/// A validator is always its own reporter.
pub fn is_reporter(storage: &dyn Storage, validator: &Addr, reporter: &Addr) -> bool {
    validator == reporter || REPORTERS.has(storage, (validator, reporter))
}

pub fn add_reporter(storage: &mut dyn Storage, validator: &Addr, reporter: &Addr) -> StdResult<()> {
    REPORTERS.save(storage, (validator, reporter), &())
}

pub fn remove_reporter(storage: &mut dyn Storage, validator: &Addr, reporter: &Addr) {
    REPORTERS.remove(storage, (validator, reporter));
}
