use crate::state::{
    DataSource, DataSourceId, ExternalId, OracleResult, OracleScript, OracleScriptId, Params,
    RawReport, Report, Request, RequestId, ResolveStatus,
};
use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Binary, Timestamp};

#[cw_serde]
pub struct InstantiateMsg {
    pub admin: String,
    /// Defaults to [Params::default] when not provided.
    pub params: Option<Params>,
    /// Initial validator set, all active from instantiation.
    pub validators: Vec<String>,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// ExecuteMsg CreateDataSource registers a data source, owned by the sender.
    /// The data source is pinned by the sha256 of its `executable`.
    CreateDataSource {
        name: String,
        description: String,
        executable: Binary,
    },

    /// ExecuteMsg EditDataSource updates a data source. Only the owner can call this message.
    /// Requests made before the edit keep the previous executable hash.
    EditDataSource {
        id: DataSourceId,
        name: Option<String>,
        description: Option<String>,
        executable: Option<Binary>,
    },

    /// ExecuteMsg CreateOracleScript registers the contract at `address` as an oracle script.
    CreateOracleScript {
        name: String,
        description: String,
        address: String,
    },

    /// ExecuteMsg RegisterValidator adds an active validator to the oracle committee pool.
    /// Only the `admin` can call this message.
    RegisterValidator { validator: String },

    /// ExecuteMsg Activate re-activates the sender validator after its inactive penalty.
    Activate {},

    /// ExecuteMsg AddReporter allows `reporter` to report on behalf of the sender validator.
    AddReporter { reporter: String },

    /// ExecuteMsg RemoveReporter revokes a reporter of the sender validator.
    RemoveReporter { reporter: String },

    /// ExecuteMsg RequestData submits a new oracle request.
    /// `ask_count` validators are sampled and the oracle script fans the request out
    /// into raw requests, emitted as `raw_request` events for reporters.
    RequestData {
        oracle_script_id: OracleScriptId,
        calldata: Binary,
        ask_count: u64,
        min_count: u64,
        client_id: String,
    },

    /// ExecuteMsg ReportData submits the raw reports of `validator` for a request.
    /// The sender must be the validator or one of its reporters.
    ReportData {
        request_id: RequestId,
        validator: String,
        raw_reports: Vec<RawReport>,
    },

    /// ExecuteMsg PruneRequest removes a settled request and its reports; the result stays.
    /// Only the `admin` can call this message.
    PruneRequest { id: RequestId },

    /// ExecuteMsg UpdateParams replaces the oracle parameters.
    /// Only the `admin` can call this message.
    UpdateParams(Params),

    /// ExecuteMsg TransferAdmin
    /// See [`odin_library::admin::transfer_admin`] for more information on this field
    TransferAdmin { new_admin: String },
}

/// Messages only the chain itself can send.
#[cw_serde]
pub enum SudoMsg {
    /// Runs once per block: resolves pending requests, then expires overdue ones.
    EndBlock {},
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    /// QueryMsg Request: returns the request with its reports and result, if resolved.
    #[returns(RequestResponse)]
    Request { id: RequestId },

    /// QueryMsg Requests: returns resolved requests in id order.
    /// `limit` of `None` reads to the end; `offset` past the end returns an empty page.
    /// `key` continues from the `next_key` of a previous page and excludes `offset`.
    #[returns(RequestsResponse)]
    Requests {
        limit: Option<u64>,
        offset: Option<u64>,
        key: Option<RequestId>,
        reverse: Option<bool>,
    },

    /// QueryMsg PendingRequests: returns the request ids waiting for end block resolution.
    #[returns(PendingRequestsResponse)]
    PendingRequests {},

    #[returns(CountsResponse)]
    Counts {},

    #[returns(DataSource)]
    DataSource { id: DataSourceId },

    #[returns(OracleScript)]
    OracleScript { id: OracleScriptId },

    #[returns(crate::state::ValidatorStatus)]
    ValidatorStatus { validator: String },

    #[returns(IsReporterResponse)]
    IsReporter { validator: String, reporter: String },

    #[returns(Params)]
    Params {},

    #[returns(crate::state::OraclePool)]
    OraclePool {},

    /// QueryMsg RequestVerification: checks that the holder of `reporter_pubkey` is allowed
    /// to report `external_id` of `request_id` for `validator`.
    /// `signature` is over the sha256 of the canonical [crate::verification::VerificationMessage].
    /// Data source executors call this before serving a reporter.
    #[returns(VerificationResponse)]
    RequestVerification {
        chain_id: String,
        validator: String,
        request_id: RequestId,
        external_id: ExternalId,
        reporter_pubkey: Binary,
        signature: Binary,
    },
}

#[cw_serde]
pub struct RequestResponse {
    pub request: Request,
    pub reports: Vec<Report>,
    pub result: Option<OracleResult>,
}

/// Request side of a resolved request.
#[cw_serde]
pub struct OracleRequestPacketData {
    pub client_id: String,
    pub oracle_script_id: OracleScriptId,
    pub calldata: Binary,
    pub ask_count: u64,
    pub min_count: u64,
}

/// Response side of a resolved request.
#[cw_serde]
pub struct OracleResponsePacketData {
    pub request_id: RequestId,
    pub ans_count: u64,
    pub request_time: Timestamp,
    pub resolve_time: Timestamp,
    pub resolve_status: ResolveStatus,
    pub result: Option<Binary>,
}

#[cw_serde]
pub struct RequestResult {
    pub request_packet_data: OracleRequestPacketData,
    pub response_packet_data: OracleResponsePacketData,
}

/// `next_key` is the id of the first request after the page, `None` on the last page.
#[cw_serde]
pub struct PageResponse {
    pub next_key: Option<RequestId>,
    pub total: u64,
}

#[cw_serde]
pub struct RequestsResponse {
    pub requests: Vec<RequestResult>,
    pub pagination: PageResponse,
}

#[cw_serde]
pub struct PendingRequestsResponse(pub Vec<RequestId>);

#[cw_serde]
pub struct CountsResponse {
    pub request_count: u64,
    pub request_last_expired: RequestId,
    pub data_source_count: u64,
    pub oracle_script_count: u64,
}

#[cw_serde]
pub struct IsReporterResponse(pub bool);

#[cw_serde]
pub struct VerificationResponse {
    pub chain_id: String,
    pub validator: Addr,
    pub request_id: RequestId,
    pub external_id: ExternalId,
    pub data_source_id: DataSourceId,
}
