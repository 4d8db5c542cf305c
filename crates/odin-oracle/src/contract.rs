#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;

use crate::error::ContractError;
use crate::msg::{ExecuteMsg, InstantiateMsg, QueryMsg, SudoMsg};
use crate::state;
use cosmwasm_std::{
    to_json_binary, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdResult,
};
use cw2::set_contract_version;
use odin_library::admin;

const CONTRACT_NAME: &str = concat!("crates.io:", env!("CARGO_PKG_NAME"));
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    env: Env,
    _info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let admin = deps.api.addr_validate(&msg.admin)?;
    admin::set_admin(deps.storage, &admin)?;

    let params = msg.params.unwrap_or_default();
    state::set_params(deps.storage, &params)?;
    state::set_oracle_pool(deps.storage, &state::OraclePool::default())?;
    state::set_request_count(deps.storage, 0)?;
    state::set_request_last_expired(deps.storage, 0)?;
    state::set_pending_resolve_list(deps.storage, &[])?;

    let validators = odin_library::addr::validate_addrs(deps.api, &msg.validators)?;
    for validator in &validators {
        state::set_validator_status(
            deps.storage,
            validator,
            &state::ValidatorStatus {
                is_active: true,
                since: env.block.time,
            },
        )?;
    }

    Ok(Response::new()
        .add_attribute("method", "instantiate")
        .add_attribute("admin", admin)
        .add_attribute("validators", validators.len().to_string()))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::CreateDataSource {
            name,
            description,
            executable,
        } => execute::create_data_source(deps, info, name, description, executable),
        ExecuteMsg::EditDataSource {
            id,
            name,
            description,
            executable,
        } => execute::edit_data_source(deps, info, id, name, description, executable),
        ExecuteMsg::CreateOracleScript {
            name,
            description,
            address,
        } => {
            let address = deps.api.addr_validate(&address)?;
            execute::create_oracle_script(deps, info, name, description, address)
        }
        ExecuteMsg::RegisterValidator { validator } => {
            let validator = deps.api.addr_validate(&validator)?;
            execute::register_validator(deps, env, info, validator)
        }
        ExecuteMsg::Activate {} => execute::activate(deps, env, info),
        ExecuteMsg::AddReporter { reporter } => {
            let reporter = deps.api.addr_validate(&reporter)?;
            execute::add_reporter(deps, info, reporter)
        }
        ExecuteMsg::RemoveReporter { reporter } => {
            let reporter = deps.api.addr_validate(&reporter)?;
            execute::remove_reporter(deps, info, reporter)
        }
        ExecuteMsg::RequestData {
            oracle_script_id,
            calldata,
            ask_count,
            min_count,
            client_id,
        } => execute::request_data(
            deps,
            env,
            info,
            execute::RequestInput {
                oracle_script_id,
                calldata,
                ask_count,
                min_count,
                client_id,
            },
        ),
        ExecuteMsg::ReportData {
            request_id,
            validator,
            raw_reports,
        } => {
            let validator = deps.api.addr_validate(&validator)?;
            execute::report_data(deps, env, info, request_id, validator, raw_reports)
        }
        ExecuteMsg::PruneRequest { id } => execute::prune_request(deps, info, id),
        ExecuteMsg::UpdateParams(params) => execute::update_params(deps, info, params),
        ExecuteMsg::TransferAdmin { new_admin } => {
            let new_admin = deps.api.addr_validate(&new_admin)?;
            admin::transfer_admin(deps.storage, info, new_admin).map_err(ContractError::Admin)
        }
    }
}

/// Block hooks, invoked by the chain and never by accounts.
#[cfg_attr(not(feature = "library"), entry_point)]
pub fn sudo(deps: DepsMut, env: Env, msg: SudoMsg) -> Result<Response, ContractError> {
    match msg {
        SudoMsg::EndBlock {} => sudo::end_block(deps, env),
    }
}

mod execute {
    use super::*;
    use crate::liveness;
    use crate::oracle_script;
    use crate::state::{
        DataSource, DataSourceId, OracleScript, OracleScriptId, RawReport, RawRequest, Report,
        Request, RequestId, ValidatorStatus,
    };
    use cosmwasm_std::{Addr, Coin, Event};
    use sha2::{Digest, Sha256};

    /// Executable hash pinned by raw requests.
    fn executable_hash(executable: &Binary) -> cosmwasm_std::HexBinary {
        Sha256::digest(executable.as_slice()).to_vec().into()
    }

    pub fn create_data_source(
        deps: DepsMut,
        info: MessageInfo,
        name: String,
        description: String,
        executable: Binary,
    ) -> Result<Response, ContractError> {
        let id = state::get_next_data_source_id(deps.storage)?;
        let data_source = DataSource {
            owner: info.sender,
            name,
            description,
            executable_hash: executable_hash(&executable),
        };
        state::DATA_SOURCES.save(deps.storage, id, &data_source)?;

        Ok(Response::new().add_event(
            Event::new("create_data_source")
                .add_attribute("id", id.to_string())
                .add_attribute("owner", data_source.owner)
                .add_attribute("executable_hash", data_source.executable_hash.to_hex()),
        ))
    }

    /// Only the owner can edit a data source.
    /// Requests already made keep the executable hash they pinned.
    pub fn edit_data_source(
        deps: DepsMut,
        info: MessageInfo,
        id: DataSourceId,
        name: Option<String>,
        description: Option<String>,
        executable: Option<Binary>,
    ) -> Result<Response, ContractError> {
        let mut data_source = state::get_data_source(deps.storage, id)?;
        if data_source.owner != info.sender {
            return Err(ContractError::unauthorized(format!(
                "{} is not the owner of data source {id}",
                info.sender
            )));
        }

        if let Some(name) = name {
            data_source.name = name;
        }
        if let Some(description) = description {
            data_source.description = description;
        }
        if let Some(executable) = executable {
            data_source.executable_hash = executable_hash(&executable);
        }
        state::DATA_SOURCES.save(deps.storage, id, &data_source)?;

        Ok(Response::new().add_event(
            Event::new("edit_data_source")
                .add_attribute("id", id.to_string())
                .add_attribute("executable_hash", data_source.executable_hash.to_hex()),
        ))
    }

    pub fn create_oracle_script(
        deps: DepsMut,
        info: MessageInfo,
        name: String,
        description: String,
        address: Addr,
    ) -> Result<Response, ContractError> {
        let id = state::get_next_oracle_script_id(deps.storage)?;
        let oracle_script = OracleScript {
            owner: info.sender,
            name,
            description,
            address,
        };
        state::ORACLE_SCRIPTS.save(deps.storage, id, &oracle_script)?;

        Ok(Response::new().add_event(
            Event::new("create_oracle_script")
                .add_attribute("id", id.to_string())
                .add_attribute("owner", oracle_script.owner)
                .add_attribute("address", oracle_script.address),
        ))
    }

    /// Adds `validator` to the committee pool as active.
    /// Registering a deactivated validator again clears its penalty.
    pub fn register_validator(
        deps: DepsMut,
        env: Env,
        info: MessageInfo,
        validator: Addr,
    ) -> Result<Response, ContractError> {
        admin::assert_admin(deps.storage, &info)?;

        state::set_validator_status(
            deps.storage,
            &validator,
            &ValidatorStatus {
                is_active: true,
                since: env.block.time,
            },
        )?;

        Ok(Response::new()
            .add_event(Event::new("register_validator").add_attribute("validator", validator)))
    }

    pub fn activate(deps: DepsMut, env: Env, info: MessageInfo) -> Result<Response, ContractError> {
        let params = state::get_params(deps.storage)?;
        liveness::activate(
            deps.storage,
            &info.sender,
            env.block.time,
            params.inactive_penalty_duration,
        )?;

        Ok(Response::new()
            .add_event(Event::new("activate").add_attribute("validator", info.sender)))
    }

    /// The sender must be a registered validator.
    pub fn add_reporter(
        deps: DepsMut,
        info: MessageInfo,
        reporter: Addr,
    ) -> Result<Response, ContractError> {
        let validator = info.sender;
        state::get_validator_status(deps.storage, &validator)?;
        state::add_reporter(deps.storage, &validator, &reporter)?;

        Ok(Response::new().add_event(
            Event::new("add_reporter")
                .add_attribute("validator", validator)
                .add_attribute("reporter", reporter),
        ))
    }

    pub fn remove_reporter(
        deps: DepsMut,
        info: MessageInfo,
        reporter: Addr,
    ) -> Result<Response, ContractError> {
        let validator = info.sender;
        state::get_validator_status(deps.storage, &validator)?;
        state::remove_reporter(deps.storage, &validator, &reporter);

        Ok(Response::new().add_event(
            Event::new("remove_reporter")
                .add_attribute("validator", validator)
                .add_attribute("reporter", reporter),
        ))
    }

    pub struct RequestInput {
        pub oracle_script_id: OracleScriptId,
        pub calldata: Binary,
        pub ask_count: u64,
        pub min_count: u64,
        pub client_id: String,
    }

    /// Picks `count` validators out of `candidates` (sorted by address).
    /// Every node derives the same committee from the same `seed`.
    pub(super) fn sample_validators(
        mut candidates: Vec<Addr>,
        count: u64,
        seed: &[u8],
    ) -> Vec<Addr> {
        let mut picked = Vec::new();
        for round in 0..count {
            if candidates.is_empty() {
                break;
            }
            let digest = Sha256::new()
                .chain_update(seed)
                .chain_update(round.to_be_bytes())
                .finalize();
            let mut entropy = [0u8; 8];
            entropy.copy_from_slice(&digest[..8]);
            let index = u64::from_be_bytes(entropy) % candidates.len() as u64;
            picked.push(candidates.remove(index as usize));
        }
        picked
    }

    fn sampling_seed(env: &Env, request_id: RequestId) -> Vec<u8> {
        let mut seed = env.block.chain_id.as_bytes().to_vec();
        seed.extend_from_slice(&env.block.height.to_be_bytes());
        seed.extend_from_slice(&request_id.to_be_bytes());
        seed
    }

    /// Collects the request fee, if any, into the oracle pool.
    fn collect_fee(
        deps: &mut DepsMut,
        info: &MessageInfo,
        fee: Option<Coin>,
    ) -> Result<(), ContractError> {
        let Some(fee) = fee else {
            cw_utils::nonpayable(info)?;
            return Ok(());
        };

        let paid = cw_utils::must_pay(info, &fee.denom)?;
        if paid < fee.amount {
            return Err(ContractError::invalid_request(format!(
                "insufficient fee: paid {paid}{}, required {fee}",
                fee.denom
            )));
        }

        let mut pool = state::get_oracle_pool(deps.storage)?;
        pool.add(Coin::new(paid, fee.denom));
        state::set_oracle_pool(deps.storage, &pool)?;
        Ok(())
    }

    /// Submits a new oracle request.
    ///
    /// Samples `ask_count` active validators, lets the oracle script fan the calldata out
    /// into raw requests, and emits one `request` event followed by one `raw_request`
    /// event per raw request, in fan-out order.
    pub fn request_data(
        mut deps: DepsMut,
        env: Env,
        info: MessageInfo,
        input: RequestInput,
    ) -> Result<Response, ContractError> {
        let params = state::get_params(deps.storage)?;

        if input.min_count == 0 {
            return Err(ContractError::invalid_request("min_count must be positive"));
        }
        if input.min_count > input.ask_count {
            return Err(ContractError::invalid_request(format!(
                "min_count {} is greater than ask_count {}",
                input.min_count, input.ask_count
            )));
        }
        if input.ask_count > params.max_ask_count {
            return Err(ContractError::invalid_request(format!(
                "ask_count {} exceeds the maximum of {}",
                input.ask_count, params.max_ask_count
            )));
        }
        if input.calldata.len() as u64 > params.max_calldata_size {
            return Err(ContractError::invalid_request(format!(
                "calldata of {} bytes exceeds the maximum of {}",
                input.calldata.len(),
                params.max_calldata_size
            )));
        }

        let script = state::get_oracle_script(deps.storage, input.oracle_script_id)?;
        collect_fee(&mut deps, &info, params.data_requester_fee.clone())?;

        let active = state::get_active_validators(deps.storage)?;
        if (active.len() as u64) < input.ask_count {
            return Err(ContractError::InsufficientValidators {
                required: input.ask_count,
                available: active.len() as u64,
            });
        }
        let request_id = state::get_request_count(deps.storage)? + 1;
        let seed = sampling_seed(&env, request_id);
        let validators = sample_validators(active, input.ask_count, &seed);

        let specs = oracle_script::prepare(&deps.querier, &script.address, &input.calldata)?;
        if specs.is_empty() {
            return Err(ContractError::invalid_request(
                "oracle script returned no raw requests",
            ));
        }
        if specs.len() as u64 > params.max_raw_request_count {
            return Err(ContractError::invalid_request(format!(
                "{} raw requests exceed the maximum of {}",
                specs.len(),
                params.max_raw_request_count
            )));
        }

        let mut raw_requests: Vec<RawRequest> = Vec::with_capacity(specs.len());
        for spec in specs {
            if raw_requests
                .iter()
                .any(|raw| raw.external_id == spec.external_id)
            {
                return Err(ContractError::invalid_request(format!(
                    "duplicate external id {}",
                    spec.external_id
                )));
            }
            let data_source = state::get_data_source(deps.storage, spec.data_source_id)?;
            raw_requests.push(RawRequest {
                external_id: spec.external_id,
                data_source_id: spec.data_source_id,
                data_source_hash: data_source.executable_hash,
                calldata: spec.calldata,
            });
        }

        let request = Request {
            id: request_id,
            oracle_script_id: input.oracle_script_id,
            calldata: input.calldata,
            requested_validators: validators,
            ask_count: input.ask_count,
            min_count: input.min_count,
            request_height: env.block.height,
            request_time: env.block.time,
            client_id: input.client_id,
            raw_requests,
        };
        let id = state::add_request(deps.storage, request.clone())?;
        if id != request_id {
            return Err(ContractError::store_corruption(format!(
                "allocated request id {id}, expected {request_id}"
            )));
        }

        let mut event = Event::new("request")
            .add_attribute("id", id.to_string())
            .add_attribute("client_id", &request.client_id)
            .add_attribute("oracle_script_id", request.oracle_script_id.to_string())
            .add_attribute("calldata", request.calldata.to_base64())
            .add_attribute("ask_count", request.ask_count.to_string())
            .add_attribute("min_count", request.min_count.to_string());
        for validator in &request.requested_validators {
            event = event.add_attribute("validator", validator);
        }

        let raw_events = request.raw_requests.iter().map(|raw| {
            Event::new("raw_request")
                .add_attribute("data_source_id", raw.data_source_id.to_string())
                .add_attribute("data_source_hash", raw.data_source_hash.to_hex())
                .add_attribute("external_id", raw.external_id.to_string())
                .add_attribute("calldata", raw.calldata.to_base64())
        });

        Ok(Response::new().add_event(event).add_events(raw_events))
    }

    /// Stores the report of `validator` for a request.
    ///
    /// The request enters the pending list exactly when its report count reaches
    /// `min_count` before it has been resolved.
    pub fn report_data(
        deps: DepsMut,
        env: Env,
        info: MessageInfo,
        request_id: RequestId,
        validator: Addr,
        raw_reports: Vec<RawReport>,
    ) -> Result<Response, ContractError> {
        let params = state::get_params(deps.storage)?;
        let request = state::get_request(deps.storage, request_id)?;

        if request
            .request_height
            .saturating_add(params.expiration_block_count)
            < env.block.height
        {
            return Err(ContractError::RequestAlreadyExpired {});
        }
        if !state::is_reporter(deps.storage, &validator, &info.sender) {
            return Err(ContractError::unauthorized(format!(
                "{} is not a reporter of {validator}",
                info.sender
            )));
        }
        if !request.is_requested(&validator) {
            return Err(ContractError::invalid_report(format!(
                "{validator} is not requested for request {request_id}"
            )));
        }
        if state::has_report(deps.storage, request_id, &validator) {
            return Err(ContractError::ReportAlreadyExists {});
        }

        if raw_reports.len() != request.raw_requests.len() {
            return Err(ContractError::invalid_report(format!(
                "expected {} raw reports, got {}",
                request.raw_requests.len(),
                raw_reports.len()
            )));
        }
        let mut seen = Vec::with_capacity(raw_reports.len());
        for raw in &raw_reports {
            if request.raw_request(raw.external_id).is_none() {
                return Err(ContractError::invalid_report(format!(
                    "unknown external id {}",
                    raw.external_id
                )));
            }
            if seen.contains(&raw.external_id) {
                return Err(ContractError::invalid_report(format!(
                    "duplicate external id {}",
                    raw.external_id
                )));
            }
            if raw.data.len() as u64 > params.max_report_data_size {
                return Err(ContractError::invalid_report(format!(
                    "data of external id {} exceeds {} bytes",
                    raw.external_id, params.max_report_data_size
                )));
            }
            seen.push(raw.external_id);
        }

        let in_before_resolve = !state::has_result(deps.storage, request_id);
        state::set_report(
            deps.storage,
            request_id,
            &Report {
                validator: validator.clone(),
                in_before_resolve,
                raw_reports,
            },
        )?;

        let report_count = state::get_report_count(deps.storage, request_id);
        if in_before_resolve && report_count == request.min_count {
            state::add_pending_request(deps.storage, request_id)?;
        }

        Ok(Response::new().add_event(
            Event::new("report")
                .add_attribute("id", request_id.to_string())
                .add_attribute("validator", validator)
                .add_attribute("reporter", info.sender),
        ))
    }

    /// Deletes a settled request and its reports. The result stays queryable.
    pub fn prune_request(
        deps: DepsMut,
        info: MessageInfo,
        id: RequestId,
    ) -> Result<Response, ContractError> {
        admin::assert_admin(deps.storage, &info)?;

        let last_expired = state::get_request_last_expired(deps.storage)?;
        if id > last_expired {
            return Err(ContractError::invalid_request(format!(
                "request {id} is not settled yet"
            )));
        }
        state::get_request(deps.storage, id)?;

        state::delete_request(deps.storage, id);
        state::delete_reports(deps.storage, id)?;

        Ok(Response::new()
            .add_event(Event::new("prune_request").add_attribute("id", id.to_string())))
    }

    /// Replaces the params; requests already made are not affected.
    pub fn update_params(
        deps: DepsMut,
        info: MessageInfo,
        params: state::Params,
    ) -> Result<Response, ContractError> {
        admin::assert_admin(deps.storage, &info)?;
        state::set_params(deps.storage, &params)?;

        Ok(Response::new().add_event(
            Event::new("update_params")
                .add_attribute(
                    "expiration_block_count",
                    params.expiration_block_count.to_string(),
                )
                .add_attribute("max_ask_count", params.max_ask_count.to_string()),
        ))
    }
}

mod sudo {
    use super::*;
    use crate::expiration::process_expired_requests;
    use crate::liveness::ValidatorLiveness;
    use crate::resolve::resolve_pending_requests;

    /// Resolves the requests that gathered enough reports during the block,
    /// then settles every request whose expiration window closed.
    /// Store corruption is returned as is and aborts the block.
    pub fn end_block(deps: DepsMut, env: Env) -> Result<Response, ContractError> {
        let mut events = resolve_pending_requests(deps.storage, &deps.querier, &env.block)?;

        let mut liveness = ValidatorLiveness::new(env.block.time);
        events.extend(process_expired_requests(
            deps.storage,
            &env.block,
            &mut liveness,
        )?);
        events.extend(liveness.into_events());

        Ok(Response::new()
            .add_attribute("method", "end_block")
            .add_events(events))
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> Result<Binary, ContractError> {
    match msg {
        QueryMsg::Request { id } => Ok(to_json_binary(&query::request(deps, id)?)?),
        QueryMsg::Requests {
            limit,
            offset,
            key,
            reverse,
        } => Ok(to_json_binary(&query::requests(
            deps,
            limit,
            offset.unwrap_or_default(),
            key,
            reverse.unwrap_or_default(),
        )?)?),
        QueryMsg::PendingRequests {} => Ok(to_json_binary(&query::pending_requests(deps)?)?),
        QueryMsg::Counts {} => Ok(to_json_binary(&query::counts(deps)?)?),
        QueryMsg::DataSource { id } => {
            Ok(to_json_binary(&state::get_data_source(deps.storage, id)?)?)
        }
        QueryMsg::OracleScript { id } => {
            Ok(to_json_binary(&state::get_oracle_script(deps.storage, id)?)?)
        }
        QueryMsg::ValidatorStatus { validator } => {
            let validator = deps.api.addr_validate(&validator)?;
            Ok(to_json_binary(&state::get_validator_status(
                deps.storage,
                &validator,
            )?)?)
        }
        QueryMsg::IsReporter {
            validator,
            reporter,
        } => {
            let validator = deps.api.addr_validate(&validator)?;
            let reporter = deps.api.addr_validate(&reporter)?;
            Ok(to_json_binary(&query::is_reporter(
                deps, validator, reporter,
            ))?)
        }
        QueryMsg::Params {} => Ok(to_json_binary(&state::get_params(deps.storage)?)?),
        QueryMsg::OraclePool {} => Ok(to_json_binary(&state::get_oracle_pool(deps.storage)?)?),
        QueryMsg::RequestVerification {
            chain_id,
            validator,
            request_id,
            external_id,
            reporter_pubkey,
            signature,
        } => {
            let validator = deps.api.addr_validate(&validator)?;
            Ok(to_json_binary(&query::request_verification(
                deps,
                env,
                query::VerificationInput {
                    chain_id,
                    validator,
                    request_id,
                    external_id,
                    reporter_pubkey,
                    signature,
                },
            )?)?)
        }
    }
}

mod query {
    use super::*;
    use crate::msg::{
        CountsResponse, IsReporterResponse, PendingRequestsResponse, RequestResponse,
        RequestsResponse, VerificationResponse,
    };
    use crate::state::{ExternalId, RequestId, DATA_SOURCE_COUNT, ORACLE_SCRIPT_COUNT};
    use crate::verification::{pubkey_to_canonical, VerificationMessage};
    use cosmwasm_std::Addr;

    pub fn request(deps: Deps, id: RequestId) -> Result<RequestResponse, ContractError> {
        let request = state::get_request(deps.storage, id)?;
        let reports = state::get_reports(deps.storage, id)?;
        let result = if state::has_result(deps.storage, id) {
            Some(state::get_result(deps.storage, id)?)
        } else {
            None
        };
        Ok(RequestResponse {
            request,
            reports,
            result,
        })
    }

    pub fn requests(
        deps: Deps,
        limit: Option<u64>,
        offset: u64,
        key: Option<RequestId>,
        reverse: bool,
    ) -> Result<RequestsResponse, ContractError> {
        let (requests, pagination) =
            state::get_paginated_requests(deps.storage, limit, offset, key, reverse)?;
        Ok(RequestsResponse {
            requests,
            pagination,
        })
    }

    pub fn pending_requests(deps: Deps) -> StdResult<PendingRequestsResponse> {
        Ok(PendingRequestsResponse(state::get_pending_resolve_list(
            deps.storage,
        )?))
    }

    pub fn counts(deps: Deps) -> StdResult<CountsResponse> {
        Ok(CountsResponse {
            request_count: state::get_request_count(deps.storage)?,
            request_last_expired: state::get_request_last_expired(deps.storage)?,
            data_source_count: DATA_SOURCE_COUNT
                .may_load(deps.storage)?
                .unwrap_or_default(),
            oracle_script_count: ORACLE_SCRIPT_COUNT
                .may_load(deps.storage)?
                .unwrap_or_default(),
        })
    }

    pub fn is_reporter(deps: Deps, validator: Addr, reporter: Addr) -> IsReporterResponse {
        IsReporterResponse(state::is_reporter(deps.storage, &validator, &reporter))
    }

    pub struct VerificationInput {
        pub chain_id: String,
        pub validator: Addr,
        pub request_id: RequestId,
        pub external_id: ExternalId,
        pub reporter_pubkey: Binary,
        pub signature: Binary,
    }

    /// Checks that the holder of `reporter_pubkey` may serve `external_id` of the request
    /// on behalf of `validator`, and returns the data source to execute.
    pub fn request_verification(
        deps: Deps,
        env: Env,
        input: VerificationInput,
    ) -> Result<VerificationResponse, ContractError> {
        if input.chain_id != env.block.chain_id {
            return Err(ContractError::unauthorized(format!(
                "chain id {} does not match {}",
                input.chain_id, env.block.chain_id
            )));
        }

        let message = VerificationMessage::new(
            input.chain_id,
            input.validator,
            input.request_id,
            input.external_id,
        );
        if !message.verify(deps.api, &input.signature, &input.reporter_pubkey)? {
            return Err(ContractError::unauthorized("invalid reporter signature"));
        }

        let reporter = deps
            .api
            .addr_humanize(&pubkey_to_canonical(&input.reporter_pubkey))?;
        if !state::is_reporter(deps.storage, &message.validator, &reporter) {
            return Err(ContractError::unauthorized(format!(
                "{reporter} is not a reporter of {}",
                message.validator
            )));
        }

        let request = state::get_request(deps.storage, message.request_id)?;
        if !request.is_requested(&message.validator) {
            return Err(ContractError::invalid_request(format!(
                "{} is not requested for request {}",
                message.validator, message.request_id
            )));
        }
        if state::has_report(deps.storage, message.request_id, &message.validator) {
            return Err(ContractError::ReportAlreadyExists {});
        }
        let params = state::get_params(deps.storage)?;
        if request
            .request_height
            .saturating_add(params.expiration_block_count)
            < env.block.height
        {
            return Err(ContractError::RequestAlreadyExpired {});
        }
        let raw_request = request.raw_request(message.external_id).ok_or_else(|| {
            ContractError::invalid_request(format!(
                "external id {} not found in request {}",
                message.external_id, message.request_id
            ))
        })?;

        Ok(VerificationResponse {
            data_source_id: raw_request.data_source_id,
            chain_id: message.chain_id,
            validator: message.validator,
            request_id: message.request_id,
            external_id: message.external_id,
        })
    }
}
