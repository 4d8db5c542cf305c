use crate::msg::{ExecuteMsg, InstantiateMsg, QueryMsg};
use crate::oracle_script::{ExecuteResponse, OracleScriptQueryMsg, PrepareResponse, RawRequestSpec};
use crate::state::DataSourceId;
use cosmwasm_schema::cw_serde;
use cosmwasm_std::{
    to_json_binary, Addr, Binary, Deps, DepsMut, Empty, Env, MessageInfo, Response, StdError,
    StdResult,
};
use cw_multi_test::{App, Contract, ContractWrapper};
use cw_storage_plus::Item;
use odin_library::testing::TestingContract;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OracleContract {
    pub addr: Addr,
    pub init: InstantiateMsg,
}

impl TestingContract<InstantiateMsg, ExecuteMsg, QueryMsg> for OracleContract {
    fn wrapper() -> Box<dyn Contract<Empty>> {
        Box::new(
            ContractWrapper::new(
                crate::contract::execute,
                crate::contract::instantiate,
                crate::contract::query,
            )
            .with_sudo(crate::contract::sudo),
        )
    }

    fn default_init(app: &mut App, _env: &Env) -> InstantiateMsg {
        InstantiateMsg {
            admin: app.api().addr_make("admin").to_string(),
            params: None,
            validators: (0..4)
                .map(|i| app.api().addr_make(&format!("validator{i}")).to_string())
                .collect(),
        }
    }

    fn new(app: &mut App, env: &Env, msg: Option<InstantiateMsg>) -> Self {
        let init = msg.unwrap_or(Self::default_init(app, env));
        let addr = Self::instantiate(app, "oracle", &init);
        Self { addr, init }
    }

    fn addr(&self) -> &Addr {
        &self.addr
    }
}

/// Oracle script fanning its calldata out to a fixed list of data sources.
///
/// `Execute` answers with the data of the first raw report of the first report,
/// and fails when the calldata is `fail`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MockOracleScript {
    pub addr: Addr,
    pub init: MockOracleScriptInstantiateMsg,
}

#[cw_serde]
pub struct MockOracleScriptInstantiateMsg {
    pub data_source_ids: Vec<DataSourceId>,
}

const DATA_SOURCE_IDS: Item<Vec<DataSourceId>> = Item::new("data_source_ids");

fn mock_instantiate(
    deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    msg: MockOracleScriptInstantiateMsg,
) -> StdResult<Response> {
    DATA_SOURCE_IDS.save(deps.storage, &msg.data_source_ids)?;
    Ok(Response::new())
}

fn mock_execute(
    _deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    _msg: Empty,
) -> StdResult<Response> {
    Err(StdError::generic_err("oracle script has no execute"))
}

fn mock_query(deps: Deps, _env: Env, msg: OracleScriptQueryMsg) -> StdResult<Binary> {
    match msg {
        OracleScriptQueryMsg::Prepare { calldata } => {
            let raw_requests = DATA_SOURCE_IDS
                .load(deps.storage)?
                .into_iter()
                .enumerate()
                .map(|(i, data_source_id)| RawRequestSpec {
                    external_id: i as u64 + 1,
                    data_source_id,
                    calldata: calldata.clone(),
                })
                .collect();
            to_json_binary(&PrepareResponse { raw_requests })
        }
        OracleScriptQueryMsg::Execute { calldata, reports } => {
            if calldata.as_slice() == b"fail" {
                return Err(StdError::generic_err("execution failed"));
            }
            let result = reports
                .first()
                .and_then(|report| report.raw_reports.first())
                .map(|raw| raw.data.clone())
                .ok_or_else(|| StdError::generic_err("no reports"))?;
            to_json_binary(&ExecuteResponse { result })
        }
    }
}

impl TestingContract<MockOracleScriptInstantiateMsg, Empty, OracleScriptQueryMsg>
    for MockOracleScript
{
    fn wrapper() -> Box<dyn Contract<Empty>> {
        Box::new(ContractWrapper::new(mock_execute, mock_instantiate, mock_query))
    }

    fn default_init(_app: &mut App, _env: &Env) -> MockOracleScriptInstantiateMsg {
        MockOracleScriptInstantiateMsg {
            data_source_ids: vec![1],
        }
    }

    fn new(app: &mut App, env: &Env, msg: Option<MockOracleScriptInstantiateMsg>) -> Self {
        let init = msg.unwrap_or(Self::default_init(app, env));
        let addr = Self::instantiate(app, "oracle_script", &init);
        Self { addr, init }
    }

    fn addr(&self) -> &Addr {
        &self.addr
    }
}
