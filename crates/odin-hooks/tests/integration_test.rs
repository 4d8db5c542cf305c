use cosmwasm_std::testing::mock_env;
use cosmwasm_std::{Addr, Binary};
use cw_multi_test::App;
use odin_hooks::{QueryRequestSearchParams, RequestHook};
use odin_library::testing::TestingContract;
use odin_oracle::msg::{ExecuteMsg, QueryMsg, RequestResponse, SudoMsg};
use odin_oracle::state::RawReport;
use odin_oracle::testing::{MockOracleScript, OracleContract};

fn setup() -> (App, OracleContract) {
    let mut app = App::default();
    let env = mock_env();

    let oracle = OracleContract::new(&mut app, &env, None);
    let script = MockOracleScript::new(&mut app, &env, None);

    let owner = app.api().addr_make("owner");
    let msg = ExecuteMsg::CreateDataSource {
        name: "coingecko".to_string(),
        description: "coingecko price".to_string(),
        executable: Binary::from(b"#!/bin/coingecko".to_vec()),
    };
    oracle.execute(&mut app, &owner, &msg).unwrap();
    let msg = ExecuteMsg::CreateOracleScript {
        name: "price".to_string(),
        description: "latest price".to_string(),
        address: script.addr().to_string(),
    };
    oracle.execute(&mut app, &owner, &msg).unwrap();

    next_block(&mut app);
    (app, oracle)
}

fn next_block(app: &mut App) {
    app.update_block(|block| {
        block.height += 1;
        block.time = block.time.plus_seconds(5);
    });
}

/// Requests `calldata` from a single validator and lets it answer.
fn request_and_report(app: &mut App, oracle: &OracleContract, id: u64, calldata: &[u8]) {
    let client = app.api().addr_make("client");
    let msg = ExecuteMsg::RequestData {
        oracle_script_id: 1,
        calldata: Binary::from(calldata.to_vec()),
        ask_count: 1,
        min_count: 1,
        client_id: "client".to_string(),
    };
    oracle.execute(app, &client, &msg).unwrap();

    let response: RequestResponse = oracle.query(app, &QueryMsg::Request { id }).unwrap();
    let validator: Addr = response.request.requested_validators[0].clone();
    let msg = ExecuteMsg::ReportData {
        request_id: id,
        validator: validator.to_string(),
        raw_reports: vec![RawReport {
            external_id: 1,
            exit_code: 0,
            data: Binary::from(b"42".to_vec()),
        }],
    };
    oracle.execute(app, &validator, &msg).unwrap();
}

/// Runs one block through the hook the way the chain drives it.
fn end_block(app: &mut App, oracle: &OracleContract, hook: &mut RequestHook) {
    hook.after_begin_block();
    let response = oracle.sudo(app, &SudoMsg::EndBlock {}).unwrap();
    {
        let storage = app.contract_storage(oracle.addr());
        hook.after_end_block(storage.as_ref(), &response.events)
            .unwrap();
    }
    hook.before_commit();
    next_block(app);
}

fn search(calldata: &[u8]) -> Vec<u8> {
    serde_json::to_vec(&QueryRequestSearchParams {
        oracle_script_id: 1,
        calldata: Binary::from(calldata.to_vec()),
        ask_count: 1,
        min_count: 1,
    })
    .unwrap()
}

#[test]
fn hook_indexes_resolved_requests() {
    let (mut app, oracle) = setup();
    let dir = tempfile::tempdir().unwrap();
    let conn_str = format!("redb://{}", dir.path().join("hook.redb").display());
    let mut hook = RequestHook::open(&conn_str).unwrap();

    request_and_report(&mut app, &oracle, 1, b"BTC");
    end_block(&mut app, &oracle, &mut hook);

    request_and_report(&mut app, &oracle, 2, b"ETH");
    request_and_report(&mut app, &oracle, 3, b"BTC");
    end_block(&mut app, &oracle, &mut hook);

    // failed requests are not indexed
    request_and_report(&mut app, &oracle, 4, b"fail");
    end_block(&mut app, &oracle, &mut hook);

    let ids = hook
        .apply_query("apphook/latest_request/1/10", &search(b"BTC"))
        .unwrap()
        .unwrap();
    assert_eq!(ids, vec![3, 1]);

    let ids = hook
        .apply_query("apphook/latest_request/1/1", &search(b"ETH"))
        .unwrap()
        .unwrap();
    assert_eq!(ids, vec![2]);

    let ids = hook
        .apply_query("apphook/latest_request/1/10", &search(b"fail"))
        .unwrap()
        .unwrap();
    assert!(ids.is_empty());
}
