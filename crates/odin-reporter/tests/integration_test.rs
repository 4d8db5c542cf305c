use cosmwasm_std::testing::mock_env;
use cosmwasm_std::{Api, Binary};
use cw_multi_test::App;
use odin_library::testing::TestingContract;
use odin_oracle::msg::{ExecuteMsg, QueryMsg, RequestResponse, SudoMsg, VerificationResponse};
use odin_oracle::state::{ExternalId, ResolveStatus};
use odin_oracle::testing::{MockOracleScript, MockOracleScriptInstantiateMsg, OracleContract};
use odin_oracle::verification::pubkey_to_canonical;
use odin_reporter::config::ReporterConfig;
use odin_reporter::signer::{Secp256k1Signer, Signer};
use odin_reporter::{
    DataSourceExecutor, ExecutionOutput, ExecutionRequest, Reporter, ReporterError,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Answers `{data_source_id}:{calldata}` and keeps the credentials it was handed.
#[derive(Default, Clone)]
struct RecordingExecutor {
    credentials: Rc<RefCell<Vec<(ExternalId, Binary, Binary)>>>,
}

impl DataSourceExecutor for RecordingExecutor {
    fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionOutput, ReporterError> {
        self.credentials.borrow_mut().push((
            request.raw_request.external_id,
            request.reporter_pubkey.clone(),
            request.signature.clone(),
        ));
        let calldata = String::from_utf8_lossy(&request.raw_request.calldata).to_string();
        Ok(ExecutionOutput {
            exit_code: 0,
            data: Binary::from(
                format!("{}:{}", request.raw_request.data_source_id, calldata).into_bytes(),
            ),
        })
    }
}

fn setup() -> (App, OracleContract) {
    let mut app = App::default();
    let env = mock_env();

    let oracle = OracleContract::new(&mut app, &env, None);
    let script = MockOracleScript::new(
        &mut app,
        &env,
        Some(MockOracleScriptInstantiateMsg {
            data_source_ids: vec![1, 2],
        }),
    );

    let owner = app.api().addr_make("owner");
    for name in ["coingecko", "binance"] {
        let msg = ExecuteMsg::CreateDataSource {
            name: name.to_string(),
            description: format!("{name} price"),
            executable: Binary::from(format!("#!/bin/{name}").into_bytes()),
        };
        oracle.execute(&mut app, &owner, &msg).unwrap();
    }
    let msg = ExecuteMsg::CreateOracleScript {
        name: "median".to_string(),
        description: "median of prices".to_string(),
        address: script.addr().to_string(),
    };
    oracle.execute(&mut app, &owner, &msg).unwrap();

    app.update_block(|block| {
        block.height += 1;
        block.time = block.time.plus_seconds(5);
    });
    (app, oracle)
}

#[test]
fn reporter_serves_request_end_to_end() {
    let (mut app, oracle) = setup();
    let validator = app.api().addr_make("validator0");

    let signer = Secp256k1Signer::from_slice(&[0x42; 32]).unwrap();
    let reporter_addr = signer.address("cosmwasm").unwrap();
    let canonical = pubkey_to_canonical(&signer.public_key());
    assert_eq!(app.api().addr_humanize(&canonical).unwrap(), reporter_addr);

    let msg = ExecuteMsg::AddReporter {
        reporter: reporter_addr.to_string(),
    };
    oracle.execute(&mut app, &validator, &msg).unwrap();

    let client = app.api().addr_make("client");
    let msg = ExecuteMsg::RequestData {
        oracle_script_id: 1,
        calldata: Binary::from(b"BTC".to_vec()),
        ask_count: 4,
        min_count: 1,
        client_id: "client".to_string(),
    };
    let response = oracle.execute(&mut app, &client, &msg).unwrap();

    let executor = RecordingExecutor::default();
    let config = ReporterConfig {
        chain_id: app.block_info().chain_id,
        validator: validator.to_string(),
        data_source_timeout_secs: 10,
    };
    let chain_id = config.chain_id.clone();
    let reporter = Reporter::new(config, signer, executor.clone());

    let report = reporter.handle_request(&response.events).unwrap().unwrap();
    assert_eq!(
        report,
        ExecuteMsg::ReportData {
            request_id: 1,
            validator: validator.to_string(),
            raw_reports: vec![
                odin_oracle::state::RawReport {
                    external_id: 1,
                    exit_code: 0,
                    data: Binary::from(b"1:BTC".to_vec()),
                },
                odin_oracle::state::RawReport {
                    external_id: 2,
                    exit_code: 0,
                    data: Binary::from(b"2:BTC".to_vec()),
                },
            ],
        }
    );

    // data source providers accept the credentials the executor was handed
    for (external_id, reporter_pubkey, signature) in executor.credentials.borrow().iter() {
        let verified: VerificationResponse = oracle
            .query(
                &app,
                &QueryMsg::RequestVerification {
                    chain_id: chain_id.clone(),
                    validator: validator.to_string(),
                    request_id: 1,
                    external_id: *external_id,
                    reporter_pubkey: reporter_pubkey.clone(),
                    signature: signature.clone(),
                },
            )
            .unwrap();
        // the mock oracle script maps external id N to data source N
        assert_eq!(verified.data_source_id, *external_id);
        assert_eq!(verified.validator, validator);
    }

    oracle.execute(&mut app, &reporter_addr, &report).unwrap();
    oracle.sudo(&mut app, &SudoMsg::EndBlock {}).unwrap();

    let response: RequestResponse = oracle.query(&app, &QueryMsg::Request { id: 1 }).unwrap();
    let result = response.result.unwrap();
    assert_eq!(result.resolve_status, ResolveStatus::Success);
    assert_eq!(result.result, Some(Binary::from(b"1:BTC".to_vec())));
    assert_eq!(response.reports[0].validator, validator);
}

#[test]
fn reporter_skips_requests_of_other_validators() {
    let (mut app, oracle) = setup();
    let client = app.api().addr_make("client");

    let msg = ExecuteMsg::RequestData {
        oracle_script_id: 1,
        calldata: Binary::from(b"ETH".to_vec()),
        ask_count: 4,
        min_count: 1,
        client_id: "client".to_string(),
    };
    let response = oracle.execute(&mut app, &client, &msg).unwrap();

    let config = ReporterConfig {
        chain_id: app.block_info().chain_id,
        validator: app.api().addr_make("stranger").to_string(),
        data_source_timeout_secs: 10,
    };
    let signer = Secp256k1Signer::from_slice(&[0x42; 32]).unwrap();
    let executor = RecordingExecutor::default();
    let reporter = Reporter::new(config, signer, executor.clone());

    assert_eq!(reporter.handle_request(&response.events).unwrap(), None);
    assert!(executor.credentials.borrow().is_empty());
}
