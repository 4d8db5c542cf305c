use cosmwasm_std::{Addr, Empty, Env, StdResult};
use cw_multi_test::error::AnyResult;
use cw_multi_test::{App, AppResponse, Contract, Executor};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// Wires a contract into a multi-test [App].
///
/// Implementors only describe how to build and initialize the contract;
/// storing, instantiating, and calling it are shared.
pub trait TestingContract<IM, EM, QM>
where
    IM: Serialize,
    EM: Serialize + Debug,
    QM: Serialize,
{
    fn wrapper() -> Box<dyn Contract<Empty>>;

    fn default_init(app: &mut App, env: &Env) -> IM;

    fn new(app: &mut App, env: &Env, msg: Option<IM>) -> Self;

    fn addr(&self) -> &Addr;

    /// Stores the code of [TestingContract::wrapper] and instantiates it under `label`.
    /// The `creator` account is both the sender and the wasm admin.
    fn instantiate(app: &mut App, label: &str, msg: &IM) -> Addr {
        let code_id = app.store_code(Self::wrapper());
        let creator = app.api().addr_make("creator");
        app.instantiate_contract(
            code_id,
            creator.clone(),
            msg,
            &[],
            label,
            Some(creator.to_string()),
        )
        .unwrap()
    }

    fn execute(&self, app: &mut App, sender: &Addr, msg: &EM) -> AnyResult<AppResponse> {
        app.execute_contract(sender.clone(), self.addr().clone(), msg, &[])
    }

    /// Runs a privileged `sudo` call, the way the chain drives block hooks.
    fn sudo<SM: Serialize>(&self, app: &mut App, msg: &SM) -> AnyResult<AppResponse> {
        app.wasm_sudo(self.addr().clone(), msg)
    }

    fn query<T: DeserializeOwned>(&self, app: &App, msg: &QM) -> StdResult<T> {
        app.wrap().query_wasm_smart(self.addr(), msg)
    }
}
