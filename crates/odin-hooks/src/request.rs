//! Indexes successful oracle results per block and answers `latest_request` queries.
//!
//! Rows staged during a block are written in a single redb write transaction right
//! before the block commits. A failed write is rolled back and logged; it never halts
//! the chain.

use crate::error::HookError;
use cosmwasm_std::{Binary, Event, Storage, Timestamp};
use odin_oracle::state::{get_result, OracleResult, OracleScriptId, RequestId, ResolveStatus};
use redb::{Database, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, error, info, warn};

pub const EVENT_TYPE_RESOLVE: &str = "wasm-resolve";
pub const ATTRIBUTE_KEY_ID: &str = "id";

pub const APP_HOOK: &str = "apphook";
pub const QUERY_LATEST_REQUEST: &str = "latest_request";

const DRIVER_REDB: &str = "redb";

/// request id -> JSON encoded [IndexedRequest]
const REQUESTS: TableDefinition<u64, &[u8]> = TableDefinition::new("request");

/// (calldata, min_count, ask_count, oracle_script_id, resolve_time, request id)
/// A search is one prefix range, already ordered by resolve time.
type SearchKey<'a> = (&'a [u8], u64, u64, u64, u64, RequestId);
const SEARCH_INDEX: TableDefinition<SearchKey, ()> =
    TableDefinition::new("ix_calldata_min_count_ask_count_oracle_script_id_resolve_time");

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
struct IndexedRequest {
    id: RequestId,
    oracle_script_id: OracleScriptId,
    calldata: Binary,
    ask_count: u64,
    min_count: u64,
    resolve_time: Timestamp,
}

impl IndexedRequest {
    fn search_key(&self) -> SearchKey<'_> {
        (
            self.calldata.as_slice(),
            self.min_count,
            self.ask_count,
            self.oracle_script_id,
            self.resolve_time.nanos(),
            self.id,
        )
    }
}

impl From<OracleResult> for IndexedRequest {
    fn from(result: OracleResult) -> Self {
        Self {
            id: result.request_id,
            oracle_script_id: result.oracle_script_id,
            calldata: result.calldata,
            ask_count: result.ask_count,
            min_count: result.min_count,
            resolve_time: result.resolve_time,
        }
    }
}

/// Data of a `latest_request` query.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct QueryRequestSearchParams {
    pub oracle_script_id: OracleScriptId,
    pub calldata: Binary,
    pub ask_count: u64,
    pub min_count: u64,
}

pub struct RequestHook {
    db: Database,
    staged: Vec<IndexedRequest>,
}

impl RequestHook {
    /// Opens the hook from a `<driver>://<path>` connection string.
    /// `redb` is the only driver.
    pub fn open(conn_str: &str) -> Result<Self, HookError> {
        let (driver, path) = conn_str
            .split_once("://")
            .ok_or_else(|| HookError::InvalidConnection {
                msg: format!("expected <driver>://<path>, got {conn_str:?}"),
            })?;
        if driver != DRIVER_REDB {
            return Err(HookError::UnknownDriver {
                driver: driver.to_string(),
            });
        }
        if path.is_empty() {
            return Err(HookError::InvalidConnection {
                msg: "empty database path".to_string(),
            });
        }
        Self::create(path)
    }

    pub fn create(path: impl AsRef<Path>) -> Result<Self, HookError> {
        let path = path.as_ref();
        let db = Database::create(path).map_err(HookError::backend)?;

        // Ensure the table exists so readers never race the first write.
        let w = db.begin_write().map_err(HookError::backend)?;
        {
            w.open_table(REQUESTS).map_err(HookError::backend)?;
            w.open_table(SEARCH_INDEX).map_err(HookError::backend)?;
        }
        w.commit().map_err(HookError::backend)?;

        info!(path = %path.display(), "request hook opened");
        Ok(Self { db, staged: vec![] })
    }

    /// Starts a block. Rows of a block that never reached commit are dropped.
    pub fn after_begin_block(&mut self) {
        if !self.staged.is_empty() {
            warn!(
                rows = self.staged.len(),
                "discarding rows of an uncommitted block"
            );
            self.staged.clear();
        }
    }

    /// Stages every request the block resolved successfully.
    ///
    /// `storage` is the oracle contract storage as of the end of the block.
    /// On error nothing of the block is staged.
    pub fn after_end_block(
        &mut self,
        storage: &dyn Storage,
        events: &[Event],
    ) -> Result<(), HookError> {
        let mut rows = vec![];
        for event in events.iter().filter(|event| event.ty == EVENT_TYPE_RESOLVE) {
            let id = resolved_request_id(event)?;
            let result = get_result(storage, id)?;
            if result.resolve_status != ResolveStatus::Success {
                continue;
            }
            debug!(request_id = id, "staging resolved request");
            rows.push(IndexedRequest::from(result));
        }
        self.staged.extend(rows);
        Ok(())
    }

    /// Writes the staged rows.
    pub fn before_commit(&mut self) {
        let rows = std::mem::take(&mut self.staged);
        if rows.is_empty() {
            return;
        }
        match self.write(&rows) {
            Ok(()) => info!(rows = rows.len(), "indexed resolved requests"),
            Err(err) => error!(
                rows = rows.len(),
                error = %err,
                "failed to index resolved requests, rolled back"
            ),
        }
    }

    /// Dropping an uncommitted redb write transaction aborts it.
    fn write(&self, rows: &[IndexedRequest]) -> Result<(), HookError> {
        let w = self.db.begin_write().map_err(HookError::backend)?;
        {
            let mut table = w.open_table(REQUESTS).map_err(HookError::backend)?;
            let mut index = w.open_table(SEARCH_INDEX).map_err(HookError::backend)?;
            for row in rows {
                let value = serde_json::to_vec(row)?;
                table
                    .insert(row.id, value.as_slice())
                    .map_err(HookError::backend)?;
                index
                    .insert(row.search_key(), ())
                    .map_err(HookError::backend)?;
            }
        }
        w.commit().map_err(HookError::backend)
    }

    /// Serves `apphook/latest_request/{oracle_script_id}/{limit}` with
    /// [QueryRequestSearchParams] as JSON `data`.
    ///
    /// Returns `None` for paths this hook does not handle.
    pub fn apply_query(
        &self,
        path: &str,
        data: &[u8],
    ) -> Option<Result<Vec<RequestId>, HookError>> {
        let paths: Vec<&str> = path.split('/').collect();
        if paths.first() != Some(&APP_HOOK) || paths.get(1) != Some(&QUERY_LATEST_REQUEST) {
            return None;
        }
        Some(self.query_latest_request(&paths, data))
    }

    fn query_latest_request(
        &self,
        paths: &[&str],
        data: &[u8],
    ) -> Result<Vec<RequestId>, HookError> {
        if paths.len() != 4 {
            return Err(HookError::invalid_query(format!(
                "expect 4 arguments given {}",
                paths.len()
            )));
        }

        let params: QueryRequestSearchParams = serde_json::from_slice(data)
            .map_err(|err| HookError::invalid_query(format!("invalid search params: {err}")))?;
        let oracle_script_id: OracleScriptId = paths[2].parse().map_err(|err| {
            HookError::invalid_query(format!("invalid oracle script id {:?}: {err}", paths[2]))
        })?;
        if oracle_script_id != params.oracle_script_id {
            return Err(HookError::invalid_query(format!(
                "oracle script id {oracle_script_id} does not match search params {}",
                params.oracle_script_id
            )));
        }
        let limit: usize = paths[3].parse().map_err(|err| {
            HookError::invalid_query(format!("invalid limit {:?}: {err}", paths[3]))
        })?;

        self.latest_requests(&params, limit)
    }

    /// Ids of indexed requests matching `params`, most recently resolved first.
    pub fn latest_requests(
        &self,
        params: &QueryRequestSearchParams,
        limit: usize,
    ) -> Result<Vec<RequestId>, HookError> {
        let r = self.db.begin_read().map_err(HookError::backend)?;
        let index = r.open_table(SEARCH_INDEX).map_err(HookError::backend)?;

        let QueryRequestSearchParams {
            oracle_script_id,
            calldata,
            ask_count,
            min_count,
        } = params;
        let calldata = calldata.as_slice();
        let start: SearchKey = (calldata, *min_count, *ask_count, *oracle_script_id, 0, 0);
        let end: SearchKey = (
            calldata,
            *min_count,
            *ask_count,
            *oracle_script_id,
            u64::MAX,
            RequestId::MAX,
        );

        let mut ids = vec![];
        for entry in index.range(start..=end).map_err(HookError::backend)?.rev() {
            if ids.len() == limit {
                break;
            }
            let (key, _) = entry.map_err(HookError::backend)?;
            ids.push(key.value().5);
        }
        Ok(ids)
    }
}

fn resolved_request_id(event: &Event) -> Result<RequestId, HookError> {
    event
        .attributes
        .iter()
        .find(|attr| attr.key == ATTRIBUTE_KEY_ID)
        .and_then(|attr| attr.value.parse().ok())
        .ok_or_else(|| HookError::Serde {
            msg: format!("{} event without a valid {ATTRIBUTE_KEY_ID}", event.ty),
        })
}
