//! Decoding of the events the oracle contract emits when a request is made.
//!
//! Contract events reach the chain with their type prefixed by `wasm-`.

use crate::error::ReporterError;
use cosmwasm_std::{Binary, Event, HexBinary};
use odin_oracle::state::{RawRequest, RequestId};

pub const EVENT_TYPE_REQUEST: &str = "wasm-request";
pub const EVENT_TYPE_RAW_REQUEST: &str = "wasm-raw_request";

pub const ATTRIBUTE_KEY_ID: &str = "id";
pub const ATTRIBUTE_KEY_VALIDATOR: &str = "validator";
pub const ATTRIBUTE_KEY_DATA_SOURCE_ID: &str = "data_source_id";
pub const ATTRIBUTE_KEY_DATA_SOURCE_HASH: &str = "data_source_hash";
pub const ATTRIBUTE_KEY_EXTERNAL_ID: &str = "external_id";
pub const ATTRIBUTE_KEY_CALLDATA: &str = "calldata";

/// Every value of `key` across the events of type `ty`, in emission order.
pub fn get_event_values(events: &[Event], ty: &str, key: &str) -> Vec<String> {
    events
        .iter()
        .filter(|event| event.ty == ty)
        .flat_map(|event| event.attributes.iter())
        .filter(|attr| attr.key == key)
        .map(|attr| attr.value.clone())
        .collect()
}

/// The single value of `key` across the events of type `ty`.
/// Zero and multiple matches are both errors.
pub fn get_event_value(events: &[Event], ty: &str, key: &str) -> Result<String, ReporterError> {
    let mut values = get_event_values(events, ty, key);
    match values.len() {
        0 => Err(ReporterError::EventNotFound {
            ty: ty.to_string(),
            key: key.to_string(),
        }),
        1 => Ok(values.remove(0)),
        _ => Err(ReporterError::DuplicateEvent {
            ty: ty.to_string(),
            key: key.to_string(),
        }),
    }
}

pub fn get_request_id(events: &[Event]) -> Result<RequestId, ReporterError> {
    let value = get_event_value(events, EVENT_TYPE_REQUEST, ATTRIBUTE_KEY_ID)?;
    parse_u64(&value, "request id")
}

/// Validators the request was assigned to.
pub fn get_requested_validators(events: &[Event]) -> Vec<String> {
    get_event_values(events, EVENT_TYPE_REQUEST, ATTRIBUTE_KEY_VALIDATOR)
}

/// Rebuilds the raw requests of a request from its `raw_request` events.
pub fn get_raw_requests(events: &[Event]) -> Result<Vec<RawRequest>, ReporterError> {
    let values = |key: &str| get_event_values(events, EVENT_TYPE_RAW_REQUEST, key);
    let data_source_ids = values(ATTRIBUTE_KEY_DATA_SOURCE_ID);
    let data_source_hashes = values(ATTRIBUTE_KEY_DATA_SOURCE_HASH);
    let external_ids = values(ATTRIBUTE_KEY_EXTERNAL_ID);
    let calldata_list = values(ATTRIBUTE_KEY_CALLDATA);

    for (name, len) in [
        ("data source hash", data_source_hashes.len()),
        ("external id", external_ids.len()),
        ("calldata", calldata_list.len()),
    ] {
        if len != data_source_ids.len() {
            return Err(ReporterError::parse(format!(
                "inconsistent data source count and {name} count"
            )));
        }
    }

    data_source_ids
        .iter()
        .zip(data_source_hashes.iter())
        .zip(external_ids.iter())
        .zip(calldata_list.iter())
        .map(|(((data_source_id, hash), external_id), calldata)| {
            Ok(RawRequest {
                external_id: parse_u64(external_id, "external id")?,
                data_source_id: parse_u64(data_source_id, "data source id")?,
                data_source_hash: HexBinary::from_hex(hash).map_err(|err| {
                    ReporterError::parse(format!(
                        "failed to parse data source hash {hash:?}: {err}"
                    ))
                })?,
                calldata: Binary::from_base64(calldata).map_err(|err| {
                    ReporterError::parse(format!("failed to parse calldata {calldata:?}: {err}"))
                })?,
            })
        })
        .collect()
}

fn parse_u64(value: &str, name: &str) -> Result<u64, ReporterError> {
    value
        .parse()
        .map_err(|err| ReporterError::parse(format!("failed to parse {name} {value:?}: {err}")))
}
