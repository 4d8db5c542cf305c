use crate::error::ContractError;
use crate::liveness::LivenessTracker;
use crate::resolve::resolve_expired;
use crate::state::{
    get_params, get_request_count, get_request_last_expired, has_report, has_result,
    must_get_request, set_request_last_expired,
};
use cosmwasm_std::{BlockInfo, Event, Storage};

/// Settles every request whose expiration window has closed, in id order.
///
/// A request made at height `H` stays open while `block.height <= H + expiration_block_count`.
/// Request ids are allocated in non-decreasing height order, so the sweep stops at the
/// first request still open. For each settled request:
/// 1. resolve it as expired if it has no result yet,
/// 2. report every requested validator without a report to `liveness`,
/// 3. advance the last expired pointer to it, whether it expired here or resolved earlier.
///
/// A missing request below the request count is store corruption and aborts the sweep.
pub fn process_expired_requests(
    storage: &mut dyn Storage,
    block: &BlockInfo,
    liveness: &mut dyn LivenessTracker,
) -> Result<Vec<Event>, ContractError> {
    let expiration_block_count = get_params(storage)?.expiration_block_count;
    let last_id = get_request_count(storage)?;
    let mut events = vec![];

    for id in (get_request_last_expired(storage)? + 1)..=last_id {
        let request = must_get_request(storage, id)?;
        if request.request_height.saturating_add(expiration_block_count) >= block.height {
            break;
        }

        if !has_result(storage, id) {
            events.push(resolve_expired(storage, &request, block.time)?);
        }

        for validator in &request.requested_validators {
            if !has_report(storage, id, validator) {
                liveness.miss_report(storage, validator, request.request_time)?;
            }
        }

        set_request_last_expired(storage, id)?;
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::resolve_success;
    use crate::state::tests::new_request;
    use crate::state::{
        add_request, get_result, set_params, set_report, set_request_count, Params, Report,
        ResolveStatus,
    };
    use cosmwasm_std::testing::{mock_dependencies, mock_env};
    use cosmwasm_std::{Addr, Binary, MemoryStorage, Timestamp};

    #[derive(Default)]
    struct FakeLiveness {
        misses: Vec<(Addr, Timestamp)>,
    }

    impl LivenessTracker for FakeLiveness {
        fn miss_report(
            &mut self,
            _storage: &mut dyn Storage,
            validator: &Addr,
            request_time: Timestamp,
        ) -> Result<(), ContractError> {
            self.misses.push((validator.clone(), request_time));
            Ok(())
        }
    }

    fn block_at(height: u64) -> BlockInfo {
        let mut block = mock_env().block;
        block.height = height;
        block
    }

    fn setup(storage: &mut MemoryStorage, window: u64) {
        set_params(
            storage,
            &Params {
                expiration_block_count: window,
                ..Params::default()
            },
        )
        .unwrap();
    }

    #[test]
    fn test_expires_only_after_window() {
        let mut deps = mock_dependencies();
        setup(&mut deps.storage, 10);
        let validator = deps.api.addr_make("validator");
        let id = add_request(&mut deps.storage, new_request(vec![validator.clone()], 100)).unwrap();

        let mut liveness = FakeLiveness::default();
        for height in [100, 105, 110] {
            let events =
                process_expired_requests(&mut deps.storage, &block_at(height), &mut liveness)
                    .unwrap();
            assert!(events.is_empty());
            assert!(!has_result(&deps.storage, id));
        }
        assert_eq!(get_request_last_expired(&deps.storage).unwrap(), 0);
        assert!(liveness.misses.is_empty());

        let block = block_at(111);
        let events = process_expired_requests(&mut deps.storage, &block, &mut liveness).unwrap();
        assert_eq!(events.len(), 1);

        let result = get_result(&deps.storage, id).unwrap();
        assert_eq!(result.resolve_status, ResolveStatus::Expired);
        assert_eq!(result.result, None);
        assert_eq!(result.ans_count, 0);
        assert_eq!(result.resolve_time, block.time);
        assert_eq!(get_request_last_expired(&deps.storage).unwrap(), id);

        let request = must_get_request(&deps.storage, id).unwrap();
        assert_eq!(liveness.misses, vec![(validator, request.request_time)]);
    }

    #[test]
    fn test_stops_at_first_open_request() {
        let mut deps = mock_dependencies();
        setup(&mut deps.storage, 10);

        for height in [1, 2, 50, 51] {
            add_request(&mut deps.storage, new_request(vec![], height)).unwrap();
        }

        let mut liveness = FakeLiveness::default();
        let events =
            process_expired_requests(&mut deps.storage, &block_at(40), &mut liveness).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(get_request_last_expired(&deps.storage).unwrap(), 2);
        assert!(!has_result(&deps.storage, 3));
        assert!(!has_result(&deps.storage, 4));
    }

    #[test]
    fn test_resolved_requests_are_settled_not_expired() {
        let mut deps = mock_dependencies();
        setup(&mut deps.storage, 10);
        let v1 = deps.api.addr_make("validator1");
        let v2 = deps.api.addr_make("validator2");

        let id = add_request(&mut deps.storage, new_request(vec![v1.clone(), v2.clone()], 1))
            .unwrap();
        set_report(
            &mut deps.storage,
            id,
            &Report {
                validator: v1.clone(),
                in_before_resolve: true,
                raw_reports: vec![],
            },
        )
        .unwrap();
        let request = must_get_request(&deps.storage, id).unwrap();
        resolve_success(
            &mut deps.storage,
            &request,
            1,
            request.request_time,
            Binary::from(b"ok".to_vec()),
        )
        .unwrap();

        let mut liveness = FakeLiveness::default();
        let events =
            process_expired_requests(&mut deps.storage, &block_at(20), &mut liveness).unwrap();

        // no new result, but the silent validator is still penalized
        assert!(events.is_empty());
        assert_eq!(
            get_result(&deps.storage, id).unwrap().resolve_status,
            ResolveStatus::Success
        );
        assert_eq!(liveness.misses, vec![(v2, request.request_time)]);
        assert_eq!(get_request_last_expired(&deps.storage).unwrap(), id);
    }

    #[test]
    fn test_sweep_is_idempotent() {
        let mut deps = mock_dependencies();
        setup(&mut deps.storage, 10);
        for _ in 0..20 {
            add_request(&mut deps.storage, new_request(vec![], 1)).unwrap();
        }

        let mut liveness = FakeLiveness::default();
        let events =
            process_expired_requests(&mut deps.storage, &block_at(100), &mut liveness).unwrap();
        assert_eq!(events.len(), 20);
        assert_eq!(get_request_last_expired(&deps.storage).unwrap(), 20);

        let events =
            process_expired_requests(&mut deps.storage, &block_at(101), &mut liveness).unwrap();
        assert!(events.is_empty());
        assert_eq!(get_request_last_expired(&deps.storage).unwrap(), 20);
    }

    #[test]
    fn test_missing_request_is_fatal() {
        let mut deps = mock_dependencies();
        setup(&mut deps.storage, 10);
        add_request(&mut deps.storage, new_request(vec![], 1)).unwrap();
        // id 2 is allocated but never written
        set_request_count(&mut deps.storage, 2).unwrap();

        let mut liveness = FakeLiveness::default();
        let err = process_expired_requests(&mut deps.storage, &block_at(100), &mut liveness)
            .unwrap_err();
        assert!(err.is_fatal());
    }
}
