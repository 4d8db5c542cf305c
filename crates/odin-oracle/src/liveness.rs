use crate::error::ContractError;
use crate::state::{get_validator_status, set_validator_status, ValidatorStatus};
use cosmwasm_std::{Addr, Event, Storage, Timestamp};

/// Validator liveness accounting, invoked by the expiration sweep
/// for every requested validator that did not report in time.
pub trait LivenessTracker {
    /// Records that `validator` missed the report of a request made at `request_time`.
    /// May be called repeatedly for the same validator across blocks.
    fn miss_report(
        &mut self,
        storage: &mut dyn Storage,
        validator: &Addr,
        request_time: Timestamp,
    ) -> Result<(), ContractError>;
}

/// Storage-backed tracker: a miss deactivates the validator until it calls `Activate`.
pub struct ValidatorLiveness {
    block_time: Timestamp,
    events: Vec<Event>,
}

impl ValidatorLiveness {
    pub fn new(block_time: Timestamp) -> Self {
        Self {
            block_time,
            events: vec![],
        }
    }

    /// `deactivate` events emitted so far.
    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

impl LivenessTracker for ValidatorLiveness {
    fn miss_report(
        &mut self,
        storage: &mut dyn Storage,
        validator: &Addr,
        request_time: Timestamp,
    ) -> Result<(), ContractError> {
        let status = match get_validator_status(storage, validator) {
            Ok(status) => status,
            // validators removed from the registry have nothing left to penalize
            Err(ContractError::ValidatorNotFound {}) => return Ok(()),
            Err(err) => return Err(err),
        };

        // Already inactive, or re-activated after the request was made.
        if !status.is_active || status.since >= request_time {
            return Ok(());
        }

        set_validator_status(
            storage,
            validator,
            &ValidatorStatus {
                is_active: false,
                since: self.block_time,
            },
        )?;
        self.events
            .push(Event::new("deactivate").add_attribute("validator", validator.as_str()));
        Ok(())
    }
}

/// Re-activates a deactivated validator once `penalty_duration` seconds have passed.
pub fn activate(
    storage: &mut dyn Storage,
    validator: &Addr,
    block_time: Timestamp,
    penalty_duration: u64,
) -> Result<(), ContractError> {
    let status = get_validator_status(storage, validator)?;
    if status.is_active {
        return Err(ContractError::AlreadyActive {});
    }
    if status.since.plus_seconds(penalty_duration) > block_time {
        return Err(ContractError::TooSoonToActivate {});
    }

    set_validator_status(
        storage,
        validator,
        &ValidatorStatus {
            is_active: true,
            since: block_time,
        },
    )?;
    Ok(())
}
