use cosmwasm_std::{Addr, Event, MessageInfo, Response, StdError, StdResult, Storage};
use cw_storage_plus::Item;

const ADMIN: Item<Addr> = Item::new("_admin");

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum AdminError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("Unauthorized: sender is not the admin")]
    Unauthorized,
}

/// Set the [ADMIN] of the contract, called once during `instantiate`.
/// No checks are done here.
pub fn set_admin(storage: &mut dyn Storage, admin: &Addr) -> Result<(), AdminError> {
    ADMIN.save(storage, admin)?;
    Ok(())
}

/// Get the admin of the contract.
/// If [set_admin] has not been called, it will return an [StdError::NotFound]
pub fn get_admin(storage: &dyn Storage) -> StdResult<Addr> {
    ADMIN.may_load(storage)?.ok_or(StdError::not_found("admin"))
}

/// Hand the admin role over to `new_admin`.
/// The admin manages oracle parameters, the validator registry and pruning.
pub fn transfer_admin(
    storage: &mut dyn Storage,
    info: MessageInfo,
    new_admin: Addr,
) -> Result<Response, AdminError> {
    assert_admin(storage, &info)?;

    let old_admin = ADMIN.load(storage)?;
    ADMIN.save(storage, &new_admin)?;
    Ok(Response::new().add_event(
        Event::new("transfer_admin")
            .add_attribute("old_admin", old_admin.as_str())
            .add_attribute("new_admin", new_admin.as_str()),
    ))
}

/// Asserts that the sender of the message is the admin of the contract
pub fn assert_admin(storage: &dyn Storage, info: &MessageInfo) -> Result<(), AdminError> {
    let admin = ADMIN.load(storage)?;
    if info.sender != admin {
        return Err(AdminError::Unauthorized);
    }
    Ok(())
}
