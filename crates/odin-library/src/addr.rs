use cosmwasm_std::{Addr, Api, StdError, StdResult};

/// Validate a list of addresses, rejecting duplicates.
/// Returns the validated addresses in input order.
pub fn validate_addrs(api: &dyn Api, addrs: &[String]) -> StdResult<Vec<Addr>> {
    let mut validated: Vec<Addr> = Vec::with_capacity(addrs.len());
    for addr in addrs {
        let addr = api.addr_validate(addr)?;
        if validated.contains(&addr) {
            return Err(StdError::generic_err(format!("Duplicate address: {addr}")));
        }
        validated.push(addr);
    }
    Ok(validated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::testing::mock_dependencies;

    #[test]
    fn test_validate_addrs() {
        let deps = mock_dependencies();
        let a = deps.api.addr_make("a");
        let b = deps.api.addr_make("b");

        let res = validate_addrs(&deps.api, &[a.to_string(), b.to_string()]).unwrap();
        assert_eq!(res, vec![a.clone(), b]);

        let err = validate_addrs(&deps.api, &[a.to_string(), a.to_string()]).unwrap_err();
        assert_eq!(
            err,
            StdError::generic_err(format!("Duplicate address: {a}"))
        );

        assert!(validate_addrs(&deps.api, &["not-an-address".to_string()]).is_err());
    }
}
