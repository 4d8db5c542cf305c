pub mod testing;

/// Single-admin gate for privileged oracle operations.
/// - `transfer_admin` only allows the current admin to hand the role over.
/// - `assert_admin` checks if the current message sender is the admin.
pub mod admin;

pub mod addr;
pub mod time;
