// helper constants for time represented in seconds
pub const SECOND: u64 = 1;
pub const MINUTES: u64 = 60 * SECOND;
