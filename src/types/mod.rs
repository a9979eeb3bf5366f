pub mod station;
pub mod units;
pub mod weather;
