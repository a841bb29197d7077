pub mod period;
pub mod report;
