pub mod eu;
pub mod report;

pub use eu::{classify, Bucket};
pub use report::VatReport;
