//! Turns a scanner's station listing into access points and the devices seen under them.

mod error;
mod extract;
mod types;

pub use error::ScanError;
pub use extract::{extract, extract_with_report};
pub use types::{AccessPoint, Device, ExtractReport, SkipReason, Topology};
