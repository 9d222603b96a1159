//! Per-file image validation.
//!
//! Every file in the capture folder is classified exactly once into
//! a [`ValidationRecord`]. Classification failures are recorded as
//! [`FailureReason`]s and never abort a scan.

mod listing;
mod record;
mod validator;

pub use listing::list_files;
pub use record::{FailureReason, Reasons, ValidationRecord};
pub use validator::{ScanError, Validator, ValidatorConfig};
