//! Field-level parsing for foodbooks records
//!
//! - account_code: price level / zone classification of ledger account codes
//! - dates: lenient ISO-like date parsing plus day bounds
//! - amounts: lenient money parsing and its serde adapter

pub mod account_code;
pub mod amounts;
pub mod dates;
pub mod error;

pub use account_code::{classify, classify_optional, AccountCodeDetails, Zone, KNOWN_ZONES, NOT_AVAILABLE};
pub use amounts::{lenient_amount, parse_amount};
pub use dates::{end_of_day, parse_date_param, parse_datetime, parse_optional, start_of_day};
pub use error::ParseError;
