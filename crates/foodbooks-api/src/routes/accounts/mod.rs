//! Account routes - ledger accounts with their decoded price level and zone
//!
//! Features:
//! - Account list filterable by zone, price level and account type
//! - Account code classifier for codes typed into forms
//!
//! Structure:
//! - api.rs: JSON API endpoints

pub mod api;

pub use api::{api_account_zones, api_accounts, api_classify, api_create_account};
