//! Route modules for the API server
//!
//! Each resource module follows the same structure:
//! - mod.rs: Module declaration and exports
//! - api.rs: JSON API endpoints

pub mod accounts;
pub mod records;
pub mod session;
pub mod system;
pub mod time;
