//! Session routes - sign in, sign out and current user

pub mod api;

pub use api::{api_login, api_logout, api_session, LoginRequest};
