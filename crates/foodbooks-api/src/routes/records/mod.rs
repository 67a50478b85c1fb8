//! Record routes - list, detail and mutations for every resource kind
//!
//! Lists accept `q`, `from`, `to`, `range`, `breakdown`, `limit` and
//! `offset`; any other query key is a categorical filter.

pub mod api;

pub use api::{
    api_create, api_delete, api_detail, api_list, api_refresh_kind, api_update, create_record, list_view, ListParams,
    ListResponse,
};
