//! Time range routes
//!
//! Resolves a preset to the dates list requests would filter on

use crate::{ok, ApiError, ApiResult, AppState};
use axum::extract::{Query, State};
use axum::Json;
use foodbooks_config::TimeRange;
use foodbooks_core::{ApiEnvelope, TimeContext};
use serde_json::{json, Value};
use std::collections::HashMap;

/// `?range=` (defaults to the configured preset), answering its bounds
pub async fn api_time_range(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Json<ApiEnvelope<Value>>> {
    let range = match query.get("range").map(|r| r.trim()).filter(|r| !r.is_empty()) {
        Some(r) => r.parse::<TimeRange>().map_err(ApiError::bad_request)?,
        None => state.config.time_range.default_range,
    };
    let context = TimeContext::new(range, state.config.time_range.fiscal_year_start);
    let (from, to) = context.bounds();

    Ok(ok(json!({
        "range": range.to_string(),
        "description": context.description(),
        "from": from.map(|d| d.to_string()),
        "to": to.map(|d| d.to_string()),
        "fiscal_year_start": context.fiscal_year_start,
        "options": ["month", "quarter", "year", "all", "custom"],
    })))
}
