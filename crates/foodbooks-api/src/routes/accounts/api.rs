//! Accounts API endpoints

use crate::routes::records::{create_record, list_view, ListParams, ListResponse};
use crate::{ok, ApiResult, AppState};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use foodbooks_core::{ApiEnvelope, ClassifiedAccount, LedgerAccount, ResourceKind};
use foodbooks_parser::{classify, AccountCodeDetails, KNOWN_ZONES, NOT_AVAILABLE};
use serde_json::Value;
use std::collections::HashMap;

/// Classified accounts. Accounts carry no date, so date bounds and range
/// presets do not apply.
pub async fn api_accounts(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Json<ApiEnvelope<ListResponse<ClassifiedAccount>>>> {
    let query: HashMap<String, String> = query
        .into_iter()
        .filter(|(key, _)| !matches!(key.as_str(), "from" | "to" | "range"))
        .collect();
    let mut params = ListParams::from_query(&query, &state.config)?;
    params.filter.from = None;
    params.filter.to = None;
    params.range = "All Time".to_string();

    let response = list_view::<LedgerAccount>(&state, &params)?.map_records(ClassifiedAccount::from);
    Ok(ok(response))
}

pub async fn api_create_account(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<ApiEnvelope<Value>>)> {
    create_record(&state, ResourceKind::Accounts, body).await
}

/// Price level and zone of `?code=`; a missing code classifies as empty
pub async fn api_classify(Query(query): Query<HashMap<String, String>>) -> Json<ApiEnvelope<AccountCodeDetails>> {
    let code = query.get("code").map(String::as_str).unwrap_or_default();
    ok(classify(code))
}

/// Zone values offered by the zone filter
pub async fn api_account_zones() -> Json<ApiEnvelope<Vec<&'static str>>> {
    let mut zones = KNOWN_ZONES.to_vec();
    zones.push(NOT_AVAILABLE);
    ok(zones)
}
