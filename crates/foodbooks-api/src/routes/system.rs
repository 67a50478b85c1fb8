//! Health, stats and refresh routes

use crate::{ok, ApiResult, AppState};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use foodbooks_core::{ApiEnvelope, CollectionStats, RefreshReport};

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}

/// Per-collection record counts and refresh times
pub async fn api_stats(State(state): State<AppState>) -> ApiResult<Json<ApiEnvelope<Vec<CollectionStats>>>> {
    Ok(ok(state.books.stats()?))
}

/// Reload every collection from the remote. Partial failures answer 502
/// with the report; collections that failed keep their previous records.
pub async fn api_refresh_all(State(state): State<AppState>) -> (StatusCode, Json<ApiEnvelope<RefreshReport>>) {
    let report = state.books.refresh_all().await;
    if report.is_complete() {
        let message = format!("Refreshed {} collections", report.refreshed.len());
        (StatusCode::OK, Json(ApiEnvelope::ok_with_message(report, message)))
    } else {
        let message = format!("{} collections failed to refresh", report.failed.len());
        let envelope = ApiEnvelope {
            success: false,
            data: Some(report),
            message: Some(message),
        };
        (StatusCode::BAD_GATEWAY, Json(envelope))
    }
}
