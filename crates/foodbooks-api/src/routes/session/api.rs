//! Session API endpoints

use crate::{ok, ApiResult, AppState};
use axum::extract::State;
use axum::Json;
use foodbooks_core::{ApiEnvelope, Session};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub user_id: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Current session, `null` when signed out
pub async fn api_session(State(state): State<AppState>) -> Json<ApiEnvelope<Option<Session>>> {
    ok(state.session.current())
}

pub async fn api_login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<ApiEnvelope<Session>>> {
    let session = state
        .session
        .login(&request.user_id, request.role.as_deref().unwrap_or_default())?;
    Ok(Json(ApiEnvelope::ok_with_message(
        session,
        format!("Signed in as {}", request.user_id.trim()),
    )))
}

pub async fn api_logout(State(state): State<AppState>) -> ApiResult<Json<ApiEnvelope<Option<Session>>>> {
    let ended = state.session.logout()?;
    Ok(Json(ApiEnvelope::ok_with_message(ended, "Signed out")))
}

#[cfg(test)]
mod tests {
    use crate::test_support::TestApp;
    use axum::http::StatusCode;
    use foodbooks_core::MemoryRemote;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_session_lifecycle() {
        let app = TestApp::new(MemoryRemote::new()).await;

        let (_, body) = app.get("/api/session").await;
        assert_eq!(body["data"], Value::Null);

        let (status, body) = app
            .send("POST", "/api/session", Some(json!({ "user_id": "accounts-1", "role": "accountant" })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["user_id"], "accounts-1");
        assert_eq!(body["data"]["role"], "accountant");

        let (_, body) = app.get("/api/session").await;
        assert_eq!(body["data"]["user_id"], "accounts-1");

        let (status, _) = app.send("DELETE", "/api/session", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(app.state.session.current().is_none());
    }

    #[tokio::test]
    async fn test_blank_user_rejected() {
        let app = TestApp::new(MemoryRemote::new()).await;
        let (status, body) = app.send("POST", "/api/session", Some(json!({ "user_id": "  " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}
