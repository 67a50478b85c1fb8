//! Record API endpoints shared by every resource kind

use crate::{ok, ApiError, ApiResult, AppState};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Local, NaiveDate};
use foodbooks_config::{Config, TimeRange};
use foodbooks_core::{
    ApiEnvelope, CreditNote, LedgerAccount, ListFilter, Product, PurchaseOrder, Receipt, Resource, ResourceKind, Sale,
    Summary, TimeContext, UsageLog,
};
use foodbooks_parser::parse_date_param;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};

/// Query keys with a fixed meaning; everything else filters a category
const RESERVED_KEYS: [&str; 7] = ["q", "from", "to", "range", "breakdown", "limit", "offset"];

/// Run `$body` with `$T` bound to the record type of `$kind`
macro_rules! with_resource {
    ($kind:expr, $T:ident => $body:expr) => {
        match $kind {
            ResourceKind::Accounts => {
                type $T = LedgerAccount;
                $body
            }
            ResourceKind::Receipts => {
                type $T = Receipt;
                $body
            }
            ResourceKind::CreditNotes => {
                type $T = CreditNote;
                $body
            }
            ResourceKind::Sales => {
                type $T = Sale;
                $body
            }
            ResourceKind::PurchaseOrders => {
                type $T = PurchaseOrder;
                $body
            }
            ResourceKind::UsageLogs => {
                type $T = UsageLog;
                $body
            }
            ResourceKind::Products => {
                type $T = Product;
                $body
            }
        }
    };
}

/// Parsed list query
#[derive(Debug, Clone, PartialEq)]
pub struct ListParams {
    pub filter: ListFilter,
    pub breakdown: Option<String>,
    pub offset: usize,
    pub limit: usize,
    /// Human-readable description of the date range in effect
    pub range: String,
}

impl ListParams {
    pub fn from_query(query: &HashMap<String, String>, config: &Config) -> ApiResult<Self> {
        Self::from_query_on(query, config, Local::now().date_naive())
    }

    /// Parse relative to a given current day
    pub fn from_query_on(query: &HashMap<String, String>, config: &Config, today: NaiveDate) -> ApiResult<Self> {
        let value = |key: &str| query.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        let mut filter = ListFilter::new();
        if let Some(q) = query.get("q").filter(|q| !q.is_empty()) {
            filter = filter.with_search(q.as_str());
        }
        if let Some(from) = value("from") {
            filter = filter.with_from(parse_date_param(from)?);
        }
        if let Some(to) = value("to") {
            filter = filter.with_to(parse_date_param(to)?);
        }
        for (key, v) in query {
            if !RESERVED_KEYS.contains(&key.as_str()) {
                filter = filter.with_category(key.as_str(), v.as_str());
            }
        }

        let range = match value("range") {
            Some(r) => r.parse::<TimeRange>().map_err(ApiError::bad_request)?,
            None if filter.has_date_bounds() => TimeRange::Custom,
            None => config.time_range.default_range,
        };
        let context = match range {
            TimeRange::Custom => TimeContext::custom(filter.from, filter.to),
            preset => TimeContext::new(preset, config.time_range.fiscal_year_start),
        };
        let filter = context.apply_to_on(filter, today);

        let offset = parse_count(value("offset"), "offset")?.unwrap_or(0);
        let limit = parse_count(value("limit"), "limit")?.unwrap_or(config.pagination.records_per_page);

        Ok(Self {
            filter,
            breakdown: value("breakdown").map(str::to_string),
            offset,
            limit,
            range: context.description(),
        })
    }
}

fn parse_count(raw: Option<&str>, name: &str) -> ApiResult<Option<usize>> {
    raw.map(|s| {
        s.parse::<usize>()
            .map_err(|_| ApiError::bad_request(format!("{} must be a non-negative integer, got '{}'", name, s)))
    })
    .transpose()
}

/// Totals formatted for display
#[derive(Debug, Clone, Serialize)]
pub struct DisplayTotals {
    pub total: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extras: BTreeMap<String, String>,
}

impl DisplayTotals {
    fn new(kind: ResourceKind, summary: &Summary, state: &AppState) -> Self {
        // Usage logs sum quantities, not money
        let format = |value: Decimal| match kind {
            ResourceKind::UsageLogs => value.normalize().to_string(),
            _ => state.format_money(value),
        };
        Self {
            total: format(summary.total),
            extras: summary.extras.iter().map(|(k, v)| (k.clone(), format(*v))).collect(),
        }
    }
}

/// One page of a filtered list plus aggregates over the whole view
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse<T> {
    pub records: Vec<T>,
    pub summary: Summary,
    pub display: DisplayTotals,
    pub range: String,
    pub offset: usize,
    pub limit: usize,
}

impl<T> ListResponse<T> {
    pub fn map_records<U>(self, f: impl FnMut(T) -> U) -> ListResponse<U> {
        ListResponse {
            records: self.records.into_iter().map(f).collect(),
            summary: self.summary,
            display: self.display,
            range: self.range,
            offset: self.offset,
            limit: self.limit,
        }
    }
}

/// Filtered, paginated view of one collection
pub fn list_view<T: Resource>(state: &AppState, params: &ListParams) -> ApiResult<ListResponse<T>> {
    let view = state
        .books
        .view::<T>(&params.filter, params.breakdown.as_deref())?
        .paginate(params.offset, params.limit);
    let display = DisplayTotals::new(T::KIND, &view.summary, state);

    Ok(ListResponse {
        records: view.records,
        summary: view.summary,
        display,
        range: params.range.clone(),
        offset: params.offset,
        limit: params.limit,
    })
}

pub fn parse_kind(raw: &str) -> ApiResult<ResourceKind> {
    raw.parse().map_err(|_| ApiError::NotFound {
        resource: format!("/api/{}", raw),
    })
}

pub async fn api_list(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Json<ApiEnvelope<Value>>> {
    let kind = parse_kind(&kind)?;
    let params = ListParams::from_query(&query, &state.config)?;
    let data = with_resource!(kind, R => serde_json::to_value(list_view::<R>(&state, &params)?)?);
    Ok(ok(data))
}

pub async fn api_detail(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> ApiResult<Json<ApiEnvelope<Value>>> {
    let kind = parse_kind(&kind)?;
    let data = with_resource!(kind, R => serde_json::to_value(state.books.get::<R>(&id).await?)?);
    Ok(ok(data))
}

/// Create a record of `kind`; requires a session
pub async fn create_record(
    state: &AppState,
    kind: ResourceKind,
    body: Value,
) -> ApiResult<(StatusCode, Json<ApiEnvelope<Value>>)> {
    let session = state.session.require()?;
    let created = state.books.create(kind, body).await?;
    log::info!("{} created a {}", session.user_id, kind.label());

    let envelope = ApiEnvelope {
        success: true,
        data: created,
        message: Some(format!("Created {}", kind.label())),
    };
    Ok((StatusCode::CREATED, Json(envelope)))
}

pub async fn api_create(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<ApiEnvelope<Value>>)> {
    let kind = parse_kind(&kind)?;
    create_record(&state, kind, body).await
}

pub async fn api_update(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> ApiResult<Json<ApiEnvelope<Value>>> {
    let kind = parse_kind(&kind)?;
    let session = state.session.require()?;
    let updated = state.books.update(kind, &id, body).await?;
    log::info!("{} updated {} {}", session.user_id, kind.label(), id);

    Ok(Json(ApiEnvelope {
        success: true,
        data: updated,
        message: Some(format!("Updated {} {}", kind.label(), id)),
    }))
}

pub async fn api_delete(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> ApiResult<Json<ApiEnvelope<Value>>> {
    let kind = parse_kind(&kind)?;
    let session = state.session.require()?;
    state.books.delete_kind(kind, &id).await?;
    log::info!("{} deleted {} {}", session.user_id, kind.label(), id);

    Ok(Json(ApiEnvelope::ok_with_message(
        json!({ "kind": kind, "id": id }),
        format!("Deleted {} {}", kind.label(), id),
    )))
}

pub async fn api_refresh_kind(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> ApiResult<Json<ApiEnvelope<Value>>> {
    let kind = parse_kind(&kind)?;
    let count = state.books.refresh_kind(kind).await?;
    Ok(ok(json!({ "kind": kind, "count": count })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestApp;
    use foodbooks_core::MemoryRemote;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn remote() -> MemoryRemote {
        MemoryRemote::new()
            .with_records(
                ResourceKind::Receipts,
                vec![
                    json!({ "id": 1, "receipt_number": "RC-1", "receipt_date": "2024-01-10", "account_name": "Sharma Stores", "amount": 500, "payment_method": "Cash" }),
                    json!({ "id": 2, "receipt_number": "RC-2", "receipt_date": "2024-02-05", "account_name": "Gupta Traders", "amount": "1,200.50", "payment_method": "NEFT" }),
                    json!({ "id": 3, "receipt_number": "RC-3", "receipt_date": "2024-02-20", "account_name": "Sharma Stores", "amount": 300, "payment_method": "cash" }),
                ],
            )
            .with_records(
                ResourceKind::UsageLogs,
                vec![
                    json!({ "id": 1, "material_id": 5, "material_name": "Maida", "usage_date": "2024-03-02", "quantity": 25, "department": "Bakery" }),
                    json!({ "id": 2, "material_id": 6, "material_name": "Sugar", "usage_date": "2024-03-03", "quantity": "10.5", "department": "Sweets" }),
                ],
            )
    }

    #[test]
    fn test_params_split_reserved_and_categories() {
        let config = Config::default();
        let params = ListParams::from_query_on(
            &query(&[("q", "sharma"), ("from", "2024-02-01"), ("to", "2024-02-28"), ("payment_method", "Cash"), ("limit", "10")]),
            &config,
            ymd(2024, 6, 1),
        )
        .unwrap();

        assert_eq!(params.filter.search.as_deref(), Some("sharma"));
        assert_eq!(params.filter.from, Some(ymd(2024, 2, 1)));
        assert_eq!(params.filter.to, Some(ymd(2024, 2, 28)));
        assert_eq!(params.filter.categories.get("payment_method").map(String::as_str), Some("Cash"));
        assert_eq!(params.limit, 10);
        assert_eq!(params.offset, 0);
        assert_eq!(params.range, "2024-02-01 to 2024-02-28");
    }

    #[test]
    fn test_params_range_preset() {
        let config = Config::default();
        let params = ListParams::from_query_on(&query(&[("range", "month")]), &config, ymd(2024, 2, 14)).unwrap();
        assert_eq!(params.filter.from, Some(ymd(2024, 2, 1)));
        assert_eq!(params.filter.to, Some(ymd(2024, 2, 29)));
        assert_eq!(params.limit, config.pagination.records_per_page);
    }

    #[test]
    fn test_params_reject_bad_input() {
        let config = Config::default();
        let today = ymd(2024, 1, 1);
        assert!(ListParams::from_query_on(&query(&[("from", "01/02/2024")]), &config, today).is_err());
        assert!(ListParams::from_query_on(&query(&[("range", "decade")]), &config, today).is_err());
        assert!(ListParams::from_query_on(&query(&[("limit", "-1")]), &config, today).is_err());
    }

    #[tokio::test]
    async fn test_list_filters_and_totals() {
        let app = TestApp::new(remote()).await;
        let (status, body) = app
            .get("/api/receipts?from=2024-02-01&to=2024-02-28&breakdown=payment_method")
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let data = &body["data"];
        assert_eq!(data["records"].as_array().unwrap().len(), 2);
        assert_eq!(data["records"][0]["id"], "3");
        assert_eq!(data["summary"]["count"], 2);
        assert_eq!(data["summary"]["source_count"], 3);
        assert_eq!(data["display"]["total"], "Rs. 1,500.50");
        assert_eq!(data["display"]["extras"]["cash"], "Rs. 300.00");
        assert_eq!(data["summary"]["breakdown"]["Bank"]["count"], 1);
    }

    #[tokio::test]
    async fn test_list_categorical_and_sentinel() {
        let app = TestApp::new(remote()).await;
        let (_, body) = app.get("/api/usage-logs?department=Sweets").await;
        assert_eq!(body["data"]["summary"]["count"], 1);
        assert_eq!(body["data"]["display"]["total"], "10.5");

        let (_, body) = app.get("/api/usage-logs?department=All&material_id=All").await;
        assert_eq!(body["data"]["summary"]["count"], 2);
    }

    #[tokio::test]
    async fn test_pagination_keeps_summary() {
        let app = TestApp::new(remote()).await;
        let (_, body) = app.get("/api/receipts?limit=1&offset=1").await;
        assert_eq!(body["data"]["records"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"]["records"][0]["id"], "2");
        assert_eq!(body["data"]["summary"]["count"], 3);
    }

    #[tokio::test]
    async fn test_unknown_kind_and_bad_date() {
        let app = TestApp::new(remote()).await;
        let (status, _) = app.get("/api/invoices").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = app.get("/api/receipts?from=yesterday").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_detail() {
        let app = TestApp::new(remote()).await;
        let (status, body) = app.get("/api/receipts/2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["receipt_number"], "RC-2");

        let (status, body) = app.get("/api/receipts/99").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "RECORD_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_mutations_require_session() {
        let app = TestApp::new(remote()).await;
        let (status, body) = app.send("DELETE", "/api/receipts/1", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
        assert_eq!(app.remote.records(ResourceKind::Receipts).len(), 3);
    }

    #[tokio::test]
    async fn test_create_update_delete() {
        let app = TestApp::new(remote()).await;
        app.state.session.login("clerk-1", "clerk").unwrap();

        let (status, body) = app
            .send(
                "POST",
                "/api/receipts",
                Some(json!({ "receipt_number": "RC-4", "receipt_date": "2024-03-01", "amount": 75, "payment_method": "UPI" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["data"]["id"].to_string();

        let (_, body) = app.get("/api/receipts").await;
        assert_eq!(body["data"]["summary"]["count"], 4);

        let (status, _) = app
            .send("PUT", &format!("/api/receipts/{}", id), Some(json!({ "amount": 80 })))
            .await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = app.get(&format!("/api/receipts/{}", id)).await;
        assert_eq!(body["data"]["amount"], "80");

        let (status, _) = app.send("DELETE", &format!("/api/receipts/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = app.get("/api/receipts").await;
        assert_eq!(body["data"]["summary"]["count"], 3);
    }

    #[tokio::test]
    async fn test_failed_delete_surfaces_remote_message() {
        let app = TestApp::new(remote()).await;
        app.state.session.login("clerk-1", "clerk").unwrap();
        app.remote.fail_with(Some("Receipt is locked for audit"));

        let (status, body) = app.send("DELETE", "/api/receipts/1", None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["message"], "Receipt is locked for audit");

        app.remote.fail_with(None);
        let (_, body) = app.get("/api/receipts").await;
        assert_eq!(body["data"]["summary"]["count"], 3);
    }

    #[tokio::test]
    async fn test_refresh_kind() {
        let app = TestApp::new(MemoryRemote::new()).await;
        let (status, body) = app.send("POST", "/api/products/refresh", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!({ "kind": "products", "count": 0 }));
    }
}
