//! In-memory record collections mirrored from the remote API
//!
//! Each collection is replaced wholesale on refresh. Mutations go to the
//! remote first; the local copy only changes after the remote accepts them.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::aggregate::{FilteredView, Measurable};
use crate::error::{CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger};
use crate::filter::{Filterable, ListFilter};
use crate::models::{CreditNote, LedgerAccount, Product, PurchaseOrder, Receipt, Sale, UsageLog};
use crate::remote::RemoteRef;
use crate::types::ResourceKind;

/// Current contents of every collection
#[derive(Debug, Clone, Default)]
pub struct BooksData {
    pub accounts: Vec<LedgerAccount>,
    pub receipts: Vec<Receipt>,
    pub credit_notes: Vec<CreditNote>,
    pub sales: Vec<Sale>,
    pub purchase_orders: Vec<PurchaseOrder>,
    pub usage_logs: Vec<UsageLog>,
    pub products: Vec<Product>,
    pub refreshed_at: BTreeMap<ResourceKind, DateTime<Utc>>,
}

/// A record type held in `Books`
pub trait Resource:
    Filterable + Measurable + Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const KIND: ResourceKind;

    fn id(&self) -> &str;
    fn collection(data: &BooksData) -> &Vec<Self>;
    fn collection_mut(data: &mut BooksData) -> &mut Vec<Self>;
}

macro_rules! impl_resource {
    ($ty:ty, $kind:expr, $field:ident) => {
        impl Resource for $ty {
            const KIND: ResourceKind = $kind;

            fn id(&self) -> &str {
                &self.id
            }

            fn collection(data: &BooksData) -> &Vec<Self> {
                &data.$field
            }

            fn collection_mut(data: &mut BooksData) -> &mut Vec<Self> {
                &mut data.$field
            }
        }
    };
}

impl_resource!(LedgerAccount, ResourceKind::Accounts, accounts);
impl_resource!(Receipt, ResourceKind::Receipts, receipts);
impl_resource!(CreditNote, ResourceKind::CreditNotes, credit_notes);
impl_resource!(Sale, ResourceKind::Sales, sales);
impl_resource!(PurchaseOrder, ResourceKind::PurchaseOrders, purchase_orders);
impl_resource!(UsageLog, ResourceKind::UsageLogs, usage_logs);
impl_resource!(Product, ResourceKind::Products, products);

/// Outcome of refreshing several collections
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefreshReport {
    /// Records loaded per kind
    pub refreshed: BTreeMap<ResourceKind, usize>,
    /// Error message per kind that failed; its previous contents are kept
    pub failed: BTreeMap<ResourceKind, String>,
}

impl RefreshReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Size and freshness of one collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionStats {
    pub kind: ResourceKind,
    pub count: usize,
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// Record collections backed by a remote API
pub struct Books {
    remote: RemoteRef,
    data: RwLock<BooksData>,
    error_logger: DefaultErrorLogger,
}

impl Books {
    pub fn new(remote: RemoteRef) -> Self {
        Self {
            remote,
            data: RwLock::new(BooksData::default()),
            error_logger: DefaultErrorLogger,
        }
    }

    fn read(&self) -> CoreResult<RwLockReadGuard<'_, BooksData>> {
        self.data.read().map_err(|_| CoreError::InternalError {
            message: "books lock poisoned".to_string(),
        })
    }

    fn write(&self) -> CoreResult<RwLockWriteGuard<'_, BooksData>> {
        self.data.write().map_err(|_| CoreError::InternalError {
            message: "books lock poisoned".to_string(),
        })
    }

    // ==================== Refresh ====================

    /// Replace one collection with the remote's current records.
    /// Returns the number of records kept.
    pub async fn refresh<T: Resource>(&self) -> CoreResult<usize> {
        let raw = self.remote.list(T::KIND).await?;
        let total = raw.len();

        let mut records = Vec::with_capacity(total);
        for (index, value) in raw.into_iter().enumerate() {
            match serde_json::from_value::<T>(value) {
                Ok(record) => records.push(record),
                Err(e) => log::warn!("Skipping malformed {} at index {}: {}", T::KIND.label(), index, e),
            }
        }

        let kept = records.len();
        {
            let mut data = self.write()?;
            *T::collection_mut(&mut data) = records;
            data.refreshed_at.insert(T::KIND, Utc::now());
        }

        if kept < total {
            log::warn!("Loaded {} of {} {} records", kept, total, T::KIND);
        } else {
            log::info!("Loaded {} {} records", kept, T::KIND);
        }
        Ok(kept)
    }

    pub async fn refresh_kind(&self, kind: ResourceKind) -> CoreResult<usize> {
        match kind {
            ResourceKind::Accounts => self.refresh::<LedgerAccount>().await,
            ResourceKind::Receipts => self.refresh::<Receipt>().await,
            ResourceKind::CreditNotes => self.refresh::<CreditNote>().await,
            ResourceKind::Sales => self.refresh::<Sale>().await,
            ResourceKind::PurchaseOrders => self.refresh::<PurchaseOrder>().await,
            ResourceKind::UsageLogs => self.refresh::<UsageLog>().await,
            ResourceKind::Products => self.refresh::<Product>().await,
        }
    }

    /// Refresh every collection in turn. A failing kind keeps its previous
    /// contents and does not stop the others.
    pub async fn refresh_all(&self) -> RefreshReport {
        let mut report = RefreshReport::default();
        for kind in ResourceKind::ALL {
            match self.refresh_kind(kind).await {
                Ok(count) => {
                    report.refreshed.insert(kind, count);
                }
                Err(e) => {
                    let context = ErrorContext::new("refresh").with_data("kind", serde_json::json!(kind));
                    self.error_logger.log_error(&e, &context);
                    report.failed.insert(kind, e.to_string());
                }
            }
        }
        report
    }

    // ==================== Queries ====================

    /// Snapshot of a whole collection
    pub fn records<T: Resource>(&self) -> CoreResult<Vec<T>> {
        let data = self.read()?;
        Ok(T::collection(&data).clone())
    }

    /// Filtered, sorted and aggregated view of a collection
    pub fn view<T: Resource>(&self, filter: &ListFilter, breakdown: Option<&str>) -> CoreResult<FilteredView<T>> {
        let data = self.read()?;
        Ok(FilteredView::build(T::collection(&data), filter, breakdown))
    }

    /// Local lookup only
    pub fn find<T: Resource>(&self, id: &str) -> CoreResult<Option<T>> {
        let data = self.read()?;
        Ok(T::collection(&data).iter().find(|r| r.id() == id).cloned())
    }

    /// Local lookup, falling back to the remote for records not loaded yet
    pub async fn get<T: Resource>(&self, id: &str) -> CoreResult<T> {
        if let Some(record) = self.find::<T>(id)? {
            return Ok(record);
        }
        let value = self.remote.get(T::KIND, id).await?;
        Ok(serde_json::from_value(value)?)
    }

    // ==================== Mutations ====================

    /// Create a record on the remote, then reload that collection
    pub async fn create(&self, kind: ResourceKind, body: Value) -> CoreResult<Option<Value>> {
        require_object(&body)?;
        let created = self.remote.create(kind, body).await?;
        log::info!("Created {}", kind.label());
        self.refresh_after_mutation(kind, "create").await;
        Ok(created)
    }

    /// Update a record on the remote, then reload that collection
    pub async fn update(&self, kind: ResourceKind, id: &str, body: Value) -> CoreResult<Option<Value>> {
        require_object(&body)?;
        let updated = self.remote.update(kind, id, body).await?;
        log::info!("Updated {} {}", kind.label(), id);
        self.refresh_after_mutation(kind, "update").await;
        Ok(updated)
    }

    /// Delete on the remote; remove locally only once the remote succeeded
    pub async fn delete<T: Resource>(&self, id: &str) -> CoreResult<()> {
        self.remote.delete(T::KIND, id).await?;

        let mut data = self.write()?;
        T::collection_mut(&mut data).retain(|r| r.id() != id);
        log::info!("Deleted {} {}", T::KIND.label(), id);
        Ok(())
    }

    pub async fn delete_kind(&self, kind: ResourceKind, id: &str) -> CoreResult<()> {
        match kind {
            ResourceKind::Accounts => self.delete::<LedgerAccount>(id).await,
            ResourceKind::Receipts => self.delete::<Receipt>(id).await,
            ResourceKind::CreditNotes => self.delete::<CreditNote>(id).await,
            ResourceKind::Sales => self.delete::<Sale>(id).await,
            ResourceKind::PurchaseOrders => self.delete::<PurchaseOrder>(id).await,
            ResourceKind::UsageLogs => self.delete::<UsageLog>(id).await,
            ResourceKind::Products => self.delete::<Product>(id).await,
        }
    }

    /// The mutation already succeeded remotely; a failed reload only leaves
    /// the local copy stale.
    async fn refresh_after_mutation(&self, kind: ResourceKind, operation: &str) {
        if let Err(e) = self.refresh_kind(kind).await {
            let context = ErrorContext::new(operation).with_data("kind", serde_json::json!(kind));
            self.error_logger
                .log_warning(&format!("reload after {} failed: {}", operation, e), &context);
        }
    }

    // ==================== Stats ====================

    pub fn stats(&self) -> CoreResult<Vec<CollectionStats>> {
        let data = self.read()?;
        let counts = [
            data.accounts.len(),
            data.receipts.len(),
            data.credit_notes.len(),
            data.sales.len(),
            data.purchase_orders.len(),
            data.usage_logs.len(),
            data.products.len(),
        ];
        Ok(ResourceKind::ALL
            .iter()
            .zip(counts)
            .map(|(kind, count)| CollectionStats {
                kind: *kind,
                count,
                refreshed_at: data.refreshed_at.get(kind).copied(),
            })
            .collect())
    }
}

fn require_object(body: &Value) -> CoreResult<()> {
    if body.is_object() {
        Ok(())
    } else {
        Err(CoreError::ValidationError {
            message: "request body must be a JSON object".to_string(),
        })
    }
}
