//! In-memory `RemoteApi`, for tests and for running without a back end

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{CoreError, CoreResult};
use crate::remote::RemoteApi;
use crate::types::ResourceKind;

/// Stores raw JSON records per kind and behaves like the remote API
pub struct MemoryRemote {
    records: Mutex<BTreeMap<ResourceKind, Vec<Value>>>,
    next_id: AtomicU64,
    failure: Mutex<Option<String>>,
}

impl Default for MemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(BTreeMap::new()),
            next_id: AtomicU64::new(1000),
            failure: Mutex::new(None),
        }
    }

    pub fn with_records(self, kind: ResourceKind, records: Vec<Value>) -> Self {
        self.store().insert(kind, records);
        self
    }

    /// Make every following call fail with `success: false` and this message
    pub fn fail_with(&self, message: Option<&str>) {
        *self.failure.lock().unwrap_or_else(PoisonError::into_inner) = message.map(str::to_string);
    }

    /// Current raw records of a kind
    pub fn records(&self, kind: ResourceKind) -> Vec<Value> {
        self.store().get(&kind).cloned().unwrap_or_default()
    }

    fn store(&self) -> MutexGuard<'_, BTreeMap<ResourceKind, Vec<Value>>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_failure(&self) -> CoreResult<()> {
        match self.failure.lock().unwrap_or_else(PoisonError::into_inner).as_ref() {
            Some(message) => Err(CoreError::Remote {
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

fn id_of(record: &Value) -> Option<String> {
    match record.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn not_found(id: &str) -> CoreError {
    CoreError::Remote {
        message: format!("Record {} does not exist", id),
    }
}

#[async_trait]
impl RemoteApi for MemoryRemote {
    async fn list(&self, kind: ResourceKind) -> CoreResult<Vec<Value>> {
        self.check_failure()?;
        Ok(self.records(kind))
    }

    async fn get(&self, kind: ResourceKind, id: &str) -> CoreResult<Value> {
        self.check_failure()?;
        self.records(kind)
            .into_iter()
            .find(|r| id_of(r).as_deref() == Some(id))
            .ok_or_else(|| CoreError::RecordNotFound {
                kind,
                id: id.to_string(),
            })
    }

    async fn create(&self, kind: ResourceKind, mut body: Value) -> CoreResult<Option<Value>> {
        self.check_failure()?;
        let Some(object) = body.as_object_mut() else {
            return Err(CoreError::Remote {
                message: "Request body must be an object".to_string(),
            });
        };
        if !object.contains_key("id") {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            object.insert("id".to_string(), Value::from(id));
        }
        self.store().entry(kind).or_default().push(body.clone());
        Ok(Some(body))
    }

    async fn update(&self, kind: ResourceKind, id: &str, body: Value) -> CoreResult<Option<Value>> {
        self.check_failure()?;
        let mut store = self.store();
        let record = store
            .get_mut(&kind)
            .and_then(|records| records.iter_mut().find(|r| id_of(r).as_deref() == Some(id)))
            .ok_or_else(|| not_found(id))?;

        if let (Some(target), Value::Object(changes)) = (record.as_object_mut(), body) {
            for (key, value) in changes {
                if key != "id" {
                    target.insert(key, value);
                }
            }
        }
        Ok(Some(record.clone()))
    }

    async fn delete(&self, kind: ResourceKind, id: &str) -> CoreResult<()> {
        self.check_failure()?;
        let mut store = self.store();
        let records = store.get_mut(&kind).ok_or_else(|| not_found(id))?;
        let before = records.len();
        records.retain(|r| id_of(r).as_deref() != Some(id));
        if records.len() == before {
            return Err(not_found(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_assigns_id_and_lists() {
        let remote = MemoryRemote::new();
        let created = remote
            .create(ResourceKind::Products, json!({ "product_name": "Rusk" }))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(created["id"], 1000);

        let listed = remote.list(ResourceKind::Products).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(remote.list(ResourceKind::Sales).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_merges_and_keeps_id() {
        let remote = MemoryRemote::new()
            .with_records(ResourceKind::Sales, vec![json!({ "id": 5, "status": "Draft", "total_amount": 10 })]);
        let updated = remote
            .update(ResourceKind::Sales, "5", json!({ "id": 99, "status": "Paid" }))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated, json!({ "id": 5, "status": "Paid", "total_amount": 10 }));
    }

    #[tokio::test]
    async fn test_delete_missing_fails() {
        let remote = MemoryRemote::new().with_records(ResourceKind::Receipts, vec![json!({ "id": "R1" })]);
        assert!(remote.delete(ResourceKind::Receipts, "R2").await.is_err());
        remote.delete(ResourceKind::Receipts, "R1").await.unwrap();
        assert!(remote.records(ResourceKind::Receipts).is_empty());
    }

    #[tokio::test]
    async fn test_forced_failure() {
        let remote = MemoryRemote::new();
        remote.fail_with(Some("maintenance"));
        let err = remote.list(ResourceKind::Accounts).await.unwrap_err();
        assert_eq!(err.to_string(), "maintenance");
        remote.fail_with(None);
        assert!(remote.list(ResourceKind::Accounts).await.is_ok());
    }
}
