//! Data access for table records.
//!
//! Handlers and the table pipeline read rows through [`RecordRepository`]
//! instead of module-level collections. [`InMemoryRepository`] is the only
//! backend; it keeps insertion order so listings are stable.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::Serialize;
use uuid::Uuid;

use crate::audit::{DeskAuditEvent, DeskAuditLogger};
use crate::error::{DeskError, Result};
use crate::records::{Invoice, Patch, Payment, Record, Subscriber, SubscriberRef};

/// In-place change applied by [`RecordRepository::modify`].
pub type Mutation<'a, R> = Box<dyn FnOnce(&mut R) -> Result<()> + Send + 'a>;

/// Storage for one record type.
#[async_trait]
pub trait RecordRepository<R: Record>: Send + Sync {
    /// Every record, in insertion order.
    async fn list(&self) -> Result<Vec<R>>;

    async fn get(&self, id: Uuid) -> Result<Option<R>>;

    /// Insert a new record. Fails with `Conflict` if the id exists.
    async fn insert(&self, record: R) -> Result<()>;

    /// Replace an existing record. Fails with `NotFound` if the id is unknown.
    async fn update(&self, record: R) -> Result<()>;

    /// Remove a record. Returns whether it existed.
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Read, change and store one record as a single step.
    ///
    /// Concurrent calls on the same id never lose each other's changes. If the
    /// mutation fails the stored record is left as it was.
    async fn modify<'a>(&self, id: Uuid, mutation: Mutation<'a, R>) -> Result<R>;
}

/// In-memory repository.
///
/// Cloning is cheap and clones share the same records.
#[derive(Debug)]
pub struct InMemoryRepository<R> {
    inner: Arc<RwLock<IndexMap<Uuid, R>>>,
}

impl<R> Clone for InMemoryRepository<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R> Default for InMemoryRepository<R> {
    fn default() -> Self {
        Self {
            inner: Arc::new(RwLock::new(IndexMap::new())),
        }
    }
}

impl<R: Record> InMemoryRepository<R> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pre-filled with `records`. Later duplicates replace earlier ones.
    pub fn seeded(records: impl IntoIterator<Item = R>) -> Self {
        let map = records.into_iter().map(|r| (r.id(), r)).collect();
        Self {
            inner: Arc::new(RwLock::new(map)),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl<R: Record> RecordRepository<R> for InMemoryRepository<R> {
    async fn list(&self) -> Result<Vec<R>> {
        Ok(self.inner.read()?.values().cloned().collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<R>> {
        Ok(self.inner.read()?.get(&id).cloned())
    }

    async fn insert(&self, record: R) -> Result<()> {
        let mut records = self.inner.write()?;
        let id = record.id();
        if records.contains_key(&id) {
            return Err(DeskError::conflict(format!("{} {} already exists", R::ENTITY, id)));
        }
        records.insert(id, record);
        Ok(())
    }

    async fn update(&self, record: R) -> Result<()> {
        let mut records = self.inner.write()?;
        match records.get_mut(&record.id()) {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(DeskError::not_found(format!("{} {}", R::ENTITY, record.id()))),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.inner.write()?.shift_remove(&id).is_some())
    }

    async fn modify<'a>(&self, id: Uuid, mutation: Mutation<'a, R>) -> Result<R> {
        let mut records = self.inner.write()?;
        let slot = records
            .get_mut(&id)
            .ok_or_else(|| DeskError::not_found(format!("{} {}", R::ENTITY, id)))?;
        let mut updated = slot.clone();
        mutation(&mut updated)?;
        *slot = updated.clone();
        Ok(updated)
    }
}

/// Names of the fields a patch sets.
fn patched_fields<P: Serialize>(patch: &P) -> Vec<String> {
    match serde_json::to_value(patch) {
        Ok(serde_json::Value::Object(fields)) => fields
            .into_iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, _)| k)
            .collect(),
        _ => Vec::new(),
    }
}

/// Apply an inline edit: validate and patch atomically, then audit.
///
/// Returns the updated record. A rejected patch leaves the stored record untouched.
pub async fn edit_record<R, P>(
    repo: &dyn RecordRepository<R>,
    audit: &dyn DeskAuditLogger,
    id: Uuid,
    patch: P,
) -> Result<R>
where
    R: Record,
    P: Patch<R> + Serialize + Send,
{
    let fields = patched_fields(&patch);
    let record = repo
        .modify(id, Box::new(move |record: &mut R| patch.apply_to(record)))
        .await?;

    tracing::debug!(
        target: "ledgerdesk::repository",
        entity = R::ENTITY,
        record_id = %id,
        "record updated"
    );
    audit
        .log(DeskAuditEvent::RecordEdited {
            entity: R::ENTITY,
            record_id: id.to_string(),
            fields,
        })
        .await;

    Ok(record)
}

/// Copy a subscriber's current name and email into their invoices and payments.
///
/// Invoices and payments carry a [`SubscriberRef`] so the tables can search
/// and export them without a join. Returns how many records were rewritten.
pub async fn sync_subscriber_refs(
    invoices: &dyn RecordRepository<Invoice>,
    payments: &dyn RecordRepository<Payment>,
    subscriber: &Subscriber,
) -> Result<usize> {
    let current = SubscriberRef::from(subscriber);
    let mut rewritten = 0;

    for invoice in invoices.list().await? {
        if invoice.subscriber.id == current.id && invoice.subscriber != current {
            let reference = current.clone();
            invoices
                .modify(
                    invoice.id,
                    Box::new(move |invoice: &mut Invoice| {
                        invoice.subscriber = reference;
                        Ok(())
                    }),
                )
                .await?;
            rewritten += 1;
        }
    }
    for payment in payments.list().await? {
        if payment.subscriber.id == current.id && payment.subscriber != current {
            let reference = current.clone();
            payments
                .modify(
                    payment.id,
                    Box::new(move |payment: &mut Payment| {
                        payment.subscriber = reference;
                        Ok(())
                    }),
                )
                .await?;
            rewritten += 1;
        }
    }

    if rewritten > 0 {
        tracing::debug!(
            target: "ledgerdesk::repository",
            subscriber_id = %current.id,
            rewritten,
            "subscriber references updated"
        );
    }
    Ok(rewritten)
}
