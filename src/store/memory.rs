use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::models::account::{Account, NewAccount};
use crate::models::{ContentRecord, Donation, Event, NewsItem, Resource};
use super::{AccountStore, Direction, DonationStore, ListQuery, OrderColumn, RecordStore, RoleStore, StoreError};

/// In-process stand-in for the hosted data store. Backs `DATA_BACKEND=memory`
/// and the test-suite.
///
/// `fail_next_read` / `fail_next_write` make the next matching call fail with the
/// given message, the way a backend error would surface.
#[derive(Default)]
pub struct MemoryStore {
    news: RwLock<Vec<NewsItem>>,
    events: RwLock<Vec<Event>>,
    resources: RwLock<Vec<Resource>>,
    donations: RwLock<Vec<Donation>>,
    accounts: RwLock<Vec<Account>>,
    roles: RwLock<HashSet<(Uuid, String)>>,
    fail_read: Mutex<Option<String>>,
    fail_write: Mutex<Option<String>>,
    last_created: Mutex<Option<DateTime<Utc>>>,
    calls: AtomicU64,
}

/// Record types the memory store keeps a table for.
pub trait MemoryTable: ContentRecord {
    fn table(store: &MemoryStore) -> &RwLock<Vec<Self>>;
}

impl MemoryTable for NewsItem {
    fn table(store: &MemoryStore) -> &RwLock<Vec<Self>> {
        &store.news
    }
}

impl MemoryTable for Event {
    fn table(store: &MemoryStore) -> &RwLock<Vec<Self>> {
        &store.events
    }
}

impl MemoryTable for Resource {
    fn table(store: &MemoryStore) -> &RwLock<Vec<Self>> {
        &store.resources
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn fail_next_read(&self, message: &str) {
        *self.fail_read.lock().await = Some(message.to_string());
    }

    pub async fn fail_next_write(&self, message: &str) {
        *self.fail_write.lock().await = Some(message.to_string());
    }

    /// Number of store calls served so far, failed ones included.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    pub async fn add_donation(&self, donation: Donation) {
        self.donations.write().await.push(donation);
    }

    async fn read_gate(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        match self.fail_read.lock().await.take() {
            Some(message) => Err(StoreError(message)),
            None => Ok(()),
        }
    }

    async fn write_gate(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        match self.fail_write.lock().await.take() {
            Some(message) => Err(StoreError(message)),
            None => Ok(()),
        }
    }

    /// Creation timestamps strictly increase, so newest-first order is total.
    async fn next_created_at(&self) -> DateTime<Utc> {
        let mut last = self.last_created.lock().await;
        let now = Utc::now();
        let ts = match *last {
            Some(prev) if now <= prev => prev + Duration::microseconds(1),
            _ => now,
        };
        *last = Some(ts);
        ts
    }
}

fn sort_rows<T: ContentRecord>(rows: &mut [T], query: &ListQuery) {
    rows.sort_by(|a, b| {
        let ord = match query.order_by {
            OrderColumn::CreatedAt => a.created_at().cmp(&b.created_at()),
        };
        match query.direction {
            Direction::Asc => ord,
            Direction::Desc => ord.reverse(),
        }
    });
}

#[async_trait]
impl<T: MemoryTable> RecordStore<T> for MemoryStore {
    async fn list(&self, query: ListQuery) -> Result<Vec<T>, StoreError> {
        self.read_gate().await?;
        let mut rows: Vec<T> = T::table(self)
            .read()
            .await
            .iter()
            .filter(|r| !query.published_only || r.published())
            .cloned()
            .collect();
        sort_rows(&mut rows, &query);
        if let Some(limit) = query.limit {
            rows.truncate(limit.max(0) as usize);
        }
        Ok(rows)
    }

    async fn insert(&self, draft: &T::Draft) -> Result<T, StoreError> {
        self.write_gate().await?;
        let created_at = self.next_created_at().await;
        let record = T::from_draft(Uuid::new_v4(), created_at, draft);
        T::table(self).write().await.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: Uuid, draft: &T::Draft) -> Result<T, StoreError> {
        self.write_gate().await?;
        let mut rows = T::table(self).write().await;
        let row = rows
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(StoreError::not_found)?;
        row.apply_draft(draft);
        Ok(row.clone())
    }

    async fn set_published(&self, id: Uuid, published: bool) -> Result<T, StoreError> {
        self.write_gate().await?;
        let mut rows = T::table(self).write().await;
        let row = rows
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(StoreError::not_found)?;
        row.set_published(published);
        Ok(row.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.write_gate().await?;
        let mut rows = T::table(self).write().await;
        let before = rows.len();
        rows.retain(|r| r.id() != id);
        if rows.len() == before {
            return Err(StoreError::not_found());
        }
        Ok(())
    }
}

#[async_trait]
impl DonationStore for MemoryStore {
    async fn list_by_date_desc(&self) -> Result<Vec<Donation>, StoreError> {
        self.read_gate().await?;
        let mut rows = self.donations.read().await.clone();
        rows.sort_by(|a, b| b.donation_date.cmp(&a.donation_date));
        Ok(rows)
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        self.read_gate().await?;
        Ok(self
            .accounts
            .read()
            .await
            .iter()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn create(&self, account: &NewAccount) -> Result<Account, StoreError> {
        self.write_gate().await?;
        let mut accounts = self.accounts.write().await;
        if accounts.iter().any(|a| a.email == account.email) {
            return Err(StoreError(
                "duplicate key value violates unique constraint \"accounts_email_key\"".to_string(),
            ));
        }
        let created = Account {
            id: Uuid::new_v4(),
            email: account.email.clone(),
            password_hash: account.password_hash.clone(),
            created_at: Utc::now(),
        };
        accounts.push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl RoleStore for MemoryStore {
    async fn has_role(&self, user_id: Uuid, role: &str) -> Result<bool, StoreError> {
        self.read_gate().await?;
        Ok(self.roles.read().await.contains(&(user_id, role.to_string())))
    }

    async fn grant_role(&self, user_id: Uuid, role: &str) -> Result<(), StoreError> {
        self.write_gate().await?;
        self.roles.write().await.insert((user_id, role.to_string()));
        Ok(())
    }
}
