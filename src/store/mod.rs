//! Contracts for the hosted data collaborators (records, donations, accounts,
//! roles) and the two backends that fulfil them.

mod memory;
mod postgres;

use async_trait::async_trait;
use sqlx::PgPool;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::account::{Account, NewAccount};
use crate::models::{ContentRecord, Donation, Event, NewsItem, Resource};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Failure returned by a store. Carries the backend's own message for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError(pub String);

impl StoreError {
    pub fn not_found() -> Self {
        StoreError("Record not found".to_string())
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::RowNotFound => StoreError::not_found(),
            sqlx::Error::Database(db) => StoreError(db.message().to_string()),
            _ => StoreError(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderColumn {
    CreatedAt,
}

impl OrderColumn {
    pub fn as_sql(self) -> &'static str {
        match self {
            OrderColumn::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// How a collection is listed. Ordering is done by the store, not by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    pub order_by: OrderColumn,
    pub direction: Direction,
    pub limit: Option<i64>,
    pub published_only: bool,
}

impl ListQuery {
    /// Everything, newest first. What the dashboard lists.
    pub fn newest_first() -> Self {
        Self {
            order_by: OrderColumn::CreatedAt,
            direction: Direction::Desc,
            limit: None,
            published_only: false,
        }
    }

    /// Newest published records, for the public site.
    pub fn published(limit: i64) -> Self {
        Self {
            limit: Some(limit),
            published_only: true,
            ..Self::newest_first()
        }
    }
}

#[async_trait]
pub trait RecordStore<T: ContentRecord>: Send + Sync {
    async fn list(&self, query: ListQuery) -> Result<Vec<T>, StoreError>;

    async fn insert(&self, draft: &T::Draft) -> Result<T, StoreError>;

    /// Overwrites every writable column of the record with the draft.
    async fn update(&self, id: Uuid, draft: &T::Draft) -> Result<T, StoreError>;

    async fn set_published(&self, id: Uuid, published: bool) -> Result<T, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}

#[async_trait]
pub trait DonationStore: Send + Sync {
    async fn list_by_date_desc(&self) -> Result<Vec<Donation>, StoreError>;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    async fn create(&self, account: &NewAccount) -> Result<Account, StoreError>;
}

#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn has_role(&self, user_id: Uuid, role: &str) -> Result<bool, StoreError>;

    async fn grant_role(&self, user_id: Uuid, role: &str) -> Result<(), StoreError>;
}

/// Every store the application talks to.
#[derive(Clone)]
pub struct Stores {
    pub news: Arc<dyn RecordStore<NewsItem>>,
    pub events: Arc<dyn RecordStore<Event>>,
    pub resources: Arc<dyn RecordStore<Resource>>,
    pub donations: Arc<dyn DonationStore>,
    pub accounts: Arc<dyn AccountStore>,
    pub roles: Arc<dyn RoleStore>,
}

impl Stores {
    pub fn postgres(pool: PgPool) -> Self {
        let pg = Arc::new(PgStore::new(pool));
        Self {
            news: pg.clone(),
            events: pg.clone(),
            resources: pg.clone(),
            donations: pg.clone(),
            accounts: pg.clone(),
            roles: pg,
        }
    }

    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            news: store.clone(),
            events: store.clone(),
            resources: store.clone(),
            donations: store.clone(),
            accounts: store.clone(),
            roles: store,
        }
    }
}

/// Picks the store holding a record type.
pub trait Collection: ContentRecord {
    fn collection(stores: &Stores) -> &dyn RecordStore<Self>;
}

impl Collection for NewsItem {
    fn collection(stores: &Stores) -> &dyn RecordStore<Self> {
        stores.news.as_ref()
    }
}

impl Collection for Event {
    fn collection(stores: &Stores) -> &dyn RecordStore<Self> {
        stores.events.as_ref()
    }
}

impl Collection for Resource {
    fn collection(stores: &Stores) -> &dyn RecordStore<Self> {
        stores.resources.as_ref()
    }
}
