use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::models::account::{Account, NewAccount};
use crate::models::{
    ContentKind, ContentRecord, Donation, Event, EventDraft, NewsDraft, NewsItem, Resource, ResourceDraft,
};
use super::{AccountStore, DonationStore, ListQuery, RecordStore, RoleStore, StoreError};

const NEWS_COLUMNS: &str = "id, category, title, excerpt, content, image_url, published, created_at";
const EVENT_COLUMNS: &str =
    "id, title, description, content, event_date, location, image_url, published, created_at";
const RESOURCE_COLUMNS: &str =
    "id, title, description, file_url, file_type, category, published, created_at";
const DONATION_COLUMNS: &str =
    "id, donor_name, donor_email, amount, currency, donation_date, status, notes";
const ACCOUNT_COLUMNS: &str = "id, email, password_hash, created_at";

/// Postgres-backed stores.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn list_rows<T>(&self, kind: ContentKind, columns: &str, query: ListQuery) -> Result<Vec<T>, StoreError>
    where
        T: for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = list_sql(kind.table(), columns, &query);
        let mut q = sqlx::query_as::<_, T>(&sql);
        if let Some(limit) = query.limit {
            q = q.bind(limit);
        }
        Ok(q.fetch_all(&self.pool).await?)
    }

    async fn set_published_row<T>(&self, kind: ContentKind, columns: &str, id: Uuid, published: bool) -> Result<T, StoreError>
    where
        T: for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = format!(
            "UPDATE {} SET published = $1 WHERE id = $2 RETURNING {columns}",
            kind.table()
        );
        sqlx::query_as::<_, T>(&sql)
            .bind(published)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(StoreError::not_found)
    }

    async fn delete_row(&self, kind: ContentKind, id: Uuid) -> Result<(), StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", kind.table());
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found());
        }
        Ok(())
    }
}

fn list_sql(table: &str, columns: &str, query: &ListQuery) -> String {
    let mut sql = format!("SELECT {columns} FROM {table}");
    if query.published_only {
        sql.push_str(" WHERE published = TRUE");
    }
    sql.push_str(&format!(
        " ORDER BY {} {}",
        query.order_by.as_sql(),
        query.direction.as_sql()
    ));
    if query.limit.is_some() {
        sql.push_str(" LIMIT $1");
    }
    sql
}

#[async_trait]
impl RecordStore<NewsItem> for PgStore {
    async fn list(&self, query: ListQuery) -> Result<Vec<NewsItem>, StoreError> {
        self.list_rows(NewsItem::KIND, NEWS_COLUMNS, query).await
    }

    async fn insert(&self, draft: &NewsDraft) -> Result<NewsItem, StoreError> {
        let sql = format!(
            "INSERT INTO news_items (category, title, excerpt, content, image_url, published) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {NEWS_COLUMNS}"
        );
        let item = sqlx::query_as::<_, NewsItem>(&sql)
            .bind(draft.category.trim())
            .bind(draft.title.trim())
            .bind(draft.excerpt.trim())
            .bind(draft.content_opt())
            .bind(draft.image_url.as_deref())
            .bind(draft.published)
            .fetch_one(&self.pool)
            .await?;
        Ok(item)
    }

    async fn update(&self, id: Uuid, draft: &NewsDraft) -> Result<NewsItem, StoreError> {
        let sql = format!(
            "UPDATE news_items SET category = $1, title = $2, excerpt = $3, content = $4, \
             image_url = $5, published = $6 WHERE id = $7 RETURNING {NEWS_COLUMNS}"
        );
        sqlx::query_as::<_, NewsItem>(&sql)
            .bind(draft.category.trim())
            .bind(draft.title.trim())
            .bind(draft.excerpt.trim())
            .bind(draft.content_opt())
            .bind(draft.image_url.as_deref())
            .bind(draft.published)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(StoreError::not_found)
    }

    async fn set_published(&self, id: Uuid, published: bool) -> Result<NewsItem, StoreError> {
        self.set_published_row(NewsItem::KIND, NEWS_COLUMNS, id, published).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.delete_row(NewsItem::KIND, id).await
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

#[async_trait]
impl RecordStore<Event> for PgStore {
    async fn list(&self, query: ListQuery) -> Result<Vec<Event>, StoreError> {
        self.list_rows(Event::KIND, EVENT_COLUMNS, query).await
    }

    async fn insert(&self, draft: &EventDraft) -> Result<Event, StoreError> {
        let sql = format!(
            "INSERT INTO events (title, description, content, event_date, location, image_url, published) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {EVENT_COLUMNS}"
        );
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(draft.title.trim())
            .bind(non_blank(&draft.description))
            .bind(non_blank(&draft.content))
            .bind(draft.event_date_value())
            .bind(non_blank(&draft.location))
            .bind(draft.image_url.as_deref())
            .bind(draft.published)
            .fetch_one(&self.pool)
            .await?;
        Ok(event)
    }

    async fn update(&self, id: Uuid, draft: &EventDraft) -> Result<Event, StoreError> {
        let sql = format!(
            "UPDATE events SET title = $1, description = $2, content = $3, event_date = $4, \
             location = $5, image_url = $6, published = $7 WHERE id = $8 RETURNING {EVENT_COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&sql)
            .bind(draft.title.trim())
            .bind(non_blank(&draft.description))
            .bind(non_blank(&draft.content))
            .bind(draft.event_date_value())
            .bind(non_blank(&draft.location))
            .bind(draft.image_url.as_deref())
            .bind(draft.published)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(StoreError::not_found)
    }

    async fn set_published(&self, id: Uuid, published: bool) -> Result<Event, StoreError> {
        self.set_published_row(Event::KIND, EVENT_COLUMNS, id, published).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.delete_row(Event::KIND, id).await
    }
}

#[async_trait]
impl RecordStore<Resource> for PgStore {
    async fn list(&self, query: ListQuery) -> Result<Vec<Resource>, StoreError> {
        self.list_rows(Resource::KIND, RESOURCE_COLUMNS, query).await
    }

    async fn insert(&self, draft: &ResourceDraft) -> Result<Resource, StoreError> {
        let file_url = draft
            .file_url
            .as_deref()
            .ok_or_else(|| StoreError("file_url is required".to_string()))?;
        let sql = format!(
            "INSERT INTO resources (title, description, file_url, file_type, category, published) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {RESOURCE_COLUMNS}"
        );
        let resource = sqlx::query_as::<_, Resource>(&sql)
            .bind(draft.title.trim())
            .bind(non_blank(&draft.description))
            .bind(file_url)
            .bind(draft.file_type.as_deref())
            .bind(non_blank(&draft.category).map(str::to_lowercase))
            .bind(draft.published)
            .fetch_one(&self.pool)
            .await?;
        Ok(resource)
    }

    async fn update(&self, id: Uuid, draft: &ResourceDraft) -> Result<Resource, StoreError> {
        // Without a new file the stored URL stays as it is.
        let sql = format!(
            "UPDATE resources SET title = $1, description = $2, file_url = COALESCE($3, file_url), \
             file_type = $4, category = $5, published = $6 WHERE id = $7 RETURNING {RESOURCE_COLUMNS}"
        );
        sqlx::query_as::<_, Resource>(&sql)
            .bind(draft.title.trim())
            .bind(non_blank(&draft.description))
            .bind(draft.file_url.as_deref())
            .bind(draft.file_type.as_deref())
            .bind(non_blank(&draft.category).map(str::to_lowercase))
            .bind(draft.published)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(StoreError::not_found)
    }

    async fn set_published(&self, id: Uuid, published: bool) -> Result<Resource, StoreError> {
        self.set_published_row(Resource::KIND, RESOURCE_COLUMNS, id, published).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.delete_row(Resource::KIND, id).await
    }
}

#[async_trait]
impl DonationStore for PgStore {
    async fn list_by_date_desc(&self) -> Result<Vec<Donation>, StoreError> {
        let sql = format!("SELECT {DONATION_COLUMNS} FROM donations ORDER BY donation_date DESC");
        Ok(sqlx::query_as::<_, Donation>(&sql).fetch_all(&self.pool).await?)
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1");
        Ok(sqlx::query_as::<_, Account>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create(&self, account: &NewAccount) -> Result<Account, StoreError> {
        let sql = format!(
            "INSERT INTO accounts (email, password_hash) VALUES ($1, $2) RETURNING {ACCOUNT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Account>(&sql)
            .bind(&account.email)
            .bind(&account.password_hash)
            .fetch_one(&self.pool)
            .await?)
    }
}

#[async_trait]
impl RoleStore for PgStore {
    async fn has_role(&self, user_id: Uuid, role: &str) -> Result<bool, StoreError> {
        let found: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM user_roles WHERE user_id = $1 AND role = $2)",
        )
        .bind(user_id)
        .bind(role)
        .fetch_one(&self.pool)
        .await?;
        Ok(found)
    }

    async fn grant_role(&self, user_id: Uuid, role: &str) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2) ON CONFLICT DO NOTHING")
            .bind(user_id)
            .bind(role)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_sql_for_public_view() {
        let sql = list_sql("news_items", "id", &ListQuery::published(3));
        assert_eq!(
            sql,
            "SELECT id FROM news_items WHERE published = TRUE ORDER BY created_at DESC LIMIT $1"
        );
    }

    #[test]
    fn list_sql_for_dashboard() {
        let sql = list_sql("events", "id", &ListQuery::newest_first());
        assert_eq!(sql, "SELECT id FROM events ORDER BY created_at DESC");
    }
}
