use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::auth::events::{SessionChange, SessionContext};
use crate::auth::password;
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::account::{NewAccount, normalize_email};
use crate::models::role::SUPERVISOR;
use crate::store::Stores;

pub const MIGRATIONS: &str = include_str!("schema.sql");

pub async fn init_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(8)
        .connect(database_url)
        .await
}

/// Apply the schema. Every statement is idempotent, so this runs on each start.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(MIGRATIONS).execute(pool).await?;
    log::info!("Database migrations complete");
    Ok(())
}

/// Make sure the configured supervisor account exists and holds the role.
/// Does nothing when `SUPERVISOR_EMAIL` / `SUPERVISOR_PASSWORD` are unset.
pub async fn seed_supervisor(stores: &Stores, sessions: &SessionContext, config: &AppConfig) -> Result<(), AppError> {
    let (Some(email), Some(password)) = (&config.supervisor_email, &config.supervisor_password) else {
        log::info!("No supervisor account configured");
        return Ok(());
    };
    let email = normalize_email(email);

    let account = match stores.accounts.find_by_email(&email).await? {
        Some(existing) => existing,
        None => {
            let password_hash = password::hash_password(password)?;
            let created = stores.accounts.create(&NewAccount { email, password_hash }).await?;
            log::info!("Seeded supervisor account {}", created.email);
            created
        }
    };

    if !stores.roles.has_role(account.id, SUPERVISOR).await? {
        stores.roles.grant_role(account.id, SUPERVISOR).await?;
        sessions.publish(SessionChange::RoleGranted { user_id: account.id, role: SUPERVISOR.to_string() });
    }
    Ok(())
}
