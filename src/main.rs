use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{App, HttpServer, cookie::Key, middleware, web};

use inmed_site::auth::events;
use inmed_site::config::{AppConfig, DataBackend};
use inmed_site::state::AppState;
use inmed_site::storage::{LocalFsStorage, ObjectStorage};
use inmed_site::store::{MemoryStore, Stores};
use inmed_site::{db, routes};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = AppConfig::from_env();

    let stores = match config.data_backend {
        DataBackend::Postgres => {
            let pool = db::init_pool(&config.database_url)
                .await
                .map_err(std::io::Error::other)?;
            db::run_migrations(&pool).await.map_err(std::io::Error::other)?;
            Stores::postgres(pool)
        }
        DataBackend::Memory => {
            log::warn!("DATA_BACKEND=memory: records live in this process and vanish on restart");
            Stores::memory(Arc::new(MemoryStore::new()))
        }
    };

    std::fs::create_dir_all(&config.storage_root)?;
    let storage: Arc<dyn ObjectStorage> =
        Arc::new(LocalFsStorage::new(config.storage_root.clone(), &config.public_base_url));

    // Cookie encryption key. A generated key logs everyone out on restart.
    let secret_key = match &config.session_key {
        Some(val) if val.len() >= 64 => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(val.as_bytes())
        }
        Some(val) => {
            log::warn!("SESSION_KEY too short ({} bytes, need 64+), generating random key", val.len());
            Key::generate()
        }
        None => {
            log::warn!("No SESSION_KEY set, generating random key (sessions lost on restart)");
            Key::generate()
        }
    };

    let state = web::Data::new(AppState::new(stores, storage, config.clone()));

    // One listener for the life of the server
    let listener = actix_web::rt::spawn(events::log_changes(state.sessions.subscribe()));

    if let Err(e) = db::seed_supervisor(&state.stores, &state.sessions, &state.config).await {
        log::error!("Seeding the supervisor account failed: {e}");
    }

    let storage_root = config.storage_root.clone();
    let cookie_secure = config.cookie_secure;
    log::info!("Starting server at http://{}", config.bind_addr);

    let server = HttpServer::new(move || {
        let session_mw = SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
            .cookie_secure(cookie_secure)
            .cookie_http_only(true)
            .build();

        App::new()
            .wrap(session_mw)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            // Static files and uploaded objects
            .service(actix_files::Files::new("/static", "./static"))
            .service(actix_files::Files::new("/storage", storage_root.clone()))
            .configure(routes::configure)
            // Default 404 handler (must be registered last)
            .default_service(web::to(routes::not_found))
    })
    .bind(&config.bind_addr)?
    .run()
    .await;

    listener.abort();
    server
}
