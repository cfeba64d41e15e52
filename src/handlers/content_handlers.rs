//! Dashboard handlers shared by the news, events and resources tabs. Each
//! function is generic over the record type and registered once per collection.

use actix_multipart::Multipart;
use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, http::StatusCode, web};
use futures::StreamExt;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::csrf;
use crate::auth::session::{Notice, set_notice};
use crate::dashboard::manager::{Confirmed, FormMode, ResourceManager, Saved, SubmitError};
use crate::dashboard::Tab;
use crate::errors::{AppError, render, see_other};
use crate::handlers::current_identity;
use crate::models::{Draft, FormFields};
use crate::state::AppState;
use crate::storage::PendingUpload;
use crate::templates_structs::{ConfirmDeleteTemplate, PageContext, TabView};

#[derive(Deserialize)]
pub struct TabQuery {
    pub edit: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct PublishForm {
    pub csrf_token: String,
    /// The value shown when the toggle was clicked.
    pub published: bool,
}

#[derive(Deserialize)]
pub struct DeleteForm {
    pub csrf_token: String,
    #[serde(default)]
    pub confirm: String,
}

/// Text fields plus at most one file from a multipart content form.
pub struct ContentForm {
    pub fields: FormFields,
    pub file: Option<PendingUpload>,
}

/// Read a multipart body. The `file` part is only kept when the browser sent a
/// file name, and file parts under any other name are skipped. Bytes past
/// `max_bytes + 1` are drained and dropped so the size check can still reject
/// the upload.
pub async fn read_content_form(mut payload: Multipart, max_bytes: usize) -> Result<ContentForm, AppError> {
    let mut fields = FormFields::new();
    let mut file = None;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| AppError::BadRequest(e.to_string()))?;
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);
        let content_type = field.content_type().map(|m| m.to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| AppError::BadRequest(e.to_string()))?;
            if bytes.len() <= max_bytes {
                bytes.extend_from_slice(&chunk);
            }
        }

        match file_name {
            Some(file_name) if name == "file" => {
                if !file_name.is_empty() {
                    file = Some(PendingUpload { file_name, content_type, bytes });
                }
            }
            Some(_) => log::debug!("Skipping unexpected file part '{name}'"),
            None => {
                let value = String::from_utf8(bytes)
                    .map_err(|_| AppError::BadRequest(format!("Field '{name}' is not valid UTF-8")))?;
                fields.insert(name, value);
            }
        }
    }

    Ok(ContentForm { fields, file })
}

fn manager<'a, T: TabView>(state: &'a AppState) -> ResourceManager<'a, T> {
    ResourceManager::new(T::collection(&state.stores), state.storage.as_ref(), state.config.max_upload_bytes)
}

pub async fn list<T: TabView>(
    req: HttpRequest,
    state: web::Data<AppState>,
    session: Session,
    query: web::Query<TabQuery>,
) -> Result<HttpResponse, AppError> {
    let identity = current_identity(&req)?;
    let mut ctx = PageContext::build(&session, &identity, Tab::from(T::KIND), &state.config);
    let manager = manager::<T>(&state);

    let items = match manager.list().await {
        Ok(items) => items,
        Err(e) => {
            log::error!("Listing {} failed: {e}", T::KIND);
            ctx.notice = Some(Notice::error(e.to_string()));
            Vec::new()
        }
    };

    let mode = match query.edit {
        Some(id) => manager.begin_edit(&items, id).unwrap_or_else(|| {
            ctx.notice = Some(Notice::error(format!("{} not found", T::KIND.singular())));
            FormMode::blank()
        }),
        None => FormMode::blank(),
    };

    T::render_tab(StatusCode::OK, ctx, items, mode, None)
}

async fn submit<T: TabView>(
    req: HttpRequest,
    state: web::Data<AppState>,
    session: Session,
    payload: Multipart,
    editing: Option<Uuid>,
) -> Result<HttpResponse, AppError> {
    let identity = current_identity(&req)?;
    let form = read_content_form(payload, state.config.max_upload_bytes).await?;
    csrf::verify(&session, form.fields.raw("csrf_token"))?;

    let draft = T::Draft::from_fields(&form.fields);
    let mode = match editing {
        Some(id) => FormMode::Editing { id, draft },
        None => FormMode::Creating(draft),
    };

    let manager = manager::<T>(&state);
    match manager.submit(mode, form.file).await {
        Ok(saved) => {
            let verb = match saved {
                Saved::Created(_) => "created",
                Saved::Updated(_) => "updated",
            };
            set_notice(&session, Notice::success(format!("{} {verb} successfully", T::KIND.singular())));
            Ok(see_other(&T::KIND.dashboard_path()))
        }
        Err(rejected) => {
            let (status, notice) = match &rejected.error {
                SubmitError::Validation(e) => (StatusCode::UNPROCESSABLE_ENTITY, Notice::validation(e.to_string())),
                other => (StatusCode::BAD_GATEWAY, Notice::error(other.to_string())),
            };
            let mut ctx = PageContext::build(&session, &identity, Tab::from(T::KIND), &state.config);
            let items = manager.list().await.unwrap_or_else(|e| {
                log::error!("Listing {} failed: {e}", T::KIND);
                ctx.notice = Some(Notice::error(e.to_string()));
                Vec::new()
            });
            T::render_tab(status, ctx, items, rejected.mode, Some(notice))
        }
    }
}

pub async fn create<T: TabView>(
    req: HttpRequest,
    state: web::Data<AppState>,
    session: Session,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    submit::<T>(req, state, session, payload, None).await
}

pub async fn update<T: TabView>(
    req: HttpRequest,
    state: web::Data<AppState>,
    session: Session,
    path: web::Path<Uuid>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    submit::<T>(req, state, session, payload, Some(path.into_inner())).await
}

pub async fn toggle_publish<T: TabView>(
    state: web::Data<AppState>,
    session: Session,
    path: web::Path<Uuid>,
    form: web::Form<PublishForm>,
) -> Result<HttpResponse, AppError> {
    csrf::verify(&session, &form.csrf_token)?;
    let id = path.into_inner();

    match manager::<T>(&state).toggle_published(id, form.published).await {
        Ok(record) => {
            let state_label = if record.published() { "published" } else { "unpublished" };
            set_notice(&session, Notice::success(format!("{} {state_label}", T::KIND.singular())));
        }
        Err(e) => set_notice(&session, Notice::error(e.to_string())),
    }
    Ok(see_other(&T::KIND.dashboard_path()))
}

pub async fn confirm_delete<T: TabView>(
    req: HttpRequest,
    state: web::Data<AppState>,
    session: Session,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let identity = current_identity(&req)?;
    let id = path.into_inner();
    let items = manager::<T>(&state).list().await?;
    let record = items.iter().find(|item| item.id() == id).ok_or(AppError::NotFound)?;

    let ctx = PageContext::build(&session, &identity, Tab::from(T::KIND), &state.config);
    render(ConfirmDeleteTemplate::new(ctx, T::KIND, id, record.title().to_string()))
}

pub async fn delete<T: TabView>(
    state: web::Data<AppState>,
    session: Session,
    path: web::Path<Uuid>,
    form: web::Form<DeleteForm>,
) -> Result<HttpResponse, AppError> {
    csrf::verify(&session, &form.csrf_token)?;
    let id = path.into_inner();

    let Some(confirmed) = Confirmed::from_answer(&form.confirm) else {
        set_notice(&session, Notice::error("Delete was not confirmed"));
        return Ok(see_other(&T::KIND.dashboard_path()));
    };

    match manager::<T>(&state).delete(id, confirmed).await {
        Ok(()) => set_notice(&session, Notice::success(format!("{} deleted successfully", T::KIND.singular()))),
        Err(e) => {
            log::error!("Deleting {} {id} failed: {e}", T::KIND);
            set_notice(&session, Notice::error(e.to_string()));
        }
    }
    Ok(see_other(&T::KIND.dashboard_path()))
}

/// Register the tab's routes under `/<slug>` inside the dashboard scope.
pub fn configure<T: TabView>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope(&format!("/{}", T::KIND.slug()))
            .route("", web::get().to(list::<T>))
            .route("", web::post().to(create::<T>))
            .route("/{id}", web::post().to(update::<T>))
            .route("/{id}/publish", web::post().to(toggle_publish::<T>))
            .route("/{id}/delete", web::get().to(confirm_delete::<T>))
            .route("/{id}/delete", web::post().to(delete::<T>)),
    );
}
