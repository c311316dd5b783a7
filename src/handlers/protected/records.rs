//! Generic list/create/show/edit/delete screens, instantiated once per [`Entity`].

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use std::collections::HashMap;

use crate::auth::Flash;
use crate::database::models::{Entity, ListQuery};
use crate::database::{DatabaseError, Record, Repository};
use crate::error::AppError;
use crate::handlers::{page, redirect_with};
use crate::middleware::CurrentUser;
use crate::state::AppState;
use crate::views::forms::{record_form, values_from_entity, FormView, ReferenceOptions};
use crate::views::records::{detail_page, list_page, record_title};

fn list_path<T: Entity>() -> String {
    format!("/{}", T::TABLE)
}

fn record_path<T: Entity>(id: i64) -> String {
    format!("/{}/{}", T::TABLE, id)
}

async fn not_found<T: Entity>(user: &CurrentUser) -> Result<Response, AppError> {
    let message = format!("{} not found.", T::SINGULAR);
    redirect_with(&user.session, Flash::warning(message), &list_path::<T>()).await
}

/// Record ids are positive integers; anything else names no record.
fn parse_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|id| *id > 0)
}

/// Coerces and checks submitted form values, stamping the creator on insert.
fn record_from_form<T: Entity>(form: &HashMap<String, String>, creator: Option<i64>) -> Result<Record, AppError> {
    let mut record = Record::from_form(T::FIELDS, form)?;
    T::validate(&record)?;
    if let (true, Some(user_id)) = (T::TRACKS_CREATOR, creator) {
        record.set("created_by", user_id);
    }
    Ok(record)
}

/// Either re-renders the form with the rejection or propagates the error.
async fn form_or_error<T: Entity>(
    state: &AppState,
    user: &CurrentUser,
    error: AppError,
    title: &str,
    action: &str,
    submit: &str,
    values: &HashMap<String, String>,
) -> Result<Response, AppError> {
    let Some((field, message)) = error.field_error() else {
        return Err(error);
    };
    tracing::debug!(table = T::TABLE, "Rejected {} input: {}", T::SINGULAR, message);

    let references = Repository::<T>::new(state.db.clone()).reference_options().await?;
    let body = form_page::<T>(title, action, submit, values, Some((field.as_str(), message.as_str())), &references);
    Ok((StatusCode::UNPROCESSABLE_ENTITY, page(user, title, &body).await?).into_response())
}

fn form_page<T: Entity>(
    title: &str,
    action: &str,
    submit: &str,
    values: &HashMap<String, String>,
    error: Option<(&str, &str)>,
    references: &ReferenceOptions,
) -> String {
    let form = record_form(
        T::FIELDS,
        &FormView {
            action,
            submit,
            values,
            error,
            references,
        },
    );
    format!(
        "<h1>{}</h1>{}<p><a href=\"{}\">Cancel</a></p>",
        crate::views::escape(title),
        form,
        list_path::<T>()
    )
}

/// GET /{table}
pub async fn list<T: Entity>(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>, AppError> {
    let repo = Repository::<T>::new(state.db.clone());
    let rows = repo.list(query.to_filter::<T>()?).await?;
    let references = repo.reference_options().await?;
    page(&user, T::PLURAL, &list_page(&rows, &query, &references)).await
}

/// GET /{table}/new
pub async fn new_form<T: Entity>(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Html<String>, AppError> {
    let references = Repository::<T>::new(state.db.clone()).reference_options().await?;
    let defaults: HashMap<String, String> = T::FIELDS
        .iter()
        .filter_map(|spec| spec.default.map(|d| (spec.name.to_string(), d.to_string())))
        .collect();

    let title = format!("New {}", T::SINGULAR.to_lowercase());
    let body = form_page::<T>(&title, &list_path::<T>(), "Create", &defaults, None, &references);
    page(&user, &title, &body).await
}

/// POST /{table}
pub async fn create<T: Entity>(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let repo = Repository::<T>::new(state.db.clone());
    let inserted = match record_from_form::<T>(&form, Some(user.id)) {
        Ok(record) => repo.insert(&record).await.map_err(AppError::from),
        Err(e) => Err(e),
    };

    match inserted {
        Ok(id) => {
            let message = format!("{} created.", T::SINGULAR);
            redirect_with(&user.session, Flash::success(message), &record_path::<T>(id)).await
        }
        Err(e) => {
            let title = format!("New {}", T::SINGULAR.to_lowercase());
            form_or_error::<T>(&state, &user, e, &title, &list_path::<T>(), "Create", &form).await
        }
    }
}

/// GET /{table}/{id}
pub async fn show<T: Entity>(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(raw_id): Path<String>,
) -> Result<Response, AppError> {
    let Some(id) = parse_id(&raw_id) else {
        return not_found::<T>(&user).await;
    };
    let repo = Repository::<T>::new(state.db.clone());
    let Some(entity) = repo.get(id).await? else {
        return not_found::<T>(&user).await;
    };
    let references = repo.reference_options().await?;
    let title = record_title(&entity);
    Ok(page(&user, &title, &detail_page(&entity, &references)).await?.into_response())
}

/// GET /{table}/{id}/edit
pub async fn edit_form<T: Entity>(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(raw_id): Path<String>,
) -> Result<Response, AppError> {
    let Some(id) = parse_id(&raw_id) else {
        return not_found::<T>(&user).await;
    };
    let repo = Repository::<T>::new(state.db.clone());
    let Some(entity) = repo.get(id).await? else {
        return not_found::<T>(&user).await;
    };
    let references = repo.reference_options().await?;
    let title = format!("Edit {}", record_title(&entity));
    let body = form_page::<T>(
        &title,
        &record_path::<T>(id),
        "Save",
        &values_from_entity(&entity),
        None,
        &references,
    );
    Ok(page(&user, &title, &body).await?.into_response())
}

/// POST /{table}/{id}
pub async fn update<T: Entity>(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(raw_id): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let Some(id) = parse_id(&raw_id) else {
        return not_found::<T>(&user).await;
    };
    let repo = Repository::<T>::new(state.db.clone());
    let title = format!("Edit {}", T::SINGULAR.to_lowercase());
    let updated = match record_from_form::<T>(&form, None) {
        Ok(record) => repo.update(id, &record).await,
        Err(e) => return form_or_error::<T>(&state, &user, e, &title, &record_path::<T>(id), "Save", &form).await,
    };

    match updated {
        Ok(()) => {
            let message = format!("{} updated.", T::SINGULAR);
            redirect_with(&user.session, Flash::success(message), &record_path::<T>(id)).await
        }
        Err(DatabaseError::NotFound(_)) => not_found::<T>(&user).await,
        Err(e) => form_or_error::<T>(&state, &user, e.into(), &title, &record_path::<T>(id), "Save", &form).await,
    }
}

/// POST /{table}/{id}/delete
pub async fn delete<T: Entity>(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(raw_id): Path<String>,
) -> Result<Response, AppError> {
    let Some(id) = parse_id(&raw_id) else {
        return not_found::<T>(&user).await;
    };
    let repo = Repository::<T>::new(state.db.clone());
    match repo.delete(id).await {
        Ok(()) => {
            let message = format!("{} deleted.", T::SINGULAR);
            redirect_with(&user.session, Flash::success(message), &list_path::<T>()).await
        }
        Err(DatabaseError::NotFound(_)) => not_found::<T>(&user).await,
        Err(DatabaseError::Constraint(detail)) => {
            tracing::info!(table = T::TABLE, id, "Delete blocked: {}", detail);
            let message = format!("{} is still referenced by other records and cannot be deleted.", T::SINGULAR);
            redirect_with(&user.session, Flash::warning(message), &record_path::<T>(id)).await
        }
        Err(e) => Err(e.into()),
    }
}
