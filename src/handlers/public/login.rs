use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::auth::{self, Flash};
use crate::error::AppError;
use crate::middleware::resolve_identity;
use crate::services::UserService;
use crate::state::AppState;
use crate::views;

const DEFAULT_LANDING: &str = "/dashboard";

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}

/// Only same-site paths are accepted as post-login targets.
fn safe_next(next: Option<&str>) -> Option<&str> {
    next.map(str::trim)
        .filter(|n| n.starts_with('/') && !n.starts_with("//") && !n.contains('\\'))
}

/// GET /login
pub async fn login_form(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<LoginQuery>,
) -> Result<Response, AppError> {
    let next = safe_next(query.next.as_deref());
    if resolve_identity(&state, &session).await?.is_some() {
        return Ok(Redirect::to(next.unwrap_or(DEFAULT_LANDING)).into_response());
    }

    let flashes = auth::take_flashes(&session).await?;
    let body = views::pages::login("", next);
    Ok(Html(views::layout("Login", None, &flashes, &body)).into_response())
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let users = UserService::new(state.db.clone());
    let next = safe_next(form.next.as_deref());

    match users.authenticate(&form.email, &form.password).await? {
        Some(user) => {
            auth::log_in(&session, user.id, auth::login_ttl(&state.config.security)).await?;
            tracing::info!("User {} logged in", user.email);
            Ok(Redirect::to(next.unwrap_or(DEFAULT_LANDING)).into_response())
        }
        None => {
            tracing::warn!("Failed login attempt for {}", form.email.trim());
            let mut flashes = auth::take_flashes(&session).await?;
            flashes.push(Flash::warning("Invalid credentials"));

            let body = views::pages::login(form.email.trim(), next);
            Ok((
                StatusCode::UNAUTHORIZED,
                Html(views::layout("Login", None, &flashes, &body)),
            )
                .into_response())
        }
    }
}

/// GET|POST /logout - forgets the session whether or not it was authenticated
pub async fn logout(session: Session) -> Result<Response, AppError> {
    if session.id().is_some() {
        tracing::info!("Session logged out");
    }
    auth::log_out(&session).await?;
    Ok(Redirect::to("/").into_response())
}
