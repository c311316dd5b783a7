use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::auth;
use crate::error::AppError;
use crate::middleware::resolve_identity;
use crate::state::AppState;
use crate::views;

/// GET / - welcome page, or straight to the dashboard when logged in
pub async fn home(State(state): State<AppState>, session: Session) -> Result<Response, AppError> {
    if resolve_identity(&state, &session).await?.is_some() {
        return Ok(Redirect::to("/dashboard").into_response());
    }

    let flashes = auth::take_flashes(&session).await?;
    Ok(Html(views::layout("Welcome", None, &flashes, &views::pages::home())).into_response())
}
