pub mod protected;
pub mod public;

use axum::response::{Html, IntoResponse, Redirect, Response};
use tower_sessions::Session;

use crate::auth::{self, Flash};
use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::views;

/// Renders `body` in the layout, draining the user's pending flashes.
pub(crate) async fn page(user: &CurrentUser, title: &str, body: &str) -> Result<Html<String>, AppError> {
    let flashes = auth::take_flashes(&user.session).await?;
    Ok(Html(views::layout(title, Some(user), &flashes, body)))
}

/// Post/redirect/get: queue `flash` and send the browser to `to`.
pub(crate) async fn redirect_with(session: &Session, flash: Flash, to: &str) -> Result<Response, AppError> {
    auth::push_flash(session, flash).await?;
    Ok(Redirect::to(to).into_response())
}
