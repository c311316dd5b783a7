use axum::{
    extract::{Request, State},
    http::Uri,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::auth::{self, Flash};
use crate::error::AppError;
use crate::services::UserService;
use crate::state::AppState;

/// Authenticated user context, inserted into request extensions by [`require_login`]
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: i64,
    pub email: String,
    pub role: String,
    /// Session that authenticated this request
    pub session: Session,
}

/// Maps the request's session to a user. A missing or expired session, or one
/// whose user row is gone, yields no identity.
pub async fn resolve_identity(state: &AppState, session: &Session) -> Result<Option<CurrentUser>, AppError> {
    let Some(user_id) = auth::user_id(session).await? else {
        return Ok(None);
    };

    let user = UserService::new(state.db.clone()).find_by_id(user_id).await?;
    Ok(user.map(|user| CurrentUser {
        id: user.id,
        email: user.email,
        role: user.role,
        session: session.clone(),
    }))
}

/// Gate for every protected route: without an identity the handler never runs
/// and the visitor is sent to the login page with a notice.
pub async fn require_login(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    match resolve_identity(&state, &session).await {
        Ok(Some(user)) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Ok(None) => login_redirect(&session, request.uri())
            .await
            .unwrap_or_else(|e| e.into_response()),
        Err(e) => e.into_response(),
    }
}

async fn login_redirect(session: &Session, uri: &Uri) -> Result<Response, AppError> {
    auth::push_flash(session, Flash::warning("Please log in first.")).await?;

    let next = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    tracing::debug!("Unauthenticated request for {}", next);
    let location = format!("/login?next={}", url::form_urlencoded::byte_serialize(next.as_bytes()).collect::<String>());
    Ok(Redirect::to(&location).into_response())
}
