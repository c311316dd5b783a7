use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::auth::session_layer;

use crate::database::models::{Cheque, Contract, Entity, Property, Tenant};
use crate::handlers::{protected, public};
use crate::middleware::require_login;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let sessions = session_layer(state.sessions.clone(), &state.config.security);
    Router::new()
        // Public
        .merge(public_routes())
        // Session required
        .merge(protected_routes(state.clone()))
        // Global middleware
        .layer(sessions)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::home))
        .route("/login", get(public::login_form).post(public::login))
        .route("/logout", get(public::logout).post(public::logout))
        .route("/health", get(public::health))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(protected::dashboard))
        .merge(resource_routes::<Property>())
        .merge(resource_routes::<Tenant>())
        .merge(resource_routes::<Contract>())
        .merge(resource_routes::<Cheque>())
        .route_layer(middleware::from_fn_with_state(state, require_login))
}

/// The seven record routes for one table
fn resource_routes<T: Entity>() -> Router<AppState> {
    use protected::records;

    let base = format!("/{}", T::TABLE);
    Router::new()
        .route(&base, get(records::list::<T>).post(records::create::<T>))
        .route(&format!("{}/new", base), get(records::new_form::<T>))
        .route(&format!("{}/:id", base), get(records::show::<T>).post(records::update::<T>))
        .route(&format!("{}/:id/edit", base), get(records::edit_form::<T>))
        .route(&format!("{}/:id/delete", base), post(records::delete::<T>))
}
