pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::server::AppState;

pub fn setup_admin_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/credentials", get(get_credentials))
        .route("/admin/credentials/sweep", post(sweep_credentials))
        .layer(middleware::from_fn_with_state(state, admin_auth_middleware))
}
