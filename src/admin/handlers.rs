use axum::{extract::State, Json};
use serde::Serialize;

use crate::credentials::CredentialStatus;
use crate::http::server::AppState;

#[derive(Serialize)]
pub struct SweepResult {
    pub reset: usize,
}

pub async fn get_credentials(State(state): State<AppState>) -> Json<Vec<CredentialStatus>> {
    Json(state.generator.store().statuses())
}

/// Run a cooldown sweep now instead of waiting for the next tick.
pub async fn sweep_credentials(State(state): State<AppState>) -> Json<SweepResult> {
    let store = state.generator.store();
    let reset = store.sweep_expired(store.now_ms());
    tracing::info!(reset, "Manual cooldown sweep");
    Json(SweepResult { reset })
}
