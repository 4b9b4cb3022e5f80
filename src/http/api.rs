//! Generation and health handlers.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::generation::{
    AcknowledgementInput, AcknowledgementOutput, ChaptersInput, ChaptersOutput, ConclusionInput,
    ConclusionOutput, DedicationInput, DedicationOutput, Paper, PaperRequest, ReferencesInput,
    ReferencesOutput,
};
use crate::http::error::ApiError;
use crate::http::server::AppState;

/// JSON body extractor whose rejection renders as an [`ApiError`].
type JsonBody<T> = Result<Json<T>, axum::extract::rejection::JsonRejection>;

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub active_credentials: usize,
    pub total_credentials: usize,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    let store = state.generator.store();
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        active_credentials: store.active_count(),
        total_credentials: store.len(),
    })
}

pub async fn dedication(State(state): State<AppState>, body: JsonBody<DedicationInput>) -> ApiResult<DedicationOutput> {
    let Json(input) = body?;
    Ok(Json(state.generator.generate_dedication(input).await?))
}

pub async fn acknowledgement(
    State(state): State<AppState>,
    body: JsonBody<AcknowledgementInput>,
) -> ApiResult<AcknowledgementOutput> {
    let Json(input) = body?;
    Ok(Json(state.generator.generate_acknowledgement(input).await?))
}

pub async fn chapters(State(state): State<AppState>, body: JsonBody<ChaptersInput>) -> ApiResult<ChaptersOutput> {
    let Json(input) = body?;
    Ok(Json(state.generator.generate_chapters(input).await?))
}

pub async fn conclusion(State(state): State<AppState>, body: JsonBody<ConclusionInput>) -> ApiResult<ConclusionOutput> {
    let Json(input) = body?;
    Ok(Json(state.generator.generate_conclusion(input).await?))
}

pub async fn references(State(state): State<AppState>, body: JsonBody<ReferencesInput>) -> ApiResult<ReferencesOutput> {
    let Json(input) = body?;
    Ok(Json(state.generator.generate_references(input).await?))
}

pub async fn paper(State(state): State<AppState>, body: JsonBody<PaperRequest>) -> ApiResult<Paper> {
    let Json(request) = body?;
    Ok(Json(state.generator.generate_paper(request).await?))
}
