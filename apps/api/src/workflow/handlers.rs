use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::template::completeness::{compute_completeness, CompletenessReport, FieldWeight};
use crate::template::fields::{
    add_array_item, patch_template, remove_array_item, set_array_item, set_field,
};
use crate::template::models::Template;
use crate::workflow::proposal::proposal_markdown;
use crate::workflow::steps::{Step3Input, StepMerge};

const SUGGESTION_COUNT: usize = 3;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateResponse {
    pub template: Template,
    pub completeness: CompletenessReport,
    pub can_proceed: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCreatedResponse {
    pub session_id: Uuid,
    #[serde(flatten)]
    pub state: TemplateResponse,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletenessResponse {
    #[serde(flatten)]
    pub report: CompletenessReport,
    pub can_proceed: bool,
    pub suggestions: Vec<FieldWeight>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResponse {
    #[serde(flatten)]
    pub state: TemplateResponse,
    pub used_fallback: bool,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
}

fn describe(state: &AppState, template: Template) -> TemplateResponse {
    let completeness = compute_completeness(&template, &state.scoring);
    let can_proceed = completeness.can_proceed(state.config.progression_threshold);
    TemplateResponse {
        template,
        completeness,
        can_proceed,
    }
}

async fn persist(
    state: &AppState,
    session: Uuid,
    template: Template,
) -> Result<TemplateResponse, AppError> {
    state.store.save(session, &template).await?;
    Ok(describe(state, template))
}

async fn persist_step(
    state: &AppState,
    session: Uuid,
    step: u8,
    merged: StepMerge,
    markdown: Option<String>,
) -> Result<Json<StepResponse>, AppError> {
    info!(
        %session,
        step,
        completed = merged.completed,
        used_fallback = merged.used_fallback,
        backend = state.pipeline.backend(),
        "Step merged"
    );
    let response = persist(state, session, merged.template).await?;
    Ok(Json(StepResponse {
        state: response,
        used_fallback: merged.used_fallback,
        completed: merged.completed,
        markdown,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Sessions
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionCreatedResponse>), AppError> {
    let session_id = Uuid::new_v4();
    let template = Template::empty();
    let response = persist(&state, session_id, template).await?;
    info!(%session_id, store = state.store.backend(), "Session created");
    Ok((
        StatusCode::CREATED,
        Json(SessionCreatedResponse {
            session_id,
            state: response,
        }),
    ))
}

/// GET /api/v1/sessions/:id/template
pub async fn handle_get_template(
    State(state): State<AppState>,
    Path(session): Path<Uuid>,
) -> Result<Json<TemplateResponse>, AppError> {
    let template = state.store.load(session).await?;
    Ok(Json(describe(&state, template)))
}

/// DELETE /api/v1/sessions/:id/template
pub async fn handle_clear_template(
    State(state): State<AppState>,
    Path(session): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.store.clear(session).await?;
    info!(%session, "Template cleared");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/sessions/:id/completeness
pub async fn handle_get_completeness(
    State(state): State<AppState>,
    Path(session): Path<Uuid>,
) -> Result<Json<CompletenessResponse>, AppError> {
    let template = state.store.load(session).await?;
    let report = compute_completeness(&template, &state.scoring);
    let suggestions = report
        .top_suggestions(SUGGESTION_COUNT)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(CompletenessResponse {
        can_proceed: report.can_proceed(state.config.progression_threshold),
        suggestions,
        report,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Field edits
// ────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct FieldUpdate {
    pub section: String,
    pub field: String,
    pub value: Value,
}

#[derive(Deserialize)]
pub struct ArrayItemAdd {
    pub section: String,
    pub field: String,
    pub value: Value,
}

#[derive(Deserialize)]
pub struct ArrayItemSet {
    pub section: String,
    pub field: String,
    pub index: usize,
    pub value: Value,
}

#[derive(Deserialize)]
pub struct ArrayItemRemove {
    pub section: String,
    pub field: String,
    pub index: usize,
}

/// PATCH /api/v1/sessions/:id/template
/// Partial JSON update. An explicit `null` clears a field.
pub async fn handle_patch_template(
    State(state): State<AppState>,
    Path(session): Path<Uuid>,
    Json(patch): Json<Value>,
) -> Result<Json<TemplateResponse>, AppError> {
    let template = state.store.load(session).await?;
    let updated = patch_template(&template, &patch)?;
    Ok(Json(persist(&state, session, updated).await?))
}

/// PATCH /api/v1/sessions/:id/template/field
pub async fn handle_set_field(
    State(state): State<AppState>,
    Path(session): Path<Uuid>,
    Json(req): Json<FieldUpdate>,
) -> Result<Json<TemplateResponse>, AppError> {
    let template = state.store.load(session).await?;
    let updated = set_field(&template, &req.section, &req.field, req.value)?;
    Ok(Json(persist(&state, session, updated).await?))
}

/// POST /api/v1/sessions/:id/template/array/add
pub async fn handle_add_array_item(
    State(state): State<AppState>,
    Path(session): Path<Uuid>,
    Json(req): Json<ArrayItemAdd>,
) -> Result<Json<TemplateResponse>, AppError> {
    let template = state.store.load(session).await?;
    let updated = add_array_item(&template, &req.section, &req.field, req.value)?;
    Ok(Json(persist(&state, session, updated).await?))
}

/// POST /api/v1/sessions/:id/template/array/set
pub async fn handle_set_array_item(
    State(state): State<AppState>,
    Path(session): Path<Uuid>,
    Json(req): Json<ArrayItemSet>,
) -> Result<Json<TemplateResponse>, AppError> {
    let template = state.store.load(session).await?;
    let updated = set_array_item(&template, &req.section, &req.field, req.index, req.value)?;
    Ok(Json(persist(&state, session, updated).await?))
}

/// POST /api/v1/sessions/:id/template/array/remove
pub async fn handle_remove_array_item(
    State(state): State<AppState>,
    Path(session): Path<Uuid>,
    Json(req): Json<ArrayItemRemove>,
) -> Result<Json<TemplateResponse>, AppError> {
    let template = state.store.load(session).await?;
    let updated = remove_array_item(&template, &req.section, &req.field, req.index)?;
    Ok(Json(persist(&state, session, updated).await?))
}

// ────────────────────────────────────────────────────────────────────────────
// Workflow steps
// ────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct Step1Request {
    #[serde(default)]
    pub memo: String,
}

#[derive(Deserialize)]
pub struct Step2Request {
    #[serde(default)]
    pub situation: String,
}

/// POST /api/v1/sessions/:id/steps/1
pub async fn handle_step1(
    State(state): State<AppState>,
    Path(session): Path<Uuid>,
    Json(req): Json<Step1Request>,
) -> Result<Json<StepResponse>, AppError> {
    let template = state.store.load(session).await?;
    let merged = state.pipeline.run_step1(&template, &req.memo, Utc::now()).await;
    persist_step(&state, session, 1, merged, None).await
}

/// POST /api/v1/sessions/:id/steps/2
pub async fn handle_step2(
    State(state): State<AppState>,
    Path(session): Path<Uuid>,
    Json(req): Json<Step2Request>,
) -> Result<Json<StepResponse>, AppError> {
    let template = state.store.load(session).await?;
    let merged = state
        .pipeline
        .run_step2(&template, &req.situation, Utc::now())
        .await;
    persist_step(&state, session, 2, merged, None).await
}

/// POST /api/v1/sessions/:id/steps/3
pub async fn handle_step3(
    State(state): State<AppState>,
    Path(session): Path<Uuid>,
    Json(req): Json<Step3Input>,
) -> Result<Json<StepResponse>, AppError> {
    let template = state.store.load(session).await?;
    let merged = state.pipeline.run_step3(&template, &req, Utc::now()).await;
    persist_step(&state, session, 3, merged, None).await
}

/// POST /api/v1/sessions/:id/steps/4
pub async fn handle_step4(
    State(state): State<AppState>,
    Path(session): Path<Uuid>,
) -> Result<Json<StepResponse>, AppError> {
    let template = state.store.load(session).await?;
    let merged = state.pipeline.run_step4(&template, Utc::now());
    let markdown = proposal_markdown(
        &merged.template.proposal,
        &merged.template.company_profile.name,
    );
    persist_step(&state, session, 4, merged, Some(markdown)).await
}
