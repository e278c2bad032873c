pub mod health;

use axum::{
    http::Uri,
    routing::{get, patch, post},
    Router,
};

use crate::errors::AppError;
use crate::state::AppState;
use crate::workflow::handlers;

async fn route_not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {uri}"))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Sessions & template
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id/template",
            get(handlers::handle_get_template)
                .patch(handlers::handle_patch_template)
                .delete(handlers::handle_clear_template),
        )
        .route(
            "/api/v1/sessions/:id/completeness",
            get(handlers::handle_get_completeness),
        )
        // Field edits
        .route(
            "/api/v1/sessions/:id/template/field",
            patch(handlers::handle_set_field),
        )
        .route(
            "/api/v1/sessions/:id/template/array/add",
            post(handlers::handle_add_array_item),
        )
        .route(
            "/api/v1/sessions/:id/template/array/set",
            post(handlers::handle_set_array_item),
        )
        .route(
            "/api/v1/sessions/:id/template/array/remove",
            post(handlers::handle_remove_array_item),
        )
        // Workflow steps
        .route("/api/v1/sessions/:id/steps/1", post(handlers::handle_step1))
        .route("/api/v1/sessions/:id/steps/2", post(handlers::handle_step2))
        .route("/api/v1/sessions/:id/steps/3", post(handlers::handle_step3))
        .route("/api/v1/sessions/:id/steps/4", post(handlers::handle_step4))
        .fallback(route_not_found)
        .with_state(state)
}
