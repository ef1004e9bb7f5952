use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::application::ports::LlmClient;
use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    ask_handler, ask_stream_handler, delete_chat_file_handler, delete_library_handler,
    estimate_handler, health_handler, list_chat_files_handler, list_library_handler,
    pin_library_handler, plan_handler, preview_handler, upload_library_handler,
};
use crate::presentation::state::AppState;

pub fn create_router<L>(state: AppState<L>) -> Router
where
    L: LlmClient + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let body_limit = DefaultBodyLimit::max(state.settings.server.max_body_bytes);

    Router::new()
        .route("/health", get(health_handler))
        .route("/ask-ai", post(ask_handler::<L>))
        .route("/ask-ai/stream", post(ask_stream_handler::<L>))
        .route("/api/estimate", post(estimate_handler::<L>))
        .route("/api/process", post(preview_handler::<L>))
        .route("/api/plan", post(plan_handler::<L>))
        .route("/api/library", get(list_library_handler::<L>))
        .route("/api/library/upload", post(upload_library_handler::<L>))
        .route("/api/library/pin", post(pin_library_handler::<L>))
        .route("/api/library/{id}", delete(delete_library_handler::<L>))
        .route("/api/chat/files", get(list_chat_files_handler::<L>))
        .route(
            "/api/chat/files/{name}",
            delete(delete_chat_file_handler::<L>),
        )
        .layer(body_limit)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
