use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::middleware::{auth_middleware, metrics_middleware};
use super::{drawings, events, handlers, playback, settings, warns};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let tenant_routes = Router::new()
        // Settings
        .route("/settings", get(settings::get_settings))
        .route("/status-target", put(settings::set_status_target))
        .route("/auto-role", put(settings::set_auto_role))
        .route("/announcements/{kind}", put(settings::set_announcement))
        // Playback
        .route("/playback/play", post(playback::play))
        .route("/playback/pause", post(playback::pause))
        .route("/playback/resume", post(playback::resume))
        .route("/playback/skip", post(playback::skip))
        .route("/playback/stop", post(playback::stop))
        .route("/playback/queue", get(playback::queue))
        // Drawings
        .route(
            "/drawings",
            post(drawings::create_drawing).get(drawings::list_drawings),
        )
        // Warns
        .route(
            "/warns/{user}",
            post(warns::add_warn)
                .get(warns::list_warns)
                .delete(warns::clear_warns),
        )
        // Platform events
        .route("/events/member-joined", post(events::member_joined))
        .route("/events/member-left", post(events::member_left))
        .route("/events/voice-state", post(events::voice_state))
        .route("/events/playback-finished", post(events::playback_finished))
        .route("/events/voice-disconnected", post(events::voice_disconnected));

    let protected_routes = Router::new()
        .route("/config", get(handlers::get_config))
        .route("/status", get(handlers::engine_status))
        .nest("/tenants/{tenant}", tenant_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected_routes)
        .with_state(state.clone());

    Router::new()
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .nest("/api/v1", api_routes)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}
