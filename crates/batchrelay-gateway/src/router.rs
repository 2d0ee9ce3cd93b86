//! Axum router wiring.
//!
//! Every configured integration gets `POST {route}`; other methods on the
//! same path answer 405. Ops endpoints live next to them.

use axum::{
    extract::{DefaultBodyLimit, Extension},
    routing::{get, post},
    Router,
};

use crate::{app_state::AppState, ops, transport};

pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics));

    for i in &state.cfg().integrations {
        let Some(fwd) = state.forwarder(&i.id) else {
            tracing::warn!(integration = %i.id, "no forwarder for integration, route skipped");
            continue;
        };
        router = router.route(
            &i.route,
            post(transport::http::submit_batch)
                .fallback(transport::http::method_not_allowed)
                .layer(Extension(fwd)),
        );
    }

    router
        .layer(DefaultBodyLimit::max(state.cfg().gateway.max_body_bytes))
        .with_state(state)
}
