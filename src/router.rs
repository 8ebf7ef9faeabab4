use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{protected, public};
use crate::middleware::require_bearer;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/token", post(public::login))
        // Protected
        .merge(protected_routes(state.clone()))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::games;

    Router::new()
        .route("/users/me", get(protected::users_me))
        .route("/games", get(games::list).post(games::create))
        .route("/games/", get(games::list).post(games::create))
        .route(
            "/games/:id",
            get(games::get).put(games::update).delete(games::delete),
        )
        .route_layer(axum::middleware::from_fn_with_state(state, require_bearer))
}
