use crate::models::config::ServerConfig;
use crate::routes;
use crate::state::AppState;
use axum::Router;

pub fn create_app(config: ServerConfig) -> Router {
    create_app_with_state(AppState::new(config))
}

pub fn create_app_with_state(state: AppState) -> Router {
    routes::create_routes(state)
}
