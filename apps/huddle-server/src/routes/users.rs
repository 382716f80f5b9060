use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use huddle_common::Session;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/users", get(list_users))
}

/// GET /api/users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses((status = 200, description = "Current roster in join order", body = Vec<Session>)),
)]
pub async fn list_users(State(state): State<AppState>) -> Json<Vec<Session>> {
    Json(state.gateway.roster())
}
