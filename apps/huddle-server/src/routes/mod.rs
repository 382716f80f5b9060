pub mod health;
pub mod messages;
pub mod users;

use axum::Router;
use utoipa::OpenApi;

use crate::error::ApiError;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(crate::gateway::server::router())
        .nest("/api", messages::router().merge(users::router()))
        .fallback(route_not_found)
}

async fn route_not_found() -> ApiError {
    ApiError::not_found("Route not found")
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        messages::list_messages,
        messages::get_message,
        users::list_users,
    ),
    components(
        schemas(
            crate::error::ApiErrorBody,
            crate::error::ApiErrorDetail,
            huddle_common::Message,
            huddle_common::Reaction,
            huddle_common::Session,
            health::HealthResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check"),
        (name = "Messages", description = "Message log snapshot"),
        (name = "Users", description = "Roster snapshot"),
    )
)]
pub struct ApiDoc;
