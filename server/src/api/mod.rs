//! HTTP API routes.

pub(crate) mod v1;

use axum::routing::get;
use axum::Router;

/// Creates the API router.
pub(crate) fn router() -> Router {
    let api_v1 = Router::new()
        .route(
            "/projects",
            get(v1::project::list_projects).post(v1::project::update_project),
        )
        .route("/projects/{project_id}", get(v1::project::get_project));

    Router::new().nest("/api/v1", api_v1)
}
