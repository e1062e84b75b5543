use anyhow::anyhow;
use axum::extract::{Extension, Json, Path};
use sea_orm::{EntityTrait, QueryOrder};
use tracing::instrument;

use atelier::api::v1::project::{
    ListProjectsResponse, ProjectRecord, UpdateProjectRequest, UpdateProjectResponse,
};
use atelier::project::ProjectId;

use crate::assembly::ChunkOutcome;
use crate::database::entity::project::{self, Entity as Project};
use crate::database::AtelierDatabase;
use crate::error::{ErrorKind, ServerError, ServerResult};
use crate::State;

trait ProjectModelExt {
    fn into_record(self) -> ServerResult<ProjectRecord>;
}

impl ProjectModelExt for project::Model {
    fn into_record(self) -> ServerResult<ProjectRecord> {
        let project_id = ProjectId::new(self.project_id).map_err(ServerError::database_error)?;

        let chat_history = self
            .chat_history
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(ServerError::database_error)?;

        let artboards = self
            .artboards
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(ServerError::database_error)?;

        Ok(ProjectRecord {
            project_id,
            last_updated: self.last_updated,
            chat_history,
            artboards,
            public_html: self.public_html,
            is_published: self.is_published,
        })
    }
}

/// Creates or updates a project.
///
/// A request carrying `chunkIndex` and `totalChunks` is one piece of a
/// chunked artboard upload and goes through the chunk assembler; it
/// never touches the project record until the upload is complete. Any
/// other request writes the supplied fields directly.
#[instrument(skip_all, fields(project_id = %request.project_id))]
#[axum_macros::debug_handler]
pub(crate) async fn update_project(
    Extension(state): Extension<State>,
    Json(request): Json<UpdateProjectRequest>,
) -> ServerResult<Json<UpdateProjectResponse>> {
    let database = state.database();

    match (request.chunk_index, request.total_chunks) {
        (Some(chunk_index), Some(total_chunks)) => {
            let artboards = request.artboards.as_deref().ok_or_else(|| {
                ErrorKind::RequestError(anyhow!("chunked update must supply artboards"))
            })?;

            let outcome = state
                .assembler
                .submit_chunk(
                    database,
                    &request.project_id,
                    chunk_index,
                    total_chunks,
                    artboards,
                )
                .await?;

            let response = match outcome {
                ChunkOutcome::Accepted => UpdateProjectResponse::ChunkAccepted {
                    index: chunk_index,
                    total: total_chunks,
                },
                ChunkOutcome::Assembled => UpdateProjectResponse::Complete,
            };

            Ok(Json(response))
        }
        (None, None) => {
            database.upsert_project(&request).await?;
            Ok(Json(UpdateProjectResponse::Updated))
        }
        _ => Err(ErrorKind::RequestError(anyhow!(
            "chunkIndex and totalChunks must be supplied together"
        ))
        .into()),
    }
}

/// Fetches one project.
#[instrument(skip_all)]
#[axum_macros::debug_handler]
pub(crate) async fn get_project(
    Extension(state): Extension<State>,
    Path(project_id): Path<String>,
) -> ServerResult<Json<ProjectRecord>> {
    let project_id = ProjectId::new(project_id).map_err(ServerError::request_error)?;

    let project = state
        .database()
        .find_project(&project_id)
        .await?
        .ok_or(ErrorKind::NoSuchProject)?;

    Ok(Json(project.into_record()?))
}

/// Lists all projects.
#[instrument(skip_all)]
#[axum_macros::debug_handler]
pub(crate) async fn list_projects(
    Extension(state): Extension<State>,
) -> ServerResult<Json<ListProjectsResponse>> {
    let models = Project::find()
        .order_by_asc(project::Column::ProjectId)
        .all(state.database())
        .await
        .map_err(ServerError::database_error)?;

    let projects = models
        .into_iter()
        .map(ProjectModelExt::into_record)
        .collect::<ServerResult<Vec<_>>>()?;

    Ok(Json(ListProjectsResponse { projects }))
}
