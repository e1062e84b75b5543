//! Database access.
//!
//! One pooled [`DatabaseConnection`] is created at startup and shared by
//! every request; individual operations check connections out of the
//! pool rather than dialing the database themselves.

pub mod entity;
pub mod migration;

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::ActiveValue::Set;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, EntityTrait};
use sea_orm_migration::MigratorTrait;

use atelier::api::v1::project::UpdateProjectRequest;
use atelier::project::ProjectId;

use crate::config::DatabaseConfig;
use crate::database::entity::project::{self, Entity as Project};
use crate::database::migration::Migrator;
use crate::error::{ServerError, ServerResult};

/// Connects to the database and brings the schema up to date.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs));

    let connection = Database::connect(options)
        .await
        .context("Failed to connect to database")?;

    Migrator::up(&connection, None)
        .await
        .context("Failed to run migrations")?;

    Ok(connection)
}

/// Project store operations.
#[async_trait::async_trait]
pub trait AtelierDatabase {
    /// Looks up one project.
    async fn find_project(&self, project_id: &ProjectId) -> ServerResult<Option<project::Model>>;

    /// Creates or updates a project, writing only the fields the request
    /// supplies plus `last_updated`. Absent fields keep their stored
    /// values.
    async fn upsert_project(&self, request: &UpdateProjectRequest) -> ServerResult<()>;
}

#[async_trait::async_trait]
impl AtelierDatabase for DatabaseConnection {
    async fn find_project(&self, project_id: &ProjectId) -> ServerResult<Option<project::Model>> {
        Project::find_by_id(project_id.as_str().to_owned())
            .one(self)
            .await
            .map_err(ServerError::database_error)
    }

    async fn upsert_project(&self, request: &UpdateProjectRequest) -> ServerResult<()> {
        let mut update_columns = vec![project::Column::LastUpdated];
        let mut model = project::ActiveModel {
            project_id: Set(request.project_id.as_str().to_owned()),
            last_updated: Set(Utc::now()),
            ..Default::default()
        };

        if let Some(chat_history) = &request.chat_history {
            let json = serde_json::to_string(chat_history).map_err(ServerError::request_error)?;
            model.chat_history = Set(Some(json));
            update_columns.push(project::Column::ChatHistory);
        }

        if let Some(artboards) = &request.artboards {
            let json = serde_json::to_string(artboards).map_err(ServerError::request_error)?;
            model.artboards = Set(Some(json));
            update_columns.push(project::Column::Artboards);
        }

        if let Some(public_html) = &request.public_html {
            model.public_html = Set(Some(public_html.clone()));
            update_columns.push(project::Column::PublicHtml);
        }

        if let Some(is_published) = request.is_published {
            model.is_published = Set(Some(is_published));
            update_columns.push(project::Column::IsPublished);
        }

        Project::insert(model)
            .on_conflict(
                OnConflict::column(project::Column::ProjectId)
                    .update_columns(update_columns)
                    .to_owned(),
            )
            .exec(self)
            .await
            .map_err(ServerError::database_error)?;

        Ok(())
    }
}
