//! Chunk accumulation and assembly.
//!
//! Large artboard arrays arrive as numbered chunks which are buffered in
//! the `artboard_chunk` table. Once the buffer holds every index of an
//! upload, the chunks are concatenated in index order and written to the
//! project record, and the buffer is cleared — all in one transaction.
//! Completion is detected from the buffer contents rather than from
//! which index arrived last, so chunks may be submitted in any order and
//! an incomplete buffer is never merged.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::anyhow;
use chrono::{Duration, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::OnConflict;
use sea_orm::ActiveValue::Set;
use sea_orm::{DatabaseConnection, DatabaseTransaction, QueryOrder, TransactionTrait};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::instrument;

use atelier::project::ProjectId;

use crate::config::ChunkBufferConfig;
use crate::database::entity::artboard_chunk::{self, Entity as ArtboardChunk};
use crate::database::entity::project::{self, Entity as Project};
use crate::error::{ErrorKind, ServerError, ServerResult};

/// Outcome of submitting one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// The chunk was buffered; the upload is not yet complete.
    Accepted,

    /// The buffer covered every index and the assembled artboards were
    /// written to the project record.
    Assembled,
}

/// Accumulates artboard chunks and assembles completed uploads.
#[derive(Debug)]
pub struct ChunkAssembler {
    /// Per-project locks. Buffer writes and assembly for one project are
    /// serialized so at most one assembly runs per upload session.
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    config: ChunkBufferConfig,
}

impl ChunkAssembler {
    /// Creates a new assembler.
    pub fn new(config: ChunkBufferConfig) -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Buffers one chunk, assembling the upload if the buffer is now
    /// complete.
    ///
    /// Resubmitting an index overwrites the buffered payload for that
    /// index, so retrying a chunk is always safe.
    #[instrument(skip(self, database, artboards))]
    pub async fn submit_chunk(
        &self,
        database: &DatabaseConnection,
        project_id: &ProjectId,
        chunk_index: u32,
        total_chunks: u32,
        artboards: &[Value],
    ) -> ServerResult<ChunkOutcome> {
        if total_chunks == 0 {
            return Err(ErrorKind::RequestError(anyhow!("totalChunks must be at least 1")).into());
        }

        if chunk_index >= total_chunks {
            return Err(ErrorKind::RequestError(anyhow!(
                "chunkIndex {} out of range for {} chunks",
                chunk_index,
                total_chunks
            ))
            .into());
        }

        let artboards_json =
            serde_json::to_string(artboards).map_err(ServerError::request_error)?;

        let lock = self.project_lock(project_id).await;
        let _guard = lock.lock().await;

        let txn = database.begin().await.map_err(ServerError::database_error)?;

        let model = artboard_chunk::ActiveModel {
            project_id: Set(project_id.as_str().to_owned()),
            chunk_index: Set(chunk_index as i32),
            total_chunks: Set(total_chunks as i32),
            artboards: Set(artboards_json),
            created_at: Set(Utc::now()),
        };

        ArtboardChunk::insert(model)
            .on_conflict(
                OnConflict::columns([
                    artboard_chunk::Column::ProjectId,
                    artboard_chunk::Column::ChunkIndex,
                ])
                .update_columns([
                    artboard_chunk::Column::TotalChunks,
                    artboard_chunk::Column::Artboards,
                    artboard_chunk::Column::CreatedAt,
                ])
                .to_owned(),
            )
            .exec(&txn)
            .await
            .map_err(ServerError::database_error)?;

        // Leftovers from an abandoned upload with a different chunk count
        // do not count towards completeness. They are purged with the
        // rest of the buffer once this upload assembles.
        let buffered = ArtboardChunk::find()
            .filter(artboard_chunk::Column::ProjectId.eq(project_id.as_str()))
            .filter(artboard_chunk::Column::TotalChunks.eq(total_chunks as i32))
            .filter(artboard_chunk::Column::ChunkIndex.lt(total_chunks as i32))
            .order_by_asc(artboard_chunk::Column::ChunkIndex)
            .all(&txn)
            .await
            .map_err(ServerError::database_error)?;

        if buffered.len() < total_chunks as usize {
            txn.commit().await.map_err(ServerError::database_error)?;
            return Ok(ChunkOutcome::Accepted);
        }

        let combined = concatenate(&buffered)?;
        write_assembled(&txn, project_id, &combined).await?;

        ArtboardChunk::delete_many()
            .filter(artboard_chunk::Column::ProjectId.eq(project_id.as_str()))
            .exec(&txn)
            .await
            .map_err(ServerError::database_error)?;

        txn.commit().await.map_err(ServerError::database_error)?;

        tracing::info!(
            project = %project_id,
            chunks = total_chunks,
            artboards = combined.len(),
            "assembled chunked upload"
        );

        Ok(ChunkOutcome::Assembled)
    }

    /// Deletes buffer entries older than the configured expiry and
    /// returns how many were removed.
    #[instrument(skip_all)]
    pub async fn sweep_expired(&self, database: &DatabaseConnection) -> ServerResult<u64> {
        let cutoff = Utc::now() - Duration::seconds(self.config.expiry_secs as i64);

        let result = ArtboardChunk::delete_many()
            .filter(artboard_chunk::Column::CreatedAt.lt(cutoff))
            .exec(database)
            .await
            .map_err(ServerError::database_error)?;

        if result.rows_affected > 0 {
            tracing::info!(
                removed = result.rows_affected,
                "swept expired artboard chunks"
            );
        }

        Ok(result.rows_affected)
    }

    /// Returns the lock guarding a project's chunk buffer.
    async fn project_lock(&self, project_id: &ProjectId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(project_id.as_str().to_owned())
            .or_default()
            .clone()
    }
}

/// Concatenates buffered chunks, already ordered by index, into one
/// artboard array.
fn concatenate(chunks: &[artboard_chunk::Model]) -> ServerResult<Vec<Value>> {
    let mut combined = Vec::new();

    for chunk in chunks {
        let mut artboards: Vec<Value> =
            serde_json::from_str(&chunk.artboards).map_err(ServerError::database_error)?;
        combined.append(&mut artboards);
    }

    Ok(combined)
}

/// Writes the assembled artboards to the project record, touching only
/// `artboards` and `last_updated`.
async fn write_assembled(
    txn: &DatabaseTransaction,
    project_id: &ProjectId,
    artboards: &[Value],
) -> ServerResult<()> {
    let artboards_json = serde_json::to_string(artboards).map_err(ServerError::database_error)?;

    let model = project::ActiveModel {
        project_id: Set(project_id.as_str().to_owned()),
        last_updated: Set(Utc::now()),
        artboards: Set(Some(artboards_json)),
        ..Default::default()
    };

    Project::insert(model)
        .on_conflict(
            OnConflict::column(project::Column::ProjectId)
                .update_columns([project::Column::LastUpdated, project::Column::Artboards])
                .to_owned(),
        )
        .exec(txn)
        .await
        .map_err(ServerError::database_error)?;

    Ok(())
}
