//! Project uploader.
//!
//! Small artboard sets go to the server in a single update. Anything
//! whose serialized size crosses the chunking threshold is split into
//! numbered chunks which are submitted one by one, each retried with
//! exponential backoff, until the server reports the upload complete.

use std::time::Duration;

use anyhow::{anyhow, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;

use crate::api::ApiClient;
use atelier::api::v1::project::{UpdateProjectRequest, UpdateProjectResponse};
use atelier::chunking::split_artboards;
use atelier::project::ProjectId;

/// Default chunk size: 1 MiB of serialized artboards.
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Chunking threshold: 4 MiB.
pub const CHUNKING_THRESHOLD: usize = 4 * 1024 * 1024;

/// Configuration for pushing artboards.
#[derive(Debug, Clone, Copy)]
pub struct PushConfig {
    /// Serialized size above which an artboard set is uploaded in
    /// chunks.
    pub chunking_threshold: usize,

    /// Serialized size each chunk aims for.
    pub chunk_size: usize,

    /// Retries per submission before giving up.
    pub max_retries: usize,

    /// Suppress the progress bar.
    pub quiet: bool,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            chunking_threshold: CHUNKING_THRESHOLD,
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_retries: 3,
            quiet: false,
        }
    }
}

/// Uploads a project's artboards, chunking when large.
pub async fn push_artboards(
    api: &ApiClient,
    project_id: &ProjectId,
    artboards: Vec<Value>,
    config: PushConfig,
) -> Result<()> {
    let serialized_size = serde_json::to_string(&artboards)?.len();

    if serialized_size <= config.chunking_threshold {
        return push_full(api, project_id, artboards, config).await;
    }

    push_chunked(api, project_id, artboards, config).await
}

/// Uploads the whole artboard array in one update.
async fn push_full(
    api: &ApiClient,
    project_id: &ProjectId,
    artboards: Vec<Value>,
    config: PushConfig,
) -> Result<()> {
    let request = UpdateProjectRequest {
        project_id: project_id.clone(),
        chat_history: None,
        artboards: Some(artboards),
        public_html: None,
        is_published: None,
        chunk_index: None,
        total_chunks: None,
    };

    match submit_with_retry(api, &request, config.max_retries).await? {
        UpdateProjectResponse::Updated => Ok(()),
        other => Err(anyhow!("Unexpected response to full update: {:?}", other)),
    }
}

/// Splits the artboard array and uploads it chunk by chunk.
async fn push_chunked(
    api: &ApiClient,
    project_id: &ProjectId,
    artboards: Vec<Value>,
    config: PushConfig,
) -> Result<()> {
    let chunks = split_artboards(&artboards, config.chunk_size);
    let total_chunks = chunks.len() as u32;

    let pb = if config.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(total_chunks as u64)
    };
    pb.set_style(ProgressStyle::with_template(
        "{spinner} {bar:40.green/blue} {pos}/{len} chunks",
    )?);

    let mut completed = false;

    for (chunk_index, chunk) in chunks.into_iter().enumerate() {
        let request = UpdateProjectRequest {
            project_id: project_id.clone(),
            chat_history: None,
            artboards: Some(chunk),
            public_html: None,
            is_published: None,
            chunk_index: Some(chunk_index as u32),
            total_chunks: Some(total_chunks),
        };

        let response = submit_with_retry(api, &request, config.max_retries).await?;
        pb.inc(1);

        match response {
            UpdateProjectResponse::Complete => {
                completed = true;
            }
            UpdateProjectResponse::ChunkAccepted { .. } => {}
            UpdateProjectResponse::Updated => {
                pb.finish();
                return Err(anyhow!("Server treated a chunk as a full update"));
            }
        }
    }

    pb.finish();

    if completed {
        Ok(())
    } else {
        Err(anyhow!(
            "Server never reported the upload complete; a chunk may have been lost"
        ))
    }
}

/// Submits one update with retry logic.
async fn submit_with_retry(
    api: &ApiClient,
    request: &UpdateProjectRequest,
    max_retries: usize,
) -> Result<UpdateProjectResponse> {
    let mut attempt = 0;

    loop {
        match api.update_project(request).await {
            Ok(response) => return Ok(response),
            Err(_e) if attempt < max_retries => {
                attempt += 1;
                tokio::time::sleep(Duration::from_secs(2u64.pow(attempt as u32))).await;
            }
            Err(e) => return Err(e),
        }
    }
}
