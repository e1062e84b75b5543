use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::project::ProjectId;

/// Request to create or update a project.
///
/// All payload fields are optional: a field that is absent leaves the
/// stored value untouched. When both `chunk_index` and `total_chunks`
/// are present the request is one piece of a chunked artboard upload
/// and only `artboards` is consulted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    /// The project to create or update.
    pub project_id: ProjectId,

    /// Replacement chat history.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_history: Option<Value>,

    /// Replacement artboard array, or one chunk of it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artboards: Option<Vec<Value>>,

    /// Replacement published HTML snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_html: Option<String>,

    /// Whether the project is published.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,

    /// Zero-based index of this chunk within the upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_index: Option<u32>,

    /// Total number of chunks in the upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_chunks: Option<u32>,
}

/// Response from creating or updating a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum UpdateProjectResponse {
    /// The project record was written directly.
    Updated,

    /// The chunk was buffered; the upload is not yet complete.
    ChunkAccepted {
        /// Index of the accepted chunk.
        index: u32,

        /// Total number of chunks in the upload.
        total: u32,
    },

    /// All chunks arrived and the assembled artboards were written.
    Complete,
}

/// One stored project, as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    /// The project's stable identifier.
    pub project_id: ProjectId,

    /// When the project was last written.
    pub last_updated: DateTime<Utc>,

    /// Stored chat history, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_history: Option<Value>,

    /// Stored artboards, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artboards: Option<Vec<Value>>,

    /// Published HTML snapshot, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_html: Option<String>,

    /// Whether the project is published.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
}

/// Response from listing all projects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListProjectsResponse {
    pub projects: Vec<ProjectRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_status_tags() {
        let updated = serde_json::to_value(&UpdateProjectResponse::Updated).unwrap();
        assert_eq!(updated, serde_json::json!({ "status": "updated" }));

        let accepted =
            serde_json::to_value(&UpdateProjectResponse::ChunkAccepted { index: 2, total: 5 })
                .unwrap();
        assert_eq!(
            accepted,
            serde_json::json!({ "status": "chunk-accepted", "index": 2, "total": 5 })
        );

        let complete = serde_json::to_value(&UpdateProjectResponse::Complete).unwrap();
        assert_eq!(complete, serde_json::json!({ "status": "complete" }));
    }

    #[test]
    fn test_request_absent_fields_stay_absent() {
        let request: UpdateProjectRequest =
            serde_json::from_value(serde_json::json!({ "projectId": "p1" })).unwrap();

        assert!(request.chat_history.is_none());
        assert!(request.artboards.is_none());
        assert!(request.public_html.is_none());
        assert!(request.is_published.is_none());
        assert!(request.chunk_index.is_none());
        assert!(request.total_chunks.is_none());

        let round = serde_json::to_value(&request).unwrap();
        assert_eq!(round, serde_json::json!({ "projectId": "p1" }));
    }
}
