//! Project payload model.
//!
//! The server stores chat history and artboards as opaque JSON and never
//! looks inside them, so the API types carry [`serde_json::Value`]s. The
//! types here describe the shape well-formed payloads are expected to
//! have; clients use them to build and sanity-check payloads before
//! uploading.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single chat message exchanged while editing a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub sender: String,
}

/// Bookkeeping attached to a chat history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMetadata {
    pub last_message_id: String,
    pub participant_count: u32,
}

/// The full chat history of a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatHistory {
    pub messages: Vec<ChatMessage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ChatMetadata>,
}

/// One element placed on an artboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtboardElement {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub properties: Map<String, Value>,
}

/// A single artboard of a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artboard {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub elements: Vec<ArtboardElement>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}
