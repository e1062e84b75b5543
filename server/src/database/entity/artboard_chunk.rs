//! Artboard chunk entity.
//!
//! One buffered piece of a chunked artboard upload, keyed by
//! `(project_id, chunk_index)`. Rows are ephemeral: they are deleted in
//! bulk once an upload assembles, or by the expiry sweeper.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "artboard_chunk")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub project_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub chunk_index: i32,
    /// Total chunk count declared by the submission that wrote this row
    pub total_chunks: i32,
    /// JSON array of artboards belonging to this chunk
    #[sea_orm(column_type = "Text")]
    pub artboards: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
