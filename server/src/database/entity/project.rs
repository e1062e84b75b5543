//! Project entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub project_id: String,
    pub last_updated: DateTimeUtc,
    /// Chat history JSON
    #[sea_orm(column_type = "Text", nullable)]
    pub chat_history: Option<String>,
    /// JSON array of artboards
    #[sea_orm(column_type = "Text", nullable)]
    pub artboards: Option<String>,
    /// Published HTML snapshot
    #[sea_orm(column_type = "Text", nullable)]
    pub public_html: Option<String>,
    pub is_published: Option<bool>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
