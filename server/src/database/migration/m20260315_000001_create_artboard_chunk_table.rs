use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20260315_000001_create_artboard_chunk_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ArtboardChunk::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ArtboardChunk::ProjectId).string().not_null())
                    .col(
                        ColumnDef::new(ArtboardChunk::ChunkIndex)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ArtboardChunk::TotalChunks)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ArtboardChunk::Artboards).text().not_null())
                    .col(
                        ColumnDef::new(ArtboardChunk::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(ArtboardChunk::ProjectId)
                            .col(ArtboardChunk::ChunkIndex),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-artboard_chunk-created_at")
                    .table(ArtboardChunk::Table)
                    .col(ArtboardChunk::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ArtboardChunk::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ArtboardChunk {
    Table,
    ProjectId,
    ChunkIndex,
    TotalChunks,
    Artboards,
    CreatedAt,
}
