//! Integration tests for chunk accumulation and project updates.

use std::sync::Arc;

use chrono::{Duration, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter,
};
use sea_orm_migration::MigratorTrait;
use serde_json::{json, Value};

use atelier::api::v1::project::UpdateProjectRequest;
use atelier::project::ProjectId;
use atelier_server::assembly::{ChunkAssembler, ChunkOutcome};
use atelier_server::config::ChunkBufferConfig;
use atelier_server::database::entity::artboard_chunk::{self, Entity as ArtboardChunk};
use atelier_server::database::entity::project::Entity as Project;
use atelier_server::database::migration::Migrator;
use atelier_server::database::AtelierDatabase;
use atelier_server::error::ErrorKind;

/// Fresh in-memory database with the schema applied.
async fn setup() -> DatabaseConnection {
    // A single connection, so every query sees the same in-memory file.
    let mut options = ConnectOptions::new("sqlite::memory:".to_owned());
    options.max_connections(1);

    let database = Database::connect(options).await.unwrap();
    Migrator::up(&database, None).await.unwrap();
    database
}

fn assembler() -> ChunkAssembler {
    ChunkAssembler::new(ChunkBufferConfig {
        expiry_secs: 3600,
        sweep_interval_secs: 60,
    })
}

fn project_id(id: &str) -> ProjectId {
    ProjectId::new(id.to_string()).unwrap()
}

fn artboard(id: &str) -> Value {
    json!({ "id": id, "name": format!("Artboard {id}"), "elements": [] })
}

fn full_update(id: &str) -> UpdateProjectRequest {
    UpdateProjectRequest {
        project_id: project_id(id),
        chat_history: None,
        artboards: None,
        public_html: None,
        is_published: None,
        chunk_index: None,
        total_chunks: None,
    }
}

async fn stored_artboards(database: &DatabaseConnection, id: &str) -> Option<Vec<Value>> {
    let model = database.find_project(&project_id(id)).await.unwrap()?;
    model
        .artboards
        .as_deref()
        .map(|json| serde_json::from_str(json).unwrap())
}

async fn buffered_count(database: &DatabaseConnection, id: &str) -> u64 {
    ArtboardChunk::find()
        .filter(artboard_chunk::Column::ProjectId.eq(id))
        .count(database)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_in_order_assembly() {
    let database = setup().await;
    let assembler = assembler();
    let id = project_id("p1");

    let outcome = assembler
        .submit_chunk(&database, &id, 0, 2, &[artboard("a")])
        .await
        .unwrap();
    assert_eq!(outcome, ChunkOutcome::Accepted);
    assert!(stored_artboards(&database, "p1").await.is_none());

    let outcome = assembler
        .submit_chunk(&database, &id, 1, 2, &[artboard("b")])
        .await
        .unwrap();
    assert_eq!(outcome, ChunkOutcome::Assembled);

    assert_eq!(
        stored_artboards(&database, "p1").await.unwrap(),
        vec![artboard("a"), artboard("b")]
    );
    assert_eq!(buffered_count(&database, "p1").await, 0);
}

#[tokio::test]
async fn test_reverse_order_assembly() {
    let database = setup().await;
    let assembler = assembler();
    let id = project_id("p1");

    // The last index arrives first; nothing can be assembled yet.
    let outcome = assembler
        .submit_chunk(&database, &id, 1, 2, &[artboard("b")])
        .await
        .unwrap();
    assert_eq!(outcome, ChunkOutcome::Accepted);
    assert!(stored_artboards(&database, "p1").await.is_none());

    // The submission completing the set performs the assembly, and the
    // result is ordered by index, not by arrival.
    let outcome = assembler
        .submit_chunk(&database, &id, 0, 2, &[artboard("a")])
        .await
        .unwrap();
    assert_eq!(outcome, ChunkOutcome::Assembled);

    assert_eq!(
        stored_artboards(&database, "p1").await.unwrap(),
        vec![artboard("a"), artboard("b")]
    );
}

#[tokio::test]
async fn test_arbitrary_arrival_order() {
    let database = setup().await;
    let assembler = assembler();
    let id = project_id("p1");

    let total = 5u32;
    let arrival = [3u32, 0, 4, 2, 1];

    for (n, &index) in arrival.iter().enumerate() {
        let outcome = assembler
            .submit_chunk(&database, &id, index, total, &[artboard(&index.to_string())])
            .await
            .unwrap();

        if n + 1 < arrival.len() {
            assert_eq!(outcome, ChunkOutcome::Accepted);
        } else {
            assert_eq!(outcome, ChunkOutcome::Assembled);
        }
    }

    let expected: Vec<Value> = (0..total).map(|i| artboard(&i.to_string())).collect();
    assert_eq!(stored_artboards(&database, "p1").await.unwrap(), expected);
    assert_eq!(buffered_count(&database, "p1").await, 0);
}

#[tokio::test]
async fn test_resubmitted_chunk_overwrites() {
    let database = setup().await;
    let assembler = assembler();
    let id = project_id("p1");

    assembler
        .submit_chunk(&database, &id, 0, 2, &[artboard("stale")])
        .await
        .unwrap();

    // Retry of index 0 with a different payload replaces the buffered
    // one instead of accumulating alongside it.
    assembler
        .submit_chunk(&database, &id, 0, 2, &[artboard("fresh")])
        .await
        .unwrap();

    let outcome = assembler
        .submit_chunk(&database, &id, 1, 2, &[artboard("tail")])
        .await
        .unwrap();
    assert_eq!(outcome, ChunkOutcome::Assembled);

    assert_eq!(
        stored_artboards(&database, "p1").await.unwrap(),
        vec![artboard("fresh"), artboard("tail")]
    );
}

#[tokio::test]
async fn test_incomplete_upload_never_touches_project() {
    let database = setup().await;
    let assembler = assembler();

    let mut request = full_update("p1");
    request.artboards = Some(vec![artboard("existing")]);
    database.upsert_project(&request).await.unwrap();

    assembler
        .submit_chunk(&database, &project_id("p1"), 0, 3, &[artboard("partial")])
        .await
        .unwrap();

    assert_eq!(
        stored_artboards(&database, "p1").await.unwrap(),
        vec![artboard("existing")]
    );
}

#[tokio::test]
async fn test_partial_update_preserves_absent_fields() {
    let database = setup().await;

    let mut request = full_update("p1");
    request.artboards = Some(vec![artboard("a")]);
    request.public_html = Some("<html></html>".to_string());
    request.is_published = Some(true);
    database.upsert_project(&request).await.unwrap();

    let mut request = full_update("p1");
    request.chat_history = Some(json!({ "messages": [] }));
    database.upsert_project(&request).await.unwrap();

    let model = database
        .find_project(&project_id("p1"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        model.chat_history.as_deref(),
        Some("{\"messages\":[]}")
    );
    assert_eq!(
        stored_artboards(&database, "p1").await.unwrap(),
        vec![artboard("a")]
    );
    assert_eq!(model.public_html.as_deref(), Some("<html></html>"));
    assert_eq!(model.is_published, Some(true));
}

#[tokio::test]
async fn test_concurrent_final_chunks_assemble_once() {
    let database = setup().await;
    let assembler = Arc::new(assembler());
    let id = project_id("p1");

    assembler
        .submit_chunk(&database, &id, 0, 2, &[artboard("a")])
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..4 {
        let database = database.clone();
        let assembler = assembler.clone();
        let id = id.clone();

        handles.push(tokio::spawn(async move {
            assembler
                .submit_chunk(&database, &id, 1, 2, &[artboard("b")])
                .await
                .unwrap()
        }));
    }

    let mut assembled = 0;
    for handle in handles {
        if handle.await.unwrap() == ChunkOutcome::Assembled {
            assembled += 1;
        }
    }

    // Exactly one submission observes the complete buffer; the rest
    // arrive after cleanup and are buffered as stragglers.
    assert_eq!(assembled, 1);
    assert_eq!(
        stored_artboards(&database, "p1").await.unwrap(),
        vec![artboard("a"), artboard("b")]
    );
}

#[tokio::test]
async fn test_rejects_malformed_chunk_bounds() {
    let database = setup().await;
    let assembler = assembler();
    let id = project_id("p1");

    let error = assembler
        .submit_chunk(&database, &id, 2, 2, &[artboard("a")])
        .await
        .unwrap_err();
    assert!(matches!(error.kind(), ErrorKind::RequestError(_)));

    let error = assembler
        .submit_chunk(&database, &id, 0, 0, &[artboard("a")])
        .await
        .unwrap_err();
    assert!(matches!(error.kind(), ErrorKind::RequestError(_)));

    // Validation failures must not leave partial state behind.
    assert_eq!(buffered_count(&database, "p1").await, 0);
}

#[tokio::test]
async fn test_missing_project_is_none() {
    let database = setup().await;

    let found = database
        .find_project(&project_id("missing-id"))
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_leftover_entries_from_other_total_are_ignored() {
    let database = setup().await;
    let assembler = assembler();
    let id = project_id("p1");

    // An abandoned three-chunk upload left two entries behind.
    assembler
        .submit_chunk(&database, &id, 0, 3, &[artboard("old-0")])
        .await
        .unwrap();
    assembler
        .submit_chunk(&database, &id, 2, 3, &[artboard("old-2")])
        .await
        .unwrap();

    // A new two-chunk upload assembles from its own entries only. Index
    // 0 is overwritten by the new upload; index 2 is stale.
    assembler
        .submit_chunk(&database, &id, 0, 2, &[artboard("new-0")])
        .await
        .unwrap();
    let outcome = assembler
        .submit_chunk(&database, &id, 1, 2, &[artboard("new-1")])
        .await
        .unwrap();
    assert_eq!(outcome, ChunkOutcome::Assembled);

    assert_eq!(
        stored_artboards(&database, "p1").await.unwrap(),
        vec![artboard("new-0"), artboard("new-1")]
    );

    // Cleanup removes the stale entry along with the assembled ones.
    assert_eq!(buffered_count(&database, "p1").await, 0);
}

#[tokio::test]
async fn test_sweep_removes_only_expired_entries() {
    let database = setup().await;
    let assembler = assembler();

    assembler
        .submit_chunk(&database, &project_id("fresh"), 0, 2, &[artboard("a")])
        .await
        .unwrap();

    let stale = artboard_chunk::ActiveModel {
        project_id: Set("stale".to_string()),
        chunk_index: Set(0),
        total_chunks: Set(2),
        artboards: Set("[]".to_string()),
        created_at: Set(Utc::now() - Duration::seconds(7200)),
    };
    ArtboardChunk::insert(stale).exec(&database).await.unwrap();

    let removed = assembler.sweep_expired(&database).await.unwrap();

    assert_eq!(removed, 1);
    assert_eq!(buffered_count(&database, "stale").await, 0);
    assert_eq!(buffered_count(&database, "fresh").await, 1);
}

#[tokio::test]
async fn test_single_chunk_upload_assembles_immediately() {
    let database = setup().await;
    let assembler = assembler();

    let outcome = assembler
        .submit_chunk(
            &database,
            &project_id("p1"),
            0,
            1,
            &[artboard("only"), artboard("two")],
        )
        .await
        .unwrap();
    assert_eq!(outcome, ChunkOutcome::Assembled);

    assert_eq!(
        stored_artboards(&database, "p1").await.unwrap(),
        vec![artboard("only"), artboard("two")]
    );
    assert_eq!(Project::find().count(&database).await.unwrap(), 1);
}
